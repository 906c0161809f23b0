use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use tracing::debug;

use super::error::CodecError;
use super::totals;
use super::types::*;
use super::validation;

/// Builder for Invoice, CreditNote and Order documents.
///
/// `build()` fills in the basic monetary total: the sum of line extension
/// amounts becomes the line-extension, tax-exclusive, tax-inclusive and
/// payable amount. Tax is never derived here; call
/// [`apply_tax_totals`](crate::core::apply_tax_totals) afterwards for
/// tax-aware totals.
///
/// ```
/// use ubldoc::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = DocumentBuilder::invoice("INV-2024-001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .supplier(PartyBuilder::new("ACME Ltd", AddressBuilder::new("Dublin", "D02", "IE").build())
///         .endpoint("9935", "IE1234567T")
///         .build())
///     .customer(PartyBuilder::new("Kunde AG", AddressBuilder::new("München", "80331", "DE").build())
///         .build())
///     .add_line(LineItemBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(100.00)).build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.monetary_total.unwrap().payable_amount.value, dec!(1000.00));
/// ```
pub struct DocumentBuilder {
    kind: DocumentKind,
    id: String,
    issue_date: NaiveDate,
    issue_time: Option<NaiveTime>,
    type_code: Option<String>,
    currency_code: String,
    supplier: Option<Party>,
    customer: Option<Party>,
    lines: Vec<LineItem>,
    notes: Vec<String>,
    references: Vec<DocumentReference>,
    delivery: Option<Delivery>,
    payment_terms: Option<PaymentTerms>,
    buyer_reference: Option<String>,
    accounting_cost: Option<String>,
    prepaid: Option<Decimal>,
}

impl DocumentBuilder {
    pub fn new(kind: DocumentKind, id: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            kind,
            id: id.into(),
            issue_date,
            issue_time: None,
            type_code: None,
            currency_code: "EUR".to_string(),
            supplier: None,
            customer: None,
            lines: Vec::new(),
            notes: Vec::new(),
            references: Vec::new(),
            delivery: None,
            payment_terms: None,
            buyer_reference: None,
            accounting_cost: None,
            prepaid: None,
        }
    }

    pub fn invoice(id: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self::new(DocumentKind::Invoice, id, issue_date)
    }

    pub fn credit_note(id: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self::new(DocumentKind::CreditNote, id, issue_date)
    }

    pub fn order(id: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self::new(DocumentKind::Order, id, issue_date)
    }

    pub fn issue_time(mut self, time: NaiveTime) -> Self {
        self.issue_time = Some(time);
        self
    }

    /// Override the kind's default type code.
    pub fn type_code(mut self, code: impl Into<String>) -> Self {
        self.type_code = Some(code.into());
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn reference(mut self, reference: DocumentReference) -> Self {
        self.references.push(reference);
        self
    }

    /// Reference the invoice a credit note corrects.
    pub fn billing_reference(self, reference: BillingReference) -> Self {
        self.reference(DocumentReference::Billing(reference))
    }

    pub fn order_reference(self, reference: OrderReference) -> Self {
        self.reference(DocumentReference::Order(reference))
    }

    pub fn contract_reference(self, reference: ContractDocumentReference) -> Self {
        self.reference(DocumentReference::Contract(reference))
    }

    pub fn additional_reference(self, reference: AdditionalDocumentReference) -> Self {
        self.reference(DocumentReference::Additional(reference))
    }

    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn payment_terms(mut self, note: impl Into<String>) -> Self {
        self.payment_terms = Some(PaymentTerms { note: note.into() });
        self
    }

    pub fn buyer_reference(mut self, reference: impl Into<String>) -> Self {
        self.buyer_reference = Some(reference.into());
        self
    }

    pub fn accounting_cost(mut self, cost: impl Into<String>) -> Self {
        self.accounting_cost = Some(cost.into());
        self
    }

    pub fn prepaid(mut self, amount: Decimal) -> Self {
        self.prepaid = Some(amount);
        self
    }

    /// Build the document, compute the basic totals and run validation.
    /// Returns every validation error, not just the first.
    pub fn build(self) -> Result<Document, CodecError> {
        let document = self.build_unchecked()?;

        let report = validation::validate(&document);
        if !report.is_valid() {
            return Err(CodecError::Validation(report));
        }

        Ok(document)
    }

    /// Build without validation, for tests or importing external data.
    pub fn build_unchecked(self) -> Result<Document, CodecError> {
        let supplier = self
            .supplier
            .ok_or_else(|| CodecError::Builder("supplier party is required".into()))?;
        let customer = self
            .customer
            .ok_or_else(|| CodecError::Builder("customer party is required".into()))?;

        if self.lines.is_empty() {
            return Err(CodecError::Builder(
                "at least one line item is required".into(),
            ));
        }

        for line in &self.lines {
            totals::line_extension(line.quantity.value, line.price.value)?;
        }
        let monetary_total =
            totals::basic_monetary_total(&self.lines, &self.currency_code, self.prepaid)?;

        debug!(
            kind = %self.kind,
            id = %self.id,
            lines = self.lines.len(),
            "assembled document"
        );

        Ok(Document {
            kind: self.kind,
            id: self.id,
            issue_date: self.issue_date.to_string(),
            issue_time: self
                .issue_time
                .map(|t| t.format("%H:%M:%S").to_string()),
            type_code: self
                .type_code
                .unwrap_or_else(|| self.kind.default_type_code().to_string()),
            currency_code: self.currency_code,
            supplier: Some(supplier),
            customer: Some(customer),
            monetary_total: Some(monetary_total),
            lines: self.lines,
            notes: self.notes,
            references: self.references,
            delivery: self.delivery,
            payment_terms: self.payment_terms,
            tax_totals: Vec::new(),
            buyer_reference: self.buyer_reference,
            accounting_cost: self.accounting_cost,
        })
    }
}

/// Builder for Party.
pub struct PartyBuilder {
    name: String,
    postal_address: Address,
    identifiers: Vec<PartyIdentifier>,
    endpoint: Option<EndpointId>,
    contact: Option<Contact>,
    tax_scheme: Option<TaxScheme>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, postal_address: Address) -> Self {
        Self {
            name: name.into(),
            postal_address,
            identifiers: Vec::new(),
            endpoint: None,
            contact: None,
            tax_scheme: None,
        }
    }

    /// Add a party identifier; `scheme` is the identification scheme tag.
    pub fn identifier(mut self, id: impl Into<String>, scheme: Option<&str>) -> Self {
        self.identifiers.push(PartyIdentifier {
            id: id.into(),
            scheme: scheme.map(String::from),
        });
        self
    }

    /// Delivery network endpoint (scheme + participant value).
    pub fn endpoint(mut self, scheme: impl Into<String>, value: impl Into<String>) -> Self {
        self.endpoint = Some(EndpointId::new(scheme, value));
        self
    }

    pub fn contact(
        mut self,
        name: Option<String>,
        telephone: Option<String>,
        email: Option<String>,
    ) -> Self {
        self.contact = Some(Contact {
            name,
            telephone,
            email,
        });
        self
    }

    pub fn tax_scheme(mut self, id: impl Into<String>, name: Option<&str>) -> Self {
        self.tax_scheme = Some(TaxScheme {
            id: id.into(),
            name: name.map(String::from),
        });
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            postal_address: self.postal_address,
            identifiers: self.identifiers,
            endpoint: self.endpoint,
            contact: self.contact,
            tax_scheme: self.tax_scheme,
        }
    }
}

/// Builder for Address.
pub struct AddressBuilder {
    street: Option<String>,
    additional_street: Option<String>,
    city: String,
    postal_zone: String,
    country_subentity: Option<String>,
    country_code: String,
    country_name: Option<String>,
}

impl AddressBuilder {
    pub fn new(
        city: impl Into<String>,
        postal_zone: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            street: None,
            additional_street: None,
            city: city.into(),
            postal_zone: postal_zone.into(),
            country_subentity: None,
            country_code: country_code.into(),
            country_name: None,
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn additional_street(mut self, additional: impl Into<String>) -> Self {
        self.additional_street = Some(additional.into());
        self
    }

    pub fn subentity(mut self, subentity: impl Into<String>) -> Self {
        self.country_subentity = Some(subentity.into());
        self
    }

    pub fn country_name(mut self, name: impl Into<String>) -> Self {
        self.country_name = Some(name.into());
        self
    }

    /// Empty city or postal zone strings become absent fields.
    pub fn build(self) -> Address {
        Address {
            street: self.street,
            additional_street: self.additional_street,
            city: non_empty(self.city),
            postal_zone: non_empty(self.postal_zone),
            country_subentity: self.country_subentity,
            country_code: self.country_code,
            country_name: self.country_name,
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

impl TaxCategory {
    /// Category in the `VAT` scheme.
    pub fn new(code: TaxCategoryCode, percent: Option<Decimal>) -> Self {
        Self {
            code,
            percent,
            scheme: TaxScheme::vat(),
        }
    }

    /// Standard rate VAT at `percent`.
    pub fn standard(percent: Decimal) -> Self {
        Self::new(TaxCategoryCode::Standard, Some(percent))
    }

    /// Reduced rate VAT at `percent`.
    pub fn reduced(percent: Decimal) -> Self {
        Self::new(TaxCategoryCode::Reduced, Some(percent))
    }

    /// A 0% category (zero rated, exempt, reverse charge or outside scope).
    pub fn zero_percent(code: TaxCategoryCode) -> Self {
        Self::new(code, Some(Decimal::ZERO))
    }

    pub fn with_scheme(mut self, id: impl Into<String>, name: Option<&str>) -> Self {
        self.scheme = TaxScheme {
            id: id.into(),
            name: name.map(String::from),
        };
        self
    }
}

/// Builder for LineItem.
pub struct LineItemBuilder {
    id: String,
    description: String,
    quantity: Decimal,
    unit_code: Option<String>,
    unit_price: Decimal,
    currency: String,
    name: Option<String>,
    sellers_item_id: Option<String>,
    tax_category: Option<TaxCategory>,
    note: Option<String>,
}

impl LineItemBuilder {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        unit_code: impl Into<String>,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            quantity,
            unit_code: non_empty(unit_code.into()),
            unit_price,
            currency: "EUR".to_string(),
            name: None,
            sellers_item_id: None,
            tax_category: None,
            note: None,
        }
    }

    /// Currency of price and line amount; should match the document currency.
    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn sellers_item_id(mut self, id: impl Into<String>) -> Self {
        self.sellers_item_id = Some(id.into());
        self
    }

    pub fn tax(mut self, category: TaxCategory) -> Self {
        self.tax_category = Some(category);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Build the line; the line extension amount is `quantity × unit_price`.
    ///
    /// A product outside the `Decimal` range leaves the amount at zero;
    /// [`DocumentBuilder`] rejects such a line with [`CodecError::Arithmetic`].
    pub fn build(self) -> LineItem {
        let line_amount =
            totals::line_extension(self.quantity, self.unit_price).unwrap_or(Decimal::ZERO);
        LineItem {
            id: self.id,
            note: self.note,
            quantity: Quantity {
                value: self.quantity,
                unit_code: self.unit_code,
            },
            line_extension_amount: MonetaryAmount::new(line_amount, self.currency.clone()),
            item: Item {
                description: self.description,
                name: self.name,
                sellers_item_id: self.sellers_item_id,
                tax_category: self.tax_category,
            },
            price: MonetaryAmount::new(self.unit_price, self.currency),
        }
    }
}
