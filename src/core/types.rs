use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A business document: Invoice, CreditNote or Order.
///
/// Dates are kept as text so that data coming from upstream systems can be
/// validated before it is trusted; see [`validate`](crate::core::validate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document kind; selects root element, namespaces and line casing.
    pub kind: DocumentKind,
    /// Document identifier (invoice / credit note / order number).
    pub id: String,
    /// Issue date, `YYYY-MM-DD`.
    pub issue_date: String,
    /// Issue time, `HH:MM:SS`.
    pub issue_time: Option<String>,
    /// Kind-specific type code (UNTDID 1001, e.g. 380 for a commercial invoice).
    pub type_code: String,
    /// Document currency code (ISO 4217).
    pub currency_code: String,
    /// Accounting supplier (Invoice/CreditNote) or seller (Order).
    pub supplier: Option<Party>,
    /// Accounting customer (Invoice/CreditNote) or buyer (Order).
    pub customer: Option<Party>,
    /// Document-level monetary summary.
    pub monetary_total: Option<MonetaryTotal>,
    /// Ordered line items.
    pub lines: Vec<LineItem>,
    /// Free-text notes.
    pub notes: Vec<String>,
    /// Cross-references to related documents.
    pub references: Vec<DocumentReference>,
    /// Delivery information.
    pub delivery: Option<Delivery>,
    /// Payment terms (Invoice/CreditNote only).
    pub payment_terms: Option<PaymentTerms>,
    /// Tax totals (Invoice/CreditNote only).
    pub tax_totals: Vec<TaxTotal>,
    /// Buyer's reference for routing inside the receiving organisation.
    pub buyer_reference: Option<String>,
    /// Buyer accounting string.
    pub accounting_cost: Option<String>,
}

impl Document {
    /// The billing reference, if the document carries one.
    pub fn billing_reference(&self) -> Option<&BillingReference> {
        self.references.iter().find_map(|r| match r {
            DocumentReference::Billing(b) => Some(b),
            _ => None,
        })
    }
}

/// The three supported UBL document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Invoice,
    CreditNote,
    Order,
}

impl DocumentKind {
    /// Root element name.
    pub fn root_name(&self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::CreditNote => "CreditNote",
            Self::Order => "Order",
        }
    }

    /// Default UNTDID 1001 type code for the kind.
    pub fn default_type_code(&self) -> &'static str {
        match self {
            Self::Invoice => "380",
            Self::CreditNote => "381",
            Self::Order => "220",
        }
    }

    /// Identifier used by delivery networks for the document type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::CreditNote => "credit_note",
            Self::Order => "order",
        }
    }

    /// Whether the kind carries tax totals, payment terms and references.
    pub fn is_billing(&self) -> bool {
        matches!(self, Self::Invoice | Self::CreditNote)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.root_name())
    }
}

/// A decimal amount in a given ISO 4217 currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    pub value: Decimal,
    /// Currency code; empty when the source did not provide one.
    pub currency: String,
}

impl MonetaryAmount {
    pub fn new(value: Decimal, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }

    /// Zero in the given currency.
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub additional_street: Option<String>,
    pub city: Option<String>,
    pub postal_zone: Option<String>,
    /// Region / state / Bundesland.
    pub country_subentity: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    pub country_name: Option<String>,
}

/// A trading party (supplier, customer, buyer or seller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Display name.
    pub name: String,
    pub postal_address: Address,
    /// Additional party identifiers (GLN, company registration, ...).
    pub identifiers: Vec<PartyIdentifier>,
    /// Network routing identifier.
    pub endpoint: Option<EndpointId>,
    pub contact: Option<Contact>,
    /// Tax scheme rendered alongside the endpoint; `VAT` when absent.
    pub tax_scheme: Option<TaxScheme>,
}

/// Opaque party identifier with an optional identification scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyIdentifier {
    pub id: String,
    pub scheme: Option<String>,
}

/// Participant identifier on the delivery network, e.g. scheme `9930`
/// (German VAT) with value `DE123456789`.
///
/// Scheme and value belong together: the generator renders the endpoint only
/// when both are non-empty and the validator warns when just one is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointId {
    pub scheme: String,
    pub value: String,
}

impl EndpointId {
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// Both parts present.
    pub fn is_complete(&self) -> bool {
        !self.scheme.trim().is_empty() && !self.value.trim().is_empty()
    }
}

impl std::fmt::Display for EndpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.scheme, self.value)
    }
}

/// Contact point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
}

/// UNCL 5305 tax category codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaxCategoryCode {
    /// S: Standard rate.
    Standard,
    /// AA: Lower (reduced) rate.
    Reduced,
    /// E: Exempt from tax.
    Exempt,
    /// Z: Zero rated goods.
    Zero,
    /// AE: VAT reverse charge.
    ReverseCharge,
    /// O: Services outside scope of tax.
    OutsideScope,
}

impl TaxCategoryCode {
    /// UNCL 5305 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Standard => "S",
            Self::Reduced => "AA",
            Self::Exempt => "E",
            Self::Zero => "Z",
            Self::ReverseCharge => "AE",
            Self::OutsideScope => "O",
        }
    }

    /// Parse from UNCL 5305 code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(Self::Standard),
            "AA" => Some(Self::Reduced),
            "E" => Some(Self::Exempt),
            "Z" => Some(Self::Zero),
            "AE" => Some(Self::ReverseCharge),
            "O" => Some(Self::OutsideScope),
            _ => None,
        }
    }
}

/// Tax scheme, e.g. `VAT` or `GST`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxScheme {
    pub id: String,
    pub name: Option<String>,
}

impl TaxScheme {
    pub fn vat() -> Self {
        Self {
            id: "VAT".into(),
            name: None,
        }
    }
}

/// How tax applies to a line or subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxCategory {
    pub code: TaxCategoryCode,
    pub percent: Option<Decimal>,
    pub scheme: TaxScheme,
}

/// Quantity with an optional UN/ECE Rec 20 unit code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: Decimal,
    pub unit_code: Option<String>,
}

/// Item being invoiced, credited or ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub description: String,
    pub name: Option<String>,
    pub sellers_item_id: Option<String>,
    pub tax_category: Option<TaxCategory>,
}

/// A document line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique within the document.
    pub id: String,
    pub note: Option<String>,
    pub quantity: Quantity,
    /// Net amount of the line, `quantity × price`.
    pub line_extension_amount: MonetaryAmount,
    pub item: Item,
    /// Net unit price.
    pub price: MonetaryAmount,
}

/// Tax subtotal for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSubtotal {
    pub taxable_amount: MonetaryAmount,
    pub tax_amount: MonetaryAmount,
    pub category: TaxCategory,
}

/// Aggregate tax with an optional per-category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTotal {
    pub tax_amount: MonetaryAmount,
    pub subtotals: Vec<TaxSubtotal>,
}

/// Legal monetary total.
///
/// `tax_inclusive_amount = tax_exclusive_amount + Σ tax totals` and
/// `payable_amount = tax_inclusive_amount - prepaid_amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryTotal {
    pub line_extension_amount: MonetaryAmount,
    pub tax_exclusive_amount: MonetaryAmount,
    pub tax_inclusive_amount: MonetaryAmount,
    pub prepaid_amount: Option<MonetaryAmount>,
    pub payable_amount: MonetaryAmount,
}

/// Reference to another document. Each variant carries its own required
/// fields, so a reference without an identifier cannot be constructed
/// through the helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocumentReference {
    Order(OrderReference),
    Billing(BillingReference),
    Contract(ContractDocumentReference),
    Additional(AdditionalDocumentReference),
}

/// Purchase order the document relates to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReference {
    pub id: String,
    pub sales_order_id: Option<String>,
    pub issue_date: Option<String>,
}

impl OrderReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sales_order_id: None,
            issue_date: None,
        }
    }
}

/// Original invoice a credit note corrects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingReference {
    pub invoice_id: String,
    pub issue_date: Option<String>,
}

impl BillingReference {
    pub fn new(invoice_id: impl Into<String>) -> Self {
        Self {
            invoice_id: invoice_id.into(),
            issue_date: None,
        }
    }

    pub fn issued(mut self, date: NaiveDate) -> Self {
        self.issue_date = Some(date.to_string());
        self
    }
}

/// Contract the document is based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDocumentReference {
    pub id: String,
    pub document_type: Option<String>,
}

impl ContractDocumentReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document_type: None,
        }
    }
}

/// Supporting document, optionally with an attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalDocumentReference {
    pub id: String,
    pub document_type: Option<String>,
    pub description: Option<String>,
    pub attachment: Option<Attachment>,
}

impl AdditionalDocumentReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document_type: None,
            description: None,
            attachment: None,
        }
    }
}

/// Attachment payload of an additional document reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attachment {
    /// Base64 content supplied by the caller.
    Embedded {
        mime_code: String,
        filename: String,
        content: String,
    },
    External {
        uri: String,
    },
}

/// Delivery information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    /// `YYYY-MM-DD`.
    pub actual_delivery_date: Option<String>,
    pub location: Option<Address>,
    pub party_name: Option<String>,
}

/// Payment terms free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub note: String,
}
