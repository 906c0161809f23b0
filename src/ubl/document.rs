//! Lowering of a [`Document`] into the UBL element tree.
//!
//! Root-level element order is data: each document kind has a table of
//! sections, evaluated top to bottom. A section contributes nodes only when
//! its predicate holds.

use super::ir::{Children, Node};
use super::ns;
use crate::core::*;

type SectionBuilder = fn(&Document, &KindTags) -> Result<Vec<Node>, CodecError>;

struct Section {
    applies: fn(&Document) -> bool,
    build: SectionBuilder,
}

/// Invoice and CreditNote.
const BILLING_SECTIONS: &[Section] = &[
    Section { applies: always, build: identification },
    Section { applies: has_references, build: references },
    Section { applies: always, build: parties },
    Section { applies: has_delivery, build: delivery },
    Section { applies: has_payment_terms, build: payment_terms },
    Section { applies: has_tax_totals, build: tax_totals },
    Section { applies: always, build: monetary_total },
    Section { applies: always, build: lines },
    Section { applies: has_notes, build: notes },
    Section { applies: has_trailing, build: trailing },
];

/// Order: no references, payment terms or tax totals.
const ORDER_SECTIONS: &[Section] = &[
    Section { applies: always, build: identification },
    Section { applies: always, build: parties },
    Section { applies: has_delivery, build: delivery },
    Section { applies: always, build: monetary_total },
    Section { applies: always, build: lines },
    Section { applies: has_notes, build: notes },
    Section { applies: has_trailing, build: trailing },
];

/// Element names that differ between document kinds.
struct KindTags {
    namespace: &'static str,
    type_code: &'static str,
    first_party: &'static str,
    second_party: &'static str,
    line: &'static str,
    quantity: &'static str,
}

const INVOICE_TAGS: KindTags = KindTags {
    namespace: ns::INVOICE,
    type_code: "cbc:InvoiceTypeCode",
    first_party: "cac:AccountingSupplierParty",
    second_party: "cac:AccountingCustomerParty",
    line: "cac:InvoiceLine",
    quantity: "cbc:InvoicedQuantity",
};

const CREDIT_NOTE_TAGS: KindTags = KindTags {
    namespace: ns::CREDIT_NOTE,
    type_code: "cbc:CreditNoteTypeCode",
    first_party: "cac:AccountingSupplierParty",
    second_party: "cac:AccountingCustomerParty",
    line: "cac:CreditNoteLine",
    quantity: "cbc:CreditedQuantity",
};

const ORDER_TAGS: KindTags = KindTags {
    namespace: ns::ORDER,
    type_code: "cbc:OrderTypeCode",
    first_party: "cac:BuyerCustomerParty",
    second_party: "cac:SellerSupplierParty",
    line: "cac:OrderLine",
    quantity: "cbc:OrderedQuantity",
};

fn tags(kind: DocumentKind) -> &'static KindTags {
    match kind {
        DocumentKind::Invoice => &INVOICE_TAGS,
        DocumentKind::CreditNote => &CREDIT_NOTE_TAGS,
        DocumentKind::Order => &ORDER_TAGS,
    }
}

fn sections(kind: DocumentKind) -> &'static [Section] {
    match kind {
        DocumentKind::Invoice | DocumentKind::CreditNote => BILLING_SECTIONS,
        DocumentKind::Order => ORDER_SECTIONS,
    }
}

/// Lower `document` to its root element.
///
/// Fails only when required structure (parties, monetary total, lines) is
/// absent; everything else is rendered as given.
pub fn to_tree(document: &Document) -> Result<Node, CodecError> {
    let tags = tags(document.kind);

    let mut children = Vec::new();
    for section in sections(document.kind) {
        if (section.applies)(document) {
            children.extend((section.build)(document, tags)?);
        }
    }

    Ok(Node::parent(document.kind.root_name(), children)
        .attr("xmlns", tags.namespace)
        .attr("xmlns:cac", ns::CAC)
        .attr("xmlns:cbc", ns::CBC)
        .attr("xmlns:ccts", ns::CCTS)
        .attr("xmlns:qdt", ns::QDT)
        .attr("xmlns:udt", ns::UDT))
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

fn always(_: &Document) -> bool {
    true
}

fn has_references(d: &Document) -> bool {
    !d.references.is_empty()
}

fn has_delivery(d: &Document) -> bool {
    d.delivery.is_some()
}

fn has_payment_terms(d: &Document) -> bool {
    d.payment_terms
        .as_ref()
        .is_some_and(|t| !t.note.trim().is_empty())
}

fn has_tax_totals(d: &Document) -> bool {
    !d.tax_totals.is_empty()
}

fn has_notes(d: &Document) -> bool {
    d.notes.iter().any(|n| !n.trim().is_empty())
}

fn has_trailing(d: &Document) -> bool {
    d.buyer_reference.is_some() || d.accounting_cost.is_some()
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn identification(d: &Document, t: &KindTags) -> Result<Vec<Node>, CodecError> {
    Ok(Children::new()
        .push(Node::text("cbc:ID", d.id.as_str()))
        .push(Node::text("cbc:IssueDate", d.issue_date.as_str()))
        .opt(Node::opt_text("cbc:IssueTime", d.issue_time.as_ref()))
        .push(Node::text(t.type_code, d.type_code.as_str()))
        .push(Node::text("cbc:DocumentCurrencyCode", d.currency_code.as_str()))
        .into_vec())
}

/// Schema order: order, billing, contract, additional. Input order is kept
/// within each kind.
fn references(d: &Document, _: &KindTags) -> Result<Vec<Node>, CodecError> {
    let orders = d.references.iter().filter_map(|r| match r {
        DocumentReference::Order(o) => Some(order_reference(o)),
        _ => None,
    });
    let billing = d.references.iter().filter_map(|r| match r {
        DocumentReference::Billing(b) => Some(billing_reference(b)),
        _ => None,
    });
    let contracts = d.references.iter().filter_map(|r| match r {
        DocumentReference::Contract(c) => Some(contract_reference(c)),
        _ => None,
    });
    let additional = d.references.iter().filter_map(|r| match r {
        DocumentReference::Additional(a) => Some(additional_reference(a)),
        _ => None,
    });

    Ok(Children::new()
        .extend(orders)
        .extend(billing)
        .extend(contracts)
        .extend(additional)
        .into_vec())
}

fn order_reference(r: &OrderReference) -> Node {
    Node::parent(
        "cac:OrderReference",
        Children::new()
            .push(Node::text("cbc:ID", r.id.as_str()))
            .opt(Node::opt_text("cbc:SalesOrderID", r.sales_order_id.as_ref()))
            .opt(Node::opt_text("cbc:IssueDate", r.issue_date.as_ref()))
            .into_vec(),
    )
}

fn billing_reference(r: &BillingReference) -> Node {
    let invoice_ref = Node::parent(
        "cac:InvoiceDocumentReference",
        Children::new()
            .push(Node::text("cbc:ID", r.invoice_id.as_str()))
            .opt(Node::opt_text("cbc:IssueDate", r.issue_date.as_ref()))
            .into_vec(),
    );
    Node::parent("cac:BillingReference", vec![invoice_ref])
}

fn contract_reference(r: &ContractDocumentReference) -> Node {
    Node::parent(
        "cac:ContractDocumentReference",
        Children::new()
            .push(Node::text("cbc:ID", r.id.as_str()))
            .opt(Node::opt_text("cbc:DocumentType", r.document_type.as_ref()))
            .into_vec(),
    )
}

fn additional_reference(r: &AdditionalDocumentReference) -> Node {
    let attachment = r.attachment.as_ref().map(|a| {
        let inner = match a {
            Attachment::Embedded {
                mime_code,
                filename,
                content,
            } => Node::text("cbc:EmbeddedDocumentBinaryObject", content.as_str())
                .attr("mimeCode", mime_code.as_str())
                .attr("filename", filename.as_str()),
            Attachment::External { uri } => Node::parent(
                "cac:ExternalReference",
                vec![Node::text("cbc:URI", uri.as_str())],
            ),
        };
        Node::parent("cac:Attachment", vec![inner])
    });

    Node::parent(
        "cac:AdditionalDocumentReference",
        Children::new()
            .push(Node::text("cbc:ID", r.id.as_str()))
            .opt(Node::opt_text("cbc:DocumentType", r.document_type.as_ref()))
            .opt(Node::opt_text("cbc:DocumentDescription", r.description.as_ref()))
            .opt(attachment)
            .into_vec(),
    )
}

/// Supplier then customer; for orders, buyer (customer) then seller (supplier).
fn parties(d: &Document, t: &KindTags) -> Result<Vec<Node>, CodecError> {
    let supplier = d
        .supplier
        .as_ref()
        .ok_or_else(|| CodecError::MissingRequired("supplier party".into()))?;
    let customer = d
        .customer
        .as_ref()
        .ok_or_else(|| CodecError::MissingRequired("customer party".into()))?;

    let (first, second) = match d.kind {
        DocumentKind::Order => (customer, supplier),
        DocumentKind::Invoice | DocumentKind::CreditNote => (supplier, customer),
    };

    Ok(vec![
        Node::parent(t.first_party, vec![party(first)]),
        Node::parent(t.second_party, vec![party(second)]),
    ])
}

fn party(p: &Party) -> Node {
    let identifiers = p.identifiers.iter().filter_map(|ident| {
        Node::opt_text("cbc:ID", Some(&ident.id))
            .map(|id| id.opt_attr("schemeID", ident.scheme.as_deref()))
            .map(|id| Node::parent("cac:PartyIdentification", vec![id]))
    });

    let contact = p.contact.as_ref().and_then(|c| {
        Node::group(
            "cac:Contact",
            Children::new()
                .opt(Node::opt_text("cbc:Name", c.name.as_ref()))
                .opt(Node::opt_text("cbc:Telephone", c.telephone.as_ref()))
                .opt(Node::opt_text("cbc:ElectronicMail", c.email.as_ref()))
                .into_vec(),
        )
    });

    Node::parent(
        "cac:Party",
        Children::new()
            .extend(identifiers)
            .push(Node::parent(
                "cac:PartyName",
                vec![Node::text("cbc:Name", p.name.as_str())],
            ))
            .push(Node::parent(
                "cac:PostalAddress",
                address(&p.postal_address),
            ))
            .opt(contact)
            .extend(endpoint_block(p))
            .into_vec(),
    )
}

/// Routing endpoint and tax scheme; rendered only for a complete endpoint.
fn endpoint_block(p: &Party) -> Vec<Node> {
    let Some(endpoint) = p.endpoint.as_ref().filter(|e| e.is_complete()) else {
        return Vec::new();
    };
    let scheme = p.tax_scheme.clone().unwrap_or_else(TaxScheme::vat);

    vec![
        Node::text("cbc:EndpointID", endpoint.value.as_str())
            .attr("schemeID", endpoint.scheme.as_str()),
        Node::parent("cac:PartyTaxScheme", vec![tax_scheme(&scheme)]),
    ]
}

fn address(a: &Address) -> Vec<Node> {
    let country = Node::parent(
        "cac:Country",
        Children::new()
            .push(Node::text("cbc:IdentificationCode", a.country_code.as_str()))
            .opt(Node::opt_text("cbc:Name", a.country_name.as_ref()))
            .into_vec(),
    );

    Children::new()
        .opt(Node::opt_text("cbc:StreetName", a.street.as_ref()))
        .opt(Node::opt_text(
            "cbc:AdditionalStreetName",
            a.additional_street.as_ref(),
        ))
        .opt(Node::opt_text("cbc:CityName", a.city.as_ref()))
        .opt(Node::opt_text("cbc:PostalZone", a.postal_zone.as_ref()))
        .opt(Node::opt_text(
            "cbc:CountrySubentity",
            a.country_subentity.as_ref(),
        ))
        .push(country)
        .into_vec()
}

fn delivery(d: &Document, _: &KindTags) -> Result<Vec<Node>, CodecError> {
    let Some(delivery) = &d.delivery else {
        return Ok(Vec::new());
    };

    let location = delivery
        .location
        .as_ref()
        .map(|a| Node::parent("cac:DeliveryLocation", vec![Node::parent("cac:Address", address(a))]));
    let party = Node::opt_text("cbc:Name", delivery.party_name.as_ref()).map(|name| {
        Node::parent(
            "cac:DeliveryParty",
            vec![Node::parent("cac:PartyName", vec![name])],
        )
    });

    Ok(Node::group(
        "cac:Delivery",
        Children::new()
            .opt(Node::opt_text(
                "cbc:ActualDeliveryDate",
                delivery.actual_delivery_date.as_ref(),
            ))
            .opt(location)
            .opt(party)
            .into_vec(),
    )
    .into_iter()
    .collect())
}

fn payment_terms(d: &Document, _: &KindTags) -> Result<Vec<Node>, CodecError> {
    Ok(d
        .payment_terms
        .as_ref()
        .and_then(|t| Node::opt_text("cbc:Note", Some(&t.note)))
        .map(|note| Node::parent("cac:PaymentTerms", vec![note]))
        .into_iter()
        .collect())
}

fn tax_totals(d: &Document, _: &KindTags) -> Result<Vec<Node>, CodecError> {
    Ok(d.tax_totals.iter().map(tax_total).collect())
}

fn tax_total(t: &TaxTotal) -> Node {
    let subtotals = t.subtotals.iter().map(|s| {
        Node::parent(
            "cac:TaxSubtotal",
            vec![
                Node::amount("cbc:TaxableAmount", &s.taxable_amount),
                Node::amount("cbc:TaxAmount", &s.tax_amount),
                tax_category("cac:TaxCategory", &s.category),
            ],
        )
    });

    Node::parent(
        "cac:TaxTotal",
        Children::new()
            .push(Node::amount("cbc:TaxAmount", &t.tax_amount))
            .extend(subtotals)
            .into_vec(),
    )
}

fn tax_category(name: &'static str, c: &TaxCategory) -> Node {
    Node::parent(
        name,
        Children::new()
            .push(Node::text("cbc:ID", c.code.code()))
            .opt(c.percent.map(|p| Node::decimal("cbc:Percent", p)))
            .push(tax_scheme(&c.scheme))
            .into_vec(),
    )
}

fn tax_scheme(s: &TaxScheme) -> Node {
    Node::parent(
        "cac:TaxScheme",
        Children::new()
            .push(Node::text("cbc:ID", s.id.as_str()))
            .opt(Node::opt_text("cbc:Name", s.name.as_ref()))
            .into_vec(),
    )
}

fn monetary_total(d: &Document, _: &KindTags) -> Result<Vec<Node>, CodecError> {
    let total = d
        .monetary_total
        .as_ref()
        .ok_or_else(|| CodecError::MissingRequired("monetary total".into()))?;

    Ok(vec![Node::parent(
        "cac:LegalMonetaryTotal",
        Children::new()
            .push(Node::amount(
                "cbc:LineExtensionAmount",
                &total.line_extension_amount,
            ))
            .push(Node::amount(
                "cbc:TaxExclusiveAmount",
                &total.tax_exclusive_amount,
            ))
            .push(Node::amount(
                "cbc:TaxInclusiveAmount",
                &total.tax_inclusive_amount,
            ))
            .opt(
                total
                    .prepaid_amount
                    .as_ref()
                    .map(|p| Node::amount("cbc:PrepaidAmount", p)),
            )
            .push(Node::amount("cbc:PayableAmount", &total.payable_amount))
            .into_vec(),
    )])
}

fn lines(d: &Document, t: &KindTags) -> Result<Vec<Node>, CodecError> {
    if d.lines.is_empty() {
        return Err(CodecError::MissingRequired("at least one line item".into()));
    }
    Ok(d.lines.iter().map(|l| line(l, t)).collect())
}

fn line(l: &LineItem, t: &KindTags) -> Node {
    let sellers_id = Node::opt_text("cbc:ID", l.item.sellers_item_id.as_ref())
        .map(|id| Node::parent("cac:SellersItemIdentification", vec![id]));

    let item = Node::parent(
        "cac:Item",
        Children::new()
            .push(Node::text("cbc:Description", l.item.description.as_str()))
            .opt(Node::opt_text("cbc:Name", l.item.name.as_ref()))
            .opt(sellers_id)
            .opt(
                l.item
                    .tax_category
                    .as_ref()
                    .map(|c| tax_category("cac:ClassifiedTaxCategory", c)),
            )
            .into_vec(),
    );

    Node::parent(
        t.line,
        Children::new()
            .push(Node::text("cbc:ID", l.id.as_str()))
            .opt(Node::opt_text("cbc:Note", l.note.as_ref()))
            .push(Node::quantity(t.quantity, &l.quantity))
            .push(Node::amount(
                "cbc:LineExtensionAmount",
                &l.line_extension_amount,
            ))
            .push(item)
            .push(Node::parent(
                "cac:Price",
                vec![Node::amount("cbc:PriceAmount", &l.price)],
            ))
            .into_vec(),
    )
}

fn notes(d: &Document, _: &KindTags) -> Result<Vec<Node>, CodecError> {
    Ok(d.notes
        .iter()
        .filter_map(|n| Node::opt_text("cbc:Note", Some(n)))
        .collect())
}

fn trailing(d: &Document, _: &KindTags) -> Result<Vec<Node>, CodecError> {
    Ok(Children::new()
        .opt(Node::opt_text("cbc:BuyerReference", d.buyer_reference.as_ref()))
        .opt(Node::opt_text("cbc:AccountingCost", d.accounting_cost.as_ref()))
        .into_vec())
}
