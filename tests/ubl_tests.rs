#![cfg(feature = "ubl")]

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal_macros::dec;
use ubldoc::core::*;
use ubldoc::ubl::{self, ns};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn supplier() -> Party {
    PartyBuilder::new(
        "Acme Corp",
        AddressBuilder::new("Berlin", "10115", "DE")
            .street("Friedrichstraße 123")
            .build(),
    )
    .identifier("DE123456789", Some("VA"))
    .endpoint("9930", "DE123456789")
    .contact(
        Some("Jane Doe".into()),
        Some("+49 30 12345".into()),
        Some("billing@acme.example".into()),
    )
    .build()
}

fn customer() -> Party {
    PartyBuilder::new(
        "Client Ltd",
        AddressBuilder::new("London", "EC1A 1BB", "GB").build(),
    )
    .endpoint("0088", "5790000435975")
    .build()
}

fn invoice() -> Document {
    DocumentBuilder::invoice("INV-2024-001", date(2024, 1, 15))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineItemBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(100))
                .tax(TaxCategory::standard(dec!(19)))
                .build(),
        )
        .add_line(
            LineItemBuilder::new("2", "Setup fee", dec!(1), "C62", dec!(500))
                .tax(TaxCategory::standard(dec!(19)))
                .build(),
        )
        .build()
        .unwrap()
}

/// Parse `xml` and return the start/empty element names in document order.
/// Panics if the XML is not well-formed.
fn element_names(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut names = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                names.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap());
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("not well-formed at {}: {e}", reader.buffer_position()),
        }
    }
    names
}

/// All unescaped text nodes.
fn texts(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut out = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Text(t) => out.push(t.unescape().unwrap().into_owned()),
            Event::Eof => break,
            _ => {}
        }
    }
    out
}

/// Unescaped text of every `name` element, in document order.
fn element_texts(xml: &str, name: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut inside = false;
    let mut out = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => inside = e.name().as_ref() == name.as_bytes(),
            Event::End(_) => inside = false,
            Event::Text(t) if inside => out.push(t.unescape().unwrap().into_owned()),
            Event::Eof => break,
            _ => {}
        }
    }
    out
}

fn count(names: &[String], name: &str) -> usize {
    names.iter().filter(|n| *n == name).count()
}

fn position(names: &[String], name: &str) -> usize {
    names
        .iter()
        .position(|n| n == name)
        .unwrap_or_else(|| panic!("{name} not found"))
}

// --- Invoice ---

#[test]
fn invoice_basic_structure() {
    let xml = ubl::generate(&invoice()).unwrap();

    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.contains("<cbc:ID>INV-2024-001</cbc:ID>"));
    assert!(xml.contains("<cbc:IssueDate>2024-01-15</cbc:IssueDate>"));
    assert!(xml.contains("<cbc:InvoiceTypeCode>380</cbc:InvoiceTypeCode>"));
    assert!(xml.contains("<cbc:DocumentCurrencyCode>EUR</cbc:DocumentCurrencyCode>"));
    assert!(xml.contains(r#"<cbc:PayableAmount currencyID="EUR">1500.00</cbc:PayableAmount>"#));
    assert!(xml.contains(r#"<cbc:InvoicedQuantity unitCode="HUR">10.00</cbc:InvoicedQuantity>"#));

    let names = element_names(&xml);
    assert_eq!(names[0], "Invoice");
    assert_eq!(count(&names, "cac:InvoiceLine"), 2);
    assert_eq!(count(&names, "cac:LegalMonetaryTotal"), 1);
}

#[test]
fn root_declares_namespaces() {
    let xml = ubl::generate(&invoice()).unwrap();
    for (prefix, uri) in [
        ("xmlns", ns::INVOICE),
        ("xmlns:cac", ns::CAC),
        ("xmlns:cbc", ns::CBC),
        ("xmlns:ccts", ns::CCTS),
        ("xmlns:qdt", ns::QDT),
        ("xmlns:udt", ns::UDT),
    ] {
        assert!(xml.contains(&format!(r#"{prefix}="{uri}""#)), "missing {prefix}");
    }
}

#[test]
fn root_element_order() {
    let mut doc = DocumentBuilder::invoice("INV-7", date(2024, 3, 1))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineItemBuilder::new("1", "Work", dec!(1), "C62", dec!(100))
                .tax(TaxCategory::standard(dec!(20)))
                .build(),
        )
        .order_reference(OrderReference::new("PO-77"))
        .contract_reference(ContractDocumentReference::new("CT-1"))
        .delivery(Delivery {
            actual_delivery_date: Some("2024-02-28".into()),
            ..Delivery::default()
        })
        .payment_terms("Net 30")
        .note("Thank you")
        .buyer_reference("BR-42")
        .accounting_cost("CC-9")
        .build()
        .unwrap();
    apply_tax_totals(&mut doc).unwrap();

    let xml = ubl::generate(&doc).unwrap();
    let names = element_names(&xml);

    let expected = [
        "cbc:IssueDate",
        "cbc:InvoiceTypeCode",
        "cbc:DocumentCurrencyCode",
        "cac:OrderReference",
        "cac:ContractDocumentReference",
        "cac:AccountingSupplierParty",
        "cac:AccountingCustomerParty",
        "cac:Delivery",
        "cac:PaymentTerms",
        "cac:TaxTotal",
        "cac:LegalMonetaryTotal",
        "cac:InvoiceLine",
        "cbc:BuyerReference",
        "cbc:AccountingCost",
    ];
    let positions: Vec<usize> = expected.iter().map(|n| position(&names, n)).collect();
    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "out of order: {positions:?}"
    );

    // Document notes come after the lines.
    let last_line = names.iter().rposition(|n| n == "cac:InvoiceLine").unwrap();
    let last_note = names.iter().rposition(|n| n == "cbc:Note").unwrap();
    assert!(last_note > last_line);
}

#[test]
fn tax_total_rendered_after_apply() {
    let mut doc = invoice();
    apply_tax_totals(&mut doc).unwrap();
    let xml = ubl::generate(&doc).unwrap();
    assert!(xml.contains(r#"<cbc:TaxAmount currencyID="EUR">285.00</cbc:TaxAmount>"#));
    assert!(xml.contains(r#"<cbc:TaxableAmount currencyID="EUR">1500.00</cbc:TaxableAmount>"#));
    assert!(xml.contains(r#"<cbc:TaxInclusiveAmount currencyID="EUR">1785.00</cbc:TaxInclusiveAmount>"#));
    assert!(xml.contains("<cbc:Percent>19.00</cbc:Percent>"));
}

#[test]
fn no_tax_total_without_tax_data() {
    let xml = ubl::generate(&invoice()).unwrap();
    assert!(!xml.contains("cac:TaxTotal"));
}

// --- Credit note ---

#[test]
fn credit_note_billing_reference() {
    let doc = DocumentBuilder::credit_note("CN-2024-001", date(2024, 2, 1))
        .supplier(supplier())
        .customer(customer())
        .billing_reference(BillingReference::new("INV-2024-001").issued(date(2024, 1, 15)))
        .add_line(
            LineItemBuilder::new("1", "Refund consulting", dec!(2), "HUR", dec!(100))
                .tax(TaxCategory::standard(dec!(19)))
                .build(),
        )
        .build()
        .unwrap();

    let xml = ubl::generate(&doc).unwrap();
    let names = element_names(&xml);

    assert_eq!(names[0], "CreditNote");
    assert!(xml.contains(&format!(r#"xmlns="{}""#, ns::CREDIT_NOTE)));
    assert!(xml.contains("<cbc:CreditNoteTypeCode>381</cbc:CreditNoteTypeCode>"));
    assert!(xml.contains(
        "<cac:BillingReference>\n    <cac:InvoiceDocumentReference>\n      <cbc:ID>INV-2024-001</cbc:ID>"
    ));
    assert_eq!(count(&names, "cac:CreditNoteLine"), 1);
    assert_eq!(count(&names, "cbc:CreditedQuantity"), 1);
    assert!(position(&names, "cac:BillingReference") < position(&names, "cac:AccountingSupplierParty"));
}

// --- Order ---

#[test]
fn order_uses_order_tags() {
    let doc = DocumentBuilder::order("PO-2024-001", date(2024, 4, 1))
        .supplier(supplier())
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "Paper A4", dec!(10), "C62", dec!(4.50)).build())
        .note("Deliver to loading dock")
        .build()
        .unwrap();

    let xml = ubl::generate(&doc).unwrap();
    let names = element_names(&xml);

    assert_eq!(names[0], "Order");
    assert!(xml.contains(&format!(r#"xmlns="{}""#, ns::ORDER)));
    assert!(xml.contains("<cbc:OrderTypeCode>220</cbc:OrderTypeCode>"));
    assert_eq!(count(&names, "cac:OrderLine"), 1);
    assert_eq!(count(&names, "cbc:OrderedQuantity"), 1);
    assert!(position(&names, "cac:BuyerCustomerParty") < position(&names, "cac:SellerSupplierParty"));
    assert_eq!(count(&names, "cac:LegalMonetaryTotal"), 1);
    assert_eq!(count(&names, "cac:TaxTotal"), 0);
}

// --- Escaping and optional blocks ---

#[test]
fn special_characters_are_escaped() {
    let mut doc = invoice();
    if let Some(s) = doc.supplier.as_mut() {
        s.name = r#"Widgets & "Co." <Ltd>"#.into();
    }
    doc.notes.push("O'Brien's 5 > 3 & 2 < 4".into());

    let xml = ubl::generate(&doc).unwrap();
    assert!(xml.contains("Widgets &amp; &quot;Co.&quot; &lt;Ltd&gt;"));
    assert!(!xml.contains("<Ltd>"));

    // Parses back to the original text.
    let texts = texts(&xml);
    assert!(texts.iter().any(|t| t == r#"Widgets & "Co." <Ltd>"#));
    assert!(texts.iter().any(|t| t == "O'Brien's 5 > 3 & 2 < 4"));
}

#[test]
fn line_description_is_escaped() {
    let mut doc = invoice();
    doc.lines[0].item.description = r#"Widgets & "Co." <Ltd>"#.into();

    let xml = ubl::generate(&doc).unwrap();
    assert!(xml.contains("<cbc:Description>Widgets &amp; &quot;Co.&quot; &lt;Ltd&gt;</cbc:Description>"));
    assert_eq!(
        element_texts(&xml, "cbc:Description"),
        vec![r#"Widgets & "Co." <Ltd>"#.to_string(), "Setup fee".to_string()]
    );
}

#[test]
fn control_characters_are_dropped() {
    let mut doc = invoice();
    doc.notes.push("bell\u{7}char".into());
    doc.lines[0].item.description = "tab\tand\u{1B}escape".into();

    let xml = ubl::generate(&doc).unwrap();
    assert!(!xml.contains('\u{7}'));
    assert!(!xml.contains('\u{1B}'));
    assert!(texts(&xml).iter().any(|t| t == "bellchar"));
    assert_eq!(element_texts(&xml, "cbc:Description")[0], "tab\tandescape");
}

#[test]
fn contact_omitted_when_absent() {
    let xml = ubl::generate(&invoice()).unwrap();
    let names = element_names(&xml);
    // Only the supplier has a contact.
    assert_eq!(count(&names, "cac:Contact"), 1);
}

#[test]
fn contact_with_only_telephone() {
    let mut doc = invoice();
    if let Some(c) = doc.customer.as_mut() {
        c.contact = Some(Contact {
            name: None,
            telephone: Some("+44 20 7946 0000".into()),
            email: None,
        });
    }
    let xml = ubl::generate(&doc).unwrap();
    assert!(xml.contains(
        "<cac:Contact>\n        <cbc:Telephone>+44 20 7946 0000</cbc:Telephone>\n      </cac:Contact>"
    ));
}

#[test]
fn empty_contact_is_omitted() {
    let mut doc = invoice();
    if let Some(c) = doc.customer.as_mut() {
        c.contact = Some(Contact::default());
    }
    let names = element_names(&ubl::generate(&doc).unwrap());
    assert_eq!(count(&names, "cac:Contact"), 1);
}

#[test]
fn endpoint_rendered_with_scheme() {
    let xml = ubl::generate(&invoice()).unwrap();
    assert!(xml.contains(r#"<cbc:EndpointID schemeID="9930">DE123456789</cbc:EndpointID>"#));
    assert!(xml.contains(r#"<cbc:EndpointID schemeID="0088">5790000435975</cbc:EndpointID>"#));
    assert!(xml.contains(r#"<cbc:ID schemeID="VA">DE123456789</cbc:ID>"#));
}

#[test]
fn attachment_reference() {
    let mut doc = invoice();
    doc.references.push(DocumentReference::Additional(AdditionalDocumentReference {
        id: "TS-1".into(),
        document_type: None,
        description: Some("Timesheet".into()),
        attachment: Some(Attachment::Embedded {
            mime_code: "application/pdf".into(),
            filename: "timesheet.pdf".into(),
            content: "JVBERi0xLjQ=".into(),
        }),
    }));
    let xml = ubl::generate(&doc).unwrap();
    assert!(xml.contains(
        r#"<cbc:EmbeddedDocumentBinaryObject mimeCode="application/pdf" filename="timesheet.pdf">JVBERi0xLjQ=</cbc:EmbeddedDocumentBinaryObject>"#
    ));
    assert!(xml.contains("<cbc:DocumentDescription>Timesheet</cbc:DocumentDescription>"));
}

// --- Determinism and errors ---

#[test]
fn generation_is_deterministic() {
    let doc = invoice();
    let a = ubl::generate(&doc).unwrap();
    let b = ubl::generate(&doc.clone()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn missing_supplier_fails_fast() {
    let mut doc = invoice();
    doc.supplier = None;
    assert!(matches!(ubl::generate(&doc), Err(CodecError::MissingRequired(_))));
}

#[test]
fn missing_total_fails_fast() {
    let mut doc = invoice();
    doc.monetary_total = None;
    let err = ubl::generate(&doc).unwrap_err();
    assert!(err.to_string().contains("monetary total"));
}

#[test]
fn garbage_in_still_well_formed() {
    let mut doc = invoice();
    doc.id = String::new();
    doc.issue_date = "not a date".into();
    doc.currency_code = "<bad>".into();
    let xml = ubl::generate(&doc).unwrap();
    element_names(&xml);
    assert!(xml.contains("<cbc:DocumentCurrencyCode>&lt;bad&gt;</cbc:DocumentCurrencyCode>"));
}

// --- Composed API ---

#[test]
fn generate_checked_returns_warnings() {
    let doc = DocumentBuilder::credit_note("CN-5", date(2024, 5, 5))
        .supplier(supplier())
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "Item", dec!(1), "C62", dec!(10)).build())
        .build()
        .unwrap();
    let generated = ubl::generate_checked(&doc).unwrap();
    assert_eq!(generated.kind, DocumentKind::CreditNote);
    assert_eq!(generated.id, "CN-5");
    // No billing reference, no tax category.
    assert_eq!(generated.warnings.len(), 2);
    assert!(generated.xml.contains("<cbc:ID>CN-5</cbc:ID>"));
}

#[test]
fn generate_checked_refuses_invalid() {
    let mut doc = invoice();
    doc.lines[0].quantity.value = dec!(0);
    match ubl::generate_checked(&doc) {
        Err(CodecError::Validation(report)) => {
            assert!(report.errors.iter().any(|e| e.field == "lines[0].quantity"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn tree_is_inspectable() {
    let tree = ubl::to_tree(&invoice()).unwrap();
    let ids: Vec<_> = tree
        .find_all("cac:InvoiceLine")
        .iter()
        .flat_map(|l| l.find_all("cbc:ID"))
        .filter_map(|n| n.text_value())
        .collect();
    // Per line: line ID, tax category ID, tax scheme ID.
    assert_eq!(ids, vec!["1", "S", "VAT", "2", "S", "VAT"]);
}
