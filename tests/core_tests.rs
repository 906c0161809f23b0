use chrono::{NaiveDate, NaiveTime};
use rust_decimal_macros::dec;
use ubldoc::core::*;

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
        AddressBuilder::new("London", "EC1A 1BB", "GB")
            .street("1 King Street")
            .build(),
    )
    .endpoint("0088", "5790000435975")
    .build()
}

// --- Builder ---

#[test]
fn invoice_with_two_lines_totals_1500() {
    let doc = DocumentBuilder::invoice("INV-2024-001", date(2024, 1, 15))
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
        .unwrap();

    assert_eq!(doc.kind, DocumentKind::Invoice);
    assert_eq!(doc.type_code, "380");
    assert_eq!(doc.currency_code, "EUR");
    assert_eq!(doc.issue_date, "2024-01-15");

    let total = doc.monetary_total.as_ref().unwrap();
    assert_eq!(total.line_extension_amount.value, dec!(1500));
    assert_eq!(total.tax_exclusive_amount.value, dec!(1500));
    assert_eq!(total.tax_inclusive_amount.value, dec!(1500));
    assert_eq!(total.payable_amount.value, dec!(1500));
    assert_eq!(total.payable_amount.currency, "EUR");
    assert!(doc.tax_totals.is_empty());
}

#[test]
fn default_type_codes_per_kind() {
    assert_eq!(DocumentKind::Invoice.default_type_code(), "380");
    assert_eq!(DocumentKind::CreditNote.default_type_code(), "381");
    assert_eq!(DocumentKind::Order.default_type_code(), "220");
}

#[test]
fn type_code_override_and_issue_time() {
    let doc = DocumentBuilder::invoice("INV-2", date(2024, 2, 1))
        .type_code("389")
        .issue_time(NaiveTime::from_hms_opt(9, 5, 0).unwrap())
        .supplier(supplier())
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "Item", dec!(1), "C62", dec!(1)).build())
        .build_unchecked()
        .unwrap();
    assert_eq!(doc.type_code, "389");
    assert_eq!(doc.issue_time.as_deref(), Some("09:05:00"));
}

#[test]
fn build_unchecked_requires_parties_and_lines() {
    let err = DocumentBuilder::invoice("INV-3", date(2024, 1, 1))
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "Item", dec!(1), "C62", dec!(1)).build())
        .build_unchecked()
        .unwrap_err();
    assert!(matches!(err, CodecError::Builder(_)));

    let err = DocumentBuilder::invoice("INV-3", date(2024, 1, 1))
        .supplier(supplier())
        .customer(customer())
        .build_unchecked()
        .unwrap_err();
    assert!(err.to_string().contains("line item"));
}

#[test]
fn build_returns_all_validation_errors() {
    let err = DocumentBuilder::invoice("", date(2024, 1, 1))
        .currency("euro")
        .supplier(supplier())
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "Item", dec!(0), "C62", dec!(5)).build())
        .build()
        .unwrap_err();

    match err {
        CodecError::Validation(report) => {
            assert!(report.errors.len() >= 3, "{report}");
            assert!(report.errors.iter().any(|e| e.field == "id"));
            assert!(report.errors.iter().any(|e| e.field == "currency_code"));
            assert!(report.errors.iter().any(|e| e.field == "lines[0].quantity"));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn prepaid_reduces_payable() {
    let doc = DocumentBuilder::invoice("INV-4", date(2024, 3, 1))
        .supplier(supplier())
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "Deposit job", dec!(4), "C62", dec!(250)).build())
        .prepaid(dec!(300))
        .build()
        .unwrap();
    let total = doc.monetary_total.unwrap();
    assert_eq!(total.payable_amount.value, dec!(700));
    assert_eq!(total.prepaid_amount.unwrap().value, dec!(300));
}

#[test]
fn line_builder_computes_net_amount() {
    let line = LineItemBuilder::new("7", "Bolts", dec!(12.5), "KGM", dec!(3.20))
        .currency("USD")
        .name("M8 bolts")
        .sellers_item_id("B-M8")
        .note("galvanised")
        .build();
    assert_eq!(line.line_extension_amount.value, dec!(40.00));
    assert_eq!(line.line_extension_amount.currency, "USD");
    assert_eq!(line.price.value, dec!(3.20));
    assert_eq!(line.quantity.unit_code.as_deref(), Some("KGM"));
    assert_eq!(line.item.sellers_item_id.as_deref(), Some("B-M8"));
}

#[test]
fn address_builder_blank_city_becomes_none() {
    let address = AddressBuilder::new("", " ", "NL").build();
    assert!(address.city.is_none());
    assert!(address.postal_zone.is_none());
    assert_eq!(address.country_code, "NL");
}

#[test]
fn credit_note_carries_billing_reference() {
    let doc = DocumentBuilder::credit_note("CN-1", date(2024, 4, 2))
        .supplier(supplier())
        .customer(customer())
        .billing_reference(BillingReference::new("INV-2024-001").issued(date(2024, 1, 15)))
        .add_line(
            LineItemBuilder::new("1", "Returned goods", dec!(2), "C62", dec!(40))
                .tax(TaxCategory::standard(dec!(19)))
                .build(),
        )
        .build()
        .unwrap();
    let billing = doc.billing_reference().unwrap();
    assert_eq!(billing.invoice_id, "INV-2024-001");
    assert_eq!(billing.issue_date.as_deref(), Some("2024-01-15"));
    assert_eq!(doc.type_code, "381");
}

// --- Tax totals ---

#[test]
fn apply_tax_totals_is_explicit() {
    let mut doc = DocumentBuilder::invoice("INV-5", date(2024, 5, 1))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineItemBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(100))
                .tax(TaxCategory::standard(dec!(19)))
                .build(),
        )
        .add_line(
            LineItemBuilder::new("2", "Books", dec!(2), "C62", dec!(25))
                .tax(TaxCategory::reduced(dec!(7)))
                .build(),
        )
        .add_line(
            LineItemBuilder::new("3", "Export", dec!(1), "C62", dec!(80))
                .tax(TaxCategory::zero_percent(TaxCategoryCode::Zero))
                .build(),
        )
        .build()
        .unwrap();

    apply_tax_totals(&mut doc).unwrap();

    let tax = &doc.tax_totals[0];
    assert_eq!(tax.subtotals.len(), 3);
    // 1000 * 19% + 50 * 7% + 80 * 0%
    assert_eq!(tax.tax_amount.value, dec!(193.50));

    let total = doc.monetary_total.as_ref().unwrap();
    assert_eq!(total.line_extension_amount.value, dec!(1130));
    assert_eq!(total.tax_inclusive_amount.value, dec!(1323.50));
    assert_eq!(total.payable_amount.value, dec!(1323.50));
    assert!(validate(&doc).is_valid());
}

#[test]
fn apply_tax_totals_keeps_prepaid() {
    let mut doc = DocumentBuilder::invoice("INV-6", date(2024, 5, 1))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineItemBuilder::new("1", "Work", dec!(1), "C62", dec!(100))
                .tax(TaxCategory::standard(dec!(20)))
                .build(),
        )
        .prepaid(dec!(20))
        .build()
        .unwrap();
    apply_tax_totals(&mut doc).unwrap();
    let total = doc.monetary_total.as_ref().unwrap();
    assert_eq!(total.tax_inclusive_amount.value, dec!(120));
    assert_eq!(total.payable_amount.value, dec!(100));
}

// --- Code lists ---

#[test]
fn code_lists() {
    assert!(is_known_currency_code("EUR"));
    assert!(!is_known_currency_code("XXX1"));
    assert!(is_known_country_code("GB"));
    assert!(!is_known_country_code("ZZ"));
    assert!(is_known_unit_code("HUR"));
    assert!(is_known_unit_code("C62"));
    assert_eq!(unit_name("DAY"), Some("Day"));
    assert_eq!(minor_units("NOK"), Some(2));
}

#[test]
fn tax_category_codes_round_trip() {
    for code in ["S", "AA", "E", "Z", "AE", "O"] {
        assert_eq!(TaxCategoryCode::from_code(code).unwrap().code(), code);
    }
    assert!(TaxCategoryCode::from_code("Q").is_none());
}

#[test]
fn document_serializes_to_json() {
    let doc = DocumentBuilder::order("PO-1", date(2024, 6, 1))
        .supplier(supplier())
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "Paper", dec!(5), "C62", dec!(4.99)).build())
        .build()
        .unwrap();
    let json = serde_json::to_string(&doc).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, "PO-1");
    assert_eq!(back.kind, DocumentKind::Order);
    assert_eq!(back.lines[0].line_extension_amount.value, dec!(24.95));
}
