use chrono::NaiveDate;
use rust_decimal_macros::dec;
use ubldoc::core::*;
use ubldoc::ubl;

fn main() {
    // Two-line consulting invoice with VAT
    let mut invoice = DocumentBuilder::invoice(
        "INV-2024-001",
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
    )
    .supplier(
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
        .build(),
    )
    .customer(
        PartyBuilder::new(
            "Client Ltd",
            AddressBuilder::new("Vienna", "1010", "AT")
                .street("Stephansplatz 1")
                .build(),
        )
        .endpoint("9914", "ATU12345678")
        .build(),
    )
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
    .payment_terms("Payable within 30 days")
    .buyer_reference("PO-4711")
    .build()
    .expect("invoice should be valid");

    apply_tax_totals(&mut invoice).expect("amounts are in range");

    let generated = ubl::generate_checked(&invoice).expect("invoice should generate");
    for warning in &generated.warnings {
        eprintln!("warning: {warning}");
    }

    let total = invoice.monetary_total.as_ref().unwrap();
    println!("Invoice: {}", invoice.id);
    for line in &invoice.lines {
        let unit = line
            .quantity
            .unit_code
            .as_deref()
            .map(|code| unit_name(code).unwrap_or(code))
            .unwrap_or("-");
        println!(
            "  {} x {} ({unit}) = {}",
            line.quantity.value, line.item.description, line.line_extension_amount.value
        );
    }
    println!("Net:     {} {}", total.tax_exclusive_amount.value, invoice.currency_code);
    println!("Gross:   {} {}", total.tax_inclusive_amount.value, invoice.currency_code);
    println!("Due:     {} {}", total.payable_amount.value, invoice.currency_code);
    println!("---");
    println!("{}", generated.xml);
}
