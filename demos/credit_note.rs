use chrono::NaiveDate;
use rust_decimal_macros::dec;
use ubldoc::core::*;
use ubldoc::ubl;

fn main() {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

    // Partial credit for one returned unit of an earlier invoice
    let credit_note = DocumentBuilder::credit_note("CN-2024-001", date(2024, 2, 1))
        .supplier(
            PartyBuilder::new(
                "Acme Corp",
                AddressBuilder::new("Berlin", "10115", "DE").build(),
            )
            .endpoint("9930", "DE123456789")
            .build(),
        )
        .customer(
            PartyBuilder::new(
                "Client Ltd",
                AddressBuilder::new("Vienna", "1010", "AT").build(),
            )
            .endpoint("9914", "ATU12345678")
            .build(),
        )
        .billing_reference(BillingReference::new("INV-2024-001").issued(date(2024, 1, 15)))
        .add_line(
            LineItemBuilder::new("1", "Setup fee (refund)", dec!(1), "C62", dec!(500))
                .tax(TaxCategory::standard(dec!(19)))
                .note("Duplicate charge")
                .build(),
        )
        .note("Credit for duplicate setup fee")
        .build();

    let mut credit_note = match credit_note {
        Ok(doc) => doc,
        Err(CodecError::Validation(report)) => {
            for issue in &report.errors {
                eprintln!("error: {issue}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    apply_tax_totals(&mut credit_note).expect("amounts are in range");

    match ubl::generate_checked(&credit_note) {
        Ok(generated) => println!("{}", generated.xml),
        Err(e) => eprintln!("generation failed: {e}"),
    }
}
