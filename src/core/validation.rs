use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use super::countries::{is_known_country_code, is_plausible_country_code};
use super::currencies::{is_known_currency_code, is_plausible_currency_code, minor_units};
use super::error::{ValidationIssue, ValidationReport};
use super::totals::{checked_sum, line_extension, round_half_up, sum_line_extensions};
use super::types::*;
use super::units::is_known_unit_code;

/// Validate a document against structural and business-rule invariants.
///
/// Never mutates the document and never fails: every problem is reported in
/// the returned [`ValidationReport`]. Errors are blocking by convention,
/// warnings are advisory.
pub fn validate(document: &Document) -> ValidationReport {
    let mut report = ValidationReport::default();

    // BR-02: document identifier
    if document.id.trim().is_empty() {
        report.error(ValidationIssue::with_rule(
            "id",
            "document ID must not be empty",
            "BR-02",
        ));
    }

    validate_issue_date(document, &mut report);
    validate_currency(&document.currency_code, &mut report);

    match &document.supplier {
        Some(party) => validate_party(party, "supplier", &mut report),
        None => report.error(ValidationIssue::with_rule(
            "supplier",
            "supplier party is required",
            "BR-06",
        )),
    }
    match &document.customer {
        Some(party) => validate_party(party, "customer", &mut report),
        None => report.error(ValidationIssue::with_rule(
            "customer",
            "customer party is required",
            "BR-07",
        )),
    }

    // BR-16: at least one line
    if document.lines.is_empty() {
        report.error(ValidationIssue::with_rule(
            "lines",
            "document must have at least one line item",
            "BR-16",
        ));
    }

    let mut seen = HashSet::new();
    for (i, line) in document.lines.iter().enumerate() {
        validate_line(line, i, &document.currency_code, &mut report);
        if !line.id.trim().is_empty() && !seen.insert(line.id.as_str()) {
            report.error(ValidationIssue::new(
                format!("lines[{i}].id"),
                format!("duplicate line identifier '{}'", line.id),
            ));
        }
    }

    match &document.monetary_total {
        Some(total) => {
            validate_monetary_total(total, &document.currency_code, &mut report);
            validate_arithmetic(document, total, &mut report);
        }
        None => report.error(ValidationIssue::new(
            "monetary_total",
            "monetary total is required",
        )),
    }

    for (i, tax_total) in document.tax_totals.iter().enumerate() {
        if tax_total.tax_amount.value.is_sign_negative() {
            report.error(ValidationIssue::new(
                format!("tax_totals[{i}].tax_amount"),
                "tax amount must not be negative",
            ));
        }
    }

    validate_references(document, &mut report);

    if let Some(delivery) = &document.delivery {
        if let Some(date) = &delivery.actual_delivery_date {
            if parse_iso_date(date).is_none() {
                report.error(ValidationIssue::new(
                    "delivery.actual_delivery_date",
                    format!("delivery date '{date}' must be a valid YYYY-MM-DD date"),
                ));
            }
        }
        if let Some(location) = &delivery.location {
            validate_country(&location.country_code, "delivery.location", &mut report);
        }
    }

    if document.kind == DocumentKind::Order {
        if !document.tax_totals.is_empty() {
            report.warn(ValidationIssue::new(
                "tax_totals",
                "orders do not carry tax totals; they will not be rendered",
            ));
        }
        if document.payment_terms.is_some() {
            report.warn(ValidationIssue::new(
                "payment_terms",
                "orders do not carry payment terms; they will not be rendered",
            ));
        }
    }

    report
}

fn validate_issue_date(document: &Document, report: &mut ValidationReport) {
    // BR-03: issue date
    if document.issue_date.trim().is_empty() {
        report.error(ValidationIssue::with_rule(
            "issue_date",
            "issue date must not be empty",
            "BR-03",
        ));
    } else if parse_iso_date(&document.issue_date).is_none() {
        report.error(ValidationIssue::with_rule(
            "issue_date",
            format!(
                "issue date '{}' must be a valid calendar date in YYYY-MM-DD format",
                document.issue_date
            ),
            "BR-03",
        ));
    }

    if let Some(time) = &document.issue_time {
        if NaiveTime::parse_from_str(time, "%H:%M:%S").is_err() {
            report.error(ValidationIssue::new(
                "issue_time",
                format!("issue time '{time}' must be in HH:MM:SS format"),
            ));
        }
    }
}

/// Strict `YYYY-MM-DD`: exactly ten characters, dashes in place, real date.
pub(crate) fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn validate_currency(code: &str, report: &mut ValidationReport) {
    // BR-05: currency code
    if code.trim().is_empty() {
        report.error(ValidationIssue::with_rule(
            "currency_code",
            "currency code must not be empty",
            "BR-05",
        ));
    } else if !is_plausible_currency_code(code) {
        report.error(ValidationIssue::with_rule(
            "currency_code",
            format!("currency code '{code}' must be 3 uppercase letters (ISO 4217)"),
            "BR-05",
        ));
    } else if !is_known_currency_code(code) {
        report.warn(ValidationIssue::new(
            "currency_code",
            format!("currency code '{code}' is not in the known ISO 4217 list"),
        ));
    }
}

fn validate_party(party: &Party, prefix: &str, report: &mut ValidationReport) {
    if party.name.trim().is_empty() {
        report.error(ValidationIssue::new(
            format!("{prefix}.name"),
            "party name must not be empty",
        ));
    }

    validate_country(
        &party.postal_address.country_code,
        &format!("{prefix}.postal_address"),
        report,
    );

    for (i, ident) in party.identifiers.iter().enumerate() {
        if ident.id.trim().is_empty() {
            report.warn(ValidationIssue::new(
                format!("{prefix}.identifiers[{i}].id"),
                "party identifier is empty and will not be rendered",
            ));
        }
    }

    if let Some(endpoint) = &party.endpoint {
        let has_scheme = !endpoint.scheme.trim().is_empty();
        let has_value = !endpoint.value.trim().is_empty();
        if has_scheme != has_value {
            report.warn(ValidationIssue::new(
                format!("{prefix}.endpoint"),
                "endpoint scheme and value must both be present; the endpoint will not be rendered",
            ));
        }
    }
}

fn validate_country(code: &str, prefix: &str, report: &mut ValidationReport) {
    if code.trim().is_empty() {
        report.error(ValidationIssue::with_rule(
            format!("{prefix}.country_code"),
            "country code must not be empty",
            "BR-09",
        ));
    } else if !is_plausible_country_code(code) {
        report.error(ValidationIssue::with_rule(
            format!("{prefix}.country_code"),
            format!("country code '{code}' must be 2 uppercase letters (ISO 3166-1 alpha-2)"),
            "BR-09",
        ));
    } else if !is_known_country_code(code) {
        report.warn(ValidationIssue::new(
            format!("{prefix}.country_code"),
            format!("country code '{code}' is not a known ISO 3166-1 alpha-2 code"),
        ));
    }
}

fn validate_line(line: &LineItem, index: usize, currency: &str, report: &mut ValidationReport) {
    let prefix = format!("lines[{index}]");

    if line.id.trim().is_empty() {
        report.error(ValidationIssue::with_rule(
            format!("{prefix}.id"),
            "line identifier must not be empty",
            "BR-21",
        ));
    }

    if line.quantity.value <= Decimal::ZERO {
        report.error(ValidationIssue::new(
            format!("{prefix}.quantity"),
            format!("quantity must be greater than zero, got {}", line.quantity.value),
        ));
    }

    match &line.quantity.unit_code {
        None => report.warn(ValidationIssue::new(
            format!("{prefix}.quantity.unit_code"),
            "unit code is missing",
        )),
        Some(unit) if !is_known_unit_code(unit) => report.warn(ValidationIssue::new(
            format!("{prefix}.quantity.unit_code"),
            format!("unit code '{unit}' is not a known UN/ECE Rec 20 code"),
        )),
        Some(_) => {}
    }

    if line.line_extension_amount.value.is_sign_negative() {
        report.error(ValidationIssue::new(
            format!("{prefix}.line_extension_amount"),
            "line extension amount must not be negative",
        ));
    }

    if line.price.value.is_sign_negative() {
        report.error(ValidationIssue::new(
            format!("{prefix}.price"),
            "unit price must not be negative",
        ));
    }

    if line.item.description.trim().is_empty() {
        report.error(ValidationIssue::new(
            format!("{prefix}.item.description"),
            "item description must not be empty",
        ));
    }

    if line.item.tax_category.is_none() {
        report.warn(ValidationIssue::new(
            format!("{prefix}.item.tax_category"),
            "tax category is missing",
        ));
    }

    match line_extension(line.quantity.value, line.price.value) {
        Ok(product) => {
            let expected = round_half_up(product, 2);
            if round_half_up(line.line_extension_amount.value, 2) != expected {
                report.warn(ValidationIssue::new(
                    format!("{prefix}.line_extension_amount"),
                    format!(
                        "line extension amount {} differs from quantity × price {}",
                        line.line_extension_amount.value, expected
                    ),
                ));
            }
        }
        Err(err) => report.error(ValidationIssue::new(
            format!("{prefix}.line_extension_amount"),
            err.to_string(),
        )),
    }

    check_currency(
        &line.line_extension_amount,
        &format!("{prefix}.line_extension_amount"),
        currency,
        report,
    );
    check_currency(&line.price, &format!("{prefix}.price"), currency, report);
}

fn validate_monetary_total(total: &MonetaryTotal, currency: &str, report: &mut ValidationReport) {
    let mut fields = vec![
        ("line_extension_amount", &total.line_extension_amount),
        ("tax_exclusive_amount", &total.tax_exclusive_amount),
        ("tax_inclusive_amount", &total.tax_inclusive_amount),
        ("payable_amount", &total.payable_amount),
    ];
    if let Some(prepaid) = &total.prepaid_amount {
        fields.push(("prepaid_amount", prepaid));
    }

    for (name, amount) in fields {
        let field = format!("monetary_total.{name}");
        if amount.value.is_sign_negative() {
            report.error(ValidationIssue::new(
                field.clone(),
                format!("{name} must not be negative, got {}", amount.value),
            ));
        }
        check_currency(amount, &field, currency, report);
    }

    if let Some(units) = minor_units(currency) {
        let scale = total.payable_amount.value.normalize().scale();
        if scale > units {
            report.warn(ValidationIssue::new(
                "monetary_total.payable_amount",
                format!(
                    "payable amount {} has more decimals than {currency} settles in ({units})",
                    total.payable_amount.value
                ),
            ));
        }
    }
}

/// Cross-document sums, compared at two decimal places.
fn validate_arithmetic(document: &Document, total: &MonetaryTotal, report: &mut ValidationReport) {
    if document.lines.is_empty() {
        return;
    }

    // BR-CO-10: sum of line net amounts
    match sum_line_extensions(&document.lines) {
        Ok(sum) => {
            let lines = round_half_up(sum, 2);
            if round_half_up(total.line_extension_amount.value, 2) != lines {
                report.error(ValidationIssue::with_rule(
                    "monetary_total.line_extension_amount",
                    format!(
                        "line extension total {} does not match sum of line amounts {}",
                        total.line_extension_amount.value, lines
                    ),
                    "BR-CO-10",
                ));
            }
        }
        Err(err) => report.error(ValidationIssue::with_rule(
            "monetary_total.line_extension_amount",
            err.to_string(),
            "BR-CO-10",
        )),
    }

    // BR-CO-15: tax inclusive = tax exclusive + tax
    let sums = checked_sum(
        document.tax_totals.iter().map(|t| t.tax_amount.value),
        "tax total",
    )
    .and_then(|tax| {
        let inclusive = checked_sum([total.tax_exclusive_amount.value, tax], "tax inclusive amount")?;
        Ok((tax, round_half_up(inclusive, 2)))
    });
    let (tax, expected_inclusive) = match sums {
        Ok(sums) => sums,
        Err(err) => {
            report.error(ValidationIssue::with_rule(
                "monetary_total.tax_inclusive_amount",
                err.to_string(),
                "BR-CO-15",
            ));
            return;
        }
    };
    if round_half_up(total.tax_inclusive_amount.value, 2) != expected_inclusive {
        report.error(ValidationIssue::with_rule(
            "monetary_total.tax_inclusive_amount",
            format!(
                "tax inclusive amount {} does not match tax exclusive {} + tax {}",
                total.tax_inclusive_amount.value, total.tax_exclusive_amount.value, tax
            ),
            "BR-CO-15",
        ));
    }

    // BR-CO-16: payable = tax inclusive - prepaid
    let prepaid = total
        .prepaid_amount
        .as_ref()
        .map(|p| p.value)
        .unwrap_or(Decimal::ZERO);
    let Some(expected_payable) = total.tax_inclusive_amount.value.checked_sub(prepaid) else {
        report.error(ValidationIssue::with_rule(
            "monetary_total.payable_amount",
            "payable amount overflows",
            "BR-CO-16",
        ));
        return;
    };
    let expected_payable = round_half_up(expected_payable, 2);
    if round_half_up(total.payable_amount.value, 2) != expected_payable {
        report.error(ValidationIssue::with_rule(
            "monetary_total.payable_amount",
            format!(
                "payable amount {} does not match tax inclusive {} - prepaid {}",
                total.payable_amount.value, total.tax_inclusive_amount.value, prepaid
            ),
            "BR-CO-16",
        ));
    }
}

fn check_currency(
    amount: &MonetaryAmount,
    field: &str,
    document_currency: &str,
    report: &mut ValidationReport,
) {
    if amount.currency.trim().is_empty() {
        report.warn(ValidationIssue::new(field, "currency ID is missing"));
    } else if !document_currency.trim().is_empty() && amount.currency != document_currency {
        report.warn(ValidationIssue::new(
            field,
            format!(
                "currency '{}' differs from document currency '{}'",
                amount.currency, document_currency
            ),
        ));
    }
}

fn validate_references(document: &Document, report: &mut ValidationReport) {
    for (i, reference) in document.references.iter().enumerate() {
        let field = format!("references[{i}]");
        let (id, date) = match reference {
            DocumentReference::Order(r) => (&r.id, r.issue_date.as_ref()),
            DocumentReference::Billing(r) => (&r.invoice_id, r.issue_date.as_ref()),
            DocumentReference::Contract(r) => (&r.id, None),
            DocumentReference::Additional(r) => (&r.id, None),
        };
        if id.trim().is_empty() {
            report.error(ValidationIssue::new(
                format!("{field}.id"),
                "referenced document ID must not be empty",
            ));
        }
        if let Some(date) = date {
            if parse_iso_date(date).is_none() {
                report.error(ValidationIssue::new(
                    format!("{field}.issue_date"),
                    format!("reference issue date '{date}' must be a valid YYYY-MM-DD date"),
                ));
            }
        }
    }

    match document.kind {
        DocumentKind::CreditNote if document.billing_reference().is_none() => {
            report.warn(ValidationIssue::new(
                "references",
                "credit note has no billing reference to the original invoice",
            ));
        }
        DocumentKind::Order if !document.references.is_empty() => {
            report.warn(ValidationIssue::new(
                "references",
                "orders do not carry document references; they will not be rendered",
            ));
        }
        _ => {}
    }
}
