//! Monetary aggregation helpers.
//!
//! The basic aggregation used by [`DocumentBuilder`](super::DocumentBuilder)
//! never separates tax. Tax-aware totals are a separate, explicit step:
//! [`apply_tax_totals`].
//!
//! All arithmetic is checked. Amounts near the `Decimal` range limit yield
//! [`CodecError::Arithmetic`] instead of panicking.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use super::error::CodecError;
use super::types::*;

/// Net line amount: `quantity × unit_price`.
pub fn line_extension(quantity: Decimal, unit_price: Decimal) -> Result<Decimal, CodecError> {
    quantity
        .checked_mul(unit_price)
        .ok_or_else(|| overflow(format!("{quantity} × {unit_price}")))
}

/// Sum of the line extension amounts of `lines`.
pub fn sum_line_extensions(lines: &[LineItem]) -> Result<Decimal, CodecError> {
    checked_sum(lines.iter().map(|l| l.line_extension_amount.value), "sum of line amounts")
}

/// Monetary total from the line sum alone.
///
/// The sum becomes line-extension, tax-exclusive and tax-inclusive amount;
/// the payable amount is that sum minus `prepaid`.
pub fn basic_monetary_total(
    lines: &[LineItem],
    currency: &str,
    prepaid: Option<Decimal>,
) -> Result<MonetaryTotal, CodecError> {
    let sum = sum_line_extensions(lines)?;
    let payable = sum
        .checked_sub(prepaid.unwrap_or(Decimal::ZERO))
        .ok_or_else(|| overflow("payable amount".into()))?;

    Ok(MonetaryTotal {
        line_extension_amount: MonetaryAmount::new(sum, currency),
        tax_exclusive_amount: MonetaryAmount::new(sum, currency),
        tax_inclusive_amount: MonetaryAmount::new(sum, currency),
        prepaid_amount: prepaid.map(|p| MonetaryAmount::new(p, currency)),
        payable_amount: MonetaryAmount::new(payable, currency),
    })
}

/// Compute tax from the lines' tax categories and rewrite the document's
/// tax total and monetary total accordingly.
///
/// Lines are grouped by tax category; each group's tax is
/// `taxable × percent / 100` rounded half-up to two decimals. Lines without a
/// tax category or percent contribute zero tax. An existing prepaid amount is
/// kept and subtracted from the new tax-inclusive amount.
///
/// On overflow the document is left untouched.
pub fn apply_tax_totals(document: &mut Document) -> Result<(), CodecError> {
    let currency = document.currency_code.clone();

    let mut groups: BTreeMap<GroupKey, (TaxCategory, Decimal)> = BTreeMap::new();
    for line in &document.lines {
        let Some(category) = &line.item.tax_category else {
            continue;
        };
        let entry = groups
            .entry(GroupKey::from(category))
            .or_insert_with(|| (category.clone(), Decimal::ZERO));
        entry.1 = entry
            .1
            .checked_add(line.line_extension_amount.value)
            .ok_or_else(|| overflow(format!("taxable amount of category {}", category.code.code())))?;
    }

    let mut subtotals = Vec::with_capacity(groups.len());
    let mut tax_sum = Decimal::ZERO;
    for (category, taxable) in groups.into_values() {
        let percent = category.percent.unwrap_or(Decimal::ZERO);
        let tax = taxable
            .checked_mul(percent)
            .and_then(|t| t.checked_div(Decimal::ONE_HUNDRED))
            .map(|t| round_half_up(t, 2))
            .ok_or_else(|| overflow(format!("tax of category {}", category.code.code())))?;
        tax_sum = tax_sum
            .checked_add(tax)
            .ok_or_else(|| overflow("tax total".into()))?;
        subtotals.push(TaxSubtotal {
            taxable_amount: MonetaryAmount::new(taxable, currency.as_str()),
            tax_amount: MonetaryAmount::new(tax, currency.as_str()),
            category,
        });
    }

    let line_sum = sum_line_extensions(&document.lines)?;
    let prepaid = document
        .monetary_total
        .as_ref()
        .and_then(|t| t.prepaid_amount.as_ref())
        .map(|p| p.value);
    let inclusive = line_sum
        .checked_add(tax_sum)
        .ok_or_else(|| overflow("tax inclusive amount".into()))?;
    let payable = inclusive
        .checked_sub(prepaid.unwrap_or(Decimal::ZERO))
        .ok_or_else(|| overflow("payable amount".into()))?;

    debug!(
        id = %document.id,
        subtotals = subtotals.len(),
        tax = %tax_sum,
        "applied tax totals"
    );

    document.tax_totals = vec![TaxTotal {
        tax_amount: MonetaryAmount::new(tax_sum, currency.as_str()),
        subtotals,
    }];
    document.monetary_total = Some(MonetaryTotal {
        line_extension_amount: MonetaryAmount::new(line_sum, currency.as_str()),
        tax_exclusive_amount: MonetaryAmount::new(line_sum, currency.as_str()),
        tax_inclusive_amount: MonetaryAmount::new(inclusive, currency.as_str()),
        prepaid_amount: prepaid.map(|p| MonetaryAmount::new(p, currency.as_str())),
        payable_amount: MonetaryAmount::new(payable, currency.as_str()),
    });
    Ok(())
}

/// Sum with overflow detection; `what` names the quantity in the error.
pub(crate) fn checked_sum(
    values: impl IntoIterator<Item = Decimal>,
    what: &str,
) -> Result<Decimal, CodecError> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or_else(|| overflow(what.to_string()))
}

fn overflow(what: String) -> CodecError {
    CodecError::Arithmetic(format!("{what} overflows"))
}

/// Grouping key with a deterministic order: category code, then percent,
/// then scheme.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    code: TaxCategoryCode,
    percent: Option<Decimal>,
    scheme: String,
}

impl From<&TaxCategory> for GroupKey {
    fn from(category: &TaxCategory) -> Self {
        Self {
            code: category.code,
            percent: category.percent.map(|p| p.normalize()),
            scheme: category.scheme.id.clone(),
        }
    }
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
