//! ISO 4217 currency codes with their minor units.
//!
//! Illustrative allow-list of currencies seen on the delivery network. An
//! unlisted but well-formed code is reported as a warning, never an error.

/// Check whether `code` is a listed ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    lookup(code).is_some()
}

/// Three uppercase ASCII letters.
pub fn is_plausible_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Number of decimal places the currency is settled in (`JPY` → 0,
/// `EUR` → 2, `JOD` → 3), or `None` for an unlisted code.
pub fn minor_units(code: &str) -> Option<u32> {
    lookup(code).map(|(_, units)| units)
}

fn lookup(code: &str) -> Option<(&'static str, u32)> {
    CURRENCIES
        .binary_search_by_key(&code, |(c, _)| c)
        .ok()
        .map(|i| CURRENCIES[i])
}

/// `(code, minor units)`, sorted by code for binary search.
static CURRENCIES: &[(&str, u32)] = &[
    ("AED", 2),
    ("AMD", 2),
    ("AUD", 2),
    ("BGN", 2),
    ("BHD", 3),
    ("BRL", 2),
    ("CAD", 2),
    ("CHF", 2),
    ("CNY", 2),
    ("CZK", 2),
    ("DKK", 2),
    ("EGP", 2),
    ("EUR", 2),
    ("GBP", 2),
    ("GEL", 2),
    ("HKD", 2),
    ("HUF", 2),
    ("IDR", 2),
    ("ILS", 2),
    ("INR", 2),
    ("ISK", 0),
    ("JOD", 3),
    ("JPY", 0),
    ("KES", 2),
    ("KRW", 0),
    ("KWD", 3),
    ("KZT", 2),
    ("MXN", 2),
    ("MYR", 2),
    ("NGN", 2),
    ("NOK", 2),
    ("NZD", 2),
    ("PHP", 2),
    ("PLN", 2),
    ("RON", 2),
    ("SAR", 2),
    ("SEK", 2),
    ("SGD", 2),
    ("THB", 2),
    ("TRY", 2),
    ("TWD", 2),
    ("UAH", 2),
    ("USD", 2),
    ("VND", 0),
    ("ZAR", 2),
];
