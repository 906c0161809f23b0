//! Document model, builders, totals and validation.
//!
//! Everything in this module is pure and synchronous: no I/O, no shared
//! state. Documents can be built and validated from any number of threads.

mod builder;
pub mod countries;
pub mod currencies;
mod error;
mod totals;
mod types;
pub mod units;
mod validation;

pub use builder::*;
pub use countries::is_known_country_code;
pub use currencies::{is_known_currency_code, minor_units};
pub use error::*;
pub use totals::{apply_tax_totals, basic_monetary_total, line_extension, sum_line_extensions};
pub use types::*;
pub use units::{is_known_unit_code, unit_name};
pub use validation::validate;
