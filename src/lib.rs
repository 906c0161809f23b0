//! # ubldoc
//!
//! Structured business documents (UBL 2.1 Invoice, CreditNote and Order):
//! a typed document model, builders, a validator that separates blocking
//! errors from warnings, and deterministic XML generation.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use ubldoc::core::*;
//!
//! let invoice = DocumentBuilder::invoice("INV-2024-001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
//!     .supplier(PartyBuilder::new("Acme Corp", AddressBuilder::new("Berlin", "10115", "DE").build()).build())
//!     .customer(PartyBuilder::new("Client Ltd", AddressBuilder::new("London", "EC1A 1BB", "GB").build()).build())
//!     .add_line(LineItemBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(100))
//!         .tax(TaxCategory::standard(dec!(19))).build())
//!     .add_line(LineItemBuilder::new("2", "Setup", dec!(1), "C62", dec!(500))
//!         .tax(TaxCategory::standard(dec!(19))).build())
//!     .build()
//!     .unwrap();
//!
//! assert!(validate(&invoice).is_valid());
//! assert_eq!(invoice.monetary_total.as_ref().unwrap().payable_amount.value, dec!(1500));
//!
//! # #[cfg(feature = "ubl")]
//! # {
//! let xml = ubldoc::ubl::generate(&invoice).unwrap();
//! assert!(xml.contains("<cbc:ID>INV-2024-001</cbc:ID>"));
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Document model, builders, totals, validation |
//! | `ubl` (default) | UBL 2.1 XML generation |
//! | `transport` | Delivery adapter trait and HTTP access-point client |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "ubl")]
pub mod ubl;

#[cfg(feature = "transport")]
pub mod transport;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
