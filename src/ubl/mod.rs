//! UBL 2.1 XML generation for invoices, credit notes and orders.
//!
//! # Caller obligation
//!
//! [`generate`] does not validate. It fails only when required structure is
//! absent (supplier, customer, monetary total, lines); any other malformed
//! data is rendered as given, producing well-formed XML that may not be a
//! valid business document. Run [`validate`](crate::core::validate) first,
//! or use [`generate_checked`], which does both.
//!
//! # Example
//!
//! ```no_run
//! use ubldoc::core::*;
//! use ubldoc::ubl;
//!
//! let document: Document = todo!(); // build via DocumentBuilder
//! let generated = ubl::generate_checked(&document).unwrap();
//! println!("{}", generated.xml);
//! ```

mod document;
pub mod ir;
pub(crate) mod xml_utils;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::{CodecError, Document, DocumentKind, ValidationIssue, validate};

pub use document::to_tree;

/// UBL 2.1 namespace URIs.
pub mod ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CREDIT_NOTE: &str = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2";
    pub const ORDER: &str = "urn:oasis:names:specification:ubl:schema:xsd:Order-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
    pub const CCTS: &str = "urn:un:unece:uncefact:documentation:2";
    pub const QDT: &str = "urn:oasis:names:specification:ubl:schema:xsd:QualifiedDatatypes-2";
    pub const UDT: &str =
        "urn:un:unece:uncefact:data:specification:UnqualifiedDataTypesSchemaModule:2";
}

/// Output of [`generate_checked`].
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub xml: String,
    pub kind: DocumentKind,
    pub id: String,
    /// Validation warnings; they never block generation.
    pub warnings: Vec<ValidationIssue>,
}

/// Render `document` as a UBL 2.1 XML string.
///
/// Output is deterministic: the same document always yields the same bytes.
///
/// # Errors
///
/// `CodecError::MissingRequired` when supplier, customer, monetary total or
/// lines are absent.
pub fn generate(document: &Document) -> Result<String, CodecError> {
    let tree = to_tree(document)?;
    let xml = xml_utils::render(&tree)?;
    debug!(
        kind = %document.kind,
        id = %document.id,
        lines = document.lines.len(),
        bytes = xml.len(),
        "generated UBL document"
    );
    Ok(xml)
}

/// Validate, then generate.
///
/// # Errors
///
/// `CodecError::Validation` with the full report when validation finds
/// errors; otherwise the errors of [`generate`].
pub fn generate_checked(document: &Document) -> Result<GeneratedDocument, CodecError> {
    let report = validate(document);
    if !report.is_valid() {
        debug!(id = %document.id, errors = report.errors.len(), "validation failed");
        return Err(CodecError::Validation(report));
    }
    for issue in &report.warnings {
        warn!(id = %document.id, "{issue}");
    }

    let xml = generate(document)?;
    Ok(GeneratedDocument {
        xml,
        kind: document.kind,
        id: document.id.clone(),
        warnings: report.warnings,
    })
}
