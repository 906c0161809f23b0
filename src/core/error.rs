use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building or rendering documents.
///
/// Bad business data is never reported through this type directly; it is
/// collected in a [`ValidationReport`]. `Validation` wraps such a report when
/// an operation refuses to proceed because of it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The validator reported blocking errors.
    #[error("validation failed: {0}")]
    Validation(ValidationReport),

    /// Required structure is absent (e.g. no supplier party at render time).
    #[error("missing required structure: {0}")]
    MissingRequired(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// XML writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// An amount computation left the `Decimal` range.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
}

/// A single validation finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dot-separated path to the field (e.g. "supplier.postal_address.country_code").
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// EN 16931 business rule ID if applicable (e.g. "BR-02").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationIssue {
    /// Create an issue without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create an issue with an EN 16931 rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

/// Outcome of [`validate`](crate::core::validate): blocking errors and
/// advisory warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// No blocking errors. Warnings do not affect validity.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error messages as plain strings.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Warning messages as plain strings.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    pub(crate) fn error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    pub(crate) fn warn(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = self
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&msg)
    }
}
