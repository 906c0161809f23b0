//! Delivery boundary: hand a finished UBL document to a delivery network.
//!
//! The codec is pure; this module is the only place that performs I/O.
//! [`DocumentTransport`] is the seam. [`HttpTransport`] is a plain JSON-over-HTTP
//! implementation; tests and embedding applications can supply their own.
//!
//! Transports own their timeout policy. Nothing here retries.
//!
//! # Example
//!
//! ```no_run
//! # async fn run(document: ubldoc::core::Document) -> Result<(), ubldoc::transport::DeliveryError> {
//! use ubldoc::transport::{HttpTransport, TransportConfig, deliver};
//!
//! let transport = HttpTransport::new(TransportConfig {
//!     base_url: "https://ap.example.com/api".into(),
//!     api_key: Some("secret".into()),
//!     ..TransportConfig::default()
//! })?;
//! let receipt = deliver(&transport, &document).await?;
//! println!("submitted as {}", receipt.submission_id);
//! # Ok(())
//! # }
//! ```

mod http;

pub use http::{HttpTransport, TransportConfig};

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{CodecError, Document, DocumentKind, EndpointId};
use crate::ubl::{GeneratedDocument, generate_checked};

/// Wire syntax of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Ubl,
}

/// Everything a transport needs to route and deliver one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub document_type: DocumentKind,
    pub document_format: DocumentFormat,
    /// Complete XML document.
    pub payload: String,
    pub recipient: EndpointId,
}

/// Acknowledgement returned by the delivery network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub submission_id: String,
    pub status: Option<String>,
}

/// Failure reported by a transport.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// Connection, TLS or timeout failure.
    #[error("transport network error: {0}")]
    Network(String),

    /// The delivery network answered with a non-success status.
    #[error("delivery rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The response could not be understood.
    #[error("transport response parse error: {0}")]
    Parse(String),
}

/// Failure of [`preflight`] or [`deliver`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeliveryError {
    /// Validation or generation failed; nothing was sent.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The receiving party has no complete routing endpoint.
    #[error("recipient party has no routable endpoint (scheme and value required)")]
    MissingRecipient,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A delivery network client.
pub trait DocumentTransport {
    fn send(
        &self,
        request: DeliveryRequest,
    ) -> impl Future<Output = Result<DeliveryReceipt, TransportError>> + Send;
}

/// Outcome of [`preflight`]: the routing endpoint and the document to send.
#[derive(Debug, Clone)]
pub struct Preflight {
    pub recipient: EndpointId,
    pub generated: GeneratedDocument,
}

impl Preflight {
    /// The request [`deliver`] hands to the transport.
    pub fn into_request(self) -> DeliveryRequest {
        DeliveryRequest {
            document_type: self.generated.kind,
            document_format: DocumentFormat::Ubl,
            payload: self.generated.xml,
            recipient: self.recipient,
        }
    }
}

/// Dry run before sending: resolve the receiving party's endpoint, then
/// validate and generate.
///
/// # Errors
///
/// `DeliveryError::Codec` for validation or generation failures,
/// `DeliveryError::MissingRecipient` when the receiving party's endpoint is
/// absent or incomplete.
pub fn preflight(document: &Document) -> Result<Preflight, DeliveryError> {
    let recipient = recipient(document)?;
    let generated = generate_checked(document)?;
    debug!(id = %generated.id, warnings = generated.warnings.len(), "preflight passed");
    Ok(Preflight {
        recipient,
        generated,
    })
}

/// Preflight `document`, then hand it to `transport`.
pub async fn deliver<T: DocumentTransport>(
    transport: &T,
    document: &Document,
) -> Result<DeliveryReceipt, DeliveryError> {
    let checked = preflight(document)?;
    let id = checked.generated.id.clone();

    let receipt = transport.send(checked.into_request()).await?;
    info!(
        id = %id,
        submission = %receipt.submission_id,
        "document delivered"
    );
    Ok(receipt)
}

/// Orders travel to the supplier; invoices and credit notes to the customer.
fn recipient(document: &Document) -> Result<EndpointId, DeliveryError> {
    let party = match document.kind {
        DocumentKind::Order => document.supplier.as_ref(),
        DocumentKind::Invoice | DocumentKind::CreditNote => document.customer.as_ref(),
    };
    party
        .and_then(|c| c.endpoint.clone())
        .filter(EndpointId::is_complete)
        .ok_or(DeliveryError::MissingRecipient)
}
