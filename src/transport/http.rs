//! JSON-over-HTTP delivery client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DeliveryReceipt, DeliveryRequest, DocumentTransport, TransportError};

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Base URL of the delivery API; documents are POSTed to `{base_url}/documents`.
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    /// Whole-request timeout.
    #[serde(with = "secs")]
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Request body sent to the delivery API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    document_type: &'a str,
    document_format: super::DocumentFormat,
    payload: &'a str,
    recipient_scheme: &'a str,
    recipient_id: &'a str,
}

impl<'a> From<&'a DeliveryRequest> for SubmitRequest<'a> {
    fn from(r: &'a DeliveryRequest) -> Self {
        Self {
            document_type: r.document_type.as_str(),
            document_format: r.document_format,
            payload: &r.payload,
            recipient_scheme: &r.recipient.scheme,
            recipient_id: &r.recipient.value,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    #[serde(alias = "id")]
    submission_id: Option<String>,
    status: Option<String>,
}

/// HTTP delivery client. Cheap to clone; the underlying connection pool is
/// shared.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl HttpTransport {
    /// # Errors
    ///
    /// `TransportError::Network` if the HTTP client cannot be constructed.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/documents", self.config.base_url.trim_end_matches('/'))
    }
}

impl DocumentTransport for HttpTransport {
    async fn send(&self, request: DeliveryRequest) -> Result<DeliveryReceipt, TransportError> {
        let body = SubmitRequest::from(&request);

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        debug!(
            url = %self.endpoint(),
            kind = %request.document_type,
            recipient = %request.recipient,
            "submitting document"
        );

        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_receipt(&text)
    }
}

fn parse_receipt(body: &str) -> Result<DeliveryReceipt, TransportError> {
    let resp: SubmitResponse =
        serde_json::from_str(body).map_err(|e| TransportError::Parse(e.to_string()))?;
    let submission_id = resp
        .submission_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| TransportError::Parse("response has no submission id".into()))?;
    Ok(DeliveryReceipt {
        submission_id,
        status: resp.status,
    })
}
