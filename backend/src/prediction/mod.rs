//! Pass-through client for the external prediction service.
//!
//! The inbound body is checked for a `known_symptoms` field and then
//! forwarded byte-for-byte. The upstream status, content type and body are
//! relayed back unchanged.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;

/// Fixed timeout for one round trip to the prediction service.
pub const PREDICTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Content type used when the upstream response does not carry one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Field the inbound payload must carry.
pub const KNOWN_SYMPTOMS_FIELD: &str = "known_symptoms";

/// Rejections of an inbound prediction request.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PredictionRequestError {
    #[error("Could not read body")]
    MalformedJson,
    #[error("Could not read known_symptoms in the request body.")]
    MissingKnownSymptoms,
}

/// Failures while talking to the prediction service.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    /// The outbound request could not be built locally.
    #[error("failed to build prediction request: {0}")]
    Build(String),
    /// Connecting, sending or waiting for the upstream failed.
    #[error("prediction service unreachable: {0}")]
    Upstream(String),
    /// The upstream answered but its body could not be read.
    #[error("failed to read prediction response: {0}")]
    UpstreamBody(String),
}

impl PredictionError {
    /// Whether the failure happened while contacting the upstream.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::UpstreamBody(_))
    }
}

/// Response relayed back to the caller.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

/// Check that `body` is a JSON object carrying a non-null `known_symptoms`.
///
/// The field's contents are not inspected further.
pub fn validate_prediction_request(body: &[u8]) -> Result<(), PredictionRequestError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| PredictionRequestError::MalformedJson)?;
    match value.get(KNOWN_SYMPTOMS_FIELD) {
        Some(v) if !v.is_null() => Ok(()),
        _ => Err(PredictionRequestError::MissingKnownSymptoms),
    }
}

/// HTTP client bound to one prediction endpoint.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    /// Build a client for `endpoint` with the fixed timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PredictionError> {
        Self::with_timeout(endpoint, PREDICTION_TIMEOUT)
    }

    /// Build a client with a custom timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PredictionError::Build(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `body` verbatim and capture the upstream reply.
    pub async fn forward(&self, body: Bytes) -> Result<UpstreamResponse, PredictionError> {
        let request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, DEFAULT_CONTENT_TYPE)
            .body(body)
            .build()
            .map_err(|e| PredictionError::Build(e.to_string()))?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| PredictionError::Upstream(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| PredictionError::UpstreamBody(e.to_string()))?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_object_or_array_symptoms() {
        assert!(validate_prediction_request(br#"{"known_symptoms":["fever"]}"#).is_ok());
        assert!(validate_prediction_request(br#"{"known_symptoms":{"fever":1}}"#).is_ok());
    }

    #[test]
    fn test_missing_or_null_symptoms_rejected() {
        assert_eq!(
            validate_prediction_request(br#"{"other":1}"#),
            Err(PredictionRequestError::MissingKnownSymptoms)
        );
        assert_eq!(
            validate_prediction_request(br#"{"known_symptoms":null}"#),
            Err(PredictionRequestError::MissingKnownSymptoms)
        );
        assert_eq!(
            validate_prediction_request(b"[1,2]"),
            Err(PredictionRequestError::MissingKnownSymptoms)
        );
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert_eq!(
            validate_prediction_request(b"{known_symptoms"),
            Err(PredictionRequestError::MalformedJson)
        );
    }

    #[test]
    fn test_error_classes() {
        assert!(!PredictionError::Build("x".into()).is_upstream());
        assert!(PredictionError::Upstream("x".into()).is_upstream());
        assert!(PredictionError::UpstreamBody("x".into()).is_upstream());
    }
}
