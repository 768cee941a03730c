// HTTP client for the next-token prediction service.
//
// One `POST {base}/predict` per request: the JSON body carries the trimmed
// text and sampling parameters, the response is a ranked candidate list.
// Failures are folded into `PredictError`, whose display string is what the
// UI shows in the error state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

use nextword_core::config::{Config, ServiceConfig};
use nextword_core::protocol::{Candidate, HealthResponse, PredictRequest, PredictResponse};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Shown when a failure carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to fetch predictions. Please try again.";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a prediction round trip failed. Every variant is surfaced to the user
/// the same way, as its display string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// Network failure: connection refused, DNS, TLS, timeout, reset.
    #[error("{0}")]
    Transport(String),

    /// The service answered with a non-2xx status. `reason` is the canonical
    /// phrase and is empty for statuses that have none.
    #[error("API error: {status}{}", reason_suffix(.reason))]
    Http { status: u16, reason: String },

    /// The body was not the expected JSON shape.
    #[error("{0}")]
    Parse(String),
}

fn reason_suffix(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(" {reason}")
    }
}

impl PredictError {
    fn from_status(status: StatusCode) -> Self {
        PredictError::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    /// Human-readable message for the error state, never empty.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for PredictError {
    fn from(err: reqwest::Error) -> Self {
        PredictError::Transport(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// PredictionService
// ---------------------------------------------------------------------------

/// Anything that can answer prediction requests. The app holds this as a
/// trait object so tests can swap in scripted services.
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Fetch ranked candidates for the request, in service order.
    async fn predict(&self, request: &PredictRequest) -> Result<Vec<Candidate>, PredictError>;

    /// Probe the service root. Returns the reported status string.
    async fn health_check(&self) -> Result<String, PredictError>;
}

// ---------------------------------------------------------------------------
// HttpPredictionClient
// ---------------------------------------------------------------------------

/// reqwest-backed prediction service client.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    predict_url: String,
    health_url: String,
}

impl HttpPredictionClient {
    /// Build a client for the given service settings.
    pub fn new(service: &ServiceConfig) -> Result<Self, PredictError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = service.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(HttpPredictionClient {
            http: builder.build()?,
            predict_url: service.predict_url(),
            health_url: service.health_url(),
        })
    }

    /// Build a client from the application config.
    pub fn from_config(config: &Config) -> Result<Self, PredictError> {
        Self::new(&config.service)
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(&self, request: &PredictRequest) -> Result<Vec<Candidate>, PredictError> {
        debug!(
            top_k = request.top_k,
            temperature = request.temperature,
            chars = request.text.len(),
            "POST {}",
            self.predict_url
        );

        let response = self
            .http
            .post(&self.predict_url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("prediction service returned {status}");
            return Err(PredictError::from_status(status));
        }

        let body = response.bytes().await?;
        let parsed = parse_predict_body(&body)?;
        if let Some(input) = &parsed.input {
            debug!(input = %input, "service scored input");
        }
        Ok(parsed.into_candidates())
    }

    async fn health_check(&self) -> Result<String, PredictError> {
        let response = self.http.get(&self.health_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PredictError::from_status(status));
        }
        let body = response.bytes().await?;
        // Any 2xx counts as up; the status text is informational.
        let reported = serde_json::from_slice::<HealthResponse>(&body)
            .ok()
            .and_then(|h| h.status)
            .unwrap_or_else(|| "ok".to_string());
        Ok(reported)
    }
}

/// Decode a `/predict` response body.
pub(crate) fn parse_predict_body(body: &[u8]) -> Result<PredictResponse, PredictError> {
    serde_json::from_slice(body).map_err(|e| PredictError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
