// Shared message types: the prediction service wire format, the tri-state
// prediction result, and the channel messages exchanged between the
// application loop and a UI.

use serde::{Deserialize, Serialize};

use crate::input::InputState;

// ---------------------------------------------------------------------------
// Prediction service wire format
// ---------------------------------------------------------------------------

/// One ranked next-token candidate as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Raw subword token; may start with a leading-space marker.
    pub token: String,
    pub probability: f64,
}

impl Candidate {
    pub fn new(token: impl Into<String>, probability: f64) -> Self {
        Candidate {
            token: token.into(),
            probability,
        }
    }
}

/// JSON body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictRequest {
    pub text: String,
    pub top_k: u8,
    pub temperature: f64,
}

impl PredictRequest {
    /// Build a request body; the text is sent trimmed.
    pub fn new(text: &str, top_k: u8, temperature: f64) -> Self {
        PredictRequest {
            text: text.trim().to_string(),
            top_k,
            temperature,
        }
    }
}

/// JSON body returned by `POST /predict`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    /// The text the service actually scored (after its own preprocessing).
    #[serde(default)]
    pub input: Option<String>,
    /// Absent or `null` both mean "no candidates".
    #[serde(default)]
    pub predictions: Option<Vec<Candidate>>,
}

impl PredictResponse {
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.predictions.unwrap_or_default()
    }
}

/// JSON body returned by the `GET /` health check.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// PredictionResult
// ---------------------------------------------------------------------------

/// Lifecycle of the most recent prediction request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PredictionResult {
    #[default]
    Idle,
    Loading,
    Success(Vec<Candidate>),
    Error(String),
}

impl PredictionResult {
    pub fn is_loading(&self) -> bool {
        matches!(self, PredictionResult::Loading)
    }

    /// Candidates of a successful result, empty otherwise.
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            PredictionResult::Success(items) => items,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PredictionResult::Error(message) => Some(message),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Service status
// ---------------------------------------------------------------------------

/// Reachability of the prediction service, as last checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

// ---------------------------------------------------------------------------
// App <-> UI channel messages
// ---------------------------------------------------------------------------

/// Full view of the controller pushed to the UI after every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub input: InputState,
    pub result: PredictionResult,
}

impl Snapshot {
    /// Mirrors the disabled-submit rule: no submit while loading or blank.
    pub fn can_submit(&self) -> bool {
        !self.result.is_loading() && self.input.has_text()
    }
}

/// Updates pushed from the application loop to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Snapshot(Box<Snapshot>),
    ServiceStatus(ServiceStatus),
}

/// Commands sent from the UI to the application loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    SetText(String),
    SetTopK(u8),
    SetTemperature(f64),
    Submit,
    ApplySuggestion { token: String },
    Clear,
    CheckService,
    Quit,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
