// Prediction service access: the `PredictionService` seam and its reqwest
// implementation.

pub mod client;

pub use client::{HttpPredictionClient, PredictError, PredictionService, FALLBACK_ERROR_MESSAGE};
