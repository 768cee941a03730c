// Prediction interaction controller.
//
// Owns the input state and the prediction result, and is the only place
// either changes. A request is split in two halves so the event loop can run
// the network call on another task: `begin_request` moves the result to
// `Loading` and hands back a `PendingRequest`; `resolve` applies the outcome.
//
// Invariants:
// - `Success` and `Error` are only entered from `Loading`.
// - At most one request is tracked; starting another while `Loading` is
//   rejected with `RequestOutcome::Busy`.
// - A resolution for any generation but the latest is ignored.

use tracing::{debug, info, warn};

use nextword_client::{PredictError, PredictionService};
use nextword_core::config::Config;
use nextword_core::input::{clamp_temperature, clamp_top_k, InputState};
use nextword_core::protocol::{Candidate, PredictRequest, PredictionResult, Snapshot};
use nextword_core::suggestion;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// A request the caller must perform and then pass back to `resolve`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub generation: u64,
    pub request: PredictRequest,
}

/// What happened when a request was asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// Blank text: the result was forced to `Idle` and nothing was sent.
    Skipped,
    /// Another request is still loading; nothing changed.
    Busy,
    /// The result is now `Loading`.
    Started(PendingRequest),
}

// ---------------------------------------------------------------------------
// PredictionController
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PredictionController {
    input: InputState,
    result: PredictionResult,
    /// Incremented for every started request.
    generation: u64,
}

impl PredictionController {
    pub fn new(input: InputState) -> Self {
        PredictionController {
            input,
            result: PredictionResult::Idle,
            generation: 0,
        }
    }

    /// Start a session with the configured sampling parameters.
    pub fn from_config(config: &Config) -> Self {
        Self::new(InputState::with_params(
            config.sampling.top_k,
            config.sampling.temperature,
        ))
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn result(&self) -> &PredictionResult {
        &self.result
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            input: self.input.clone(),
            result: self.result.clone(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.result.is_loading() && self.input.has_text()
    }

    // -- Input state holder --

    /// Replace the text. Setting it to `""` also drops any result back to
    /// `Idle`. Returns `true` if anything observable changed.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let mut changed = self.input.set_text(text);
        if self.input.text.is_empty() && self.result != PredictionResult::Idle {
            self.result = PredictionResult::Idle;
            changed = true;
        }
        changed
    }

    pub fn set_top_k(&mut self, top_k: u8) -> bool {
        self.input.set_top_k(top_k)
    }

    pub fn set_temperature(&mut self, temperature: f64) -> bool {
        self.input.set_temperature(temperature)
    }

    /// Empty the text box (and with it the result).
    pub fn clear(&mut self) -> bool {
        self.set_text("")
    }

    // -- Request orchestrator --

    /// Start a request for `text` with explicit sampling parameters.
    pub fn begin_request(&mut self, text: &str, top_k: u8, temperature: f64) -> RequestOutcome {
        if text.trim().is_empty() {
            if self.result != PredictionResult::Idle {
                debug!("blank text, dropping result to idle");
            }
            self.result = PredictionResult::Idle;
            return RequestOutcome::Skipped;
        }

        if self.result.is_loading() {
            debug!(generation = self.generation, "request rejected, one already in flight");
            return RequestOutcome::Busy;
        }

        let temperature = clamp_temperature(temperature).unwrap_or(self.input.temperature);
        let request = PredictRequest::new(text, clamp_top_k(top_k), temperature);

        self.generation += 1;
        self.result = PredictionResult::Loading;
        info!(
            generation = self.generation,
            top_k = request.top_k,
            temperature = request.temperature,
            "prediction request started"
        );

        RequestOutcome::Started(PendingRequest {
            generation: self.generation,
            request,
        })
    }

    /// Start a request from the current input state.
    pub fn submit(&mut self) -> RequestOutcome {
        let text = self.input.text.clone();
        self.begin_request(&text, self.input.top_k, self.input.temperature)
    }

    /// Apply the outcome of a started request. Returns `true` if the result
    /// changed; stale or unexpected resolutions are dropped.
    pub fn resolve(
        &mut self,
        generation: u64,
        outcome: Result<Vec<Candidate>, PredictError>,
    ) -> bool {
        if generation != self.generation {
            debug!(
                "Discarding stale prediction (gen: {}, current gen: {})",
                generation, self.generation
            );
            return false;
        }
        if !self.result.is_loading() {
            debug!(generation, "prediction resolved after leaving loading state, discarding");
            return false;
        }

        self.result = match outcome {
            Ok(candidates) => {
                info!(generation, count = candidates.len(), "predictions received");
                PredictionResult::Success(candidates)
            }
            Err(err) => {
                warn!(generation, "prediction failed: {err}");
                PredictionResult::Error(err.user_message())
            }
        };
        true
    }

    /// Run a full request/response cycle against `service`, holding `&mut self`
    /// across the network call.
    ///
    /// For callers that own the controller outright, such as scripts and
    /// tests. An event loop should call [`begin_request`](Self::begin_request)
    /// and hand the `PendingRequest` to a task, then feed the outcome back
    /// through [`resolve`](Self::resolve); that is what `app::run` does.
    pub async fn request_predictions(
        &mut self,
        service: &dyn PredictionService,
        text: &str,
        top_k: u8,
        temperature: f64,
    ) -> &PredictionResult {
        if let RequestOutcome::Started(pending) = self.begin_request(text, top_k, temperature) {
            let outcome = service.predict(&pending.request).await;
            self.resolve(pending.generation, outcome);
        }
        &self.result
    }

    // -- Suggestion applier --

    /// Extend the text with a chosen token and start the next request.
    ///
    /// Rejected with `Busy` (text untouched) while a request is loading.
    pub fn apply_suggestion(&mut self, token: &str) -> RequestOutcome {
        if self.result.is_loading() {
            debug!("suggestion ignored while loading");
            return RequestOutcome::Busy;
        }
        let next = suggestion::apply_suggestion(&self.input.text, token);
        self.set_text(next);
        self.submit()
    }

    /// `apply_suggestion` followed by the request round trip, awaited in place.
    ///
    /// Same caveat as [`request_predictions`](Self::request_predictions):
    /// inside an event loop, use [`apply_suggestion`](Self::apply_suggestion)
    /// and finish the returned request with [`resolve`](Self::resolve).
    pub async fn apply_suggestion_and_request(
        &mut self,
        service: &dyn PredictionService,
        token: &str,
    ) -> &PredictionResult {
        if let RequestOutcome::Started(pending) = self.apply_suggestion(token) {
            let outcome = service.predict(&pending.request).await;
            self.resolve(pending.generation, outcome);
        }
        &self.result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
