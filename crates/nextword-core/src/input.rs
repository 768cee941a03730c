// Input state holder: the prompt text plus the two sampling parameters.
//
// Setters clamp to the allowed ranges and report whether anything changed,
// so callers can skip redundant UI updates.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TOP_K_MIN: u8 = 1;
pub const TOP_K_MAX: u8 = 10;
pub const DEFAULT_TOP_K: u8 = 5;

pub const TEMPERATURE_MIN: f64 = 0.2;
pub const TEMPERATURE_MAX: f64 = 1.5;
/// Slider step; temperatures are snapped to the nearest multiple.
pub const TEMPERATURE_STEP: f64 = 0.1;
pub const DEFAULT_TEMPERATURE: f64 = 0.8;

// ---------------------------------------------------------------------------
// InputState
// ---------------------------------------------------------------------------

/// Current user input: free text and sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    pub text: String,
    pub top_k: u8,
    pub temperature: f64,
}

impl Default for InputState {
    fn default() -> Self {
        InputState {
            text: String::new(),
            top_k: DEFAULT_TOP_K,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl InputState {
    /// Build an input state with the given initial parameters (clamped).
    pub fn with_params(top_k: u8, temperature: f64) -> Self {
        let mut state = InputState::default();
        state.set_top_k(top_k);
        state.set_temperature(temperature);
        state
    }

    /// Replace the text. Returns `true` if it changed.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.text == text {
            return false;
        }
        self.text = text;
        true
    }

    /// Set the result count, clamped to `[TOP_K_MIN, TOP_K_MAX]`.
    /// Returns `true` if the stored value changed.
    pub fn set_top_k(&mut self, top_k: u8) -> bool {
        let clamped = clamp_top_k(top_k);
        if self.top_k == clamped {
            return false;
        }
        self.top_k = clamped;
        true
    }

    /// Set the temperature, clamped to `[TEMPERATURE_MIN, TEMPERATURE_MAX]`
    /// and snapped to one decimal. Non-finite values are ignored.
    /// Returns `true` if the stored value changed.
    pub fn set_temperature(&mut self, temperature: f64) -> bool {
        let Some(snapped) = clamp_temperature(temperature) else {
            return false;
        };
        if (self.temperature - snapped).abs() < f64::EPSILON {
            return false;
        }
        self.temperature = snapped;
        true
    }

    /// Whether the text holds anything besides whitespace.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Clamp a top-k value into range.
pub fn clamp_top_k(top_k: u8) -> u8 {
    top_k.clamp(TOP_K_MIN, TOP_K_MAX)
}

/// Clamp and snap a temperature; `None` for NaN or infinities.
pub fn clamp_temperature(temperature: f64) -> Option<f64> {
    if !temperature.is_finite() {
        return None;
    }
    let clamped = temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
    let snapped = (clamped / TEMPERATURE_STEP).round() * TEMPERATURE_STEP;
    // Re-clamp: snapping can land a hair outside the range in binary floats.
    Some(snapped.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
