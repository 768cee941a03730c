// Pure display helpers for prediction candidates.

/// Subword-boundary markers that stand for a leading space: the byte-level
/// BPE marker `Ġ` (U+0120) and the SentencePiece marker `▁` (U+2581).
pub const SPACE_MARKERS: [char; 2] = ['\u{0120}', '\u{2581}'];

/// Normalize a raw token: one leading space marker becomes a space, then any
/// leading whitespace run collapses to a single space.
///
/// Used both for display and, via [`crate::suggestion::apply_suggestion`],
/// for concatenation, so what the user sees is what gets appended.
pub fn format_token(token: &str) -> String {
    let unmarked = match token.strip_prefix(&SPACE_MARKERS[..]) {
        Some(rest) => format!(" {rest}"),
        None => token.to_string(),
    };
    let body = unmarked.trim_start();
    if body.len() == unmarked.len() {
        unmarked
    } else {
        format!(" {body}")
    }
}

/// Probability as a percentage with one decimal, e.g. `0.42 -> "42.0%"`.
pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Width of the probability bar in percent, kept within `[0, 100]` even for
/// malformed probabilities.
pub fn probability_bar_width(probability: f64) -> f64 {
    if !probability.is_finite() {
        return 0.0;
    }
    (probability * 100.0).clamp(0.0, 100.0)
}

/// Temperature shown with one decimal.
pub fn format_temperature(temperature: f64) -> String {
    format!("{temperature:.1}")
}

/// One-based rank shown next to a candidate.
pub fn rank_label(index: usize) -> usize {
    index + 1
}
