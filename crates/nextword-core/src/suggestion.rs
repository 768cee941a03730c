// Suggestion rule: how a chosen candidate token extends the current text.

use crate::format::format_token;

/// Append a chosen token to the current text.
///
/// The token is normalized with [`format_token`] first. When the text already
/// ends in whitespace, the token's leading whitespace is dropped so the
/// result never contains a doubled space at the seam.
pub fn apply_suggestion(current_text: &str, chosen_token: &str) -> String {
    let normalized = format_token(chosen_token);
    let adjusted = if current_text.ends_with(char::is_whitespace) {
        normalized.trim_start()
    } else {
        normalized.as_str()
    };

    let mut next = String::with_capacity(current_text.len() + adjusted.len());
    next.push_str(current_text);
    next.push_str(adjusted);
    next
}
