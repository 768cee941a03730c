// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app loop, or into local ViewState mutations (selection movement).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use nextword_core::input::{TEMPERATURE_STEP, TOP_K_MAX, TOP_K_MIN};
use nextword_core::protocol::UserCommand;

use crate::ViewState;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app loop. Returns `None` when it was handled locally or ignored.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return handle_control(key_event.code, view_state);
    }
    if key_event.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match key_event.code {
        KeyCode::Esc => Some(UserCommand::Quit),

        // Editing
        KeyCode::Char(c) => {
            let mut text = view_state.input.text.clone();
            text.push(c);
            Some(set_text(view_state, text))
        }
        KeyCode::Backspace => {
            let mut text = view_state.input.text.clone();
            text.pop()?;
            Some(set_text(view_state, text))
        }

        KeyCode::Enter => view_state.can_submit().then_some(UserCommand::Submit),

        // Prediction list
        KeyCode::Up => {
            view_state.selected = view_state.selected.saturating_sub(1);
            None
        }
        KeyCode::Down => {
            let last = view_state.candidates().len().saturating_sub(1);
            view_state.selected = (view_state.selected + 1).min(last);
            None
        }
        // Only a successful result has candidates to pick from.
        KeyCode::Tab => view_state
            .selected_candidate()
            .map(|candidate| UserCommand::ApplySuggestion {
                token: candidate.token.clone(),
            }),

        _ => None,
    }
}

/// Ctrl-chords: parameters, clear, service re-check, quit.
fn handle_control(code: KeyCode, view_state: &mut ViewState) -> Option<UserCommand> {
    match code {
        KeyCode::Char('c') => Some(UserCommand::Quit),
        KeyCode::Char('u') => {
            if view_state.input.text.is_empty() && !view_state.result.is_loading() {
                return None;
            }
            if !view_state.input.text.is_empty() {
                view_state.pending_text = Some(String::new());
            }
            view_state.input.text.clear();
            Some(UserCommand::Clear)
        }
        KeyCode::Char('r') => Some(UserCommand::CheckService),

        KeyCode::Up => step_top_k(view_state, 1),
        KeyCode::Down => step_top_k(view_state, -1),
        KeyCode::Right => step_temperature(view_state, TEMPERATURE_STEP),
        KeyCode::Left => step_temperature(view_state, -TEMPERATURE_STEP),

        _ => None,
    }
}

fn set_text(view_state: &mut ViewState, text: String) -> UserCommand {
    view_state.edit_text(text.clone());
    UserCommand::SetText(text)
}

fn step_top_k(view_state: &mut ViewState, delta: i8) -> Option<UserCommand> {
    let current = view_state.input.top_k;
    let next = current.saturating_add_signed(delta).clamp(TOP_K_MIN, TOP_K_MAX);
    if next == current {
        return None;
    }
    view_state.input.top_k = next;
    Some(UserCommand::SetTopK(next))
}

fn step_temperature(view_state: &mut ViewState, delta: f64) -> Option<UserCommand> {
    let current = view_state.input.temperature;
    let mut stepped = view_state.input.clone();
    if !stepped.set_temperature(current + delta) {
        return None;
    }
    view_state.input.temperature = stepped.temperature;
    Some(UserCommand::SetTemperature(stepped.temperature))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
