// Terminal front end: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the controller snapshot. The app
// loop pushes `UiUpdate` messages over an mpsc channel; the TUI applies them
// to `ViewState` and re-renders at ~30 fps. Key presses become
// `UserCommand`s sent back to the app loop.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use nextword_core::input::InputState;
use nextword_core::protocol::{
    Candidate, PredictionResult, ServiceStatus, Snapshot, UiUpdate, UserCommand,
};

use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the controller for rendering.
///
/// The text buffer is edited locally as keys arrive and pushed to the app
/// loop with `SetText`. While such an edit is unacknowledged, incoming
/// snapshots carry an older text and must not overwrite the buffer.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Editor buffer plus the sampling parameters last reported by the app.
    pub input: InputState,
    pub result: PredictionResult,
    pub service_status: ServiceStatus,
    /// Highlighted row in the prediction list.
    pub selected: usize,
    /// Text most recently sent to the app and not yet echoed back.
    pub pending_text: Option<String>,
}

impl ViewState {
    /// Apply a controller snapshot.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let Snapshot { input, result } = snapshot;

        match self.pending_text.as_deref() {
            Some(expected) if expected == input.text => {
                self.pending_text = None;
                self.input.text = input.text;
            }
            Some(_) => {
                // Stale echo of an earlier edit; keep the local buffer.
            }
            None => self.input.text = input.text,
        }
        self.input.top_k = input.top_k;
        self.input.temperature = input.temperature;

        if result != self.result {
            self.selected = 0;
        }
        self.result = result;
    }

    /// Replace the editor buffer and remember that the app has not seen it.
    pub fn edit_text(&mut self, text: String) {
        self.pending_text = Some(text.clone());
        self.input.text = text;
    }

    pub fn can_submit(&self) -> bool {
        !self.result.is_loading() && self.input.has_text()
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.result.candidates()
    }

    pub fn selected_candidate(&self) -> Option<&Candidate> {
        self.candidates().get(self.selected)
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => state.apply_snapshot(*snapshot),
        UiUpdate::ServiceStatus(status) => state.service_status = status,
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete screen.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::prompt::render(frame, layout.prompt, state);
    widgets::params::render_top_k(frame, layout.top_k, state);
    widgets::params::render_temperature(frame, layout.temperature, state);
    widgets::predictions::render(frame, layout.predictions, state);
    widgets::help_bar::render(frame, layout.help_bar, state);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// Initializes the terminal, installs a panic hook that restores it, then
/// selects over UI updates, keyboard input, and render ticks until the user
/// quits or the app loop goes away.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let outcome = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => {
                        debug!("UI channel closed, leaving TUI");
                        break Ok(());
                    }
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            if cmd_tx.send(cmd).await.is_err() {
                                warn!("App loop gone, leaving TUI");
                                break Ok(());
                            }
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse, resize, focus: the next tick redraws.
                    }
                    Some(Err(e)) => break Err(anyhow::Error::from(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::from(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str, result: PredictionResult) -> Snapshot {
        let mut input = InputState::default();
        input.text = text.to_string();
        Snapshot { input, result }
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.input.text.is_empty());
        assert_eq!(state.input.top_k, 5);
        assert_eq!(state.result, PredictionResult::Idle);
        assert_eq!(state.service_status, ServiceStatus::Unknown);
        assert_eq!(state.selected, 0);
        assert!(state.pending_text.is_none());
        assert!(!state.can_submit());
    }

    #[test]
    fn snapshot_replaces_text_when_nothing_pending() {
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot("Hello world", PredictionResult::Loading));
        assert_eq!(state.input.text, "Hello world");
        assert!(state.result.is_loading());
        assert!(!state.can_submit());
    }

    #[test]
    fn stale_echo_does_not_clobber_local_edits() {
        let mut state = ViewState::default();
        state.edit_text("a".into());
        state.edit_text("ab".into());
        state.edit_text("abc".into());

        state.apply_snapshot(snapshot("a", PredictionResult::Idle));
        assert_eq!(state.input.text, "abc");
        assert!(state.pending_text.is_some());

        state.apply_snapshot(snapshot("abc", PredictionResult::Idle));
        assert_eq!(state.input.text, "abc");
        assert!(state.pending_text.is_none());

        // Once acknowledged, app-side changes (e.g. a suggestion) come through.
        state.apply_snapshot(snapshot("abc def", PredictionResult::Loading));
        assert_eq!(state.input.text, "abc def");
    }

    #[test]
    fn snapshot_always_updates_parameters() {
        let mut state = ViewState::default();
        state.edit_text("x".into());
        let mut snap = snapshot("", PredictionResult::Idle);
        snap.input.top_k = 9;
        snap.input.temperature = 1.2;
        state.apply_snapshot(snap);
        assert_eq!(state.input.top_k, 9);
        assert!((state.input.temperature - 1.2).abs() < 1e-9);
        assert_eq!(state.input.text, "x");
    }

    #[test]
    fn new_result_resets_selection() {
        let mut state = ViewState::default();
        let result = PredictionResult::Success(vec![
            Candidate::new("a", 0.5),
            Candidate::new("b", 0.3),
        ]);
        state.apply_snapshot(snapshot("hi", result.clone()));
        state.selected = 1;
        assert_eq!(state.selected_candidate().unwrap().token, "b");

        // Same result again (e.g. a parameter change) keeps the selection.
        state.apply_snapshot(snapshot("hi", result));
        assert_eq!(state.selected, 1);

        state.apply_snapshot(snapshot("hi", PredictionResult::Loading));
        assert_eq!(state.selected, 0);
        assert!(state.selected_candidate().is_none());
    }

    #[test]
    fn apply_ui_update_service_status() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::ServiceStatus(ServiceStatus::Offline));
        assert_eq!(state.service_status, ServiceStatus::Offline);
    }

    #[test]
    fn apply_ui_update_snapshot() {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::Snapshot(Box::new(snapshot(
                "Hello",
                PredictionResult::Error("API error: 500 Internal Server Error".into()),
            ))),
        );
        assert_eq!(state.input.text, "Hello");
        assert!(state.can_submit());
    }

    #[test]
    fn render_frame_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.input.text = "The quick brown".into();
        state.result = PredictionResult::Success(vec![
            Candidate::new("\u{0120}fox", 0.62),
            Candidate::new(" dog", 0.21),
        ]);
        terminal
            .draw(|frame| render_frame(frame, &state))
            .unwrap();
    }

    #[test]
    fn render_frame_tiny_terminal_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(10, 4);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render_frame(frame, &state))
            .unwrap();
    }
}
