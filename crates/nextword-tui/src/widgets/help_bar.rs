// Help bar widget: keyboard shortcut hints.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::ViewState;

/// Render the help bar. Hints that do nothing in the current state are
/// left out (no "Tab" without predictions, no "Enter" while loading).
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = hint_text(state);
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn hint_text(state: &ViewState) -> String {
    let mut hints = Vec::new();
    if state.can_submit() {
        hints.push("Enter:Predict");
    }
    if !state.candidates().is_empty() {
        hints.push("Up/Down:Select");
        hints.push("Tab:Use");
    }
    hints.extend([
        "C-Up/Down:Top-k",
        "C-Left/Right:Temp",
        "C-u:Clear",
        "C-r:Recheck",
        "Esc:Quit",
    ]);
    format!(" {}", hints.join(" | "))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
