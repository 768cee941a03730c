// Prompt widget: the text being completed, with a trailing cursor.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::ViewState;

const PLACEHOLDER: &str = "Type some text...";
const CURSOR: &str = "▏";

/// Render the prompt box.
///
/// Long text wraps; once it outgrows the box the view scrolls so the cursor
/// line stays visible.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = &state.input.text;
    let line = if text.is_empty() {
        Line::from(vec![
            Span::styled(CURSOR, Style::default().fg(Color::Cyan)),
            Span::styled(
                PLACEHOLDER,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ])
    } else {
        Line::from(vec![
            Span::raw(text.clone()),
            Span::styled(CURSOR, Style::default().fg(Color::Cyan)),
        ])
    };

    let border = if state.result.is_loading() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let scroll = scroll_for(text.chars().count() + 1, inner_width, inner_height);

    let paragraph = Paragraph::new(line)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Text")
                .border_style(border),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Rows to scroll so the last of `len` cells stays in a `width` x `height`
/// box. Approximates wrapping by cell count.
pub fn scroll_for(len: usize, width: u16, height: u16) -> u16 {
    if width == 0 || height == 0 {
        return 0;
    }
    let rows = len.div_ceil(width as usize);
    rows.saturating_sub(height as usize).min(u16::MAX as usize) as u16
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use nextword_core::protocol::PredictionResult;

    fn rendered(state: &ViewState, width: u16, height: u16) -> String {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn scroll_for_short_text_is_zero() {
        assert_eq!(scroll_for(10, 40, 3), 0);
        assert_eq!(scroll_for(120, 40, 3), 0);
    }

    #[test]
    fn scroll_for_long_text_follows_cursor() {
        assert_eq!(scroll_for(121, 40, 3), 1);
        assert_eq!(scroll_for(400, 40, 3), 7);
    }

    #[test]
    fn scroll_for_degenerate_box() {
        assert_eq!(scroll_for(100, 0, 3), 0);
        assert_eq!(scroll_for(100, 10, 0), 0);
    }

    #[test]
    fn empty_prompt_shows_placeholder() {
        let state = ViewState::default();
        assert!(rendered(&state, 40, 5).contains(PLACEHOLDER));
    }

    #[test]
    fn prompt_shows_text() {
        let mut state = ViewState::default();
        state.input.text = "Once upon a time".into();
        let out = rendered(&state, 40, 5);
        assert!(out.contains("Once upon a time"));
        assert!(!out.contains(PLACEHOLDER));
    }

    #[test]
    fn render_does_not_panic_while_loading_with_long_text() {
        let mut state = ViewState::default();
        state.input.text = "word ".repeat(200);
        state.result = PredictionResult::Loading;
        rendered(&state, 30, 5);
    }
}
