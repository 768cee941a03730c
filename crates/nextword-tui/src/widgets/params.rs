// Sampling parameter widgets: top-k and temperature, each with its range
// and a slider showing where the value sits in it.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use nextword_core::format::format_temperature;
use nextword_core::input::{TEMPERATURE_MAX, TEMPERATURE_MIN, TOP_K_MAX, TOP_K_MIN};

use crate::ViewState;

const SLIDER_WIDTH: usize = 10;

pub fn render_top_k(frame: &mut Frame, area: Rect, state: &ViewState) {
    let top_k = state.input.top_k;
    let fraction = f64::from(top_k.saturating_sub(TOP_K_MIN)) / f64::from(TOP_K_MAX - TOP_K_MIN);
    let line = param_line(
        top_k.to_string(),
        fraction,
        format!("{TOP_K_MIN}-{TOP_K_MAX}"),
    );
    render_param(frame, area, "Top-k", line);
}

pub fn render_temperature(frame: &mut Frame, area: Rect, state: &ViewState) {
    let temperature = state.input.temperature;
    let fraction = (temperature - TEMPERATURE_MIN) / (TEMPERATURE_MAX - TEMPERATURE_MIN);
    let line = param_line(
        format_temperature(temperature),
        fraction,
        format!(
            "{}-{}",
            format_temperature(TEMPERATURE_MIN),
            format_temperature(TEMPERATURE_MAX)
        ),
    );
    render_param(frame, area, "Temperature", line);
}

fn render_param(frame: &mut Frame, area: Rect, title: &'static str, line: Line<'static>) {
    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

fn param_line(value: String, fraction: f64, range: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {value:>4} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(slider(fraction), Style::default().fg(Color::Cyan)),
        Span::styled(format!(" ({range})"), Style::default().fg(Color::DarkGray)),
    ])
}

/// Text slider with the knob at `fraction` of the track (clamped to 0..=1).
pub fn slider(fraction: f64) -> String {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    let knob = (fraction * (SLIDER_WIDTH - 1) as f64).round() as usize;
    (0..SLIDER_WIDTH)
        .map(|i| match i.cmp(&knob) {
            std::cmp::Ordering::Less => '━',
            std::cmp::Ordering::Equal => '●',
            std::cmp::Ordering::Greater => '─',
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_knob_positions() {
        assert_eq!(slider(0.0), "●─────────");
        assert_eq!(slider(1.0), "━━━━━━━━━●");
        assert_eq!(slider(2.0), slider(1.0));
        assert_eq!(slider(-1.0), slider(0.0));
        assert_eq!(slider(f64::NAN), slider(0.0));
    }

    #[test]
    fn slider_has_fixed_width() {
        for i in 0..=10 {
            assert_eq!(slider(i as f64 / 10.0).chars().count(), SLIDER_WIDTH);
        }
    }

    fn rendered(draw: fn(&mut Frame, Rect, &ViewState), state: &ViewState) -> String {
        let backend = ratatui::backend::TestBackend::new(40, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| draw(frame, frame.area(), state))
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
    fn top_k_shows_value_and_range() {
        let mut state = ViewState::default();
        state.input.top_k = 7;
        let out = rendered(render_top_k, &state);
        assert!(out.contains("Top-k"));
        assert!(out.contains(" 7 "));
        assert!(out.contains("(1-10)"));
    }

    #[test]
    fn temperature_shows_one_decimal() {
        let mut state = ViewState::default();
        state.input.temperature = 1.2;
        let out = rendered(render_temperature, &state);
        assert!(out.contains("1.2"));
        assert!(out.contains("(0.2-1.5)"));
    }
}
