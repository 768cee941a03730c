// Status bar widget: service reachability and request state.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use nextword_core::protocol::{PredictionResult, ServiceStatus};

use crate::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [app name] [service indicator] | [request state]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (dot, dot_color, service_label) = service_indicator(state.service_status);
    let (request_label, request_color) = request_indicator(&state.result);

    let spans = vec![
        Span::styled(
            " nextword ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{} ", dot), Style::default().fg(dot_color)),
        Span::styled(service_label, Style::default().fg(Color::White)),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(request_label, Style::default().fg(request_color)),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Return the dot character, its color, and a label for the service status.
pub fn service_indicator(status: ServiceStatus) -> (&'static str, Color, &'static str) {
    match status {
        ServiceStatus::Unknown => ("●", Color::Yellow, "checking service"),
        ServiceStatus::Online => ("●", Color::Green, "service online"),
        ServiceStatus::Offline => ("●", Color::Red, "service offline"),
    }
}

/// Short description of the prediction state.
pub fn request_indicator(result: &PredictionResult) -> (String, Color) {
    match result {
        PredictionResult::Idle => ("idle".to_string(), Color::DarkGray),
        PredictionResult::Loading => ("loading...".to_string(), Color::Yellow),
        PredictionResult::Success(candidates) => {
            let noun = if candidates.len() == 1 { "prediction" } else { "predictions" };
            (format!("{} {}", candidates.len(), noun), Color::Green)
        }
        PredictionResult::Error(_) => ("error".to_string(), Color::Red),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use nextword_core::protocol::Candidate;

    #[test]
    fn service_indicator_colors() {
        assert_eq!(service_indicator(ServiceStatus::Unknown).1, Color::Yellow);
        assert_eq!(service_indicator(ServiceStatus::Online).1, Color::Green);
        assert_eq!(service_indicator(ServiceStatus::Offline).1, Color::Red);
    }

    #[test]
    fn request_indicator_labels() {
        assert_eq!(request_indicator(&PredictionResult::Idle).0, "idle");
        assert_eq!(request_indicator(&PredictionResult::Loading).0, "loading...");
        assert_eq!(
            request_indicator(&PredictionResult::Error("x".into())).0,
            "error"
        );
        assert_eq!(
            request_indicator(&PredictionResult::Success(vec![Candidate::new("a", 1.0)])).0,
            "1 prediction"
        );
        assert_eq!(
            request_indicator(&PredictionResult::Success(Vec::new())).0,
            "0 predictions"
        );
    }

    #[test]
    fn render_shows_service_state() {
        let backend = ratatui::backend::TestBackend::new(60, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.service_status = ServiceStatus::Offline;
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let row: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(row.contains("service offline"), "{row}");
        assert!(row.contains("idle"), "{row}");
    }
}
