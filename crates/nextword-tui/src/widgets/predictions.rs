// Predictions widget: ranked next-token candidates.
//
// Table: Rank, Token, Probability, bar scaled to the probability.
// Idle/Loading/Error states show a single message instead of the table.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use nextword_core::format::{format_probability, format_token, probability_bar_width, rank_label};
use nextword_core::protocol::{Candidate, PredictionResult};

use crate::ViewState;

pub const EMPTY_HINT: &str = "Type some text to get started.";
pub const SUBMIT_HINT: &str = "Press Enter to see predictions";
pub const LOADING_TEXT: &str = "Loading predictions...";
pub const NO_RESULTS_TEXT: &str = "No predictions returned.";

/// Cells in a full (100%) probability bar.
const BAR_CELLS: usize = 20;

/// Render the prediction panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title("Predictions");

    let candidates = match &state.result {
        PredictionResult::Success(candidates) if !candidates.is_empty() => candidates,
        other => {
            let paragraph = Paragraph::new(message_line(other, state.input.has_text()))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }
    };

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Token"),
        Cell::from("Prob"),
        Cell::from(""),
    ])
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = candidates.iter().enumerate().map(|(i, c)| candidate_row(i, c)).collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(12),
        Constraint::Length(7),
        Constraint::Length(BAR_CELLS as u16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn candidate_row(index: usize, candidate: &Candidate) -> Row<'static> {
    Row::new(vec![
        Cell::from(format!("{}", rank_label(index))),
        Cell::from(visible_token(&candidate.token)),
        Cell::from(format_probability(candidate.probability)),
        Cell::from(Span::styled(
            probability_bar(candidate.probability),
            Style::default().fg(Color::Green),
        )),
    ])
}

/// Message shown when there is no table to draw.
fn message_line(result: &PredictionResult, has_text: bool) -> Line<'static> {
    match result {
        PredictionResult::Idle if has_text => {
            Line::from(Span::styled(SUBMIT_HINT, Style::default().fg(Color::Gray)))
        }
        PredictionResult::Idle => {
            Line::from(Span::styled(EMPTY_HINT, Style::default().fg(Color::DarkGray)))
        }
        PredictionResult::Loading => {
            Line::from(Span::styled(LOADING_TEXT, Style::default().fg(Color::Yellow)))
        }
        PredictionResult::Error(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        PredictionResult::Success(_) => {
            Line::from(Span::styled(NO_RESULTS_TEXT, Style::default().fg(Color::DarkGray)))
        }
    }
}

/// Display form of a token for a single table cell: the normalized token
/// with control characters escaped so they cannot break the row.
pub fn visible_token(token: &str) -> String {
    let mut out = String::new();
    for c in format_token(token).chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&c.escape_unicode().to_string()),
            c => out.push(c),
        }
    }
    out
}

/// Bar proportional to the probability, `BAR_CELLS` wide at 100%.
pub fn probability_bar(probability: f64) -> String {
    let cells = (probability_bar_width(probability) / 100.0 * BAR_CELLS as f64).round() as usize;
    "█".repeat(cells)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
