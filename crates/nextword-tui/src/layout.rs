// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Prompt (5 rows)                                   |
// +-------------------------+------------------------+
// | Top-k (50%)              | Temperature (50%)      |
// +-------------------------+------------------------+
// | Predictions (fill)                                |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: service status and request state.
    pub status_bar: Rect,
    /// Text being completed.
    pub prompt: Rect,
    /// Sampling parameters, split into `top_k` and `temperature` halves.
    pub params: Rect,
    pub top_k: Rect,
    pub temperature: Rect,
    /// Ranked prediction list.
    pub predictions: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(5), // prompt
            Constraint::Length(3), // params
            Constraint::Min(4),    // predictions
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let params = vertical[2];
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(params);

    AppLayout {
        status_bar: vertical[0],
        prompt: vertical[1],
        params,
        top_k: halves[0],
        temperature: halves[1],
        predictions: vertical[3],
        help_bar: vertical[4],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 100, 30)
    }

    fn all_rects(layout: &AppLayout) -> [(&'static str, Rect); 6] {
        [
            ("status_bar", layout.status_bar),
            ("prompt", layout.prompt),
            ("top_k", layout.top_k),
            ("temperature", layout.temperature),
            ("predictions", layout.predictions),
            ("help_bar", layout.help_bar),
        ]
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        for (name, rect) in all_rects(&layout) {
            assert!(
                rect.width > 0 && rect.height > 0,
                "{} has zero area: {:?}",
                name,
                rect
            );
        }
    }

    #[test]
    fn layout_fixed_heights() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.prompt.height, 5);
        assert_eq!(layout.params.height, 3);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn layout_predictions_take_remaining_space() {
        let layout = build_layout(test_area());
        assert_eq!(layout.predictions.height, 30 - 1 - 5 - 3 - 1);
        assert_eq!(layout.predictions.width, 100);
    }

    #[test]
    fn layout_params_split_side_by_side() {
        let layout = build_layout(test_area());
        assert_eq!(layout.top_k.y, layout.temperature.y);
        assert!(layout.top_k.x < layout.temperature.x);
        assert_eq!(layout.top_k.width + layout.temperature.width, layout.params.width);
    }

    #[test]
    fn layout_zones_stack_top_to_bottom() {
        let layout = build_layout(test_area());
        assert!(layout.status_bar.y < layout.prompt.y);
        assert!(layout.prompt.y < layout.params.y);
        assert!(layout.params.y < layout.predictions.y);
        assert!(layout.predictions.y < layout.help_bar.y);
    }

    #[test]
    fn layout_fits_within_area() {
        let area = test_area();
        let layout = build_layout(area);
        for (name, rect) in all_rects(&layout) {
            assert!(
                rect.x + rect.width <= area.width && rect.y + rect.height <= area.height,
                "{} {:?} exceeds area {:?}",
                name,
                rect,
                area
            );
        }
    }
}
