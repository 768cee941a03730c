// TUI widget modules, one per screen zone.

pub mod help_bar;
pub mod params;
pub mod predictions;
pub mod prompt;
pub mod status_bar;
