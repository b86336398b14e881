use ratatui::style::{Color, Modifier, Style};

use crate::diff::Sides;

/// Styles used when assembling side-by-side output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffTheme {
    /// File header blocks
    pub file_line: Style,
    /// Skipped-lines and binary blocks
    pub chunk_line: Style,
    /// Padding rows facing a changed line
    pub span_line: Style,
    /// Whole changed lines: removed on the left, added on the right
    pub line: Sides<Style>,
    /// Intraline changes layered over `line`
    pub char: Sides<Style>,
}

impl Default for DiffTheme {
    fn default() -> Self {
        Self {
            file_line: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            chunk_line: Style::default().fg(Color::Cyan),
            span_line: Style::default().fg(Color::DarkGray),
            line: Sides::new(
                Style::default().fg(Color::Red),
                Style::default().fg(Color::Green),
            ),
            char: Sides::new(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        }
    }
}
