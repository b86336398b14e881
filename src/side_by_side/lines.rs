//! Styled ratatui lines for one side of the output.

use ratatui::{
    style::Style,
    text::{Line, Span},
};

use super::{DiffSelection, SideOutput};

/// Convert one block into a styled line; `line_style` also covers the padding
fn block_line(text: &str, selections: &[DiffSelection], line_style: Style) -> Line<'static> {
    let chars: Vec<char> = text.chars().collect();
    let mut styles = vec![Style::default(); chars.len()];

    for selection in selections {
        let start = selection.start.unwrap_or(0).min(chars.len());
        let end = selection.end.unwrap_or(chars.len()).min(chars.len());
        for style in styles.iter_mut().take(end).skip(start) {
            *style = style.patch(selection.style);
        }
    }

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut current_style = styles.first().copied().unwrap_or_default();
    for (ch, style) in chars.into_iter().zip(styles) {
        if style != current_style && !current.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut current), current_style));
        }
        current_style = style;
        current.push(ch);
    }
    if !current.is_empty() {
        spans.push(Span::styled(current, current_style));
    }

    Line::from(spans).style(line_style)
}

/// Styled lines, one per block, with polished selections layered on the text.
///
/// # Arguments
/// * `side` - One side of an assembled output
pub fn side_lines(side: &SideOutput) -> Vec<Line<'static>> {
    side.text
        .split_terminator('\n')
        .enumerate()
        .map(|(block, text)| {
            let selections = side
                .selections
                .get(&block)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let line_style = side.line_styles.get(&block).copied().unwrap_or_default();
            block_line(text, selections, line_style)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::read_patch;
    use crate::side_by_side::{assemble, DiffTheme};
    use ratatui::style::Color;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_block_line_splits_spans_by_style() {
        let red = Style::default().fg(Color::Red);
        let bold = Style::default().bg(Color::Red);
        let line = block_line(
            "bar",
            &[
                DiffSelection::new(red, None, Some(2)),
                DiffSelection::new(red, Some(3), None),
                DiffSelection::new(bold, Some(2), Some(3)),
            ],
            Style::default(),
        );
        let contents: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(contents, vec!["ba", "r"]);
        assert_eq!(line.spans[0].style, red);
        assert_eq!(line.spans[1].style, bold);
        assert_eq!(line.style, Style::default());
    }

    #[test]
    fn test_block_line_full_line_style() {
        let cyan = Style::default().fg(Color::Cyan);
        let line = block_line("", &[DiffSelection::full_line(cyan)], cyan);
        assert!(line.spans.is_empty());
        assert_eq!(line.style, cyan);
    }

    #[test]
    fn test_side_lines_one_per_block() {
        let files = read_patch("diff --git a/f b/f\n--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n a\n-b\n+c\n");
        let theme = DiffTheme::default();
        let output = assemble(&files, &theme, &CancellationToken::new()).unwrap();
        let lines = side_lines(&output.side.right);
        assert_eq!(lines.len(), output.block_count());
        assert_eq!(lines[0].style, theme.file_line);
        assert_eq!(lines[2].spans[0].content, "c");
    }

    #[test]
    fn test_side_lines_changed_row_keeps_line_style() {
        let files = read_patch("diff --git a/f b/f\n--- a/f\n+++ b/f\n@@ -1 +1 @@\n-bar\n+baz\n");
        let theme = DiffTheme::default();
        let output = assemble(&files, &theme, &CancellationToken::new()).unwrap();

        let left = side_lines(&output.side.left);
        let contents: Vec<&str> = left[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(contents, vec!["ba", "r"]);
        assert_eq!(left[1].style, theme.line.left);
        assert_eq!(left[1].spans[1].style, theme.char.left);

        let right = side_lines(&output.side.right);
        assert_eq!(right[1].style, theme.line.right);
    }
}
