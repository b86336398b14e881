//! Plain-text and JSON printing for the `sdv` binary.

use unicode_width::UnicodeWidthChar;

use crate::diff::{DiffSide, FileData};
use crate::side_by_side::{SideBySideOutput, SideOutput};

const COLUMN_SEPARATOR: &str = " │ ";
const COLUMN_SEPARATOR_WIDTH: usize = 3;

/// How the two text columns are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayout {
    /// Total width in terminal columns
    pub width: usize,
    pub tab_width: usize,
    pub line_numbers: bool,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            width: 160,
            tab_width: 4,
            line_numbers: true,
        }
    }
}

/// Expand tabs to the next multiple of `tab_width`
fn expand_tabs(text: &str, tab_width: usize) -> String {
    let mut expanded = String::with_capacity(text.len());
    let mut column = 0;
    for ch in text.chars() {
        if ch == '\t' {
            let spaces = tab_width.max(1) - column % tab_width.max(1);
            expanded.push_str(&" ".repeat(spaces));
            column += spaces;
        } else {
            expanded.push(ch);
            column += ch.width().unwrap_or(0);
        }
    }
    expanded
}

/// Truncate or pad `text` to exactly `width` columns
fn fit(text: &str, width: usize) -> String {
    let mut fitted = String::with_capacity(width);
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        fitted.push(ch);
        used += w;
    }
    fitted.push_str(&" ".repeat(width - used));
    fitted
}

/// Gutter, change marker and text of one block
fn cell(
    side: &SideOutput,
    side_kind: DiffSide,
    block: usize,
    text: &str,
    layout: &TextLayout,
) -> String {
    let data = &side.data;
    if data.is_file_line(block) || data.is_chunk_line(block) {
        return expand_tabs(text, layout.tab_width);
    }

    let line_number = data.line_number(block);
    let mut cell = String::new();
    if layout.line_numbers {
        let digits = data.line_number_digits();
        match line_number {
            Some(number) => cell.push_str(&format!("{:>digits$} ", number)),
            None => cell.push_str(&" ".repeat(digits + 1)),
        }
    }

    let changed = line_number.is_some() && side.selections.contains_key(&block);
    cell.push_str(match (changed, side_kind) {
        (true, DiffSide::Left) => "- ",
        (true, DiffSide::Right) => "+ ",
        (false, _) => "  ",
    });
    cell.push_str(&expand_tabs(text, layout.tab_width));
    cell
}

/// Render both sides as two columns, one terminal line per block.
///
/// # Arguments
/// * `output` - Assembled side-by-side output
/// * `layout` - Width, tab width and gutter settings
///
/// # Returns
/// Newline-terminated text with trailing spaces trimmed
pub fn side_by_side_text(output: &SideBySideOutput, layout: &TextLayout) -> String {
    let column = layout.width.saturating_sub(COLUMN_SEPARATOR_WIDTH) / 2;
    let left = &output.side.left;
    let right = &output.side.right;

    let mut text = String::new();
    for (block, (left_text, right_text)) in left.text.lines().zip(right.text.lines()).enumerate() {
        let line = format!(
            "{}{}{}",
            fit(&cell(left, DiffSide::Left, block, left_text, layout), column),
            COLUMN_SEPARATOR,
            fit(&cell(right, DiffSide::Right, block, right_text, layout), column),
        );
        text.push_str(line.trim_end());
        text.push('\n');
    }
    text
}

/// Parsed files as pretty-printed JSON
pub fn files_json(files: &[FileData]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(files)
}
