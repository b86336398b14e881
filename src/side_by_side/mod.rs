//! Side-by-side output assembly.
//!
//! Every visual row becomes one block (one text line) on each side. Blocks
//! are numbered from 0 and both sides always have the same block count, so
//! the two texts scroll together line for line.

mod data;
pub mod lines;
mod selection;
mod theme;

pub use data::{DiffChunkInfo, SideDiffData, SkippedLines};
pub use selection::{polished_selections, DiffSelection, DiffSelections};
pub use theme::DiffTheme;

use ratatui::style::Style;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

use crate::diff::{DiffSide, FileData, FileInfo, RowData, Sides, TextLineType};

/// Folding level of file header blocks
pub const FILE_FOLDING: u8 = 1;
/// Folding level of skipped-lines and binary blocks
pub const CHUNK_FOLDING: u8 = 2;

/// Rendered text of one side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideOutput {
    /// One line per block, each terminated by `\n`
    pub text: String,
    pub selections: DiffSelections,
    /// Whole-line style by block, padding past the text included
    pub line_styles: BTreeMap<usize, Style>,
    pub data: SideDiffData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideBySideOutput {
    pub side: Sides<SideOutput>,
    /// Folding level by block; blocks not listed are content
    pub folding_indent: BTreeMap<usize, u8>,
}

impl SideBySideOutput {
    /// Number of blocks, identical on both sides
    pub fn block_count(&self) -> usize {
        self.side.left.text.lines().count()
    }
}

/// Accumulates both sides block by block
struct Assembler<'a> {
    theme: &'a DiffTheme,
    output: SideBySideOutput,
    block: usize,
}

impl<'a> Assembler<'a> {
    fn new(theme: &'a DiffTheme) -> Self {
        Self {
            theme,
            output: SideBySideOutput::default(),
            block: 0,
        }
    }

    fn push_text(&mut self, side: DiffSide, text: &str) {
        let out = &mut self.output.side[side].text;
        out.push_str(text);
        out.push('\n');
    }

    fn push_selection(&mut self, side: DiffSide, selection: DiffSelection) {
        self.output.side[side]
            .selections
            .entry(self.block)
            .or_default()
            .push(selection);
    }

    /// Style the whole block, kept apart from the selections that polishing splits
    fn push_line_style(&mut self, side: DiffSide, style: Style) {
        self.output.side[side].line_styles.insert(self.block, style);
        self.push_selection(side, DiffSelection::full_line(style));
    }

    fn file_block(&mut self, file_info: &Sides<FileInfo>) {
        for side in DiffSide::ALL {
            self.push_text(side, &file_info[side].file_name);
            self.push_line_style(side, self.theme.file_line);
            self.output.side[side]
                .data
                .set_file_info(self.block, file_info[side].clone());
        }
        self.output.folding_indent.insert(self.block, FILE_FOLDING);
        self.block += 1;
    }

    fn skip_block(&mut self, skipped: SkippedLines, context_info: &str) {
        let text = skipped.describe(context_info);
        for side in DiffSide::ALL {
            self.push_text(side, &text);
            self.push_line_style(side, self.theme.chunk_line);
            self.output.side[side].data.set_skipped_lines(
                self.block,
                skipped,
                context_info.to_string(),
            );
        }
        self.output.folding_indent.insert(self.block, CHUNK_FOLDING);
        self.block += 1;
    }

    /// Emit one row, advancing `line_number` on sides with a text line
    fn row_block(&mut self, row: &RowData, line_number: &mut Sides<i64>) {
        for side in DiffSide::ALL {
            let line = &row.line[side];
            self.push_text(side, &line.text);

            match line.line_type {
                TextLineType::TextLine => {
                    line_number[side] = line_number[side].saturating_add(1);
                    let number = usize::try_from(line_number[side]).unwrap_or(0);
                    self.output.side[side]
                        .data
                        .set_line_number(self.block, number);
                }
                TextLineType::Separator => {
                    self.output.side[side].data.set_separator(self.block, true);
                }
                TextLineType::Invalid => {}
            }

            if row.equal {
                continue;
            }
            let line_style = if line.is_text_line() {
                self.theme.line[side]
            } else {
                self.theme.span_line
            };
            self.push_line_style(side, line_style);
            for (&start, &end) in &line.changed_positions {
                self.push_selection(side, DiffSelection::new(self.theme.char[side], start, end));
            }
        }
        self.block += 1;
    }

    fn file(&mut self, file: &FileData) {
        self.file_block(&file.file_info);

        if file.binary_files {
            self.skip_block(SkippedLines::Binary, "");
            return;
        }

        // Zero-based index of the last left line shown so far
        let mut last_left_line: i64 = -1;
        for (index, chunk) in file.chunks.iter().enumerate() {
            if !chunk.context_chunk {
                let skipped = chunk.starting_line_number.left - last_left_line - 1;
                if skipped > 0 {
                    let count = usize::try_from(skipped).unwrap_or(0);
                    self.skip_block(SkippedLines::Count(count), &chunk.context_info);
                }
            }

            for side in DiffSide::ALL {
                self.output.side[side]
                    .data
                    .set_chunk_index(self.block, chunk.rows.len(), index);
            }

            let mut line_number = chunk.starting_line_number;
            for row in &chunk.rows {
                self.row_block(row, &mut line_number);
            }
            last_left_line = line_number.left - 1;
        }

        if !file.chunks.is_empty()
            && !file.last_chunk_at_the_end_of_file
            && !file.context_chunks_included
        {
            self.skip_block(SkippedLines::Unknown, "");
        }
    }
}

/// Assemble the side-by-side texts, styles and navigation data.
///
/// # Arguments
/// * `files` - Parsed files, in display order
/// * `theme` - Styles for headers, skipped blocks and changes
/// * `token` - Checked before each file and before finishing each side
///
/// # Returns
/// * `Some(output)` - Both sides with polished selections
/// * `None` - The token was cancelled; nothing partial is returned
pub fn assemble(
    files: &[FileData],
    theme: &DiffTheme,
    token: &CancellationToken,
) -> Option<SideBySideOutput> {
    let mut assembler = Assembler::new(theme);

    for file in files {
        if token.is_cancelled() {
            return None;
        }
        assembler.file(file);
    }

    let mut output = assembler.output;
    for side in DiffSide::ALL {
        if token.is_cancelled() {
            return None;
        }
        let side_output = &mut output.side[side];
        side_output.text = side_output.text.replace('\r', " ");
        side_output.selections = polished_selections(&side_output.selections);
    }
    Some(output)
}
