//! Gutter and navigation index of one side of the rendered output.

use std::collections::BTreeMap;

use crate::diff::FileInfo;

/// Why a chunk-styled block was emitted instead of content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkippedLines {
    /// Lines between two chunks
    Count(usize),
    /// After the last chunk, up to an end of file we never saw
    Unknown,
    /// Binary file placeholder
    Binary,
}

impl SkippedLines {
    /// Block text shown in place of the skipped lines
    pub fn describe(&self, context_info: &str) -> String {
        match self {
            SkippedLines::Count(1) => with_context("Skipped 1 line".to_string(), context_info),
            SkippedLines::Count(n) => with_context(format!("Skipped {} lines", n), context_info),
            SkippedLines::Unknown => "Skipped unknown number of lines".to_string(),
            SkippedLines::Binary => "Binary files differ".to_string(),
        }
    }
}

fn with_context(text: String, context_info: &str) -> String {
    let context = context_info.trim();
    if context.is_empty() {
        text
    } else {
        format!("{} [{}]", text, context)
    }
}

/// Chunk position by starting block number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffChunkInfo {
    /// start block -> (row count, chunk index within its file)
    chunks: BTreeMap<usize, (usize, usize)>,
}

impl DiffChunkInfo {
    pub fn set_chunk_index(&mut self, start_block: usize, rows: usize, chunk_index: usize) {
        self.chunks.insert(start_block, (rows, chunk_index));
    }

    /// Chunk containing `block`: (start block, row count, chunk index)
    fn chunk_at(&self, block: usize) -> Option<(usize, usize, usize)> {
        let (&start, &(rows, index)) = self.chunks.range(..=block).next_back()?;
        (block < start + rows).then_some((start, rows, index))
    }

    pub fn chunk_index_for_block_number(&self, block: usize) -> Option<usize> {
        self.chunk_at(block).map(|(_, _, index)| index)
    }

    pub fn chunk_row_for_block_number(&self, block: usize) -> Option<usize> {
        self.chunk_at(block).map(|(start, _, _)| block - start)
    }

    pub fn chunk_rows_count_for_block_number(&self, block: usize) -> Option<usize> {
        self.chunk_at(block).map(|(_, rows, _)| rows)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideDiffData {
    pub chunk_info: DiffChunkInfo,
    /// File header blocks
    pub file_info: BTreeMap<usize, FileInfo>,
    /// One-based line number shown in the gutter
    pub line_numbers: BTreeMap<usize, usize>,
    pub skipped_lines: BTreeMap<usize, (SkippedLines, String)>,
    /// Blocks without a line number of their own
    pub separators: BTreeMap<usize, bool>,
    line_number_digits: usize,
}

impl SideDiffData {
    pub fn set_line_number(&mut self, block: usize, line_number: usize) {
        self.line_numbers.insert(block, line_number);
        let digits = line_number.checked_ilog10().map_or(1, |log| log as usize + 1);
        self.line_number_digits = self.line_number_digits.max(digits);
    }

    pub fn set_file_info(&mut self, block: usize, file_info: FileInfo) {
        self.set_separator(block, true);
        self.file_info.insert(block, file_info);
    }

    pub fn set_skipped_lines(&mut self, block: usize, skipped: SkippedLines, context_info: String) {
        self.set_separator(block, true);
        self.skipped_lines.insert(block, (skipped, context_info));
    }

    pub fn set_separator(&mut self, block: usize, separator: bool) {
        self.separators.insert(block, separator);
    }

    pub fn set_chunk_index(&mut self, start_block: usize, rows: usize, chunk_index: usize) {
        self.chunk_info.set_chunk_index(start_block, rows, chunk_index);
    }

    /// Header block of the `file_index`-th file
    pub fn block_number_for_file_index(&self, file_index: usize) -> Option<usize> {
        self.file_info.keys().nth(file_index).copied()
    }

    /// Index of the file whose section contains `block`
    pub fn file_index_for_block_number(&self, block: usize) -> Option<usize> {
        self.file_info.range(..=block).count().checked_sub(1)
    }

    pub fn chunk_index_for_block_number(&self, block: usize) -> Option<usize> {
        self.chunk_info.chunk_index_for_block_number(block)
    }

    pub fn chunk_row_for_block_number(&self, block: usize) -> Option<usize> {
        self.chunk_info.chunk_row_for_block_number(block)
    }

    pub fn chunk_rows_count_for_block_number(&self, block: usize) -> Option<usize> {
        self.chunk_info.chunk_rows_count_for_block_number(block)
    }

    pub fn is_file_line(&self, block: usize) -> bool {
        self.file_info.contains_key(&block)
    }

    pub fn is_chunk_line(&self, block: usize) -> bool {
        self.skipped_lines.contains_key(&block)
    }

    pub fn is_separator(&self, block: usize) -> bool {
        self.separators.get(&block).copied().unwrap_or(false)
    }

    pub fn line_number(&self, block: usize) -> Option<usize> {
        self.line_numbers.get(&block).copied()
    }

    /// Width of the widest recorded line number, at least 1
    pub fn line_number_digits(&self) -> usize {
        self.line_number_digits.max(1)
    }
}
