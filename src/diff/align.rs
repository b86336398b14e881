//! Line alignment: turns per-side operation lists into visual rows where
//! unmatched lines on one side face separator padding on the other.

use std::collections::BTreeMap;

use super::differ::{Command, Diff};
use super::types::{ChunkData, RowData, TextLineData};

/// Running state of one side during the walk
#[derive(Debug, Default)]
struct SideLines {
    lines: Vec<TextLineData>,
    /// Index of the line currently being extended
    line_number: usize,
    /// Line index of the last alignment point
    aligned: Option<usize>,
    /// Separator rows to insert before a given line index
    spans: BTreeMap<usize, usize>,
}

impl SideLines {
    /// Lines walked since the last alignment point
    fn distance(&self) -> usize {
        match self.aligned {
            Some(aligned) => {
                debug_assert!(self.line_number >= aligned, "alignment went backwards");
                self.line_number - aligned
            }
            None => self.line_number + 1,
        }
    }

    fn last_text_is_empty(&self) -> bool {
        self.lines.last().is_none_or(|line| line.text.is_empty())
    }

    fn handle_line(&mut self, pieces: &[&str], line: usize) {
        let Some(text) = pieces.get(line) else {
            return;
        };
        if line == 0 {
            if let Some(last) = self.lines.last_mut() {
                last.text.push_str(text);
                return;
            }
        } else {
            self.line_number += 1;
        }
        self.lines.push(TextLineData::new(*text));
    }

    fn handle_difference(&mut self, text: &str) {
        let pieces: Vec<&str> = text.split('\n').collect();
        for line in 0..pieces.len() {
            let start = if line > 0 {
                None
            } else {
                Some(self.lines.last().map_or(0, TextLineData::char_len))
            };
            self.handle_line(&pieces, line);
            let end = if line + 1 < pieces.len() {
                None
            } else {
                Some(self.lines.last().map_or(0, TextLineData::char_len))
            };
            if let Some(last) = self.lines.last_mut() {
                last.changed_positions.insert(start, end);
            }
        }
    }

    /// Interleave separator rows before the lines they were recorded for
    fn assembly_rows(self) -> Vec<TextLineData> {
        let mut rows = Vec::with_capacity(self.lines.len() + self.spans.values().sum::<usize>());
        let count = self.lines.len();
        let mut lines = self.lines.into_iter();
        for index in 0..=count {
            let span = self.spans.get(&index).copied().unwrap_or(0);
            rows.extend(std::iter::repeat_with(TextLineData::separator).take(span));
            if let Some(line) = lines.next() {
                rows.push(line);
            }
        }
        rows
    }
}

fn last_lines_equal(left: &SideLines, right: &SideLines) -> bool {
    left.last_text_is_empty() && right.last_text_is_empty()
}

/// Build the visual rows of a chunk from its left and right operation lists.
///
/// # Arguments
/// * `left_diffs` - Equal and Delete runs of the old side
/// * `right_diffs` - Equal and Insert runs of the new side
///
/// # Returns
/// A chunk whose rows have equal left/right counts and whose `equal` flags
/// are set only where both sides show the same source line.
pub fn align(left_diffs: &[Diff], right_diffs: &[Diff]) -> ChunkData {
    let mut left = SideLines::default();
    let mut right = SideLines::default();
    let mut equal_lines: BTreeMap<usize, usize> = BTreeMap::new();
    let mut last_line_equal = true;

    let (mut i, mut j) = (0, 0);
    let empty = Diff::equal();

    while i <= left_diffs.len() && j <= right_diffs.len() {
        let left_diff = left_diffs.get(i).unwrap_or(&empty);
        let right_diff = right_diffs.get(j).unwrap_or(&empty);

        if left_diff.command == Command::Delete {
            if j == right_diffs.len() && last_line_equal && left_diff.text.starts_with('\n') {
                equal_lines.insert(left.line_number, right.line_number);
            }
            left.handle_difference(&left_diff.text);
            last_line_equal = last_lines_equal(&left, &right) && j != right_diffs.len();
            i += 1;
        }

        if right_diff.command == Command::Insert {
            if i == left_diffs.len() && last_line_equal && right_diff.text.starts_with('\n') {
                equal_lines.insert(left.line_number, right.line_number);
            }
            right.handle_difference(&right_diff.text);
            last_line_equal = last_lines_equal(&left, &right) && i != left_diffs.len();
            j += 1;
        }

        if left_diff.command == Command::Equal && right_diff.command == Command::Equal {
            let is_final = i == left_diffs.len() && j == right_diffs.len();
            let left_pieces: Vec<&str> = left_diff.text.split('\n').collect();
            let right_pieces: Vec<&str> = right_diff.text.split('\n').collect();

            if !is_final || (!left.lines.is_empty() && !right.lines.is_empty()) {
                let common = left_pieces.len().min(right_pieces.len());
                let max = left_pieces.len().max(right_pieces.len());

                for line in 0..max {
                    left.handle_line(&left_pieces, line);
                    right.handle_line(&right_pieces, line);

                    if line < common {
                        let left_distance = left.distance();
                        let right_distance = right.distance();

                        if left_distance > 0 && right_distance > 0 {
                            let mut do_align = true;
                            if line == 0
                                && (left_pieces[0].is_empty() || right_pieces[0].is_empty())
                                && !last_line_equal
                            {
                                do_align = false;
                            }
                            if line + 1 == common {
                                if left.last_text_is_empty() || right.last_text_is_empty() {
                                    do_align = false;
                                }
                                if is_final {
                                    do_align = true;
                                }
                            }

                            if do_align {
                                left.aligned = Some(left.line_number);
                                right.aligned = Some(right.line_number);
                                if right_distance > left_distance {
                                    left.spans
                                        .insert(left.line_number, right_distance - left_distance);
                                } else if left_distance > right_distance {
                                    right.spans
                                        .insert(right.line_number, left_distance - right_distance);
                                }
                            }
                        }
                    }

                    let counts_as_equal =
                        line + 1 < common || (line + 1 == common && is_final);
                    if counts_as_equal && (line > 0 || last_line_equal) {
                        equal_lines.insert(left.line_number, right.line_number);
                    }

                    if line > 0 {
                        last_line_equal = true;
                    }
                }
            }
            i += 1;
            j += 1;
        }
    }

    let mut left_rows = left.assembly_rows();
    let mut right_rows = right.assembly_rows();
    let total = left_rows.len().max(right_rows.len());
    left_rows.resize_with(total, TextLineData::separator);
    right_rows.resize_with(total, TextLineData::separator);

    let mut left_line: Option<usize> = None;
    let mut right_line: Option<usize> = None;
    let rows = left_rows
        .into_iter()
        .zip(right_rows)
        .map(|(left_text, right_text)| {
            if left_text.is_text_line() {
                left_line = Some(left_line.map_or(0, |n| n + 1));
            }
            if right_text.is_text_line() {
                right_line = Some(right_line.map_or(0, |n| n + 1));
            }
            let equal = match (left_line, right_line) {
                (Some(l), Some(r)) => equal_lines.get(&l) == Some(&r),
                _ => false,
            };
            let both_lines = left_text.is_text_line() && right_text.is_text_line();
            RowData {
                equal: equal && both_lines,
                ..RowData::new(left_text, right_text)
            }
        })
        .collect();

    ChunkData {
        rows,
        ..ChunkData::default()
    }
}
