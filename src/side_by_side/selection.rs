//! Per-block style ranges and overlap resolution.

use ratatui::style::Style;
use smallvec::{smallvec, SmallVec};
use std::collections::BTreeMap;

/// A styled char range within one block.
///
/// `start: None` is open at the line start, `end: None` open at the line end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffSelection {
    pub style: Style,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl DiffSelection {
    pub fn new(style: Style, start: Option<usize>, end: Option<usize>) -> Self {
        Self { style, start, end }
    }

    /// The whole line, separators included
    pub fn full_line(style: Style) -> Self {
        Self::new(style, None, None)
    }

    /// Covers no chars at all
    pub fn is_empty(&self) -> bool {
        match (self.start, self.end) {
            (None, Some(end)) => end == 0,
            (Some(start), Some(end)) => start >= end,
            _ => false,
        }
    }
}

/// Selections keyed by block number
pub type DiffSelections = BTreeMap<usize, Vec<DiffSelection>>;

/// `end` is at or before `start` (None end is +inf, None start is -inf)
fn ends_before(end: Option<usize>, start: Option<usize>) -> bool {
    matches!((end, start), (Some(end), Some(start)) if end <= start)
}

fn starts_before(a: Option<usize>, b: Option<usize>) -> bool {
    match (a, b) {
        (None, Some(_)) => true,
        (Some(a), Some(b)) => a < b,
        _ => false,
    }
}

fn ends_after(a: Option<usize>, b: Option<usize>) -> bool {
    match (a, b) {
        (None, Some(_)) => true,
        (Some(a), Some(b)) => a > b,
        _ => false,
    }
}

/// What remains of `minuend` once `subtrahend` is cut out of it
fn subtract_selection(
    minuend: DiffSelection,
    subtrahend: &DiffSelection,
) -> SmallVec<[DiffSelection; 2]> {
    if ends_before(minuend.end, subtrahend.start) || ends_before(subtrahend.end, minuend.start) {
        return smallvec![minuend];
    }

    let mut remainder: SmallVec<[DiffSelection; 2]> = SmallVec::new();
    if starts_before(minuend.start, subtrahend.start) {
        remainder.push(DiffSelection {
            end: subtrahend.start,
            ..minuend
        });
    }
    if ends_after(minuend.end, subtrahend.end) {
        remainder.push(DiffSelection {
            start: subtrahend.end,
            ..minuend
        });
    }
    remainder.retain(|selection| !selection.is_empty());
    remainder
}

/// Resolve overlaps so that within a block every char is covered at most
/// once, later selections winning over earlier ones. Empty and inverted
/// selections are dropped.
pub fn polished_selections(selections: &DiffSelections) -> DiffSelections {
    selections
        .iter()
        .map(|(&block, list)| {
            let mut working: Vec<DiffSelection> = Vec::with_capacity(list.len());
            for selection in list.iter().filter(|selection| !selection.is_empty()) {
                working = working
                    .into_iter()
                    .flat_map(|existing| subtract_selection(existing, selection))
                    .collect();
                working.push(*selection);
            }
            (block, working)
        })
        .collect()
}
