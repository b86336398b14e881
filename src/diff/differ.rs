//! Equal/Delete/Insert operation lists and the char-level refinement that
//! turns whole-line runs into intraline changes.

use similar::{ChangeTag, TextDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Equal,
    Delete,
    Insert,
}

impl From<ChangeTag> for Command {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Equal => Command::Equal,
            ChangeTag::Delete => Command::Delete,
            ChangeTag::Insert => Command::Insert,
        }
    }
}

/// A run of text with a single command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub command: Command,
    pub text: String,
}

impl Diff {
    pub fn new(command: Command, text: impl Into<String>) -> Self {
        Self {
            command,
            text: text.into(),
        }
    }

    pub fn equal() -> Self {
        Self::new(Command::Equal, String::new())
    }
}

/// Merge adjacent equalities and gather every change between two equalities
/// into a single Delete followed by a single Insert.
///
/// Empty runs survive so a stripped empty last line keeps its place.
pub fn normalize(diffs: Vec<Diff>) -> Vec<Diff> {
    let mut out: Vec<Diff> = Vec::with_capacity(diffs.len());
    let mut delete: Option<String> = None;
    let mut insert: Option<String> = None;

    for diff in diffs {
        match diff.command {
            Command::Delete => delete.get_or_insert_with(String::new).push_str(&diff.text),
            Command::Insert => insert.get_or_insert_with(String::new).push_str(&diff.text),
            Command::Equal => {
                if flush(&mut out, &mut delete, &mut insert) {
                    out.push(diff);
                } else {
                    push_or_extend(&mut out, diff);
                }
            }
        }
    }
    flush(&mut out, &mut delete, &mut insert);
    out
}

fn flush(out: &mut Vec<Diff>, delete: &mut Option<String>, insert: &mut Option<String>) -> bool {
    let mut flushed = false;
    if let Some(text) = delete.take() {
        out.push(Diff::new(Command::Delete, text));
        flushed = true;
    }
    if let Some(text) = insert.take() {
        out.push(Diff::new(Command::Insert, text));
        flushed = true;
    }
    flushed
}

fn push_or_extend(out: &mut Vec<Diff>, diff: Diff) {
    if let Some(last) = out.last_mut().filter(|last| last.command == diff.command) {
        last.text.push_str(&diff.text);
        return;
    }
    out.push(diff);
}

/// Replace every non-empty Delete+Insert pair with a char-level diff of the two
pub fn refine(diffs: Vec<Diff>) -> Vec<Diff> {
    let mut out = Vec::with_capacity(diffs.len());
    let mut iter = diffs.into_iter().peekable();

    while let Some(diff) = iter.next() {
        let pairs_with_insert = diff.command == Command::Delete
            && !diff.text.is_empty()
            && iter
                .peek()
                .is_some_and(|next| next.command == Command::Insert && !next.text.is_empty());
        if !pairs_with_insert {
            out.push(diff);
            continue;
        }
        let Some(insert) = iter.next() else {
            out.push(diff);
            continue;
        };
        out.extend(char_diff(&diff.text, &insert.text));
    }
    normalize(out)
}

fn char_diff(old: &str, new: &str) -> Vec<Diff> {
    let diff = TextDiff::from_chars(old, new);
    let mut out: Vec<Diff> = Vec::new();
    for change in diff.iter_all_changes() {
        push_or_extend(&mut out, Diff::new(change.tag().into(), change.value()));
    }
    out
}

/// Equalities go to both sides, deletes to the left, inserts to the right
pub fn split_diff_list(diffs: &[Diff]) -> (Vec<Diff>, Vec<Diff>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for diff in diffs {
        match diff.command {
            Command::Equal => {
                left.push(diff.clone());
                right.push(diff.clone());
            }
            Command::Delete => left.push(diff.clone()),
            Command::Insert => right.push(diff.clone()),
        }
    }
    (left, right)
}

/// Normalize, refine to char level and split into per-side lists
pub fn split_and_refine(diffs: Vec<Diff>) -> (Vec<Diff>, Vec<Diff>) {
    let refined = refine(normalize(diffs));
    split_diff_list(&refined)
}
