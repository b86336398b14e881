//! Chunk (`@@ ... @@`) header and body parsing.

use super::align::align;
use super::differ::{split_and_refine, Command, Diff};
use super::error::ParseError;
use super::line::{line_starts, read_line, segments};
use super::types::{ChunkData, RowData, Sides};

const CHUNK_MARKER: &str = "@@ -";

/// Parsed `@@ -l,c +l,c @@ context` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Zero-based first line of the old side
    pub left_start: i64,
    /// Zero-based first line of the new side
    pub right_start: i64,
    /// Everything after the closing `@@`, leading space included
    pub context_info: String,
}

/// Parse a chunk header line.
///
/// Line counts are skipped; the body decides how many lines there are.
pub fn parse_chunk_header(line: &str) -> Result<ChunkHeader, ParseError> {
    let invalid = || ParseError::InvalidChunkHeader(line.to_string());

    let after_left = line.strip_prefix(CHUNK_MARKER).ok_or_else(invalid)?;
    let right_pos = after_left.find(" +").ok_or_else(invalid)?;
    let left_range = &after_left[..right_pos];
    let after_right = &after_left[right_pos + 2..];
    let end_pos = after_right.find(" @@").ok_or_else(invalid)?;
    let right_range = &after_right[..end_pos];

    // Unsigned digits only; `u32::from_str` alone would take a leading `+`
    let start_of = |range: &str| -> Result<i64, ParseError> {
        let number = range.split(',').next().unwrap_or(range);
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        number
            .parse::<u32>()
            .map(|n| i64::from(n) - 1)
            .map_err(|_| invalid())
    };

    Ok(ChunkHeader {
        left_start: start_of(left_range)?,
        right_start: start_of(right_range)?,
        context_info: after_right[end_pos + 3..].to_string(),
    })
}

/// Rows of one chunk body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkBody {
    pub rows: Vec<RowData>,
    /// A "no newline at end of file" marker was seen
    pub at_end_of_file: bool,
}

/// Last diff index per command, and where "\ No newline" markers attach
#[derive(Debug, Default, Clone, Copy)]
struct Marks {
    equal: Option<usize>,
    delete: Option<usize>,
    insert: Option<usize>,
}

impl Marks {
    fn slot(&mut self, command: Command) -> &mut Option<usize> {
        match command {
            Command::Equal => &mut self.equal,
            Command::Delete => &mut self.delete,
            Command::Insert => &mut self.insert,
        }
    }

    fn any(&self) -> bool {
        self.equal.is_some() || self.delete.is_some() || self.insert.is_some()
    }
}

/// Read the `' '`/`-`/`+` lines of a chunk body into aligned rows.
///
/// # Arguments
/// * `text` - Body text, without the header line
/// * `last_chunk` - Whether this is the last chunk of its file; only the
///   last chunk may carry "\ No newline" markers or trailing garbage
pub fn read_chunk_body(text: &str, last_chunk: bool) -> Result<ChunkBody, ParseError> {
    let mut diffs: Vec<Diff> = Vec::new();
    let mut last = Marks::default();
    let mut no_newline = Marks::default();

    for (index, line) in text.split('\n').enumerate() {
        let command = match line.chars().next() {
            Some(' ') => Command::Equal,
            Some('-') => Command::Delete,
            Some('+') => Command::Insert,
            Some('\\') => {
                if !last_chunk {
                    return Err(ParseError::MisplacedNoNewline);
                }
                let Some(previous) = diffs.last() else {
                    return Err(ParseError::MisplacedNoNewline);
                };
                let slot = no_newline.slot(previous.command);
                if slot.is_some() {
                    return Err(ParseError::MisplacedNoNewline);
                }
                *slot = Some(diffs.len() - 1);
                continue;
            }
            // Trailing noise after the last chunk (mail footers, blank lines)
            _ if last_chunk => break,
            _ => {
                return Err(ParseError::InvalidChunkLine {
                    line: index,
                    reason: "line does not start with ' ', '-', '+' or '\\'",
                })
            }
        };

        let content = &line[1..];
        match diffs.last_mut().filter(|previous| previous.command == command) {
            Some(previous) => {
                previous.text.push_str(content);
                previous.text.push('\n');
            }
            None => diffs.push(Diff::new(command, format!("{}\n", content))),
        }
        *last.slot(command) = Some(diffs.len() - 1);
    }

    validate_markers(&last, &no_newline)?;
    strip_last_newline(&mut diffs, &last, &no_newline);

    let (left, right) = split_and_refine(diffs);
    Ok(ChunkBody {
        rows: align(&left, &right).rows,
        at_end_of_file: last_chunk && no_newline.any(),
    })
}

fn validate_markers(last: &Marks, no_newline: &Marks) -> Result<(), ParseError> {
    if no_newline.equal.is_some() && (no_newline.delete.is_some() || no_newline.insert.is_some()) {
        return Err(ParseError::MisplacedNoNewline);
    }
    if no_newline.equal.is_some() && no_newline.equal != last.equal {
        return Err(ParseError::MisplacedNoNewline);
    }
    // A marker on a change run is only valid when no equal run follows it
    for (marker, last_change) in [
        (no_newline.delete, last.delete),
        (no_newline.insert, last.insert),
    ] {
        if marker.is_some() && (marker != last_change || last.equal > last_change) {
            return Err(ParseError::MisplacedNoNewline);
        }
    }
    Ok(())
}

/// Drop the trailing newline that belongs to the file end rather than a line
fn strip_last_newline(diffs: &mut [Diff], last: &Marks, no_newline: &Marks) {
    if no_newline.delete.is_some() || no_newline.insert.is_some() {
        chop(diffs, no_newline.delete);
        chop(diffs, no_newline.insert);
        return;
    }
    if no_newline.equal.is_some() {
        chop(diffs, no_newline.equal);
        return;
    }

    // Option orders None below every index.
    let (e, d, i) = (last.equal, last.delete, last.insert);
    if e > d && e > i {
        chop(diffs, e);
    } else if d > e && d > i {
        if i > e {
            chop(diffs, d);
            chop(diffs, i);
        } else if e > i {
            chop(diffs, e);
            chop(diffs, d);
            prepend_newline(diffs, e);
        } else {
            chop(diffs, d);
        }
    } else if i > e && i > d {
        if d > e {
            chop(diffs, d);
            chop(diffs, i);
        } else if e > d {
            chop(diffs, e);
            chop(diffs, i);
            prepend_newline(diffs, e);
        } else {
            chop(diffs, i);
        }
    }
}

fn chop(diffs: &mut [Diff], index: Option<usize>) {
    if let Some(diff) = index.and_then(|i| diffs.get_mut(i)) {
        diff.text.pop();
    }
}

fn prepend_newline(diffs: &mut [Diff], equal: Option<usize>) {
    if let Some(diff) = equal.and_then(|e| diffs.get_mut(e + 1)) {
        diff.text.insert(0, '\n');
    }
}

/// Read every chunk of one file's body.
///
/// Text before the first chunk header is ignored. Returns the chunks and
/// whether the last one reaches the end of the file.
pub fn read_chunks(patch: &str) -> Result<(Vec<ChunkData>, bool), ParseError> {
    let starts = line_starts(patch, CHUNK_MARKER);
    let count = starts.len();
    let mut chunks = Vec::with_capacity(count);
    let mut at_end_of_file = false;

    for (index, chunk_text) in segments(patch, &starts).into_iter().enumerate() {
        let header_line = read_line(chunk_text);
        let header = parse_chunk_header(header_line.line)?;
        let last_chunk = index + 1 == count;
        let body = read_chunk_body(header_line.rest, last_chunk)?;
        if last_chunk {
            at_end_of_file = body.at_end_of_file;
        }
        chunks.push(ChunkData {
            rows: body.rows,
            context_info: header.context_info,
            starting_line_number: Sides::new(header.left_start, header.right_start),
            context_chunk: false,
        });
    }

    Ok((chunks, at_end_of_file))
}
