//! Splitting a multi-file patch into per-file diffs.
//!
//! Git extended diffs (`diff --git`) are tried first. A git patch set is
//! expected to be well formed, so one bad file rejects the whole attempt and
//! the patch is re-read as a plain unified diff (`---`/`+++` pairs).

use regex::Regex;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::chunk::read_chunks;
use super::error::ParseError;
use super::header::parse_file_header;
use super::line::{line_starts, segments};
use super::types::{FileData, FileInfo, FileOperation, Sides, DEV_NULL};

static FOOTER_REGEX: OnceLock<Regex> = OnceLock::new();
static UNIFIED_SPLIT_REGEX: OnceLock<Regex> = OnceLock::new();
static UNIFIED_HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
static BINARY_REGEX: OnceLock<Regex> = OnceLock::new();

// The patterns below are literals, so compiling them cannot fail at runtime.

/// `git format-patch` mail signature: "-- ", a version line, a blank line
fn footer_regex() -> &'static Regex {
    FOOTER_REGEX.get_or_init(|| Regex::new(r"\n-- \n\S*\n\n$").expect("footer regex"))
}

fn unified_split_regex() -> &'static Regex {
    UNIFIED_SPLIT_REGEX.get_or_init(|| {
        Regex::new(
            r"(?m)^(?:--- [^\t\n]+(?:\t[^\n]*)?\n\+\+\+ [^\t\n]+(?:\t[^\n]*)?\n|Binary files [^\t\n]+ and [^\t\n]+ differ)",
        )
        .expect("unified split regex")
    })
}

fn unified_header_regex() -> &'static Regex {
    UNIFIED_HEADER_REGEX.get_or_init(|| {
        Regex::new(r"^--- ([^\t\n]+)(?:\t[^\n]*)?\n\+\+\+ ([^\t\n]+)(?:\t[^\n]*)?\n")
            .expect("unified header regex")
    })
}

fn binary_regex() -> &'static Regex {
    BINARY_REGEX.get_or_init(|| {
        Regex::new(r"^Binary files ([^\t\n]+) and ([^\t\n]+) differ$")
            .expect("binary files regex")
    })
}

/// Remove a trailing format-patch signature, keeping the newline before it
fn strip_footer(patch: &str) -> &str {
    match footer_regex().find(patch) {
        Some(footer) => &patch[..footer.start() + 1],
        None => patch,
    }
}

fn check_cancelled(token: &CancellationToken) -> Result<(), ParseError> {
    if token.is_cancelled() {
        Err(ParseError::Cancelled)
    } else {
        Ok(())
    }
}

/// Git mode: every header first, then every file's chunks
fn read_git_patch(patch: &str, token: &CancellationToken) -> Result<Vec<FileData>, ParseError> {
    let starts = line_starts(patch, "diff --git ");

    let mut headers = Vec::with_capacity(starts.len());
    for file_patch in segments(patch, &starts) {
        check_cancelled(token)?;
        headers.push(parse_file_header(file_patch)?);
    }

    let mut files = Vec::with_capacity(headers.len());
    for (mut file_data, rest) in headers {
        check_cancelled(token)?;
        if !file_data.binary_files
            && (!rest.is_empty() || file_data.file_operation == FileOperation::ChangeFile)
        {
            let (chunks, at_end_of_file) = read_chunks(rest)?;
            file_data.chunks = chunks;
            file_data.last_chunk_at_the_end_of_file = at_end_of_file;
        }
        files.push(file_data);
    }
    Ok(files)
}

/// Drop a single-letter `a/`-style prefix; `/dev/null` stays as is
fn strip_diff_prefix(path: &str) -> &str {
    if path == DEV_NULL {
        return path;
    }
    match path.as_bytes() {
        [prefix, b'/', ..] if prefix.is_ascii_alphabetic() => &path[2..],
        _ => path,
    }
}

fn unified_operation(left: &str, right: &str) -> FileOperation {
    if left == DEV_NULL {
        FileOperation::NewFile
    } else if right == DEV_NULL {
        FileOperation::DeleteFile
    } else {
        FileOperation::ChangeFile
    }
}

fn read_unified_file(segment: &str) -> Result<FileData, ParseError> {
    let first_line = segment.lines().next().unwrap_or_default();
    if let Some(captures) = binary_regex().captures(first_line) {
        let left = strip_diff_prefix(&captures[1]);
        let right = strip_diff_prefix(&captures[2]);
        return Ok(FileData {
            file_info: Sides::new(FileInfo::new(left), FileInfo::new(right)),
            file_operation: unified_operation(left, right),
            binary_files: true,
            ..FileData::default()
        });
    }

    let captures = unified_header_regex()
        .captures(segment)
        .ok_or(ParseError::UnknownHeader)?;
    let left = strip_diff_prefix(captures.get(1).map_or("", |m| m.as_str()));
    let right = strip_diff_prefix(captures.get(2).map_or("", |m| m.as_str()));
    let header_end = captures.get(0).map_or(0, |m| m.end());

    let (chunks, at_end_of_file) = read_chunks(&segment[header_end..])?;
    Ok(FileData {
        chunks,
        file_info: Sides::new(FileInfo::new(left), FileInfo::new(right)),
        file_operation: unified_operation(left, right),
        last_chunk_at_the_end_of_file: at_end_of_file,
        ..FileData::default()
    })
}

/// Unified mode: split at `---`/`+++` pairs and `Binary files` lines
fn read_unified_patch(
    patch: &str,
    token: &CancellationToken,
) -> Result<Vec<FileData>, ParseError> {
    let starts: Vec<usize> = unified_split_regex()
        .find_iter(patch)
        .map(|m| m.start())
        .collect();

    let mut files = Vec::with_capacity(starts.len());
    for segment in segments(patch, &starts) {
        check_cancelled(token)?;
        files.push(read_unified_file(segment)?);
    }
    Ok(files)
}

/// Parse a patch into per-file diffs.
///
/// Unparseable input yields an empty list.
pub fn read_patch(patch: &str) -> Vec<FileData> {
    read_patch_with(patch, &CancellationToken::new()).unwrap_or_default()
}

/// Parse a patch, checking `token` before each file.
///
/// # Returns
/// * `Some(files)` - Parsed files, empty when nothing could be read
/// * `None` - The token was cancelled
pub fn read_patch_with(patch: &str, token: &CancellationToken) -> Option<Vec<FileData>> {
    let patch = strip_footer(patch);

    match read_git_patch(patch, token) {
        Ok(files) if !files.is_empty() => return Some(files),
        Ok(_) => {}
        Err(ParseError::Cancelled) => return None,
        Err(err) => debug!("git diff parse failed, retrying as unified diff: {}", err),
    }

    match read_unified_patch(patch, token) {
        Ok(files) => Some(files),
        Err(ParseError::Cancelled) => None,
        Err(err) => {
            warn!("Failed to parse patch: {}", err);
            Some(Vec::new())
        }
    }
}
