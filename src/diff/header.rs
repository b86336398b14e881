//! `diff --git` extended header parsing.

use super::error::ParseError;
use super::line::{read_line, ReadLine};
use super::types::{FileData, FileInfo, FileOperation, Sides, DEV_NULL};

const DIFF_GIT: &str = "diff --git ";

/// Split `a/<name> b/<name>` into `<name>` when both halves match.
///
/// Names may contain spaces, so the separator is located at the midpoint
/// rather than searched for.
fn extract_common_file_name(names: &str) -> Option<&str> {
    if names.len() % 2 == 0 || !names.starts_with("a/") {
        return None;
    }
    let separator = (names.len() - 1) / 2;
    if names.get(separator..separator + 3)? != " b/" {
        return None;
    }
    let left = names.get(2..separator)?;
    let right = names.get(separator + 3..)?;
    (left == right).then_some(left)
}

fn validate_mode(mode: &str) -> Result<(), ParseError> {
    if !mode.is_empty() && mode.chars().all(|c| ('0'..='7').contains(&c)) {
        Ok(())
    } else {
        Err(ParseError::MalformedMode(mode.to_string()))
    }
}

/// Take the next line and strip `prefix` from it
fn expect_prefixed<'a>(
    text: &'a str,
    prefix: &'static str,
) -> Result<(&'a str, ReadLine<'a>), ParseError> {
    if text.is_empty() {
        return Err(ParseError::MissingLine(prefix));
    }
    let read = read_line(text);
    let value = read
        .line
        .strip_prefix(prefix)
        .ok_or_else(|| ParseError::unexpected(prefix, read.line))?;
    Ok((value, read))
}

/// Read an `old mode`/`new mode` pair; returns the new mode line
fn read_mode_change(text: &str) -> Result<ReadLine<'_>, ParseError> {
    let (old_mode, old_line) = expect_prefixed(text, "old mode ")?;
    validate_mode(old_mode)?;
    if !old_line.has_newline {
        return Err(ParseError::MissingLine("new mode "));
    }
    let (new_mode, new_line) = expect_prefixed(old_line.rest, "new mode ")?;
    validate_mode(new_mode)?;
    Ok(new_line)
}

/// Header of a file that exists under the same name on both sides
fn read_common_header<'a>(
    text: &'a str,
    file_data: &mut FileData,
) -> Result<&'a str, ParseError> {
    let next = read_line(text);

    let new_file = next.line.strip_prefix("new file mode ");
    let deleted_file = next.line.strip_prefix("deleted file mode ");
    if let Some(mode) = new_file.or(deleted_file) {
        validate_mode(mode)?;
        file_data.file_operation = if new_file.is_some() {
            FileOperation::NewFile
        } else {
            FileOperation::DeleteFile
        };
        return Ok(next.rest);
    }

    if next.line.starts_with("old mode ") {
        let new_mode = read_mode_change(text)?;
        // Mode-only changes end right after the new mode line
        if !new_mode.has_newline || new_mode.rest.is_empty() {
            file_data.file_operation = FileOperation::ChangeMode;
        }
        return Ok(new_mode.rest);
    }

    Ok(text)
}

/// Header of a copy or rename: optional modes and similarity, then from/to
fn read_copy_rename_header<'a>(
    names: &str,
    text: &'a str,
    file_data: &mut FileData,
) -> Result<&'a str, ParseError> {
    let mut rest = text;

    if read_line(rest).line.starts_with("old mode ") {
        let new_mode = read_mode_change(rest)?;
        rest = new_mode.rest;
    }

    let similarity = read_line(rest);
    if similarity.line.starts_with("similarity index ")
        || similarity.line.starts_with("dissimilarity index ")
    {
        file_data.file_info = Sides::splat(FileInfo {
            file_name: String::new(),
            type_info: similarity.line.to_string(),
        });
        rest = similarity.rest;
    }

    let from = read_line(rest);
    let (operation, left_name, to_prefix) =
        if let Some(name) = from.line.strip_prefix("copy from ") {
            (FileOperation::CopyFile, name, "copy to ")
        } else if let Some(name) = from.line.strip_prefix("rename from ") {
            (FileOperation::RenameFile, name, "rename to ")
        } else {
            return Err(ParseError::unexpected("copy from/rename from", from.line));
        };
    if !from.has_newline {
        return Err(ParseError::MissingLine(to_prefix));
    }
    let (right_name, to) = expect_prefixed(from.rest, to_prefix)?;

    let expected = format!("a/{} b/{}", left_name, right_name);
    if names != expected {
        return Err(ParseError::FileNameMismatch {
            expected,
            found: names.to_string(),
        });
    }

    file_data.file_operation = operation;
    file_data.file_info.left.file_name = left_name.to_string();
    file_data.file_info.right.file_name = right_name.to_string();
    Ok(to.rest)
}

/// Accept `expected` alone or followed by a tab and a timestamp
fn matches_file_name(found: &str, expected: &str) -> bool {
    found
        .strip_prefix(expected)
        .is_some_and(|tail| tail.is_empty() || tail.starts_with('\t'))
}

/// Parse the `index` line and the `Binary files` or `---`/`+++` lines
fn read_index_and_binary<'a>(
    text: &'a str,
    file_data: &mut FileData,
) -> Result<&'a str, ParseError> {
    let operation = file_data.file_operation;
    if text.is_empty()
        && matches!(
            operation,
            FileOperation::CopyFile | FileOperation::RenameFile | FileOperation::ChangeMode
        )
    {
        return Ok(text);
    }

    let mut rest = text;
    let index = read_line(rest);
    if let Some(ids) = index.line.strip_prefix("index ") {
        let (left_id, right_ids) = ids
            .split_once("..")
            .ok_or_else(|| ParseError::MalformedIndex(index.line.to_string()))?;
        // `index abc..def 100644` carries the mode after the right id
        let right_id = right_ids.split(' ').next().unwrap_or(right_ids);
        file_data.file_info.left.type_info = left_id.to_string();
        file_data.file_info.right.type_info = right_id.to_string();
        rest = index.rest;
    } else if operation != FileOperation::ChangeFile {
        return Err(ParseError::unexpected("index line", index.line));
    }

    if rest.is_empty()
        && matches!(
            operation,
            FileOperation::NewFile | FileOperation::DeleteFile
        )
    {
        return Ok(rest);
    }

    let left_expected = if operation == FileOperation::NewFile {
        DEV_NULL.to_string()
    } else {
        format!("a/{}", file_data.file_info.left.file_name)
    };
    let right_expected = if operation == FileOperation::DeleteFile {
        DEV_NULL.to_string()
    } else {
        format!("b/{}", file_data.file_info.right.file_name)
    };

    let binary = read_line(rest);
    if binary.line == format!("Binary files {} and {} differ", left_expected, right_expected) {
        file_data.binary_files = true;
        return Ok(binary.rest);
    }

    let (left_found, left_line) = expect_prefixed(rest, "--- ")?;
    if !matches_file_name(left_found, &left_expected) {
        return Err(ParseError::FileNameMismatch {
            expected: left_expected,
            found: left_found.to_string(),
        });
    }
    if !left_line.has_newline {
        return Err(ParseError::MissingLine("+++ "));
    }

    let (right_found, right_line) = expect_prefixed(left_line.rest, "+++ ")?;
    if !matches_file_name(right_found, &right_expected) {
        return Err(ParseError::FileNameMismatch {
            expected: right_expected,
            found: right_found.to_string(),
        });
    }
    if !right_line.has_newline {
        return Err(ParseError::MissingLine("@@ "));
    }

    Ok(right_line.rest)
}

/// Parse a `diff --git` header block.
///
/// # Arguments
/// * `patch` - One file's span, starting at its `diff --git` line
///
/// # Returns
/// The header fields with no chunks yet, and the text after the header
/// (the chunk section, possibly empty).
pub fn parse_file_header(patch: &str) -> Result<(FileData, &str), ParseError> {
    let first = read_line(patch);
    let names = first
        .line
        .strip_prefix(DIFF_GIT)
        .ok_or(ParseError::UnknownHeader)?;
    if !first.has_newline {
        return Err(ParseError::MissingLine("header line after diff --git"));
    }

    let mut file_data = FileData::default();
    let rest = match extract_common_file_name(names) {
        Some(name) => {
            file_data.file_info = Sides::splat(FileInfo::new(name));
            read_common_header(first.rest, &mut file_data)?
        }
        None => read_copy_rename_header(names, first.rest, &mut file_data)?,
    };
    let rest = read_index_and_binary(rest, &mut file_data)?;

    match file_data.file_operation {
        FileOperation::NewFile => file_data.file_info.left.file_name = DEV_NULL.to_string(),
        FileOperation::DeleteFile => file_data.file_info.right.file_name = DEV_NULL.to_string(),
        _ => {}
    }

    Ok((file_data, rest))
}
