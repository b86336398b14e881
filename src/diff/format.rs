//! Writing aligned chunks back out as unified diff text.

use super::types::{ChunkData, RowData, TextLineData};

const NO_NEWLINE: &str = "\\ No newline at end of file\n";

/// Format one patch line.
///
/// With `last_chunk` set (the chunk reaches an end of file without a final
/// newline), the last line of the chunk gets a "\ No newline" marker, or is
/// dropped entirely when it is the empty remainder after the final newline.
pub fn make_patch_line(marker: char, text: &str, last_chunk: bool, last_line: bool) -> String {
    let add_no_newline = last_chunk && last_line && !text.is_empty();
    let add_line = !last_chunk || !last_line || add_no_newline;

    if !add_line {
        return String::new();
    }
    let mut line = format!("{}{}\n", marker, text);
    if add_no_newline {
        line.push_str(NO_NEWLINE);
    }
    line
}

/// Row whose equal line must be written as a `-`/`+` pair because only
/// one-sided rows follow it up to the end of the last chunk
fn row_to_be_split(rows: &[RowData]) -> Option<usize> {
    for index in (0..rows.len()).rev() {
        let row = &rows[index];
        let left_separator = row.line.left.is_separator();
        let right_separator = row.line.right.is_separator();
        if !left_separator && !right_separator {
            return (index + 1 < rows.len()).then_some(index);
        }
        if left_separator && right_separator {
            return None;
        }
    }
    None
}

fn flush_buffer(
    out: &mut String,
    buffer: &mut Vec<TextLineData>,
    marker: char,
    last_chunk: bool,
    at_end: bool,
) -> usize {
    let mut count = 0;
    let len = buffer.len();
    for (j, line) in buffer.drain(..).enumerate() {
        let text = make_patch_line(marker, &line.text, last_chunk, at_end && j + 1 == len);
        if !text.is_empty() {
            count += 1;
        }
        out.push_str(&text);
    }
    count
}

/// Write a chunk with a recomputed `@@` header.
///
/// Context chunks have no patch representation and yield an empty string.
pub fn make_chunk_patch(chunk: &ChunkData, last_chunk: bool) -> String {
    if chunk.context_chunk {
        return String::new();
    }

    let mut body = String::new();
    let mut left_count = 0;
    let mut right_count = 0;
    let mut left_buffer: Vec<TextLineData> = Vec::new();
    let mut right_buffer: Vec<TextLineData> = Vec::new();

    let split_row = if last_chunk {
        row_to_be_split(&chunk.rows)
    } else {
        None
    };
    let row_count = chunk.rows.len();
    // Trailing equal row flushes whatever is still buffered
    let flush_row = RowData::with_line(TextLineData::separator());

    for i in 0..=row_count {
        let row = chunk.rows.get(i).unwrap_or(&flush_row);
        if row.equal && Some(i) != split_row {
            let at_end = i == row_count;
            left_count += flush_buffer(&mut body, &mut left_buffer, '-', last_chunk, at_end);
            right_count += flush_buffer(&mut body, &mut right_buffer, '+', last_chunk, at_end);
            if i < row_count {
                let last_line = i + 1 == row_count;
                let line = make_patch_line(' ', &row.line.right.text, last_chunk, last_line);
                if !line.is_empty() {
                    left_count += 1;
                    right_count += 1;
                }
                body.push_str(&line);
            }
        } else {
            if row.line.left.is_text_line() {
                left_buffer.push(row.line.left.clone());
            }
            if row.line.right.is_text_line() {
                right_buffer.push(row.line.right.clone());
            }
        }
    }

    format!(
        "@@ -{},{} +{},{} @@{}\n{}",
        chunk.starting_line_number.left.saturating_add(1),
        left_count,
        chunk.starting_line_number.right.saturating_add(1),
        right_count,
        chunk.context_info,
        body
    )
}

/// Write a chunk preceded by `---`/`+++` file lines
pub fn make_patch(
    chunk: &ChunkData,
    left_file_name: &str,
    right_file_name: &str,
    last_chunk: bool,
) -> String {
    format!(
        "--- {}\n+++ {}\n{}",
        left_file_name,
        right_file_name,
        make_chunk_patch(chunk, last_chunk)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::chunk::read_chunks;
    use crate::diff::Sides;

    fn chunk_of(patch: &str) -> (ChunkData, bool) {
        let (mut chunks, at_end) = read_chunks(patch).unwrap();
        (chunks.remove(0), at_end)
    }

    #[test]
    fn test_make_patch_line() {
        assert_eq!(make_patch_line('-', "a", false, true), "-a\n");
        assert_eq!(
            make_patch_line('+', "a", true, true),
            "+a\n\\ No newline at end of file\n"
        );
        assert_eq!(make_patch_line('+', "", true, true), "");
        assert_eq!(make_patch_line(' ', "", true, false), " \n");
    }

    #[test]
    fn test_make_chunk_patch_rewrites_header() {
        let (chunk, at_end) = chunk_of("@@ -3,9 +3,9 @@ fn x\n foo\n-bar\n+baz\n qux");
        assert!(!at_end);
        assert_eq!(
            make_chunk_patch(&chunk, at_end),
            "@@ -3,3 +3,3 @@ fn x\n foo\n-bar\n+baz\n qux\n"
        );
    }

    #[test]
    fn test_make_chunk_patch_no_newline_on_both_sides() {
        let (chunk, at_end) = chunk_of(
            "@@ -1,2 +1,2 @@\n a\n-b\n\\ No newline at end of file\n+c\n\\ No newline at end of file",
        );
        assert!(at_end);
        assert_eq!(
            make_chunk_patch(&chunk, at_end),
            "@@ -1,2 +1,2 @@\n a\n-b\n\\ No newline at end of file\n+c\n\\ No newline at end of file\n"
        );
    }

    #[test]
    fn test_make_chunk_patch_no_newline_on_left_only() {
        let (chunk, at_end) = chunk_of(
            "@@ -1,2 +1,2 @@\n a\n-b\n\\ No newline at end of file\n+c",
        );
        assert!(at_end);
        assert_eq!(
            make_chunk_patch(&chunk, at_end),
            "@@ -1,2 +1,2 @@\n a\n-b\n\\ No newline at end of file\n+c\n"
        );
    }

    #[test]
    fn test_make_chunk_patch_context_chunk() {
        let chunk = ChunkData {
            context_chunk: true,
            ..ChunkData::default()
        };
        assert_eq!(make_chunk_patch(&chunk, false), "");
    }

    #[test]
    fn test_make_chunk_patch_largest_start() {
        let (chunk, _) = chunk_of("@@ -4294967295 +4294967295 @@\n-x\n+y");
        assert_eq!(
            make_chunk_patch(&chunk, false),
            "@@ -4294967295,1 +4294967295,1 @@\n-x\n+y\n"
        );

        let chunk = ChunkData {
            starting_line_number: Sides::splat(i64::MAX),
            ..chunk
        };
        assert!(make_chunk_patch(&chunk, false).starts_with(&format!("@@ -{},1 ", i64::MAX)));
    }

    #[test]
    fn test_make_patch_adds_file_lines() {
        let (chunk, _) = chunk_of("@@ -1 +1 @@\n-x\n+y");
        assert_eq!(
            make_patch(&chunk, "a/f", "b/f", false),
            "--- a/f\n+++ b/f\n@@ -1,1 +1,1 @@\n-x\n+y\n"
        );
    }
}
