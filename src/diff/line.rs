//! Low-level line reading shared by every parser in this module.

/// A line taken off the front of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLine<'a> {
    /// The line without its newline
    pub line: &'a str,
    /// Everything after the newline (empty if there was none)
    pub rest: &'a str,
    pub has_newline: bool,
}

/// Read the first line of `text`
pub fn read_line(text: &str) -> ReadLine<'_> {
    match text.find('\n') {
        Some(pos) => ReadLine {
            line: &text[..pos],
            rest: &text[pos + 1..],
            has_newline: true,
        },
        None => ReadLine {
            line: text,
            rest: "",
            has_newline: false,
        },
    }
}

/// Byte offsets of every line that starts with `marker`, including offset 0
pub fn line_starts(text: &str, marker: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    if text.starts_with(marker) {
        positions.push(0);
    }
    let needle = format!("\n{}", marker);
    positions.extend(text.match_indices(needle.as_str()).map(|(pos, _)| pos + 1));
    positions
}

/// Cut `text` into spans beginning at each of `starts`.
///
/// Each span drops the newline separating it from the next one; the last
/// span drops a single trailing newline, if any.
pub fn segments<'a>(text: &'a str, starts: &[usize]) -> Vec<&'a str> {
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = match starts.get(i + 1) {
                Some(&next) => next - 1,
                None => text.strip_suffix('\n').map_or(text.len(), str::len),
            };
            &text[start..end.max(start)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_line_with_newline() {
        let read = read_line("first\nsecond\n");
        assert_eq!(read.line, "first");
        assert_eq!(read.rest, "second\n");
        assert!(read.has_newline);
    }

    #[test]
    fn test_read_line_without_newline() {
        let read = read_line("last");
        assert_eq!(read.line, "last");
        assert_eq!(read.rest, "");
        assert!(!read.has_newline);
    }

    #[test]
    fn test_read_line_empty() {
        let read = read_line("");
        assert_eq!(read.line, "");
        assert!(!read.has_newline);
    }

    #[test]
    fn test_line_starts_only_at_line_beginnings() {
        let text = "@@ -1 +1 @@\n x @@ -2\n@@ -5 +5 @@\n y";
        assert_eq!(line_starts(text, "@@ -"), vec![0, 21]);
    }

    #[test]
    fn test_line_starts_not_at_zero() {
        let text = "junk\ndiff --git a/x b/x\n";
        assert_eq!(line_starts(text, "diff --git "), vec![5]);
    }

    #[test]
    fn test_segments_drop_separating_newlines() {
        let text = "A1\nA2\nB1\n";
        let starts = line_starts(text, "A");
        assert_eq!(segments(text, &starts), vec!["A1", "A2\nB1"]);
    }

    #[test]
    fn test_segments_without_trailing_newline() {
        let text = "A1\nA2";
        let starts = line_starts(text, "A");
        assert_eq!(segments(text, &starts), vec!["A1", "A2"]);
    }
}
