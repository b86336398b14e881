use thiserror::Error;

/// Structural failures while reading a patch.
///
/// These never cross the worker boundary: the segmenter drops the offending
/// file (or the whole git-mode attempt) and logs the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("patch ends early, expected {0}")]
    MissingLine(&'static str),

    #[error("expected {expected}, found {found:?}")]
    UnexpectedLine {
        expected: &'static str,
        found: String,
    },

    #[error("file name mismatch: expected {expected:?}, found {found:?}")]
    FileNameMismatch { expected: String, found: String },

    #[error("malformed mode line: {0:?}")]
    MalformedMode(String),

    #[error("malformed index line: {0:?}")]
    MalformedIndex(String),

    #[error("invalid chunk header: {0:?}")]
    InvalidChunkHeader(String),

    #[error("invalid chunk line {line}: {reason}")]
    InvalidChunkLine { line: usize, reason: &'static str },

    #[error("misplaced \"no newline at end of file\" marker")]
    MisplacedNoNewline,

    #[error("unrecognized file header")]
    UnknownHeader,

    #[error("cancelled")]
    Cancelled,
}

impl ParseError {
    pub(crate) fn unexpected(expected: &'static str, found: &str) -> Self {
        ParseError::UnexpectedLine {
            expected,
            found: found.to_string(),
        }
    }
}
