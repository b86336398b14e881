use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

/// Path git uses for the nonexistent side of a new or deleted file
pub const DEV_NULL: &str = "/dev/null";

/// One column of the side-by-side view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiffSide {
    Left,
    Right,
}

impl DiffSide {
    pub const ALL: [DiffSide; 2] = [DiffSide::Left, DiffSide::Right];
}

/// A value per side (left/right)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Sides<T> {
    pub left: T,
    pub right: T,
}

impl<T> Sides<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Sides<U> {
        Sides {
            left: f(self.left),
            right: f(self.right),
        }
    }
}

impl<T: Clone> Sides<T> {
    pub fn splat(value: T) -> Self {
        Self {
            left: value.clone(),
            right: value,
        }
    }
}

impl<T> Index<DiffSide> for Sides<T> {
    type Output = T;

    fn index(&self, side: DiffSide) -> &T {
        match side {
            DiffSide::Left => &self.left,
            DiffSide::Right => &self.right,
        }
    }
}

impl<T> IndexMut<DiffSide> for Sides<T> {
    fn index_mut(&mut self, side: DiffSide) -> &mut T {
        match side {
            DiffSide::Left => &mut self.left,
            DiffSide::Right => &mut self.right,
        }
    }
}

/// File name and blob/similarity info for one side of a file diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub file_name: String,
    /// Blob id from the `index` line, or similarity text for copies/renames
    pub type_info: String,
}

impl FileInfo {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            type_info: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FileOperation {
    #[default]
    ChangeFile,
    ChangeMode,
    NewFile,
    DeleteFile,
    CopyFile,
    RenameFile,
}

/// Parsed diff of a single file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileData {
    pub chunks: Vec<ChunkData>,
    pub file_info: Sides<FileInfo>,
    pub file_operation: FileOperation,
    pub binary_files: bool,
    /// The last chunk reaches the end of the file ("\ No newline" seen)
    pub last_chunk_at_the_end_of_file: bool,
    /// Chunks cover the whole file, so no trailing skip block is needed
    pub context_chunks_included: bool,
}

/// One `@@ ... @@` region, already aligned into visual rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChunkData {
    pub rows: Vec<RowData>,
    pub context_info: String,
    /// Zero-based line offset of the first line (header number minus one)
    pub starting_line_number: Sides<i64>,
    pub context_chunk: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TextLineType {
    TextLine,
    Separator,
    #[default]
    Invalid,
}

/// Intraline change spans keyed by start char offset.
///
/// A `None` start means the span continues from the previous visual row,
/// a `None` end means it continues into the next one.
pub type ChangedPositions = BTreeMap<Option<usize>, Option<usize>>;

/// A single physical line of one side, or padding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextLineData {
    pub text: String,
    #[serde(serialize_with = "serialize_positions")]
    pub changed_positions: ChangedPositions,
    pub line_type: TextLineType,
}

impl TextLineData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            changed_positions: ChangedPositions::new(),
            line_type: TextLineType::TextLine,
        }
    }

    pub fn separator() -> Self {
        Self {
            text: String::new(),
            changed_positions: ChangedPositions::new(),
            line_type: TextLineType::Separator,
        }
    }

    pub fn is_text_line(&self) -> bool {
        self.line_type == TextLineType::TextLine
    }

    pub fn is_separator(&self) -> bool {
        self.line_type == TextLineType::Separator
    }

    /// Length in chars, the unit used by `changed_positions`
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// One visual row: a line (or padding) per side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowData {
    pub line: Sides<TextLineData>,
    pub equal: bool,
}

impl RowData {
    pub fn new(left: TextLineData, right: TextLineData) -> Self {
        Self {
            line: Sides::new(left, right),
            equal: false,
        }
    }

    /// The same line on both sides, marked equal
    pub fn with_line(line: TextLineData) -> Self {
        Self {
            line: Sides::splat(line),
            equal: true,
        }
    }
}

// JSON object keys must be strings, so the span map goes out as pairs.
fn serialize_positions<S: Serializer>(
    positions: &ChangedPositions,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(positions.iter())
}
