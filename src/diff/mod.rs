//! Patch parsing and chunk alignment.
//!
//! This module turns raw `git diff` / `diff -u` output into per-file data
//! ready for side-by-side display:
//! - Splitting a patch into files (git extended headers, unified fallback)
//! - File header parsing (new/deleted/renamed/copied files, mode changes, binaries)
//! - Chunk header and body parsing, including "\ No newline at end of file"
//! - Aligning old and new lines into visual rows padded with separators
//! - Writing chunks back out as patch text

mod align;
mod chunk;
mod differ;
mod error;
mod format;
mod header;
mod line;
mod patch;
mod types;

pub use align::align;
pub use chunk::{parse_chunk_header, read_chunk_body, read_chunks, ChunkBody, ChunkHeader};
pub use differ::{split_and_refine, Command, Diff};
pub use error::ParseError;
pub use format::{make_chunk_patch, make_patch, make_patch_line};
pub use header::parse_file_header;
pub use line::{read_line, ReadLine};
pub use patch::{read_patch, read_patch_with};
pub use types::{
    ChangedPositions, ChunkData, DiffSide, FileData, FileInfo, FileOperation, RowData, Sides,
    TextLineData, TextLineType, DEV_NULL,
};
