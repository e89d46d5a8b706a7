//! Error types for table construction and grid operations

use thiserror::Error;

/// Failure to build a shape (and therefore the whole shape table).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("shape description is empty")]
    Empty,

    #[error("line {line}: expected 4 cells, found {found}")]
    CellCount { line: usize, found: usize },

    #[error("line {line}: cannot parse cell `{token}`")]
    Parse { line: usize, token: String },

    #[error("line {line}: cell ({x}, {y}) listed twice")]
    DuplicateCell { line: usize, x: i32, y: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: usize, height: usize },

    #[error("grid of {width}x{height} cells is too large")]
    TooLarge { width: usize, height: usize },

    #[error("out of memory allocating {0} grid cells")]
    OutOfMemory(usize),

    #[error("grid dimensions differ: {dst_width}x{dst_height} vs {src_width}x{src_height}")]
    DimensionMismatch {
        dst_width: usize,
        dst_height: usize,
        src_width: usize,
        src_height: usize,
    },

    #[error("ragged grid rows: row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("{what} inconsistent at index {index}")]
    Inconsistent { what: &'static str, index: usize },
}
