//! Error types for the move search and weight files

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use tetris_ai_core::GridError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("block has no shape")]
    NoShape,

    #[error("no legal placement for the current shape")]
    NoLegalMove,

    #[error("scratch grid: {0}")]
    Grid(#[from] GridError),
}

#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("cannot access weight file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: `{token}` is not a number")]
    Parse { line: usize, token: String },

    #[error("expected {expected} weights, found {found}")]
    Count { found: usize, expected: usize },
}
