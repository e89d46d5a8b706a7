use thiserror::Error;

use crate::NodeId;

/// Errors reported by [`crate::Arena`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("allocation size must be non-zero")]
    ZeroSize,

    #[error("allocation size overflows: {count} x {elem_size}")]
    Overflow { count: usize, elem_size: usize },

    #[error("out of memory allocating {0} bytes")]
    OutOfMemory(usize),

    #[error("handle {0:?} does not refer to a live node")]
    StaleHandle(NodeId),

    #[error("cannot attach {node:?} under its own subtree at {parent:?}")]
    Cycle { node: NodeId, parent: NodeId },
}
