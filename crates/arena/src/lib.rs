//! Ownership-tree arena
//!
//! Every allocation is a node with at most one owner and any number of owned
//! children. Freeing a node frees its whole subtree, so nested structures are
//! released with a single call instead of matched frees.
//!
//! Nodes are addressed by generational [`NodeId`] handles into a slot arena.
//! A handle never changes when its node is resized, so the tree links stay
//! valid across relocation without any pointer patching. A freed slot bumps
//! its generation, which turns every outstanding handle to it into a
//! [`ArenaError::StaleHandle`].
//!
//! Children of a node form a doubly linked sibling list (first child on the
//! parent, `next`/`prev` on each child), so attaching and detaching a subtree
//! is O(1).
//!
//! # Example
//!
//! ```
//! use tetris_ai_arena::Arena;
//!
//! let mut arena = Arena::new();
//! let root = arena.allocate(16, None).unwrap();
//! let child = arena.allocate_zeroed(4, 8, Some(root)).unwrap();
//! let _grandchild = arena.allocate(1, Some(child)).unwrap();
//!
//! assert_eq!(arena.stats(root).unwrap().descendants, 2);
//!
//! // Freeing the root releases the whole tree.
//! assert_eq!(arena.free(Some(root)), 3);
//! assert!(arena.is_empty());
//! ```

mod arena;
mod error;

pub use arena::{Arena, Children, NodeId, NodeStats};
pub use error::ArenaError;
