//! Core game model - shapes, piece stream, blocks and the grid
//!
//! Everything here is pure and deterministic: no I/O, no global state. The
//! shape table is built once and borrowed by everything else, so several
//! independent tables, streams and grids can live in the same process.
//!
//! # Module Structure
//!
//! - [`shape`]: tetromino table with per-rotation cells and crusts
//! - [`stream`]: seeded lookahead piece stream (independent uniform draws)
//! - [`block`]: a shape bound to a rotation and a position
//! - [`grid`]: playfield with incremental relief/gap/row/hash bookkeeping
//!
//! # Coordinates
//!
//! Row 0 is the floor and rows grow upward. A block's offset is the
//! bottom-left corner of its current rotation's bounding box.
//!
//! # Example
//!
//! ```
//! use tetris_ai_core::{Block, Grid, ShapeStream, ShapeTable};
//!
//! let table = ShapeTable::standard().unwrap();
//! let mut stream = ShapeStream::new(&table, 5, 42);
//! let mut grid = Grid::new(20, 10).unwrap();
//!
//! let mut block = Block::with_shape(stream.pop());
//! assert!(grid.spawn(&mut block));
//! grid.drop(&mut block);
//! assert!(grid.add_block(&block));
//! assert_eq!(grid.total_cells(), 4);
//! ```

pub mod block;
pub mod error;
pub mod grid;
pub mod shape;
pub mod stream;

pub use tetris_ai_types as types;

pub use block::Block;
pub use error::{GridError, ShapeError};
pub use grid::Grid;
pub use shape::{CellList, Orientation, Shape, ShapeTable, STANDARD_SHAPES};
pub use stream::ShapeStream;
