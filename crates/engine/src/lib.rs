//! AI layer - grid features, weights, move search and autoplay
//!
//! # Module Structure
//!
//! - [`features`]: the scored grid properties ([`Feature`], [`Features`])
//! - [`weights`]: weight vectors and the one-float-per-line weight file
//! - [`search`]: exhaustive placement search ([`MoveSearch`])
//! - [`session`]: headless game driver ([`Session`])
//!
//! # Example
//!
//! ```
//! use tetris_ai_core::{Block, Grid, ShapeStream, ShapeTable};
//! use tetris_ai_engine::{MoveSearch, Weights};
//!
//! let table = ShapeTable::standard().unwrap();
//! let mut stream = ShapeStream::new(&table, 5, 1);
//! let grid = Grid::new(20, 10).unwrap();
//! let block = Block::with_shape(stream.pop());
//!
//! let mut search = MoveSearch::new(20, 10).unwrap();
//! let mv = search.find_best(&grid, &block, &mut stream, &Weights::default()).unwrap();
//! assert!(mv.col >= 0);
//! ```

pub mod error;
pub mod features;
pub mod search;
pub mod session;
pub mod weights;

pub use error::{SearchError, WeightsError};
pub use features::{Feature, Features};
pub use search::{MoveSearch, MAX_DEPTH};
pub use session::{Session, SessionConfig, SessionStats, StepOutcome};
pub use weights::Weights;
