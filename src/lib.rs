//! Tetris AI (workspace facade crate).
//!
//! Re-exports the member crates as `tetris_ai::{arena,core,engine,types}` so
//! front ends and tests depend on one package while the implementation lives
//! in dedicated crates under `crates/`.

pub use tetris_ai_arena as arena;
pub use tetris_ai_core as core;
pub use tetris_ai_engine as engine;
pub use tetris_ai_types as types;
