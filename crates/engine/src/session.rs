//! Headless autoplay session
//!
//! A session owns the live grid, the piece stream and the search scratch, and
//! plays one piece per [`Session::step`]: pop, spawn, search, steer the block
//! to the chosen placement, drop, lock, clear.

use std::env;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, trace};

use tetris_ai_core::{Block, Grid, ShapeStream, ShapeTable};
use tetris_ai_types::{
    Direction, Move, DEFAULT_HEIGHT, DEFAULT_LOOKAHEAD, DEFAULT_WIDTH, TETRIS_DEPTH,
};

use crate::error::SearchError;
use crate::search::{probe_block, MoveSearch};
use crate::weights::Weights;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub lookahead: usize,
    pub max_pieces: usize,
    /// 1 searches the current piece only, 2 also previews the next one
    pub search_depth: usize,
    pub weights_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: 1,
            lookahead: DEFAULT_LOOKAHEAD,
            max_pieces: 1000,
            search_depth: 1,
            weights_path: None,
        }
    }
}

impl SessionConfig {
    /// Load from `TETRIS_AI_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
            env::var(key)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        let weights_path = env::var("TETRIS_AI_WEIGHTS")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(PathBuf::from(s)) });

        Self {
            width: parsed("TETRIS_AI_WIDTH", defaults.width),
            height: parsed("TETRIS_AI_HEIGHT", defaults.height),
            seed: parsed("TETRIS_AI_SEED", defaults.seed),
            lookahead: parsed("TETRIS_AI_LOOKAHEAD", defaults.lookahead),
            max_pieces: parsed("TETRIS_AI_MAX_PIECES", defaults.max_pieces),
            search_depth: parsed("TETRIS_AI_DEPTH", defaults.search_depth),
            weights_path,
        }
    }
}

/// Result of playing one piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Placed { mv: Move, cleared: usize },
    GameOver,
}

/// Running totals of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub pieces: usize,
    pub lines: usize,
    /// Clears by size: singles, doubles, triples, tetrises
    pub clears: [usize; TETRIS_DEPTH as usize],
    pub max_height: i32,
    pub game_over: bool,
}

impl SessionStats {
    pub fn tetrises(&self) -> usize {
        self.clears[TETRIS_DEPTH as usize - 1]
    }

    fn record(&mut self, cleared: usize, height: i32) {
        self.pieces += 1;
        self.lines += cleared;
        if let Some(n) = cleared.checked_sub(1).and_then(|i| self.clears.get_mut(i)) {
            *n += 1;
        }
        self.max_height = self.max_height.max(height);
    }
}

/// One autoplayed game
pub struct Session<'t> {
    config: SessionConfig,
    grid: Grid,
    stream: ShapeStream<'t>,
    block: Block<'t>,
    search: MoveSearch,
    weights: Weights,
    stats: SessionStats,
}

impl<'t> Session<'t> {
    pub fn new(config: SessionConfig, table: &'t ShapeTable) -> Result<Self, SearchError> {
        let grid = Grid::new(config.height, config.width)?;
        let search =
            MoveSearch::new(config.height, config.width)?.with_depth(config.search_depth)?;
        Ok(Self {
            stream: ShapeStream::new(table, config.lookahead, config.seed),
            grid,
            block: Block::new(),
            search,
            weights: Weights::default(),
            stats: SessionStats::default(),
            config,
        })
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn is_over(&self) -> bool {
        self.stats.game_over
    }

    /// Play one piece.
    pub fn step(&mut self) -> Result<StepOutcome, SearchError> {
        if self.stats.game_over {
            return Ok(StepOutcome::GameOver);
        }

        self.block.init(self.stream.pop());
        if !self.grid.spawn(&mut self.block) {
            return Ok(self.end("spawn blocked"));
        }

        let mv = match self
            .search
            .find_best(&self.grid, &self.block, &mut self.stream, &self.weights)
        {
            Ok(mv) => mv,
            Err(SearchError::NoLegalMove) => return Ok(self.end("no legal move")),
            Err(e) => return Err(e),
        };

        self.steer(mv);
        self.grid.drop(&mut self.block);
        if !self.grid.add_block(&self.block) {
            return Ok(self.end("lock failed"));
        }

        let cleared = self.grid.clear_lines();
        let height = self.grid.reliefs().iter().max().map_or(0, |&r| r + 1);
        self.stats.record(cleared, height);
        if let Some(col) = self.grid.tetris_ready() {
            trace!(col, "tetris well open");
        }

        Ok(StepOutcome::Placed { mv, cleared })
    }

    /// Play until game over or `max_pieces` pieces have been placed.
    pub fn run(&mut self, max_pieces: usize) -> Result<SessionStats, SearchError> {
        while self.stats.pieces < max_pieces {
            if self.step()? == StepOutcome::GameOver {
                break;
            }
        }
        info!(
            pieces = self.stats.pieces,
            lines = self.stats.lines,
            tetrises = self.stats.tetrises(),
            game_over = self.stats.game_over,
            "session finished"
        );
        Ok(self.stats.clone())
    }

    /// Rotate, then slide one column at a time toward `mv`.
    ///
    /// If the path from the spawn point is blocked, the block is put where the
    /// search probed it from instead.
    fn steer(&mut self, mv: Move) {
        let turns = mv.rot as i32 - self.block.rot() as i32;
        let mut ok = turns == 0 || self.grid.rotate_validated(&mut self.block, turns);

        while ok && self.block.offset().x != mv.col {
            let dir = if self.block.offset().x < mv.col {
                Direction::Right
            } else {
                Direction::Left
            };
            ok = self.grid.move_validated(&mut self.block, dir, 1);
        }

        if !ok {
            debug!(rot = mv.rot, col = mv.col, "path blocked, placing from above");
            if let Some(shape) = self.block.shape() {
                self.block = probe_block(&self.grid, shape, mv.rot, mv.col);
            }
        }
    }

    fn end(&mut self, reason: &str) -> StepOutcome {
        self.stats.game_over = true;
        info!(reason, pieces = self.stats.pieces, "game over");
        StepOutcome::GameOver
    }
}
