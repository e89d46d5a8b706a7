//! Shape stream - lookahead piece generation
//!
//! The stream is a ring buffer of pending picks. A slot is filled the first
//! time it is looked at, by drawing a uniform index over the shape table, and
//! keeps that shape until it is popped. Peeking is therefore stable: asking
//! for the same distance twice returns the same shape.
//!
//! Every slot is drawn independently. There is no 7-bag: the same shape may
//! come up several times in a row, and any shape may go missing for a while.
//!
//! The generator is a seeded ChaCha8 stream, so a seed replays a game exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::shape::{Shape, ShapeTable};

/// Lookahead piece generator over a shared [`ShapeTable`]
#[derive(Debug, Clone)]
pub struct ShapeStream<'t> {
    table: &'t ShapeTable,
    /// Cached picks; `None` until first accessed
    slots: Vec<Option<usize>>,
    /// Slot holding the next piece to pop
    cursor: usize,
    rng: ChaCha8Rng,
    seed: u64,
}

impl<'t> ShapeStream<'t> {
    /// Create a stream that can look `max_lookahead` pieces ahead.
    ///
    /// A lookahead of zero is raised to one, the piece about to be popped.
    pub fn new(table: &'t ShapeTable, max_lookahead: usize, seed: u64) -> Self {
        Self {
            table,
            slots: vec![None; max_lookahead.max(1)],
            cursor: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn max_lookahead(&self) -> usize {
        self.slots.len()
    }

    /// Seed the stream was last (re)started with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn table(&self) -> &'t ShapeTable {
        self.table
    }

    /// Shape `idx` positions ahead, without consuming it.
    ///
    /// Returns `None` when `idx >= max_lookahead()`.
    pub fn peek(&mut self, idx: usize) -> Option<&'t Shape> {
        if idx >= self.slots.len() {
            return None;
        }
        let slot = (self.cursor + idx) % self.slots.len();
        let pick = self.fill(slot);
        let table = self.table;
        table.get(pick)
    }

    /// Consume and return the next shape.
    pub fn pop(&mut self) -> &'t Shape {
        let slot = self.cursor;
        let pick = self.fill(slot);
        self.slots[slot] = None;
        self.cursor = (self.cursor + 1) % self.slots.len();

        let table = self.table;
        // `fill` only yields indices below `table.len()`.
        &table.as_slice()[pick]
    }

    /// Drop every pending pick and restart the generator from `seed`.
    pub fn reset(&mut self, seed: u64) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.cursor = 0;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.seed = seed;
    }

    fn fill(&mut self, slot: usize) -> usize {
        match self.slots[slot] {
            Some(pick) => pick,
            None => {
                // gen_range uses rejection sampling, so every shape is equally likely.
                let pick = self.rng.gen_range(0..self.table.len());
                self.slots[slot] = Some(pick);
                pick
            }
        }
    }
}
