//! Grid module - the playfield with incremental bookkeeping
//!
//! Occupancy is stored as a flat row-major array (`y * width + x`) with row 0
//! at the floor. Next to it the grid keeps derived state that the search
//! reads on every candidate placement, updated cell by cell instead of being
//! recomputed:
//!
//! - `relief[x]`: highest occupied row of column x, or [`EMPTY_RELIEF`]
//! - `gaps[x]`: empty cells strictly below `relief[x]`
//! - per-column stack of occupied rows, ascending
//! - `row_fill[y]`: occupied cells in row y, and the set of full rows
//! - `hash`: XOR of a fixed 64-bit key per occupied cell
//!
//! All mutators take blocks whose shape may be missing; such blocks count as
//! colliding and leave the grid untouched.

use std::fmt;

use tracing::trace;

use crate::block::Block;
use crate::error::GridError;
use crate::types::{Coord, Direction, EMPTY_RELIEF, TETRIS_DEPTH};

/// The playfield
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    relief: Vec<i32>,
    gaps: Vec<i32>,
    /// Column x owns `stacks[x * height..][..stack_len[x]]`
    stacks: Vec<i32>,
    stack_len: Vec<usize>,
    row_fill: Vec<usize>,
    /// Ascending
    full_rows: Vec<usize>,
    n_total_cleared: usize,
    n_last_cleared: usize,
    hash: u64,
}

impl Grid {
    /// Create an empty grid
    pub fn new(height: usize, width: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension { width, height });
        }
        // Coordinates are i32, so every cell must be addressable as one.
        let area = width
            .checked_mul(height)
            .filter(|_| i32::try_from(width).is_ok() && i32::try_from(height).is_ok())
            .ok_or(GridError::TooLarge { width, height })?;
        let cells = filled(area, false, area)?;
        let stacks = filled(area, 0, area)?;
        let mut full_rows = Vec::new();
        full_rows
            .try_reserve_exact(height)
            .map_err(|_| GridError::OutOfMemory(area))?;
        Ok(Self {
            width,
            height,
            cells,
            relief: filled(width, EMPTY_RELIEF, area)?,
            gaps: filled(width, 0, area)?,
            stacks,
            stack_len: filled(width, 0, area)?,
            row_fill: filled(height, 0, area)?,
            full_rows,
            n_total_cleared: 0,
            n_last_cleared: 0,
            hash: 0,
        })
    }

    /// Build a grid from text rows, top row first; `#` marks an occupied cell.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, GridError> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = Self::new(rows.len(), width)?;
        for (i, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(GridError::RaggedRows {
                    row: i,
                    found,
                    expected: width,
                });
            }
            let y = (rows.len() - 1 - i) as i32;
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.set_cell(x as i32, y, true);
                }
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// True if (x, y) is inside the grid and occupied
    pub fn occupied(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map_or(false, |i| self.cells[i])
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// Topmost occupied row of column `x`, or [`EMPTY_RELIEF`]
    pub fn relief(&self, x: usize) -> i32 {
        self.relief.get(x).copied().unwrap_or(EMPTY_RELIEF)
    }

    /// Covered holes in column `x`
    pub fn gaps(&self, x: usize) -> i32 {
        self.gaps.get(x).copied().unwrap_or(0)
    }

    pub fn reliefs(&self) -> &[i32] {
        &self.relief
    }

    /// Occupied rows of column `x`, ascending
    pub fn stack(&self, x: usize) -> &[i32] {
        match self.stack_len.get(x) {
            Some(&len) => &self.stacks[x * self.height..x * self.height + len],
            None => &[],
        }
    }

    pub fn row_fill(&self, y: usize) -> usize {
        self.row_fill.get(y).copied().unwrap_or(0)
    }

    /// Indices of full rows, ascending
    pub fn full_rows(&self) -> &[usize] {
        &self.full_rows
    }

    pub fn total_gaps(&self) -> i32 {
        self.gaps.iter().sum()
    }

    pub fn total_cells(&self) -> usize {
        self.row_fill.iter().sum()
    }

    pub fn n_total_cleared(&self) -> usize {
        self.n_total_cleared
    }

    pub fn n_last_cleared(&self) -> usize {
        self.n_last_cleared
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Set one cell, keeping all derived state in step.
    ///
    /// Returns false if the cell is out of bounds; setting a cell to its
    /// current value is a no-op that returns true.
    pub fn set_cell(&mut self, x: i32, y: i32, occupied: bool) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if self.cells[idx] != occupied {
            if occupied {
                self.fill_cell(x as usize, y, idx);
            } else {
                self.empty_cell(x as usize, y, idx);
            }
        }
        true
    }

    /// Lock a block into the grid.
    ///
    /// Fails without touching the grid if the block has no shape or any of its
    /// cells is out of bounds or already occupied.
    pub fn add_block(&mut self, block: &Block) -> bool {
        if self.collides(block) {
            return false;
        }
        for c in block.cells() {
            if let Some(idx) = self.index(c.x, c.y) {
                self.fill_cell(c.x as usize, c.y, idx);
            }
        }
        true
    }

    /// Exact inverse of [`Grid::add_block`].
    ///
    /// Fails without touching the grid unless every cell of the block is
    /// inside the grid and occupied.
    pub fn remove_block(&mut self, block: &Block) -> bool {
        if block.orientation().is_none() || !block.cells().all(|c| self.occupied(c.x, c.y)) {
            return false;
        }
        for c in block.cells() {
            if let Some(idx) = self.index(c.x, c.y) {
                self.empty_cell(c.x as usize, c.y, idx);
            }
        }
        true
    }

    /// True if the block leaves the grid or overlaps an occupied cell.
    pub fn collides(&self, block: &Block) -> bool {
        let Some(o) = block.orientation() else {
            return true;
        };
        let off = block.offset();
        let (Some(right), Some(top)) = (
            off.x.checked_add(o.width()),
            off.y.checked_add(o.height()),
        ) else {
            return true;
        };
        if off.x < 0 || off.y < 0 || right as usize > self.width || top as usize > self.height {
            return true;
        }
        block.cells().any(|c| self.occupied(c.x, c.y))
    }

    /// Place a block at the spawn position: centered, top of the grid.
    ///
    /// Returns whether the spawned block is collision-free.
    pub fn spawn(&self, block: &mut Block) -> bool {
        let Some(shape) = block.shape() else {
            return false;
        };
        let x = (self.width as i32 - block.width()) / 2;
        // Same elevation for every rotation, so rotating never needs a re-lift.
        let y = self.height as i32 - shape.max_dim_len();
        block.set_offset(Coord::new(x, y));
        !self.collides(block)
    }

    /// Drop a block as far as it goes; returns the distance moved.
    pub fn drop(&self, block: &mut Block) -> i32 {
        if block.orientation().is_none() {
            return 0;
        }

        let mut amount = i32::MAX;
        for c in block.crust(Direction::Bot) {
            let Some(x) = usize::try_from(c.x).ok().filter(|&x| x < self.width) else {
                return 0;
            };
            amount = amount.min(c.y.saturating_sub(self.relief[x] + 1));
        }

        if amount < 0 {
            // Some crust cell is below its column's relief: step down one row
            // at a time until a crust cell would hit something.
            amount = 0;
            while block.crust(Direction::Bot).all(|c| {
                let y = c.y.saturating_sub(amount + 1);
                y >= 0 && !self.occupied(c.x, y)
            }) {
                amount += 1;
            }
        }

        block.shift(Direction::Bot, amount);
        amount
    }

    /// Move a block, undoing the move if it collides.
    pub fn move_validated(&self, block: &mut Block, dir: Direction, amount: i32) -> bool {
        if block.orientation().is_none() {
            return false;
        }
        let start = block.offset();
        block.shift(dir, amount);
        if self.collides(block) {
            block.set_offset(start);
            return false;
        }
        true
    }

    /// Rotate a block, undoing the rotation if it collides.
    pub fn rotate_validated(&self, block: &mut Block, amount: i32) -> bool {
        if block.orientation().is_none() {
            return false;
        }
        let start = block.rot();
        block.rotate(amount);
        if self.collides(block) {
            block.set_rot(start);
            return false;
        }
        true
    }

    /// Remove every full row, shifting the rows above down; returns the count.
    pub fn clear_lines(&mut self) -> usize {
        if self.full_rows.is_empty() {
            return 0;
        }

        let width = self.width;
        let lowest = self.full_rows[0];
        let top = self.top_row_bound();

        // Take every row that will move or vanish out of the hash ...
        self.xor_rows(lowest, top);

        // ... compact ...
        let mut write = lowest;
        for read in lowest..top {
            if self.row_fill[read] == width {
                continue;
            }
            if write != read {
                self.cells
                    .copy_within(read * width..(read + 1) * width, write * width);
                self.row_fill[write] = self.row_fill[read];
            }
            write += 1;
        }
        for y in write..top {
            self.cells[y * width..(y + 1) * width].fill(false);
            self.row_fill[y] = 0;
        }

        // ... and put the surviving rows back in at their new height.
        self.xor_rows(lowest, write);

        let cleared = top - write;
        self.full_rows.clear();
        for x in 0..width {
            self.rebuild_column(x, write);
        }

        self.n_total_cleared += cleared;
        self.n_last_cleared = cleared;
        trace!(cleared, total = self.n_total_cleared, "cleared lines");
        cleared
    }

    /// First column that forms a well at least four rows deep with room for
    /// an upright I piece.
    pub fn tetris_ready(&self) -> Option<usize> {
        let neighbour = |x: Option<usize>| x.and_then(|x| self.relief.get(x).copied());
        (0..self.width).find(|&x| {
            let r = self.relief[x];
            let deep_enough = |n: Option<i32>| n.map_or(true, |h| h - r >= TETRIS_DEPTH);
            deep_enough(neighbour(x.checked_sub(1)))
                && deep_enough(neighbour(Some(x + 1)))
                && (1..=TETRIS_DEPTH).all(|dy| {
                    self.in_bounds(x as i32, r + dy) && !self.occupied(x as i32, r + dy)
                })
        })
    }

    /// Deep copy from a grid of the same dimensions.
    pub fn copy_from(&mut self, src: &Grid) -> Result<(), GridError> {
        if self.width != src.width || self.height != src.height {
            return Err(GridError::DimensionMismatch {
                dst_width: self.width,
                dst_height: self.height,
                src_width: src.width,
                src_height: src.height,
            });
        }
        // Same dimensions, so every buffer already has the right length.
        self.cells.copy_from_slice(&src.cells);
        self.relief.copy_from_slice(&src.relief);
        self.gaps.copy_from_slice(&src.gaps);
        self.stacks.copy_from_slice(&src.stacks);
        self.stack_len.copy_from_slice(&src.stack_len);
        self.row_fill.copy_from_slice(&src.row_fill);
        self.full_rows.clone_from(&src.full_rows);
        self.n_total_cleared = src.n_total_cleared;
        self.n_last_cleared = src.n_last_cleared;
        self.hash = src.hash;
        Ok(())
    }

    /// Recompute all derived state from occupancy and compare.
    pub fn audit(&self) -> Result<(), GridError> {
        let mut fresh = Self::new(self.height, self.width)?;
        let mut hash = 0;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.occupied(x, y) {
                    fresh.set_cell(x, y, true);
                    hash ^= cell_key(x as usize, y as usize);
                }
            }
        }

        let check = |ok: bool, what: &'static str, index: usize| {
            if ok {
                Ok(())
            } else {
                Err(GridError::Inconsistent { what, index })
            }
        };
        for x in 0..self.width {
            check(self.relief[x] == fresh.relief[x], "relief", x)?;
            check(self.gaps[x] == fresh.gaps[x], "gaps", x)?;
            check(self.stack(x) == fresh.stack(x), "stack", x)?;

            let r = self.relief[x];
            let holes = (0..r.max(0)).filter(|&y| !self.occupied(x as i32, y)).count();
            check(self.gaps[x] as usize == holes, "gaps", x)?;
        }
        for y in 0..self.height {
            let filled = self.cells[y * self.width..(y + 1) * self.width]
                .iter()
                .filter(|&&c| c)
                .count();
            check(self.row_fill[y] == filled, "row_fill", y)?;
            check(
                (filled == self.width) == self.full_rows.contains(&y),
                "full_rows",
                y,
            )?;
        }
        check(self.hash == hash, "hash", 0)
    }

    fn fill_cell(&mut self, x: usize, y: i32, idx: usize) {
        self.cells[idx] = true;
        self.hash ^= cell_key(x, y as usize);

        let yu = y as usize;
        self.row_fill[yu] += 1;
        if self.row_fill[yu] == self.width {
            let pos = self.full_rows.partition_point(|&r| r < yu);
            self.full_rows.insert(pos, yu);
        }

        let base = x * self.height;
        let len = self.stack_len[x];
        let relief = self.relief[x];
        if y > relief {
            // Cells skipped between the old and the new relief become gaps.
            self.gaps[x] += y - relief - 1;
            self.relief[x] = y;
            self.stacks[base + len] = y;
        } else {
            self.gaps[x] -= 1;
            let column = &mut self.stacks[base..base + len + 1];
            let pos = column[..len].partition_point(|&r| r < y);
            column.copy_within(pos..len, pos + 1);
            column[pos] = y;
        }
        self.stack_len[x] = len + 1;
    }

    fn empty_cell(&mut self, x: usize, y: i32, idx: usize) {
        self.cells[idx] = false;
        self.hash ^= cell_key(x, y as usize);

        let yu = y as usize;
        if self.row_fill[yu] == self.width {
            self.full_rows.retain(|&r| r != yu);
        }
        self.row_fill[yu] -= 1;

        let base = x * self.height;
        let len = self.stack_len[x];
        if y == self.relief[x] {
            let below = if len >= 2 {
                self.stacks[base + len - 2]
            } else {
                EMPTY_RELIEF
            };
            // Empty cells between the next relief and the removed one stop
            // counting as covered.
            self.gaps[x] -= y - below - 1;
            self.relief[x] = below;
        } else {
            self.gaps[x] += 1;
            let column = &mut self.stacks[base..base + len];
            let pos = column.partition_point(|&r| r < y);
            column.copy_within(pos + 1..len, pos);
        }
        self.stack_len[x] = len - 1;
    }

    /// One past the highest occupied row
    fn top_row_bound(&self) -> usize {
        self.relief.iter().copied().max().map_or(0, |r| (r + 1) as usize)
    }

    fn xor_rows(&mut self, from: usize, to: usize) {
        for y in from..to {
            for x in 0..self.width {
                if self.cells[y * self.width + x] {
                    self.hash ^= cell_key(x, y);
                }
            }
        }
    }

    /// Recompute relief, gaps and stack of column `x`, scanning rows below `top`.
    fn rebuild_column(&mut self, x: usize, top: usize) {
        let base = x * self.height;
        let mut len = 0;
        for y in 0..top {
            if self.cells[y * self.width + x] {
                self.stacks[base + len] = y as i32;
                len += 1;
            }
        }
        self.stack_len[x] = len;
        if len == 0 {
            self.relief[x] = EMPTY_RELIEF;
            self.gaps[x] = 0;
        } else {
            let relief = self.stacks[base + len - 1];
            self.relief[x] = relief;
            self.gaps[x] = relief + 1 - len as i32;
        }
    }
}

// Stack storage past each column's length is scratch, so equality goes
// through the public view.
impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.hash == other.hash
            && self.cells == other.cells
            && self.relief == other.relief
            && self.gaps == other.gaps
            && self.row_fill == other.row_fill
            && self.full_rows == other.full_rows
            && self.n_total_cleared == other.n_total_cleared
            && self.n_last_cleared == other.n_last_cleared
            && (0..self.width).all(|x| self.stack(x) == other.stack(x))
    }
}

impl Eq for Grid {}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height as i32).rev() {
            for x in 0..self.width as i32 {
                f.write_str(if self.occupied(x, y) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// `vec![value; len]` that reports allocation failure instead of aborting
fn filled<T: Clone>(len: usize, value: T, area: usize) -> Result<Vec<T>, GridError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| GridError::OutOfMemory(area))?;
    v.resize(len, value);
    Ok(v)
}

/// Fixed pseudo-random key of cell (x, y), used by the incremental hash
#[inline]
pub fn cell_key(x: usize, y: usize) -> u64 {
    // SplitMix64 finalizer over the packed coordinate.
    let mut z = ((y as u64) << 32 | x as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
