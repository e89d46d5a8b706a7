//! Move search - exhaustive placement search with weighted evaluation
//!
//! For the current shape, every rotation and every column where the bounding
//! box fits is tried: the block is lowered from the top of the grid, locked
//! into a scratch copy, full rows are cleared on a second scratch copy, and
//! the resulting grid is scored with [`Weights`]. The first placement with the
//! highest score wins (rotation outer, column inner, both ascending).
//!
//! With a depth of 2 the known next piece from the stream is placed the same
//! way on every candidate result, and a candidate scores as well as its best
//! follow-up. A candidate after which the next piece cannot be placed at all
//! scores negative infinity.
//!
//! Scratch grids are allocated once per [`MoveSearch`] and reused; the live
//! grid is only read.

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use tetris_ai_core::{Block, Grid, Shape, ShapeStream};
use tetris_ai_types::{Coord, Move};

use crate::error::SearchError;
use crate::features::Features;
use crate::weights::Weights;

/// Deepest supported search (current piece plus one previewed piece)
pub const MAX_DEPTH: usize = 2;

/// Scratch grids of one search level
#[derive(Debug, Clone)]
struct Level {
    /// Copy of the level's input grid; candidates are added and removed here
    work: Grid,
    /// Post-clear grid, written only when a candidate fills rows
    cleared: Grid,
}

impl Level {
    fn new(height: usize, width: usize) -> Result<Self, SearchError> {
        let grid = Grid::new(height, width)?;
        Ok(Self {
            work: grid.clone(),
            cleared: grid,
        })
    }
}

/// Reusable search state
#[derive(Debug, Clone)]
pub struct MoveSearch {
    depth: usize,
    levels: Vec<Level>,
}

impl MoveSearch {
    /// Single-piece search over grids of the given size.
    pub fn new(height: usize, width: usize) -> Result<Self, SearchError> {
        Ok(Self {
            depth: 1,
            levels: vec![Level::new(height, width)?],
        })
    }

    /// Set the search depth, clamped to `1..=MAX_DEPTH`.
    pub fn with_depth(mut self, depth: usize) -> Result<Self, SearchError> {
        self.depth = depth.clamp(1, MAX_DEPTH);
        self.reserve_levels()?;
        Ok(self)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Best placement of `block`'s shape on `grid`.
    ///
    /// Only the block's shape is used; its rotation and offset are ignored.
    /// At depth 2 the next piece is read with `stream.peek(0)`, which fills
    /// the slot but does not consume it.
    pub fn find_best(
        &mut self,
        grid: &Grid,
        block: &Block<'_>,
        stream: &mut ShapeStream<'_>,
        weights: &Weights,
    ) -> Result<Move, SearchError> {
        let shape = block.shape().ok_or(SearchError::NoShape)?;
        self.fit_to(grid)?;

        let mut shapes: ArrayVec<&Shape, MAX_DEPTH> = ArrayVec::new();
        shapes.push(shape);
        if self.depth > 1 {
            if let Some(next) = stream.peek(0) {
                shapes.push(next);
            }
        }

        let (best, score) = best_placement(&mut self.levels, grid, &shapes, weights)?
            .ok_or(SearchError::NoLegalMove)?;
        debug!(rot = best.rot, col = best.col, score, "search picked move");
        Ok(best)
    }

    /// Reallocate scratch grids if the live grid has a different size.
    fn fit_to(&mut self, grid: &Grid) -> Result<(), SearchError> {
        let fits = self.levels.first().map_or(false, |l| {
            l.work.width() == grid.width() && l.work.height() == grid.height()
        });
        if !fits {
            self.levels.clear();
            self.levels.push(Level::new(grid.height(), grid.width())?);
        }
        self.reserve_levels()
    }

    fn reserve_levels(&mut self) -> Result<(), SearchError> {
        let Some(first) = self.levels.first() else {
            return Ok(());
        };
        let (height, width) = (first.work.height(), first.work.width());
        while self.levels.len() < self.depth {
            self.levels.push(Level::new(height, width)?);
        }
        Ok(())
    }
}

/// Where the search lowers a candidate from: as high as the rotation fits.
pub fn probe_block<'t>(grid: &Grid, shape: &'t Shape, rot: usize, col: i32) -> Block<'t> {
    let mut block = Block::with_shape(shape);
    block.set_rot(rot);
    let y = grid.height() as i32 - block.height();
    block.set_offset(Coord::new(col, y));
    block
}

/// Highest-scoring placement of `shapes[0]` on `grid`, looking ahead through
/// the remaining shapes.
fn best_placement(
    levels: &mut [Level],
    grid: &Grid,
    shapes: &[&Shape],
    weights: &Weights,
) -> Result<Option<(Move, f64)>, SearchError> {
    let (Some((level, deeper)), Some((&shape, rest))) =
        (levels.split_first_mut(), shapes.split_first())
    else {
        return Ok(None);
    };
    level.work.copy_from(grid)?;

    let width = grid.width() as i32;
    let mut best: Option<(Move, f64)> = None;

    for rot in 0..shape.n_rot() {
        let span = width - probe_block(grid, shape, rot, 0).width();
        for col in 0..=span {
            let mut block = probe_block(grid, shape, rot, col);
            if level.work.collides(&block) {
                continue;
            }
            level.work.drop(&mut block);
            if !level.work.add_block(&block) {
                continue;
            }

            let result = if level.work.full_rows().is_empty() {
                evaluate(&level.work, deeper, rest, weights)
            } else {
                level.cleared.copy_from(&level.work)?;
                level.cleared.clear_lines();
                evaluate(&level.cleared, deeper, rest, weights)
            };
            level.work.remove_block(&block);
            let score = result?;

            trace!(rot, col, score, "candidate");
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((Move::new(rot, col), score));
            }
        }
    }
    Ok(best)
}

fn evaluate(
    grid: &Grid,
    levels: &mut [Level],
    shapes: &[&Shape],
    weights: &Weights,
) -> Result<f64, SearchError> {
    if shapes.is_empty() || levels.is_empty() {
        return Ok(weights.score(&Features::from_grid(grid)));
    }
    Ok(best_placement(levels, grid, shapes, weights)?.map_or(f64::NEG_INFINITY, |(_, s)| s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetris_ai_core::ShapeTable;
    use tetris_ai_types::ShapeKind;

    fn find(grid: &Grid, table: &ShapeTable, kind: ShapeKind) -> Result<Move, SearchError> {
        let mut stream = ShapeStream::new(table, 1, 1);
        let mut search = MoveSearch::new(grid.height(), grid.width()).unwrap();
        let block = Block::with_shape(table.by_kind(kind).unwrap());
        search.find_best(grid, &block, &mut stream, &Weights::default())
    }

    #[test]
    fn test_no_shape_is_an_error() {
        let table = ShapeTable::standard().unwrap();
        let grid = Grid::new(20, 10).unwrap();
        let mut stream = ShapeStream::new(&table, 1, 1);
        let mut search = MoveSearch::new(20, 10).unwrap();
        assert_eq!(
            search.find_best(&grid, &Block::new(), &mut stream, &Weights::default()),
            Err(SearchError::NoShape)
        );
    }

    #[test]
    fn test_empty_grid_prefers_flat_placement() {
        let table = ShapeTable::standard().unwrap();
        let grid = Grid::new(20, 10).unwrap();
        // Lying flat keeps the stack lowest; ties resolve to the leftmost column.
        assert_eq!(find(&grid, &table, ShapeKind::I), Ok(Move::new(0, 0)));
    }

    #[test]
    fn test_search_takes_the_tetris() {
        let table = ShapeTable::standard().unwrap();
        let grid = Grid::from_ascii(&[
            "....",
            "....",
            "#.##",
            "#.##",
            "#.##",
            "#.##",
        ])
        .unwrap();
        let before = grid.clone();

        assert_eq!(find(&grid, &table, ShapeKind::I), Ok(Move::new(1, 1)));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_no_legal_move_on_full_grid() {
        let table = ShapeTable::standard().unwrap();
        let grid = Grid::from_ascii(&["#.#.", "####", "####"]).unwrap();
        assert_eq!(
            find(&grid, &table, ShapeKind::O),
            Err(SearchError::NoLegalMove)
        );
    }

    #[test]
    fn test_scratch_follows_grid_size() {
        let table = ShapeTable::standard().unwrap();
        let grid = Grid::new(20, 10).unwrap();
        let mut stream = ShapeStream::new(&table, 1, 1);
        let mut search = MoveSearch::new(4, 4).unwrap();
        let block = Block::with_shape(table.by_kind(ShapeKind::T).unwrap());

        assert!(search
            .find_best(&grid, &block, &mut stream, &Weights::default())
            .is_ok());
    }

    #[test]
    fn test_depth_is_clamped() {
        let search = MoveSearch::new(20, 10).unwrap().with_depth(9).unwrap();
        assert_eq!(search.depth(), MAX_DEPTH);
        let search = MoveSearch::new(20, 10).unwrap().with_depth(0).unwrap();
        assert_eq!(search.depth(), 1);
    }

    #[test]
    fn test_depth_two_leaves_stream_unconsumed() {
        let table = ShapeTable::standard().unwrap();
        let grid = Grid::new(20, 10).unwrap();
        let mut stream = ShapeStream::new(&table, 3, 5);
        let next = stream.peek(0).unwrap().index();
        let mut search = MoveSearch::new(20, 10).unwrap().with_depth(2).unwrap();
        let block = Block::with_shape(table.by_kind(ShapeKind::T).unwrap());

        search
            .find_best(&grid, &block, &mut stream, &Weights::default())
            .unwrap();
        assert_eq!(stream.pop().index(), next);
    }
}
