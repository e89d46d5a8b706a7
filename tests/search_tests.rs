//! Move search: legality, exhaustiveness, and that the live grid is left alone

use proptest::prelude::*;
use tetris_ai::core::{Block, Grid, Shape, ShapeStream, ShapeTable};
use tetris_ai::engine::{Feature, MoveSearch, SearchError, Weights};
use tetris_ai::types::{Coord, Direction, Move, ShapeKind};

/// Put a block where the search evaluates `mv` and drop it.
fn land<'t>(grid: &Grid, shape: &'t Shape, mv: Move) -> Block<'t> {
    let mut block = Block::with_shape(shape);
    block.set_rot(mv.rot);
    block.set_offset(Coord::new(mv.col, grid.height() as i32 - block.height()));
    assert!(!grid.collides(&block), "{:?} starts inside the stack", mv);
    grid.drop(&mut block);
    block
}

fn any_legal(grid: &Grid, shape: &Shape) -> bool {
    (0..shape.n_rot()).any(|rot| {
        (0..grid.width() as i32).any(|col| {
            let mut block = Block::with_shape(shape);
            block.set_rot(rot);
            block.set_offset(Coord::new(col, grid.height() as i32 - block.height()));
            !grid.collides(&block)
        })
    })
}

#[test]
fn test_search_avoids_landing_on_lone_cell() {
    let table = ShapeTable::standard().unwrap();
    let shape = table.by_kind(ShapeKind::I).unwrap();
    let mut grid = Grid::new(20, 14).unwrap();
    grid.set_cell(6, 0, true);

    let mut stream = ShapeStream::new(&table, 1, 1);
    let mut search = MoveSearch::new(20, 14).unwrap();
    let mv = search
        .find_best(&grid, &Block::with_shape(shape), &mut stream, &Weights::default())
        .unwrap();

    let block = land(&grid, shape, mv);
    assert!(
        block.cells().all(|c| c != Coord::new(6, 1)),
        "{:?} landed on the filled cell",
        mv
    );
    assert_eq!(block.extreme(Direction::Bot), Some(0));
}

#[test]
fn test_weights_steer_the_choice() {
    let table = ShapeTable::standard().unwrap();
    let shape = table.by_kind(ShapeKind::I).unwrap();
    let grid = Grid::new(20, 10).unwrap();
    let mut stream = ShapeStream::new(&table, 1, 1);
    let mut search = MoveSearch::new(20, 10).unwrap();

    // Rewarding height makes the upright I the best move.
    let mut weights = Weights::new([0.0; Feature::COUNT]);
    weights.set(Feature::MaxHeight, 1.0);
    let mv = search
        .find_best(&grid, &Block::with_shape(shape), &mut stream, &weights)
        .unwrap();
    assert_eq!(mv, Move::new(1, 0));
}

#[test]
fn test_depth_two_picks_legal_moves() {
    let table = ShapeTable::standard().unwrap();
    let grid = Grid::from_ascii(&[
        "......",
        "......",
        "......",
        "......",
        "......",
        "##.###",
        "##.###",
        "##.###",
    ])
    .unwrap();
    let shape = table.by_kind(ShapeKind::O).unwrap();
    let mut stream = ShapeStream::new(&table, 2, 9);

    let mut shallow = MoveSearch::new(8, 6).unwrap();
    let mut deep = MoveSearch::new(8, 6).unwrap().with_depth(2).unwrap();
    let block = Block::with_shape(shape);

    let a = shallow
        .find_best(&grid, &block, &mut stream, &Weights::default())
        .unwrap();
    let b = deep
        .find_best(&grid, &block, &mut stream, &Weights::default())
        .unwrap();
    land(&grid, shape, a);
    land(&grid, shape, b);
}

#[test]
fn test_uninitialized_block_is_rejected() {
    let table = ShapeTable::standard().unwrap();
    let grid = Grid::new(20, 10).unwrap();
    let mut stream = ShapeStream::new(&table, 1, 1);
    let mut search = MoveSearch::new(20, 10).unwrap();
    assert_eq!(
        search.find_best(&grid, &Block::new(), &mut stream, &Weights::default()),
        Err(SearchError::NoShape)
    );
}

proptest! {
    #[test]
    fn chosen_move_is_legal_and_grid_untouched(
        cells in prop::collection::vec((0i32..10, 0i32..14), 0..80),
        shape in 0usize..7,
        depth in 1usize..=2,
        seed in any::<u64>(),
    ) {
        let table = ShapeTable::standard().unwrap();
        let shape = &table.as_slice()[shape];
        let mut grid = Grid::new(16, 10).unwrap();
        for (x, y) in cells {
            grid.set_cell(x, y, true);
        }
        let before = grid.clone();

        let mut stream = ShapeStream::new(&table, 3, seed);
        let mut search = MoveSearch::new(16, 10).unwrap().with_depth(depth).unwrap();
        let block = Block::with_shape(shape);
        let result = search.find_best(&grid, &block, &mut stream, &Weights::default());

        if any_legal(&grid, shape) {
            let mv = result.unwrap();
            let block = land(&grid, shape, mv);
            prop_assert!(!grid.collides(&block));
        } else {
            prop_assert_eq!(result, Err(SearchError::NoLegalMove));
        }
        prop_assert_eq!(grid, before);
    }
}
