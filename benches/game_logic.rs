use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetris_ai::core::{Block, Grid, ShapeStream, ShapeTable};
use tetris_ai::engine::{MoveSearch, Weights};
use tetris_ai::types::{Coord, ShapeKind};

fn bench_find_best(c: &mut Criterion) {
    let table = ShapeTable::standard().unwrap();
    let mut stream = ShapeStream::new(&table, 5, 12345);
    let grid = Grid::from_ascii(&[
        "..........",
        "..........",
        "....#.....",
        "#..###...#",
        "##.####.##",
        "####.#####",
    ])
    .unwrap();
    let block = Block::with_shape(table.by_kind(ShapeKind::T).unwrap());
    let weights = Weights::default();
    let mut search = MoveSearch::new(grid.height(), grid.width()).unwrap();

    c.bench_function("find_best_t", |b| {
        b.iter(|| {
            search
                .find_best(black_box(&grid), &block, &mut stream, &weights)
                .unwrap();
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut grid = Grid::new(20, 10).unwrap();
            // Fill bottom 4 rows
            for y in 0..4 {
                for x in 0..10 {
                    grid.set_cell(x, y, true);
                }
            }
            grid.clear_lines();
        })
    });
}

fn bench_add_remove(c: &mut Criterion) {
    let table = ShapeTable::standard().unwrap();
    let mut grid = Grid::new(20, 10).unwrap();
    let mut block = Block::with_shape(table.by_kind(ShapeKind::L).unwrap());
    block.set_offset(Coord::new(4, 3));

    c.bench_function("add_remove_block", |b| {
        b.iter(|| {
            grid.add_block(black_box(&block));
            grid.remove_block(black_box(&block));
        })
    });
}

fn bench_drop(c: &mut Criterion) {
    let table = ShapeTable::standard().unwrap();
    let grid = Grid::from_ascii(&[
        "..........",
        "..........",
        "..........",
        "..........",
        "..#..#....",
        "#####.####",
    ])
    .unwrap();
    let shape = table.by_kind(ShapeKind::S).unwrap();

    c.bench_function("drop", |b| {
        b.iter(|| {
            let mut block = Block::with_shape(shape);
            block.set_offset(Coord::new(3, 4));
            grid.drop(black_box(&mut block))
        })
    });
}

criterion_group!(
    benches,
    bench_find_best,
    bench_line_clear,
    bench_add_remove,
    bench_drop
);
criterion_main!(benches);
