//! Shape table tests - geometry invariants over every rotation

use tetris_ai::core::{ShapeError, ShapeStream, ShapeTable};
use tetris_ai::types::{Direction, ShapeKind, CELLS_PER_SHAPE};

#[test]
fn test_standard_table_order() {
    let table = ShapeTable::standard().unwrap();
    assert_eq!(table.len(), 7);
    for (i, kind) in ShapeKind::ALL.iter().enumerate() {
        assert_eq!(table.get(i).unwrap().kind(), Some(*kind));
        assert_eq!(table.by_kind(*kind).unwrap().index(), i);
    }
}

#[test]
fn test_rotations_are_normalized_and_boxed() {
    let table = ShapeTable::standard().unwrap();
    for shape in &table {
        for rot in 0..shape.n_rot() {
            let o = shape.orientation(rot).unwrap();
            let cells = o.cells();
            assert_eq!(cells.len(), CELLS_PER_SHAPE);
            assert_eq!(cells.iter().map(|c| c.x).min(), Some(0));
            assert_eq!(cells.iter().map(|c| c.y).min(), Some(0));
            assert_eq!(cells.iter().map(|c| c.x).max(), Some(o.width() - 1));
            assert_eq!(cells.iter().map(|c| c.y).max(), Some(o.height() - 1));
            assert!(o.width().max(o.height()) <= shape.max_dim_len());
        }
    }
}

#[test]
fn test_crusts_hold_one_cell_per_line() {
    let table = ShapeTable::standard().unwrap();
    for shape in &table {
        for rot in 0..shape.n_rot() {
            let o = shape.orientation(rot).unwrap();
            for dir in Direction::ALL {
                let crust = o.crust(dir);
                let lines = if dir.is_vertical() { o.width() } else { o.height() };
                assert_eq!(
                    crust.len(),
                    lines as usize,
                    "shape {} rot {} {:?}",
                    shape.index(),
                    rot,
                    dir
                );

                // Stepping any crust cell outward leaves the shape.
                for c in crust {
                    assert!(!o.cells().contains(&c.step(dir, 1)));
                }
            }
        }
    }
}

#[test]
fn test_custom_table() {
    let table: ShapeTable = "# custom pieces\n0,0 1,0 0,1 0,2\nbar: 0,0 0,1 0,2 0,3\n"
        .parse()
        .unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(0).unwrap().kind(), None);
    assert_eq!(table.get(0).unwrap().n_rot(), 4);
    assert_eq!(table.get(1).unwrap().n_rot(), 2);

    // A stream over a custom table only yields its shapes.
    let mut stream = ShapeStream::new(&table, 2, 4);
    for _ in 0..50 {
        assert!(stream.pop().index() < 2);
    }
}

#[test]
fn test_malformed_tables_fail_whole_build() {
    assert_eq!(ShapeTable::parse("# nothing\n\n"), Err(ShapeError::Empty));
    assert!(matches!(
        ShapeTable::parse("0,0 1,0 2,0 3,0\n0,0 1,0 2,0\n"),
        Err(ShapeError::CellCount { line: 2, found: 3 })
    ));
    assert!(matches!(
        ShapeTable::parse("0,0 1,0 x,0 3,0\n"),
        Err(ShapeError::Parse { line: 1, .. })
    ));
    assert!(matches!(
        ShapeTable::parse("0,0 1,0 1,0 3,0\n"),
        Err(ShapeError::DuplicateCell { line: 1, x: 1, y: 0 })
    ));
}
