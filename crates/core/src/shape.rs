//! Shape module - tetromino geometry tables
//!
//! Every shape is built once from a four-cell description of its base
//! rotation. The remaining rotations are derived by turning the previous one
//! 90 degrees inside the shape's bounding square and re-normalizing, so every
//! rotation's cells start at `(0, 0)`.
//!
//! Alongside the cells, each rotation carries a "crust" per [`Direction`]: the
//! outermost cell of every column (for `Bot`/`Top`) or row (for
//! `Left`/`Right`). Only crust cells can be the first to touch an obstacle
//! when the shape moves in that direction, which keeps collision and drop
//! queries to a handful of lookups.
//!
//! # Description format
//!
//! One shape per line, an optional `name:` prefix followed by four `x,y`
//! pairs. Blank lines and `#` comments are skipped:
//!
//! ```text
//! # the T piece
//! t: 0,0 1,0 2,0 1,1
//! ```

use std::str::FromStr;

use arrayvec::ArrayVec;
use tracing::debug;

use crate::error::ShapeError;
use crate::types::{Coord, Direction, ShapeKind, CELLS_PER_SHAPE, MAX_ROTATIONS};

/// Fixed-capacity list of shape cells
pub type CellList = ArrayVec<Coord, CELLS_PER_SHAPE>;

/// The seven standard tetrominoes (y grows upward)
pub const STANDARD_SHAPES: &str = "\
i: 0,0 1,0 2,0 3,0
j: 0,1 0,0 1,0 2,0
l: 2,1 0,0 1,0 2,0
o: 0,0 1,0 0,1 1,1
s: 0,0 1,0 1,1 2,1
t: 0,0 1,0 2,0 1,1
z: 0,1 1,1 1,0 2,0
";

/// Geometry of one rotation of a shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orientation {
    width: i32,
    height: i32,
    /// Sorted by descending y, then ascending x
    cells: CellList,
    crusts: [CellList; 4],
}

impl Orientation {
    fn from_cells(cells: &CellList) -> Self {
        let mut sorted = cells.clone();
        sorted.sort_by_key(|c| (std::cmp::Reverse(c.y), c.x));

        let width = sorted.iter().map(|c| c.x).max().unwrap_or(-1) + 1;
        let height = sorted.iter().map(|c| c.y).max().unwrap_or(-1) + 1;
        let crusts = Direction::ALL.map(|dir| crust(&sorted, dir));

        Self {
            width,
            height,
            cells: sorted,
            crusts,
        }
    }

    /// Bounding-box width
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Bounding-box height
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Cells relative to the bounding box's bottom-left corner
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Silhouette cells facing `dir`, ordered by column (or row)
    pub fn crust(&self, dir: Direction) -> &[Coord] {
        &self.crusts[dir.index()]
    }
}

/// An immutable tetromino with all of its rotations precomputed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    index: usize,
    kind: Option<ShapeKind>,
    n_rot: usize,
    max_dim_len: i32,
    orientations: [Orientation; MAX_ROTATIONS],
}

impl Shape {
    fn build(index: usize, kind: Option<ShapeKind>, base: &CellList) -> Self {
        let mut rotations: [CellList; MAX_ROTATIONS] = Default::default();
        rotations[0] = base.clone();
        normalize(&mut rotations[0]);

        let max_dim_len = rotations[0]
            .iter()
            .map(|c| c.x.max(c.y))
            .max()
            .unwrap_or(0)
            + 1;

        for k in 1..MAX_ROTATIONS {
            rotations[k] = rotate(&rotations[k - 1], max_dim_len);
        }
        let orientations = rotations.map(|cells| Orientation::from_cells(&cells));

        // Count rotations until the first orientation that repeats an earlier one.
        let mut n_rot = 1;
        for k in 1..MAX_ROTATIONS {
            if orientations[..k]
                .iter()
                .any(|o| o.cells == orientations[k].cells)
            {
                break;
            }
            n_rot += 1;
        }

        Self {
            index,
            kind,
            n_rot,
            max_dim_len,
            orientations,
        }
    }

    /// Position of this shape in its table
    pub fn index(&self) -> usize {
        self.index
    }

    /// Standard tetromino kind, if the description named one
    pub fn kind(&self) -> Option<ShapeKind> {
        self.kind
    }

    /// Number of distinct rotation states (1..=4)
    pub fn n_rot(&self) -> usize {
        self.n_rot
    }

    /// Side of the square the base rotation is turned inside
    pub fn max_dim_len(&self) -> i32 {
        self.max_dim_len
    }

    /// Geometry of rotation `rot`; all four indices are populated even when
    /// `n_rot < 4`.
    pub fn orientation(&self, rot: usize) -> Option<&Orientation> {
        self.orientations.get(rot)
    }

    pub fn cells(&self, rot: usize) -> &[Coord] {
        match self.orientation(rot) {
            Some(o) => o.cells(),
            None => &[],
        }
    }

    pub fn crust(&self, rot: usize, dir: Direction) -> &[Coord] {
        match self.orientation(rot) {
            Some(o) => o.crust(dir),
            None => &[],
        }
    }
}

/// All shapes available to a game, built once and shared read-only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeTable {
    shapes: Vec<Shape>,
}

impl ShapeTable {
    /// Build the seven standard tetrominoes
    pub fn standard() -> Result<Self, ShapeError> {
        Self::parse(STANDARD_SHAPES)
    }

    /// Build a table from a textual description (see the module docs).
    ///
    /// Any malformed line fails the whole table.
    pub fn parse(text: &str) -> Result<Self, ShapeError> {
        let mut shapes = Vec::new();
        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let (kind, cells) = parse_line(line_no + 1, line)?;
            shapes.push(Shape::build(shapes.len(), kind, &cells));
        }

        if shapes.is_empty() {
            return Err(ShapeError::Empty);
        }
        debug!(shapes = shapes.len(), "built shape table");
        Ok(Self { shapes })
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Always false for a successfully built table
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Shape> {
        self.shapes.get(idx)
    }

    pub fn by_kind(&self, kind: ShapeKind) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.kind == Some(kind))
    }

    pub fn as_slice(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shape> {
        self.shapes.iter()
    }

    /// Largest `max_dim_len` over all shapes
    pub fn max_dim_len(&self) -> i32 {
        self.shapes.iter().map(Shape::max_dim_len).max().unwrap_or(0)
    }
}

impl FromStr for ShapeTable {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'a> IntoIterator for &'a ShapeTable {
    type Item = &'a Shape;
    type IntoIter = std::slice::Iter<'a, Shape>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn parse_line(line: usize, text: &str) -> Result<(Option<ShapeKind>, CellList), ShapeError> {
    let (kind, body) = match text.split_once(':') {
        Some((name, body)) => (ShapeKind::from_str(name.trim()), body),
        None => (None, text),
    };

    let mut cells = CellList::new();
    let mut found = 0;
    for token in body.split_whitespace() {
        let coord = token
            .split_once(',')
            .and_then(|(x, y)| Some(Coord::new(x.trim().parse().ok()?, y.trim().parse().ok()?)))
            .ok_or_else(|| ShapeError::Parse {
                line,
                token: token.to_string(),
            })?;

        found += 1;
        if found > CELLS_PER_SHAPE {
            continue;
        }
        if cells.contains(&coord) {
            return Err(ShapeError::DuplicateCell {
                line,
                x: coord.x,
                y: coord.y,
            });
        }
        cells.push(coord);
    }

    if found != CELLS_PER_SHAPE {
        return Err(ShapeError::CellCount { line, found });
    }
    Ok((kind, cells))
}

/// Shift cells so the minimum x and minimum y are both 0
fn normalize(cells: &mut CellList) {
    let min_x = cells.iter().map(|c| c.x).min().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
    for c in cells.iter_mut() {
        c.x -= min_x;
        c.y -= min_y;
    }
}

/// Quarter turn inside a `max_dim` square, re-normalized
fn rotate(cells: &CellList, max_dim: i32) -> CellList {
    let mut out: CellList = cells
        .iter()
        .map(|c| Coord::new(c.y, max_dim - 1 - c.x))
        .collect();
    normalize(&mut out);
    out
}

/// Outermost cell per column (vertical directions) or row (horizontal)
fn crust(cells: &[Coord], dir: Direction) -> CellList {
    let line = |c: Coord| if dir.is_vertical() { c.x } else { c.y };
    let beats = |a: Coord, b: Coord| match dir {
        Direction::Bot => a.y < b.y,
        Direction::Top => a.y > b.y,
        Direction::Left => a.x < b.x,
        Direction::Right => a.x > b.x,
    };

    let mut out = CellList::new();
    for &c in cells {
        match out.iter_mut().find(|o| line(**o) == line(c)) {
            Some(o) => {
                if beats(c, *o) {
                    *o = c;
                }
            }
            None => out.push(c),
        }
    }
    out.sort_by_key(|&c| line(c));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(pairs: &[(i32, i32)]) -> Vec<Coord> {
        pairs.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    #[test]
    fn test_standard_rotation_counts() {
        let table = ShapeTable::standard().unwrap();
        let expected = [
            (ShapeKind::I, 2),
            (ShapeKind::J, 4),
            (ShapeKind::L, 4),
            (ShapeKind::O, 1),
            (ShapeKind::S, 2),
            (ShapeKind::T, 4),
            (ShapeKind::Z, 2),
        ];
        assert_eq!(table.len(), 7);
        for (kind, n_rot) in expected {
            let shape = table.by_kind(kind).unwrap();
            assert_eq!(shape.n_rot(), n_rot, "{:?}", kind);
            assert_eq!(shape.index(), kind.index());
        }
    }

    #[test]
    fn test_i_piece_geometry() {
        let table = ShapeTable::standard().unwrap();
        let i = table.by_kind(ShapeKind::I).unwrap();
        assert_eq!(i.max_dim_len(), 4);

        let flat = i.orientation(0).unwrap();
        assert_eq!((flat.width(), flat.height()), (4, 1));
        let upright = i.orientation(1).unwrap();
        assert_eq!((upright.width(), upright.height()), (1, 4));
        assert_eq!(
            upright.cells(),
            coords(&[(0, 3), (0, 2), (0, 1), (0, 0)]).as_slice()
        );
    }

    #[test]
    fn test_t_piece_rotations() {
        let table = ShapeTable::standard().unwrap();
        let t = table.by_kind(ShapeKind::T).unwrap();

        // Pointing up, then right, then down, then left.
        assert_eq!(t.cells(0), coords(&[(1, 1), (0, 0), (1, 0), (2, 0)]).as_slice());
        assert_eq!(t.cells(1), coords(&[(0, 2), (0, 1), (1, 1), (0, 0)]).as_slice());
        assert_eq!(t.cells(2), coords(&[(0, 1), (1, 1), (2, 1), (1, 0)]).as_slice());
        assert_eq!(t.cells(3), coords(&[(1, 2), (0, 1), (1, 1), (1, 0)]).as_slice());
    }

    #[test]
    fn test_cells_are_normalized_for_every_rotation() {
        let table = ShapeTable::standard().unwrap();
        for shape in &table {
            for rot in 0..MAX_ROTATIONS {
                let cells = shape.cells(rot);
                assert_eq!(cells.len(), CELLS_PER_SHAPE);
                assert_eq!(cells.iter().map(|c| c.x).min(), Some(0));
                assert_eq!(cells.iter().map(|c| c.y).min(), Some(0));
                let o = shape.orientation(rot).unwrap();
                assert!(o.width() <= shape.max_dim_len());
                assert!(o.height() <= shape.max_dim_len());
            }
        }
    }

    #[test]
    fn test_four_quarter_turns_return_to_start() {
        let table = ShapeTable::standard().unwrap();
        for shape in &table {
            let mut cells: CellList = shape.cells(3).iter().copied().collect();
            cells = rotate(&cells, shape.max_dim_len());
            let back = Orientation::from_cells(&cells);
            assert_eq!(back.cells(), shape.cells(0));
        }
    }

    #[test]
    fn test_crust_keeps_extreme_cell_per_line() {
        let table = ShapeTable::standard().unwrap();
        let t = table.by_kind(ShapeKind::T).unwrap();

        assert_eq!(
            t.crust(0, Direction::Bot),
            coords(&[(0, 0), (1, 0), (2, 0)]).as_slice()
        );
        assert_eq!(
            t.crust(0, Direction::Top),
            coords(&[(0, 0), (1, 1), (2, 0)]).as_slice()
        );
        assert_eq!(
            t.crust(0, Direction::Left),
            coords(&[(0, 0), (1, 1)]).as_slice()
        );
        assert_eq!(
            t.crust(0, Direction::Right),
            coords(&[(2, 0), (1, 1)]).as_slice()
        );

        let i = table.by_kind(ShapeKind::I).unwrap();
        assert_eq!(i.crust(1, Direction::Bot), coords(&[(0, 0)]).as_slice());
        assert_eq!(i.crust(1, Direction::Left).len(), 4);
    }

    #[test]
    fn test_parse_rejects_wrong_cell_count() {
        assert_eq!(
            ShapeTable::parse("x: 0,0 1,0 2,0"),
            Err(ShapeError::CellCount { line: 1, found: 3 })
        );
        assert_eq!(
            ShapeTable::parse("0,0 1,0 2,0 3,0 4,0"),
            Err(ShapeError::CellCount { line: 1, found: 5 })
        );
    }

    #[test]
    fn test_parse_rejects_garbage_and_duplicates() {
        assert_eq!(
            ShapeTable::parse("\n# comment\nt: 0,0 1,x 2,0 1,1"),
            Err(ShapeError::Parse {
                line: 3,
                token: "1,x".to_string()
            })
        );
        assert_eq!(
            ShapeTable::parse("0,0 1,0 1,0 2,0"),
            Err(ShapeError::DuplicateCell { line: 1, x: 1, y: 0 })
        );
        assert_eq!(ShapeTable::parse("  \n# nothing\n"), Err(ShapeError::Empty));
    }

    #[test]
    fn test_parse_normalizes_offset_input() {
        let table: ShapeTable = "5,5 6,5 5,6 6,6".parse().unwrap();
        let o = table.get(0).unwrap();
        assert_eq!(o.kind(), None);
        assert_eq!(o.n_rot(), 1);
        assert_eq!(o.max_dim_len(), 2);
        assert_eq!(o.cells(0), coords(&[(0, 1), (1, 1), (0, 0), (1, 0)]).as_slice());
    }
}
