//! Block module - a positioned, rotated shape
//!
//! A block is a plain value: moving or rotating it never consults the grid.
//! Validation is the grid's job (see [`crate::Grid::move_validated`]), which
//! lets the search push scratch blocks through arbitrary positions.

use crate::shape::{Orientation, Shape};
use crate::types::{Coord, Direction};

/// A shape bound to a rotation and a position on the playfield
///
/// `offset` is the grid position of the bottom-left corner of the current
/// rotation's bounding box.
#[derive(Debug, Clone, Copy, Default)]
pub struct Block<'t> {
    shape: Option<&'t Shape>,
    rot: usize,
    offset: Coord,
}

impl<'t> Block<'t> {
    /// Create an uninitialized block (no shape)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(shape: &'t Shape) -> Self {
        let mut block = Self::new();
        block.init(shape);
        block
    }

    /// Bind a shape, resetting rotation and position
    pub fn init(&mut self, shape: &'t Shape) {
        self.shape = Some(shape);
        self.rot = 0;
        self.offset = Coord::default();
    }

    pub fn shape(&self) -> Option<&'t Shape> {
        self.shape
    }

    pub fn rot(&self) -> usize {
        self.rot
    }

    pub fn offset(&self) -> Coord {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Coord) {
        self.offset = offset;
    }

    /// Set the rotation index, wrapping modulo the shape's rotation count
    pub fn set_rot(&mut self, rot: usize) {
        if let Some(shape) = self.shape {
            self.rot = rot % shape.n_rot();
        }
    }

    /// Distinct rotation count of the bound shape (0 when uninitialized)
    pub fn n_rot(&self) -> usize {
        self.shape.map_or(0, Shape::n_rot)
    }

    /// Geometry of the current rotation, if the rotation is valid for the shape
    pub fn orientation(&self) -> Option<&'t Orientation> {
        let shape = self.shape?;
        if self.rot >= shape.n_rot() {
            return None;
        }
        shape.orientation(self.rot)
    }

    /// Bounding-box width at the current rotation (0 when uninitialized)
    pub fn width(&self) -> i32 {
        self.orientation().map_or(0, Orientation::width)
    }

    /// Bounding-box height at the current rotation (0 when uninitialized)
    pub fn height(&self) -> i32 {
        self.orientation().map_or(0, Orientation::height)
    }

    /// Absolute coordinate of the `i`-th cell, or [`Coord::INVALID`].
    pub fn cell(&self, i: usize) -> Coord {
        self.orientation()
            .and_then(|o| o.cells().get(i))
            .map_or(Coord::INVALID, |&c| c.offset_by(self.offset))
    }

    /// Absolute coordinates of all cells (empty when uninitialized)
    pub fn cells(&self) -> impl Iterator<Item = Coord> + 't {
        let offset = self.offset;
        self.orientation()
            .map(Orientation::cells)
            .unwrap_or(&[])
            .iter()
            .map(move |&c| c.offset_by(offset))
    }

    /// Absolute coordinates of the crust facing `dir`
    pub fn crust(&self, dir: Direction) -> impl Iterator<Item = Coord> + 't {
        let offset = self.offset;
        self.orientation()
            .map(|o| o.crust(dir))
            .unwrap_or(&[])
            .iter()
            .map(move |&c| c.offset_by(offset))
    }

    /// Furthest row or column the block reaches in `dir`
    pub fn extreme(&self, dir: Direction) -> Option<i32> {
        let o = self.orientation()?;
        Some(match dir {
            Direction::Bot => self.offset.y,
            Direction::Top => self.offset.y.saturating_add(o.height() - 1),
            Direction::Left => self.offset.x,
            Direction::Right => self.offset.x.saturating_add(o.width() - 1),
        })
    }

    /// Move `amount` cells in `dir` without any bounds checking
    pub fn shift(&mut self, dir: Direction, amount: i32) {
        self.offset = self.offset.step(dir, amount);
    }

    /// Rotate by `amount` quarter turns (negative turns the other way)
    pub fn rotate(&mut self, amount: i32) {
        let n = self.n_rot() as i32;
        if n == 0 {
            return;
        }
        let turns = amount.rem_euclid(n) as usize;
        self.rot = (self.rot + turns) % n as usize;
    }
}
