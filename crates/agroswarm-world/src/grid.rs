//! The field grid: a fixed-size, row-major matrix of [`Cell`]s.
//!
//! Dimensions are set at construction and never change. Cells are addressed
//! by `(x, y)` where `x` is the column; agents hold coordinates, never
//! references, so the grid is the only owner of cell state.

use agroswarm_types::{Cell, CropType, Position};

use crate::error::WorldError;

/// Relative offsets of the 8-connected neighbourhood, column-major
/// (`dx` outer, `dy` inner).
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A `width x height` field of cells stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FieldGrid {
    /// Create a grid of fallow cells.
    ///
    /// Dimensions are trusted as supplied; a zero dimension yields an
    /// empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width.saturating_mul(height);
        Self {
            width,
            height,
            cells: vec![Cell::fallow(); len],
        }
    }

    /// Grid width (columns).
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height (rows).
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `(x, y)` lies inside the grid.
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Flat storage index of `(x, y)`, or `None` if out of bounds.
    pub fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        y.checked_mul(self.width)?.checked_add(x)
    }

    /// Borrow the cell at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        self.index_of(x, y).and_then(|i| self.cells.get(i))
    }

    /// Mutably borrow the cell at `(x, y)`.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        self.index_of(x, y).and_then(|i| self.cells.get_mut(i))
    }

    /// Borrow the cell at `position`, or report it as out of bounds.
    pub fn cell(&self, position: Position) -> Result<&Cell, WorldError> {
        self.get(position.x, position.y)
            .ok_or_else(|| self.out_of_bounds(position))
    }

    /// Mutably borrow the cell at `position`, or report it as out of bounds.
    pub fn cell_mut(&mut self, position: Position) -> Result<&mut Cell, WorldError> {
        let err = self.out_of_bounds(position);
        self.get_mut(position.x, position.y).ok_or(err)
    }

    const fn out_of_bounds(&self, position: Position) -> WorldError {
        WorldError::OutOfBounds {
            x: position.x,
            y: position.y,
            width: self.width,
            height: self.height,
        }
    }

    /// All cells in storage order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All cells in storage order, mutably.
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Iterate `(position, cell)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        let width = self.width.max(1);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let x = i.checked_rem(width).unwrap_or(0);
            let y = i.checked_div(width).unwrap_or(0);
            (Position::new(x, y), cell)
        })
    }

    /// The up-to-8 in-bounds neighbours of `(x, y)`.
    ///
    /// Order is fixed (`dx` outer, `dy` inner) so that stochastic passes
    /// consume randomness deterministically.
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            self.contains(nx, ny).then_some((nx, ny))
        })
    }

    /// Number of planted cells per crop type, indexed by [`CropType::index`].
    pub fn crop_counts(&self) -> [usize; CropType::COUNT] {
        let mut counts = [0_usize; CropType::COUNT];
        for crop in self.cells.iter().filter_map(|c| c.crop) {
            if let Some(slot) = counts.get_mut(crop.index()) {
                *slot = slot.saturating_add(1);
            }
        }
        counts
    }

    /// Number of planted (non-fallow) cells.
    pub fn planted_count(&self) -> usize {
        self.cells.iter().filter(|c| c.has_crop()).count()
    }
}
