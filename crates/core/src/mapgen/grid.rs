//! Boolean walkability grid derived from rooms and connector cells.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Pos, Rect};

use super::model::Connector;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWalkGrid")]
pub struct WalkGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

/// Unchecked wire form; converted only when the cell count matches the dimensions.
#[derive(Deserialize)]
struct RawWalkGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellCountMismatch {
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for CellCountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "walk grid needs {} cells, found {}", self.expected, self.actual)
    }
}

impl TryFrom<RawWalkGrid> for WalkGrid {
    type Error = CellCountMismatch;

    fn try_from(raw: RawWalkGrid) -> Result<Self, Self::Error> {
        let expected = raw.width.checked_mul(raw.height).unwrap_or(usize::MAX);
        if raw.cells.len() != expected {
            return Err(CellCountMismatch { expected, actual: raw.cells.len() });
        }
        Ok(Self { width: raw.width, height: raw.height, cells: raw.cells })
    }
}

impl WalkGrid {
    /// Grid with every cell blocked.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![false; width * height] }
    }

    /// Marks every room cell and every in-bounds connector cell walkable.
    pub fn build(rooms: &[Rect], connectors: &[Connector], width: usize, height: usize) -> Self {
        let mut grid = Self::new(width, height);
        for room in rooms {
            for pos in room.cells() {
                grid.set(pos, true);
            }
        }
        for connector in connectors {
            for &pos in &connector.cells {
                grid.set(pos, true);
            }
        }
        grid
    }

    /// Parses rows of `.` (walkable) and anything else (blocked). Rows must share one length.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            debug_assert_eq!(row.chars().count(), width, "row {y} has a different width");
            for (x, cell) in row.chars().enumerate() {
                grid.set(Pos { y: y as i32, x: x as i32 }, cell == '.');
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Out-of-bounds cells are never walkable.
    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.cells[self.index(pos)]
    }

    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Pos, walkable: bool) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.cells[idx] = walkable;
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|&&walkable| walkable).count()
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}
