//! Board module - the locked-cell occupancy map.
//!
//! Width and height are runtime configuration, so storage is a sparse
//! `HashMap<Cell, PieceKind>` rather than a fixed array.
//! Coordinates: (x, z) where x ranges 0..width (left to right) and z ranges
//! 0..height with z growing upward; gravity moves pieces toward z = 0.
//! Cells above the top row are legal while a piece is falling and only
//! matter at lock time.

use std::collections::HashMap;

use arrayvec::ArrayVec;

use crate::types::{Cell, PieceKind};

/// The playfield grid. Owns every locked, not-yet-cleared cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: i32,
    height: i32,
    occupied: HashMap<Cell, PieceKind>,
}

impl Board {
    /// Create a new empty board. Dimensions are validated by `EngineConfig`.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            occupied: HashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Kind of the locked cell at (x, z), if any.
    pub fn get(&self, x: i32, z: i32) -> Option<PieceKind> {
        self.occupied.get(&(x, z)).copied()
    }

    /// Write a cell. Returns false when (x, z) is outside the grid.
    pub fn set(&mut self, x: i32, z: i32, kind: PieceKind) -> bool {
        if x < 0 || x >= self.width || z < 0 || z >= self.height {
            return false;
        }
        self.occupied.insert((x, z), kind);
        true
    }

    pub fn is_occupied(&self, x: i32, z: i32) -> bool {
        self.occupied.contains_key(&(x, z))
    }

    /// Collision test for a falling piece's absolute cells.
    ///
    /// A cell collides when it leaves the side walls, sinks below the floor,
    /// or overlaps a locked cell. Cells at or above the top row do NOT
    /// collide here; the over-height check belongs to the lock step.
    pub fn collides(&self, cells: &[Cell]) -> bool {
        cells.iter().any(|&(x, z)| {
            x < 0 || x >= self.width || z < 0 || (z < self.height && self.is_occupied(x, z))
        })
    }

    /// Check if a row is completely filled.
    pub fn is_row_full(&self, z: i32) -> bool {
        if z < 0 || z >= self.height {
            return false;
        }
        (0..self.width).all(|x| self.is_occupied(x, z))
    }

    /// Row indices that are completely filled, bottom to top.
    /// A single tetromino lock can fill at most 4.
    pub fn full_rows(&self) -> ArrayVec<i32, 4> {
        let mut rows = ArrayVec::new();
        for z in 0..self.height {
            if self.is_row_full(z) && rows.try_push(z).is_err() {
                break;
            }
        }
        rows
    }

    /// Remove the given rows and shift every surviving cell down by the
    /// number of removed rows below it.
    pub fn remove_rows(&mut self, rows: &[i32]) {
        if rows.is_empty() {
            return;
        }
        let mut shifted = HashMap::with_capacity(self.occupied.len());
        for (&(x, z), &kind) in &self.occupied {
            if rows.contains(&z) {
                continue;
            }
            let drop = rows.iter().filter(|&&row| row < z).count() as i32;
            shifted.insert((x, z - drop), kind);
        }
        self.occupied = shifted;
    }

    /// Number of locked cells.
    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// Locked cells with their kinds, sorted by (z, x) for stable output.
    pub fn cells(&self) -> Vec<(Cell, PieceKind)> {
        let mut cells: Vec<(Cell, PieceKind)> = self
            .occupied
            .iter()
            .map(|(&cell, &kind)| (cell, kind))
            .collect();
        cells.sort_by_key(|&((x, z), _)| (z, x));
        cells
    }

    /// Height of a column: highest occupied z + 1, or 0 when empty.
    pub fn column_height(&self, x: i32) -> i32 {
        (0..self.height)
            .rev()
            .find(|&z| self.is_occupied(x, z))
            .map_or(0, |z| z + 1)
    }

    /// Empty the board.
    pub fn clear(&mut self) {
        self.occupied.clear();
    }
}
