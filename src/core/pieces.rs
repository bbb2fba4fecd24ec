//! Shape catalog: tetromino layouts, rotation, and SRS wall-kick data.
//!
//! Two rotation systems are supported:
//! - SRS: rotate each cell 90 degrees about a per-shape fixed center inside
//!   the Guideline bounding box (3x3 for J/L/S/T/Z, 4x4 for I/O), with
//!   table-driven wall kicks. Reference: https://tetris.wiki/SRS
//! - Simple: rotate about the origin via (x, z) -> (z, -x), renormalize so
//!   min x/z land on 0, and try a fixed horizontal kick list.
//!
//! Coordinates are (x, z) with z up; all math stays on integers (the I/O
//! center sits on a grid-line crossing, handled with doubled coordinates).

use crate::types::{Cell, PieceKind, Rotation, RotationSystem};

/// Four cells in local (bounding-box) coordinates.
pub type PieceCells = [Cell; 4];

/// Spawn-state (rotation 0) layout inside the SRS fixed bounding box.
pub fn spawn_cells(kind: PieceKind) -> PieceCells {
    match kind {
        // I/O use the 4x4 box.
        PieceKind::I => [(0, 2), (1, 2), (2, 2), (3, 2)],
        PieceKind::O => [(1, 1), (2, 1), (1, 2), (2, 2)],
        // The rest use the 3x3 box.
        PieceKind::T => [(0, 1), (1, 1), (2, 1), (1, 2)],
        PieceKind::S => [(0, 1), (1, 1), (1, 2), (2, 2)],
        PieceKind::Z => [(1, 1), (2, 1), (0, 2), (1, 2)],
        PieceKind::J => [(0, 1), (1, 1), (2, 1), (0, 2)],
        PieceKind::L => [(0, 1), (1, 1), (2, 1), (2, 2)],
    }
}

/// Rotation center in doubled coordinates (2*cx, 2*cz), so the I/O
/// half-integer center stays integral.
fn rotation_center_x2(kind: PieceKind) -> (i32, i32) {
    match kind {
        // I/O rotate about the center of the 4x4 box: (1.5, 1.5).
        PieceKind::I | PieceKind::O => (3, 3),
        // The 3x3 shapes rotate about their center cell: (1, 1).
        _ => (2, 2),
    }
}

/// Rotate one cell 90 degrees clockwise about the shape center.
/// With z up, a clockwise turn maps the offset (dx, dz) to (dz, -dx).
fn rotate_cell_cw(cell: Cell, center_x2: (i32, i32)) -> Cell {
    let (cx2, cz2) = center_x2;
    let dx2 = 2 * cell.0 - cx2;
    let dz2 = 2 * cell.1 - cz2;
    ((cx2 + dz2) / 2, (cz2 - dx2) / 2)
}

/// Rotate a cell set clockwise about the origin and renormalize so the
/// minimum x and z are zero (simple system).
fn rotate_cells_simple(cells: PieceCells) -> PieceCells {
    let mut rotated = cells.map(|(x, z)| (z, -x));
    let min_x = rotated.iter().map(|&(x, _)| x).min().unwrap_or(0);
    let min_z = rotated.iter().map(|&(_, z)| z).min().unwrap_or(0);
    for cell in rotated.iter_mut() {
        *cell = (cell.0 - min_x, cell.1 - min_z);
    }
    rotated
}

/// Local cells of a shape at the given rotation state, canonically sorted
/// by (z, x) so downstream comparisons are order-independent.
pub fn cells_for(kind: PieceKind, rotation: Rotation, system: RotationSystem) -> PieceCells {
    let mut cells = spawn_cells(kind);
    let turns = rotation.index();

    match system {
        RotationSystem::Simple => {
            for _ in 0..turns {
                cells = rotate_cells_simple(cells);
            }
        }
        RotationSystem::Srs => {
            let center = rotation_center_x2(kind);
            for _ in 0..turns {
                cells = cells.map(|cell| rotate_cell_cw(cell, center));
            }
        }
    }

    cells.sort_by_key(|&(x, z)| (z, x));
    cells
}

/// Bounding box of a cell set: (min_x, min_z, max_x, max_z).
pub fn bounding_box(cells: &[Cell]) -> (i32, i32, i32, i32) {
    let mut min_x = i32::MAX;
    let mut min_z = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_z = i32::MIN;
    for &(x, z) in cells {
        min_x = min_x.min(x);
        min_z = min_z.min(z);
        max_x = max_x.max(x);
        max_z = max_z.max(z);
    }
    (min_x, min_z, max_x, max_z)
}

/// Kick offsets for the simple system, tried in order.
pub const SIMPLE_KICKS: [Cell; 5] = [(0, 0), (1, 0), (-1, 0), (2, 0), (-2, 0)];

const NO_KICK: [Cell; 1] = [(0, 0)];

/// Guideline SRS kick translations for J/L/S/T/Z, keyed by (from, to).
fn srs_kicks_jlstz(from: u8, to: u8) -> &'static [Cell] {
    match (from, to) {
        (0, 1) => &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
        (1, 0) => &[(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
        (1, 2) => &[(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
        (2, 1) => &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
        (2, 3) => &[(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
        (3, 2) => &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
        (3, 0) => &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
        (0, 3) => &[(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
        _ => &NO_KICK,
    }
}

/// Guideline SRS kick translations for I, keyed by (from, to).
fn srs_kicks_i(from: u8, to: u8) -> &'static [Cell] {
    match (from, to) {
        (0, 1) => &[(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
        (1, 0) => &[(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
        (1, 2) => &[(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
        (2, 1) => &[(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
        (2, 3) => &[(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
        (3, 2) => &[(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
        (3, 0) => &[(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
        (0, 3) => &[(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
        _ => &NO_KICK,
    }
}

/// Kick offsets to try, in priority order, for a rotation transition.
///
/// O never kicks; the simple system ignores the shape and transition and
/// always returns the fixed horizontal list.
pub fn wall_kicks(
    kind: PieceKind,
    from: Rotation,
    to: Rotation,
    system: RotationSystem,
) -> &'static [Cell] {
    if system == RotationSystem::Simple {
        return &SIMPLE_KICKS;
    }
    if from == to || kind == PieceKind::O {
        return &NO_KICK;
    }
    match kind {
        PieceKind::I => srs_kicks_i(from.index(), to.index()),
        _ => srs_kicks_jlstz(from.index(), to.index()),
    }
}
