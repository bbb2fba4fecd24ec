//! Advisor module - heuristic placement search.
//!
//! Enumerates every (rotation, column) landing of the active piece, scores
//! the resulting board with a linear combination of four features, and
//! recommends the strictly best candidate. Ties keep the first find in
//! rotation-then-column order, which keeps the search deterministic and
//! testable. A 2-ply variant also plays out the best continuation of the
//! next queued piece with a discounted weight.
//!
//! The advisor only reads the engine; it never mutates the state it
//! inspects.

use crate::core::board::Board;
use crate::core::game_state::GameState;
use crate::core::pieces::{bounding_box, cells_for};
use crate::types::{Cell, PieceKind, Rotation, RotationSystem};

/// Discount applied to the next piece's best score in the 2-ply search.
pub const DEFAULT_NEXT_WEIGHT: f64 = 0.8;

/// Score penalty for a placement that leaves the next piece no legal
/// landing. Kept finite so such a placement still wins when nothing else
/// is legal at all.
const NO_CONTINUATION_PENALTY: f64 = 1.0e9;

const ROTATIONS: [Rotation; 4] = [Rotation::R0, Rotation::R1, Rotation::R2, Rotation::R3];

/// Feature weights for the board evaluation. Higher score is better, so
/// undesirable features carry negative weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub aggregate_height: f64,
    pub lines: f64,
    pub holes: f64,
    pub bumpiness: f64,
}

impl Default for Weights {
    /// Baseline weights common to published 1-ply heuristic players.
    fn default() -> Self {
        Self {
            aggregate_height: -0.510066,
            lines: 0.760666,
            holes: -0.35663,
            bumpiness: -0.184483,
        }
    }
}

impl Weights {
    /// Survival-first: punishes holes hard.
    pub fn stable() -> Self {
        Self {
            aggregate_height: -0.55,
            lines: 0.65,
            holes: -0.9,
            bumpiness: -0.35,
        }
    }

    /// Score-seeking: favors clears enough to set up multi-line clears.
    pub fn high_score() -> Self {
        Self {
            aggregate_height: -0.42,
            lines: 1.15,
            holes: -0.45,
            bumpiness: -0.18,
        }
    }

    /// Spectator-friendly: keeps the stack low and flat.
    pub fn show() -> Self {
        Self {
            aggregate_height: -0.5,
            lines: 0.6,
            holes: -0.6,
            bumpiness: -0.55,
        }
    }
}

/// A candidate landing with its evaluation breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub rotation: Rotation,
    pub x: i32,
    /// Anchor z after the simulated drop.
    pub z: i32,
    pub score: f64,
    pub lines_cleared: u32,
    pub holes: u32,
    pub aggregate_height: i32,
    pub bumpiness: i32,
}

fn absolute_cells(local: &[Cell; 4], x: i32, z: i32) -> [Cell; 4] {
    local.map(|(cx, cz)| (x + cx, z + cz))
}

/// Drop the shape straight down from `start_z` until the next step would
/// collide. Returns the landing z, or None when the start pose already
/// collides (that column/rotation is unreachable).
fn drop_z(board: &Board, local: &[Cell; 4], x: i32, start_z: i32) -> Option<i32> {
    if board.collides(&absolute_cells(local, x, start_z)) {
        return None;
    }
    let mut z = start_z;
    while !board.collides(&absolute_cells(local, x, z - 1)) {
        z -= 1;
    }
    Some(z)
}

/// Overlay a landed piece and clear full rows. None when any landed cell
/// would sit at or above the board top (an overflowing placement would
/// distort the evaluation).
fn simulate_lock(
    board: &Board,
    local: &[Cell; 4],
    x: i32,
    z: i32,
    kind: PieceKind,
) -> Option<(Board, u32)> {
    let mut simulated = board.clone();
    for (cx, cz) in absolute_cells(local, x, z) {
        if cz >= board.height() || !simulated.set(cx, cz, kind) {
            return None;
        }
    }
    let rows = simulated.full_rows();
    let lines = rows.len() as u32;
    simulated.remove_rows(&rows);
    Some((simulated, lines))
}

/// Linear evaluation: (score, holes, aggregate height, bumpiness).
fn evaluate(board: &Board, lines_cleared: u32, weights: &Weights) -> (f64, u32, i32, i32) {
    let width = board.width();
    let heights: Vec<i32> = (0..width).map(|x| board.column_height(x)).collect();

    let aggregate_height: i32 = heights.iter().sum();

    // A hole is any empty cell strictly below its column's top.
    let mut holes = 0u32;
    for x in 0..width {
        for z in 0..heights[x as usize] {
            if !board.is_occupied(x, z) {
                holes += 1;
            }
        }
    }

    let bumpiness: i32 = heights.windows(2).map(|w| (w[0] - w[1]).abs()).sum();

    let score = weights.aggregate_height * aggregate_height as f64
        + weights.lines * lines_cleared as f64
        + weights.holes * holes as f64
        + weights.bumpiness * bumpiness as f64;

    (score, holes, aggregate_height, bumpiness)
}

/// Enumerate landings of `kind` on `board` starting from `start_z` and
/// fold each evaluated candidate into `visit`.
fn for_each_landing<F>(
    board: &Board,
    kind: PieceKind,
    system: RotationSystem,
    start_z: i32,
    mut visit: F,
) where
    F: FnMut(Rotation, i32, i32, Board, u32),
{
    for rotation in ROTATIONS {
        let local = cells_for(kind, rotation, system);
        let (_, _, max_x, _) = bounding_box(&local);

        for x in 0..(board.width() - max_x) {
            let Some(z) = drop_z(board, &local, x, start_z) else {
                continue;
            };
            let Some((simulated, lines)) = simulate_lock(board, &local, x, z, kind) else {
                continue;
            };
            visit(rotation, x, z, simulated, lines);
        }
    }
}

/// Spawn-row anchor z for a shape, where the drop simulation of a
/// not-yet-spawned piece starts.
fn spawn_start_z(kind: PieceKind, height: i32, system: RotationSystem) -> i32 {
    let local = cells_for(kind, Rotation::R0, system);
    let (_, _, _, max_z) = bounding_box(&local);
    (height - 1) - max_z
}

/// 1-ply search over the active piece. The drop starts from the piece's
/// current z, so an in-flight piece only considers placements it can still
/// reach. None when there is no active piece or no legal landing.
pub fn best_placement(state: &GameState, weights: &Weights) -> Option<Placement> {
    let piece = state.active()?;
    let mut best: Option<Placement> = None;

    for_each_landing(
        state.board(),
        piece.kind,
        piece.system,
        piece.z,
        |rotation, x, z, simulated, lines| {
            let (score, holes, aggregate_height, bumpiness) =
                evaluate(&simulated, lines, weights);
            let candidate = Placement {
                rotation,
                x,
                z,
                score,
                lines_cleared: lines,
                holes,
                aggregate_height,
                bumpiness,
            };
            if best.as_ref().map_or(true, |b| candidate.score > b.score) {
                best = Some(candidate);
            }
        },
    );

    best
}

/// 2-ply search: each first-piece landing is scored as its own evaluation
/// plus `next_weight` times the best landing of the queued next piece on
/// the resulting board. A first placement that strands the next piece is
/// penalized, not discarded. Degrades to 1-ply when the queue is empty.
pub fn best_placement_2ply(
    state: &GameState,
    weights: &Weights,
    next_weight: f64,
) -> Option<Placement> {
    let piece = state.active()?;
    let Some(&next_kind) = state.peek_next(1).first() else {
        return best_placement(state, weights);
    };

    let height = state.board().height();
    let next_start_z = spawn_start_z(next_kind, height, piece.system);
    let mut best: Option<Placement> = None;

    for_each_landing(
        state.board(),
        piece.kind,
        piece.system,
        piece.z,
        |rotation, x, z, simulated, lines| {
            let (outer_score, holes, aggregate_height, bumpiness) =
                evaluate(&simulated, lines, weights);

            let mut best_inner: Option<f64> = None;
            for_each_landing(
                &simulated,
                next_kind,
                piece.system,
                next_start_z,
                |_, _, _, inner_board, inner_lines| {
                    let (inner_score, _, _, _) = evaluate(&inner_board, inner_lines, weights);
                    if best_inner.map_or(true, |s| inner_score > s) {
                        best_inner = Some(inner_score);
                    }
                },
            );

            let score = match best_inner {
                Some(inner) => outer_score + next_weight * inner,
                None => outer_score - NO_CONTINUATION_PENALTY,
            };

            let candidate = Placement {
                rotation,
                x,
                z,
                score,
                lines_cleared: lines,
                holes,
                aggregate_height,
                bumpiness,
            };
            if best.as_ref().map_or(true, |b| candidate.score > b.score) {
                best = Some(candidate);
            }
        },
    );

    best
}
