//! Game state module - the engine state machine.
//!
//! Ties together board, shape catalog, RNG, and scoring. Every public
//! mutator runs to completion synchronously and reports success/failure
//! via bool/Option; failure never leaves partial state behind. The host
//! drives the engine once per input or timer tick.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, EngineConfig};
use crate::core::pieces::{bounding_box, cells_for, wall_kicks};
use crate::core::scoring::{self, score_clear};
use crate::core::{Board, PieceQueue};
use crate::types::{Cell, GameAction, PieceKind, Rotation, RotationSystem};

/// Most recent effective input, used by the T-spin heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastAction {
    Move,
    Rotate,
    Drop,
}

/// Active falling piece. Immutable value semantics: every successful
/// move/rotate installs a fresh value, never edits cells in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i32,
    pub z: i32,
    pub system: RotationSystem,
}

impl ActivePiece {
    /// Absolute board cells, in the catalog's canonical (z, x) order.
    pub fn cells(&self) -> [Cell; 4] {
        cells_for(self.kind, self.rotation, self.system)
            .map(|(dx, dz)| (self.x + dx, self.z + dz))
    }

    fn translated(&self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
            ..*self
        }
    }

    fn with_rotation(&self, rotation: Rotation, dx: i32, dz: i32) -> Self {
        Self {
            rotation,
            x: self.x + dx,
            z: self.z + dz,
            ..*self
        }
    }
}

/// Complete engine state.
#[derive(Debug, Clone)]
pub struct GameState {
    config: EngineConfig,
    /// Effective RNG seed (drawn from entropy when the config left it unset).
    seed: u32,
    board: Board,
    active: Option<ActivePiece>,
    queue: PieceQueue,
    hold: Option<PieceKind>,
    can_hold: bool,
    score: u64,
    level: u32,
    lines: u32,
    /// -1 means no active combo; >= 0 counts consecutive clearing locks.
    combo: i32,
    back_to_back: bool,
    /// Full rows detected at lock, pending removal by `finalize_clear`.
    clearing_rows: ArrayVec<i32, 4>,
    clear_progress: f64,
    last_action: Option<LastAction>,
    last_locked: bool,
    last_cleared_lines: u32,
    last_t_spin: bool,
    game_over: bool,
}

impl GameState {
    /// Create a new engine. Fails only on invalid configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let queue = PieceQueue::new(seed, config.next_queue_size);

        Ok(Self {
            config,
            seed,
            board: Board::new(config.width, config.height),
            active: None,
            queue,
            hold: None,
            can_hold: true,
            score: 0,
            level: 1,
            lines: 0,
            combo: -1,
            back_to_back: false,
            clearing_rows: ArrayVec::new(),
            clear_progress: 0.0,
            last_action: None,
            last_locked: false,
            last_cleared_lines: 0,
            last_t_spin: false,
            game_over: false,
        })
    }

    // --- accessors ---

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn width(&self) -> i32 {
        self.config.width
    }

    pub fn height(&self) -> i32 {
        self.config.height
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct occupancy write, for hosts that preload a scenario.
    /// Returns false when (x, z) is outside the grid.
    pub fn set_cell(&mut self, x: i32, z: i32, kind: PieceKind) -> bool {
        self.board.set(x, z, kind)
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn hold(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines
    }

    pub fn combo(&self) -> i32 {
        self.combo
    }

    pub fn back_to_back(&self) -> bool {
        self.back_to_back
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn clearing_rows(&self) -> &[i32] {
        &self.clearing_rows
    }

    pub fn clear_progress(&self) -> f64 {
        self.clear_progress
    }

    pub fn last_action(&self) -> Option<LastAction> {
        self.last_action
    }

    pub fn last_locked(&self) -> bool {
        self.last_locked
    }

    pub fn last_cleared_lines(&self) -> u32 {
        self.last_cleared_lines
    }

    pub fn last_t_spin(&self) -> bool {
        self.last_t_spin
    }

    /// Full preview queue, front first, without consuming.
    pub fn next_queue(&self) -> Vec<PieceKind> {
        self.queue.preview()
    }

    /// Up to `count` upcoming pieces without consuming.
    pub fn peek_next(&self, count: usize) -> Vec<PieceKind> {
        self.queue.peek(count)
    }

    // --- runtime configuration ---

    pub fn set_next_queue_size(&mut self, size: usize) -> Result<(), ConfigError> {
        if size == 0 {
            return Err(ConfigError::InvalidQueueSize(size));
        }
        self.config.next_queue_size = size;
        self.queue.set_preview_len(size);
        Ok(())
    }

    /// Changing the progression rate recomputes level from cumulative lines
    /// immediately, so the two never disagree.
    pub fn set_lines_per_level(&mut self, value: u32) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidLinesPerLevel(value));
        }
        self.config.lines_per_level = value;
        self.level = scoring::calculate_level(self.lines, value);
        Ok(())
    }

    /// Animation progress for the pending clear, clamped to [0, 1].
    pub fn set_clear_progress(&mut self, progress: f64) {
        self.clear_progress = progress.clamp(0.0, 1.0);
    }

    // --- spawn ---

    /// Deterministic spawn anchor: horizontally near-centered and clipped
    /// in-bounds, vertically so the highest cell sits on the top row.
    fn spawn_position(&self, kind: PieceKind) -> (i32, i32) {
        let local = cells_for(kind, Rotation::R0, self.config.rotation_system);
        let (_, _, max_x, max_z) = bounding_box(&local);

        // min-then-max keeps this total even when the board is narrower
        // than the shape (the spawn then collides and flags game over).
        let x = (self.config.width / 2 - 2)
            .min(self.config.width - 1 - max_x)
            .max(0);
        let z = (self.config.height - 1) - max_z;
        (x, z)
    }

    /// Spawn a new active piece, popping from the queue unless a shape is
    /// given. A colliding spawn is game over.
    pub fn spawn(&mut self, kind: Option<PieceKind>) -> bool {
        if self.game_over {
            return false;
        }

        let kind = kind.unwrap_or_else(|| self.queue.pop());
        let (x, z) = self.spawn_position(kind);
        let piece = ActivePiece {
            kind,
            rotation: Rotation::R0,
            x,
            z,
            system: self.config.rotation_system,
        };

        if self.board.collides(&piece.cells()) {
            self.active = None;
            self.game_over = true;
            return false;
        }

        self.active = Some(piece);
        self.can_hold = true;
        true
    }

    // --- movement & rotation ---

    pub fn try_move(&mut self, dx: i32, dz: i32) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        if self.game_over {
            return false;
        }

        let moved = piece.translated(dx, dz);
        if self.board.collides(&moved.cells()) {
            return false;
        }

        self.active = Some(moved);
        self.last_action = Some(LastAction::Move);
        true
    }

    /// Collision-only probe; never mutates.
    pub fn can_move(&self, dx: i32, dz: i32) -> bool {
        match self.active {
            Some(piece) if !self.game_over => {
                !self.board.collides(&piece.translated(dx, dz).cells())
            }
            _ => false,
        }
    }

    /// Rotate through the active system's kick list; the first offset whose
    /// cells fit wins. All-blocked leaves the piece untouched.
    pub fn try_rotate(&mut self, cw: bool) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        if self.game_over {
            return false;
        }

        let to = if cw {
            piece.rotation.cw()
        } else {
            piece.rotation.ccw()
        };

        let kicks = wall_kicks(piece.kind, piece.rotation, to, piece.system);
        for &(dx, dz) in kicks {
            let candidate = piece.with_rotation(to, dx, dz);
            if !self.board.collides(&candidate.cells()) {
                self.active = Some(candidate);
                self.last_action = Some(LastAction::Rotate);
                return true;
            }
        }

        false
    }

    // --- hold ---

    /// Swap the active shape with the hold slot, at most once per piece
    /// lifetime. The swapped-in shape spawns fresh.
    pub fn try_hold(&mut self) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        if self.game_over || !self.can_hold {
            return false;
        }

        let swapped_out = self.hold.replace(piece.kind);
        self.active = None;
        let ok = self.spawn(swapped_out);

        // Used up until the next lock-driven spawn.
        self.can_hold = false;
        ok
    }

    // --- lock & clear lifecycle ---

    /// Lock the active piece without attempting a downward move first, so
    /// hosts can implement their own lock-delay feel. Does not spawn the
    /// next piece; the caller does. Refused while a clear is pending.
    pub fn lock_current(&mut self) -> bool {
        if self.active.is_none() || self.game_over || !self.clearing_rows.is_empty() {
            return false;
        }
        self.lock_active();
        true
    }

    fn lock_active(&mut self) {
        let Some(piece) = self.active else {
            return;
        };

        self.last_locked = true;
        self.last_cleared_lines = 0;

        for (x, z) in piece.cells() {
            // Cells above the top row overflow the board: game over, and
            // the in-bounds remainder still locks.
            if z >= self.config.height {
                self.game_over = true;
                continue;
            }
            self.board.set(x, z, piece.kind);
        }

        self.last_t_spin = self.detect_t_spin(&piece);
        self.active = None;

        let full_rows = self.board.full_rows();
        if full_rows.is_empty() {
            self.clearing_rows.clear();
            self.clear_progress = 0.0;
            self.apply_clear_scoring(0);
        } else {
            self.last_cleared_lines = full_rows.len() as u32;
            self.clearing_rows = full_rows;
            self.clear_progress = 0.0;
            // Score now; row removal waits for finalize_clear.
            self.apply_clear_scoring(self.last_cleared_lines);
        }
    }

    /// Remove the pending full rows and shift everything above them down.
    /// Idempotent when nothing is pending.
    pub fn finalize_clear(&mut self) {
        if self.clearing_rows.is_empty() {
            return;
        }
        let rows: ArrayVec<i32, 4> = self.clearing_rows.clone();
        self.board.remove_rows(&rows);
        self.clearing_rows.clear();
        self.clear_progress = 0.0;
    }

    /// Simplified T-spin test: a T locked right after a rotation with at
    /// least 3 of the 4 diagonals around its 3x3 center blocked.
    fn detect_t_spin(&self, piece: &ActivePiece) -> bool {
        if piece.kind != PieceKind::T || self.last_action != Some(LastAction::Rotate) {
            return false;
        }

        let (cx, cz) = (piece.x + 1, piece.z + 1);
        let corners = [
            (cx - 1, cz - 1),
            (cx + 1, cz - 1),
            (cx - 1, cz + 1),
            (cx + 1, cz + 1),
        ];

        let blocked = corners
            .iter()
            .filter(|&&(x, z)| {
                x < 0
                    || x >= self.config.width
                    || z < 0
                    || z >= self.config.height
                    || self.board.is_occupied(x, z)
            })
            .count();

        blocked >= 3
    }

    fn apply_clear_scoring(&mut self, cleared: u32) {
        if cleared == 0 {
            // A lock with no clear breaks combo and back-to-back.
            self.combo = -1;
            self.back_to_back = false;
            return;
        }

        self.lines += cleared;
        self.combo = if self.combo >= 0 { self.combo + 1 } else { 0 };

        let result = score_clear(
            cleared,
            self.level,
            self.last_t_spin,
            self.combo,
            self.back_to_back,
            self.config.scoring_mode,
            self.config.combo_mode,
            self.config.combo_multiplier_step,
        );

        self.score += result.points;
        self.back_to_back = result.qualifies_for_b2b;
        self.level = scoring::calculate_level(self.lines, self.config.lines_per_level);
    }

    // --- gravity ---

    /// Gravity tick: move down one row, or lock and auto-spawn. Returns
    /// whether the piece actually moved (false signals a lock, or that no
    /// move was possible). Refused while a clear is pending.
    pub fn tick_down(&mut self) -> bool {
        if self.active.is_none() || !self.clearing_rows.is_empty() {
            return false;
        }

        self.last_locked = false;
        self.last_cleared_lines = 0;

        if self.try_move(0, -1) {
            return true;
        }

        self.lock_active();
        if !self.game_over && self.active.is_none() {
            self.spawn(None);
        }
        false
    }

    /// Drop straight down, lock, and auto-spawn. Awards 2 points per cell
    /// descended and returns the distance. Refused while a clear is pending.
    pub fn hard_drop(&mut self) -> u32 {
        if self.active.is_none() || self.game_over || !self.clearing_rows.is_empty() {
            return 0;
        }

        self.last_locked = false;
        self.last_cleared_lines = 0;

        let mut distance = 0;
        while self.try_move(0, -1) {
            distance += 1;
        }

        self.last_action = Some(LastAction::Drop);
        self.score += scoring::hard_drop_points(distance);

        self.lock_active();
        if !self.game_over && self.active.is_none() {
            self.spawn(None);
        }
        distance
    }

    /// Where the active piece would land on a hard drop. Pure simulation.
    pub fn ghost(&self) -> Option<ActivePiece> {
        let piece = self.active?;
        if self.game_over {
            return None;
        }

        let mut ghost = piece;
        loop {
            let candidate = ghost.translated(0, -1);
            if self.board.collides(&candidate.cells()) {
                return Some(ghost);
            }
            ghost = candidate;
        }
    }

    // --- replay entry point ---

    /// Dispatch one recorded action. Returns whether it had an effect.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.try_move(-1, 0),
            GameAction::MoveRight => self.try_move(1, 0),
            GameAction::SoftDrop => self.try_move(0, -1),
            GameAction::HardDrop => {
                let had_piece = self.active.is_some() && self.clearing_rows.is_empty();
                self.hard_drop();
                had_piece
            }
            GameAction::RotateCw => self.try_rotate(true),
            GameAction::RotateCcw => self.try_rotate(false),
            GameAction::Hold => self.try_hold(),
            GameAction::TickDown => {
                let had_piece = self.active.is_some() && self.clearing_rows.is_empty();
                self.tick_down();
                had_piece
            }
        }
    }

    /// Back to a freshly constructed state, except the RNG keeps running
    /// (reconstruct with the same seed to replay the original sequence).
    pub fn reset(&mut self) {
        self.board.clear();
        self.active = None;
        self.hold = None;
        self.can_hold = true;
        self.score = 0;
        self.level = 1;
        self.lines = 0;
        self.combo = -1;
        self.back_to_back = false;
        self.clearing_rows.clear();
        self.clear_progress = 0.0;
        self.last_action = None;
        self.last_locked = false;
        self.last_cleared_lines = 0;
        self.last_t_spin = false;
        self.game_over = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(width: i32, height: i32, seed: u32) -> GameState {
        let config = EngineConfig {
            width,
            height,
            seed: Some(seed),
            ..EngineConfig::default()
        };
        GameState::new(config).unwrap()
    }

    #[test]
    fn test_spawn_positions() {
        let mut state = engine(10, 20, 1);

        assert!(state.spawn(Some(PieceKind::I)));
        let piece = state.active().unwrap();
        // I spawns near-centered with its row on top.
        assert_eq!((piece.x, piece.z), (3, 17));

        let mut state = engine(10, 20, 1);
        assert!(state.spawn(Some(PieceKind::T)));
        let piece = state.active().unwrap();
        assert_eq!((piece.x, piece.z), (3, 17));
    }

    #[test]
    fn test_spawn_clamps_on_narrow_board() {
        let mut state = engine(4, 20, 1);
        assert!(state.spawn(Some(PieceKind::I)));
        let piece = state.active().unwrap();
        // width/2 - 2 = 0, and max_x = 3 keeps it at 0.
        assert_eq!(piece.x, 0);
    }

    #[test]
    fn test_move_and_walls() {
        let mut state = engine(10, 20, 1);
        state.spawn(Some(PieceKind::O));

        assert!(state.try_move(1, 0));
        assert!(state.can_move(0, -1));
        // Walk to the right wall.
        while state.try_move(1, 0) {}
        let x = state.active().unwrap().x;
        assert!(!state.can_move(1, 0));
        assert_eq!(state.active().unwrap().x, x);
        assert_eq!(state.last_action(), Some(LastAction::Move));
    }

    #[test]
    fn test_rotation_failure_keeps_state() {
        let mut state = engine(10, 20, 1);
        state.spawn(Some(PieceKind::I));
        // Wall in every kick target of a cw rotation from spawn.
        let before = *state.active().unwrap();
        for x in 0..10 {
            for z in 0..20 {
                state.board.set(x, z, PieceKind::J);
            }
        }
        assert!(!state.try_rotate(true));
        assert_eq!(*state.active().unwrap(), before);
    }

    #[test]
    fn test_hard_drop_scores_distance() {
        let mut state = engine(10, 20, 1);
        state.spawn(Some(PieceKind::I));
        let start_z = state.active().unwrap().z;
        let landing_z = state.ghost().unwrap().z;

        let distance = state.hard_drop();
        assert_eq!(distance as i32, start_z - landing_z);
        assert_eq!(distance, 19);
        assert_eq!(state.score(), distance as u64 * 2);
        assert!(state.last_locked());
        assert_eq!(state.last_cleared_lines(), 0);
        // Auto-spawned a replacement.
        assert!(state.active().is_some());
        // Locked flat on the floor.
        for x in 3..7 {
            assert!(state.board().is_occupied(x, 0));
        }
    }

    #[test]
    fn test_tick_down_locks_at_floor() {
        let mut state = engine(10, 20, 1);
        state.spawn(Some(PieceKind::O));

        let mut ticks = 0;
        while state.tick_down() {
            ticks += 1;
        }
        assert!(ticks > 0);
        assert!(state.last_locked());
        assert!(state.active().is_some());
    }

    #[test]
    fn test_hold_once_per_lifetime() {
        let mut state = engine(10, 20, 1);
        state.spawn(Some(PieceKind::T));

        assert!(state.try_hold());
        assert_eq!(state.hold(), Some(PieceKind::T));
        assert!(!state.can_hold());
        assert!(!state.try_hold());

        // After a lock-driven spawn, hold works again and swaps back.
        state.hard_drop();
        assert!(state.can_hold());
        let active_kind = state.active().unwrap().kind;
        assert!(state.try_hold());
        assert_eq!(state.hold(), Some(active_kind));
        assert_eq!(state.active().unwrap().kind, PieceKind::T);
    }

    #[test]
    fn test_ghost_matches_hard_drop() {
        let mut state = engine(10, 20, 1);
        state.spawn(Some(PieceKind::L));
        state.try_move(2, 0);

        let ghost = state.ghost().unwrap();
        let ghost_cells = ghost.cells();
        state.hard_drop();
        for (x, z) in ghost_cells {
            assert!(state.board().is_occupied(x, z));
        }
    }

    #[test]
    fn test_deferred_clear_locks_board() {
        let mut state = engine(4, 10, 1);
        // Fill the bottom row except where a vertical I will land.
        for x in 0..3 {
            state.board.set(x, 0, PieceKind::J);
        }
        state.spawn(Some(PieceKind::I));
        state.try_rotate(true);
        // Park the vertical bar in the open last column.
        while state.try_move(1, 0) {}
        state.hard_drop();

        assert_eq!(state.last_cleared_lines(), 1);
        assert_eq!(state.clearing_rows(), &[0]);
        // Row still present until finalize; gravity is refused meanwhile.
        assert!(state.board().is_row_full(0));
        assert!(!state.tick_down());
        assert_eq!(state.hard_drop(), 0);
        assert!(!state.lock_current());

        let before = state.board().occupied_count();
        state.finalize_clear();
        assert_eq!(state.board().occupied_count(), before - 4);
        assert!(!state.board().is_row_full(0));
        // Idempotent with nothing pending.
        state.finalize_clear();
        assert!(state.clearing_rows().is_empty());
    }

    #[test]
    fn test_blocked_spawn_is_game_over() {
        let mut state = engine(4, 6, 1);
        // Stack into the spawn rows.
        for x in 0..4 {
            for z in 0..5 {
                state.board.set(x, z, PieceKind::J);
            }
        }
        assert!(!state.spawn(Some(PieceKind::O)));
        assert!(state.game_over());
        assert!(state.active().is_none());
        // Terminal: nothing revives it short of reset.
        assert!(!state.spawn(Some(PieceKind::I)));
        assert!(!state.try_move(0, -1));
    }

    #[test]
    fn test_over_height_lock_is_game_over() {
        let mut state = engine(4, 6, 1);
        state.spawn(Some(PieceKind::O));
        // Force the piece to straddle the top edge (a kick can push a
        // piece up past the rim).
        let piece = state.active.as_mut().unwrap();
        piece.z = 4; // cells at z = 5 and 6; 6 == height overflows

        assert!(state.lock_current());
        assert!(state.game_over());
        // The in-bounds half still locked.
        assert!(state.board().is_occupied(1, 5));
        assert!(state.board().is_occupied(2, 5));
        assert_eq!(state.board().occupied_count(), 2);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut state = engine(10, 20, 1);
        state.spawn(None);
        state.hard_drop();
        state.try_hold();

        state.reset();
        assert_eq!(state.score(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.lines_cleared(), 0);
        assert_eq!(state.combo(), -1);
        assert_eq!(state.board().occupied_count(), 0);
        assert!(state.active().is_none());
        assert!(state.hold().is_none());
        assert!(!state.game_over());
    }

    #[test]
    fn test_set_lines_per_level_recomputes() {
        let mut state = engine(10, 20, 1);
        state.lines = 12;
        state.set_lines_per_level(4).unwrap();
        assert_eq!(state.level(), 4);
        assert!(state.set_lines_per_level(0).is_err());
    }
}
