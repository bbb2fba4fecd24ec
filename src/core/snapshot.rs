//! Read-only views of the engine for presentation and recording layers.
//!
//! `GameSnapshot` is everything a renderer may look at; `ReplayStep` is the
//! incremental diff a recorder persists. Both derive serde so the host owns
//! the on-disk format, not the core.

use serde::{Deserialize, Serialize};

use crate::core::game_state::{ActivePiece, GameState, LastAction};
use crate::types::{Cell, PieceKind, Rotation, RotationSystem};

/// Active piece pose at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i32,
    pub z: i32,
    pub system: RotationSystem,
}

impl From<&ActivePiece> for ActiveSnapshot {
    fn from(piece: &ActivePiece) -> Self {
        Self {
            kind: piece.kind,
            rotation: piece.rotation,
            x: piece.x,
            z: piece.z,
            system: piece.system,
        }
    }
}

/// Full observable state. `PartialEq` so determinism is testable by direct
/// snapshot comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub width: i32,
    pub height: i32,
    /// Locked cells with their kinds, sorted by (z, x).
    pub occupied: Vec<(Cell, PieceKind)>,
    pub active: Option<ActiveSnapshot>,
    pub ghost_cells: Option<[Cell; 4]>,
    pub hold: Option<PieceKind>,
    pub next_queue: Vec<PieceKind>,
    pub can_hold: bool,
    pub score: u64,
    pub level: u32,
    pub lines: u32,
    pub combo: i32,
    pub back_to_back: bool,
    pub clearing_rows: Vec<i32>,
    pub clear_progress: f64,
    pub game_over: bool,
    pub last_action: Option<LastAction>,
    pub last_locked: bool,
    pub last_cleared_lines: u32,
    pub last_t_spin: bool,
}

impl GameState {
    /// Capture the current observable state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            width: self.width(),
            height: self.height(),
            occupied: self.board().cells(),
            active: self.active().map(ActiveSnapshot::from),
            ghost_cells: self.ghost().map(|g| g.cells()),
            hold: self.hold(),
            next_queue: self.next_queue(),
            can_hold: self.can_hold(),
            score: self.score(),
            level: self.level(),
            lines: self.lines_cleared(),
            combo: self.combo(),
            back_to_back: self.back_to_back(),
            clearing_rows: self.clearing_rows().to_vec(),
            clear_progress: self.clear_progress(),
            game_over: self.game_over(),
            last_action: self.last_action(),
            last_locked: self.last_locked(),
            last_cleared_lines: self.last_cleared_lines(),
            last_t_spin: self.last_t_spin(),
        }
    }
}

/// One recorded step: the occupancy delta between two snapshots plus the
/// fields a playback layer needs to re-render the moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    /// Cells locked since the previous snapshot.
    pub added: Vec<(Cell, PieceKind)>,
    /// Cells that disappeared (cleared or shifted away).
    pub removed: Vec<Cell>,
    pub active: Option<ActiveSnapshot>,
    pub game_over: bool,
    /// Free-text tag naming what caused this step ("tick", "hard_drop", ...).
    pub reason: String,
}

impl ReplayStep {
    /// Diff two snapshots. Cells are matched by position AND kind, so a
    /// cell that shifted down shows up as one removal and one addition.
    pub fn between(prev: &GameSnapshot, next: &GameSnapshot, reason: &str) -> Self {
        let added = next
            .occupied
            .iter()
            .filter(|entry| !prev.occupied.contains(entry))
            .copied()
            .collect();
        let removed = prev
            .occupied
            .iter()
            .filter(|entry| !next.occupied.contains(entry))
            .map(|&(cell, _)| cell)
            .collect();

        Self {
            added,
            removed,
            active: next.active,
            game_over: next.game_over,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn seeded_engine() -> GameState {
        let config = EngineConfig {
            seed: Some(7),
            ..EngineConfig::default()
        };
        GameState::new(config).unwrap()
    }

    #[test]
    fn test_snapshot_equality_for_same_seed() {
        let mut a = seeded_engine();
        let mut b = seeded_engine();
        a.spawn(None);
        b.spawn(None);
        assert_eq!(a.snapshot(), b.snapshot());

        a.try_move(-1, 0);
        b.try_move(-1, 0);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_replay_step_reports_lock_delta() {
        let mut state = seeded_engine();
        state.spawn(Some(PieceKind::O));
        let before = state.snapshot();

        state.hard_drop();
        let after = state.snapshot();

        let step = ReplayStep::between(&before, &after, "hard_drop");
        assert_eq!(step.added.len(), 4);
        assert!(step.removed.is_empty());
        assert!(step.added.iter().all(|&(_, kind)| kind == PieceKind::O));
        assert_eq!(step.reason, "hard_drop");
        assert!(!step.game_over);
    }

    #[test]
    fn test_replay_step_reports_clear_removal() {
        let config = EngineConfig {
            width: 4,
            height: 10,
            seed: Some(7),
            ..EngineConfig::default()
        };
        let mut state = GameState::new(config).unwrap();
        // Leave exactly the O's landing columns open in the bottom two rows.
        for x in [0, 3] {
            state.set_cell(x, 0, PieceKind::J);
            state.set_cell(x, 1, PieceKind::J);
        }
        state.spawn(Some(PieceKind::O));
        state.hard_drop();
        assert_eq!(state.last_cleared_lines(), 2);

        let before = state.snapshot();
        state.finalize_clear();
        let after = state.snapshot();

        let step = ReplayStep::between(&before, &after, "finalize");
        // Two full rows of width 4 vanished; nothing shifted down onto them.
        assert_eq!(step.removed.len(), 8);
        assert!(step.added.is_empty());
    }

    #[test]
    fn test_snapshot_serde_roundtrip() {
        let mut state = seeded_engine();
        state.spawn(None);
        state.try_rotate(true);
        let snapshot = state.snapshot();

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }
}
