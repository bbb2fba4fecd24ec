//! Core types shared across the crate.
//! Pure data types with no behavior beyond small conversions.

use serde::{Deserialize, Serialize};

/// A single grid cell: (column x, row z). z grows upward; gravity is dz = -1.
pub type Cell = (i32, i32);

/// Tetromino piece kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All seven kinds, in bag order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to uppercase letter.
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }
}

/// Rotation states (R0 = spawn orientation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    R0,
    R1,
    R2,
    R3,
}

impl Rotation {
    /// Rotate clockwise.
    pub fn cw(&self) -> Self {
        match self {
            Rotation::R0 => Rotation::R1,
            Rotation::R1 => Rotation::R2,
            Rotation::R2 => Rotation::R3,
            Rotation::R3 => Rotation::R0,
        }
    }

    /// Rotate counter-clockwise.
    pub fn ccw(&self) -> Self {
        match self {
            Rotation::R0 => Rotation::R3,
            Rotation::R3 => Rotation::R2,
            Rotation::R2 => Rotation::R1,
            Rotation::R1 => Rotation::R0,
        }
    }

    /// Numeric rotation state (0..=3).
    pub fn index(&self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R1 => 1,
            Rotation::R2 => 2,
            Rotation::R3 => 3,
        }
    }

    /// Rotation state from a turn count (taken modulo 4).
    pub fn from_index(index: i32) -> Self {
        match index.rem_euclid(4) {
            0 => Rotation::R0,
            1 => Rotation::R1,
            2 => Rotation::R2,
            _ => Rotation::R3,
        }
    }
}

/// Which rotation system the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationSystem {
    /// Guideline SRS with table-driven wall kicks.
    Srs,
    /// Rotate-and-renormalize with a fixed horizontal kick list.
    Simple,
}

/// Base-points rule applied when lines clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoringMode {
    /// Fixed Guideline-style tables (separate table for T-spin clears).
    Guideline,
    /// 100 * 2^(cleared - 1).
    Exponential,
}

/// How the combo counter turns into points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboMode {
    /// Flat bonus: + 50 * combo * level.
    Add,
    /// Multiplier: points * (1 + step * combo).
    Multiply,
}

/// Discrete inputs the engine accepts, one per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
    Hold,
    TickDown,
}

impl GameAction {
    /// Parse action from string (for recorded action logs).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            "tickdown" => Some(GameAction::TickDown),
            _ => None,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
            GameAction::TickDown => "tickDown",
        }
    }
}
