//! Core module - the pure rules engine.
//!
//! Game rules, state management, and the read-only snapshot boundary.
//! No UI, networking, or I/O; the host drives everything.

pub mod board;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

// Re-export commonly used types
pub use board::Board;
pub use game_state::{ActivePiece, GameState, LastAction};
pub use rng::{PieceQueue, SimpleRng};
pub use snapshot::{ActiveSnapshot, GameSnapshot, ReplayStep};
