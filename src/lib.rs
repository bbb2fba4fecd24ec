//! blockfall - a deterministic falling-block puzzle rules engine with a
//! heuristic autoplayer.
//!
//! The crate is a pure synchronous library: a host loop constructs a
//! [`GameState`], drives it once per input or timer tick, and observes it
//! through [`GameSnapshot`]s. Autoplay asks the advisor for a target
//! placement and replays the planner's action sequence through the same
//! mutators a human input path uses.

pub mod config;
pub mod core;
pub mod engine;
pub mod types;

pub use crate::config::{ConfigError, EngineConfig};
pub use crate::core::{ActivePiece, Board, GameSnapshot, GameState, LastAction, ReplayStep};
pub use crate::engine::{best_placement, best_placement_2ply, plan, Placement, Weights};
