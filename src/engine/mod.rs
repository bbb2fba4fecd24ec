//! Autoplay module - heuristic placement search and action planning.
//!
//! Reads the core engine through its public accessors only; never mutates
//! the state it inspects.

pub mod advisor;
pub mod planner;

pub use advisor::{best_placement, best_placement_2ply, Placement, Weights};
pub use planner::plan;
