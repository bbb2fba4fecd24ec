//! Planner module - turn a placement target into discrete inputs.
//!
//! Purely positional: the plan is not validated against the board. The
//! caller feeds each action through the engine, whose own collision rules
//! silently stop anything illegal.

use crate::types::{GameAction, Rotation};

/// Ordered action sequence reaching (target_rotation, target_x) from the
/// current pose, ending with a single hard drop.
///
/// The rotation delta is shortened: a delta of 3 becomes one
/// counter-clockwise turn, a delta of 2 two clockwise turns.
pub fn plan(
    current_rotation: Rotation,
    current_x: i32,
    target_rotation: Rotation,
    target_x: i32,
) -> Vec<GameAction> {
    let mut actions = Vec::new();

    let delta = (target_rotation.index() as i32 - current_rotation.index() as i32).rem_euclid(4);
    match delta {
        3 => actions.push(GameAction::RotateCcw),
        2 => actions.extend([GameAction::RotateCw, GameAction::RotateCw]),
        d => actions.extend(std::iter::repeat(GameAction::RotateCw).take(d as usize)),
    }

    let dx = target_x - current_x;
    if dx > 0 {
        actions.extend(std::iter::repeat(GameAction::MoveRight).take(dx as usize));
    } else if dx < 0 {
        actions.extend(std::iter::repeat(GameAction::MoveLeft).take((-dx) as usize));
    }

    actions.push(GameAction::HardDrop);
    actions
}
