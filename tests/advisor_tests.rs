//! Autoplay loop tests: advisor search + planner feeding the engine.

use blockfall::engine::advisor::{self, DEFAULT_NEXT_WEIGHT};
use blockfall::types::PieceKind;
use blockfall::{best_placement, best_placement_2ply, plan, EngineConfig, GameState, Weights};

fn engine(seed: u32) -> GameState {
    let config = EngineConfig {
        seed: Some(seed),
        ..EngineConfig::default()
    };
    GameState::new(config).unwrap()
}

#[test]
fn test_advisor_is_deterministic() {
    let mut state = engine(11);
    state.spawn(None);
    state.set_cell(0, 0, PieceKind::Z);
    state.set_cell(7, 0, PieceKind::S);
    state.set_cell(7, 1, PieceKind::S);

    let weights = Weights::default();
    let a = best_placement(&state, &weights).unwrap();
    let b = best_placement(&state, &weights).unwrap();
    assert_eq!((a.rotation, a.x, a.z), (b.rotation, b.x, b.z));
    assert_eq!(a.score, b.score);
}

#[test]
fn test_advisor_never_mutates_the_engine() {
    let mut state = engine(23);
    state.spawn(None);
    let before = state.snapshot();

    let _ = best_placement(&state, &Weights::default());
    let _ = best_placement_2ply(&state, &Weights::stable(), DEFAULT_NEXT_WEIGHT);
    assert_eq!(state.snapshot(), before);
}

#[test]
fn test_plan_reaches_the_advised_target() {
    let mut state = engine(31);
    state.spawn(None);

    let piece = *state.active().unwrap();
    let target = best_placement(&state, &Weights::default()).unwrap();
    let actions = plan(piece.rotation, piece.x, target.rotation, target.x);

    // Everything but the final drop positions the piece.
    for &action in &actions[..actions.len() - 1] {
        state.apply_action(action);
    }
    let posed = state.active().unwrap();
    assert_eq!(posed.rotation, target.rotation);
    assert_eq!(posed.x, target.x);

    // The drop lands on the advised row.
    let landing = state.ghost().unwrap();
    assert_eq!(landing.z, target.z);
    state.apply_action(*actions.last().unwrap());
    assert!(state.last_locked());
}

#[test]
fn test_autoplay_survives_a_stretch() {
    let mut state = engine(47);
    state.spawn(None);
    let weights = Weights::stable();

    for _ in 0..30 {
        let piece = *state.active().unwrap();
        let target = best_placement_2ply(&state, &weights, DEFAULT_NEXT_WEIGHT)
            .expect("a legal placement exists");
        for action in plan(piece.rotation, piece.x, target.rotation, target.x) {
            state.apply_action(action);
        }
        state.finalize_clear();
        assert!(!state.game_over(), "advisor topped out too early");
    }
    // Conservative weights keep the stack shallow over a short run.
    let total_height: i32 = (0..state.width())
        .map(|x| state.board().column_height(x))
        .sum();
    assert!(total_height < 10 * state.height() / 2);
}

#[test]
fn test_2ply_degrades_without_lookahead() {
    // A queue always has at least one entry here, so instead compare the
    // zero-discount 2-ply against plain 1-ply: identical ranking.
    let mut state = engine(59);
    state.spawn(None);
    state.set_cell(4, 0, PieceKind::L);

    let one = best_placement(&state, &Weights::default()).unwrap();
    let two = best_placement_2ply(&state, &Weights::default(), 0.0).unwrap();
    assert_eq!((one.rotation, one.x, one.z), (two.rotation, two.x, two.z));
}

#[test]
fn test_preset_constructors_are_distinct() {
    let default = Weights::default();
    assert_ne!(default, Weights::stable());
    assert_ne!(default, Weights::high_score());
    assert_ne!(default, Weights::show());
    // Sanity on the published baseline numbers.
    assert!(default.aggregate_height < 0.0);
    assert!(default.lines > 0.0);
    assert!(advisor::DEFAULT_NEXT_WEIGHT > 0.0 && advisor::DEFAULT_NEXT_WEIGHT < 1.0);
}
