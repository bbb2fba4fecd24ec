//! Scoring module - line-clear points, combo, back-to-back, level.
//!
//! Two base-point modes: Guideline-style fixed tables (with a higher table
//! for T-spin clears) and an exponential 100 * 2^(cleared-1) mode. Combo is
//! either a flat additive bonus or a multiplier. All fractional multipliers
//! truncate toward zero so recorded scores are bit-stable.

use crate::types::{ComboMode, ScoringMode};

/// Guideline base points keyed by cleared-row count (1..=4).
const GUIDELINE_SCORES: [u64; 5] = [0, 100, 300, 500, 800];

/// T-spin clear base points keyed by cleared-row count (1..=3).
const T_SPIN_SCORES: [u64; 4] = [0, 800, 1200, 1600];

/// Outcome of scoring a single lock-with-clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Points awarded, after level, B2B, and combo adjustments.
    pub points: u64,
    /// Whether this clear qualifies to start or extend a B2B chain.
    pub qualifies_for_b2b: bool,
    /// Whether the 1.5x B2B multiplier was actually applied.
    pub b2b_applied: bool,
}

/// Base points for a clear, before level scaling.
pub fn base_points(mode: ScoringMode, cleared: u32, t_spin: bool) -> u64 {
    match mode {
        ScoringMode::Exponential => {
            if cleared == 0 {
                0
            } else {
                100u64.saturating_mul(1 << (cleared - 1).min(62))
            }
        }
        ScoringMode::Guideline => {
            let table = if t_spin { &T_SPIN_SCORES[..] } else { &GUIDELINE_SCORES[..] };
            table.get(cleared as usize).copied().unwrap_or(0)
        }
    }
}

/// A clear extends B2B iff it is a T-spin clear or a four-line clear.
pub fn qualifies_for_b2b(cleared: u32, t_spin: bool) -> bool {
    t_spin || cleared == 4
}

/// Apply the 1.5x back-to-back multiplier, truncating.
pub fn apply_b2b_multiplier(points: u64) -> u64 {
    points.saturating_mul(3) / 2
}

/// Fold the combo counter into the points for this clear.
/// No bonus at combo <= 0 (a chain's first clear is combo 0).
pub fn apply_combo(points: u64, combo: i32, level: u32, mode: ComboMode, step: f64) -> u64 {
    if combo <= 0 {
        return points;
    }
    match mode {
        ComboMode::Add => points.saturating_add(50 * combo as u64 * level as u64),
        ComboMode::Multiply => {
            let factor = 1.0 + step.max(0.0) * combo as f64;
            (points as f64 * factor) as u64
        }
    }
}

/// Score one clearing lock. `combo` is the post-increment counter and
/// `previous_b2b` whether the previous clear qualified.
pub fn score_clear(
    cleared: u32,
    level: u32,
    t_spin: bool,
    combo: i32,
    previous_b2b: bool,
    scoring_mode: ScoringMode,
    combo_mode: ComboMode,
    combo_step: f64,
) -> ScoreResult {
    let mut points = base_points(scoring_mode, cleared, t_spin).saturating_mul(level as u64);

    let qualifies = qualifies_for_b2b(cleared, t_spin);
    let b2b_applied = qualifies && previous_b2b;
    if b2b_applied {
        points = apply_b2b_multiplier(points);
    }

    points = apply_combo(points, combo, level, combo_mode, combo_step);

    ScoreResult {
        points,
        qualifies_for_b2b: qualifies,
        b2b_applied,
    }
}

/// Hard drops pay 2 points per descended cell.
pub fn hard_drop_points(distance: u32) -> u64 {
    distance as u64 * 2
}

/// Level progression: one step per `lines_per_level` cumulative lines,
/// never below 1.
pub fn calculate_level(total_lines: u32, lines_per_level: u32) -> u32 {
    (1 + total_lines / lines_per_level.max(1)).max(1)
}
