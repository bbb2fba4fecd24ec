//! Engine configuration.
//!
//! All knobs the engine accepts live in one explicit value struct, validated
//! once at construction. Invalid dimensions or progression parameters cannot
//! be repaired after the fact, so they are the only hard errors in the crate.

use thiserror::Error;

use crate::types::{ComboMode, RotationSystem, ScoringMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board width/height must be > 0 (got {width}x{height})")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("next_queue_size must be > 0 (got {0})")]
    InvalidQueueSize(usize),
    #[error("lines_per_level must be > 0 (got {0})")]
    InvalidLinesPerLevel(u32),
    #[error("combo_multiplier_step must be >= 0")]
    InvalidComboStep,
}

/// Everything the engine accepts at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Board columns.
    pub width: i32,
    /// Board rows.
    pub height: i32,
    /// RNG seed; `None` draws one from entropy (the effective seed is still
    /// recorded so the session stays replayable).
    pub seed: Option<u32>,
    /// Preview queue length, restored after every pop.
    pub next_queue_size: usize,
    /// Cumulative cleared lines per level step.
    pub lines_per_level: u32,
    pub rotation_system: RotationSystem,
    pub scoring_mode: ScoringMode,
    pub combo_mode: ComboMode,
    /// Per-combo multiplier step for `ComboMode::Multiply`.
    pub combo_multiplier_step: f64,
}

impl EngineConfig {
    /// Standard Guideline-flavored setup: 10x20, SRS, multiply combos.
    pub fn guideline() -> Self {
        Self {
            width: 10,
            height: 20,
            seed: None,
            next_queue_size: 5,
            lines_per_level: 10,
            rotation_system: RotationSystem::Srs,
            scoring_mode: ScoringMode::Guideline,
            combo_mode: ComboMode::Multiply,
            combo_multiplier_step: 0.25,
        }
    }

    /// Classic setup: simple rotation, exponential scoring, flat combos.
    pub fn classic() -> Self {
        Self {
            rotation_system: RotationSystem::Simple,
            scoring_mode: ScoringMode::Exponential,
            combo_mode: ComboMode::Add,
            ..Self::guideline()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.next_queue_size == 0 {
            return Err(ConfigError::InvalidQueueSize(self.next_queue_size));
        }
        if self.lines_per_level == 0 {
            return Err(ConfigError::InvalidLinesPerLevel(self.lines_per_level));
        }
        if self.combo_multiplier_step < 0.0 {
            return Err(ConfigError::InvalidComboStep);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::guideline()
    }
}
