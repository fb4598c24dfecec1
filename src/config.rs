//! Game rules: board size, scoring constants, combo escalation and tile distribution.

use crate::error::{EngineError, Result};
use crate::tile::TileKind;

/// Distribution of freshly drawn tiles.
///
/// The rare kind is rolled first with `rare_chance`; otherwise one of the
/// ordinary kinds is picked by weight.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeWeights {
    pub rare_chance: f64,
    pub ordinary: Vec<(TileKind, u32)>,
}

impl Default for TypeWeights {
    fn default() -> Self {
        Self {
            rare_chance: 0.02,
            ordinary: TileKind::ORDINARY.iter().map(|&k| (k, 1)).collect(),
        }
    }
}

impl TypeWeights {
    /// Uniform over the ordinary kinds with the given rare chance.
    pub fn with_rare_chance(rare_chance: f64) -> Self {
        Self {
            rare_chance,
            ..Self::default()
        }
    }

    /// Rejects anything that cannot draw at least two kinds: a one-kind refill
    /// re-matches forever and a cascade never settles.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.rare_chance) {
            return Err(EngineError::InvalidWeights(format!(
                "rare chance {} must be in [0, 1)",
                self.rare_chance
            )));
        }
        if self.ordinary.iter().any(|(k, _)| k.is_rare()) {
            return Err(EngineError::InvalidWeights(
                "rare kind listed among ordinary kinds".into(),
            ));
        }
        let positive = self.ordinary.iter().filter(|&&(_, w)| w > 0).count();
        if positive == 0 {
            return Err(EngineError::InvalidWeights(
                "ordinary weights sum to zero".into(),
            ));
        }
        if positive + usize::from(self.rare_chance > 0.0) < 2 {
            return Err(EngineError::InvalidWeights(
                "fewer than two drawable kinds".into(),
            ));
        }
        Ok(())
    }
}

/// All tunable constants of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub board_size: usize,
    pub min_match_length: usize,
    /// Points for a minimum-length match.
    pub points_per_match: u32,
    /// Extra points per tile beyond the minimum length.
    pub points_per_extra_piece: u32,
    pub combo_step: f64,
    pub combo_cap: f64,
    /// Score interval between milestone achievements.
    pub milestone_points: u32,
    /// Flat bonus for activating a rare tile.
    pub rare_clear_bonus: u32,
    /// Multiplier the cascade after a rare clear starts at.
    pub rare_clear_multiplier: f64,
    pub initial_moves: u32,
    /// Redraws per cell before the generator accepts a run-completing tile.
    pub generate_attempts: usize,
    pub weights: TypeWeights,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            board_size: 5,
            min_match_length: 3,
            points_per_match: 50,
            points_per_extra_piece: 10,
            combo_step: 0.5,
            combo_cap: 3.0,
            milestone_points: 1000,
            rare_clear_bonus: 1000,
            rare_clear_multiplier: 1.5,
            initial_moves: 30,
            generate_attempts: 10,
            weights: TypeWeights::default(),
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<()> {
        if self.min_match_length < 2 {
            return Err(EngineError::InvalidRules("min match length must be at least 2"));
        }
        if self.board_size < self.min_match_length {
            return Err(EngineError::InvalidSize {
                size: self.board_size,
                min: self.min_match_length,
            });
        }
        if self.combo_cap < 1.0 || self.combo_step < 0.0 {
            return Err(EngineError::InvalidRules("combo cap below 1 or negative step"));
        }
        if self.rare_clear_multiplier < 1.0 {
            return Err(EngineError::InvalidRules("rare clear multiplier below 1"));
        }
        if self.milestone_points == 0 {
            return Err(EngineError::InvalidRules("milestone interval must be positive"));
        }
        self.weights.validate()
    }
}
