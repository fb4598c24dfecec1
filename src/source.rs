//! Tile source: seedable RNG plus tile id allocation.
//!
//! Uses `SmallRng` which is fast and not cryptographic; a seed gives a
//! reproducible game for tests and replays.

use crate::config::TypeWeights;
use crate::error::{EngineError, Result};
use crate::tile::{Tile, TileId, TileKind};
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct TileSource {
    rng: SmallRng,
    next_id: u64,
    rare_chance: f64,
    kinds: Vec<TileKind>,
    index: WeightedIndex<u32>,
}

impl TileSource {
    /// Create from system entropy.
    pub fn new(weights: &TypeWeights) -> Result<Self> {
        Self::from_rng(SmallRng::from_os_rng(), weights)
    }

    /// Create with a specific seed for deterministic behaviour.
    pub fn seeded(seed: u64, weights: &TypeWeights) -> Result<Self> {
        Self::from_rng(SmallRng::seed_from_u64(seed), weights)
    }

    fn from_rng(rng: SmallRng, weights: &TypeWeights) -> Result<Self> {
        weights.validate()?;
        Self::build(rng, weights)
    }

    /// Single-kind sources for tests that need a refill to keep matching.
    #[cfg(test)]
    pub(crate) fn seeded_unchecked(seed: u64, weights: &TypeWeights) -> Self {
        Self::build(SmallRng::seed_from_u64(seed), weights).unwrap()
    }

    fn build(rng: SmallRng, weights: &TypeWeights) -> Result<Self> {
        let index = WeightedIndex::new(weights.ordinary.iter().map(|&(_, w)| w))
            .map_err(|e| EngineError::InvalidWeights(e.to_string()))?;
        Ok(Self {
            rng,
            next_id: 0,
            rare_chance: weights.rare_chance,
            kinds: weights.ordinary.iter().map(|&(k, _)| k).collect(),
            index,
        })
    }

    /// Roll the rare kind first; on a miss pick an ordinary kind by weight.
    pub fn draw_kind(&mut self) -> TileKind {
        if self.rare_chance > 0.0 && self.rng.random_bool(self.rare_chance) {
            return TileKind::Rainbow;
        }
        self.kinds[self.index.sample(&mut self.rng)]
    }

    /// New tile of a random kind at (row, col).
    pub fn spawn(&mut self, row: usize, col: usize) -> Tile {
        let kind = self.draw_kind();
        self.spawn_kind(kind, row, col)
    }

    /// New tile of a given kind at (row, col) with a fresh id.
    pub fn spawn_kind(&mut self, kind: TileKind, row: usize, col: usize) -> Tile {
        let id = TileId(self.next_id);
        self.next_id += 1;
        Tile {
            id,
            kind,
            row,
            col,
            is_matched: false,
        }
    }
}
