//! Chain reactions: score, mark, drop and re-detect until the board is quiet.
//!
//! A [`Cascade`] holds the matches its next pass will clear. Each
//! [`Cascade::step`] runs exactly one pass so a renderer can animate between
//! passes; [`resolve`] runs it to completion.

use crate::board::Board;
use crate::config::Rules;
use crate::detector::{Match, find_matches};
use crate::mutator::{apply_gravity, mark_matched};
use crate::scoring::{next_multiplier, score};
use crate::source::TileSource;
use crate::tile::Position;
use tracing::debug;

/// Controller state for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    /// One tile selected, waiting for the second.
    AwaitingSwap(Position),
    /// A cascade is running; new swaps are refused.
    Resolving { multiplier: f64 },
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    /// 1-based pass number within the move.
    pub pass: usize,
    pub multiplier: f64,
    pub matches: Vec<Match>,
    pub points: u32,
    /// Distinct tiles removed.
    pub cleared: usize,
    pub spawned: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cascade {
    multiplier: f64,
    passes: usize,
    pending: Vec<Match>,
}

impl Cascade {
    pub fn new(pending: Vec<Match>, start_multiplier: f64) -> Self {
        Self {
            multiplier: start_multiplier,
            passes: 0,
            pending,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    /// Matches the next pass will clear.
    pub fn pending(&self) -> &[Match] {
        &self.pending
    }

    /// Multiplier the next pass will score at.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Run one pass. None once nothing is pending.
    pub fn step(
        &mut self,
        board: &mut Board,
        source: &mut TileSource,
        rules: &Rules,
    ) -> Option<PassReport> {
        if self.pending.is_empty() {
            return None;
        }
        let matches = std::mem::take(&mut self.pending);
        let multiplier = self.multiplier;
        let points = score(&matches, multiplier, rules);
        let cleared = mark_matched(board, &matches);
        let spawned = apply_gravity(board, source);
        self.passes += 1;

        self.pending = find_matches(board, rules.min_match_length);
        if !self.pending.is_empty() {
            self.multiplier = next_multiplier(multiplier, rules);
        }
        debug!(
            pass = self.passes,
            multiplier,
            matches = matches.len(),
            cleared,
            spawned,
            points,
            next = self.pending.len(),
            "cascade pass"
        );
        Some(PassReport {
            pass: self.passes,
            multiplier,
            matches,
            points,
            cleared,
            spawned,
        })
    }
}

/// Detect and resolve everything on `board` starting at `start_multiplier`.
pub fn resolve(
    board: &mut Board,
    source: &mut TileSource,
    rules: &Rules,
    start_multiplier: f64,
) -> Vec<PassReport> {
    let mut cascade = Cascade::new(find_matches(board, rules.min_match_length), start_multiplier);
    std::iter::from_fn(|| cascade.step(board, source, rules)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypeWeights;
    use crate::tile::TileKind::{self, Blue as B, Golden as G, Vanilla as V};

    fn setup(kinds: &[Vec<TileKind>], weights: &TypeWeights) -> (Board, TileSource) {
        let mut src = TileSource::seeded_unchecked(5, weights);
        let board = Board::from_kinds(kinds, &mut src).unwrap();
        (board, src)
    }

    #[test]
    fn quiet_board_resolves_to_nothing() {
        let (mut board, mut src) = setup(
            &[vec![B, G, V], vec![G, V, B], vec![B, G, V]],
            &TypeWeights::default(),
        );
        let before = board.clone();
        assert!(resolve(&mut board, &mut src, &Rules::default(), 1.0).is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn passes_escalate_until_quiet() {
        let (mut board, mut src) = setup(
            &[
                vec![G, V, G, V, G],
                vec![V, G, V, G, V],
                vec![B, B, B, G, V],
                vec![G, V, G, V, G],
                vec![V, G, V, G, V],
            ],
            &TypeWeights::default(),
        );
        let rules = Rules::default();
        let passes = resolve(&mut board, &mut src, &rules, 1.0);
        assert!(!passes.is_empty());
        assert_eq!(passes[0].multiplier, 1.0);
        assert_eq!(passes[0].points, 50);
        assert_eq!(passes[0].cleared, 3);
        assert_eq!(passes[0].spawned, 3);
        for (i, p) in passes.iter().enumerate() {
            assert_eq!(p.pass, i + 1);
            let expected = (1.0 + 0.5 * i as f64).min(rules.combo_cap);
            assert_eq!(p.multiplier, expected);
        }
        assert!(find_matches(&board, 3).is_empty());
        assert!(board.is_consistent());
    }

    #[test]
    fn single_kind_refill_keeps_chaining_at_cap() {
        // Every refill is blue, so the column keeps re-matching; the step API stops on demand.
        let weights = TypeWeights {
            rare_chance: 0.0,
            ordinary: vec![(B, 1)],
        };
        let (mut board, mut src) = setup(
            &[vec![B, G, V], vec![B, V, G], vec![B, G, V]],
            &weights,
        );
        let rules = Rules::default();
        let mut cascade = Cascade::new(find_matches(&board, 3), 1.0);
        let multipliers: Vec<f64> = (0..6)
            .filter_map(|_| cascade.step(&mut board, &mut src, &rules))
            .map(|p| p.multiplier)
            .collect();
        assert_eq!(multipliers, vec![1.0, 1.5, 2.0, 2.5, 3.0, 3.0]);
        assert!(!cascade.is_finished());
    }
}
