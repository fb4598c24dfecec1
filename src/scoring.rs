//! Scoring: per-match points, batch total under a combo multiplier.

use crate::config::Rules;
use crate::detector::Match;

/// Points for a single run of `len` tiles before any multiplier.
#[inline]
pub fn match_points(len: usize, rules: &Rules) -> u32 {
    let extra = len.saturating_sub(rules.min_match_length) as u32;
    rules.points_per_match + extra * rules.points_per_extra_piece
}

/// Sum over the batch, times `multiplier`, floored.
pub fn score(matches: &[Match], multiplier: f64, rules: &Rules) -> u32 {
    let base: u32 = matches.iter().map(|m| match_points(m.len(), rules)).sum();
    (f64::from(base) * multiplier).floor() as u32
}

/// Multiplier for the next cascade pass within the same move.
#[inline]
pub fn next_multiplier(current: f64, rules: &Rules) -> f64 {
    (current + rules.combo_step).min(rules.combo_cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::config::TypeWeights;
    use crate::detector::find_matches;
    use crate::source::TileSource;
    use crate::tile::TileKind::{Blue as B, Golden as G, Vanilla as V};

    fn five_and_three() -> Vec<Match> {
        let mut src = TileSource::seeded(0, &TypeWeights::default()).unwrap();
        let board = Board::from_kinds(
            &[
                vec![B, B, B, B, B],
                vec![G, V, G, V, G],
                vec![V, G, V, G, V],
                vec![G, V, V, V, G],
                vec![V, G, G, V, V],
            ],
            &mut src,
        )
        .unwrap();
        find_matches(&board, 3)
    }

    #[test]
    fn base_and_extra_points() {
        let rules = Rules::default();
        assert_eq!(match_points(3, &rules), 50);
        assert_eq!(match_points(4, &rules), 60);
        assert_eq!(match_points(5, &rules), 70);
    }

    #[test]
    fn batch_is_summed_then_multiplied_and_floored() {
        let rules = Rules::default();
        let matches = five_and_three();
        assert_eq!(matches.len(), 2);
        assert_eq!(score(&matches, 1.0, &rules), 120);
        assert_eq!(score(&matches, 1.5, &rules), 180);
        assert_eq!(score(&matches[1..], 2.5, &rules), 125);
        let odd = Rules {
            points_per_match: 51,
            ..Rules::default()
        };
        assert_eq!(score(&matches[1..], 1.5, &odd), 76);
    }

    #[test]
    fn score_is_monotonic_in_multiplier() {
        let rules = Rules::default();
        let matches = five_and_three();
        let mut last = 0;
        for step in 0..=8 {
            let m = 1.0 + f64::from(step) * 0.25;
            let s = score(&matches, m, &rules);
            assert!(s >= last);
            last = s;
        }
    }

    #[test]
    fn multiplier_escalates_to_cap() {
        let rules = Rules::default();
        let mut m = 1.0;
        let mut seen = Vec::new();
        for _ in 0..6 {
            m = next_multiplier(m, &rules);
            seen.push(m);
        }
        assert_eq!(seen, vec![1.5, 2.0, 2.5, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn empty_batch_scores_zero() {
        assert_eq!(score(&[], 3.0, &Rules::default()), 0);
    }
}
