use donutswap::detector::{find_matches, has_possible_moves};
use donutswap::{
    Board, Phase, Position, Rules, SelectOutcome, Session, SwapOutcome, TileKind, TileSource,
    TypeWeights,
};
use std::collections::HashSet;
use TileKind::{Blue as B, Golden as G, Vanilla as V};

fn scenario(middle: [TileKind; 5]) -> Session {
    let rules = Rules::default();
    let mut source = TileSource::seeded(99, &rules.weights).unwrap();
    let board = Board::from_kinds(
        &[
            vec![G, V, G, V, G],
            vec![V, G, V, G, V],
            middle.to_vec(),
            vec![G, V, G, V, G],
            vec![V, G, V, G, V],
        ],
        &mut source,
    )
    .unwrap();
    Session::with_board(rules, board, 0, source)
}

#[test]
fn generated_boards_are_well_formed() {
    for seed in 0..20 {
        let rules = Rules::default();
        let source = TileSource::seeded(seed, &rules.weights).unwrap();
        let session = Session::new_game(rules, 0, source).unwrap();
        let board = session.board();
        assert_eq!(board.size(), 5);
        assert!(board.is_consistent());
        let ids: HashSet<_> = board.tiles().map(|t| t.id).collect();
        assert_eq!(ids.len(), 25);
        assert!(board.tiles().all(|t| !t.is_matched));
    }
}

#[test]
fn invalid_size_is_rejected() {
    let rules = Rules {
        board_size: 2,
        ..Rules::default()
    };
    let source = TileSource::seeded(0, &rules.weights).unwrap();
    assert!(Session::new_game(rules, 0, source).is_err());
}

#[test]
fn one_kind_distribution_is_rejected() {
    let always_rare = TypeWeights::with_rare_chance(1.0);
    assert!(TileSource::seeded(0, &always_rare).is_err());

    let rules = Rules {
        weights: always_rare,
        ..Rules::default()
    };
    assert!(rules.validate().is_err());
    let source = TileSource::seeded(0, &Rules::default().weights).unwrap();
    assert!(Session::new_game(rules, 0, source).is_err());

    let blue_only = TypeWeights {
        rare_chance: 0.0,
        ordinary: vec![(B, 5)],
    };
    assert!(TileSource::seeded(0, &blue_only).is_err());
}

#[test]
fn failed_swap_changes_nothing() {
    let mut session = scenario([B, B, V, G, B]);
    let before = session.board().clone();
    let outcome = session
        .request_swap(Position::new(2, 2), Position::new(2, 1))
        .unwrap();
    assert!(matches!(outcome, SwapOutcome::RevertedNoMatch { .. }));
    assert_eq!(session.board(), &before);
    assert_eq!(session.stats().score, 0);
    assert_eq!(session.stats().moves_remaining, 30);
}

#[test]
fn matching_swap_scores_first_pass_at_base_multiplier() {
    let mut session = scenario([B, B, V, B, G]);
    let outcome = session
        .begin_swap(Position::new(2, 2), Position::new(2, 3))
        .unwrap();
    assert_eq!(outcome, SwapOutcome::Resolving);
    assert_eq!(session.stats().moves_remaining, 29);
    assert_eq!(session.phase(), Phase::Resolving { multiplier: 1.0 });

    let pending = session.pending_matches();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].start, Position::new(2, 0));
    assert_eq!(pending[0].len(), 3);

    let first = session.step().unwrap();
    assert_eq!(first.pass.points, 50);
    assert_eq!(first.pass.multiplier, 1.0);
    assert_eq!(first.pass.cleared, 3);

    let summary = session.finish();
    assert_eq!(summary.points, session.stats().score);
    assert!(!session.is_busy());
    assert!(find_matches(session.board(), 3).is_empty());
    assert!(session.board().tiles().all(|t| !t.is_matched));
}

#[test]
fn request_swap_runs_to_quiescence() {
    let mut session = scenario([B, B, V, B, G]);
    let SwapOutcome::Resolved(summary) = session
        .request_swap(Position::new(2, 3), Position::new(2, 2))
        .unwrap()
    else {
        panic!("expected a resolved move");
    };
    assert!(summary.passes >= 1);
    assert!(summary.peak_multiplier >= 1.0);
    assert_eq!(summary.points, session.stats().score);
    assert!(session.stats().matches_count >= 1);
    assert_eq!(session.phase(), Phase::Idle);
}

#[test]
fn select_then_neighbour_swaps() {
    let mut session = scenario([B, B, V, B, G]);
    assert_eq!(
        session.select(Position::new(2, 3)).unwrap(),
        SelectOutcome::Selected(Position::new(2, 3))
    );
    let outcome = session.select(Position::new(2, 2)).unwrap();
    assert_eq!(outcome, SelectOutcome::Swap(SwapOutcome::Resolving));
    session.finish();
    assert_eq!(session.stats().moves_remaining, 29);
}

#[test]
fn milestone_crossing_levels_up_once() {
    let mut session = scenario([B, B, V, G, B]);
    assert!(session.add_score(950).is_none());
    let achievement = session.add_score(100).unwrap();
    assert_eq!(achievement.milestone, 1);
    assert_eq!(achievement.level, 2);
    assert!(!achievement.message.is_empty());
    assert_eq!(session.stats().level, 2);
    assert!(session.add_score(100).is_none());
}

#[test]
fn high_score_follows_score() {
    let rules = Rules::default();
    let mut source = TileSource::seeded(1, &rules.weights).unwrap();
    let board = Board::from_kinds(
        &[vec![B, G, V], vec![G, V, B], vec![B, G, V]],
        &mut source,
    )
    .unwrap();
    let mut session = Session::with_board(rules, board, 500, source);
    session.add_score(300);
    assert_eq!(session.stats().high_score, 500);
    session.add_score(300);
    assert_eq!(session.stats().high_score, 600);
}

#[test]
fn dead_board_reports_no_moves() {
    let mut source = TileSource::seeded(4, &Rules::default().weights).unwrap();
    let board = Board::from_kinds(
        &[vec![B, B, G], vec![B, B, G], vec![G, V, V]],
        &mut source,
    )
    .unwrap();
    assert!(!has_possible_moves(&board, 3));
}

#[test]
fn seeded_games_replay_identically() {
    let play = || {
        let rules = Rules::default();
        let source = TileSource::seeded(2024, &rules.weights).unwrap();
        let mut session = Session::new_game(rules, 0, source).unwrap();
        for row in 0..5 {
            for col in 0..4 {
                session
                    .request_swap(Position::new(row, col), Position::new(row, col + 1))
                    .unwrap();
            }
        }
        (session.board().kinds(), session.stats().clone())
    };
    assert_eq!(play(), play());
}
