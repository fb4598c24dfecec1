//! Game session: board, stats, selection state and the move lifecycle.
//!
//! Two ways to drive a move:
//! - [`Session::request_swap`] runs the whole cascade synchronously and returns
//!   a [`MoveSummary`].
//! - [`Session::begin_swap`] followed by repeated [`Session::step`] runs one
//!   pass at a time so a renderer can animate; the session reports busy until
//!   the board is quiet.

use crate::achievement::{Achievement, crossed_milestone, message_for};
use crate::board::Board;
use crate::cascade::{Cascade, PassReport, Phase};
use crate::config::Rules;
use crate::detector::{Match, find_matches, has_possible_moves};
use crate::error::Result;
use crate::generator::generate;
use crate::mutator::{apply_gravity, mark_cross, swap};
use crate::source::TileSource;
use crate::tile::Position;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub score: u32,
    /// Only field that outlives a session.
    pub high_score: u32,
    pub level: u32,
    pub moves_remaining: u32,
    /// Match records scored so far.
    pub matches_count: u32,
}

impl SessionStats {
    fn fresh(rules: &Rules, high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
            level: 1,
            moves_remaining: rules.initial_moves,
            matches_count: 0,
        }
    }
}

/// Totals for one player move (or one rare clear).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoveSummary {
    pub points: u32,
    pub passes: usize,
    /// Highest multiplier any pass scored at; 0 when no pass ran.
    pub peak_multiplier: f64,
    pub achievements: Vec<Achievement>,
}

impl MoveSummary {
    /// True when a pass scored above the base multiplier.
    pub fn reached_combo(&self) -> bool {
        self.peak_multiplier > 1.0
    }

    fn record_points(&mut self, points: u32, achievement: Option<&Achievement>) {
        self.points += points;
        self.achievements.extend(achievement.cloned());
    }

    fn record_pass(&mut self, pass: &PassReport, achievement: Option<&Achievement>) {
        self.passes += 1;
        self.peak_multiplier = self.peak_multiplier.max(pass.multiplier);
        self.record_points(pass.points, achievement);
    }
}

/// One pass run through the session, with the achievement its points unlocked.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub pass: PassReport,
    pub achievement: Option<Achievement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SwapOutcome {
    /// Busy, paused or ended; nothing changed.
    Ignored,
    RejectedNotAdjacent,
    /// Swapped, found nothing, swapped back. No move consumed.
    RevertedNoMatch { a: Position, b: Position },
    /// Matches found and a move consumed; drive with [`Session::step`].
    Resolving,
    /// Matches found and resolved to quiescence.
    Resolved(MoveSummary),
}

/// Result of activating the rare tile. The follow-up cascade (if any) is pending.
#[derive(Debug, Clone, PartialEq)]
pub struct RareClear {
    pub center: Position,
    pub cleared: Vec<Position>,
    pub points: u32,
    pub achievement: Option<Achievement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Ignored,
    Selected(Position),
    Deselected,
    Swap(SwapOutcome),
    RareClear(RareClear),
}

#[derive(Debug)]
pub struct Session {
    rules: Rules,
    source: TileSource,
    board: Board,
    stats: SessionStats,
    phase: Phase,
    cascade: Option<Cascade>,
    summary: MoveSummary,
    paused: bool,
    playing: bool,
}

impl Session {
    /// Fresh board and stats; `high_score` carries over from earlier sessions.
    #[instrument(skip(rules, source), fields(size = rules.board_size, moves = rules.initial_moves))]
    pub fn new_game(rules: Rules, high_score: u32, mut source: TileSource) -> Result<Self> {
        let board = generate(&rules, &mut source)?;
        info!("new game");
        Ok(Self::with_board(rules, board, high_score, source))
    }

    /// Default rules with the given size and move budget, seeded from system entropy.
    pub fn standard(size: usize, initial_moves: u32, high_score: u32) -> Result<Self> {
        let rules = Rules {
            board_size: size,
            initial_moves,
            ..Rules::default()
        };
        let source = TileSource::new(&rules.weights)?;
        Self::new_game(rules, high_score, source)
    }

    /// Start from a prepared board.
    pub fn with_board(rules: Rules, board: Board, high_score: u32, source: TileSource) -> Self {
        let stats = SessionStats::fresh(&rules, high_score);
        Self {
            rules,
            source,
            board,
            stats,
            phase: Phase::Idle,
            cascade: None,
            summary: MoveSummary::default(),
            paused: false,
            playing: true,
        }
    }

    /// New board and reset stats, keeping the high score.
    pub fn restart(&mut self) -> Result<()> {
        self.board = generate(&self.rules, &mut self.source)?;
        self.stats = SessionStats::fresh(&self.rules, self.stats.high_score);
        self.phase = Phase::Idle;
        self.cascade = None;
        self.summary = MoveSummary::default();
        self.paused = false;
        self.playing = true;
        info!(high_score = self.stats.high_score, "game restarted");
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected(&self) -> Option<Position> {
        match self.phase {
            Phase::AwaitingSwap(p) => Some(p),
            _ => None,
        }
    }

    /// A cascade is in flight; input must wait.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Resolving { .. })
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Stop accepting input. Moves running out is reported, never enforced; the caller ends.
    pub fn end(&mut self) {
        self.playing = false;
        self.phase = Phase::Idle;
    }

    pub fn is_out_of_moves(&self) -> bool {
        self.stats.moves_remaining == 0
    }

    /// A rare tile on the board always counts: activating it is a legal move.
    pub fn has_possible_moves(&self) -> bool {
        self.board.tiles().any(|t| t.kind.is_rare())
            || has_possible_moves(&self.board, self.rules.min_match_length)
    }

    /// Matches the next [`Session::step`] will clear.
    pub fn pending_matches(&self) -> &[Match] {
        match &self.cascade {
            Some(cascade) => cascade.pending(),
            None => &[],
        }
    }

    fn accepts_input(&self) -> bool {
        self.playing && !self.paused && !self.is_busy()
    }

    /// Player picks a tile. Two distinct picks attempt a swap through [`Session::begin_swap`];
    /// picking a rare tile activates it instead.
    pub fn select(&mut self, pos: Position) -> Result<SelectOutcome> {
        self.board.check(pos)?;
        if !self.accepts_input() {
            return Ok(SelectOutcome::Ignored);
        }
        if self.board.at(pos.row, pos.col).kind.is_rare() {
            self.phase = Phase::Idle;
            let outcome = self
                .begin_rare_clear(pos)?
                .map_or(SelectOutcome::Ignored, SelectOutcome::RareClear);
            return Ok(outcome);
        }
        let outcome = match self.phase {
            Phase::AwaitingSwap(first) if first == pos => {
                self.phase = Phase::Idle;
                SelectOutcome::Deselected
            }
            Phase::AwaitingSwap(first) => SelectOutcome::Swap(self.begin_swap(first, pos)?),
            Phase::Idle | Phase::Resolving { .. } => {
                self.phase = Phase::AwaitingSwap(pos);
                SelectOutcome::Selected(pos)
            }
        };
        Ok(outcome)
    }

    /// Validate and perform a swap. On a match, a move is consumed and the session
    /// enters the resolving phase without running any pass.
    ///
    /// Rare tiles are swapped like any other kind here; only [`Session::select`]
    /// turns picking a rare tile into an activation.
    #[instrument(skip(self))]
    pub fn begin_swap(&mut self, a: Position, b: Position) -> Result<SwapOutcome> {
        self.board.check(a)?;
        self.board.check(b)?;
        if !self.accepts_input() {
            return Ok(SwapOutcome::Ignored);
        }
        self.phase = Phase::Idle;
        if !a.is_adjacent(b) {
            debug!("not adjacent");
            return Ok(SwapOutcome::RejectedNotAdjacent);
        }

        swap(&mut self.board, a, b)?;
        let matches = find_matches(&self.board, self.rules.min_match_length);
        if matches.is_empty() {
            swap(&mut self.board, a, b)?;
            debug!("no match; reverted");
            return Ok(SwapOutcome::RevertedNoMatch { a, b });
        }

        self.stats.moves_remaining = self.stats.moves_remaining.saturating_sub(1);
        debug!(
            matches = matches.len(),
            moves_remaining = self.stats.moves_remaining,
            "swap accepted"
        );
        self.summary = MoveSummary::default();
        self.start_cascade(Cascade::new(matches, 1.0));
        Ok(SwapOutcome::Resolving)
    }

    /// Swap and resolve the whole chain reaction before returning.
    /// A rare endpoint is swapped, not activated; see [`Session::clear_rare`].
    pub fn request_swap(&mut self, a: Position, b: Position) -> Result<SwapOutcome> {
        Ok(match self.begin_swap(a, b)? {
            SwapOutcome::Resolving => SwapOutcome::Resolved(self.finish()),
            other => other,
        })
    }

    fn start_cascade(&mut self, cascade: Cascade) {
        if cascade.is_finished() {
            self.cascade = None;
            self.phase = Phase::Idle;
        } else {
            self.phase = Phase::Resolving {
                multiplier: cascade.multiplier(),
            };
            self.cascade = Some(cascade);
        }
    }

    /// Run one resolution pass. Returns None when nothing is resolving.
    pub fn step(&mut self) -> Option<Step> {
        let cascade = self.cascade.as_mut()?;
        let Some(pass) = cascade.step(&mut self.board, &mut self.source, &self.rules) else {
            self.cascade = None;
            self.phase = Phase::Idle;
            return None;
        };
        if cascade.is_finished() {
            self.cascade = None;
            self.phase = Phase::Idle;
        } else {
            self.phase = Phase::Resolving {
                multiplier: cascade.multiplier(),
            };
        }

        self.stats.matches_count += pass.matches.len() as u32;
        let achievement = self.add_score(pass.points);
        self.summary.record_pass(&pass, achievement.as_ref());
        Some(Step { pass, achievement })
    }

    /// Step to quiescence and hand back the totals of the current move.
    pub fn finish(&mut self) -> MoveSummary {
        while self.step().is_some() {}
        std::mem::take(&mut self.summary)
    }

    /// Activate a rare tile: flat bonus, clear its row and column, drop, then queue
    /// the follow-up cascade at the rare multiplier. Consumes no move.
    /// None if input is not accepted or the tile is not rare.
    #[instrument(skip(self))]
    pub fn begin_rare_clear(&mut self, center: Position) -> Result<Option<RareClear>> {
        self.board.check(center)?;
        if !self.accepts_input() || !self.board.at(center.row, center.col).kind.is_rare() {
            return Ok(None);
        }
        self.phase = Phase::Idle;
        self.summary = MoveSummary::default();

        let points = self.rules.rare_clear_bonus;
        let achievement = self.add_score(points);
        self.summary.record_points(points, achievement.as_ref());

        let cleared = mark_cross(&mut self.board, center)?;
        apply_gravity(&mut self.board, &mut self.source);
        info!(cleared = cleared.len(), points, "rare clear");

        let matches = find_matches(&self.board, self.rules.min_match_length);
        self.start_cascade(Cascade::new(matches, self.rules.rare_clear_multiplier));
        Ok(Some(RareClear {
            center,
            cleared,
            points,
            achievement,
        }))
    }

    /// Rare clear run to completion.
    pub fn clear_rare(&mut self, center: Position) -> Result<Option<MoveSummary>> {
        Ok(self.begin_rare_clear(center)?.map(|_| self.finish()))
    }

    /// Add points; unlocks at most one achievement (and one level) per call.
    pub fn add_score(&mut self, points: u32) -> Option<Achievement> {
        let previous = self.stats.score;
        self.stats.score = previous.saturating_add(points);
        self.stats.high_score = self.stats.high_score.max(self.stats.score);

        let milestone =
            crossed_milestone(previous, self.stats.score, self.rules.milestone_points)?;
        self.stats.level += 1;
        let achievement = Achievement {
            milestone,
            level: self.stats.level,
            message: message_for(milestone),
        };
        info!(
            milestone,
            level = achievement.level,
            score = self.stats.score,
            "achievement unlocked"
        );
        Some(achievement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::tile::TileKind::{self, Blue as B, Golden as G, Rainbow as R, Vanilla as V};

    fn session(kinds: &[Vec<TileKind>]) -> Session {
        let rules = Rules::default();
        let mut src = TileSource::seeded(21, &rules.weights).unwrap();
        let board = Board::from_kinds(kinds, &mut src).unwrap();
        Session::with_board(rules, board, 0, src)
    }

    fn quiet_board() -> Vec<Vec<TileKind>> {
        vec![
            vec![G, V, G, V, G],
            vec![V, G, V, G, V],
            vec![B, B, V, B, G],
            vec![G, V, G, V, G],
            vec![V, G, V, G, V],
        ]
    }

    #[test]
    fn new_game_is_idle_with_fresh_stats() {
        let rules = Rules::default();
        let src = TileSource::seeded(3, &rules.weights).unwrap();
        let s = Session::new_game(rules, 777, src).unwrap();
        assert_eq!(s.board().size(), 5);
        assert_eq!(
            *s.stats(),
            SessionStats {
                score: 0,
                high_score: 777,
                level: 1,
                moves_remaining: 30,
                matches_count: 0
            }
        );
        assert!(!s.is_busy());
        assert!(s.is_playing());
    }

    #[test]
    fn selecting_same_tile_twice_deselects() {
        let mut s = session(&quiet_board());
        let p = Position::new(0, 0);
        assert_eq!(s.select(p).unwrap(), SelectOutcome::Selected(p));
        assert_eq!(s.selected(), Some(p));
        assert_eq!(s.select(p).unwrap(), SelectOutcome::Deselected);
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn non_adjacent_selection_is_rejected() {
        let mut s = session(&quiet_board());
        let before = s.board().clone();
        s.select(Position::new(0, 0)).unwrap();
        let outcome = s.select(Position::new(1, 1)).unwrap();
        assert_eq!(outcome, SelectOutcome::Swap(SwapOutcome::RejectedNotAdjacent));
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.board(), &before);
    }

    #[test]
    fn selection_drives_step_api() {
        let mut s = session(&quiet_board());
        s.select(Position::new(2, 2)).unwrap();
        let outcome = s.select(Position::new(2, 3)).unwrap();
        assert_eq!(outcome, SelectOutcome::Swap(SwapOutcome::Resolving));
        assert!(s.is_busy());
        assert_eq!(s.pending_matches().len(), 1);

        // Input is refused while resolving.
        assert_eq!(s.select(Position::new(0, 0)).unwrap(), SelectOutcome::Ignored);
        assert_eq!(
            s.begin_swap(Position::new(0, 0), Position::new(0, 1)).unwrap(),
            SwapOutcome::Ignored
        );

        let first = s.step().unwrap();
        assert_eq!(first.pass.points, 50);
        assert_eq!(first.pass.multiplier, 1.0);
        let summary = s.finish();
        assert!(!s.is_busy());
        assert!(s.step().is_none());
        assert!(summary.points >= 50);
        assert_eq!(summary.points, s.stats().score);
    }

    #[test]
    fn out_of_bounds_fails_fast() {
        let mut s = session(&quiet_board());
        assert!(matches!(
            s.select(Position::new(5, 0)),
            Err(EngineError::OutOfBounds { row: 5, col: 0, size: 5 })
        ));
        assert!(s.request_swap(Position::new(0, 0), Position::new(0, 9)).is_err());
    }

    #[test]
    fn paused_session_ignores_input() {
        let mut s = session(&quiet_board());
        s.set_paused(true);
        assert_eq!(s.select(Position::new(0, 0)).unwrap(), SelectOutcome::Ignored);
        s.set_paused(false);
        s.end();
        assert_eq!(
            s.request_swap(Position::new(2, 2), Position::new(2, 3)).unwrap(),
            SwapOutcome::Ignored
        );
    }

    #[test]
    fn milestone_jump_awards_one_level() {
        let mut s = session(&quiet_board());
        assert_eq!(s.add_score(950), None);
        let a = s.add_score(2150).unwrap();
        assert_eq!(a.milestone, 3);
        assert_eq!(a.level, 2);
        assert_eq!(s.stats().level, 2);
        assert_eq!(s.stats().high_score, 3100);
    }

    #[test]
    fn rare_tile_clears_row_and_column() {
        let mut s = session(&[
            vec![G, V, G, V, G],
            vec![V, G, V, G, V],
            vec![G, V, R, V, G],
            vec![V, G, V, G, V],
            vec![G, V, G, V, G],
        ]);
        let before_moves = s.stats().moves_remaining;
        let outcome = s.select(Position::new(2, 2)).unwrap();
        let SelectOutcome::RareClear(clear) = outcome else {
            panic!("expected rare clear, got {outcome:?}");
        };
        assert_eq!(clear.cleared.len(), 9);
        assert_eq!(clear.points, 1000);
        assert_eq!(clear.achievement.as_ref().map(|a| a.milestone), Some(1));
        if s.is_busy() {
            assert_eq!(s.phase(), Phase::Resolving { multiplier: 1.5 });
        }
        let summary = s.finish();
        assert!(summary.points >= 1000);
        assert_eq!(s.stats().moves_remaining, before_moves);
        assert!(s.board().is_consistent());
        assert!(s.board().tiles().all(|t| !t.is_matched));
    }

    #[test]
    fn ordinary_tile_cannot_be_rare_cleared() {
        let mut s = session(&quiet_board());
        assert_eq!(s.clear_rare(Position::new(0, 0)).unwrap(), None);
        assert_eq!(s.stats().score, 0);
    }

    #[test]
    fn restart_keeps_high_score_only() {
        let mut s = session(&quiet_board());
        s.request_swap(Position::new(2, 2), Position::new(2, 3)).unwrap();
        let best = s.stats().high_score;
        assert!(best > 0);
        s.restart().unwrap();
        assert_eq!(s.stats().score, 0);
        assert_eq!(s.stats().moves_remaining, 30);
        assert_eq!(s.stats().level, 1);
        assert_eq!(s.stats().high_score, best);
    }

    #[test]
    fn swap_without_match_is_reverted_for_free() {
        let mut s = session(&quiet_board());
        let before = s.board().clone();
        let outcome = s
            .request_swap(Position::new(2, 1), Position::new(2, 2))
            .unwrap();
        assert_eq!(
            outcome,
            SwapOutcome::RevertedNoMatch {
                a: Position::new(2, 1),
                b: Position::new(2, 2)
            }
        );
        assert_eq!(s.board(), &before);
        assert_eq!(s.stats().moves_remaining, 30);
        assert_eq!(s.stats().score, 0);
        assert!(!s.is_busy());
    }

    #[test]
    fn rare_tile_on_a_dead_board_is_still_a_move() {
        let dead = session(&[vec![B, B, G], vec![B, B, G], vec![G, V, V]]);
        assert!(!dead.has_possible_moves());
        let with_rare = session(&[vec![B, B, G], vec![B, B, G], vec![G, V, R]]);
        assert!(with_rare.has_possible_moves());
    }

    #[test]
    fn direct_swap_moves_a_rare_tile_without_activating_it() {
        let mut s = session(&[
            vec![G, V, G, V, G],
            vec![V, G, V, G, V],
            vec![B, R, B, B, G],
            vec![G, V, G, V, G],
            vec![V, G, V, G, V],
        ]);
        let outcome = s
            .begin_swap(Position::new(2, 0), Position::new(2, 1))
            .unwrap();
        assert_eq!(outcome, SwapOutcome::Resolving);
        assert_eq!(s.board().tile(Position::new(2, 0)).unwrap().kind, R);
        assert_eq!(s.stats().moves_remaining, 29);
        let first = s.step().unwrap();
        assert_eq!(first.pass.points, 50);
        assert_eq!(s.stats().score, 50);
    }
}
