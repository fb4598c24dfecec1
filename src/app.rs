//! App: terminal init, main loop, key handling and the timed cascade.

use crate::GameConfig;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use donutswap::{
    HighScoreStore, Position, Rules, SelectOutcome, Session, Step, SwapOutcome, TileSource,
};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{info, warn};

/// How long a notice (achievement, combo) stays in the sidebar.
const NOTICE_MS: u64 = 2500;
/// Target frame time (~60 FPS).
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    NewGame,
    Exit,
}

impl QuitOption {
    pub const ALL: [Self; 3] = [Self::Resume, Self::NewGame, Self::Exit];

    fn next(self) -> Self {
        match self {
            Self::Resume => Self::NewGame,
            Self::NewGame => Self::Exit,
            Self::Exit => Self::Resume,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Resume => Self::Exit,
            Self::NewGame => Self::Resume,
            Self::Exit => Self::NewGame,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    OutOfMoves,
    NoMovesLeft,
}

/// Board animation between engine calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Animation {
    /// Pending matches fade out; the next pass resolves at `until`.
    Clearing { until: Instant },
    /// A swap without a match is shown swapped until `until`; the engine already undid it.
    Reverting {
        a: Position,
        b: Position,
        until: Instant,
    },
}

pub struct App {
    session: Session,
    config: GameConfig,
    theme: Theme,
    store: HighScoreStore,
    screen: Screen,
    cursor: Position,
    quit_selected: QuitOption,
    game_over_reason: Option<GameOverReason>,
    animation: Option<Animation>,
    /// TachyonFX fade for the cells being cleared (rebuilt each pass).
    clear_effect: Option<Effect>,
    /// Last time the clear effect was processed (for delta).
    clear_effect_process_time: Option<Instant>,
    notice: Option<(String, Instant)>,
    /// High score at session start; a higher value at game over is a new record.
    best_at_start: u32,
    /// Last value written to disk.
    saved_high_score: u32,
}

impl App {
    pub fn new(
        rules: Rules,
        source: TileSource,
        config: GameConfig,
        theme: Theme,
        store: HighScoreStore,
    ) -> Result<Self> {
        let high_score = store.load();
        info!(high_score, path = %store.path().display(), "loaded high score");
        let session = Session::new_game(rules, high_score, source)?;
        let cursor = centre(session.board().size());
        Ok(Self {
            session,
            config,
            theme,
            store,
            screen: Screen::Playing,
            cursor,
            quit_selected: QuitOption::Resume,
            game_over_reason: None,
            animation: None,
            clear_effect: None,
            clear_effect_process_time: None,
            notice: None,
            best_at_start: high_score,
            saved_high_score: high_score,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::init();
        let result = self.run_loop(&mut terminal);
        ratatui::restore();
        self.save_high_score();
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            if self.notice.as_ref().is_some_and(|(_, until)| now >= *until) {
                self.notice = None;
            }

            let view = View {
                screen: self.screen,
                session: &self.session,
                theme: &self.theme,
                cursor: self.cursor,
                swapped: match self.animation {
                    Some(Animation::Reverting { a, b, .. }) => Some((a, b)),
                    _ => None,
                },
                clearing: matches!(self.animation, Some(Animation::Clearing { .. })),
                fade_ms: self.config.resolve_delay_ms,
                notice: self.notice.as_ref().map(|(text, _)| text.as_str()),
                game_over_reason: self.game_over_reason,
                quit_selected: self.quit_selected,
                new_record: self.session.stats().high_score > self.best_at_start,
            };
            terminal.draw(|f| {
                ui::draw(
                    f,
                    &view,
                    &mut self.clear_effect,
                    &mut self.clear_effect_process_time,
                    now,
                );
            })?;

            if self.screen == Screen::Playing && !self.session.is_paused() {
                self.tick(now);
            }

            let timeout = FRAME.saturating_sub(now.elapsed());
            if !event::poll(timeout)? {
                continue;
            }
            while event::poll(Duration::ZERO)? {
                let Event::Key(key) = event::read()? else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if !self.handle_action(key_to_action(key))? {
                    return Ok(());
                }
            }
        }
    }

    /// Advance animations. Resolves one cascade pass per expired clear.
    fn tick(&mut self, now: Instant) {
        match self.animation {
            Some(Animation::Reverting { until, .. }) if now >= until => {
                self.animation = None;
            }
            Some(Animation::Clearing { until }) if now >= until => {
                self.clear_effect = None;
                self.clear_effect_process_time = None;
                if let Some(step) = self.session.step() {
                    self.on_step(&step, now);
                }
                if self.session.is_busy() {
                    self.animation = Some(Animation::Clearing {
                        until: now + Duration::from_millis(self.config.resolve_delay_ms),
                    });
                } else {
                    self.animation = None;
                    self.check_game_over();
                }
            }
            _ => {}
        }
    }

    /// Returns false when the app should exit.
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match self.screen {
            Screen::Playing if self.session.is_paused() => match action {
                Action::Pause => self.session.set_paused(false),
                Action::Quit => self.open_quit_menu(),
                _ => {}
            },
            Screen::Playing => match action {
                Action::Pause => self.session.set_paused(true),
                Action::Quit => self.open_quit_menu(),
                Action::NewGame => self.new_game()?,
                Action::Select => self.select()?,
                Action::Up | Action::Down | Action::Left | Action::Right => {
                    self.move_cursor(action);
                }
                Action::Restart | Action::None => {}
            },
            Screen::QuitMenu => match action {
                Action::Down | Action::Right => self.quit_selected = self.quit_selected.next(),
                Action::Up | Action::Left => self.quit_selected = self.quit_selected.prev(),
                Action::Select => match self.quit_selected {
                    QuitOption::Resume => self.close_quit_menu(),
                    QuitOption::NewGame => self.new_game()?,
                    QuitOption::Exit => return Ok(false),
                },
                Action::Pause | Action::Quit => self.close_quit_menu(),
                Action::NewGame | Action::Restart | Action::None => {}
            },
            Screen::GameOver => match action {
                Action::Quit => return Ok(false),
                Action::Restart | Action::NewGame | Action::Select => self.new_game()?,
                _ => {}
            },
        }
        Ok(true)
    }

    fn open_quit_menu(&mut self) {
        self.screen = Screen::QuitMenu;
        self.quit_selected = QuitOption::Resume;
        self.session.set_paused(true);
    }

    fn close_quit_menu(&mut self) {
        self.screen = Screen::Playing;
        self.session.set_paused(false);
    }

    fn move_cursor(&mut self, action: Action) {
        let last = self.session.board().size().saturating_sub(1);
        let Position { row, col } = self.cursor;
        self.cursor = match action {
            Action::Up => Position::new(row.saturating_sub(1), col),
            Action::Down => Position::new((row + 1).min(last), col),
            Action::Left => Position::new(row, col.saturating_sub(1)),
            Action::Right => Position::new(row, (col + 1).min(last)),
            _ => self.cursor,
        };
    }

    fn select(&mut self) -> Result<()> {
        if self.animation.is_some() {
            return Ok(());
        }
        let now = Instant::now();
        match self.session.select(self.cursor)? {
            SelectOutcome::Swap(SwapOutcome::Resolving) => self.start_clearing(now),
            SelectOutcome::Swap(SwapOutcome::RevertedNoMatch { a, b }) => {
                if !self.config.no_animation {
                    self.animation = Some(Animation::Reverting {
                        a,
                        b,
                        until: now + Duration::from_millis(self.config.revert_delay_ms),
                    });
                }
            }
            SelectOutcome::Swap(SwapOutcome::RejectedNotAdjacent) => {
                self.show_notice("Pick a neighbour", now);
            }
            SelectOutcome::RareClear(clear) => {
                let text = match &clear.achievement {
                    Some(a) => format!("Rainbow! {}", a.message),
                    None => format!("Rainbow! +{}", clear.points),
                };
                self.show_notice(&text, now);
                if self.session.is_busy() {
                    self.start_clearing(now);
                } else {
                    self.check_game_over();
                }
            }
            SelectOutcome::Selected(_)
            | SelectOutcome::Deselected
            | SelectOutcome::Ignored
            | SelectOutcome::Swap(SwapOutcome::Ignored | SwapOutcome::Resolved(_)) => {}
        }
        Ok(())
    }

    fn start_clearing(&mut self, now: Instant) {
        if self.config.no_animation {
            let summary = self.session.finish();
            if let Some(a) = summary.achievements.last() {
                self.show_notice(&format!("Level {}: {}", a.level, a.message), now);
            } else if summary.reached_combo() {
                self.show_notice(&format!("Combo x{:.1}", summary.peak_multiplier), now);
            }
            self.check_game_over();
            return;
        }
        self.clear_effect = None;
        self.clear_effect_process_time = None;
        self.animation = Some(Animation::Clearing {
            until: now + Duration::from_millis(self.config.resolve_delay_ms),
        });
    }

    fn on_step(&mut self, step: &Step, now: Instant) {
        if let Some(a) = &step.achievement {
            self.show_notice(&format!("Level {}: {}", a.level, a.message), now);
        } else if step.pass.multiplier > 1.0 {
            self.show_notice(&format!("Combo x{:.1}", step.pass.multiplier), now);
        }
    }

    fn show_notice(&mut self, text: &str, now: Instant) {
        self.notice = Some((text.to_string(), now + Duration::from_millis(NOTICE_MS)));
    }

    fn check_game_over(&mut self) {
        let reason = if self.session.is_out_of_moves() {
            GameOverReason::OutOfMoves
        } else if !self.session.has_possible_moves() {
            GameOverReason::NoMovesLeft
        } else {
            return;
        };
        let stats = self.session.stats();
        info!(?reason, score = stats.score, level = stats.level, "game over");
        self.session.end();
        self.game_over_reason = Some(reason);
        self.screen = Screen::GameOver;
        self.save_high_score();
    }

    fn new_game(&mut self) -> Result<()> {
        self.save_high_score();
        self.session.restart()?;
        self.best_at_start = self.session.stats().high_score;
        self.cursor = centre(self.session.board().size());
        self.screen = Screen::Playing;
        self.game_over_reason = None;
        self.animation = None;
        self.clear_effect = None;
        self.clear_effect_process_time = None;
        self.notice = None;
        Ok(())
    }

    fn save_high_score(&mut self) {
        let best = self.session.stats().high_score;
        if best <= self.saved_high_score {
            return;
        }
        match self.store.save(best) {
            Ok(()) => self.saved_high_score = best,
            Err(e) => warn!("could not save high score: {e:#}"),
        }
    }
}

fn centre(size: usize) -> Position {
    Position::new(size / 2, size / 2)
}
