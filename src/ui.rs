//! Layout and drawing: board, sidebar, pause, quit menu and game over.

use crate::app::{GameOverReason, QuitOption, Screen};
use crate::theme::Theme;
use donutswap::{Position, Session, Tile};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position as CellPos, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal cells per tile.
const CELL_WIDTH: u16 = 4;
const CELL_HEIGHT: u16 = 2;
const SIDEBAR_WIDTH: u16 = 26;
/// Two glyph rows per tile: a rounded blob with a hole.
const DOUGHNUT: [&str; 2] = ["▄▀▀▄", "▀▄▄▀"];
const RAINBOW: [&str; 2] = ["▄██▄", "▀██▀"];

/// Everything the renderer needs for one frame.
pub struct View<'a> {
    pub screen: Screen,
    pub session: &'a Session,
    pub theme: &'a Theme,
    pub cursor: Position,
    /// Pair shown exchanged while a failed swap is on display.
    pub swapped: Option<(Position, Position)>,
    /// Pending matches are fading out.
    pub clearing: bool,
    pub fade_ms: u64,
    pub notice: Option<&'a str>,
    pub game_over_reason: Option<GameOverReason>,
    pub quit_selected: QuitOption,
    pub new_record: bool,
}

/// Board size in terminal cells including its border.
fn board_outer_size(size: usize) -> (u16, u16) {
    let n = u16::try_from(size).unwrap_or(u16::MAX);
    (
        n.saturating_mul(CELL_WIDTH).saturating_add(2),
        n.saturating_mul(CELL_HEIGHT).saturating_add(2),
    )
}

/// Split `area` into centred board and sidebar rects.
fn game_layout(area: Rect, size: usize) -> (Rect, Rect) {
    let (bw, bh) = board_outer_size(size);
    let total_w = bw + SIDEBAR_WIDTH;
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh.max(20)),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    (inner[0], inner[1])
}

/// Top-left buffer cell of tile (row, col) inside the board's inner rect.
fn tile_origin(inner: Rect, pos: Position) -> (u16, u16) {
    let col = u16::try_from(pos.col).unwrap_or(u16::MAX);
    let row = u16::try_from(pos.row).unwrap_or(u16::MAX);
    (
        inner.x.saturating_add(col.saturating_mul(CELL_WIDTH)),
        inner.y.saturating_add(row.saturating_mul(CELL_HEIGHT)),
    )
}

pub fn draw(
    frame: &mut Frame,
    view: &View,
    clear_effect: &mut Option<Effect>,
    clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    let (board_area, sidebar_area) = game_layout(area, view.session.board().size());
    frame.render_widget(
        Block::default().style(Style::default().bg(view.theme.bg)),
        area,
    );
    let inner = draw_board(frame, view, board_area);
    draw_sidebar(frame, view, sidebar_area);

    match view.screen {
        Screen::Playing => {
            if view.session.is_paused() {
                draw_pause_overlay(frame, view.theme, area);
            } else if view.clearing {
                apply_clear_effect(frame, view, inner, clear_effect, clear_process_time, now);
            }
        }
        Screen::QuitMenu => draw_quit_menu(frame, view.theme, view.quit_selected),
        Screen::GameOver => draw_game_over(frame, view, area),
    }
}

/// Draw the bordered board and return its inner rect.
fn draw_board(frame: &mut Frame, view: &View, area: Rect) -> Rect {
    let theme = view.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Donutswap ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let board = view.session.board();
    let selected = view.session.selected();
    let show_cursor = view.screen == Screen::Playing;
    for row in board.rows() {
        for tile in row {
            let shown = displayed_tile(view, tile);
            let pos = tile.position();
            let bg = if selected == Some(pos) {
                theme.selected
            } else if show_cursor && view.cursor == pos {
                theme.div_line
            } else {
                theme.bg
            };
            let fg = if shown.is_matched {
                theme.inactive_fg
            } else {
                theme.tile_color(shown.kind)
            };
            let glyph = if shown.kind.is_rare() { RAINBOW } else { DOUGHNUT };
            let (x, y) = tile_origin(inner, pos);
            for (dy, line) in (0..).zip(glyph) {
                if y + dy < inner.bottom() && x + CELL_WIDTH <= inner.right() {
                    frame
                        .buffer_mut()
                        .set_string(x, y + dy, line, Style::default().fg(fg).bg(bg));
                }
            }
        }
    }
    inner
}

/// Tile to paint at `tile`'s cell, accounting for a failed swap still on display.
fn displayed_tile<'a>(view: &View<'a>, tile: &'a Tile) -> &'a Tile {
    let board = view.session.board();
    let other = match view.swapped {
        Some((a, b)) if tile.position() == a => b,
        Some((a, b)) if tile.position() == b => a,
        _ => return tile,
    };
    board.tile(other).unwrap_or(tile)
}

/// Buffer cells covered by the tiles in the pending matches.
fn clearing_buffer_positions(inner: Rect, cells: impl Iterator<Item = Position>) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for pos in cells {
        let (x0, y0) = tile_origin(inner, pos);
        for bx in x0..(x0 + CELL_WIDTH).min(inner.right()) {
            for by in y0..(y0 + CELL_HEIGHT).min(inner.bottom()) {
                set.insert((bx, by));
            }
        }
    }
    set
}

/// Create or update the fade effect over pending matches and process it.
fn apply_clear_effect(
    frame: &mut Frame,
    view: &View,
    inner: Rect,
    clear_effect: &mut Option<Effect>,
    clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = clear_process_time.map_or(std::time::Duration::ZERO, |t| {
        now.saturating_duration_since(t)
    });
    let delta_ms = u32::try_from(delta.as_millis()).unwrap_or(u32::MAX);
    *clear_process_time = Some(now);

    if clear_effect.is_none() {
        let cells = view
            .session
            .pending_matches()
            .iter()
            .flat_map(|m| m.positions());
        let clearing = clearing_buffer_positions(inner, cells);
        let filter = CellFilter::PositionFn(ref_count(move |pos: CellPos| {
            clearing.contains(&(pos.x, pos.y))
        }));
        let bg = view.theme.bg;
        let fade_ms = u32::try_from(view.fade_ms).unwrap_or(u32::MAX);
        let effect = fx::fade_to(bg, bg, (fade_ms, Interpolation::Linear))
            .with_filter(filter)
            .with_area(inner);
        *clear_effect = Some(effect);
    }

    if let Some(effect) = clear_effect {
        frame.render_effect(effect, inner, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);
    let stats = view.session.stats();
    let rules = view.session.rules();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats
            Constraint::Length(4), // Moves gauge
            Constraint::Length(4), // Combo gauge
            Constraint::Length(5), // Notice
        ])
        .split(area);

    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    Paragraph::new(Text::from(vec![
        stat("Score: ", stats.score.to_string()),
        stat("Best: ", stats.high_score.to_string()),
        stat("Level: ", stats.level.to_string()),
        stat("Matches: ", stats.matches_count.to_string()),
        stat("Moves: ", stats.moves_remaining.to_string()),
    ]))
    .block(stats_block)
    .render(chunks[0], frame.buffer_mut());

    let moves_ratio = if rules.initial_moves > 0 {
        (f64::from(stats.moves_remaining) / f64::from(rules.initial_moves)).min(1.0)
    } else {
        0.0
    };
    let moves_color = if moves_ratio > 0.5 {
        Color::Green
    } else if moves_ratio > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    };
    Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(" Moves ", title_style)),
        )
        .ratio(moves_ratio)
        .label(format!("{} / {}", stats.moves_remaining, rules.initial_moves))
        .gauge_style(Style::default().fg(moves_color).bg(theme.bg))
        .render(chunks[1], frame.buffer_mut());

    let multiplier = match view.session.phase() {
        donutswap::Phase::Resolving { multiplier } => multiplier,
        _ => 1.0,
    };
    let combo_ratio = if rules.combo_cap > 1.0 {
        ((multiplier - 1.0) / (rules.combo_cap - 1.0)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(" Combo ", title_style)),
        )
        .ratio(combo_ratio)
        .label(format!("x{multiplier:.1}"))
        .gauge_style(Style::default().fg(theme.title).bg(theme.bg))
        .render(chunks[2], frame.buffer_mut());

    let notice = view.notice.unwrap_or(match view.session.selected() {
        Some(_) => "Pick a neighbour to swap",
        None => "",
    });
    Paragraph::new(Span::styled(notice, Style::default().fg(theme.title).bold()))
        .wrap(ratatui::widgets::Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .render(chunks[3], frame.buffer_mut());
}

fn centred(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centred(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: Resume    Q: Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let stats = view.session.stats();
    let popup = centred(area, 34, 11);
    let reason = match view.game_over_reason {
        Some(GameOverReason::NoMovesLeft) => " No possible moves ",
        _ => " Out of moves ",
    };
    let fg = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(Span::styled(reason, Style::default().fg(theme.inactive_fg))),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", stats.score), fg)),
        Line::from(Span::styled(format!(" Best: {} ", stats.high_score), fg)),
        Line::from(Span::styled(format!(" Level: {} ", stats.level), fg)),
    ];
    if view.new_record {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" R: Restart    Q: Quit ", fg)));
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Donutswap ", theme.title)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centred(frame.area(), 24, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title).bg(theme.bg))
        .title(" Quit? ");
    Clear.render(quit_rect, frame.buffer_mut());
    frame
        .buffer_mut()
        .set_style(quit_rect, Style::default().bg(theme.bg));
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    for (i, opt) in (0u16..).zip(QuitOption::ALL) {
        let label = match opt {
            QuitOption::Resume => " Resume ",
            QuitOption::NewGame => " New Game ",
            QuitOption::Exit => " Exit ",
        };
        let style = if opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.title)
        };
        let width = u16::try_from(label.chars().count()).unwrap_or(0);
        let rx = inner.x + inner.width.saturating_sub(width) / 2;
        let ry = inner.y + 1 + i * 2;
        if ry < inner.bottom() {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}
