//! Donutswap: match-3 doughnut puzzle in the terminal.

mod app;
mod input;
mod logging;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use donutswap::{HighScoreStore, Rules, TileSource, TypeWeights};
use std::path::PathBuf;

/// Front-end options that do not change the rules.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// How long pending matches stay highlighted before a pass is resolved.
    pub resolve_delay_ms: u64,
    /// How long a failed swap is shown before it is undone on screen.
    pub revert_delay_ms: u64,
    pub no_animation: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_file.as_deref())?;

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let rules = Rules {
        board_size: args.size,
        initial_moves: args.moves,
        weights: TypeWeights::with_rare_chance(args.rare_chance),
        ..Rules::default()
    };
    rules.validate()?;
    let source = match args.seed {
        Some(seed) => TileSource::seeded(seed, &rules.weights)?,
        None => TileSource::new(&rules.weights)?,
    };
    let config = GameConfig {
        resolve_delay_ms: args.resolve_delay_ms,
        revert_delay_ms: args.revert_delay_ms,
        no_animation: args.no_animation,
    };

    let mut app = App::new(rules, source, config, theme, HighScoreStore::default())?;
    app.run()
}

/// Match-3 doughnut puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "donutswap",
    version,
    about = "Match-3 doughnut puzzle in the terminal. Swap neighbours to line up three or more of a kind.",
    long_about = "Donutswap is a terminal match-3 game.\n\n\
        Select a doughnut, then an orthogonal neighbour, to swap them. A swap only sticks \
        if it lines up three or more of a kind; cleared doughnuts make room for the ones \
        above and chain reactions raise the combo multiplier. Select a rainbow doughnut to \
        clear its whole row and column.\n\n\
        CONTROLS:\n  Arrows / hjkl  Move cursor    Enter / Space  Select\n  \
        P  Pause    N  New game    R  Restart (game over)    Q / Esc  Quit menu"
)]
pub struct Args {
    /// Board edge length.
    #[arg(short, long, default_value = "5", value_name = "N")]
    pub size: usize,

    /// Moves available per game.
    #[arg(short, long, default_value = "30", value_name = "N")]
    pub moves: u32,

    /// Seed the tile generator for a reproducible game.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Probability that a fresh tile is a rainbow doughnut.
    #[arg(long, default_value = "0.02", value_name = "P")]
    pub rare_chance: f64,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the clear animation (passes resolve immediately).
    #[arg(long)]
    pub no_animation: bool,

    /// Delay before each cascade pass is resolved.
    #[arg(long, default_value = "500", value_name = "MS")]
    pub resolve_delay_ms: u64,

    /// Delay before a swap without a match is undone.
    #[arg(long, default_value = "400", value_name = "MS")]
    pub revert_delay_ms: u64,

    /// Write logs to this file (filtered by RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
