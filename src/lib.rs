//! Donutswap engine: a match-3 board of doughnuts with cascading combos.
//!
//! Everything here is independent of the terminal front end. A [`Session`]
//! owns the board and stats and is driven by tile selections; the lower-level
//! modules (detection, scoring, gravity) are usable on their own.

pub mod achievement;
pub mod board;
pub mod cascade;
pub mod config;
pub mod detector;
pub mod error;
pub mod generator;
pub mod highscores;
pub mod mutator;
pub mod scoring;
pub mod session;
pub mod source;
pub mod tile;

pub use achievement::Achievement;
pub use board::Board;
pub use cascade::{Cascade, PassReport, Phase};
pub use config::{Rules, TypeWeights};
pub use detector::{Match, Orientation};
pub use error::{EngineError, Result};
pub use highscores::HighScoreStore;
pub use session::{
    MoveSummary, RareClear, SelectOutcome, Session, SessionStats, Step, SwapOutcome,
};
pub use source::TileSource;
pub use tile::{Position, Tile, TileId, TileKind};
