//! Persist the best score to disk (XDG config or ~/.config/donutswap).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the stored value.
pub const STORAGE_KEY: &str = "donutswap_high_score";

/// Resolves the default config dir: $XDG_CONFIG_HOME/donutswap, else $HOME/.config/donutswap.
fn config_dir() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("donutswap")
}

/// A single non-negative integer stored as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl Default for HighScoreStore {
    fn default() -> Self {
        Self::at(config_dir().join(STORAGE_KEY))
    }
}

impl HighScoreStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 0 when the file is missing or does not hold a number.
    pub fn load(&self) -> u32 {
        let Ok(content) = fs::read_to_string(&self.path) else {
            debug!(path = %self.path.display(), "no stored high score");
            return 0;
        };
        content.trim().parse().unwrap_or_else(|_| {
            warn!(path = %self.path.display(), "unparsable high score; using 0");
            0
        })
    }

    /// Write `score`, creating the directory if needed.
    pub fn save(&self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, format!("{score}\n"))
            .with_context(|| format!("writing {}", self.path.display()))?;
        info!(score, path = %self.path.display(), "high score saved");
        Ok(())
    }
}
