//! Square board of tiles. rows[0] is the top row.

use crate::error::{EngineError, Result};
use crate::source::TileSource;
use crate::tile::{Position, Tile, TileKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    /// rows[r][c] = tile; every tile's row/col equals its index.
    rows: Vec<Vec<Tile>>,
}

impl Board {
    /// Wrap fully placed rows. Caller guarantees a square with consistent coordinates.
    pub(crate) fn from_rows(rows: Vec<Vec<Tile>>) -> Self {
        Self {
            size: rows.len(),
            rows,
        }
    }

    /// Build a board with given kinds (row-major), taking ids from `source`.
    pub fn from_kinds(kinds: &[Vec<TileKind>], source: &mut TileSource) -> Result<Self> {
        let size = kinds.len();
        if kinds.iter().any(|row| row.len() != size) {
            return Err(EngineError::NotSquare(size));
        }
        let rows = kinds
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, &kind)| source.spawn_kind(kind, r, c))
                    .collect()
            })
            .collect();
        Ok(Self::from_rows(rows))
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fail fast on coordinates outside the board.
    pub fn check(&self, pos: Position) -> Result<()> {
        if pos.row < self.size && pos.col < self.size {
            Ok(())
        } else {
            Err(EngineError::OutOfBounds {
                row: pos.row,
                col: pos.col,
                size: self.size,
            })
        }
    }

    pub fn tile(&self, pos: Position) -> Result<&Tile> {
        self.check(pos)?;
        Ok(&self.rows[pos.row][pos.col])
    }

    /// Unchecked access for loops that already iterate within 0..size.
    #[inline]
    pub(crate) fn at(&self, row: usize, col: usize) -> &Tile {
        &self.rows[row][col]
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, row: usize, col: usize) -> &mut Tile {
        &mut self.rows[row][col]
    }

    /// Put `tile` into (row, col), rewriting its coordinates to match.
    #[inline]
    pub(crate) fn put(&mut self, row: usize, col: usize, mut tile: Tile) {
        tile.place_at(row, col);
        self.rows[row][col] = tile;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.rows.iter().flatten()
    }

    pub fn kinds(&self) -> Vec<Vec<TileKind>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|t| t.kind).collect())
            .collect()
    }

    /// True when every tile's stored coordinates equal its cell.
    pub fn is_consistent(&self) -> bool {
        self.rows.len() == self.size
            && self.rows.iter().enumerate().all(|(r, row)| {
                row.len() == self.size
                    && row
                        .iter()
                        .enumerate()
                        .all(|(c, t)| t.row == r && t.col == c)
            })
    }
}

/// One letter per tile: B, G, V, R; matched tiles in lowercase.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for t in row {
                let c = match t.kind {
                    TileKind::Blue => 'B',
                    TileKind::Golden => 'G',
                    TileKind::Vanilla => 'V',
                    TileKind::Rainbow => 'R',
                };
                let c = if t.is_matched { c.to_ascii_lowercase() } else { c };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
