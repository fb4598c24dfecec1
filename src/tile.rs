//! Tiles, tile kinds and grid positions.

use std::fmt;

/// Doughnut kinds. Three ordinary kinds plus one rare kind that clears its row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Blue,
    Golden,
    Vanilla,
    /// Rare bonus doughnut; still matches like any other kind.
    Rainbow,
}

impl TileKind {
    pub const ORDINARY: [Self; 3] = [Self::Blue, Self::Golden, Self::Vanilla];
    pub const ALL: [Self; 4] = [Self::Blue, Self::Golden, Self::Vanilla, Self::Rainbow];

    #[inline]
    pub fn is_rare(self) -> bool {
        matches!(self, Self::Rainbow)
    }

    /// Colour index 0..4 for theme.tile_color().
    pub fn color_index(self) -> u8 {
        match self {
            Self::Blue => 0,
            Self::Golden => 1,
            Self::Vanilla => 2,
            Self::Rainbow => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Golden => "golden",
            Self::Vanilla => "vanilla",
            Self::Rainbow => "rainbow",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque tile identity. Stable across swaps and gravity so a renderer can follow a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub(crate) u64);

impl TileId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Grid coordinate. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonal neighbours only (Manhattan distance exactly 1).
    pub fn is_adjacent(self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One grid cell's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    pub row: usize,
    pub col: usize,
    pub is_matched: bool,
}

impl Tile {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    pub(crate) fn place_at(&mut self, row: usize, col: usize) {
        self.row = row;
        self.col = col;
    }
}
