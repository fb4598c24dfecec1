//! Match detection: every maximal horizontal and vertical run of one kind.

use crate::board::Board;
use crate::mutator;
use crate::tile::{Position, Tile, TileKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A maximal run of at least `min_match_length` identical tiles along one axis.
///
/// Holds copies of the tiles as they were when detected; it is consumed within
/// the same resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub tiles: Vec<Tile>,
    pub orientation: Orientation,
    pub start: Position,
}

impl Match {
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn kind(&self) -> Option<TileKind> {
        self.tiles.first().map(|t| t.kind)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.iter().map(Tile::position)
    }
}

/// All runs, rows first (top to bottom) then columns (left to right).
///
/// A tile in both a horizontal and a vertical run shows up in two matches.
pub fn find_matches(board: &Board, min_len: usize) -> Vec<Match> {
    let mut out = Vec::new();
    for row in 0..board.size() {
        scan_line(board, Orientation::Horizontal, row, min_len, &mut out);
    }
    for col in 0..board.size() {
        scan_line(board, Orientation::Vertical, col, min_len, &mut out);
    }
    out
}

fn scan_line(
    board: &Board,
    orientation: Orientation,
    line: usize,
    min_len: usize,
    out: &mut Vec<Match>,
) {
    let size = board.size();
    if size == 0 {
        return;
    }
    let cell = |i: usize| match orientation {
        Orientation::Horizontal => board.at(line, i),
        Orientation::Vertical => board.at(i, line),
    };

    let mut run_kind = cell(0).kind;
    let mut run_start = 0;
    // i == size is the sentinel that flushes a run ending on the last cell.
    for i in 1..=size {
        if i < size && cell(i).kind == run_kind {
            continue;
        }
        if i - run_start >= min_len {
            out.push(Match {
                tiles: (run_start..i).map(|j| *cell(j)).collect(),
                orientation,
                start: cell(run_start).position(),
            });
        }
        if i < size {
            run_kind = cell(i).kind;
            run_start = i;
        }
    }
}

/// True if some adjacent swap (right or down neighbour) would produce a match.
pub fn has_possible_moves(board: &Board, min_len: usize) -> bool {
    let size = board.size();
    let mut scratch = board.clone();
    for row in 0..size {
        for col in 0..size {
            let here = Position::new(row, col);
            let neighbours = [Position::new(row, col + 1), Position::new(row + 1, col)];
            for there in neighbours {
                if there.row >= size || there.col >= size {
                    continue;
                }
                mutator::swap_unchecked(&mut scratch, here, there);
                let found = !find_matches(&scratch, min_len).is_empty();
                mutator::swap_unchecked(&mut scratch, here, there);
                if found {
                    return true;
                }
            }
        }
    }
    false
}
