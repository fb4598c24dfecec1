//! Board mutations: swap, mark matched tiles, gravity with refill.

use crate::board::Board;
use crate::detector::Match;
use crate::error::Result;
use crate::source::TileSource;
use crate::tile::Position;
use std::collections::HashSet;

/// Exchange the tiles at `a` and `b`; each tile takes the coordinates of its new cell.
pub fn swap(board: &mut Board, a: Position, b: Position) -> Result<()> {
    board.check(a)?;
    board.check(b)?;
    swap_unchecked(board, a, b);
    Ok(())
}

pub(crate) fn swap_unchecked(board: &mut Board, a: Position, b: Position) {
    let ta = *board.at(a.row, a.col);
    let tb = *board.at(b.row, b.col);
    board.put(a.row, a.col, tb);
    board.put(b.row, b.col, ta);
}

/// Flag every tile referenced by `matches`. Returns the number of distinct cells marked.
pub fn mark_matched(board: &mut Board, matches: &[Match]) -> usize {
    let cells: HashSet<Position> = matches.iter().flat_map(Match::positions).collect();
    for pos in &cells {
        board.at_mut(pos.row, pos.col).is_matched = true;
    }
    cells.len()
}

/// Flag the whole row and column through `center`. Returns the flagged cells, row first.
pub fn mark_cross(board: &mut Board, center: Position) -> Result<Vec<Position>> {
    board.check(center)?;
    let size = board.size();
    let row = (0..size).map(|c| Position::new(center.row, c));
    let col = (0..size)
        .filter(|&r| r != center.row)
        .map(|r| Position::new(r, center.col));
    let cells: Vec<Position> = row.chain(col).collect();
    for pos in &cells {
        board.at_mut(pos.row, pos.col).is_matched = true;
    }
    Ok(cells)
}

/// Per column: survivors sink to the bottom keeping their order, fresh tiles fill the top.
/// Returns how many tiles were spawned.
pub fn apply_gravity(board: &mut Board, source: &mut TileSource) -> usize {
    let size = board.size();
    let mut spawned = 0;
    for col in 0..size {
        let survivors: Vec<_> = (0..size)
            .map(|row| *board.at(row, col))
            .filter(|t| !t.is_matched)
            .collect();
        let vacated = size - survivors.len();
        for (i, tile) in survivors.into_iter().enumerate() {
            board.put(vacated + i, col, tile);
        }
        for row in 0..vacated {
            let tile = source.spawn(row, col);
            board.put(row, col, tile);
        }
        spawned += vacated;
    }
    spawned
}
