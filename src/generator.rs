//! Initial board generation without pre-existing runs.
//!
//! Cells are filled row-major. Only the already-placed neighbours (left in the
//! row, above in the column) can complete a run, so only those are checked.
//! A cell that still completes a run after `generate_attempts` draws keeps its
//! last draw: the no-match guarantee is bounded effort, not absolute.

use crate::board::Board;
use crate::config::Rules;
use crate::error::Result;
use crate::source::TileSource;
use crate::tile::{Tile, TileKind};
use tracing::{debug, instrument};

#[instrument(skip_all, fields(size = rules.board_size))]
pub fn generate(rules: &Rules, source: &mut TileSource) -> Result<Board> {
    rules.validate()?;
    let size = rules.board_size;
    let min = rules.min_match_length;
    let max_draws = rules.generate_attempts.max(1);

    let mut rows: Vec<Vec<Tile>> = Vec::with_capacity(size);
    for r in 0..size {
        let mut row: Vec<Tile> = Vec::with_capacity(size);
        for c in 0..size {
            let mut kind = source.draw_kind();
            let mut draws = 1;
            while draws < max_draws && completes_run(&rows, &row, c, kind, min) {
                kind = source.draw_kind();
                draws += 1;
            }
            if draws == max_draws && completes_run(&rows, &row, c, kind, min) {
                debug!(row = r, col = c, %kind, "draw limit reached; accepting run");
            }
            row.push(source.spawn_kind(kind, r, c));
        }
        rows.push(row);
    }
    Ok(Board::from_rows(rows))
}

/// Would `kind` at (rows.len(), col) finish a run of `min` with the tiles to its left or above?
fn completes_run(above: &[Vec<Tile>], left: &[Tile], col: usize, kind: TileKind, min: usize) -> bool {
    let horizontal = 1 + left.iter().rev().take_while(|t| t.kind == kind).count();
    let vertical = 1 + above
        .iter()
        .rev()
        .take_while(|row| row[col].kind == kind)
        .count();
    horizontal >= min || vertical >= min
}
