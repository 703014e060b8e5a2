use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::core::{
    glass::{Cell, Glass},
    piece::{Brick, Piece},
};

use super::GameStats;

/// Cells of one piece.
pub type PieceCells = ArrayVec<Brick, 4>;

/// Read-only picture of a session, pulled by renderers after each update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Locked cells and the falling piece, row 0 at the top.
    pub grid: [[Option<Cell>; Glass::WIDTH]; Glass::HEIGHT],
    pub current: PieceCells,
    /// Where the falling piece would land; absent when not requested.
    pub shadow: Option<PieceCells>,
    pub score: usize,
    pub highscore: usize,
    pub speed: i32,
    pub next: Piece,
    pub is_over: bool,
    pub is_paused: bool,
    pub stats: GameStats,
}

impl Snapshot {
    pub(crate) fn piece_cells(piece: Option<&Piece>) -> PieceCells {
        piece.into_iter().flat_map(Piece::bricks).collect()
    }
}
