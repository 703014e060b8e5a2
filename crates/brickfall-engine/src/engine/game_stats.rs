use serde::{Deserialize, Serialize};

/// Per-game statistics.
///
/// Score itself lives in the session; these counters describe how it was
/// earned.
///
/// ```
/// use brickfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(0);
/// stats.complete_piece_drop(2);
///
/// assert_eq!(stats.completed_pieces(), 2);
/// assert_eq!(stats.total_cleared_rows(), 2);
/// assert_eq!(stats.row_cleared_counter(), &[1, 0, 1, 0, 0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    completed_pieces: usize,
    total_cleared_rows: usize,
    row_cleared_counter: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            completed_pieces: 0,
            total_cleared_rows: 0,
            row_cleared_counter: [0; 5],
        }
    }

    /// Number of pieces locked into the glass.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_rows(&self) -> usize {
        self.total_cleared_rows
    }

    /// Lock events by number of rows they cleared, index 0 to 4.
    #[must_use]
    pub const fn row_cleared_counter(&self) -> &[usize; 5] {
        &self.row_cleared_counter
    }

    pub const fn complete_piece_drop(&mut self, cleared_rows: usize) {
        self.completed_pieces += 1;
        self.total_cleared_rows += cleared_rows;
        if cleared_rows < self.row_cleared_counter.len() {
            self.row_cleared_counter[cleared_rows] += 1;
        }
    }
}
