use serde::{Deserialize, Serialize};

use super::piece::{Brick, Piece, PieceKind, Rotation, Shift};

const WIDTH: usize = 10;
const HEIGHT: usize = 20;

// Column 0 is the most significant of the WIDTH bits.
const FULL_ROW_MASK: u16 = (1 << WIDTH) - 1;

/// One row of locked cells.
///
/// Occupancy is a `WIDTH`-bit mask where column `x` is bit `WIDTH - x - 1`,
/// alongside the kind of the piece each cell came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StableRow {
    bits: u16,
    kinds: [Option<PieceKind>; WIDTH],
}

impl StableRow {
    pub const EMPTY: Self = Self {
        bits: 0,
        kinds: [None; WIDTH],
    };

    #[inline]
    const fn column_bit(x: usize) -> u16 {
        1 << (WIDTH - x - 1)
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.bits
    }

    #[inline]
    #[must_use]
    pub const fn is_full(self) -> bool {
        self.bits == FULL_ROW_MASK
    }

    #[inline]
    #[must_use]
    pub const fn is_occupied(self, x: usize) -> bool {
        self.bits & Self::column_bit(x) != 0
    }

    #[must_use]
    pub const fn kind_at(self, x: usize) -> Option<PieceKind> {
        self.kinds[x]
    }

    #[inline]
    fn is_any_occupied(self, mask: u16) -> bool {
        self.bits & mask != 0
    }

    #[inline]
    fn occupy(&mut self, x: usize, kind: PieceKind) {
        self.bits |= Self::column_bit(x);
        self.kinds[x] = Some(kind);
    }
}

/// A cell as seen by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub kind: PieceKind,
    /// `true` when the cell belongs to the falling piece.
    pub active: bool,
}

/// Result of handing a new piece to the glass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Placement {
    /// The new piece is falling.
    Placed { cleared_rows: usize },
    /// No room for the new piece: the game is over.
    Blocked { cleared_rows: usize },
}

impl Placement {
    /// Rows removed when the previous piece was locked.
    #[must_use]
    pub const fn cleared_rows(self) -> usize {
        match self {
            Self::Placed { cleared_rows } | Self::Blocked { cleared_rows } => cleared_rows,
        }
    }
}

/// The playfield: locked cells plus at most one falling piece.
///
/// Rows are numbered from the top (row 0) to the bottom (row `HEIGHT - 1`).
/// Every mutation that involves the falling piece is validated with
/// [`Glass::check`] first, so the falling piece never overlaps a locked cell
/// and never leaves the glass.
///
/// # Example
///
/// ```
/// use brickfall_engine::{Glass, Piece, PieceKind, Shift};
///
/// let mut glass = Glass::new();
/// assert!(glass.add(Piece::new(PieceKind::O).at(0, 4)).is_placed());
/// assert_eq!(glass.lowest_row(), Some(18));
///
/// while glass.try_move(Shift::DOWN) {}
/// assert_eq!(glass.store(), Some(0));
/// assert!(glass.row(19).is_occupied(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glass {
    rows: [StableRow; HEIGHT],
    current: Option<Piece>,
}

impl Default for Glass {
    fn default() -> Self {
        Self::new()
    }
}

impl Glass {
    pub const WIDTH: usize = WIDTH;
    pub const HEIGHT: usize = HEIGHT;
    pub const FULL_ROW_MASK: u16 = FULL_ROW_MASK;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: [StableRow::EMPTY; HEIGHT],
            current: None,
        }
    }

    /// Returns the falling piece, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn row(&self, y: usize) -> StableRow {
        self.rows[y]
    }

    /// Returns the occupancy bit mask of every row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = u16> + '_ {
        self.rows.iter().map(|row| row.bits)
    }

    /// Iterates the locked cells.
    pub fn stable_bricks(&self) -> impl Iterator<Item = Brick> + '_ {
        self.rows.iter().zip(0..).flat_map(|(row, y)| {
            row.kinds
                .iter()
                .copied()
                .zip(0..)
                .filter_map(move |(kind, x)| kind.map(|kind| Brick { x, y, kind }))
        })
    }

    /// Tests whether `piece` fits: inside the glass and clear of locked cells.
    ///
    /// This is a pure predicate.
    #[must_use]
    pub fn check(&self, piece: &Piece) -> bool {
        let (Ok(left), Ok(top)) = (usize::try_from(piece.left()), usize::try_from(piece.top()))
        else {
            return false;
        };
        let shape = piece.shape();
        if left + shape.width() > WIDTH || top + shape.height() > HEIGHT {
            return false;
        }

        let offset = WIDTH - shape.width() - left;
        (0..shape.height())
            .all(|dy| !self.rows[top + dy].is_any_occupied(shape.row_mask(dy) << offset))
    }

    /// Like [`Self::check`] for the falling piece; `false` when there is none.
    #[must_use]
    pub fn check_current(&self) -> bool {
        self.current.is_some_and(|piece| self.check(&piece))
    }

    /// Moves the falling piece by `shift` if the destination is legal.
    pub fn try_move(&mut self, shift: Shift) -> bool {
        let Some(candidate) = self.current.map(|piece| piece.moved(shift)) else {
            return false;
        };
        if !self.check(&candidate) {
            return false;
        }
        if let Some(current) = &mut self.current {
            current.shift(shift);
        }
        true
    }

    /// Rotates the falling piece one step if the rotated shape fits in place.
    ///
    /// There are no wall kicks: a rotation that collides or leaves the glass
    /// is rejected outright.
    pub fn try_rotate(&mut self, rotation: Rotation) -> bool {
        let Some(candidate) = self.current.map(|piece| piece.rotated(rotation)) else {
            return false;
        };
        if !self.check(&candidate) {
            return false;
        }
        if let Some(current) = &mut self.current {
            current.rotate(rotation);
        }
        true
    }

    /// Returns the row the falling piece would land on if hard-dropped.
    #[must_use]
    pub fn lowest_row(&self) -> Option<i32> {
        self.shadow().map(|piece| piece.top())
    }

    /// Returns the falling piece moved down as far as it can go.
    #[must_use]
    pub fn shadow(&self) -> Option<Piece> {
        let mut landed = self.current?;
        while self.check(&landed.moved(Shift::DOWN)) {
            landed.shift(Shift::DOWN);
        }
        Some(landed)
    }

    /// Locks the previous piece, then tries to make `piece` the falling one.
    ///
    /// The returned [`Placement`] carries the number of rows cleared by the
    /// lock; [`Placement::Blocked`] means `piece` did not fit and was not
    /// installed.
    pub fn add(&mut self, piece: Piece) -> Placement {
        let cleared_rows = self.store().unwrap_or(0);
        if !self.check(&piece) {
            return Placement::Blocked { cleared_rows };
        }
        self.current = Some(piece);
        Placement::Placed { cleared_rows }
    }

    /// Turns the falling piece into locked cells and removes full rows.
    ///
    /// All full rows are found once on the post-lock glass and removed
    /// together; every surviving row drops by the number of removed rows
    /// below it. Returns `None` when there was no falling piece.
    pub fn store(&mut self) -> Option<usize> {
        let piece = self.current.take()?;
        for brick in piece.bricks() {
            if let (Ok(x), Ok(y)) = (usize::try_from(brick.x), usize::try_from(brick.y)) {
                self.rows[y].occupy(x, brick.kind);
            }
        }

        let full_rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_full())
            .fold(0_u32, |mask, (y, _)| mask | (1 << y));
        let cleared = self.rows.iter().filter(|row| row.is_full()).count();

        let mut drop = 0;
        for y in (0..HEIGHT).rev() {
            if full_rows & (1 << y) != 0 {
                drop += 1;
                continue;
            }
            if drop > 0 {
                self.rows[y + drop] = self.rows[y];
            }
        }
        self.rows[..drop].fill(StableRow::EMPTY);

        log::debug!("locked {} piece, cleared {cleared} rows", piece.kind());
        Some(cleared)
    }

    /// Puts `piece` in place of the falling piece, keeping the current position.
    ///
    /// Returns the replaced piece, or `None` (changing nothing) when there is
    /// no falling piece or `piece` would not fit there.
    pub fn swap_current(&mut self, piece: Piece) -> Option<Piece> {
        let current = self.current?;
        let candidate = piece.at(current.top(), current.left());
        if !self.check(&candidate) {
            return None;
        }
        self.current = Some(candidate);
        Some(current)
    }

    /// Empties the glass. Dimensions are fixed and stay the same.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Returns the full grid with the falling piece drawn in.
    #[must_use]
    pub fn cells(&self) -> [[Option<Cell>; WIDTH]; HEIGHT] {
        let mut grid = [[None; WIDTH]; HEIGHT];
        for (grid_row, row) in grid.iter_mut().zip(&self.rows) {
            for (cell, kind) in grid_row.iter_mut().zip(row.kinds) {
                *cell = kind.map(|kind| Cell {
                    kind,
                    active: false,
                });
            }
        }
        if let Some(piece) = &self.current {
            for brick in piece.bricks() {
                if let (Ok(x), Ok(y)) = (usize::try_from(brick.x), usize::try_from(brick.y)) {
                    grid[y][x] = Some(Cell {
                        kind: brick.kind,
                        active: true,
                    });
                }
            }
        }
        grid
    }

    /// Creates a `Glass` from ASCII art for testing.
    ///
    /// A piece letter (`I`, `J`, `L`, `O`, `S`, `T`, `Z`) is a locked cell of
    /// that kind, `.` is empty. Every line must be 10 cells wide. Lines are
    /// bottom-aligned: the last line is row 19.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut glass = Self::new();
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(lines.len() <= HEIGHT, "at most {HEIGHT} rows, got {}", lines.len());

        let first_row = HEIGHT - lines.len();
        for (y, line) in (first_row..).zip(&lines) {
            let chars: Vec<char> = line.chars().collect();
            assert_eq!(
                chars.len(),
                WIDTH,
                "Each row must have exactly {WIDTH} cells, got {} at row {y}",
                chars.len(),
            );
            for (x, ch) in chars.into_iter().enumerate() {
                if ch == '.' {
                    continue;
                }
                let kind = PieceKind::from_char(ch)
                    .unwrap_or_else(|| panic!("invalid cell '{ch}' at ({x}, {y})"));
                glass.rows[y].occupy(x, kind);
            }
        }
        glass
    }
}
