use std::str::FromStr;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// A falling tetromino: a kind, a rotation state and the origin of its bounding box.
///
/// Pieces are plain values. The `rotated`/`moved` family proposes a candidate
/// without touching `self`, so the glass can validate it before the matching
/// `rotate`/`shift` commits the change.
///
/// Positions are signed because a proposed candidate may lie outside the
/// glass (e.g. one column left of column 0); only the glass decides legality.
///
/// # Example
///
/// ```
/// use brickfall_engine::{Piece, PieceKind, Rotation, Shift};
///
/// let piece = Piece::new(PieceKind::T).at(0, 3);
/// let candidate = piece.rotated(Rotation::Clockwise).moved(Shift::DOWN);
/// assert_eq!((candidate.width(), candidate.height()), (2, 3));
/// assert_eq!(candidate.top(), 1);
/// assert_eq!(piece.state(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    state: u8,
    top: i32,
    left: i32,
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#state@left,top" (e.g., "T#1@4,0")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.state,
            self.left,
            self.top
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let (kind_str, rest) = s.split_once('#').ok_or_else(|| {
            serde::de::Error::custom(format!("expected format 'kind#state@left,top', got '{s}'"))
        })?;
        let kind = kind_str.parse::<PieceKind>().map_err(serde::de::Error::custom)?;

        let (state_str, position_str) = rest.split_once('@').ok_or_else(|| {
            serde::de::Error::custom(format!("missing '@' in format 'kind#state@left,top', got '{s}'"))
        })?;
        let state = state_str.parse::<usize>().map_err(|e| {
            serde::de::Error::custom(format!("invalid rotation state: {state_str} ({e})"))
        })?;

        let (left_str, top_str) = position_str.split_once(',').ok_or_else(|| {
            serde::de::Error::custom(format!("missing ',' in format 'kind#state@left,top', got '{s}'"))
        })?;
        let left = left_str
            .parse::<i32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid left: {left_str} ({e})")))?;
        let top = top_str
            .parse::<i32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid top: {top_str} ({e})")))?;

        let piece = Piece::with_state(kind, state).map_err(serde::de::Error::custom)?;
        Ok(piece.at(top, left))
    }
}

impl Piece {
    /// Creates a piece in rotation state 0 with its origin at the top-left corner.
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            state: 0,
            top: 0,
            left: 0,
        }
    }

    /// Creates a piece in the given rotation state.
    ///
    /// A state outside the kind's rotation table is a caller bug, reported as
    /// [`InvalidRotationError`].
    pub fn with_state(kind: PieceKind, state: usize) -> Result<Self, InvalidRotationError> {
        let count = kind.rotation_count();
        let state = u8::try_from(state)
            .ok()
            .filter(|s| usize::from(*s) < count)
            .ok_or(InvalidRotationError { kind, state, count })?;
        Ok(Self {
            state,
            ..Self::new(kind)
        })
    }

    /// Creates a freshly spawned piece.
    ///
    /// Rotatable kinds get 0 to 3 random clockwise turns, then the piece is
    /// placed on row 0 at a uniformly random column in `0..=board_width - width`.
    pub fn spawn<R>(kind: PieceKind, board_width: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut piece = Self::new(kind);
        if kind.is_rotatable() {
            for _ in 0..rng.random_range(0..4) {
                piece.rotate(Rotation::Clockwise);
            }
        }
        let max_left = board_width.saturating_sub(piece.width());
        let left = rng.random_range(0..=max_left);
        piece.left = i32::try_from(left).unwrap();
        piece
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Returns the index into the kind's rotation table.
    #[must_use]
    pub fn state(&self) -> usize {
        usize::from(self.state)
    }

    #[must_use]
    pub const fn top(&self) -> i32 {
        self.top
    }

    #[must_use]
    pub const fn left(&self) -> i32 {
        self.left
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        self.kind.shapes()[self.state()]
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.shape().width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.shape().height()
    }

    /// Returns the same piece with its origin moved to `(top, left)`.
    #[must_use]
    pub const fn at(self, top: i32, left: i32) -> Self {
        Self { top, left, ..self }
    }

    /// Proposes the piece turned one step in `rotation`, leaving `self` untouched.
    ///
    /// The state wraps around the kind's rotation table; an O piece is returned
    /// unchanged.
    #[must_use]
    pub fn rotated(self, rotation: Rotation) -> Self {
        let count = self.kind.rotation_count();
        let state = match rotation {
            Rotation::Clockwise => (self.state() + 1) % count,
            Rotation::CounterClockwise => (self.state() + count - 1) % count,
        };
        Self {
            state: u8::try_from(state).unwrap(),
            ..self
        }
    }

    /// Commits one rotation step.
    pub fn rotate(&mut self, rotation: Rotation) {
        *self = self.rotated(rotation);
    }

    /// Proposes the piece displaced by `shift`.
    #[must_use]
    pub const fn moved(self, shift: Shift) -> Self {
        Self {
            top: self.top + shift.top,
            left: self.left + shift.left,
            ..self
        }
    }

    /// Displaces the piece by `shift` without any validation.
    pub fn shift(&mut self, shift: Shift) {
        *self = self.moved(shift);
    }

    /// Decodes the rotation mask into absolute cell coordinates.
    ///
    /// Cells come out row-major, starting from the most significant bit at
    /// `(left, top)`.
    pub fn bricks(&self) -> impl Iterator<Item = Brick> + '_ {
        self.shape().cells().map(move |(dx, dy)| Brick {
            x: self.left + i32::from(dx),
            y: self.top + i32::from(dy),
            kind: self.kind,
        })
    }
}

/// An occupied cell in absolute glass coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brick {
    pub x: i32,
    pub y: i32,
    pub kind: PieceKind,
}

/// Direction of a rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Rotation {
    #[default]
    Clockwise,
    CounterClockwise,
}

/// Displacement applied to a piece, in cells. Positive `top` is downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shift {
    pub top: i32,
    pub left: i32,
}

impl Shift {
    pub const DOWN: Self = Self { top: 1, left: 0 };
    pub const LEFT: Self = Self { top: 0, left: -1 };
    pub const RIGHT: Self = Self { top: 0, left: 1 };
}

/// Requested rotation state does not exist for the piece kind.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("rotation state {state} is out of range for {kind} piece ({count} states)")]
pub struct InvalidRotationError {
    kind: PieceKind,
    state: usize,
    count: usize,
}

/// Text does not name one of the seven piece kinds.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown piece kind '{input}', expected one of I, J, L, O, S, T, Z")]
pub struct ParsePieceKindError {
    input: String,
}

/// The seven tetromino kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display,
)]
#[repr(u8)]
pub enum PieceKind {
    I = 0,
    J = 1,
    L = 2,
    O = 3,
    S = 4,
    T = 5,
    Z = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl FromStr for PieceKind {
    type Err = ParsePieceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let kind = match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c.to_ascii_uppercase()),
            _ => None,
        };
        kind.ok_or_else(|| ParsePieceKindError {
            input: s.to_owned(),
        })
    }
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::J,
        Self::L,
        Self::O,
        Self::S,
        Self::T,
        Self::Z,
    ];

    /// Returns the precomputed rotation table, ordered clockwise.
    #[must_use]
    pub const fn shapes(self) -> &'static [Shape] {
        match self {
            Self::I => &I_SHAPES,
            Self::J => &J_SHAPES,
            Self::L => &L_SHAPES,
            Self::O => &O_SHAPES,
            Self::S => &S_SHAPES,
            Self::T => &T_SHAPES,
            Self::Z => &Z_SHAPES,
        }
    }

    #[must_use]
    pub const fn rotation_count(self) -> usize {
        self.shapes().len()
    }

    #[must_use]
    pub const fn is_rotatable(self) -> bool {
        self.rotation_count() > 1
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use brickfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::J => 'J',
            Self::L => 'L',
            Self::O => 'O',
            Self::S => 'S',
            Self::T => 'T',
            Self::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single uppercase character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Self::I),
            'J' => Some(Self::J),
            'L' => Some(Self::L),
            'O' => Some(Self::O),
            'S' => Some(Self::S),
            'T' => Some(Self::T),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }
}

/// One rotation state: a row-major bit mask plus the bounding box size.
///
/// The most significant of the `width * height` bits is the top-left cell;
/// bits then run left to right, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    bits: u16,
    width: u8,
    height: u8,
}

impl Shape {
    const fn new(bits: u16, width: u8, height: u8) -> Self {
        assert!(width as u32 * height as u32 <= u16::BITS);
        assert!(bits.count_ones() == 4);
        Self {
            bits,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.bits
    }

    #[must_use]
    pub const fn width(self) -> usize {
        self.width as usize
    }

    #[must_use]
    pub const fn height(self) -> usize {
        self.height as usize
    }

    /// Returns row `dy` of the shape, right-aligned (bit 0 is the rightmost column).
    #[must_use]
    pub const fn row_mask(self, dy: usize) -> u16 {
        let shift = (self.height() - 1 - dy) * self.width();
        (self.bits >> shift) & ((1 << self.width) - 1)
    }

    #[must_use]
    pub const fn is_occupied(self, dx: usize, dy: usize) -> bool {
        let bit = self.width() * self.height() - 1 - (dy * self.width() + dx);
        (self.bits >> bit) & 1 != 0
    }

    /// Iterates the occupied `(dx, dy)` offsets in row-major order.
    pub fn cells(self) -> impl Iterator<Item = (u8, u8)> {
        (0..self.height).flat_map(move |dy| {
            (0..self.width).filter_map(move |dx| {
                self.is_occupied(usize::from(dx), usize::from(dy))
                    .then_some((dx, dy))
            })
        })
    }
}

const I_SHAPES: [Shape; 2] = [Shape::new(0b1111, 4, 1), Shape::new(0b1111, 1, 4)];
const J_SHAPES: [Shape; 4] = [
    Shape::new(0b01_01_11, 2, 3),
    Shape::new(0b100_111, 3, 2),
    Shape::new(0b11_10_10, 2, 3),
    Shape::new(0b111_001, 3, 2),
];
const L_SHAPES: [Shape; 4] = [
    Shape::new(0b10_10_11, 2, 3),
    Shape::new(0b111_100, 3, 2),
    Shape::new(0b11_01_01, 2, 3),
    Shape::new(0b001_111, 3, 2),
];
const O_SHAPES: [Shape; 1] = [Shape::new(0b11_11, 2, 2)];
const S_SHAPES: [Shape; 2] = [Shape::new(0b011_110, 3, 2), Shape::new(0b10_11_01, 2, 3)];
const T_SHAPES: [Shape; 4] = [
    Shape::new(0b111_010, 3, 2),
    Shape::new(0b01_11_01, 2, 3),
    Shape::new(0b010_111, 3, 2),
    Shape::new(0b10_11_10, 2, 3),
];
const Z_SHAPES: [Shape; 2] = [Shape::new(0b110_011, 3, 2), Shape::new(0b01_11_10, 2, 3)];
