use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{glass::Glass, piece::Piece};

/// Seed for deterministic piece generation.
///
/// Two generators built from the same seed deal the same pieces, with the
/// same initial rotations and columns. The textual form is 32 hex digits.
///
/// # Example
///
/// ```
/// use brickfall_engine::{PieceGenerator, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut a = PieceGenerator::with_seed(seed);
/// let mut b = PieceGenerator::with_seed(seed);
/// assert_eq!(a.generate(), b.generate());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: expected 32 hex digits")]
pub struct ParsePieceSeedError {
    input: String,
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParsePieceSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(error());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| error())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// Deals new pieces: uniform kind, random initial rotation and column.
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    seed: PieceSeed,
    rng: Pcg32,
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceGenerator {
    /// Creates a generator with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            seed,
            rng: Pcg32::from_seed(seed.0),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> PieceSeed {
        self.seed
    }

    /// Returns a new piece at the top of the glass, in a legal column.
    pub fn generate(&mut self) -> Piece {
        let kind = self.rng.random();
        Piece::spawn(kind, Glass::WIDTH, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::piece::PieceKind;

    use super::*;

    fn seed_from_bytes(bytes: [u8; 16]) -> PieceSeed {
        PieceSeed(bytes)
    }

    #[test]
    fn test_seed_format() {
        let seed = seed_from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
        assert_eq!(
            serde_json::to_string(&seed).unwrap(),
            "\"0123456789abcdeffedcba9876543210\""
        );
        assert_eq!(seed_from_bytes([0; 16]).to_string(), "0".repeat(32));
    }

    #[test]
    fn test_seed_parse() {
        let seed: PieceSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
        assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");

        let from_json: PieceSeed =
            serde_json::from_str("\"0123456789abcdeffedcba9876543210\"").unwrap();
        assert_eq!(from_json, seed);
    }

    #[test]
    fn test_seed_parse_errors() {
        for input in [
            "",
            "0123456789abcdef0123456789abcde",
            "0123456789abcdef0123456789abcdef0",
            "ghijklmnopqrstuvwxyzghijklmnopqr",
            "+123456789abcdef0123456789abcdef",
        ] {
            let err = input.parse::<PieceSeed>().unwrap_err();
            assert!(err.to_string().contains("invalid hex seed"), "{input}");
        }
        assert!(serde_json::from_str::<PieceSeed>("\"xyz\"").is_err());
    }

    #[test]
    fn test_same_seed_same_pieces() {
        let seed: PieceSeed = rand::rng().random();
        let mut a = PieceGenerator::with_seed(seed);
        let mut b = PieceGenerator::with_seed(seed);
        assert_eq!(a.seed(), seed);
        for _ in 0..50 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn test_generated_pieces_fit() {
        let mut generator = PieceGenerator::with_seed(seed_from_bytes([7; 16]));
        let glass = Glass::new();
        let mut seen = [false; PieceKind::LEN];
        for _ in 0..500 {
            let piece = generator.generate();
            assert_eq!(piece.top(), 0);
            assert!(glass.check(&piece), "{piece:?}");
            seen[piece.kind() as usize] = true;
        }
        assert!(seen.iter().all(|seen| *seen));
    }
}
