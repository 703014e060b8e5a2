//! Playfield, pieces and game rules of a falling-block puzzle.
//!
//! The [`core`] module is the collision and line-clear engine: a 10x20
//! [`Glass`] of bit rows and the seven [`Piece`] kinds with their rotation
//! masks. The [`engine`] module turns it into a game with [`Session`].

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
