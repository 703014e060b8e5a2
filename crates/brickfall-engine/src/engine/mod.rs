//! Game rules on top of the [`crate::core`] playfield.
//!
//! - [`Session`] - a playable game: score, high score, speed, next piece
//! - [`Command`] - the player's command surface
//! - [`GravityClock`] - deterministic gravity timer, driven by elapsed time
//! - [`GameSettings`] / [`SpeedSettings`] - validated configuration
//! - [`PieceGenerator`] / [`PieceSeed`] - reproducible piece sequence
//! - [`HighscoreStore`] - persistence port for the high score
//! - [`Snapshot`] - what a renderer pulls after each update
//!
//! # Game Flow
//!
//! 1. [`Session::new`] loads the high score and spawns the first piece
//! 2. The front end feeds key presses through [`Session::apply`] and the
//!    passage of time through [`Session::advance`]
//! 3. A piece that cannot fall any further is locked, full rows are removed,
//!    and the next piece spawns
//! 4. The game is over when a new piece has no room; only a restart is
//!    accepted from then on

pub use self::{
    clock::*, command::*, game_stats::*, highscore::*, piece_generator::*, session::*,
    settings::*, snapshot::*,
};

mod clock;
mod command;
mod game_stats;
mod highscore;
mod piece_generator;
mod session;
mod settings;
mod snapshot;
