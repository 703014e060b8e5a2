use clap::{Parser, Subcommand};

use self::{play::PlayArg, show_pieces::ShowPiecesArg};

mod play;
mod show_pieces;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play the game in the terminal (default)
    Play(#[clap(flatten)] PlayArg),
    /// Print every piece in every rotation
    ShowPieces(#[clap(flatten)] ShowPiecesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::ShowPieces(arg) => show_pieces::run(&arg)?,
    }
    Ok(())
}
