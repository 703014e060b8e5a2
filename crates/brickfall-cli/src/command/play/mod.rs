use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use brickfall_engine::{GameSettings, PieceSeed, Session};

use crate::{highscore_file::HighscoreFile, tui::Runtime, util};

use self::app::PlayApp;

mod app;
mod input;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Game settings file (JSON)
    #[clap(long)]
    settings: Option<PathBuf>,
    /// Starting speed, overriding the settings file
    #[clap(long, allow_negative_numbers = true)]
    pub(crate) speed: Option<i32>,
    /// Seed for a reproducible piece sequence (32 hex digits)
    #[clap(long)]
    pub(crate) seed: Option<PieceSeed>,
    /// Hide the landing shadow of the falling piece at start
    #[clap(long)]
    pub(crate) no_shadow: bool,
    /// File keeping the high score
    #[clap(long, default_value = "brickfall-highscore.json")]
    highscore_file: PathBuf,
    /// Write log messages to this file (filter with `RUST_LOG`)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            settings: None,
            speed: None,
            seed: None,
            no_shadow: false,
            highscore_file: PathBuf::from("brickfall-highscore.json"),
            log_file: None,
        }
    }
}

impl PlayArg {
    fn game_settings(&self) -> anyhow::Result<GameSettings> {
        let mut settings = match &self.settings {
            Some(path) => util::read_json_file(path)?,
            None => GameSettings::default(),
        };
        if let Some(speed) = self.speed {
            settings.speed.default = speed;
        }
        if self.no_shadow {
            settings.show_shadow = false;
        }
        settings.validate().context("Invalid game settings")?;
        Ok(settings)
    }
}

fn init_logger(log_file: Option<&Path>) -> anyhow::Result<()> {
    // The terminal belongs to the game screen, so logs only go to a file.
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("Failed to initialize logger")?;
    Ok(())
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    init_logger(arg.log_file.as_deref())?;
    let settings = arg.game_settings()?;
    let show_shadow = settings.show_shadow;
    let store = HighscoreFile::new(&arg.highscore_file);
    log::info!("high score file: {}", store.path().display());

    let session = match arg.seed {
        Some(seed) => Session::with_seed(settings, store, seed)?,
        None => Session::new(settings, store)?,
    };
    let mut app = PlayApp::new(session, show_shadow);
    Runtime::new().run(&mut app)?;

    let session = app.session();
    println!(
        "Score: {}  High score: {}  Seed: {}",
        session.score(),
        session.highscore(),
        session.seed()
    );
    Ok(())
}
