use std::{mem, time::Duration};

use serde::{Deserialize, Serialize};

use crate::core::{
    glass::Glass,
    piece::{Piece, Rotation, Shift},
};

use super::{
    Command, GameSettings, GameStats, GravityClock, HighscoreStore, PieceGenerator, PieceSeed,
    SettingsError, Snapshot, SpeedSettings,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// A playable game: glass, next piece, score, speed and gravity.
///
/// The session owns every piece of mutable game state. It changes only
/// through [`Self::apply`] (player commands) and [`Self::advance`] (time).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use brickfall_engine::{Command, GameSettings, MemoryStore, Session};
///
/// let mut session = Session::new(GameSettings::default(), MemoryStore::default()).unwrap();
/// assert!(session.state().is_playing());
///
/// session.apply(Command::HardDrop);
/// assert_eq!(session.stats().completed_pieces(), 1);
///
/// session.apply(Command::Pause);
/// assert!(!session.advance(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone)]
pub struct Session<S> {
    settings: GameSettings,
    glass: Glass,
    generator: PieceGenerator,
    next: Piece,
    score: usize,
    highscore: usize,
    record_broken: bool,
    speed: i32,
    state: SessionState,
    clock: GravityClock,
    stats: GameStats,
    store: S,
}

impl<S> Session<S>
where
    S: HighscoreStore,
{
    /// Starts a game with a random piece sequence.
    pub fn new(settings: GameSettings, store: S) -> Result<Self, SettingsError> {
        Self::with_generator(settings, store, PieceGenerator::new())
    }

    /// Like [`Self::new`], but with a reproducible piece sequence.
    pub fn with_seed(
        settings: GameSettings,
        store: S,
        seed: PieceSeed,
    ) -> Result<Self, SettingsError> {
        Self::with_generator(settings, store, PieceGenerator::with_seed(seed))
    }

    fn with_generator(
        settings: GameSettings,
        mut store: S,
        mut generator: PieceGenerator,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let highscore = store.load().unwrap_or_else(|e| {
            log::warn!("failed to load high score: {e}");
            0
        });
        let speed = settings.speed.default;
        let next = generator.generate();
        let mut session = Self {
            settings,
            glass: Glass::new(),
            generator,
            next,
            score: 0,
            highscore,
            record_broken: false,
            speed,
            state: SessionState::Playing,
            clock: GravityClock::new(SpeedSettings::gravity_interval(speed)),
            stats: GameStats::new(),
            store,
        };
        log::info!(
            "new game (seed {}, high score {highscore})",
            session.generator.seed()
        );
        session.lock_and_spawn();
        Ok(session)
    }

    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[must_use]
    pub fn glass(&self) -> &Glass {
        &self.glass
    }

    #[must_use]
    pub fn next(&self) -> &Piece {
        &self.next
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Best score ever, this game included. Never below [`Self::score`].
    #[must_use]
    pub fn highscore(&self) -> usize {
        self.highscore
    }

    #[must_use]
    pub fn speed(&self) -> i32 {
        self.speed
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.generator.seed()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Time between two gravity ticks at the current speed.
    #[must_use]
    pub fn gravity_interval(&self) -> Duration {
        SpeedSettings::gravity_interval(self.speed)
    }

    /// Executes a player command and reports whether anything changed.
    ///
    /// Rejected moves and rotations leave the game untouched. While paused
    /// only pausing, restarting and speed changes are accepted; once the game
    /// is over only [`Command::Restart`] is.
    pub fn apply(&mut self, command: Command) -> bool {
        match self.state {
            SessionState::GameOver if command != Command::Restart => return false,
            SessionState::Paused if !command.works_while_paused() => return false,
            _ => {}
        }

        match command {
            Command::MoveLeft => self.glass.try_move(Shift::LEFT),
            Command::MoveRight => self.glass.try_move(Shift::RIGHT),
            Command::SoftDrop => self.glass.try_move(Shift::DOWN),
            Command::HardDrop => {
                self.hard_drop();
                true
            }
            Command::RotateCw => self.glass.try_rotate(Rotation::Clockwise),
            Command::RotateCcw => self.glass.try_rotate(Rotation::CounterClockwise),
            Command::SwapNext => self.swap_next(),
            Command::Pause => {
                self.toggle_pause();
                true
            }
            Command::Restart => {
                self.restart();
                true
            }
            Command::SpeedUp => self.change_speed(1),
            Command::SpeedDown => self.change_speed(-1),
        }
    }

    /// Lets `elapsed` time pass. Returns `true` when a gravity tick ran.
    ///
    /// A tick moves the falling piece down one row, or locks it and spawns
    /// the next one when it cannot move.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if !self.state.is_playing() || !self.clock.advance(elapsed) {
            return false;
        }
        if !self.glass.try_move(Shift::DOWN) {
            self.lock_and_spawn();
        }
        true
    }

    /// Builds the renderer's view of the game.
    #[must_use]
    pub fn snapshot(&self, show_shadow: bool) -> Snapshot {
        let shadow = self.glass.shadow().filter(|_| show_shadow);
        Snapshot {
            grid: self.glass.cells(),
            current: Snapshot::piece_cells(self.glass.current()),
            shadow: shadow.map(|piece| Snapshot::piece_cells(Some(&piece))),
            score: self.score,
            highscore: self.highscore,
            speed: self.speed,
            next: self.next,
            is_over: self.state.is_game_over(),
            is_paused: self.state.is_paused(),
            stats: self.stats.clone(),
        }
    }

    fn hard_drop(&mut self) {
        while self.glass.try_move(Shift::DOWN) {}
        self.lock_and_spawn();
    }

    /// Locks the falling piece (if any) and makes the next piece fall.
    fn lock_and_spawn(&mut self) {
        let piece = mem::replace(&mut self.next, self.generator.generate());
        let had_current = self.glass.current().is_some();
        let placement = self.glass.add(piece);
        if had_current {
            self.stats.complete_piece_drop(placement.cleared_rows());
        }
        self.add_score(placement.cleared_rows());

        if placement.is_blocked() {
            self.state = SessionState::GameOver;
            self.clock.suspend();
            log::info!(
                "game over: score {}, {} pieces",
                self.score,
                self.stats.completed_pieces()
            );
            return;
        }
        self.clock.rearm(self.gravity_interval());
    }

    fn add_score(&mut self, cleared_rows: usize) {
        if cleared_rows == 0 {
            return;
        }
        let old_tier = self.settings.speed.tier(self.score);
        self.score += cleared_rows;

        if self.score > self.highscore {
            self.highscore = self.score;
            if !self.record_broken {
                self.record_broken = true;
                log::info!("new high score");
            }
            if let Err(e) = self.store.save(self.highscore) {
                log::warn!("failed to save high score {}: {e}", self.highscore);
            }
        }

        if self.settings.speed.tier(self.score) > old_tier {
            self.change_speed(1);
        }
    }

    fn change_speed(&mut self, delta: i32) -> bool {
        let speed = self.settings.speed.changed(self.speed, delta);
        if speed == self.speed {
            return false;
        }
        self.speed = speed;
        self.clock.rearm(self.gravity_interval());
        log::debug!("speed {speed}, gravity every {:?}", self.gravity_interval());
        true
    }

    /// Swaps the falling piece and the next one, if the next piece fits where
    /// the falling one is.
    fn swap_next(&mut self) -> bool {
        let Some(previous) = self.glass.swap_current(self.next) else {
            return false;
        };
        self.next = previous.at(0, previous.left());
        true
    }

    fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Playing => {
                self.clock.suspend();
                SessionState::Paused
            }
            SessionState::Paused => {
                self.clock.resume();
                SessionState::Playing
            }
            SessionState::GameOver => SessionState::GameOver,
        };
    }

    fn restart(&mut self) {
        self.glass.reset();
        self.score = 0;
        self.record_broken = false;
        self.speed = self.settings.speed.default;
        self.stats = GameStats::new();
        self.next = self.generator.generate();
        self.state = SessionState::Playing;
        self.clock = GravityClock::new(self.gravity_interval());
        log::info!("restart (high score {})", self.highscore);
        self.lock_and_spawn();
    }
}

#[cfg(test)]
mod tests {
    use crate::{core::piece::PieceKind, engine::MemoryStore};

    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn seed() -> PieceSeed {
        "00112233445566778899aabbccddeeff".parse().unwrap()
    }

    fn session() -> Session<MemoryStore> {
        Session::with_seed(GameSettings::default(), MemoryStore::default(), seed()).unwrap()
    }

    /// Replaces the glass with `art` and drops `piece` in as the falling piece.
    fn set_glass(session: &mut Session<MemoryStore>, art: &str, piece: Piece) {
        session.glass = Glass::from_ascii(art);
        assert!(session.glass.add(piece).is_placed());
    }

    fn current(session: &Session<MemoryStore>) -> Piece {
        *session.glass().current().unwrap()
    }

    #[derive(Debug, derive_more::Display, derive_more::Error)]
    #[display("storage unavailable")]
    struct StorageUnavailable;

    struct BrokenStore;

    impl HighscoreStore for BrokenStore {
        type Error = StorageUnavailable;

        fn load(&mut self) -> Result<usize, Self::Error> {
            Err(StorageUnavailable)
        }

        fn save(&mut self, _highscore: usize) -> Result<(), Self::Error> {
            Err(StorageUnavailable)
        }
    }

    #[test]
    fn test_new_session() {
        let session =
            Session::with_seed(GameSettings::default(), MemoryStore::new(30), seed()).unwrap();
        assert!(session.state().is_playing());
        assert_eq!(session.score(), 0);
        assert_eq!(session.highscore(), 30);
        assert_eq!(session.speed(), 1);
        assert_eq!(session.seed(), seed());
        assert!(session.glass().check_current());
        assert_eq!(session.glass().current().unwrap().top(), 0);
        assert_eq!(session.stats().completed_pieces(), 0);
        assert_eq!(session.gravity_interval(), 818 * MS);
    }

    #[test]
    fn test_invalid_settings_fail() {
        let settings = GameSettings {
            speed: SpeedSettings {
                default: 0,
                ..SpeedSettings::default()
            },
            ..GameSettings::default()
        };
        let result = Session::new(settings, MemoryStore::default());
        assert_eq!(result.unwrap_err(), SettingsError::ZeroSpeed);
    }

    #[test]
    fn test_o_pieces_stack_without_clearing() {
        let mut session = session();
        set_glass(&mut session, "", Piece::new(PieceKind::O).at(0, 4));
        session.next = Piece::new(PieceKind::O).at(0, 4);

        assert!(session.apply(Command::HardDrop));
        let stable: Vec<_> = session.glass().stable_bricks().map(|b| (b.x, b.y)).collect();
        assert_eq!(stable, vec![(4, 18), (5, 18), (4, 19), (5, 19)]);
        assert_eq!(session.score(), 0);
        assert_eq!(current(&session), Piece::new(PieceKind::O).at(0, 4));

        assert!(session.apply(Command::HardDrop));
        assert!(session.glass().row(16).is_occupied(4));
        assert!(session.glass().row(17).is_occupied(5));
        assert_eq!(session.glass().stable_bricks().count(), 8);
        assert_eq!(session.score(), 0);
        assert_eq!(session.stats().completed_pieces(), 2);
    }

    #[test]
    fn test_clearing_rows_scores_and_saves_highscore() {
        let mut session = session();
        set_glass(
            &mut session,
            "
            IIIIIIII..
            IIIIIIII..
            ",
            Piece::new(PieceKind::O).at(0, 8),
        );

        assert!(session.apply(Command::HardDrop));
        assert_eq!(session.score(), 2);
        assert_eq!(session.highscore(), 2);
        assert_eq!(session.store().highscore(), 2);
        assert_eq!(session.stats().row_cleared_counter(), &[0, 0, 1, 0, 0]);
        assert_eq!(session.glass().stable_bricks().count(), 0);
    }

    #[test]
    fn test_highscore_never_decreases() {
        let mut session =
            Session::with_seed(GameSettings::default(), MemoryStore::new(100), seed()).unwrap();
        set_glass(&mut session, "IIIIIIII..", Piece::new(PieceKind::O).at(0, 8));

        assert!(session.apply(Command::HardDrop));
        assert_eq!(session.score(), 1);
        assert_eq!(session.highscore(), 100);
        assert_eq!(session.store().highscore(), 100);

        session.apply(Command::Restart);
        assert_eq!(session.score(), 0);
        assert_eq!(session.highscore(), 100);
    }

    #[test]
    fn test_crossing_score_step_speeds_up() {
        let mut session = session();
        session.score = 11;
        set_glass(&mut session, "IIIIIIII..", Piece::new(PieceKind::O).at(0, 8));

        assert!(session.apply(Command::HardDrop));
        assert_eq!(session.score(), 12);
        assert_eq!(session.speed(), 2);
        assert_eq!(session.gravity_interval(), 786 * MS);
        assert_eq!(session.clock.remaining(), 786 * MS);
    }

    #[test]
    fn test_gravity_moves_piece_down() {
        let mut session = session();
        let top = current(&session).top();

        assert!(!session.advance(817 * MS));
        assert_eq!(current(&session).top(), top);
        assert!(session.advance(MS));
        assert_eq!(current(&session).top(), top + 1);
    }

    #[test]
    fn test_gravity_locks_landed_piece() {
        let mut session = session();
        let o = Piece::new(PieceKind::O).at(18, 0);
        set_glass(&mut session, "", o);
        let next = session.next;

        assert!(session.advance(session.gravity_interval()));
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(current(&session), next);
        assert!(session.glass().row(19).is_occupied(1));
    }

    #[test]
    fn test_soft_drop_does_not_lock() {
        let mut session = session();
        set_glass(&mut session, "", Piece::new(PieceKind::O).at(18, 0));

        assert!(!session.apply(Command::SoftDrop));
        assert_eq!(session.stats().completed_pieces(), 0);
        assert_eq!(current(&session).top(), 18);
    }

    #[test]
    fn test_moves_and_rotations() {
        let mut session = session();
        let t = Piece::new(PieceKind::T).at(0, 0);
        set_glass(&mut session, "", t);

        assert!(!session.apply(Command::MoveLeft));
        assert!(session.apply(Command::MoveRight));
        assert!(session.apply(Command::RotateCw));
        assert_eq!(current(&session).state(), 1);
        assert!(session.apply(Command::RotateCcw));
        assert!(session.apply(Command::RotateCcw));
        assert_eq!(current(&session).state(), 3);
        assert_eq!(current(&session).left(), 1);
    }

    #[test]
    fn test_pause_suspends_gravity_and_input() {
        let mut session = session();
        let before = current(&session);

        assert!(session.apply(Command::Pause));
        assert!(session.state().is_paused());
        assert!(!session.advance(Duration::from_secs(60)));
        assert!(!session.apply(Command::MoveRight));
        assert!(!session.apply(Command::HardDrop));
        assert!(!session.apply(Command::SwapNext));
        assert_eq!(current(&session), before);
        assert!(session.snapshot(true).is_paused);

        assert!(session.apply(Command::Pause));
        assert!(session.state().is_playing());
        assert!(session.advance(Duration::ZERO));
        assert_eq!(current(&session).top(), before.top() + 1);
    }

    #[test]
    fn test_speed_commands() {
        let mut session = session();

        assert!(session.apply(Command::SpeedDown));
        assert_eq!(session.speed(), -1);
        assert_eq!(session.gravity_interval(), 900 * MS);
        assert_eq!(session.clock.remaining(), 900 * MS);

        assert!(session.apply(Command::SpeedUp));
        assert_eq!(session.speed(), 1);

        session.speed = 25;
        assert!(!session.apply(Command::SpeedUp));
        assert_eq!(session.speed(), 25);
    }

    #[test]
    fn test_speed_change_while_paused_keeps_clock_suspended() {
        let mut session = session();
        session.apply(Command::Pause);
        assert!(session.apply(Command::SpeedUp));
        assert_eq!(session.speed(), 2);
        assert!(!session.advance(Duration::from_secs(60)));
    }

    #[test]
    fn test_swap_next() {
        let mut session = session();
        let t = Piece::new(PieceKind::T).at(5, 2);
        set_glass(&mut session, "", t);
        session.next = Piece::new(PieceKind::O).at(0, 7);

        assert!(session.apply(Command::SwapNext));
        let swapped = current(&session);
        assert_eq!(swapped.kind(), PieceKind::O);
        assert_eq!((swapped.top(), swapped.left()), (5, 2));
        assert_eq!(*session.next(), t.at(0, 2));
    }

    #[test]
    fn test_swap_next_rejected_when_it_does_not_fit() {
        let mut session = session();
        let o = Piece::new(PieceKind::O).at(0, 8);
        set_glass(&mut session, "", o);
        let next = Piece::new(PieceKind::I);
        session.next = next;

        assert!(!session.apply(Command::SwapNext));
        assert_eq!(current(&session), o);
        assert_eq!(*session.next(), next);
    }

    #[test]
    fn test_top_out_ends_game() {
        let mut session = session();
        let art = "I.........\n".repeat(Glass::HEIGHT);
        let vertical = Piece::with_state(PieceKind::I, 1).unwrap().at(0, 9);
        set_glass(&mut session, &art, vertical);
        session.next = Piece::new(PieceKind::I).at(0, 0);

        assert!(session.apply(Command::HardDrop));
        assert!(session.state().is_game_over());
        assert_eq!(session.glass().current(), None);
        assert_eq!(session.stats().completed_pieces(), 1);

        let snapshot = session.snapshot(true);
        assert!(snapshot.is_over);
        assert!(snapshot.current.is_empty());
        assert_eq!(snapshot.shadow, None);

        for command in Command::ALL {
            if command != Command::Restart {
                assert!(!session.apply(command), "{command}");
            }
        }
        assert!(!session.advance(Duration::from_secs(60)));
        assert!(session.state().is_game_over());
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut session = session();
        let art = "I.........\n".repeat(Glass::HEIGHT);
        set_glass(&mut session, &art, Piece::with_state(PieceKind::I, 1).unwrap().at(0, 9));
        session.next = Piece::new(PieceKind::I).at(0, 0);
        session.speed = 5;
        session.apply(Command::HardDrop);
        assert!(session.state().is_game_over());

        assert!(session.apply(Command::Restart));
        assert!(session.state().is_playing());
        assert_eq!(session.score(), 0);
        assert_eq!(session.speed(), 1);
        assert_eq!(session.stats().completed_pieces(), 0);
        assert_eq!(session.glass().stable_bricks().count(), 0);
        assert!(session.glass().check_current());
        assert!(session.advance(session.gravity_interval()));
    }

    #[test]
    fn test_restart_while_playing() {
        let mut session = session();
        set_glass(&mut session, "IIIIIIII..", Piece::new(PieceKind::O).at(0, 8));
        session.apply(Command::HardDrop);
        assert_eq!(session.score(), 1);

        assert!(session.apply(Command::Restart));
        assert_eq!(session.score(), 0);
        assert_eq!(session.highscore(), 1);
        assert!(session.state().is_playing());
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = session();
        let mut b = session();
        for _ in 0..10 {
            a.apply(Command::HardDrop);
            b.apply(Command::HardDrop);
            assert_eq!(a.snapshot(true), b.snapshot(true));
        }
    }

    #[test]
    fn test_snapshot() {
        let mut session = session();
        set_glass(&mut session, "SS........", Piece::new(PieceKind::O).at(0, 4));

        let snapshot = session.snapshot(true);
        assert_eq!(snapshot.current.len(), 4);
        let shadow = snapshot.shadow.unwrap();
        assert!(shadow.iter().all(|brick| brick.y >= 18));
        assert_eq!(snapshot.grid[19][0].unwrap().kind, PieceKind::S);
        assert!(snapshot.grid[0][4].unwrap().active);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.speed, 1);
        assert_eq!(snapshot.next, *session.next());
        assert!(!snapshot.is_over);

        assert_eq!(session.snapshot(false).shadow, None);

        let json = serde_json::to_value(session.snapshot(false)).unwrap();
        assert_eq!(json["score"], 0);
        assert!(json["next"].is_string());
    }

    #[test]
    fn test_snapshot_shadow_follows_argument_only() {
        let settings = GameSettings {
            show_shadow: false,
            ..GameSettings::default()
        };
        let session = Session::with_seed(settings, MemoryStore::default(), seed()).unwrap();
        assert!(session.snapshot(true).shadow.is_some());
        assert!(session.snapshot(false).shadow.is_none());
    }

    #[test]
    fn test_broken_store_does_not_stop_game() {
        let mut session = Session::with_seed(GameSettings::default(), BrokenStore, seed()).unwrap();
        assert_eq!(session.highscore(), 0);

        session.glass = Glass::from_ascii("IIIIIIII..");
        assert!(session.glass.add(Piece::new(PieceKind::O).at(0, 8)).is_placed());
        assert!(session.apply(Command::HardDrop));
        assert_eq!(session.score(), 1);
        assert_eq!(session.highscore(), 1);
    }

    #[test]
    fn test_store_by_reference() {
        let mut store = MemoryStore::new(0);
        {
            let mut session =
                Session::with_seed(GameSettings::default(), &mut store, seed()).unwrap();
            session.glass = Glass::from_ascii("IIIIIIII..");
            assert!(session.glass.add(Piece::new(PieceKind::O).at(0, 8)).is_placed());
            session.apply(Command::HardDrop);
        }
        assert_eq!(store.highscore(), 1);
    }
}
