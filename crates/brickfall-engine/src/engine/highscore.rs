use std::convert::Infallible;

/// Storage for the single persisted high-score value.
///
/// The session loads the value once at construction and saves it every time
/// the score surpasses it. A failing store never stops the game: errors are
/// logged and play goes on with the in-memory value.
pub trait HighscoreStore {
    type Error: std::error::Error;

    /// Returns the stored high score, `0` when nothing was saved yet.
    fn load(&mut self) -> Result<usize, Self::Error>;

    fn save(&mut self, highscore: usize) -> Result<(), Self::Error>;
}

/// A [`HighscoreStore`] that lives as long as the process.
///
/// ```
/// use brickfall_engine::{HighscoreStore as _, MemoryStore};
///
/// let mut store = MemoryStore::new(10);
/// store.save(42).unwrap();
/// assert_eq!(store.load().unwrap(), 42);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    highscore: usize,
}

impl MemoryStore {
    #[must_use]
    pub const fn new(highscore: usize) -> Self {
        Self { highscore }
    }

    #[must_use]
    pub const fn highscore(&self) -> usize {
        self.highscore
    }
}

impl HighscoreStore for MemoryStore {
    type Error = Infallible;

    fn load(&mut self) -> Result<usize, Self::Error> {
        Ok(self.highscore)
    }

    fn save(&mut self, highscore: usize) -> Result<(), Self::Error> {
        self.highscore = highscore;
        Ok(())
    }
}

impl<T> HighscoreStore for &mut T
where
    T: HighscoreStore + ?Sized,
{
    type Error = T::Error;

    fn load(&mut self) -> Result<usize, Self::Error> {
        (**self).load()
    }

    fn save(&mut self, highscore: usize) -> Result<(), Self::Error> {
        (**self).save(highscore)
    }
}
