use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use brickfall_engine::HighscoreStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of the high score entry in the file.
pub const HIGHSCORE_KEY: &str = "brickfall:highscore";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum HighscoreFileError {
    #[display("failed to access high score file {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("malformed high score file {}", path.display())]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    value: usize,
    updated_at: DateTime<Utc>,
}

/// High score kept in a small JSON key-value file.
///
/// Other keys found in the file are preserved on save. A missing file reads
/// as a high score of 0. A file that is not valid JSON is replaced on save;
/// any other read failure aborts the save and leaves the file alone.
#[derive(Debug, Clone)]
pub struct HighscoreFile {
    path: PathBuf,
}

impl HighscoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> HighscoreFileError {
        HighscoreFileError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, serde_json::Value>, HighscoreFileError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&text).map_err(|source| HighscoreFileError::Format {
            path: self.path.clone(),
            source,
        })
    }
}

impl HighscoreStore for HighscoreFile {
    type Error = HighscoreFileError;

    fn load(&mut self) -> Result<usize, Self::Error> {
        let mut entries = self.read_entries()?;
        let Some(value) = entries.remove(HIGHSCORE_KEY) else {
            return Ok(0);
        };
        let entry: Entry =
            serde_json::from_value(value).map_err(|source| HighscoreFileError::Format {
                path: self.path.clone(),
                source,
            })?;
        Ok(entry.value)
    }

    fn save(&mut self, highscore: usize) -> Result<(), Self::Error> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e @ HighscoreFileError::Format { .. }) => {
                log::warn!("{e}, overwriting it");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        let entry = Entry {
            value: highscore,
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(entry).map_err(|source| HighscoreFileError::Format {
            path: self.path.clone(),
            source,
        })?;
        entries.insert(HIGHSCORE_KEY.to_owned(), value);

        let text =
            serde_json::to_string_pretty(&entries).map_err(|source| HighscoreFileError::Format {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, text + "\n").map_err(|e| self.io_error(e))?;
        log::debug!("saved high score {highscore} to {}", self.path.display());
        Ok(())
    }
}
