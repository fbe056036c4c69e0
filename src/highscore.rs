/// Best-wave persistence.
///
/// The score file holds a single decimal integer.  Reading is forgiving: a
/// missing or garbled file simply means "no high score yet".

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while persisting the high score.
#[derive(thiserror::Error, Debug)]
pub enum HighScoreError {
    /// The score file could not be written.
    #[error("could not write high score to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.tower_defence_best`, or the working directory without `HOME`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".tower_defence_best")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored best wave, or 0 when there is nothing usable on disk.
    pub fn load(&self) -> u32 {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents.trim().parse().unwrap_or_else(|_| {
                log::warn!("ignoring unreadable high score in {}", self.path.display());
                0
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => {
                log::warn!("could not read high score from {}: {}", self.path.display(), e);
                0
            }
        }
    }

    pub fn save(&self, best_wave: u32) -> Result<(), HighScoreError> {
        std::fs::write(&self.path, best_wave.to_string()).map_err(|source| HighScoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tower_defence_{}_{}", std::process::id(), name))
    }

    #[test]
    fn missing_file_means_no_high_score() {
        let store = HighScoreStore::new(scratch("missing"));
        let _ = std::fs::remove_file(store.path());
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn save_then_load() {
        let store = HighScoreStore::new(scratch("roundtrip"));
        store.save(7).unwrap();
        assert_eq!(store.load(), 7);
        std::fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn garbled_file_reads_as_zero() {
        let path = scratch("garbled");
        std::fs::write(&path, "not a number").unwrap();
        assert_eq!(HighScoreStore::new(&path).load(), 0);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let path = scratch("whitespace");
        std::fs::write(&path, "  12\n").unwrap();
        assert_eq!(HighScoreStore::new(&path).load(), 12);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let store = HighScoreStore::new(scratch("no_such_dir").join("best"));
        let err = store.save(3).unwrap_err();
        assert!(matches!(err, HighScoreError::Io { .. }));
        assert!(err.to_string().contains("could not write high score"));
    }
}
