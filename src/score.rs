//! High-score persistence seam. The engine records scores through this trait
//! and never learns where they live.

use std::fs;
use std::path::PathBuf;

use log::error;

pub trait ScoreStore {
    fn load(&self) -> usize;
    fn save(&mut self, score: usize);
}

/// Stores the high score as a single integer in a dot-file. I/O failures are
/// logged and degrade to a score of zero, never to an error the game sees.
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> FileScoreStore {
        FileScoreStore { path: path.into() }
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self) -> usize {
        match fs::read_to_string(&self.path).map(|s| s.trim().parse().unwrap_or(0)) {
            Ok(score) => score,
            Err(e) => {
                error!("Error loading high score: {}", e);
                0
            }
        }
    }

    fn save(&mut self, score: usize) {
        if let Err(e) = fs::write(&self.path, score.to_string()) {
            error!("Error saving high score: {}", e);
        }
    }
}

/// In-memory store for tests and score-less drivers.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    pub high_score: usize,
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> usize {
        self.high_score
    }

    fn save(&mut self, score: usize) {
        self.high_score = score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryScoreStore::default();
        assert_eq!(store.load(), 0);

        store.save(12);
        assert_eq!(store.load(), 12);
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = std::env::temp_dir().join(format!(".sneksim_test_hs_{}", std::process::id()));
        let mut store = FileScoreStore::new(&path);

        store.save(42);
        assert_eq!(store.load(), 42);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_defaults_to_zero() {
        let store = FileScoreStore::new("/nonexistent/sneksim/high_score");
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn test_file_store_ignores_garbage() {
        let path = std::env::temp_dir().join(format!(".sneksim_test_junk_{}", std::process::id()));
        fs::write(&path, "not a number").unwrap();

        let store = FileScoreStore::new(&path);
        assert_eq!(store.load(), 0);

        let _ = fs::remove_file(&path);
    }
}
