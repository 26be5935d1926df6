//! Persistence of finished-game times.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Errors raised by score stores.
#[derive(Debug, thiserror::Error)]
pub enum ScoreStoreError {
    #[error("score file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("score file {path} is not valid JSON: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A team's total completion time across all rounds of a won game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub team_name: String,
    pub total_time_millis: u64,
}

/// Storage for completion times. Every operation may fail; callers decide how
/// to degrade.
pub trait ScoreStore {
    fn save(&mut self, team_name: &str, total_time_millis: u64) -> Result<(), ScoreStoreError>;

    /// Returns at most `limit` entries, fastest first.
    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, ScoreStoreError>;

    fn name_exists(&self, team_name: &str) -> Result<bool, ScoreStoreError>;
}

/// Orders entries fastest first. The sort is stable, so equal times keep
/// their insertion order.
fn ranked(entries: &[ScoreEntry], limit: usize) -> Vec<ScoreEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| e.total_time_millis);
    sorted.truncate(limit);
    sorted
}

/// Score store kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScoreStore {
    entries: Vec<ScoreEntry>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn save(&mut self, team_name: &str, total_time_millis: u64) -> Result<(), ScoreStoreError> {
        self.entries.push(ScoreEntry {
            team_name: team_name.to_string(),
            total_time_millis,
        });
        Ok(())
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, ScoreStoreError> {
        Ok(ranked(&self.entries, limit))
    }

    fn name_exists(&self, team_name: &str) -> Result<bool, ScoreStoreError> {
        Ok(self.entries.iter().any(|e| e.team_name == team_name))
    }
}

/// Score store backed by a JSON array on disk. The file is read on every
/// query and replaced atomically on every save; a missing file is an empty
/// board. A file that no longer parses is moved aside to `<name>.corrupt` by
/// the next save, which then starts a fresh board.
#[derive(Debug, Clone)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileScoreStore { path: path.into() }
    }

    fn load(&self) -> Result<Vec<ScoreEntry>, ScoreStoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Score file missing, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(ScoreStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| ScoreStoreError::Format {
            path: self.path.clone(),
            source,
        })
    }

    fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> ScoreStoreError {
        ScoreStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Writes `entries` to a temporary file next to the board and renames it
    /// into place, so readers see either the old or the new board.
    fn replace(&self, entries: &[ScoreEntry]) -> Result<(), ScoreStoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;
        serde_json::to_writer_pretty(&mut file, entries).map_err(|source| {
            ScoreStoreError::Format {
                path: self.path.clone(),
                source,
            }
        })?;
        file.flush().map_err(|source| self.io_error(source))?;
        file.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn save(&mut self, team_name: &str, total_time_millis: u64) -> Result<(), ScoreStoreError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(ScoreStoreError::Format { source, .. }) => {
                let backup = self.corrupt_path();
                warn!(
                    error = %source,
                    backup = %backup.display(),
                    "Score file unreadable, moving it aside"
                );
                fs::rename(&self.path, &backup).map_err(|source| self.io_error(source))?;
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        entries.push(ScoreEntry {
            team_name: team_name.to_string(),
            total_time_millis,
        });
        self.replace(&entries)?;
        info!(team = team_name, total_time_millis, "Score saved");
        Ok(())
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, ScoreStoreError> {
        Ok(ranked(&self.load()?, limit))
    }

    fn name_exists(&self, team_name: &str) -> Result<bool, ScoreStoreError> {
        Ok(self.load()?.iter().any(|e| e.team_name == team_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_ranks_fastest_first() {
        let mut store = InMemoryScoreStore::new();
        store.save("slow", 90_000).unwrap();
        store.save("fast", 30_000).unwrap();
        store.save("tied", 90_000).unwrap();

        let top = store.top_scores(10).unwrap();
        let names: Vec<_> = top.iter().map(|e| e.team_name.as_str()).collect();
        assert_eq!(names, ["fast", "slow", "tied"]);
        assert_eq!(store.top_scores(1).unwrap().len(), 1);
        assert!(store.name_exists("fast").unwrap());
        assert!(!store.name_exists("nobody").unwrap());
    }

    #[test]
    fn json_store_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut store = JsonFileScoreStore::new(&path);
        assert!(store.top_scores(5).unwrap().is_empty());
        assert!(!store.name_exists("owls").unwrap());

        store.save("owls", 42_000).unwrap();
        store.save("cats", 41_000).unwrap();

        let reopened = JsonFileScoreStore::new(&path);
        assert_eq!(
            reopened.top_scores(5).unwrap(),
            vec![
                ScoreEntry {
                    team_name: "cats".into(),
                    total_time_millis: 41_000
                },
                ScoreEntry {
                    team_name: "owls".into(),
                    total_time_millis: 42_000
                },
            ]
        );
        assert!(reopened.name_exists("owls").unwrap());
    }

    #[test]
    fn json_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileScoreStore::new(&path);
        assert!(matches!(
            store.top_scores(5),
            Err(ScoreStoreError::Format { .. })
        ));
    }

    #[test]
    fn save_recovers_from_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let truncated = "[\n  {\n    \"team_name\": \"ow";
        fs::write(&path, truncated).unwrap();

        let mut store = JsonFileScoreStore::new(&path);
        store.save("cats", 1_000).unwrap();
        store.save("owls", 2_000).unwrap();

        let names: Vec<_> = store
            .top_scores(5)
            .unwrap()
            .into_iter()
            .map(|e| e.team_name)
            .collect();
        assert_eq!(names, ["cats", "owls"]);
        let backup = dir.path().join("scores.json.corrupt");
        assert_eq!(fs::read_to_string(backup).unwrap(), truncated);
    }

    #[test]
    fn save_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let mut store = JsonFileScoreStore::new(&path);
        store.save("owls", 5_000).unwrap();
        store.save("cats", 6_000).unwrap();

        let files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, ["scores.json"]);
    }
}
