//! Durable store of playback positions.
//!
//! Records are keyed by course id and canonical item path. Every `put`
//! rewrites the whole snapshot.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::snapshot;
use crate::domain::ProgressRecord;
use crate::library::paths::CanonicalPath;

/// course id -> canonical path -> record
pub type ProgressMap = BTreeMap<String, BTreeMap<CanonicalPath, ProgressRecord>>;

/// Errors that can occur with the progress store
#[derive(Debug, Error)]
pub enum ProgressStoreError {
    #[error("Progress snapshot is corrupt ({path}): {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Playback positions held in memory and mirrored to a JSON snapshot
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    records: ProgressMap,
}

impl ProgressStore {
    /// Create an empty store that will persist to `path`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: BTreeMap::new(),
        }
    }

    /// Load the store from disk. A missing file yields an empty store.
    pub fn load(path: PathBuf) -> Result<Self, ProgressStoreError> {
        let records = match snapshot::read_json(&path)? {
            None => {
                tracing::debug!("No progress snapshot at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Some(Ok(records)) => records,
            Some(Err(source)) => return Err(ProgressStoreError::Corrupt { path, source }),
        };

        Ok(Self { path, records })
    }

    /// Load the store, falling back to an empty one if the snapshot is unusable
    pub fn load_or_empty(path: PathBuf) -> Self {
        match Self::load(path.clone()) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Starting with empty playback progress: {}", e);
                Self::new(path)
            }
        }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the record of a file
    pub fn get(&self, course_id: &str, raw_path: &str) -> Option<ProgressRecord> {
        let key = CanonicalPath::new(raw_path);
        self.get_canonical(course_id, &key)
    }

    pub fn get_canonical(&self, course_id: &str, path: &CanonicalPath) -> Option<ProgressRecord> {
        self.records.get(course_id)?.get(path).copied()
    }

    /// Insert or replace the record of a file, then flush
    pub fn put(
        &mut self,
        course_id: &str,
        raw_path: &str,
        record: ProgressRecord,
    ) -> Result<CanonicalPath, ProgressStoreError> {
        let key = CanonicalPath::new(raw_path);
        self.put_canonical(course_id, key.clone(), record)?;
        Ok(key)
    }

    pub fn put_canonical(
        &mut self,
        course_id: &str,
        path: CanonicalPath,
        record: ProgressRecord,
    ) -> Result<(), ProgressStoreError> {
        let previous = self
            .records
            .entry(course_id.to_string())
            .or_default()
            .insert(path.clone(), record);

        if let Err(e) = self.flush() {
            if let Some(records) = self.records.get_mut(course_id) {
                match previous {
                    Some(previous) => {
                        records.insert(path, previous);
                    }
                    None => {
                        records.remove(&path);
                    }
                }
                if records.is_empty() {
                    self.records.remove(course_id);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Drop every record of a course. Returns how many were removed.
    pub fn remove_course(&mut self, course_id: &str) -> Result<usize, ProgressStoreError> {
        let Some(records) = self.records.remove(course_id) else {
            return Ok(0);
        };
        let removed = records.len();

        if let Err(e) = self.flush() {
            self.records.insert(course_id.to_string(), records);
            return Err(e);
        }
        Ok(removed)
    }

    /// Records of one course, ordered by path
    pub fn records(&self, course_id: &str) -> Vec<(&CanonicalPath, &ProgressRecord)> {
        self.records
            .get(course_id)
            .map(|m| m.iter().collect())
            .unwrap_or_default()
    }

    /// Write the whole store to its snapshot
    pub fn flush(&self) -> Result<(), ProgressStoreError> {
        snapshot::write_json(&self.path, &self.records)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (ProgressStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::new(temp.path().join("progress.json"));
        (store, temp)
    }

    #[test]
    fn test_failed_flush_keeps_previous_record() {
        let temp = TempDir::new().unwrap();
        let state = temp.path().join("state");
        let mut store = ProgressStore::new(state.join("progress.json"));
        store.put("rust", "/c/a.mp4", ProgressRecord::new(1, 10)).unwrap();

        // A regular file where the state directory was
        std::fs::remove_dir_all(&state).unwrap();
        std::fs::write(&state, b"").unwrap();

        assert!(store.put("rust", "/c/a.mp4", ProgressRecord::new(7, 10)).is_err());
        assert!(store.put("rust", "/c/b.mp4", ProgressRecord::new(7, 10)).is_err());
        assert!(store.put("go", "/c/x.mp4", ProgressRecord::new(7, 10)).is_err());
        assert!(store.remove_course("rust").is_err());

        assert_eq!(store.get("rust", "/c/a.mp4"), Some(ProgressRecord::new(1, 10)));
        assert_eq!(store.records("rust").len(), 1);
        assert!(store.records("go").is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let (mut store, _temp) = create_test_store();
        let record = ProgressRecord::new(12_000, 60_000);

        store.put("rust", "/courses/rust/1 Intro.mp4", record).unwrap();
        assert_eq!(store.get("rust", "/courses/rust/1 Intro.mp4"), Some(record));
        assert_eq!(store.get("go", "/courses/rust/1 Intro.mp4"), None);
    }

    #[test]
    fn test_equivalent_paths_share_one_record() {
        let (mut store, _temp) = create_test_store();

        store
            .put("rust", "/courses/rust/intro/1 Intro.mp4", ProgressRecord::new(1, 10))
            .unwrap();
        store
            .put("rust", "/courses\\rust\\intro\\.\\1 Intro.mp4", ProgressRecord::new(5, 10))
            .unwrap();

        assert_eq!(store.records("rust").len(), 1);
        assert_eq!(
            store.get("rust", "/courses/rust/x/../intro/1 Intro.mp4"),
            Some(ProgressRecord::new(5, 10))
        );
    }

    #[test]
    fn test_put_is_durable() {
        let (mut store, _temp) = create_test_store();
        store.put("rust", "/a/b.mp4", ProgressRecord::new(3, 9)).unwrap();

        let reloaded = ProgressStore::load(store.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.get("rust", "/a/b.mp4"), Some(ProgressRecord::new(3, 9)));
    }

    #[test]
    fn test_snapshot_shape() {
        let (mut store, _temp) = create_test_store();
        store.put("rust", "/a/b.mp4", ProgressRecord::new(3, 9)).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["rust"]["/a/b.mp4"]["position"], 3);
        assert_eq!(value["rust"]["/a/b.mp4"]["duration"], 9);
    }

    #[test]
    fn test_missing_and_corrupt_snapshots() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("progress.json");

        let store = ProgressStore::load(path.clone()).unwrap();
        assert!(store.records("rust").is_empty());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ProgressStore::load(path.clone()),
            Err(ProgressStoreError::Corrupt { .. })
        ));
        let store = ProgressStore::load_or_empty(path);
        assert!(store.records("rust").is_empty());
    }

    #[test]
    fn test_remove_course_purges_only_that_course() {
        let (mut store, _temp) = create_test_store();
        store.put("rust", "/a/1.mp4", ProgressRecord::new(1, 2)).unwrap();
        store.put("rust", "/a/2.mp4", ProgressRecord::new(1, 2)).unwrap();
        store.put("go", "/b/1.mp4", ProgressRecord::new(1, 2)).unwrap();

        assert_eq!(store.remove_course("rust").unwrap(), 2);
        assert_eq!(store.remove_course("rust").unwrap(), 0);
        assert!(store.get("go", "/b/1.mp4").is_some());
    }
}
