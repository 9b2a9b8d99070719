//! Schedule files
//!
//! One JSON file per medicine, `{name}.json`, holding the payload exactly as
//! it was captured. A missing directory reads as empty.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_json::Value;
use thiserror::Error;

use super::descriptor::check_name;

/// Schedule file errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid schedule name: {0:?}")]
    InvalidName(String),
}

/// Directory of stored schedules
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    dir: PathBuf,
}

impl ScheduleStore {
    /// Store rooted at `dir`; nothing is touched until first use
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path of schedule `name`
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Names of stored schedules, sorted
    pub fn list(&self) -> Result<Vec<String>, PersistenceError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Parse one stored schedule
    pub fn load(&self, name: &str) -> Result<Value, PersistenceError> {
        let path = self.path(name);
        let text = fs::read_to_string(&path).map_err(|source| PersistenceError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| PersistenceError::Parse { path, source })
    }

    /// Parse every stored schedule
    ///
    /// Unreadable or malformed files are skipped and reported alongside the
    /// loaded `(path, value)` pairs.
    pub fn load_all(&self) -> (Vec<(String, Value)>, Vec<PersistenceError>) {
        let names = match self.list() {
            Ok(names) => names,
            Err(e) => return (Vec::new(), vec![e]),
        };

        let mut loaded = Vec::with_capacity(names.len());
        let mut errors = Vec::new();
        for name in names {
            match self.load(&name) {
                Ok(value) => loaded.push((self.path(&name).display().to_string(), value)),
                Err(e) => {
                    warn!("skipping schedule: {}", e);
                    errors.push(e);
                }
            }
        }
        debug!("loaded {} schedule(s) from {}", loaded.len(), self.dir.display());
        (loaded, errors)
    }

    /// Store a captured payload under the name it carries
    ///
    /// The text is written unchanged. Returns the schedule name.
    pub fn save_payload(&self, text: &str) -> Result<String, PersistenceError> {
        let value: Value = serde_json::from_str(text).map_err(|source| PersistenceError::Parse {
            path: self.dir.join("<payload>"),
            source,
        })?;
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| PersistenceError::InvalidName(String::new()))?;
        check_name(name).map_err(|_| PersistenceError::InvalidName(name.into()))?;

        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Write {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path(name);
        fs::write(&path, text).map_err(|source| PersistenceError::Write {
            path: path.clone(),
            source,
        })?;
        info!("saved schedule {}", path.display());
        Ok(name.to_string())
    }

    /// Delete schedule `name`
    pub fn remove(&self, name: &str) -> Result<(), PersistenceError> {
        let path = self.path(name);
        fs::remove_file(&path).map_err(|source| PersistenceError::Remove {
            path: path.clone(),
            source,
        })?;
        info!("removed schedule {}", path.display());
        Ok(())
    }

    /// Delete each of `names`
    ///
    /// A failed removal is logged and reported without stopping the rest.
    pub fn remove_all(&self, names: &[String]) -> (usize, Vec<PersistenceError>) {
        let mut removed = 0;
        let mut errors = Vec::new();
        for name in names {
            match self.remove(name) {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!("cannot remove schedule: {}", e);
                    errors.push(e);
                }
            }
        }
        (removed, errors)
    }

    /// Delete every stored schedule
    ///
    /// Returns how many were removed and the failures met on the way.
    pub fn clear(&self) -> (usize, Vec<PersistenceError>) {
        match self.list() {
            Ok(names) => self.remove_all(&names),
            Err(e) => (0, vec![e]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASPIRIN: &str = r#"{"name": "Aspirin", "dosage": "1 tablet", "slot": 0, "hour": "8"}"#;

    #[test]
    fn test_missing_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScheduleStore::new(tmp.path().join("nope"));
        assert!(store.list().unwrap().is_empty());
        let (loaded, errors) = store.load_all();
        assert!(loaded.is_empty() && errors.is_empty());
    }

    #[test]
    fn test_save_writes_text_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScheduleStore::new(tmp.path().join("schedules"));
        assert_eq!(store.save_payload(ASPIRIN).unwrap(), "Aspirin");
        let text = fs::read_to_string(store.path("Aspirin")).unwrap();
        assert_eq!(text, ASPIRIN);
        assert_eq!(store.list().unwrap(), vec!["Aspirin".to_string()]);
    }

    #[test]
    fn test_save_rejects_bad_payloads() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScheduleStore::new(tmp.path());
        assert!(matches!(store.save_payload("not json"), Err(PersistenceError::Parse { .. })));
        assert!(matches!(
            store.save_payload(r#"{"dosage": "1"}"#),
            Err(PersistenceError::InvalidName(_))
        ));
        assert!(matches!(
            store.save_payload(r#"{"name": "../x"}"#),
            Err(PersistenceError::InvalidName(_))
        ));
    }

    #[test]
    fn test_load_all_skips_broken_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScheduleStore::new(tmp.path());
        store.save_payload(ASPIRIN).unwrap();
        fs::write(tmp.path().join("Broken.json"), "{").unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let (loaded, errors) = store.load_all();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].0.ends_with("Aspirin.json"));
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], PersistenceError::Parse { .. }));
    }

    #[test]
    fn test_remove_and_clear() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScheduleStore::new(tmp.path());
        store.save_payload(ASPIRIN).unwrap();
        store
            .save_payload(r#"{"name": "Ibuprofen", "dosage": "1", "slot": 1, "hour": "9"}"#)
            .unwrap();

        store.remove("Aspirin").unwrap();
        assert_eq!(store.list().unwrap(), vec!["Ibuprofen".to_string()]);
        assert!(matches!(store.remove("Aspirin"), Err(PersistenceError::Remove { .. })));

        let (removed, errors) = store.clear();
        assert_eq!(removed, 1);
        assert!(errors.is_empty());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_remove_all_continues_past_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScheduleStore::new(tmp.path());
        store.save_payload(ASPIRIN).unwrap();
        store
            .save_payload(r#"{"name": "Ibuprofen", "dosage": "1", "slot": 1, "hour": "9"}"#)
            .unwrap();

        // "Paracetamol" was listed but vanished before removal
        let names = vec![
            "Aspirin".to_string(),
            "Paracetamol".to_string(),
            "Ibuprofen".to_string(),
        ];
        let (removed, errors) = store.remove_all(&names);
        assert_eq!(removed, 2);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], PersistenceError::Remove { .. }));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_clear_on_missing_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScheduleStore::new(tmp.path().join("nope"));
        let (removed, errors) = store.clear();
        assert_eq!(removed, 0);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_save_rejects_dot_names() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScheduleStore::new(tmp.path());
        for name in ["..", ".", "  ", "a\\\\b"] {
            let payload = serde_json::json!({ "name": name }).to_string();
            assert!(matches!(
                store.save_payload(&payload),
                Err(PersistenceError::InvalidName(_))
            ));
        }
    }
}
