//! Persistent "onboarding complete" flag.
//!
//! Stored as `{ "onboarding_complete": bool }`. The file is read once when
//! the store is opened; after that the cached value answers every query and
//! `mark_complete` writes at most once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct OnboardingRecord {
    #[serde(default)]
    onboarding_complete: bool,
}

/// File-backed onboarding flag
#[derive(Debug)]
pub struct OnboardingStore {
    path: PathBuf,
    complete: bool,
}

impl OnboardingStore {
    /// Open the store at `path`.
    ///
    /// A missing file means onboarding has not been completed. A file that
    /// exists but cannot be read or parsed is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let complete = match fs::read_to_string(&path) {
            Ok(contents) => {
                let record: OnboardingRecord = serde_json::from_str(&contents)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
                record.onboarding_complete
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => return Err(err),
        };
        log::debug!("[Onboarding] {:?} complete={}", path, complete);
        Ok(Self { path, complete })
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Persist completion; no-op once complete
    pub fn mark_complete(&mut self) -> io::Result<()> {
        if self.complete {
            return Ok(());
        }
        let record = OnboardingRecord {
            onboarding_complete: true,
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;
        self.complete = true;
        log::info!("[Onboarding] Marked complete at {:?}", self.path);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_incomplete() {
        let dir = TempDir::new().unwrap();
        let store = OnboardingStore::load(dir.path().join("onboarding.json")).unwrap();
        assert!(!store.is_complete());
    }

    #[test]
    fn test_mark_complete_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("onboarding.json");

        let mut store = OnboardingStore::load(&path).unwrap();
        store.mark_complete().unwrap();
        assert!(store.is_complete());

        let reopened = OnboardingStore::load(&path).unwrap();
        assert!(reopened.is_complete());

        let contents = fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(json["onboarding_complete"], true);
    }

    #[test]
    fn test_mark_complete_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("onboarding.json");

        let mut store = OnboardingStore::load(&path).unwrap();
        store.mark_complete().unwrap();
        fs::remove_file(&path).unwrap();

        store.mark_complete().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_explicit_false_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("onboarding.json");
        fs::write(&path, r#"{"onboarding_complete": false}"#).unwrap();

        assert!(!OnboardingStore::load(&path).unwrap().is_complete());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("onboarding.json");
        fs::write(&path, "not json").unwrap();

        let err = OnboardingStore::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
