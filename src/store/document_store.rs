use anyhow::{Context, Result};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::config::settings::StoreSettings;
use crate::domain::Document;
use crate::errors::{store_context, OpsError};

/// Single JSON document on disk with a one-generation backup
pub struct DataStore {
    data_path: PathBuf,
    backup_path: PathBuf,
    write_lock: Mutex<()>,
}

impl DataStore {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(data_path: P, backup_path: Q) -> Self {
        Self {
            data_path: data_path.as_ref().to_path_buf(),
            backup_path: backup_path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self::new(&settings.data_path, &settings.backup_path)
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Load the document; a missing or corrupt file yields a fresh one
    pub fn load(&self) -> Document {
        match self.read_document() {
            Ok(Some(document)) => document,
            Ok(None) => Document::new(),
            Err(e) => {
                error!("Error loading data store, starting from an empty document: {:#}", e);
                Document::new()
            }
        }
    }

    /// Persist the document, copying the current file to the backup path first
    pub fn save(&self, document: &Document) -> Result<(), OpsError> {
        self.write_document(document).map_err(|e| {
            error!("Error saving data store: {:#}", e);
            OpsError::write_failed(e)
        })
    }

    /// Serialised load → mutate → save; nothing is written when `apply` fails
    pub fn update<T, F>(&self, apply: F) -> Result<T, OpsError>
    where
        F: FnOnce(&mut Document) -> Result<T, OpsError>,
    {
        let _guard = self.lock()?;

        let mut document = self.load();
        let value = apply(&mut document)?;
        self.save(&document)?;
        Ok(value)
    }

    /// Replace everything with an empty document; the old one survives as the backup
    pub fn reset(&self) -> Result<(), OpsError> {
        let _guard = self.lock()?;

        self.save(&Document::new())?;
        info!("Data store reset: {}", self.data_path.display());
        Ok(())
    }

    // --- Helper Methods ---

    fn lock(&self) -> Result<MutexGuard<'_, ()>, OpsError> {
        self.write_lock
            .lock()
            .map_err(|_| OpsError::StoreUnavailable("a previous writer panicked mid-update".to_string()))
    }

    fn read_document(&self) -> Result<Option<Document>> {
        if !self.data_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.data_path)
            .with_context(|| store_context("read", &self.data_path))?;
        let document = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                self.data_path,
                json.chars().take(200).collect::<String>()
            )
        })?;
        Ok(Some(document))
    }

    fn write_document(&self, document: &Document) -> Result<()> {
        if self.data_path.exists() {
            fs::copy(&self.data_path, &self.backup_path)
                .with_context(|| store_context("back up", &self.backup_path))?;
        }

        let json = serde_json::to_string_pretty(document).context("Failed to serialize document")?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, json).with_context(|| store_context("write", &temp_path))?;
        fs::rename(&temp_path, &self.data_path)
            .with_context(|| store_context("replace", &self.data_path))?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .data_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.data_path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Day, Referee};
    use chrono::NaiveDate;

    fn store_in(dir: &tempfile::TempDir) -> DataStore {
        DataStore::new(dir.path().join("referee_data.json"), dir.path().join("backup_referee_data.json"))
    }

    fn referee(name: &str) -> Referee {
        Referee {
            referee_id: "BFL-001".to_string(),
            name: name.to_string(),
            strikes: 0,
            matches_completed: 0,
            category: Category::C,
            joined_at: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            clubs: vec![],
            availability: vec![Day::Sunday],
            suspended: false,
            ratings: vec![],
            loa_until: None,
            current_match: None,
        }
    }

    #[test]
    fn test_missing_file_gives_fresh_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let doc = store.load();
        assert!(doc.referees.is_empty());
        assert_eq!(doc.config.id_counter, 1);
        assert!(doc.history.is_empty());
    }

    #[test]
    fn test_corrupt_file_gives_fresh_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.data_path(), "{ not json").unwrap();

        assert_eq!(store.load(), Document::new());
    }

    #[test]
    fn test_save_keeps_previous_state_as_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut first = Document::new();
        first.referees.insert("1".to_string(), referee("First"));
        store.save(&first).unwrap();
        assert!(!store.backup_path().exists());

        let before_second = fs::read(store.data_path()).unwrap();

        let mut second = first.clone();
        second.referees.insert("2".to_string(), referee("Second"));
        store.save(&second).unwrap();

        assert_eq!(fs::read(store.backup_path()).unwrap(), before_second);
        assert_eq!(store.load(), second);
    }

    #[test]
    fn test_history_field_is_filled_in() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.data_path(), r#"{"referees": {}, "config": {"id_counter": 4}}"#).unwrap();

        let doc = store.load();
        assert!(doc.history.is_empty());
        assert_eq!(doc.config.id_counter, 4);
    }

    #[test]
    fn test_update_skips_save_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let result: Result<(), OpsError> = store.update(|doc| {
            doc.config.id_counter = 99;
            Err(OpsError::InvalidInput("nope".to_string()))
        });

        assert!(result.is_err());
        assert!(!store.data_path().exists());

        store.update(|doc| {
            doc.config.id_counter += 1;
            Ok(())
        }).unwrap();
        assert_eq!(store.load().config.id_counter, 2);
    }

    #[test]
    fn test_reset_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut doc = Document::new();
        doc.referees.insert("1".to_string(), referee("Kept"));
        store.save(&doc).unwrap();

        store.reset().unwrap();

        assert_eq!(store.load(), Document::new());
        let backup: Document = serde_json::from_str(&fs::read_to_string(store.backup_path()).unwrap()).unwrap();
        assert!(backup.is_registered("1"));
    }

    #[test]
    fn test_write_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("missing/dir/data.json"), dir.path().join("backup.json"));

        let result = store.save(&Document::new());
        assert!(matches!(result, Err(OpsError::StoreWriteFailed(_))));
    }
}
