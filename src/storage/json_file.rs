//! Flat-file store: one JSON document holding every user's saved locations,
//! `{ "<user_id>": { "<name>": { station_id, lat, lon, units } } }`.
//!
//! Every read loads the whole file and every mutation rewrites it. Fine for a
//! handful of users, a bottleneck well before thousands.

use crate::storage::error::StoreError;
use crate::storage::LocationStore;
use crate::types::location::LocationEntry;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;

pub const LOCATIONS_FILE_NAME: &str = "locations.json";

type Document = BTreeMap<String, BTreeMap<String, LocationEntry>>;
type RawDocument = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write sequences within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Uses `<data_dir>/locations.json`. The directory must already exist.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(LOCATIONS_FILE_NAME))
    }

    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read(self.path.clone(), e)),
        }
    }

    /// Entries that fail to decode are skipped one by one. A file that is not
    /// a JSON document of users at all reads as empty.
    fn load(&self) -> Result<Document, StoreError> {
        let Some(raw) = self.read_raw()? else {
            return Ok(Document::new());
        };
        match self.parse(&raw) {
            Ok(document) => Ok(document),
            Err(e) => {
                warn!(
                    "Ignoring unreadable location file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Document::new())
            }
        }
    }

    // Like `load`, but an unreadable file is an error so it is never
    // replaced by a near-empty document.
    fn load_for_update(&self) -> Result<Document, StoreError> {
        match self.read_raw()? {
            Some(raw) => self
                .parse(&raw)
                .map_err(|e| StoreError::Corrupt(self.path.clone(), e)),
            None => Ok(Document::new()),
        }
    }

    fn parse(&self, raw: &str) -> Result<Document, serde_json::Error> {
        let users: RawDocument = serde_json::from_str(raw)?;
        let mut document = Document::new();
        for (user_id, entries) in users {
            let mut saved = BTreeMap::new();
            for (name, value) in entries {
                match serde_json::from_value::<LocationEntry>(value) {
                    Ok(entry) => {
                        saved.insert(name, entry);
                    }
                    Err(e) => warn!(
                        "Skipping saved location '{}' of user {} in {}: {}",
                        name,
                        user_id,
                        self.path.display(),
                        e
                    ),
                }
            }
            document.insert(user_id, saved);
        }
        Ok(document)
    }

    /// Writes to a sibling temp file and renames it over the target, so readers
    /// never observe a half-written document.
    fn store(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document).map_err(StoreError::Encode)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_err = |e| StoreError::Write(self.path.clone(), e);

        let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
        temp.write_all(&bytes).map_err(write_err)?;
        temp.flush().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;
        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Document) -> (T, bool)) -> Result<T, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut document = self.load_for_update()?;
        let (result, changed) = f(&mut document);
        if changed {
            self.store(&document)?;
        }
        Ok(result)
    }
}

impl LocationStore for JsonFileStore {
    fn get(&self, user_id: &str, name: &str) -> Result<Option<LocationEntry>, StoreError> {
        Ok(self
            .load()?
            .get(user_id)
            .and_then(|user| user.get(name))
            .cloned())
    }

    fn save(&self, user_id: &str, name: &str, entry: LocationEntry) -> Result<(), StoreError> {
        // JSON has no NaN or infinity; they would be written as null.
        entry.lat_lon().validate()?;
        self.modify(|document| {
            document
                .entry(user_id.to_string())
                .or_default()
                .insert(name.to_string(), entry);
            ((), true)
        })
    }

    fn list(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .load()?
            .get(user_id)
            .map(|user| user.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn delete(&self, user_id: &str, name: &str) -> Result<bool, StoreError> {
        self.modify(|document| {
            let removed = document
                .get_mut(user_id)
                .is_some_and(|user| user.remove(name).is_some());
            (removed, removed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::HOME;
    use crate::types::location::Units;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store() -> (TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        (dir, store)
    }

    #[test]
    fn test_save_get_delete_round_trip() {
        let (_dir, store) = store();
        let entry = LocationEntry::new("KMWL", 32.793195, -98.089052, Units::Metric);

        store.save("42", HOME, entry.clone()).unwrap();
        assert_eq!(store.get("42", HOME).unwrap(), Some(entry));

        assert!(store.delete("42", HOME).unwrap());
        assert_eq!(store.get("42", HOME).unwrap(), None);
        assert!(!store.delete("42", HOME).unwrap());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let (_dir, store) = store();
        assert_eq!(store.get("1", HOME).unwrap(), None);
        assert!(store.list("1").unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_overwrites_same_name() {
        let (_dir, store) = store();
        store
            .save("7", HOME, LocationEntry::new("KDFW", 32.9, -97.0, Units::Imperial))
            .unwrap();
        store
            .save("7", HOME, LocationEntry::new("KMWL", 32.8, -98.1, Units::Imperial))
            .unwrap();
        assert_eq!(store.list("7").unwrap(), vec!["home".to_string()]);
        assert_eq!(store.get("7", HOME).unwrap().unwrap().station_id, "KMWL");
    }

    #[test]
    fn test_list_is_sorted() {
        let (_dir, store) = store();
        for name in ["work", "cabin", "home"] {
            store
                .save("9", name, LocationEntry::new("KMWL", 0.0, 0.0, Units::Imperial))
                .unwrap();
        }
        assert_eq!(store.list("9").unwrap(), vec!["cabin", "home", "work"]);
    }

    #[test]
    fn test_file_layout() {
        let (_dir, store) = store();
        store
            .save("42", HOME, LocationEntry::new("kmwl", 32.5, -98.5, Units::Imperial))
            .unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"42": {"home": {
                "station_id": "KMWL", "lat": 32.5, "lon": -98.5, "units": "imperial"
            }}})
        );
    }

    #[test]
    fn test_corrupt_file_reads_empty_and_is_not_overwritten() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.get("42", HOME).unwrap(), None);
        assert!(store.list("42").unwrap().is_empty());

        let err = store
            .save("42", HOME, LocationEntry::new("KMWL", 1.0, 2.0, Units::Imperial))
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(..)));
        assert!(matches!(store.delete("42", HOME), Err(StoreError::Corrupt(..))));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_bad_entry_is_skipped_alone() {
        let (_dir, store) = store();
        std::fs::write(
            store.path(),
            r#"{
                "alice": {"home": {"station_id": "KDFW", "lat": 32.9, "lon": -97.0, "units": "imperial"}},
                "bob": {"home": {"station_id": "KMWL", "lat": null, "lon": -98.1, "units": "imperial"}}
            }"#,
        )
        .unwrap();

        assert_eq!(store.get("alice", HOME).unwrap().unwrap().station_id, "KDFW");
        assert_eq!(store.get("bob", HOME).unwrap(), None);

        store
            .save("carol", HOME, LocationEntry::new("KGDJ", 32.4, -97.8, Units::Metric))
            .unwrap();
        assert_eq!(store.get("alice", HOME).unwrap().unwrap().station_id, "KDFW");
        assert_eq!(store.get("carol", HOME).unwrap().unwrap().station_id, "KGDJ");
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        let (_dir, store) = store();
        let alice = LocationEntry::new("KDFW", 32.9, -97.0, Units::Imperial);
        store.save("alice", HOME, alice.clone()).unwrap();

        let err = store
            .save("bob", HOME, LocationEntry::new("KMWL", f64::NAN, -98.1, Units::Imperial))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidEntry(_)));

        store
            .save("carol", HOME, LocationEntry::new("KGDJ", 32.4, -97.8, Units::Imperial))
            .unwrap();
        assert_eq!(store.get("alice", HOME).unwrap(), Some(alice));
        assert_eq!(store.get("bob", HOME).unwrap(), None);
        assert!(!std::fs::read_to_string(store.path()).unwrap().contains("null"));
    }

    #[test]
    fn test_concurrent_saves_for_different_users() {
        let (_dir, store) = store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..2)
            .map(|user| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let entry = LocationEntry::new(
                            &format!("K{user}{i:02}"),
                            user as f64,
                            i as f64,
                            Units::Imperial,
                        );
                        store.save(&user.to_string(), &format!("loc{i:02}"), entry).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for user in 0..2 {
            let names = store.list(&user.to_string()).unwrap();
            assert_eq!(names.len(), 25);
            let last = store.get(&user.to_string(), "loc24").unwrap().unwrap();
            assert_eq!(last.station_id, format!("K{user}24"));
            assert_eq!(last.lat, user as f64);
            assert_eq!(last.lon, 24.0);
        }
    }
}
