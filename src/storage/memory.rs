use crate::storage::error::StoreError;
use crate::storage::LocationStore;
use crate::types::location::LocationEntry;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<BTreeMap<String, BTreeMap<String, LocationEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, BTreeMap<String, LocationEntry>>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocationStore for MemoryStore {
    fn get(&self, user_id: &str, name: &str) -> Result<Option<LocationEntry>, StoreError> {
        Ok(self.lock().get(user_id).and_then(|u| u.get(name)).cloned())
    }

    fn save(&self, user_id: &str, name: &str, entry: LocationEntry) -> Result<(), StoreError> {
        self.lock()
            .entry(user_id.to_string())
            .or_default()
            .insert(name.to_string(), entry);
        Ok(())
    }

    fn list(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lock()
            .get(user_id)
            .map(|u| u.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn delete(&self, user_id: &str, name: &str) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .get_mut(user_id)
            .is_some_and(|u| u.remove(name).is_some()))
    }
}
