//! Per-user saved locations behind a small key-value interface.

pub mod error;
pub mod json_file;
pub mod memory;

use crate::storage::error::StoreError;
use crate::types::location::LocationEntry;

/// Name under which a user's default location is saved.
pub const HOME: &str = "home";

/// Saved locations keyed by `(user_id, name)`. At most one entry exists per
/// pair; saving again overwrites it.
pub trait LocationStore: Send + Sync {
    fn get(&self, user_id: &str, name: &str) -> Result<Option<LocationEntry>, StoreError>;

    fn save(&self, user_id: &str, name: &str, entry: LocationEntry) -> Result<(), StoreError>;

    /// Names saved for a user, sorted.
    fn list(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    /// Removes an entry, reporting whether it existed.
    fn delete(&self, user_id: &str, name: &str) -> Result<bool, StoreError>;
}

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
