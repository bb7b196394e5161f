use gloo::storage::{LocalStorage, Storage};
use postboard_state::detail::{KeyValueStore, StorageError};

/// `window.localStorage`, holding raw strings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrowserStore;

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }
}
