//! Browser LocalStorage backend

use super::Storage;
use crate::error::StorageError;

/// `window.localStorage`, resolved lazily so a blocked storage (private
/// mode, sandboxed iframe) shows up as `Unavailable` on each access.
#[derive(Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn backend() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::backend()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Browsers report quota as a DOMException from setItem
        Self::backend()?
            .set_item(key, value)
            .map_err(|_| StorageError::QuotaExceeded(key.to_string()))
    }
}
