//! Key/value persistence with integrity verification
//!
//! Features:
//! - Raw `Storage` backend trait (LocalStorage on web, in-memory elsewhere)
//! - JSON envelope `{ data, hash }` with a keyed rolling hash
//! - Silent fallback to caller defaults on any read/verify failure
//!
//! The hash is tamper *evidence* against casual edits, not a MAC.

pub mod envelope;
#[cfg(target_arch = "wasm32")]
pub mod local;

use std::collections::HashMap;

use crate::error::StorageError;

pub use envelope::{SecureStorage, rolling_hash};
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

/// Raw string key/value backend
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process backend for native builds and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    /// Maximum total bytes (keys + values); `None` = unlimited
    quota: Option<usize>,
    /// Simulate a backend that refuses all access
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn used_bytes(&self) -> usize {
        self.items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        if let Some(quota) = self.quota {
            let replaced = self.items.get(key).map_or(0, |v| key.len() + v.len());
            if self.used_bytes() - replaced + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded(key.to_string()));
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let mut s = MemoryStorage::new();
        assert_eq!(s.get_item("k").unwrap(), None);
        s.set_item("k", "v").unwrap();
        assert_eq!(s.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_quota() {
        let mut s = MemoryStorage::with_quota(8);
        s.set_item("ab", "cdef").unwrap();
        // Overwrite within budget
        s.set_item("ab", "cdefgh").unwrap();
        assert!(matches!(
            s.set_item("x", "yy"),
            Err(StorageError::QuotaExceeded(_))
        ));
    }

    #[test]
    fn test_unavailable() {
        let mut s = MemoryStorage::unavailable();
        assert!(s.get_item("k").is_err());
        assert!(s.set_item("k", "v").is_err());
    }
}
