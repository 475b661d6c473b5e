//! Hash-checked JSON envelope over a raw `Storage`

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Storage;
use crate::consts::STORAGE_SECRET;

/// On-disk layout: `{ "data": ..., "hash": "..." }`
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    data: Value,
    hash: String,
}

/// 32-bit rolling hash (`h = h * 31 + c` over UTF-16 units, wrapping) of
/// `data` followed by `secret`, printed as signed hex.
pub fn rolling_hash(data: &str, secret: &str) -> String {
    let mut h: i32 = 0;
    for unit in data.encode_utf16().chain(secret.encode_utf16()) {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32);
    }
    if h < 0 {
        format!("-{:x}", h.unsigned_abs())
    } else {
        format!("{h:x}")
    }
}

/// String form hashed for a value: raw text for strings, compact JSON otherwise
fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Storage wrapper that never fails: reads fall back to a caller default,
/// writes are best effort.
pub struct SecureStorage {
    backend: Box<dyn Storage>,
    secret: &'static str,
}

impl SecureStorage {
    pub fn new(backend: Box<dyn Storage>) -> Self {
        Self {
            backend,
            secret: STORAGE_SECRET,
        }
    }

    pub fn with_secret(backend: Box<dyn Storage>, secret: &'static str) -> Self {
        Self { backend, secret }
    }

    /// Load and verify `key`, or return `fallback`
    pub fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let Some(raw) = self.load_raw(key) else {
            return fallback;
        };

        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!("Storage load failed for `{key}`: {e}");
                return fallback;
            }
        };

        if envelope.hash != rolling_hash(&string_form(&envelope.data), self.secret) {
            log::error!("Storage tampering detected for `{key}`, resetting");
            return fallback;
        }

        serde_json::from_value(envelope.data).unwrap_or_else(|e| {
            log::warn!("Stored `{key}` has unexpected shape: {e}");
            fallback
        })
    }

    /// Wrap `value` in a hashed envelope and store it. Returns whether the
    /// write landed.
    pub fn save<T: Serialize>(&mut self, key: &str, value: &T) -> bool {
        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Storage save failed for `{key}`: {e}");
                return false;
            }
        };
        let hash = rolling_hash(&string_form(&data), self.secret);
        match serde_json::to_string(&Envelope { data, hash }) {
            Ok(json) => self.save_raw(key, &json),
            Err(e) => {
                log::warn!("Storage save failed for `{key}`: {e}");
                false
            }
        }
    }

    /// Read an unwrapped value; backend errors read as absent
    pub fn load_raw(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Storage load failed for `{key}`: {e}");
                None
            }
        }
    }

    /// Write an unwrapped value; backend errors are logged and dropped
    pub fn save_raw(&mut self, key: &str, value: &str) -> bool {
        match self.backend.set_item(key, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Storage save failed for `{key}`: {e}");
                false
            }
        }
    }
}

impl std::fmt::Debug for SecureStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureStorage").finish_non_exhaustive()
    }
}
