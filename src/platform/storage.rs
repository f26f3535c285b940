//! LocalStorage persistence
//!
//! JSON values keyed by name. On native there is no storage: loads find
//! nothing and saves are dropped.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Why a stored value could not be used
#[derive(Debug)]
pub enum StorageError {
    /// No storage, or nothing under the key
    Missing,
    /// Stored JSON does not match the expected shape
    Corrupt(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Missing => write!(f, "nothing stored"),
            StorageError::Corrupt(e) => write!(f, "corrupt value: {}", e),
        }
    }
}

/// Decode a stored JSON value
pub fn decode<T: DeserializeOwned>(json: Option<String>) -> Result<T, StorageError> {
    let json = json.ok_or(StorageError::Missing)?;
    serde_json::from_str(&json).map_err(StorageError::Corrupt)
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Load the value stored under `key`
#[cfg(target_arch = "wasm32")]
pub fn load<T: DeserializeOwned>(key: &str) -> Result<T, StorageError> {
    let json = local_storage().and_then(|s| s.get_item(key).ok().flatten());
    decode(json)
}

/// Store `value` under `key`. Returns false if nothing was written.
#[cfg(target_arch = "wasm32")]
pub fn save<T: Serialize>(key: &str, value: &T) -> bool {
    let Some(storage) = local_storage() else {
        return false;
    };
    match serde_json::to_string(value) {
        Ok(json) => storage.set_item(key, &json).is_ok(),
        Err(e) => {
            log::warn!("Failed to encode {}: {}", key, e);
            false
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load<T: DeserializeOwned>(_key: &str) -> Result<T, StorageError> {
    Err(StorageError::Missing)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save<T: Serialize>(_key: &str, _value: &T) -> bool {
    false
}
