//! String key-value persistence port.
//!
//! The save code only needs `get`/`set`/`remove` over strings. In the browser
//! that is `localStorage`; tests and native builds use [`MemoryStore`].

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// `window.localStorage`. Only available in the browser.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// `None` when the page has no window or storage is disabled.
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Write {
                key: key.to_string(),
                reason: format!("{e:?}"),
            })
    }

    fn remove(&mut self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

/// The browser store when available, memory otherwise.
pub fn open_default() -> Box<dyn KeyValueStore> {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(store) = LocalStorage::open() {
            return Box::new(store);
        }
        log::warn!("localStorage unavailable; progress will not persist");
    }
    Box::new(MemoryStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("gameState"), None);
        store.set("gameState", "[]").unwrap();
        assert_eq!(store.get("gameState").as_deref(), Some("[]"));
        store.set("gameState", "[1]").unwrap();
        assert_eq!(store.get("gameState").as_deref(), Some("[1]"));
        store.remove("gameState");
        assert_eq!(store.get("gameState"), None);
    }

    #[test]
    fn store_error_message() {
        let err = StoreError::Write {
            key: "gameState".into(),
            reason: "QuotaExceededError".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write key 'gameState': QuotaExceededError"
        );
    }
}
