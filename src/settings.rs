/// Persisted key-value settings shared by every extension context

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge/storage.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSyncValue(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncValue(key: &str, value: &str) -> Result<(), JsValue>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Read(String),
    #[error("Failed to write settings: {0}")]
    Write(String),
}

/// Whole-value get/set over string settings.
pub trait SettingsStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, SettingsError>>;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), SettingsError>>;
}

/// `chrome.storage.sync`, shared across the user's browser profile
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeSyncStore;

impl SettingsStore for ChromeSyncStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let value = getSyncValue(key)
            .await
            .map_err(|e| SettingsError::Read(format!("{:?}", e)))?;

        // Anything other than a string is treated as unset
        Ok(value.as_string())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        setSyncValue(key, value)
            .await
            .map_err(|e| SettingsError::Write(format!("{:?}", e)))
    }
}

/// In-process store
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
