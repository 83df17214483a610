/// Backend location and compiled-in defaults

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::settings::{SettingsError, SettingsStore};

/// Settings key holding the backend base URL
pub const BACKEND_KEY: &str = "cyberad_backend";

/// Used when nothing (or only whitespace) is stored
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8007";

/// The dashboard is deployed separately and talks to its own backend
pub const DASHBOARD_BACKEND_URL: &str = "http://localhost:8006";

/// Caller-side bound on a message bus round trip
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long the popup shows its "Saved!" acknowledgment
pub const SAVED_ACK_DELAY: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    pub base_url: String,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        BackendConfig {
            base_url: base_url.into(),
        }
    }

    /// Resolve a stored value, falling back to the default when unset or blank
    pub fn resolve(stored: Option<&str>) -> Self {
        match stored.map(str::trim) {
            Some(url) if !url.is_empty() => BackendConfig::new(url),
            _ => BackendConfig::default(),
        }
    }

    /// Read-through load; no caching beyond the store itself
    pub async fn load<S: SettingsStore>(store: &S) -> Result<Self, SettingsError> {
        let stored = store.get(BACKEND_KEY).await?;
        Ok(Self::resolve(stored.as_deref()))
    }

    /// Write the trimmed URL back. No syntax validation happens here.
    pub async fn save<S: SettingsStore>(&self, store: &S) -> Result<(), SettingsError> {
        store.set(BACKEND_KEY, self.base_url.trim()).await
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::new(DEFAULT_BACKEND_URL)
    }
}

/// Seed the default on install. Returns true when a value was written.
pub async fn seed_default<S: SettingsStore>(store: &S) -> Result<bool, SettingsError> {
    let existing = store.get(BACKEND_KEY).await?;
    if existing.is_some_and(|url| !url.trim().is_empty()) {
        return Ok(false);
    }

    debug!("Seeding {} with {}", BACKEND_KEY, DEFAULT_BACKEND_URL);
    store.set(BACKEND_KEY, DEFAULT_BACKEND_URL).await?;
    Ok(true)
}
