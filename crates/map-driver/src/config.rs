// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config service and storage port for driver options.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::options::DriverOptions;

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The mount selector is empty.
    #[error("target selector is empty")]
    MissingTarget,
    /// Two layers share a name.
    #[error("duplicate layer name: {0}")]
    DuplicateLayer(String),
    /// An overlay selector is listed twice.
    #[error("duplicate overlay selector: {0}")]
    DuplicateOverlay(String),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Thin service that serializes config values and delegates storage to a `ConfigStore`.
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist a config value for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Load driver options for `key` and validate them.
    pub fn load_options(&self, key: &str) -> Result<Option<DriverOptions>, ConfigError> {
        let Some(options) = self.load::<DriverOptions>(key)? else {
            return Ok(None);
        };
        options.validate()?;
        Ok(Some(options))
    }
}

/// Shared in-memory [`ConfigStore`]. Clones see the same entries.
#[derive(Clone, Default)]
pub struct MemoryConfigStore {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::options::LayerConfig;

    #[test]
    fn options_round_trip_through_store() {
        let store = MemoryConfigStore::new();
        let service = ConfigService::new(store.clone());
        let options = DriverOptions::new("#map")
            .with_layer("pins", LayerConfig::vector(vec![]))
            .with_overlay("#popup");

        service.save("driver", &options).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(service.load_options("driver").unwrap(), Some(options));
        assert_eq!(service.load_options("missing").unwrap(), None);
    }

    #[test]
    fn invalid_options_are_rejected_on_load() {
        let store = MemoryConfigStore::new();
        store
            .save_raw("driver", br#"{"target": "", "layers": []}"#)
            .unwrap();
        let service = ConfigService::new(store);
        assert!(matches!(
            service.load_options("driver"),
            Err(ConfigError::MissingTarget)
        ));
    }

    #[test]
    fn empty_blob_loads_as_none() {
        let store = MemoryConfigStore::new();
        store.save_raw("driver", b"").unwrap();
        let service = ConfigService::new(store);
        assert!(service.load_options("driver").unwrap().is_none());
    }
}
