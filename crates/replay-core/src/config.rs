// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine configuration and its storage port.
//!
//! [`EngineConfig`] is an immutable value built once and passed by reference
//! to the router. Persistence goes through the [`ConfigStore`] port so hosts
//! and tests can swap the backing medium.

use replay_cas::{CasError, HashAlgorithm, MemoryTier, RadixTier, StoreLayout};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::activity::ChannelPolicy;
use crate::cost::GasSchedule;
use crate::state_codec::StateCodec;

/// Key under which [`EngineConfig`] is persisted.
pub const ENGINE_CONFIG_KEY: &str = "engine";

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
    #[error("[CONFIG_NOT_FOUND] not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("[CONFIG_IO] {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("[CONFIG_SERDE] {0}")]
    Serde(#[from] serde_json::Error),
    /// Values parsed but are out of range.
    #[error("[CONFIG_INVALID] {0}")]
    Invalid(#[from] CasError),
    /// Catch-all error variant.
    #[error("[CONFIG_OTHER] {0}")]
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
}

impl<S: ConfigStore> ConfigService<S> {
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.store.load_raw(key) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist a config value for `key`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Load the engine config, falling back to defaults when none is stored.
    pub fn load_engine(&self) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = self.load(ENGINE_CONFIG_KEY)?.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Validate and persist the engine config.
    pub fn save_engine(&self, config: &EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.save(ENGINE_CONFIG_KEY, config)
    }
}

/// Every tunable of the engine. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cost constants.
    pub gas: GasSchedule,
    /// Chunking parameters for the radix store.
    pub store: StoreLayout,
    /// Digest used for preimage keys.
    pub hash: HashAlgorithm,
    /// Treatment of out-of-range event channels.
    pub channel_policy: ChannelPolicy,
    /// Treat zero-length state roots as absent.
    pub reject_empty_roots: bool,
    /// At-rest encoding of state blobs.
    pub state_codec: StateCodec,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gas: GasSchedule::default(),
            store: StoreLayout::default(),
            hash: HashAlgorithm::default(),
            channel_policy: ChannelPolicy::default(),
            reject_empty_roots: true,
            state_codec: StateCodec::default(),
        }
    }
}

impl EngineConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<(), CasError> {
        self.store.validate()
    }

    /// Flat store using the configured digest.
    pub fn flat_store(&self) -> MemoryTier {
        MemoryTier::with_algorithm(self.hash)
    }

    /// Radix store using the configured digest and layout.
    pub fn radix_store(&self) -> Result<RadixTier, CasError> {
        RadixTier::with_algorithm(self.store, self.hash)
    }
}
