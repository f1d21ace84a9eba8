use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    value::{Dict, Map},
    Figment, Metadata, Profile, Provider,
};
use serde::{Deserialize, Serialize};

/// Prefix of the environment variables that override file settings.
pub const CONFIG_ENV_PREFIX: &str = "MIDEN_TX_STORE_";

// TX STORE CONFIG
// ================================================================================================

/// Configuration options of the transaction store.
#[derive(Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TxStoreConfig {
    /// Describes settings related to the store.
    pub store: StoreConfig,
}

impl TxStoreConfig {
    /// Loads the configuration from `config_file`, layering environment overrides on top.
    ///
    /// Nested keys are separated by a double underscore, so `MIDEN_TX_STORE_STORE__DATABASE_FILEPATH`
    /// overrides `store.database_filepath`.
    pub fn load(config_file: &Path) -> Result<Self, String> {
        Figment::from(TxStoreConfig::default())
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"))
            .extract()
            .map_err(|err| format!("Failed to load {} config file: {err}", config_file.display()))
    }
}

// Make `TxStoreConfig` a provider itself for composability.
impl Provider for TxStoreConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("Transaction Store Config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        figment::providers::Serialized::defaults(self).data()
    }

    fn profile(&self) -> Option<Profile> {
        // Optionally, a profile that's selected by default.
        None
    }
}

// STORE CONFIG
// ================================================================================================

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StoreConfig {
    pub database_filepath: String,
}

impl From<&TxStoreConfig> for StoreConfig {
    fn from(config: &TxStoreConfig) -> Self {
        config.store.clone()
    }
}

impl TryFrom<&str> for StoreConfig {
    type Error = String;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        StoreConfig::try_from(value.to_string())
    }
}

impl TryFrom<String> for StoreConfig {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err("store database filepath cannot be empty".to_string());
        }

        Ok(Self { database_filepath: value })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        const STORE_FILENAME: &str = "store.sqlite3";

        // Get current directory
        let exec_dir = PathBuf::new();

        // Append filepath
        let database_filepath = exec_dir.join(STORE_FILENAME).to_string_lossy().into_owned();

        Self { database_filepath }
    }
}
