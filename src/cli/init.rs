use std::{fs::File, io::Write, path::PathBuf};

use clap::Parser;
use miden_tx_store::config::{StoreConfig, TxStoreConfig};

// INIT COMMAND
// ================================================================================================

#[derive(Debug, Clone, Parser)]
#[clap(about = "Create the configuration file in the current directory")]
pub struct InitCmd {
    /// Path of the sqlite database file. Defaults to `./store.sqlite3`.
    #[clap(long)]
    store_path: Option<String>,
}

impl InitCmd {
    pub fn execute(&self, config_file_path: PathBuf) -> Result<(), String> {
        let mut config = TxStoreConfig::default();
        if let Some(path) = &self.store_path {
            config.store = StoreConfig::try_from(path.as_str())?;
        }

        let config_as_toml_string = toml::to_string_pretty(&config)
            .map_err(|err| format!("error formatting config: {err}"))?;

        println!("Creating config file at: {}", config_file_path.display());
        let mut file_handle = File::options()
            .write(true)
            .create_new(true)
            .open(config_file_path)
            .map_err(|err| format!("error opening the file: {err}"))?;
        file_handle
            .write_all(config_as_toml_string.as_bytes())
            .map_err(|err| format!("error writing to file: {err}"))?;

        Ok(())
    }
}
