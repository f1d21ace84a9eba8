use std::{path::Path, sync::Arc};

use clap::Parser;
use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use miden_tx_store::{
    config::{StoreConfig, TxStoreConfig},
    store::{sqlite_store::SqliteStore, TransactionStore},
};

use self::{
    init::InitCmd,
    scripts::ScriptCmd,
    transactions::{CommitCmd, RecordCmd, TransactionCmd},
};

mod init;
mod scripts;
mod transactions;
mod utils;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "miden-tx-store.toml";

/// Root CLI struct
#[derive(Parser, Debug)]
#[clap(
    name = "miden-tx-store",
    about = "Store and inspect proven Miden transactions",
    version,
    rename_all = "kebab-case"
)]
pub struct Cli {
    #[clap(subcommand)]
    action: Command,
}

/// CLI actions
#[derive(Debug, Parser)]
pub enum Command {
    Init(InitCmd),
    #[clap(name = "tx")]
    Transaction(TransactionCmd),
    Record(RecordCmd),
    Script(ScriptCmd),
    Commit(CommitCmd),
}

/// CLI entry point
impl Cli {
    pub async fn execute(&self) -> Result<(), String> {
        let mut config_path = std::env::current_dir().map_err(|err| err.to_string())?;
        config_path.push(CONFIG_FILE_NAME);

        // The init command creates the config file, so it has to run before anything reads it
        if let Command::Init(init_cmd) = &self.action {
            return init_cmd.execute(config_path);
        }

        let tx_store = load_transaction_store(&config_path).await?;

        match &self.action {
            Command::Init(_) => Ok(()),
            Command::Transaction(transaction) => transaction.execute(tx_store).await,
            Command::Record(record) => record.execute(tx_store).await,
            Command::Script(script) => script.execute(tx_store).await,
            Command::Commit(commit) => commit.execute(tx_store).await,
        }
    }
}

async fn load_transaction_store(
    config_path: &Path,
) -> Result<TransactionStore<SqliteStore>, String> {
    if !config_path.exists() {
        return Err(format!(
            "config file {} not found, run `miden-tx-store init` first",
            config_path.display()
        ));
    }

    let config = TxStoreConfig::load(config_path)?;
    let store = SqliteStore::new(&StoreConfig::from(&config))
        .await
        .map_err(|err| err.to_string())?;

    Ok(TransactionStore::new(Arc::new(store)))
}

pub fn create_dynamic_table(headers: &[&str]) -> Table {
    let header_cells = headers
        .iter()
        .map(|header| Cell::new(header).add_attribute(Attribute::Bold))
        .collect::<Vec<_>>();

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_header(header_cells);

    table
}
