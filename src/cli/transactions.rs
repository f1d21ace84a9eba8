use clap::Parser;
use miden_tx_store::store::{
    Store, TransactionData, TransactionFilter, TransactionStore, TransactionView,
};

use super::{create_dynamic_table, utils::parse_hex_bytes};

// TRANSACTION COMMAND
// ================================================================================================

#[derive(Default, Debug, Parser, Clone)]
#[clap(about = "View stored transactions. Defaults to `list` command.")]
pub struct TransactionCmd {
    /// List stored transactions
    #[clap(short, long, group = "action")]
    list: bool,

    /// Only list transactions that have not been committed yet
    #[clap(short, long, conflicts_with = "ids")]
    uncommitted: bool,

    /// Only list the transactions with these IDs
    #[clap(long, num_args = 1..)]
    ids: Option<Vec<String>>,

    /// Print the transactions as JSON instead of a table
    #[clap(long)]
    json: bool,
}

impl TransactionCmd {
    pub async fn execute<S: Store>(&self, tx_store: TransactionStore<S>) -> Result<(), String> {
        let filter = match (&self.ids, self.uncommitted) {
            (Some(ids), _) => TransactionFilter::Ids(ids.clone()),
            (None, true) => TransactionFilter::Uncommitted,
            (None, false) => TransactionFilter::All,
        };

        let transactions =
            tx_store.get_transactions(filter).await.map_err(|err| err.to_string())?;

        if self.json {
            let json = serde_json::to_string_pretty(&transactions)
                .map_err(|err| format!("error formatting transactions: {err}"))?;
            println!("{json}");
        } else {
            print_transactions_summary(&transactions);
        }

        Ok(())
    }
}

// RECORD COMMAND
// ================================================================================================

#[derive(Debug, Parser, Clone)]
#[clap(about = "Store a proven transaction, together with its script if one is given")]
pub struct RecordCmd {
    /// Transaction ID
    #[clap(long)]
    id: String,

    /// ID of the account the transaction was executed against
    #[clap(long)]
    account_id: String,

    /// Hash of the account state before the transaction
    #[clap(long)]
    init_account_state: String,

    /// Hash of the account state after the transaction
    #[clap(long)]
    final_account_state: String,

    /// Serialized input note nullifiers
    #[clap(long, default_value = "[]")]
    input_notes: String,

    /// Serialized output notes, hex encoded
    #[clap(long)]
    output_notes: String,

    /// Hash of the transaction script, hex encoded
    #[clap(long)]
    script_hash: Option<String>,

    /// Serialized transaction script program, hex encoded
    #[clap(long, requires = "script_hash")]
    script: Option<String>,

    /// Block number the transaction was executed against
    #[clap(long)]
    block_num: u32,

    /// Block number at which the transaction was committed, if it already was
    #[clap(long)]
    commit_height: Option<u32>,
}

impl RecordCmd {
    pub async fn execute<S: Store>(&self, tx_store: TransactionStore<S>) -> Result<(), String> {
        let script = self.script.as_deref().map(parse_hex_bytes).transpose()?;
        let transaction = TransactionData {
            id: self.id.clone(),
            account_id: self.account_id.clone(),
            init_account_state: self.init_account_state.clone(),
            final_account_state: self.final_account_state.clone(),
            input_notes: self.input_notes.clone(),
            output_notes: parse_hex_bytes(&self.output_notes)?,
            script_hash: self.script_hash.as_deref().map(parse_hex_bytes).transpose()?,
            block_num: self.block_num,
            commit_height: self.commit_height,
        };

        tx_store
            .apply_transaction(transaction, script.as_deref())
            .await
            .map_err(|err| err.to_string())?;

        println!("Stored transaction {}", self.id);
        Ok(())
    }
}

// COMMIT COMMAND
// ================================================================================================

#[derive(Debug, Parser, Clone)]
#[clap(about = "Mark transactions as committed at the given block")]
pub struct CommitCmd {
    /// Block number at which the transactions were committed
    #[clap(long)]
    block_num: u32,

    /// IDs of the committed transactions
    #[clap(required = true)]
    ids: Vec<String>,
}

impl CommitCmd {
    pub async fn execute<S: Store>(&self, tx_store: TransactionStore<S>) -> Result<(), String> {
        let rows = tx_store
            .mark_transactions_as_committed(self.block_num, &self.ids)
            .await
            .map_err(|err| err.to_string())?;

        println!("Marked {rows} transactions as committed");
        Ok(())
    }
}

// HELPERS
// ================================================================================================
fn print_transactions_summary<'a, I>(transactions: I)
where
    I: IntoIterator<Item = &'a TransactionView>,
{
    let mut table = create_dynamic_table(&[
        "ID",
        "Status",
        "Account ID",
        "Script Hash",
        "Block Num",
        "Output Notes",
    ]);

    for tx in transactions {
        table.add_row(vec![
            tx.id.clone(),
            tx.status().to_string(),
            tx.account_id.clone(),
            tx.script_hash.clone().unwrap_or("-".to_string()),
            tx.block_num.to_string(),
            tx.output_notes.clone(),
        ]);
    }

    println!("{table}");
}
