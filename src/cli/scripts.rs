use clap::Parser;
use miden_tx_store::store::{Store, TransactionStore};

use super::utils::parse_hex_bytes;

// SCRIPT COMMAND
// ================================================================================================

#[derive(Debug, Clone, Parser)]
#[clap(about = "Store a transaction script under its hash. Already stored hashes are left as is.")]
pub struct ScriptCmd {
    /// Hash of the script, hex encoded
    #[clap(long)]
    hash: String,

    /// Serialized script program, hex encoded
    #[clap(long)]
    program: Option<String>,
}

impl ScriptCmd {
    pub async fn execute<S: Store>(&self, tx_store: TransactionStore<S>) -> Result<(), String> {
        let hash = parse_hex_bytes(&self.hash)?;
        let program = self.program.as_deref().map(parse_hex_bytes).transpose()?;

        tx_store
            .insert_transaction_script(&hash, program.as_deref())
            .await
            .map_err(|err| err.to_string())?;

        println!("Stored transaction script 0x{}", hex::encode(&hash));
        Ok(())
    }
}
