use core::fmt;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use super::StoreError;

// TRANSACTION DATA
// ================================================================================================

/// Data of a proven transaction as handed to the store by the caller.
///
/// Binary fields are raw bytes; the store decides how each one is persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionData {
    pub id: String,
    pub account_id: String,
    pub init_account_state: String,
    pub final_account_state: String,
    pub input_notes: String,
    pub output_notes: Vec<u8>,
    /// Hash of the transaction script executed by the transaction, if any.
    pub script_hash: Option<Vec<u8>>,
    pub block_num: u32,
    /// Block height at which the transaction was committed, `None` while pending.
    pub commit_height: Option<u32>,
}

// ROWS
// ================================================================================================

/// A row of the `transactions` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRow {
    pub id: String,
    pub account_id: String,
    pub init_account_state: String,
    pub final_account_state: String,
    pub input_notes: String,
    pub output_notes: Vec<u8>,
    /// Base64 encoding of the script hash.
    pub script_hash: Option<String>,
    pub block_num: u32,
    pub commit_height: Option<u32>,
}

impl From<TransactionData> for TransactionRow {
    fn from(data: TransactionData) -> Self {
        Self {
            id: data.id,
            account_id: data.account_id,
            init_account_state: data.init_account_state,
            final_account_state: data.final_account_state,
            input_notes: data.input_notes,
            output_notes: data.output_notes,
            script_hash: data.script_hash.map(|hash| encode_base64(&hash)),
            block_num: data.block_num,
            commit_height: data.commit_height,
        }
    }
}

/// A row of the `transaction_scripts` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionScriptRow {
    /// Base64 encoding of the script hash. Unique across the table.
    pub script_hash: String,
    pub program: Option<Vec<u8>>,
}

// TRANSACTION VIEW
// ================================================================================================

/// A transaction as returned to callers, with every binary field base64 encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: String,
    pub account_id: String,
    pub init_account_state: String,
    pub final_account_state: String,
    pub input_notes: String,
    pub output_notes: String,
    pub script_hash: Option<String>,
    pub tx_script: Option<String>,
    pub block_num: u32,
    pub commit_height: Option<u32>,
}

impl TransactionView {
    /// Builds the view of `row`, attaching the program of its script if one was found.
    pub(crate) fn from_row(row: TransactionRow, program: Option<&[u8]>) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            init_account_state: row.init_account_state,
            final_account_state: row.final_account_state,
            input_notes: row.input_notes,
            output_notes: encode_base64(&row.output_notes),
            script_hash: row.script_hash,
            tx_script: program.map(encode_base64),
            block_num: row.block_num,
            commit_height: row.commit_height,
        }
    }

    pub fn status(&self) -> TransactionStatus {
        self.commit_height.map_or(TransactionStatus::Pending, TransactionStatus::Committed)
    }

    /// Returns the raw output notes bytes.
    pub fn decode_output_notes(&self) -> Result<Vec<u8>, StoreError> {
        decode_base64(&self.output_notes)
    }

    /// Returns the raw transaction script program, if the transaction has one.
    pub fn decode_tx_script(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.tx_script.as_deref().map(decode_base64).transpose()
    }
}

// TRANSACTION STATUS
// ================================================================================================

/// Represents the status of a transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Transaction has been submitted but not yet committed
    Pending,
    /// Transaction has been committed and included at the specified block number
    Committed(u32),
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "Pending"),
            TransactionStatus::Committed(block_number) => {
                write!(f, "Committed (Block: {block_number})")
            },
        }
    }
}

// HELPERS
// ================================================================================================

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

pub(crate) fn decode_base64(text: &str) -> Result<Vec<u8>, StoreError> {
    Ok(general_purpose::STANDARD.decode(text)?)
}
