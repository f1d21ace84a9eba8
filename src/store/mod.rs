//! Storage interfaces for proven transactions and their scripts.
//!
//! The [`Store`] trait describes the storage engine contract: two tables (`transactions` and
//! `transaction_scripts`) supporting scans, key lookups and constraint-checked inserts. The
//! [`TransactionStore`] sits on top of any [`Store`] and exposes the operations callers use,
//! exchanging binary data as raw bytes and base64 text.

use alloc::collections::BTreeSet;
use core::{fmt, str::FromStr};

use async_trait::async_trait;

mod errors;
pub use errors::StoreError;

mod records;
pub use records::{
    TransactionData, TransactionRow, TransactionScriptRow, TransactionStatus, TransactionView,
};

mod transactions;
pub use transactions::TransactionStore;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;

// STORE TRAIT
// ================================================================================================

/// The [`Store`] trait exposes the table operations the [`TransactionStore`] needs.
///
/// Every method is a single request against the storage engine and is atomic on its own. No
/// method spans more than one request.
#[async_trait]
pub trait Store: Send + Sync {
    /// Retrieves the transaction rows matching `filter`.
    async fn get_transaction_rows(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionRow>, StoreError>;

    /// Retrieves the script rows whose hash is contained in `script_hashes`.
    ///
    /// Hashes without a stored script are skipped.
    async fn get_transaction_scripts(
        &self,
        script_hashes: BTreeSet<String>,
    ) -> Result<Vec<TransactionScriptRow>, StoreError>;

    /// Retrieves the script row stored under `script_hash`, if any.
    async fn get_transaction_script(
        &self,
        script_hash: String,
    ) -> Result<Option<TransactionScriptRow>, StoreError>;

    /// Inserts a new script row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConstraintViolation`] if a row with the same hash already exists.
    async fn insert_transaction_script(&self, script: TransactionScriptRow)
        -> Result<(), StoreError>;

    /// Inserts a new transaction row.
    async fn insert_transaction_row(&self, transaction: TransactionRow) -> Result<(), StoreError>;

    /// Sets the commit height of the listed transactions to `block_num`, returning the number
    /// of updated rows.
    async fn mark_transactions_as_committed(
        &self,
        block_num: u32,
        transaction_ids: Vec<String>,
    ) -> Result<usize, StoreError>;
}

// TRANSACTION FILTERS
// ================================================================================================

/// Filters for narrowing the set of transactions returned by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionFilter {
    /// Return all transactions.
    All,
    /// Filter by transactions that haven't yet been committed to the blockchain as per the last
    /// sync.
    Uncommitted,
    /// Return the transactions with the provided IDs.
    Ids(Vec<String>),
}

const IDS_FILTER_PREFIX: &str = "Ids:";

impl fmt::Display for TransactionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionFilter::All => write!(f, "All"),
            TransactionFilter::Uncommitted => write!(f, "Uncommitted"),
            TransactionFilter::Ids(ids) => write!(f, "{IDS_FILTER_PREFIX}{}", ids.join(",")),
        }
    }
}

impl FromStr for TransactionFilter {
    type Err = StoreError;

    fn from_str(filter: &str) -> Result<Self, Self::Err> {
        match filter {
            "All" => Ok(TransactionFilter::All),
            "Uncommitted" => Ok(TransactionFilter::Uncommitted),
            _ => match filter.strip_prefix(IDS_FILTER_PREFIX) {
                Some("") => Ok(TransactionFilter::Ids(vec![])),
                Some(ids) => Ok(TransactionFilter::Ids(ids.split(',').map(String::from).collect())),
                None => Err(StoreError::InvalidTransactionFilter(filter.to_string())),
            },
        }
    }
}
