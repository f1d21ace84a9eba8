use alloc::{collections::BTreeSet, string::ToString, vec::Vec};
use std::path::PathBuf;

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::info;

use self::pool_manager::{Pool, SqlitePoolManager};
use super::{
    Store, StoreError, TransactionFilter, TransactionRow, TransactionScriptRow,
};
use crate::config::StoreConfig;

mod errors;
mod migrations;
mod pool_manager;
mod transactions;

// SQLITE STORE
// ================================================================================================

/// Represents a pool of connections with an sqlite database.
///
/// Current table definitions can be found at `store.sql` migration file. The pool, and with it
/// every open connection, is closed when the store is dropped.
pub struct SqliteStore {
    pub(crate) pool: Pool,
}

impl SqliteStore {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Returns a new instance of [SqliteStore] instantiated with the specified configuration
    /// options, bringing the database schema up to date.
    pub async fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let database_filepath = PathBuf::from(&config.database_filepath);
        let pool = Pool::builder(SqlitePoolManager::new(database_filepath))
            .build()
            .map_err(|err| StoreError::DatabaseError(err.to_string()))?;

        let conn = pool.get().await.map_err(|err| StoreError::DatabaseError(err.to_string()))?;
        conn.interact(migrations::update_to_latest)
            .await
            .map_err(|err| StoreError::DatabaseError(err.to_string()))??;

        info!("Opened store at {}", config.database_filepath);

        Ok(Self { pool })
    }

    /// Runs `f` on a pooled connection without blocking the async executor.
    pub(crate) async fn interact_with_connection<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        self.pool
            .get()
            .await
            .map_err(|err| StoreError::DatabaseError(err.to_string()))?
            .interact(f)
            .await
            .map_err(|err| StoreError::DatabaseError(err.to_string()))?
    }
}

// SQLite implementation of the Store trait
//
// To simplify, all implementations rely on inner SqliteStore functions that map 1:1 by name
// This way, the actual queries are grouped in their own sub-module
#[async_trait]
impl Store for SqliteStore {
    async fn get_transaction_rows(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionRow>, StoreError> {
        self.interact_with_connection(move |conn| SqliteStore::get_transaction_rows(conn, &filter))
            .await
    }

    async fn get_transaction_scripts(
        &self,
        script_hashes: BTreeSet<String>,
    ) -> Result<Vec<TransactionScriptRow>, StoreError> {
        self.interact_with_connection(move |conn| {
            SqliteStore::get_transaction_scripts(conn, &script_hashes)
        })
        .await
    }

    async fn get_transaction_script(
        &self,
        script_hash: String,
    ) -> Result<Option<TransactionScriptRow>, StoreError> {
        self.interact_with_connection(move |conn| {
            SqliteStore::get_transaction_script(conn, &script_hash)
        })
        .await
    }

    async fn insert_transaction_script(
        &self,
        script: TransactionScriptRow,
    ) -> Result<(), StoreError> {
        self.interact_with_connection(move |conn| {
            SqliteStore::insert_transaction_script(conn, &script)
        })
        .await
    }

    async fn insert_transaction_row(&self, transaction: TransactionRow) -> Result<(), StoreError> {
        self.interact_with_connection(move |conn| {
            SqliteStore::insert_transaction_row(conn, &transaction)
        })
        .await
    }

    async fn mark_transactions_as_committed(
        &self,
        block_num: u32,
        transaction_ids: Vec<String>,
    ) -> Result<usize, StoreError> {
        self.interact_with_connection(move |conn| {
            SqliteStore::mark_transactions_as_committed(conn, block_num, &transaction_ids)
        })
        .await
    }
}

// TESTS
// ================================================================================================
