use std::path::PathBuf;

use deadpool::{
    managed::{Manager, Metrics, RecycleResult},
    Runtime,
};
use rusqlite::{vtab::array, Connection};

use crate::store::StoreError;

deadpool::managed_reexports!(
    "miden-tx-store-sqlite",
    SqlitePoolManager,
    deadpool::managed::Object<SqlitePoolManager>,
    rusqlite::Error,
    StoreError
);

const RUNTIME: Runtime = Runtime::Tokio1;

// POOL MANAGER
// ================================================================================================

/// `SQLite` connection pool manager
pub struct SqlitePoolManager {
    database_path: PathBuf,
}

impl SqlitePoolManager {
    pub fn new(database_path: PathBuf) -> Self {
        Self { database_path }
    }

    fn new_connection(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.database_path)?;

        // Needed for the `IN rarray(?)` lookups, the module has to be loaded on every connection
        array::load_module(&conn)?;

        // `foreign_keys` stays off: the schema declares no foreign keys, a transaction may
        // reference a script hash that was never stored

        Ok(conn)
    }
}

impl Manager for SqlitePoolManager {
    type Type = deadpool_sync::SyncWrapper<Connection>;
    type Error = rusqlite::Error;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        let conn = self.new_connection();
        deadpool_sync::SyncWrapper::new(RUNTIME, move || conn).await
    }

    async fn recycle(&self, _: &mut Self::Type, _: &Metrics) -> RecycleResult<Self::Error> {
        Ok(())
    }
}
