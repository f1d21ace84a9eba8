use alloc::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use tracing::{debug, error, info};

use super::{
    records::encode_base64, Store, StoreError, TransactionData, TransactionFilter,
    TransactionRow, TransactionScriptRow, TransactionView,
};

// TRANSACTION STORE
// ================================================================================================

/// Persists proven transactions and the scripts they executed.
///
/// The store is a thin layer over a [`Store`] implementation: it encodes binary data on its way
/// in and out and resolves the scripts referenced by transactions.
pub struct TransactionStore<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for TransactionStore<S> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<S: Store> TransactionStore<S> {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying [`Store`].
    pub fn store(&self) -> &S {
        &self.store
    }

    // TRANSACTION DATA RETRIEVAL
    // --------------------------------------------------------------------------------------------

    /// Retrieves tracked transactions, filtered by [`TransactionFilter`].
    ///
    /// Scripts referenced by the returned transactions are fetched with a single lookup.
    pub async fn get_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionView>, StoreError> {
        let rows = self.store.get_transaction_rows(filter).await.map_err(|err| {
            error!("Failed to retrieve transactions: {err}");
            err
        })?;

        let script_hashes: BTreeSet<String> =
            rows.iter().filter_map(|row| row.script_hash.clone()).collect();

        let scripts: BTreeMap<String, Option<Vec<u8>>> = if script_hashes.is_empty() {
            BTreeMap::new()
        } else {
            self.store
                .get_transaction_scripts(script_hashes)
                .await
                .map_err(|err| {
                    error!("Failed to retrieve transaction scripts: {err}");
                    err
                })?
                .into_iter()
                .map(|script| (script.script_hash, script.program))
                .collect()
        };

        let transactions = rows
            .into_iter()
            .map(|row| {
                let program = row
                    .script_hash
                    .as_ref()
                    .and_then(|hash| scripts.get(hash))
                    .and_then(Option::as_deref);
                TransactionView::from_row(row, program)
            })
            .collect();

        Ok(transactions)
    }

    // TRANSACTION DATA INSERTION
    // --------------------------------------------------------------------------------------------

    /// Stores the program of a transaction script under its hash.
    ///
    /// Inserting a hash that is already stored leaves the existing row untouched and succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingScriptHash`] if `script_hash` is empty.
    pub async fn insert_transaction_script(
        &self,
        script_hash: &[u8],
        script: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        if script_hash.is_empty() {
            return Err(StoreError::MissingScriptHash);
        }

        let script_hash = encode_base64(script_hash);

        let existing = self.store.get_transaction_script(script_hash.clone()).await.map_err(|err| {
            error!("Failed to look up transaction script {script_hash}: {err}");
            err
        })?;
        if existing.is_some() {
            debug!("Transaction script {script_hash} already stored");
            return Ok(());
        }

        let row = TransactionScriptRow {
            script_hash: script_hash.clone(),
            program: script.map(<[u8]>::to_vec),
        };

        match self.store.insert_transaction_script(row).await {
            Ok(()) => {
                info!("Inserted transaction script {script_hash}");
                Ok(())
            },
            Err(err) if err.is_constraint_violation() => {
                debug!("Transaction script {script_hash} was inserted concurrently");
                Ok(())
            },
            Err(err) => {
                error!("Failed to insert transaction script {script_hash}: {err}");
                Err(err)
            },
        }
    }

    /// Stores a proven transaction.
    pub async fn insert_transaction(&self, transaction: TransactionData) -> Result<(), StoreError> {
        let row = TransactionRow::from(transaction);
        let transaction_id = row.id.clone();

        self.store.insert_transaction_row(row).await.map_err(|err| {
            error!("Failed to insert transaction {transaction_id}: {err}");
            err
        })?;

        info!("Inserted transaction {transaction_id}");
        Ok(())
    }

    /// Stores a proven transaction together with the program of the script it executed.
    ///
    /// The script is stored first so that the transaction never references a hash that was not
    /// attempted. Transactions without a script hash ignore `tx_script`.
    pub async fn apply_transaction(
        &self,
        transaction: TransactionData,
        tx_script: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        if let Some(script_hash) = transaction.script_hash.as_deref() {
            self.insert_transaction_script(script_hash, tx_script).await?;
        }

        self.insert_transaction(transaction).await
    }

    /// Sets the provided transactions as committed at `block_num`.
    pub async fn mark_transactions_as_committed(
        &self,
        block_num: u32,
        transaction_ids: &[String],
    ) -> Result<usize, StoreError> {
        let rows = self
            .store
            .mark_transactions_as_committed(block_num, transaction_ids.to_vec())
            .await
            .map_err(|err| {
                error!("Failed to mark transactions as committed: {err}");
                err
            })?;

        info!("Marked {rows} transactions as committed");
        Ok(rows)
    }
}

// TESTS
// ================================================================================================


#[cfg(test)]
mod mock_store_tests {
    use alloc::{collections::BTreeSet, sync::Arc};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use async_trait::async_trait;

    use crate::store::{
        Store, StoreError, TransactionData, TransactionFilter, TransactionRow,
        TransactionScriptRow, TransactionStore,
    };

    /// Which error, if any, the [MockStore] returns from a failing call.
    #[derive(Clone, Copy, Default)]
    enum Failure {
        #[default]
        None,
        Database,
        Duplicate,
    }

    impl Failure {
        fn check(self) -> Result<(), StoreError> {
            match self {
                Failure::None => Ok(()),
                Failure::Database => Err(StoreError::DatabaseError("disk I/O error".to_string())),
                Failure::Duplicate => {
                    Err(StoreError::ConstraintViolation("duplicate script hash".to_string()))
                },
            }
        }
    }

    /// In-memory [Store] that counts script lookups and fails on demand.
    #[derive(Default)]
    struct MockStore {
        rows: Mutex<Vec<TransactionRow>>,
        scripts: Mutex<Vec<TransactionScriptRow>>,
        script_lookups: AtomicUsize,
        read_failure: Mutex<Failure>,
        script_lookup_failure: Mutex<Failure>,
        write_failure: Mutex<Failure>,
    }

    impl MockStore {
        fn fail_reads(&self, failure: Failure) {
            *self.read_failure.lock().unwrap() = failure;
        }

        fn fail_script_lookups(&self, failure: Failure) {
            *self.script_lookup_failure.lock().unwrap() = failure;
        }

        fn fail_writes(&self, failure: Failure) {
            *self.write_failure.lock().unwrap() = failure;
        }

        fn script_lookups(&self) -> usize {
            self.script_lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Store for MockStore {
        async fn get_transaction_rows(
            &self,
            filter: TransactionFilter,
        ) -> Result<Vec<TransactionRow>, StoreError> {
            self.read_failure.lock().unwrap().check()?;

            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|row| match &filter {
                    TransactionFilter::All => true,
                    TransactionFilter::Uncommitted => row.commit_height.is_none(),
                    TransactionFilter::Ids(ids) => ids.contains(&row.id),
                })
                .cloned()
                .collect())
        }

        async fn get_transaction_scripts(
            &self,
            script_hashes: BTreeSet<String>,
        ) -> Result<Vec<TransactionScriptRow>, StoreError> {
            self.script_lookups.fetch_add(1, Ordering::SeqCst);
            self.script_lookup_failure.lock().unwrap().check()?;

            let scripts = self.scripts.lock().unwrap();
            Ok(scripts
                .iter()
                .filter(|script| script_hashes.contains(&script.script_hash))
                .cloned()
                .collect())
        }

        async fn get_transaction_script(
            &self,
            script_hash: String,
        ) -> Result<Option<TransactionScriptRow>, StoreError> {
            self.read_failure.lock().unwrap().check()?;

            let scripts = self.scripts.lock().unwrap();
            Ok(scripts.iter().find(|script| script.script_hash == script_hash).cloned())
        }

        async fn insert_transaction_script(
            &self,
            script: TransactionScriptRow,
        ) -> Result<(), StoreError> {
            self.write_failure.lock().unwrap().check()?;
            self.scripts.lock().unwrap().push(script);
            Ok(())
        }

        async fn insert_transaction_row(
            &self,
            transaction: TransactionRow,
        ) -> Result<(), StoreError> {
            self.write_failure.lock().unwrap().check()?;
            self.rows.lock().unwrap().push(transaction);
            Ok(())
        }

        async fn mark_transactions_as_committed(
            &self,
            block_num: u32,
            transaction_ids: Vec<String>,
        ) -> Result<usize, StoreError> {
            self.write_failure.lock().unwrap().check()?;

            let mut rows = self.rows.lock().unwrap();
            let mut updated = 0;
            for row in rows.iter_mut().filter(|row| transaction_ids.contains(&row.id)) {
                row.commit_height = Some(block_num);
                updated += 1;
            }
            Ok(updated)
        }
    }

    fn transaction(id: &str, script_hash: Option<Vec<u8>>) -> TransactionData {
        TransactionData {
            id: id.to_string(),
            output_notes: vec![1, 2, 3],
            script_hash,
            ..Default::default()
        }
    }

    fn create_mock_transaction_store() -> (Arc<MockStore>, TransactionStore<MockStore>) {
        let store = Arc::new(MockStore::default());
        (store.clone(), TransactionStore::new(store))
    }

    #[tokio::test]
    async fn test_scripts_are_fetched_with_a_single_lookup() {
        let (store, tx_store) = create_mock_transaction_store();

        // No row references a script, so no lookup is issued
        tx_store.insert_transaction(transaction("tx-no-script", None)).await.unwrap();
        tx_store.get_transactions(TransactionFilter::All).await.unwrap();
        assert_eq!(store.script_lookups(), 0);

        tx_store.insert_transaction_script(&[9, 9], Some(&[7, 8])).await.unwrap();
        tx_store.insert_transaction_script(&[1, 1], Some(&[5])).await.unwrap();
        for (id, hash) in [("tx1", vec![9, 9]), ("tx2", vec![9, 9]), ("tx3", vec![1, 1])] {
            tx_store.insert_transaction(transaction(id, Some(hash))).await.unwrap();
        }

        let transactions = tx_store.get_transactions(TransactionFilter::All).await.unwrap();
        assert_eq!(transactions.len(), 4);
        assert_eq!(store.script_lookups(), 1);

        let tx3 = transactions.iter().find(|tx| tx.id == "tx3").unwrap();
        assert_eq!(tx3.tx_script.as_deref(), Some("BQ=="));
    }

    #[tokio::test]
    async fn test_script_insert_failures_reach_the_caller() {
        let (store, tx_store) = create_mock_transaction_store();

        store.fail_writes(Failure::Database);
        let result = tx_store.insert_transaction_script(&[9, 9], Some(&[7, 8])).await;
        assert!(matches!(result, Err(StoreError::DatabaseError(_))));

        // A duplicate that slipped past the existence check is not an error
        store.fail_writes(Failure::Duplicate);
        tx_store.insert_transaction_script(&[9, 9], Some(&[7, 8])).await.unwrap();

        // Failing existence check aborts the insert
        store.fail_writes(Failure::None);
        store.fail_reads(Failure::Database);
        let result = tx_store.insert_transaction_script(&[9, 9], Some(&[7, 8])).await;
        assert!(matches!(result, Err(StoreError::DatabaseError(_))));
        assert!(store.scripts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transaction_storage_failures_reach_the_caller() {
        let (store, tx_store) = create_mock_transaction_store();

        store.fail_writes(Failure::Database);
        let result = tx_store.insert_transaction(transaction("tx1", None)).await;
        assert!(matches!(result, Err(StoreError::DatabaseError(_))));

        // Constraint violations on transaction rows are not swallowed
        store.fail_writes(Failure::Duplicate);
        let result = tx_store.insert_transaction(transaction("tx1", None)).await;
        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));

        let result = tx_store.mark_transactions_as_committed(3, &["tx1".to_string()]).await;
        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));

        store.fail_writes(Failure::None);
        tx_store.insert_transaction(transaction("tx1", Some(vec![9, 9]))).await.unwrap();

        store.fail_reads(Failure::Database);
        let result = tx_store.get_transactions(TransactionFilter::All).await;
        assert!(matches!(result, Err(StoreError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_script_lookup_failure_reaches_the_caller() {
        let (store, tx_store) = create_mock_transaction_store();
        tx_store.insert_transaction(transaction("tx1", Some(vec![9, 9]))).await.unwrap();

        store.fail_script_lookups(Failure::Database);
        let result = tx_store.get_transactions(TransactionFilter::Uncommitted).await;
        assert!(matches!(result, Err(StoreError::DatabaseError(_))));
        assert_eq!(store.script_lookups(), 1);
    }
}
