use alloc::{
    collections::BTreeSet,
    rc::Rc,
    string::{String, ToString},
    vec::Vec,
};

use rusqlite::{params, types::Value, Connection, OptionalExtension};

use super::SqliteStore;
use crate::store::{StoreError, TransactionFilter, TransactionRow, TransactionScriptRow};

pub(crate) const INSERT_TRANSACTION_QUERY: &str =
    "INSERT INTO transactions (id, account_id, init_account_state, final_account_state, \
    input_notes, output_notes, script_hash, block_num, commit_height) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

// No conflict clause: duplicates must surface as constraint violations to the caller
pub(crate) const INSERT_TRANSACTION_SCRIPT_QUERY: &str =
    "INSERT INTO transaction_scripts (script_hash, program) VALUES (?, ?)";

const SCRIPTS_QUERY: &str = "SELECT script_hash, program FROM transaction_scripts";

// TRANSACTIONS FILTERS
// ================================================================================================

impl TransactionFilter {
    /// Returns a [String] containing the query for this Filter
    pub fn to_query(&self) -> String {
        const QUERY: &str = "SELECT id, account_id, init_account_state, final_account_state, \
            input_notes, output_notes, script_hash, block_num, commit_height FROM transactions";
        match self {
            TransactionFilter::All => QUERY.to_string(),
            TransactionFilter::Uncommitted => format!("{QUERY} WHERE commit_height IS NULL"),
            TransactionFilter::Ids(_) => format!("{QUERY} WHERE id IN rarray(?)"),
        }
    }
}

// TRANSACTIONS
// ================================================================================================

impl SqliteStore {
    /// Retrieves the transaction rows matching [TransactionFilter].
    pub(crate) fn get_transaction_rows(
        conn: &mut Connection,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionRow>, StoreError> {
        let mut stmt = conn.prepare(&filter.to_query())?;

        let rows = match filter {
            TransactionFilter::Ids(ids) => {
                let ids = ids.iter().cloned().map(Value::Text).collect::<Vec<_>>();
                stmt.query_map(params![Rc::new(ids)], parse_transaction_columns)?
                    .collect::<Result<Vec<_>, _>>()?
            },
            _ => stmt.query_map([], parse_transaction_columns)?.collect::<Result<Vec<_>, _>>()?,
        };

        Ok(rows)
    }

    /// Retrieves every script whose hash is part of `script_hashes` in a single query.
    pub(crate) fn get_transaction_scripts(
        conn: &mut Connection,
        script_hashes: &BTreeSet<String>,
    ) -> Result<Vec<TransactionScriptRow>, StoreError> {
        let script_hashes = script_hashes.iter().cloned().map(Value::Text).collect::<Vec<_>>();

        Ok(conn
            .prepare(&format!("{SCRIPTS_QUERY} WHERE script_hash IN rarray(?)"))?
            .query_map(params![Rc::new(script_hashes)], parse_script_columns)?
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transaction_script(
        conn: &mut Connection,
        script_hash: &str,
    ) -> Result<Option<TransactionScriptRow>, StoreError> {
        Ok(conn
            .query_row(
                &format!("{SCRIPTS_QUERY} WHERE script_hash = ?"),
                params![script_hash],
                parse_script_columns,
            )
            .optional()?)
    }

    pub(crate) fn insert_transaction_script(
        conn: &mut Connection,
        script: &TransactionScriptRow,
    ) -> Result<(), StoreError> {
        conn.execute(INSERT_TRANSACTION_SCRIPT_QUERY, params![script.script_hash, script.program])?;

        Ok(())
    }

    pub(crate) fn insert_transaction_row(
        conn: &mut Connection,
        transaction: &TransactionRow,
    ) -> Result<(), StoreError> {
        conn.execute(
            INSERT_TRANSACTION_QUERY,
            params![
                transaction.id,
                transaction.account_id,
                transaction.init_account_state,
                transaction.final_account_state,
                transaction.input_notes,
                transaction.output_notes,
                transaction.script_hash,
                transaction.block_num,
                transaction.commit_height,
            ],
        )?;

        Ok(())
    }

    /// Set the provided transactions as committed
    ///
    /// # Errors
    ///
    /// This function can return an error if any of the updates to the transactions within the
    /// database transaction fail.
    pub(crate) fn mark_transactions_as_committed(
        conn: &mut Connection,
        block_num: u32,
        transactions_to_commit: &[String],
    ) -> Result<usize, StoreError> {
        const QUERY: &str = "UPDATE transactions SET commit_height = ? WHERE id = ?";

        let tx = conn.transaction()?;
        let mut rows = 0;
        for transaction_id in transactions_to_commit {
            rows += tx.execute(QUERY, params![block_num, transaction_id])?;
        }
        tx.commit()?;

        Ok(rows)
    }
}

fn parse_transaction_columns(row: &rusqlite::Row<'_>) -> Result<TransactionRow, rusqlite::Error> {
    Ok(TransactionRow {
        id: row.get(0)?,
        account_id: row.get(1)?,
        init_account_state: row.get(2)?,
        final_account_state: row.get(3)?,
        input_notes: row.get(4)?,
        output_notes: row.get(5)?,
        script_hash: row.get(6)?,
        block_num: row.get(7)?,
        commit_height: row.get(8)?,
    })
}

fn parse_script_columns(
    row: &rusqlite::Row<'_>,
) -> Result<TransactionScriptRow, rusqlite::Error> {
    Ok(TransactionScriptRow { script_hash: row.get(0)?, program: row.get(1)? })
}
