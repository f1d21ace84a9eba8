use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};

use crate::store::StoreError;

// STORE ERROR
// ================================================================================================

impl From<rusqlite_migration::Error> for StoreError {
    fn from(value: rusqlite_migration::Error) -> Self {
        Self::MigrationError(value.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            // Only key uniqueness is reported as a duplicate, other constraints are hard failures
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
                    || err.extended_code == SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::ConstraintViolation(value.to_string())
            },
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
            | rusqlite::Error::InvalidColumnIndex(_)
            | rusqlite::Error::InvalidColumnType(..) => Self::ParsingError(value.to_string()),
            rusqlite::Error::InvalidParameterName(_)
            | rusqlite::Error::InvalidColumnName(_)
            | rusqlite::Error::StatementChangedRows(_)
            | rusqlite::Error::ExecuteReturnedResults
            | rusqlite::Error::InvalidQuery
            | rusqlite::Error::MultipleStatement
            | rusqlite::Error::InvalidParameterCount(..)
            | rusqlite::Error::QueryReturnedNoRows => Self::QueryError(value.to_string()),
            _ => Self::DatabaseError(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::store::StoreError;

    fn execute(conn: &Connection, sql: &str) -> StoreError {
        conn.execute(sql, []).unwrap_err().into()
    }

    #[test]
    fn only_key_uniqueness_is_a_constraint_violation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE scripts (hash TEXT NOT NULL, name TEXT UNIQUE, PRIMARY KEY (hash))",
        )
        .unwrap();
        conn.execute("INSERT INTO scripts (hash, name) VALUES ('a', 'x')", []).unwrap();

        let duplicate_key = execute(&conn, "INSERT INTO scripts (hash) VALUES ('a')");
        assert!(matches!(duplicate_key, StoreError::ConstraintViolation(_)));

        let duplicate_unique = execute(&conn, "INSERT INTO scripts (hash, name) VALUES ('b', 'x')");
        assert!(matches!(duplicate_unique, StoreError::ConstraintViolation(_)));

        let missing_key = execute(&conn, "INSERT INTO scripts (hash) VALUES (NULL)");
        assert!(matches!(missing_key, StoreError::DatabaseError(_)));
    }
}
