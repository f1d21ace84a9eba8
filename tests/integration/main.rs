use std::{env::temp_dir, fs, path::PathBuf};

use uuid::Uuid;

mod cli_tests;

/// Binary name used by the CLI tests
pub const BINARY_NAME: &str = "miden-tx-store";

/// Creates an empty directory in the temp dir to run a CLI test in.
pub fn create_test_dir() -> PathBuf {
    let mut dir = temp_dir();
    dir.push(format!("miden-tx-store-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}
