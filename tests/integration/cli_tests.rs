use std::path::Path;

use assert_cmd::Command;
use miden_tx_store::TransactionView;

use crate::{create_test_dir, BINARY_NAME};

fn run(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    Command::cargo_bin(BINARY_NAME).unwrap().current_dir(dir).args(args).assert()
}

fn list_json(dir: &Path, extra_args: &[&str]) -> Vec<TransactionView> {
    let mut args = vec!["tx", "--list", "--json"];
    args.extend_from_slice(extra_args);

    let output = run(dir, &args).success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn record(dir: &Path, id: &str, extra_args: &[&str]) {
    let mut args = vec![
        "record",
        "--id",
        id,
        "--account-id",
        "0x9a7c2b0e1f3d4a6b",
        "--init-account-state",
        "0x01",
        "--final-account-state",
        "0x02",
        "--output-notes",
        "0x010203",
        "--block-num",
        "4",
    ];
    args.extend_from_slice(extra_args);

    run(dir, &args).success();
}

// INIT TESTS
// ================================================================================================

#[test]
fn test_init_creates_config_once() {
    let dir = create_test_dir();

    run(&dir, &["init"]).success();
    assert!(dir.join("miden-tx-store.toml").exists());

    // The config file is never overwritten
    run(&dir, &["init"]).failure();
}

#[test]
fn test_commands_require_config() {
    let dir = create_test_dir();

    run(&dir, &["tx", "--list"]).failure();
}

// TRANSACTION TESTS
// ================================================================================================

#[test]
fn test_record_and_list_transactions() {
    let dir = create_test_dir();
    run(&dir, &["init", "--store-path", "txs.sqlite3"]).success();

    assert!(list_json(&dir, &[]).is_empty());

    record(&dir, "tx1", &[]);
    record(&dir, "tx2", &["--script-hash", "0x0909", "--script", "0x0708"]);
    assert!(dir.join("txs.sqlite3").exists());

    let transactions = list_json(&dir, &[]);
    assert_eq!(transactions.len(), 2);

    let tx1 = transactions.iter().find(|tx| tx.id == "tx1").unwrap();
    assert_eq!(tx1.output_notes, "AQID");
    assert_eq!(tx1.script_hash, None);
    assert_eq!(tx1.tx_script, None);

    let tx2 = transactions.iter().find(|tx| tx.id == "tx2").unwrap();
    assert_eq!(tx2.script_hash.as_deref(), Some("CQk="));
    assert_eq!(tx2.tx_script.as_deref(), Some("Bwg="));

    // Table output works as well
    run(&dir, &["tx"]).success();
}

#[test]
fn test_commit_transactions() {
    let dir = create_test_dir();
    run(&dir, &["init", "--store-path", "txs.sqlite3"]).success();

    record(&dir, "tx1", &[]);
    record(&dir, "tx2", &[]);
    record(&dir, "tx3", &["--commit-height", "2"]);

    assert_eq!(list_json(&dir, &["--uncommitted"]).len(), 2);

    run(&dir, &["commit", "--block-num", "9", "tx1"]).success();

    let uncommitted = list_json(&dir, &["--uncommitted"]);
    assert_eq!(uncommitted.len(), 1);
    assert_eq!(uncommitted[0].id, "tx2");

    let committed = list_json(&dir, &["--ids", "tx1", "tx3"]);
    assert_eq!(committed.len(), 2);
    assert!(committed.iter().all(|tx| tx.commit_height.is_some()));
}

// SCRIPT TESTS
// ================================================================================================

#[test]
fn test_script_insertion_is_idempotent() {
    let dir = create_test_dir();
    run(&dir, &["init", "--store-path", "txs.sqlite3"]).success();

    run(&dir, &["script", "--hash", "0x0909", "--program", "0x0708"]).success();
    run(&dir, &["script", "--hash", "0x0909", "--program", "0x0708"]).success();

    // A transaction referencing the script picks it up without re-sending the program
    record(&dir, "tx1", &["--script-hash", "0x0909"]);
    let transactions = list_json(&dir, &[]);
    assert_eq!(transactions[0].tx_script.as_deref(), Some("Bwg="));
}

#[test]
fn test_script_insertion_requires_hash() {
    let dir = create_test_dir();
    run(&dir, &["init", "--store-path", "txs.sqlite3"]).success();

    run(&dir, &["script", "--hash", "", "--program", "0x0708"]).failure();
}
