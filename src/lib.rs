//! Client-side persistence for proven Miden transactions.
//!
//! Transactions and the scripts they executed are kept in two tables. The
//! [`store::TransactionStore`] inserts them, deduplicating scripts by hash, and lists them back
//! with binary fields encoded as base64.

extern crate alloc;

pub mod config;
pub mod store;

pub use store::{
    StoreError, TransactionData, TransactionFilter, TransactionStatus, TransactionStore,
    TransactionView,
};
