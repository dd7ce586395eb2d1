//! Shared storage integration tests.
//!
//! Tests the JournalStore interface against all implementations.
//! Each implementation module imports these test functions and runs them.

pub mod journal_store_tests;
