//! Chronicle - durable event journal
//!
//! An append-only event journal for event-sourced actors. Each entity's events
//! are stored under its persistence id, replayed in sequence order on recovery,
//! and logically deleted up to a sequence number once snapshotted.

pub mod config;
pub mod error;
pub mod journal;
pub mod model;
pub mod storage;
pub mod utils;

pub use error::{JournalError, Result};
pub use journal::{AsyncWriteJournal, Journal, WriteResult};
