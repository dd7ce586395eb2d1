//! Event journal.
//!
//! `Journal` serves the host framework's write, replay, highest-sequence and
//! delete requests on top of a `JournalStore`. The store is created lazily on
//! first use from `JournalSettings` and reused for the journal's lifetime.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::config::{Config, JournalSettings};
use crate::error::{JournalError, Result};
use crate::model::{AtomicWrite, PersistentRepr};
use crate::storage::{self, JournalStore};

mod delete;
mod entity_lock;
mod replay;
mod write;

use entity_lock::EntityLocks;

/// Outcome of one atomic write. Requests that shared a failed entity group
/// share the same error.
pub type WriteResult = std::result::Result<(), Arc<JournalError>>;

/// Calls the host framework makes into a journal.
#[async_trait]
pub trait AsyncWriteJournal: Send + Sync {
    /// Persist a batch of atomic writes.
    ///
    /// Returns one result per request, in input order. Writes for different
    /// entities succeed or fail independently. The outer error is reserved for
    /// failures that prevent the batch from starting at all, such as storage
    /// initialization.
    async fn write_messages(&self, messages: Vec<AtomicWrite>) -> Result<Vec<WriteResult>>;

    /// Deliver an entity's non-deleted events with sequence numbers in
    /// `[from_sequence_nr, to_sequence_nr]`, ascending, at most `max` of them.
    ///
    /// `sender` is copied onto every delivered representation.
    async fn replay_messages(
        &self,
        sender: Option<&str>,
        persistence_id: &str,
        from_sequence_nr: u64,
        to_sequence_nr: u64,
        max: u64,
        recovery_callback: &mut (dyn FnMut(PersistentRepr) + Send),
    ) -> Result<()>;

    /// Highest sequence number ever written for the entity, or 0.
    ///
    /// `from_sequence_nr` is a hint and does not affect the answer.
    async fn read_highest_sequence_nr(
        &self,
        persistence_id: &str,
        from_sequence_nr: u64,
    ) -> Result<u64>;

    /// Logically delete the entity's events up to `to_sequence_nr` inclusive.
    async fn delete_messages_to(&self, persistence_id: &str, to_sequence_nr: u64) -> Result<()>;
}

/// Journal backed by a lazily-initialized `JournalStore`.
///
/// At most one append per entity is in flight at a time on a given journal;
/// appends for different entities run concurrently.
pub struct Journal {
    settings: JournalSettings,
    store: OnceCell<Arc<dyn JournalStore>>,
    entity_locks: EntityLocks,
}

impl Journal {
    /// Create a journal that connects on first use.
    pub fn new(settings: JournalSettings) -> Self {
        Self {
            settings,
            store: OnceCell::new(),
            entity_locks: EntityLocks::default(),
        }
    }

    /// Create a journal from the `journal` section of application config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.journal.clone())
    }

    /// Create a journal over an already-initialized store.
    ///
    /// `settings` describe the store and are reported by `settings()`; they
    /// are not used to connect.
    pub fn with_store(settings: JournalSettings, store: Arc<dyn JournalStore>) -> Self {
        Self {
            settings,
            store: OnceCell::from(store),
            entity_locks: EntityLocks::default(),
        }
    }

    pub fn settings(&self) -> &JournalSettings {
        &self.settings
    }

    /// Whether the storage handle has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.store.initialized()
    }

    /// The storage handle, created exactly once even under concurrent first use.
    pub(crate) async fn store(&self) -> Result<&Arc<dyn JournalStore>> {
        self.store
            .get_or_try_init(|| storage::init_storage(&self.settings))
            .await
    }
}

#[async_trait]
impl AsyncWriteJournal for Journal {
    async fn write_messages(&self, messages: Vec<AtomicWrite>) -> Result<Vec<WriteResult>> {
        self.write_batch(messages).await
    }

    async fn replay_messages(
        &self,
        sender: Option<&str>,
        persistence_id: &str,
        from_sequence_nr: u64,
        to_sequence_nr: u64,
        max: u64,
        recovery_callback: &mut (dyn FnMut(PersistentRepr) + Send),
    ) -> Result<()> {
        self.replay(
            sender,
            persistence_id,
            from_sequence_nr,
            to_sequence_nr,
            max,
            recovery_callback,
        )
        .await
    }

    async fn read_highest_sequence_nr(
        &self,
        persistence_id: &str,
        _from_sequence_nr: u64,
    ) -> Result<u64> {
        self.highest_sequence_nr(persistence_id).await
    }

    async fn delete_messages_to(&self, persistence_id: &str, to_sequence_nr: u64) -> Result<()> {
        self.delete_to(persistence_id, to_sequence_nr).await
    }
}
