//! JournalStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::model::{EntityMetadata, EventRecord, StreamAddress};

/// Interface to the append-only storage engine backing the journal.
///
/// Every append updates the entity's `EntityMetadata` row in the same atomic
/// unit, so a reader sees either both the new events and the raised highest
/// sequence number, or neither.
///
/// Implementations:
/// - `SqliteJournalStore`: SQLite storage
/// - `PostgresJournalStore`: PostgreSQL storage
/// - `MockJournalStore`: In-memory mock for testing
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Append records to an entity's stream and commit.
    ///
    /// All records belong to the entity addressed by `stream`. Either every
    /// record is stored or none is. A record whose id already exists fails the
    /// whole append with `IntegrityViolation`. Empty input is a no-op.
    async fn append_to_stream(&self, stream: StreamAddress, records: Vec<EventRecord>)
        -> Result<()>;

    /// Retrieve an entity's records with `from <= sequence_nr <= to`,
    /// ordered by sequence number ascending, at most `limit` of them.
    async fn query_events(
        &self,
        persistence_id: &str,
        from: u64,
        to: u64,
        limit: u64,
        exclude_deleted: bool,
    ) -> Result<Vec<EventRecord>>;

    /// Raw read of a stream in append order, versions in `[from, to]`.
    ///
    /// Versions start at 1. Deleted records are included.
    async fn read_stream(
        &self,
        stream: StreamAddress,
        from_version: u64,
        to_version: u64,
    ) -> Result<Vec<EventRecord>>;

    /// Look up the metadata row of an entity.
    async fn query_metadata(&self, persistence_id: &str) -> Result<Option<EntityMetadata>>;

    /// Flag every record of the entity with `sequence_nr <= to_sequence_nr`
    /// as deleted. Returns how many records changed state.
    async fn mark_deleted(&self, persistence_id: &str, to_sequence_nr: u64) -> Result<u64>;
}
