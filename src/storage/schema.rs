//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Raw append-only event table.
#[derive(Iden)]
pub enum JournalEvents {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "stream_id"]
    StreamId,
    #[iden = "version"]
    Version,
    #[iden = "persistence_id"]
    PersistenceId,
    #[iden = "sequence_nr"]
    SequenceNr,
    #[iden = "is_deleted"]
    IsDeleted,
    #[iden = "payload"]
    Payload,
    #[iden = "manifest"]
    Manifest,
    #[iden = "writer_uuid"]
    WriterUuid,
    #[iden = "written_at"]
    WrittenAt,
}

/// Per-entity metadata index.
#[derive(Iden)]
pub enum JournalMetadata {
    Table,
    #[iden = "persistence_id"]
    PersistenceId,
    #[iden = "stream_id"]
    StreamId,
    #[iden = "highest_sequence_nr"]
    HighestSequenceNr,
}

/// Columns selected whenever a full `EventRecord` is read back.
pub const RECORD_COLUMNS: [JournalEvents; 8] = [
    JournalEvents::Id,
    JournalEvents::PersistenceId,
    JournalEvents::SequenceNr,
    JournalEvents::IsDeleted,
    JournalEvents::Payload,
    JournalEvents::Manifest,
    JournalEvents::WriterUuid,
    JournalEvents::WrittenAt,
];

/// SQLite DDL for the journal tables.
pub const CREATE_SQLITE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS journal_events (
    id TEXT NOT NULL PRIMARY KEY,
    stream_id TEXT NOT NULL,
    version INTEGER NOT NULL,
    persistence_id TEXT NOT NULL,
    sequence_nr INTEGER NOT NULL,
    is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
    payload BLOB NOT NULL,
    manifest TEXT NOT NULL,
    writer_uuid TEXT NOT NULL,
    written_at INTEGER NOT NULL,
    UNIQUE (stream_id, version)
);

CREATE INDEX IF NOT EXISTS idx_journal_events_persistence_id
    ON journal_events(persistence_id, sequence_nr);

CREATE TABLE IF NOT EXISTS journal_metadata (
    persistence_id TEXT NOT NULL PRIMARY KEY,
    stream_id TEXT NOT NULL,
    highest_sequence_nr INTEGER NOT NULL
);
"#;

/// PostgreSQL DDL for the journal tables.
pub const CREATE_POSTGRES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS journal_events (
    id TEXT NOT NULL PRIMARY KEY,
    stream_id TEXT NOT NULL,
    version BIGINT NOT NULL,
    persistence_id TEXT NOT NULL,
    sequence_nr BIGINT NOT NULL,
    is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
    payload BYTEA NOT NULL,
    manifest TEXT NOT NULL,
    writer_uuid TEXT NOT NULL,
    written_at BIGINT NOT NULL,
    UNIQUE (stream_id, version)
);

CREATE INDEX IF NOT EXISTS idx_journal_events_persistence_id
    ON journal_events(persistence_id, sequence_nr);

CREATE TABLE IF NOT EXISTS journal_metadata (
    persistence_id TEXT NOT NULL PRIMARY KEY,
    stream_id TEXT NOT NULL,
    highest_sequence_nr BIGINT NOT NULL
);
"#;
