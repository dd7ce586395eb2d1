//! Durable event record.

use super::PersistentRepr;

/// Deterministic identity of the event at `sequence_nr` for an entity.
///
/// The numeric suffix after the last `_` keeps distinct pairs distinct even
/// when the persistence id itself contains underscores.
pub fn record_id(persistence_id: &str, sequence_nr: u64) -> String {
    format!("{persistence_id}_{sequence_nr}")
}

/// One persisted event for one entity at one sequence number.
///
/// Created only by the write pipeline; `is_deleted` is the only field that
/// ever changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: String,
    pub persistence_id: String,
    pub sequence_nr: u64,
    pub is_deleted: bool,
    pub payload: Vec<u8>,
    pub manifest: String,
    pub writer_uuid: String,
    pub timestamp: i64,
}

impl EventRecord {
    /// Convert a host representation into a fresh, non-deleted record.
    ///
    /// A zero timestamp is replaced with `now_millis`.
    pub fn from_repr(repr: PersistentRepr, now_millis: i64) -> Self {
        let timestamp = if repr.timestamp == 0 {
            now_millis
        } else {
            repr.timestamp
        };
        Self {
            id: record_id(&repr.persistence_id, repr.sequence_nr),
            persistence_id: repr.persistence_id,
            sequence_nr: repr.sequence_nr,
            is_deleted: false,
            payload: repr.payload,
            manifest: repr.manifest,
            writer_uuid: repr.writer_uuid,
            timestamp,
        }
    }

    /// Rebuild the host representation delivered on replay.
    pub fn into_repr(self, sender: Option<&str>) -> PersistentRepr {
        PersistentRepr {
            persistence_id: self.persistence_id,
            sequence_nr: self.sequence_nr,
            payload: self.payload,
            manifest: self.manifest,
            writer_uuid: self.writer_uuid,
            timestamp: self.timestamp,
            is_deleted: self.is_deleted,
            sender: sender.map(str::to_string),
        }
    }
}
