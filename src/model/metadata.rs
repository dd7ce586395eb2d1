//! Per-entity metadata index row.

use super::{EventRecord, StreamAddress};

/// Summary of one entity's history, maintained alongside every append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    pub persistence_id: String,
    pub stream: StreamAddress,
    pub highest_sequence_nr: u64,
}

impl EntityMetadata {
    /// Empty row for an entity that has not been appended to yet.
    pub fn new(persistence_id: impl Into<String>) -> Self {
        let persistence_id = persistence_id.into();
        Self {
            stream: StreamAddress::for_persistence_id(&persistence_id),
            persistence_id,
            highest_sequence_nr: 0,
        }
    }

    /// Fold an appended record into the summary. Never lowers the highest
    /// sequence number; deleted records count too.
    pub fn apply(&mut self, record: &EventRecord) {
        if record.sequence_nr > self.highest_sequence_nr {
            self.highest_sequence_nr = record.sequence_nr;
        }
    }
}
