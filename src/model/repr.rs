//! Host-facing persistent representation and atomic write batches.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{JournalError, Result};

/// One event as exchanged with the host framework.
///
/// The payload is opaque: the journal stores and returns it unchanged. The
/// manifest is a type hint the caller uses to pick a deserializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentRepr {
    pub persistence_id: String,
    pub sequence_nr: u64,
    pub payload: Vec<u8>,
    pub manifest: String,
    pub writer_uuid: String,
    /// Unix milliseconds. Zero means "stamp on write".
    pub timestamp: i64,
    pub is_deleted: bool,
    /// Reference of whoever awaits acknowledgement. Never persisted.
    pub sender: Option<String>,
}

impl PersistentRepr {
    pub fn new(persistence_id: impl Into<String>, sequence_nr: u64, payload: Vec<u8>) -> Self {
        Self {
            persistence_id: persistence_id.into(),
            sequence_nr,
            payload,
            manifest: String::new(),
            writer_uuid: String::new(),
            timestamp: 0,
            is_deleted: false,
            sender: None,
        }
    }

    /// Build a representation whose payload is the JSON encoding of `value`.
    ///
    /// The manifest is set to the Rust type name of `T`.
    pub fn from_json<T: Serialize>(
        persistence_id: impl Into<String>,
        sequence_nr: u64,
        value: &T,
    ) -> Result<Self> {
        let payload = serde_json::to_vec(value)?;
        Ok(Self::new(persistence_id, sequence_nr, payload).with_manifest(std::any::type_name::<T>()))
    }

    /// Decode the payload as JSON.
    pub fn payload_json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    pub fn with_writer_uuid(mut self, writer_uuid: impl Into<String>) -> Self {
        self.writer_uuid = writer_uuid.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

/// A batch of events for a single entity that is appended as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicWrite {
    payload: Vec<PersistentRepr>,
}

impl AtomicWrite {
    /// Validate and wrap a batch.
    ///
    /// The batch must be non-empty, every event must belong to the same
    /// entity, and sequence numbers must start at 1 or above and be strictly
    /// ascending.
    pub fn new(payload: Vec<PersistentRepr>) -> Result<Self> {
        let first = payload
            .first()
            .ok_or_else(|| JournalError::InvalidWrite("atomic write has no events".to_string()))?;

        if let Some(other) = payload
            .iter()
            .find(|repr| repr.persistence_id != first.persistence_id)
        {
            return Err(JournalError::InvalidWrite(format!(
                "atomic write mixes persistence ids '{}' and '{}'",
                first.persistence_id, other.persistence_id
            )));
        }

        if payload.iter().any(|repr| repr.sequence_nr == 0) {
            return Err(JournalError::InvalidWrite(format!(
                "atomic write for '{}' contains sequence number 0",
                first.persistence_id
            )));
        }

        if let Some(pair) = payload
            .windows(2)
            .find(|pair| pair[1].sequence_nr <= pair[0].sequence_nr)
        {
            return Err(JournalError::InvalidWrite(format!(
                "atomic write for '{}' is not strictly ascending: {} then {}",
                first.persistence_id, pair[0].sequence_nr, pair[1].sequence_nr
            )));
        }

        Ok(Self { payload })
    }

    /// Convenience for the common single-event case.
    pub fn single(repr: PersistentRepr) -> Result<Self> {
        Self::new(vec![repr])
    }

    pub fn persistence_id(&self) -> &str {
        &self.payload[0].persistence_id
    }

    /// Sequence number of the first event; the smallest in the batch.
    pub fn lowest_sequence_nr(&self) -> u64 {
        self.payload[0].sequence_nr
    }

    /// Sequence number of the last event; the largest in the batch.
    pub fn highest_sequence_nr(&self) -> u64 {
        self.payload[self.payload.len() - 1].sequence_nr
    }

    pub fn payload(&self) -> &[PersistentRepr] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<PersistentRepr> {
        self.payload
    }
}
