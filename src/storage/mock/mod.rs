//! Mock storage implementation for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{EntityMetadata, EventRecord, StreamAddress};
use crate::storage::{JournalError, JournalStore, Result};

/// Mock journal store that keeps streams and metadata in memory.
///
/// Supports failure injection per entity, an artificial append delay, and
/// counters for how often it was touched and how many appends overlapped.
#[derive(Default)]
pub struct MockJournalStore {
    streams: RwLock<HashMap<StreamAddress, Vec<EventRecord>>>,
    metadata: RwLock<HashMap<String, EntityMetadata>>,
    fail_on_append: RwLock<HashSet<String>>,
    fail_on_query: RwLock<bool>,
    append_delay: RwLock<Option<Duration>>,
    operations: AtomicUsize,
    in_flight: Mutex<HashMap<String, usize>>,
    max_in_flight: Mutex<HashMap<String, usize>>,
}

impl MockJournalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every append for `persistence_id` fail with `Unavailable`.
    pub async fn set_fail_on_append(&self, persistence_id: &str, fail: bool) {
        let mut failing = self.fail_on_append.write().await;
        if fail {
            failing.insert(persistence_id.to_string());
        } else {
            failing.remove(persistence_id);
        }
    }

    /// Make every read fail with `Unavailable`.
    pub async fn set_fail_on_query(&self, fail: bool) {
        *self.fail_on_query.write().await = fail;
    }

    /// Sleep this long inside every append before committing.
    pub async fn set_append_delay(&self, delay: Option<Duration>) {
        *self.append_delay.write().await = delay;
    }

    /// Number of trait calls served so far.
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Largest number of overlapping appends observed for an entity.
    pub fn max_concurrent_appends(&self, persistence_id: &str) -> usize {
        self.max_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(persistence_id)
            .copied()
            .unwrap_or(0)
    }

    /// Largest number of overlapping appends observed across all entities.
    pub fn max_concurrent_appends_total(&self) -> usize {
        self.max_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get("")
            .copied()
            .unwrap_or(0)
    }

    fn enter_append(&self, persistence_id: &str) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let mut max = self.max_in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // "" tracks appends across all entities
        for key in [persistence_id, ""] {
            let current = in_flight.entry(key.to_string()).or_default();
            *current += 1;
            let peak = max.entry(key.to_string()).or_default();
            *peak = (*peak).max(*current);
        }
    }

    fn exit_append(&self, persistence_id: &str) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        for key in [persistence_id, ""] {
            if let Some(current) = in_flight.get_mut(key) {
                *current = current.saturating_sub(1);
            }
        }
    }

    async fn check_query(&self) -> Result<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if *self.fail_on_query.read().await {
            return Err(JournalError::Unavailable("mock query failure".to_string()));
        }
        Ok(())
    }

    async fn commit(&self, stream: StreamAddress, records: Vec<EventRecord>) -> Result<()> {
        let mut streams = self.streams.write().await;

        let mut seen = HashSet::new();
        for record in &records {
            let exists = streams
                .values()
                .flatten()
                .any(|stored| stored.id == record.id);
            if exists || !seen.insert(record.id.as_str()) {
                return Err(JournalError::IntegrityViolation(format!(
                    "duplicate event id '{}'",
                    record.id
                )));
            }
        }

        let mut metadata = self.metadata.write().await;
        let persistence_id = records[0].persistence_id.clone();
        let entry = metadata
            .entry(persistence_id.clone())
            .or_insert_with(|| EntityMetadata::new(persistence_id));
        for record in &records {
            entry.apply(record);
        }

        streams.entry(stream).or_default().extend(records);
        Ok(())
    }
}

#[async_trait]
impl JournalStore for MockJournalStore {
    async fn append_to_stream(
        &self,
        stream: StreamAddress,
        records: Vec<EventRecord>,
    ) -> Result<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if records.is_empty() {
            return Ok(());
        }

        let persistence_id = records[0].persistence_id.clone();
        if self.fail_on_append.read().await.contains(&persistence_id) {
            return Err(JournalError::Unavailable(format!(
                "mock append failure for '{persistence_id}'"
            )));
        }

        self.enter_append(&persistence_id);
        let delay = *self.append_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = self.commit(stream, records).await;
        self.exit_append(&persistence_id);

        result
    }

    async fn query_events(
        &self,
        persistence_id: &str,
        from: u64,
        to: u64,
        limit: u64,
        exclude_deleted: bool,
    ) -> Result<Vec<EventRecord>> {
        self.check_query().await?;

        let stream = StreamAddress::for_persistence_id(persistence_id);
        let streams = self.streams.read().await;
        let mut records: Vec<EventRecord> = streams
            .get(&stream)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.sequence_nr >= from && r.sequence_nr <= to)
                    .filter(|r| !(exclude_deleted && r.is_deleted))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        records.sort_by_key(|r| r.sequence_nr);
        records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(records)
    }

    async fn read_stream(
        &self,
        stream: StreamAddress,
        from_version: u64,
        to_version: u64,
    ) -> Result<Vec<EventRecord>> {
        self.check_query().await?;

        let streams = self.streams.read().await;
        Ok(streams
            .get(&stream)
            .map(|records| {
                records
                    .iter()
                    .zip(1u64..)
                    .filter(|(_, version)| *version >= from_version && *version <= to_version)
                    .map(|(record, _)| record.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_metadata(&self, persistence_id: &str) -> Result<Option<EntityMetadata>> {
        self.check_query().await?;
        Ok(self.metadata.read().await.get(persistence_id).cloned())
    }

    async fn mark_deleted(&self, persistence_id: &str, to_sequence_nr: u64) -> Result<u64> {
        self.check_query().await?;

        let stream = StreamAddress::for_persistence_id(persistence_id);
        let mut streams = self.streams.write().await;
        let mut changed = 0;
        if let Some(records) = streams.get_mut(&stream) {
            for record in records
                .iter_mut()
                .filter(|r| r.persistence_id == persistence_id)
                .filter(|r| r.sequence_nr <= to_sequence_nr && !r.is_deleted)
            {
                record.is_deleted = true;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
