//! Write pipeline.
//!
//! Groups atomic writes by entity, appends each group as one storage
//! operation, runs all groups concurrently, and maps group outcomes back onto
//! the caller's requests in input order.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use super::{Journal, WriteResult};
use crate::error::Result;
use crate::model::{AtomicWrite, EventRecord, StreamAddress};

/// All writes for one entity within a single batch.
pub(crate) struct EntityGroup {
    pub(crate) persistence_id: String,
    pub(crate) stream: StreamAddress,
    /// Positions of the member requests in the original batch.
    pub(crate) requests: Vec<usize>,
    pub(crate) records: Vec<EventRecord>,
}

/// Partition writes by persistence id, preserving first-appearance order of
/// entities and caller order of events within an entity.
pub(crate) fn group_by_entity(messages: Vec<AtomicWrite>, now_millis: i64) -> Vec<EntityGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<EntityGroup> = Vec::new();

    for (position, write) in messages.into_iter().enumerate() {
        let persistence_id = write.persistence_id().to_string();
        let slot = *index.entry(persistence_id.clone()).or_insert_with(|| {
            groups.push(EntityGroup {
                stream: StreamAddress::for_persistence_id(&persistence_id),
                persistence_id: persistence_id.clone(),
                requests: Vec::new(),
                records: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.requests.push(position);
        group.records.extend(
            write
                .into_payload()
                .into_iter()
                .map(|repr| EventRecord::from_repr(repr, now_millis)),
        );
    }

    groups
}

impl Journal {
    pub(crate) async fn write_batch(&self, messages: Vec<AtomicWrite>) -> Result<Vec<WriteResult>> {
        let request_count = messages.len();
        if request_count == 0 {
            return Ok(Vec::new());
        }

        let store = self.store().await?;
        let groups = group_by_entity(messages, chrono::Utc::now().timestamp_millis());
        debug!(
            requests = request_count,
            entities = groups.len(),
            "Writing journal batch"
        );

        let appends = groups.into_iter().map(|group| async move {
            let _guard = self.entity_locks.lock(&group.persistence_id).await;
            let outcome = store.append_to_stream(group.stream, group.records).await;
            if let Err(ref e) = outcome {
                warn!(
                    persistence_id = %group.persistence_id,
                    error = %e,
                    "Journal append failed"
                );
            }
            (group.requests, outcome.map_err(Arc::new))
        });

        let mut results: Vec<WriteResult> = vec![Ok(()); request_count];
        for (requests, outcome) in join_all(appends).await {
            for position in requests {
                results[position] = outcome.clone();
            }
        }

        Ok(results)
    }
}
