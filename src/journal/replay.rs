//! Replay pipeline and highest-sequence-number query.

use tracing::debug;

use super::Journal;
use crate::error::Result;
use crate::model::PersistentRepr;
use crate::storage::clamp_limit;

impl Journal {
    pub(crate) async fn replay(
        &self,
        sender: Option<&str>,
        persistence_id: &str,
        from_sequence_nr: u64,
        to_sequence_nr: u64,
        max: u64,
        recovery_callback: &mut (dyn FnMut(PersistentRepr) + Send),
    ) -> Result<()> {
        if max == 0 || from_sequence_nr > to_sequence_nr {
            return Ok(());
        }

        let store = self.store().await?;
        let records = store
            .query_events(
                persistence_id,
                from_sequence_nr,
                to_sequence_nr,
                clamp_limit(max),
                true,
            )
            .await?;

        debug!(
            persistence_id,
            from_sequence_nr,
            to_sequence_nr,
            delivered = records.len(),
            "Replaying journal events"
        );

        for record in records {
            recovery_callback(record.into_repr(sender));
        }

        Ok(())
    }

    pub(crate) async fn highest_sequence_nr(&self, persistence_id: &str) -> Result<u64> {
        let store = self.store().await?;
        let highest = store
            .query_metadata(persistence_id)
            .await?
            .map(|meta| meta.highest_sequence_nr)
            .unwrap_or(0);
        Ok(highest)
    }
}
