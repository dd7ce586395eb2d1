//! Deletion pipeline.

use tracing::debug;

use super::Journal;
use crate::error::Result;

impl Journal {
    /// Soft-delete an entity's events up to and including `to_sequence_nr`.
    ///
    /// Scoped to `persistence_id`; other entities and the metadata index are
    /// left untouched.
    pub(crate) async fn delete_to(&self, persistence_id: &str, to_sequence_nr: u64) -> Result<()> {
        let store = self.store().await?;
        let changed = store.mark_deleted(persistence_id, to_sequence_nr).await?;
        debug!(persistence_id, to_sequence_nr, changed, "Marked journal events deleted");
        Ok(())
    }
}
