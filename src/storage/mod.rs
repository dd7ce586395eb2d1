//! Storage implementations.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::{JournalSettings, StorageType};

pub mod journal_store;
pub mod schema;
pub mod sql;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use crate::error::{JournalError, Result};
pub use journal_store::JournalStore;

#[cfg(feature = "postgres")]
pub use sql::postgres::PostgresJournalStore;
#[cfg(feature = "sqlite")]
pub use sql::sqlite::SqliteJournalStore;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockJournalStore;

/// Convert a sequence number for storage in a signed 64-bit column.
pub(crate) fn to_db_sequence(sequence_nr: u64) -> Result<i64> {
    i64::try_from(sequence_nr).map_err(|_| JournalError::SequenceOutOfRange(sequence_nr))
}

/// Convert a query bound, saturating at the largest storable value.
pub(crate) fn saturate_db_sequence(bound: u64) -> i64 {
    i64::try_from(bound).unwrap_or(i64::MAX)
}

/// Clamp a requested maximum count to the largest count a SQL `LIMIT` takes.
pub(crate) fn clamp_limit(max: u64) -> u64 {
    max.min(i64::MAX as u64)
}

/// Initialize storage based on journal settings.
///
/// Connects to the configured backend and creates schema objects according
/// to `auto_create_schema_objects`.
pub async fn init_storage(settings: &JournalSettings) -> Result<Arc<dyn JournalStore>> {
    info!("Journal storage: {:?}", settings.storage_type);

    if settings.connection_string.trim().is_empty() {
        error!("Journal connection string is empty");
        return Err(JournalError::Configuration(
            "journal connection string is empty".to_string(),
        ));
    }

    match settings.storage_type {
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            let pool = sql::sqlite::connect(&settings.connection_string).await?;
            let store = SqliteJournalStore::new(pool);
            store.init_schema(settings.auto_create_schema_objects).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageType::Sqlite => {
            error!("SQLite storage requested but 'sqlite' feature is not enabled");
            Err(JournalError::Configuration(
                "SQLite feature not enabled".to_string(),
            ))
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            let pool = sql::postgres::connect(&settings.connection_string).await?;
            let store = PostgresJournalStore::new(pool);
            store.init_schema(settings.auto_create_schema_objects).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StorageType::Postgres => {
            error!("PostgreSQL storage requested but 'postgres' feature is not enabled");
            Err(JournalError::Configuration(
                "PostgreSQL feature not enabled".to_string(),
            ))
        }
    }
}
