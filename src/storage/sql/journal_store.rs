//! Unified SQL JournalStore implementation.
//!
//! Uses a macro to generate implementations for each SQL backend,
//! eliminating code duplication while maintaining type safety.

use std::marker::PhantomData;

use super::SqlDatabase;

/// SQL-based implementation of JournalStore.
///
/// Events live in `journal_events`, keyed by record id and ordered within a
/// stream by `version`. The `journal_metadata` row of the entity is upserted
/// in the same transaction as every append.
pub struct SqlJournalStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlJournalStore<DB> {
    /// Create a new SQL journal store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &DB::Pool {
        &self.pool
    }
}

/// Macro to implement JournalStore for a specific SQL backend.
macro_rules! impl_journal_store {
    ($db_type:ty, $conn_type:ty, $row_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlJournalStore<$db_type> {
            /// Create the journal tables according to `mode`.
            pub async fn init_schema(
                &self,
                mode: crate::config::AutoCreate,
            ) -> crate::storage::Result<()> {
                if !mode.creates_objects() {
                    tracing::debug!("Schema auto-creation disabled, skipping journal DDL");
                    return Ok(());
                }

                sqlx::raw_sql(<$db_type as SqlDatabase>::CREATE_SCHEMA)
                    .execute(&self.pool)
                    .await?;
                tracing::info!(backend = $feature, ?mode, "Journal schema ready");
                Ok(())
            }

            fn decode_record(
                row: &$row_type,
            ) -> crate::storage::Result<crate::model::EventRecord> {
                use sqlx::Row;

                let sequence_nr: i64 = row.try_get("sequence_nr")?;
                Ok(crate::model::EventRecord {
                    id: row.try_get("id")?,
                    persistence_id: row.try_get("persistence_id")?,
                    sequence_nr: sequence_nr as u64,
                    is_deleted: row.try_get("is_deleted")?,
                    payload: row.try_get("payload")?,
                    manifest: row.try_get("manifest")?,
                    writer_uuid: row.try_get("writer_uuid")?,
                    timestamp: row.try_get("written_at")?,
                })
            }

            /// Insert records and raise the metadata row within an
            /// already-started transaction.
            async fn insert_records(
                conn: &mut $conn_type,
                stream: crate::model::StreamAddress,
                records: &[crate::model::EventRecord],
            ) -> crate::storage::Result<()> {
                use sea_query::{Expr, OnConflict, Query};
                use sqlx::Row;

                use crate::storage::schema::{JournalEvents, JournalMetadata};
                use crate::storage::to_db_sequence;

                let stream_id = stream.to_string();

                let base_version = {
                    let sql = <$db_type as SqlDatabase>::build_select(
                        Query::select()
                            .expr(Expr::col(JournalEvents::Version).max())
                            .from(JournalEvents::Table)
                            .and_where(Expr::col(JournalEvents::StreamId).eq(stream_id.as_str()))
                            .to_owned(),
                    );
                    let row = sqlx::query(&sql).fetch_one(&mut *conn).await?;
                    let max_version: Option<i64> = row.try_get(0)?;
                    max_version.unwrap_or(0)
                };

                let mut highest = 0i64;
                let sql = {
                    let mut insert = Query::insert();
                    insert.into_table(JournalEvents::Table).columns([
                        JournalEvents::Id,
                        JournalEvents::StreamId,
                        JournalEvents::Version,
                        JournalEvents::PersistenceId,
                        JournalEvents::SequenceNr,
                        JournalEvents::IsDeleted,
                        JournalEvents::Payload,
                        JournalEvents::Manifest,
                        JournalEvents::WriterUuid,
                        JournalEvents::WrittenAt,
                    ]);

                    for (offset, record) in records.iter().enumerate() {
                        let sequence_nr = to_db_sequence(record.sequence_nr)?;
                        highest = highest.max(sequence_nr);

                        insert.values_panic([
                            record.id.as_str().into(),
                            stream_id.as_str().into(),
                            (base_version + offset as i64 + 1).into(),
                            record.persistence_id.as_str().into(),
                            sequence_nr.into(),
                            record.is_deleted.into(),
                            record.payload.clone().into(),
                            record.manifest.as_str().into(),
                            record.writer_uuid.as_str().into(),
                            record.timestamp.into(),
                        ]);
                    }

                    <$db_type as SqlDatabase>::build_insert(insert)
                };
                sqlx::query(&sql).execute(&mut *conn).await?;

                let persistence_id = records[0].persistence_id.as_str();
                let raise_highest = format!(
                    "{}(journal_metadata.highest_sequence_nr, excluded.highest_sequence_nr)",
                    <$db_type as SqlDatabase>::GREATEST
                );
                let sql = {
                    let upsert = Query::insert()
                        .into_table(JournalMetadata::Table)
                        .columns([
                            JournalMetadata::PersistenceId,
                            JournalMetadata::StreamId,
                            JournalMetadata::HighestSequenceNr,
                        ])
                        .values_panic([
                            persistence_id.into(),
                            stream_id.as_str().into(),
                            highest.into(),
                        ])
                        .on_conflict(
                            OnConflict::column(JournalMetadata::PersistenceId)
                                .value(JournalMetadata::HighestSequenceNr, Expr::cust(raise_highest))
                                .to_owned(),
                        )
                        .to_owned();

                    <$db_type as SqlDatabase>::build_insert(upsert)
                };
                sqlx::query(&sql).execute(&mut *conn).await?;

                Ok(())
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::JournalStore for SqlJournalStore<$db_type> {
            async fn append_to_stream(
                &self,
                stream: crate::model::StreamAddress,
                records: Vec<crate::model::EventRecord>,
            ) -> crate::storage::Result<()> {
                if records.is_empty() {
                    return Ok(());
                }

                let mut conn = self.pool.acquire().await?;
                sqlx::query(<$db_type as SqlDatabase>::BEGIN_WRITE)
                    .execute(&mut *conn)
                    .await?;

                let outcome = match Self::insert_records(&mut conn, stream, &records).await {
                    Ok(()) => sqlx::query("COMMIT")
                        .execute(&mut *conn)
                        .await
                        .map(|_| ())
                        .map_err(crate::storage::JournalError::from),
                    Err(e) => Err(e),
                };

                // A failed COMMIT can leave the transaction open; the connection
                // must not return to the pool inside it.
                if let Err(e) = outcome {
                    if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                        tracing::warn!(error = %rollback, "Rollback failed, discarding connection");
                        conn.close_on_drop();
                    }
                    return Err(e);
                }

                Ok(())
            }

            async fn query_events(
                &self,
                persistence_id: &str,
                from: u64,
                to: u64,
                limit: u64,
                exclude_deleted: bool,
            ) -> crate::storage::Result<Vec<crate::model::EventRecord>> {
                use sea_query::{Expr, Order, Query};

                use crate::storage::schema::{JournalEvents, RECORD_COLUMNS};
                use crate::storage::{clamp_limit, saturate_db_sequence};

                if limit == 0 || from > to {
                    return Ok(Vec::new());
                }

                let sql = {
                    let mut stmt = Query::select();
                    stmt.columns(RECORD_COLUMNS)
                        .from(JournalEvents::Table)
                        .and_where(Expr::col(JournalEvents::PersistenceId).eq(persistence_id))
                        .and_where(Expr::col(JournalEvents::SequenceNr).gte(saturate_db_sequence(from)))
                        .and_where(Expr::col(JournalEvents::SequenceNr).lte(saturate_db_sequence(to)));
                    if exclude_deleted {
                        stmt.and_where(Expr::col(JournalEvents::IsDeleted).eq(false));
                    }
                    stmt.order_by(JournalEvents::SequenceNr, Order::Asc)
                        .limit(clamp_limit(limit));

                    <$db_type as SqlDatabase>::build_select(stmt)
                };
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

                rows.iter().map(Self::decode_record).collect()
            }

            async fn read_stream(
                &self,
                stream: crate::model::StreamAddress,
                from_version: u64,
                to_version: u64,
            ) -> crate::storage::Result<Vec<crate::model::EventRecord>> {
                use sea_query::{Expr, Order, Query};

                use crate::storage::saturate_db_sequence;
                use crate::storage::schema::{JournalEvents, RECORD_COLUMNS};

                if from_version > to_version {
                    return Ok(Vec::new());
                }

                let sql = {
                    let stmt = Query::select()
                        .columns(RECORD_COLUMNS)
                        .from(JournalEvents::Table)
                        .and_where(Expr::col(JournalEvents::StreamId).eq(stream.to_string()))
                        .and_where(Expr::col(JournalEvents::Version).gte(saturate_db_sequence(from_version)))
                        .and_where(Expr::col(JournalEvents::Version).lte(saturate_db_sequence(to_version)))
                        .order_by(JournalEvents::Version, Order::Asc)
                        .to_owned();

                    <$db_type as SqlDatabase>::build_select(stmt)
                };
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

                rows.iter().map(Self::decode_record).collect()
            }

            async fn query_metadata(
                &self,
                persistence_id: &str,
            ) -> crate::storage::Result<Option<crate::model::EntityMetadata>> {
                use sea_query::{Expr, Query};
                use sqlx::Row;

                use crate::storage::schema::JournalMetadata;

                let sql = {
                    let stmt = Query::select()
                        .columns([
                            JournalMetadata::PersistenceId,
                            JournalMetadata::StreamId,
                            JournalMetadata::HighestSequenceNr,
                        ])
                        .from(JournalMetadata::Table)
                        .and_where(Expr::col(JournalMetadata::PersistenceId).eq(persistence_id))
                        .to_owned();

                    <$db_type as SqlDatabase>::build_select(stmt)
                };
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;

                match row {
                    Some(row) => {
                        let stream_id: String = row.try_get("stream_id")?;
                        let highest: i64 = row.try_get("highest_sequence_nr")?;
                        Ok(Some(crate::model::EntityMetadata {
                            persistence_id: row.try_get("persistence_id")?,
                            stream: stream_id.parse()?,
                            highest_sequence_nr: highest as u64,
                        }))
                    }
                    None => Ok(None),
                }
            }

            async fn mark_deleted(
                &self,
                persistence_id: &str,
                to_sequence_nr: u64,
            ) -> crate::storage::Result<u64> {
                use sea_query::{Expr, Query};

                use crate::storage::saturate_db_sequence;
                use crate::storage::schema::JournalEvents;

                let sql = {
                    let stmt = Query::update()
                        .table(JournalEvents::Table)
                        .value(JournalEvents::IsDeleted, true)
                        .and_where(Expr::col(JournalEvents::PersistenceId).eq(persistence_id))
                        .and_where(
                            Expr::col(JournalEvents::SequenceNr).lte(saturate_db_sequence(to_sequence_nr)),
                        )
                        .and_where(Expr::col(JournalEvents::IsDeleted).eq(false))
                        .to_owned();

                    <$db_type as SqlDatabase>::build_update(stmt)
                };
                let result = sqlx::query(&sql).execute(&self.pool).await?;

                Ok(result.rows_affected())
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_journal_store!(
    super::postgres::Postgres,
    sqlx::PgConnection,
    sqlx::postgres::PgRow,
    "postgres"
);
impl_journal_store!(
    super::sqlite::Sqlite,
    sqlx::SqliteConnection,
    sqlx::sqlite::SqliteRow,
    "sqlite"
);
