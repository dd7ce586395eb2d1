//! Unified SQL storage implementations.
//!
//! This module provides the shared `JournalStore` implementation for SQL-based
//! storage backends (PostgreSQL, SQLite). The implementation is parameterized
//! by database type using the `SqlDatabase` trait.

mod journal_store;
mod query;

pub use journal_store::SqlJournalStore;
pub use query::SqlDatabase;

#[cfg(feature = "postgres")]
pub mod postgres {
    //! PostgreSQL database backend.

    use sea_query::PostgresQueryBuilder;
    use sqlx::postgres::PgPoolOptions;
    use sqlx::PgPool;

    use crate::storage::schema::CREATE_POSTGRES_SCHEMA;
    use crate::storage::Result;

    /// PostgreSQL database marker type.
    pub struct Postgres;

    impl super::SqlDatabase for Postgres {
        type Pool = PgPool;

        const BEGIN_WRITE: &'static str = "BEGIN";
        const GREATEST: &'static str = "GREATEST";
        const CREATE_SCHEMA: &'static str = CREATE_POSTGRES_SCHEMA;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_update(stmt: sea_query::UpdateStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }
    }

    /// PostgreSQL journal store.
    pub type PostgresJournalStore = super::SqlJournalStore<Postgres>;

    /// Open a connection pool for a `postgres://` connection string.
    pub async fn connect(connection_string: &str) -> Result<PgPool> {
        let pool = PgPoolOptions::new().connect(connection_string).await?;
        Ok(pool)
    }
}

#[cfg(feature = "sqlite")]
pub mod sqlite {
    //! SQLite database backend.

    use std::str::FromStr;

    use sea_query::SqliteQueryBuilder;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;

    use crate::storage::schema::CREATE_SQLITE_SCHEMA;
    use crate::storage::Result;

    /// SQLite database marker type.
    pub struct Sqlite;

    impl super::SqlDatabase for Sqlite {
        type Pool = SqlitePool;

        // IMMEDIATE takes the write lock upfront so concurrent appends queue on
        // the busy timeout instead of deadlocking on a shared-to-exclusive upgrade.
        const BEGIN_WRITE: &'static str = "BEGIN IMMEDIATE";
        const GREATEST: &'static str = "MAX";
        const CREATE_SCHEMA: &'static str = CREATE_SQLITE_SCHEMA;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_update(stmt: sea_query::UpdateStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }
    }

    /// SQLite journal store.
    pub type SqliteJournalStore = super::SqlJournalStore<Sqlite>;

    fn is_in_memory(connection_string: &str) -> bool {
        connection_string.contains(":memory:") || connection_string.contains("mode=memory")
    }

    /// Open a connection pool for a `sqlite:` connection string.
    ///
    /// An in-memory database lives and dies with its connection, so it gets a
    /// single connection that is never recycled.
    pub async fn connect(connection_string: &str) -> Result<SqlitePool> {
        let options = SqliteConnectOptions::from_str(connection_string)?.create_if_missing(true);

        let pool_options = if is_in_memory(connection_string) {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options.connect_with(options).await?;
        Ok(pool)
    }

}
