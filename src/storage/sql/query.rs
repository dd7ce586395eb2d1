//! SQL database abstraction trait.

/// Trait for SQL database backends.
///
/// This trait abstracts over different SQL databases (PostgreSQL, SQLite)
/// by providing the pool type, dialect fragments, and query building methods.
pub trait SqlDatabase: Send + Sync + 'static {
    /// The connection pool type for this database.
    type Pool: Clone + Send + Sync;

    /// Statement that opens a write transaction.
    const BEGIN_WRITE: &'static str;

    /// Two-argument scalar maximum function.
    const GREATEST: &'static str;

    /// DDL creating the journal tables if they do not exist.
    const CREATE_SCHEMA: &'static str;

    /// Build a SQL query string from a sea-query SELECT statement.
    fn build_select(stmt: sea_query::SelectStatement) -> String;

    /// Build a SQL query string from a sea-query INSERT statement.
    fn build_insert(stmt: sea_query::InsertStatement) -> String;

    /// Build a SQL query string from a sea-query UPDATE statement.
    fn build_update(stmt: sea_query::UpdateStatement) -> String;
}
