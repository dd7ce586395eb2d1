//! Journal configuration types.

use serde::Deserialize;

/// Storage type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Sqlite,
    Postgres,
}

/// How much DDL the journal may run against its database on startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoCreate {
    /// Never touch schema objects; they must already exist.
    None,
    /// Create missing tables and indexes.
    CreateOnly,
    /// Create missing tables and indexes, and apply additive changes.
    CreateOrUpdate,
    /// Any DDL needed to bring the schema up to date.
    #[default]
    All,
}

impl AutoCreate {
    /// Whether this mode allows creating missing schema objects.
    pub fn creates_objects(self) -> bool {
        !matches!(self, AutoCreate::None)
    }
}

/// Journal settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JournalSettings {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// Database connection string (`sqlite:...` or `postgres://...`).
    pub connection_string: String,
    /// Schema auto-creation mode.
    pub auto_create_schema_objects: AutoCreate,
}
