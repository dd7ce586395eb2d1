//! Stream addressing.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use uuid::Uuid;

/// Chronicle UUID namespace derived from DNS-based UUIDv5.
pub static CHRONICLE_UUID_NAMESPACE: LazyLock<Uuid> =
    LazyLock::new(|| Uuid::new_v5(&Uuid::NAMESPACE_DNS, b"chronicle.dev"));

/// Storage-engine key of one entity's stream.
///
/// Deterministic UUIDv5 of the persistence id under the chronicle namespace.
/// Internal to the journal; never handed to the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamAddress(Uuid);

impl StreamAddress {
    pub fn for_persistence_id(persistence_id: &str) -> Self {
        Self(Uuid::new_v5(&CHRONICLE_UUID_NAMESPACE, persistence_id.as_bytes()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for StreamAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for StreamAddress {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
