//! Journal data model.
//!
//! `PersistentRepr` and `AtomicWrite` are what the host framework hands the
//! journal. `EventRecord` and `EntityMetadata` are what the storage engine
//! persists. `StreamAddress` keys an entity's stream inside the engine.

mod metadata;
mod record;
mod repr;
mod stream;

pub use metadata::EntityMetadata;
pub use record::{record_id, EventRecord};
pub use repr::{AtomicWrite, PersistentRepr};
pub use stream::{StreamAddress, CHRONICLE_UUID_NAMESPACE};
