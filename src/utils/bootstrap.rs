//! Bootstrap utilities for hosts embedding the journal.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LOG_ENV_VAR;

/// Initialize tracing with CHRONICLE_LOG environment variable.
///
/// Defaults to "info" level if CHRONICLE_LOG is not set. Returns false when a
/// global subscriber was already installed, in which case nothing changes.
pub fn init_tracing() -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
