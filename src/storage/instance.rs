//! Process-Wide Store
//!
//! Lazily constructed shared instance for callers that want one store per
//! process. Code that can take a [`Store`] handle should prefer that instead.

use std::sync::OnceLock;
use tracing::info;

use super::Store;

static INSTANCE: OnceLock<Store> = OnceLock::new();

/// Get the process-wide store, creating it on first call.
///
/// Concurrent first callers race on a one-shot guard; exactly one store is
/// ever built and all callers get the same one.
pub fn instance() -> &'static Store {
    INSTANCE.get_or_init(|| {
        info!("Initialising process-wide store");
        Store::new()
    })
}
