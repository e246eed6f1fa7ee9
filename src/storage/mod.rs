//! Storage Engine
//!
//! In-memory key-value store with lazy TTL expiration.

mod clock;
mod instance;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use instance::instance;
pub use store::{ExpireOutcome, Store, MAX_TTL_SECS};
