//! TTLKV - Thread-Safe In-Process Key-Value Store
//!
//! String keys and values with optional per-key TTL. Expired keys are
//! reclaimed lazily by the next operation that touches them; there is no
//! background sweeper.

pub mod metrics;
pub mod shell;
pub mod storage;

pub use metrics::Metrics;
pub use shell::{Shell, ShellConfig, ShellError};
pub use storage::{instance, Clock, ExpireOutcome, ManualClock, Store, SystemClock};
