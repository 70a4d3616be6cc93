//! Deferred write actions for an object/relational session.
//!
//! A session does not write each change as it happens. Inserts, updates,
//! deletes and collection changes are queued in an [`ActionQueue`] and
//! executed together at flush time, in an order that keeps foreign keys
//! satisfied:
//!
//! ```text
//! inserts -> updates -> collection removals -> collection updates
//!         -> collection creations -> deletes
//! ```
//!
//! Actions that need to hear about the end of the transaction (cache lock
//! release, query-cache invalidation, bulk-statement cleanup) stay on a
//! post-completion list until the session calls
//! [`ActionQueue::after_transaction_completion`].

pub mod action;
pub mod config;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod session;

#[cfg(test)]
mod testing;

pub use action::{
    Action, ActionKind, BulkCleanup, CollectionAction, EntityDelete, EntityInsert, EntityRef,
    EntityUpdate, Executable, Sortable,
};
pub use config::QueueSettings;
pub use error::{QueueError, QueueResult};
pub use metrics::{QueueMetrics, QueueStats};
pub use queue::{ActionQueue, CacheCoordinator, SerializedQueue, UpdateTimestampsCache};
pub use session::Session;

/// Get the version of the write_behind crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
