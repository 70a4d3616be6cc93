//! Session-level write-behind queue
//!
//! This module holds the deferred DML of one session until a flush forces it
//! to the store:
//! - `ActionQueue`: six primary queues plus the post-completion list
//! - enqueue / introspection (`ops`)
//! - flush execution and sort passes (`flush`)
//! - the after-transaction sweep (`xact`)
//! - insert regrouping (`insert_order`)
//! - passivation (`persistence`)

pub mod cache;
pub mod insert_order;
pub mod persistence;
mod state;
mod ops;
mod flush;
mod xact;

use std::fmt;
use tracing::trace;
use crate::action::Action;
use crate::config::QueueSettings;
use crate::error::QueueResult;
use crate::metrics::{QueueMetrics, QueueStats};
use crate::session::Session;

pub use cache::{CacheCoordinator, UpdateTimestampsCache};
pub use insert_order::InsertActionSorter;
pub use persistence::SerializedQueue;
pub use state::ActionLists;

/// Deferred actions of one session.
///
/// Bound 1:1 to its session for the session's whole lifetime. Single-writer:
/// every mutating operation takes `&mut self`.
pub struct ActionQueue<S> {
    session: S,
    settings: QueueSettings,
    lists: ActionLists,
    /// Actions awaiting their after-transaction callback. Survives flushes;
    /// drained only by `after_transaction_completion`.
    executions: Vec<Action>,
    insert_sorter: InsertActionSorter,
    metrics: QueueMetrics,
}

impl<S: Session> ActionQueue<S> {
    /// Construct an action queue bound to the given session
    pub fn new(session: S, settings: QueueSettings) -> Self {
        Self {
            session,
            settings,
            lists: ActionLists::default(),
            executions: Vec::new(),
            insert_sorter: InsertActionSorter::new(),
            metrics: QueueMetrics::default(),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Unbind, handing back the session
    pub fn into_session(self) -> S {
        self.session
    }

    pub fn settings(&self) -> QueueSettings {
        self.settings
    }

    /// Read-only view of the primary queues
    pub fn lists(&self) -> &ActionLists {
        &self.lists
    }

    /// Entries waiting for the post-completion sweep
    pub fn executions(&self) -> &[Action] {
        &self.executions
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            insertions: self.lists.insertions.len(),
            updates: self.lists.updates.len(),
            deletions: self.lists.deletions.len(),
            collection_creations: self.lists.collection_creations.len(),
            collection_updates: self.lists.collection_updates.len(),
            collection_removals: self.lists.collection_removals.len(),
            post_completion: self.executions.len(),
            metrics: self.metrics.clone(),
        }
    }

    /// Passivate the primary queues (binary format).
    ///
    /// The session link and the post-completion list are not part of the
    /// output.
    pub fn serialize(&self) -> QueueResult<Vec<u8>> {
        trace!("serializing action queue");
        self.to_serialized().to_binary()
    }

    /// Reactivate a passivated queue, bound to `session`.
    ///
    /// The post-completion list starts empty.
    pub fn deserialize(data: &[u8], session: S, settings: QueueSettings) -> QueueResult<Self> {
        trace!("deserializing action queue");
        let serialized = SerializedQueue::from_binary(data)?;
        Ok(Self::from_serialized(serialized, session, settings))
    }

    pub fn to_serialized(&self) -> SerializedQueue {
        SerializedQueue::from_lists(&self.lists)
    }

    pub fn from_serialized(serialized: SerializedQueue, session: S, settings: QueueSettings) -> Self {
        trace!(entries = serialized.action_count(), "rebinding deserialized action queue");
        let mut queue = Self::new(session, settings);
        queue.lists = serialized.into_lists();
        queue
    }
}

impl<S> fmt::Display for ActionQueue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ActionQueue[insertions={} updates={} deletions={} collectionCreations={} \
             collectionRemovals={} collectionUpdates={} executions={}]",
            self.lists.insertions.len(),
            self.lists.updates.len(),
            self.lists.deletions.len(),
            self.lists.collection_creations.len(),
            self.lists.collection_removals.len(),
            self.lists.collection_updates.len(),
            self.executions.len(),
        )
    }
}
