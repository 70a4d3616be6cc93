//! The owning session, as seen from the action queue
//!
//! The queue never talks to the store directly. Everything that does I/O
//! (running the DML for an action, flushing the statement batch, releasing
//! cache locks, reaching the query cache) goes through the session it is
//! bound to. On reactivation a passivated queue is rebound to whichever
//! session deserializes it.

use crate::action::Action;
use crate::error::QueueResult;
use crate::queue::cache::CacheCoordinator;

pub trait Session {
    /// Run the DML for one action. Statements may be added to the pending
    /// batch rather than sent immediately.
    fn perform(&mut self, action: &Action) -> QueueResult<()>;

    /// Completion callback for an action that was executed (or a bulk
    /// cleanup registered) in the transaction that just ended.
    ///
    /// Return [`QueueError::CacheLockRelease`](crate::QueueError::CacheLockRelease)
    /// when only a cache lock could not be released; every other error is
    /// treated as a broken invariant.
    fn after_transaction_completion(&mut self, action: &Action, success: bool) -> QueueResult<()>;

    /// Send the pending statement batch to the store
    fn execute_batch(&mut self) -> QueueResult<()>;

    /// Query cache shared by all sessions of the factory
    fn cache(&self) -> &dyn CacheCoordinator;
}
