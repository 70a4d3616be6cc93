use tracing::{debug, error, warn};
use crate::assertion_failure;
use crate::error::QueueResult;
use crate::session::Session;
use super::ActionQueue;

impl<S: Session> ActionQueue<S> {
    /// Post-completion sweep, run by the session once the transaction ends.
    ///
    /// Every registered entry gets its completion callback with `success`,
    /// followed by confirm-invalidation of its spaces when the query cache is
    /// on. Invalidation failures and cache-lock-release failures from a
    /// callback are logged and skipped. Any other callback failure abandons
    /// the rest of the sweep and comes back as an assertion failure. Either
    /// way the post-completion list is empty afterwards.
    pub fn after_transaction_completion(&mut self, success: bool) -> QueueResult<()> {
        let executions = std::mem::take(&mut self.executions);
        debug!(entries = executions.len(), success, "running post-completion sweep");

        for action in &executions {
            let outcome = self.session.after_transaction_completion(action, success);
            self.metrics.record_completion();

            // Confirm-invalidation runs even when the callback failed
            if self.settings.query_cache_enabled {
                if let Err(e) = self.session.cache().invalidate(action.property_spaces()) {
                    self.metrics.record_cache_lock_failure();
                    error!(%action, error = %e, "could not invalidate query cache spaces");
                }
            }

            match outcome {
                Ok(()) => {}
                Err(e) if e.is_cache_lock_failure() => {
                    self.metrics.record_cache_lock_failure();
                    error!(%action, error = %e, "could not release a cache lock");
                }
                Err(e) => {
                    warn!(%action, error = %e, "abandoning post-completion sweep");
                    return Err(assertion_failure!("Exception releasing cache locks: {}", e));
                }
            }
        }

        Ok(())
    }
}
