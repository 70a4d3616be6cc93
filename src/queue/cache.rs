use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, trace};
use crate::config::CACHE_PRE_INVALIDATION_TIMEOUT_MS;
use crate::error::{QueueError, QueueResult};

/// Query-cache side of a flush.
///
/// The queue calls `pre_invalidate` before an action touches the store and
/// `invalidate` once the surrounding transaction has completed. Both must be
/// idempotent; both may fail. The cache is shared with other sessions, so
/// implementations take `&self`.
pub trait CacheCoordinator {
    fn pre_invalidate(&self, spaces: &[String]) -> QueueResult<()>;

    fn invalidate(&self, spaces: &[String]) -> QueueResult<()>;
}

/// In-memory last-update timestamps per property space (milliseconds since
/// the epoch).
///
/// A cached query result over some spaces is fresh only if none of those
/// spaces was updated at or after the time the result was produced.
/// Pre-invalidation stamps a space into the future so results computed
/// while a write is in flight are never considered fresh.
#[derive(Debug)]
pub struct UpdateTimestampsCache {
    timestamps: Mutex<HashMap<String, i64>>,
    timeout_ms: i64,
}

impl Default for UpdateTimestampsCache {
    fn default() -> Self {
        Self::new(CACHE_PRE_INVALIDATION_TIMEOUT_MS)
    }
}

impl UpdateTimestampsCache {
    pub fn new(timeout_ms: i64) -> Self {
        Self {
            timestamps: Mutex::new(HashMap::new()),
            timeout_ms,
        }
    }

    /// Are results computed at `since` still valid for all `spaces`?
    pub fn is_up_to_date(&self, spaces: &[String], since: i64) -> QueueResult<bool> {
        let timestamps = self.lock()?;

        for space in spaces {
            if let Some(&last_update) = timestamps.get(space) {
                if last_update >= since {
                    debug!(space = %space, last_update, since, "cached query results are stale");
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }

    /// Last recorded update for a space
    pub fn last_update(&self, space: &str) -> QueueResult<Option<i64>> {
        Ok(self.lock()?.get(space).copied())
    }

    /// Forget all timestamps (region eviction)
    pub fn clear(&self) -> QueueResult<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn stamp(&self, spaces: &[String], timestamp: i64) -> QueueResult<()> {
        let mut timestamps = self.lock()?;
        for space in spaces {
            trace!(space = %space, timestamp, "stamping update timestamp");
            timestamps.insert(space.clone(), timestamp);
        }
        Ok(())
    }

    fn lock(&self) -> QueueResult<std::sync::MutexGuard<'_, HashMap<String, i64>>> {
        self.timestamps.lock().map_err(|e| QueueError::CacheError {
            cache_name: "update-timestamps".to_string(),
            reason: format!("poisoned lock: {e}"),
        })
    }
}

impl CacheCoordinator for UpdateTimestampsCache {
    fn pre_invalidate(&self, spaces: &[String]) -> QueueResult<()> {
        let until = now_millis() + self.timeout_ms;
        debug!(?spaces, until, "pre-invalidating spaces");
        self.stamp(spaces, until)
    }

    fn invalidate(&self, spaces: &[String]) -> QueueResult<()> {
        let now = now_millis();
        debug!(?spaces, now, "invalidating spaces");
        self.stamp(spaces, now)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
