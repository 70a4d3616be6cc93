// Flush metrics for one action queue.
// Owned by the queue itself: a queue belongs to exactly one session, so no
// synchronisation is needed.

/// Counters accumulated over the queue's lifetime
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueueMetrics {
    /// Completed `execute_actions` calls
    pub flushes: u64,
    /// Actions executed against the store (including early inserts)
    pub actions_executed: u64,
    /// Statement batches sent to the store
    pub batches_executed: u64,
    /// Insert dependency sort passes
    pub insert_sorts: u64,
    /// Completion callbacks invoked by the post-completion sweep
    pub completions: u64,
    /// Cache-lock-release and invalidation failures swallowed by the sweep
    pub cache_lock_failures: u64,
    /// Total time spent in `execute_actions` (nanoseconds)
    pub total_flush_ns: u128,
}

impl QueueMetrics {
    pub(crate) fn record_flush(&mut self, timer: FlushTimer) {
        self.flushes += 1;
        self.total_flush_ns += timer.elapsed_ns();
    }

    pub(crate) fn record_executed(&mut self) {
        self.actions_executed += 1;
    }

    pub(crate) fn record_batch(&mut self) {
        self.batches_executed += 1;
    }

    pub(crate) fn record_insert_sort(&mut self) {
        self.insert_sorts += 1;
    }

    pub(crate) fn record_completion(&mut self) {
        self.completions += 1;
    }

    pub(crate) fn record_cache_lock_failure(&mut self) {
        self.cache_lock_failures += 1;
    }
}

/// Timer for measuring flush duration
pub struct FlushTimer {
    start: std::time::Instant,
}

impl FlushTimer {
    pub(crate) fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    fn elapsed_ns(&self) -> u128 {
        self.start.elapsed().as_nanos()
    }
}

/// Snapshot returned by [`ActionQueue::stats`](crate::queue::ActionQueue::stats)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    pub insertions: usize,
    pub updates: usize,
    pub deletions: usize,
    pub collection_creations: usize,
    pub collection_updates: usize,
    pub collection_removals: usize,
    /// Entries waiting for the post-completion sweep
    pub post_completion: usize,
    pub metrics: QueueMetrics,
}

impl QueueStats {
    /// Actions waiting in the six primary queues
    pub fn queued(&self) -> usize {
        self.insertions
            + self.updates
            + self.deletions
            + self.collection_creations
            + self.collection_updates
            + self.collection_removals
    }

    /// Average flush duration in nanoseconds
    pub fn avg_flush_ns(&self) -> Option<u128> {
        if self.metrics.flushes == 0 {
            return None;
        }
        Some(self.metrics.total_flush_ns / u128::from(self.metrics.flushes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut metrics = QueueMetrics::default();
        metrics.record_executed();
        metrics.record_executed();
        metrics.record_batch();
        metrics.record_cache_lock_failure();
        metrics.record_flush(FlushTimer::start());

        assert_eq!(metrics.actions_executed, 2);
        assert_eq!(metrics.batches_executed, 1);
        assert_eq!(metrics.cache_lock_failures, 1);
        assert_eq!(metrics.flushes, 1);
    }

    #[test]
    fn test_stats_queued_and_average() {
        let stats = QueueStats {
            insertions: 2,
            updates: 1,
            deletions: 0,
            collection_creations: 0,
            collection_updates: 3,
            collection_removals: 0,
            post_completion: 4,
            metrics: QueueMetrics::default(),
        };

        assert_eq!(stats.queued(), 6);
        assert_eq!(stats.avg_flush_ns(), None);

        let stats = QueueStats {
            metrics: QueueMetrics { flushes: 2, total_flush_ns: 100, ..QueueMetrics::default() },
            ..stats
        };
        assert_eq!(stats.avg_flush_ns(), Some(50));
    }
}
