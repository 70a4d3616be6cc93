//! Recording session for queue tests.
//!
//! Session and cache append to one shared timeline so tests can assert on
//! the interleaving of DML, batch flushes, invalidations and callbacks:
//! `perform X`, `batch`, `pre_invalidate a, b`, `invalidate a, b`,
//! `complete X success=true`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use crate::action::Action;
use crate::error::{QueueError, QueueResult};
use crate::queue::cache::CacheCoordinator;
use crate::session::Session;

type Timeline = Arc<Mutex<Vec<String>>>;

fn record(timeline: &Timeline, event: String) {
    timeline.lock().expect("timeline poisoned").push(event);
}

/// Cache coordinator that only records what it was asked to do
#[derive(Debug, Default)]
pub struct RecordingCache {
    timeline: Timeline,
    invalidate_failure: Option<String>,
}

impl CacheCoordinator for RecordingCache {
    fn pre_invalidate(&self, spaces: &[String]) -> QueueResult<()> {
        record(&self.timeline, format!("pre_invalidate {}", spaces.join(", ")));
        Ok(())
    }

    fn invalidate(&self, spaces: &[String]) -> QueueResult<()> {
        record(&self.timeline, format!("invalidate {}", spaces.join(", ")));
        match &self.invalidate_failure {
            Some(reason) => Err(QueueError::CacheError {
                cache_name: "query".to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Session double with per-action failure injection
#[derive(Debug, Default)]
pub struct RecordingSession {
    timeline: Timeline,
    cache: RecordingCache,
    batches: usize,
    perform_failures: HashSet<String>,
    completion_failures: HashMap<String, QueueError>,
}

impl RecordingSession {
    pub fn new() -> Self {
        let timeline = Timeline::default();
        Self {
            cache: RecordingCache {
                timeline: Arc::clone(&timeline),
                invalidate_failure: None,
            },
            timeline,
            ..Self::default()
        }
    }

    /// Make `perform` fail for the action with this display string
    pub fn fail_on(&mut self, action: &str) {
        self.perform_failures.insert(action.to_string());
    }

    /// Make the completion callback of this action return `error`
    pub fn fail_completion(&mut self, action: &str, error: QueueError) {
        self.completion_failures.insert(action.to_string(), error);
    }

    /// Make every confirm-invalidation fail
    pub fn fail_invalidation(&mut self, reason: &str) {
        self.cache.invalidate_failure = Some(reason.to_string());
    }

    pub fn events(&self) -> Vec<String> {
        self.timeline.lock().expect("timeline poisoned").clone()
    }

    /// Successfully performed actions, in execution order
    pub fn performed(&self) -> Vec<String> {
        self.events_with_prefix("perform ")
    }

    /// Completion callbacks, as `"<action> success=<bool>"`
    pub fn completed(&self) -> Vec<String> {
        self.events_with_prefix("complete ")
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    fn events_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| e.strip_prefix(prefix))
            .map(str::to_string)
            .collect()
    }
}

impl Session for RecordingSession {
    fn perform(&mut self, action: &Action) -> QueueResult<()> {
        let label = action.to_string();
        if self.perform_failures.contains(&label) {
            return Err(QueueError::ExecutionFailed {
                action: label,
                reason: "constraint violation".to_string(),
            });
        }
        record(&self.timeline, format!("perform {label}"));
        Ok(())
    }

    fn after_transaction_completion(&mut self, action: &Action, success: bool) -> QueueResult<()> {
        let label = action.to_string();
        record(&self.timeline, format!("complete {label} success={success}"));
        match self.completion_failures.get(&label) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn execute_batch(&mut self) -> QueueResult<()> {
        self.batches += 1;
        record(&self.timeline, "batch".to_string());
        Ok(())
    }

    fn cache(&self) -> &dyn CacheCoordinator {
        &self.cache
    }
}

pub fn tables(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}
