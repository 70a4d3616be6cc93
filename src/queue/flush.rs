use tracing::{debug, info, trace};
use crate::action::{Action, Executable, Sortable};
use crate::error::QueueResult;
use crate::metrics::FlushTimer;
use crate::session::Session;
use super::state::ActionLists;
use super::ActionQueue;

impl<S: Session> ActionQueue<S> {
    /// Sort passes, then execute everything (the session's flush point)
    pub fn flush(&mut self) -> QueueResult<()> {
        self.sort_actions();
        self.sort_collection_actions();
        self.execute_actions()
    }

    /// Execute only the queued inserts.
    ///
    /// Used when identifiers must be assigned before continuing (identity
    /// columns) without running a whole flush.
    pub fn execute_inserts(&mut self) -> QueueResult<()> {
        self.execute_list(|lists| &mut lists.insertions, Action::Insert)
    }

    /// Execute all queued actions in flush order:
    ///
    /// 1. inserts (updates may reference a row inserted in this flush)
    /// 2. updates
    /// 3. collection removals (a reassigned collection must not linger in
    ///    its stale form while it is recreated)
    /// 4. collection updates
    /// 5. collection creations
    /// 6. deletes (rows stay referenceable as long as possible)
    ///
    /// Each queue is cleared and the statement batch sent before the next
    /// queue starts. On failure the failing queue is left as it was and the
    /// later queues are not touched; the caller must roll back.
    pub fn execute_actions(&mut self) -> QueueResult<()> {
        let timer = FlushTimer::start();
        let queued = self.lists.len();

        self.execute_list(|lists| &mut lists.insertions, Action::Insert)?;
        self.execute_list(|lists| &mut lists.updates, Action::Update)?;
        self.execute_list(|lists| &mut lists.collection_removals, Action::CollectionRemove)?;
        self.execute_list(|lists| &mut lists.collection_updates, Action::CollectionUpdate)?;
        self.execute_list(|lists| &mut lists.collection_creations, Action::CollectionRecreate)?;
        self.execute_list(|lists| &mut lists.deletions, Action::Delete)?;

        self.metrics.record_flush(timer);
        info!(actions = queued, executions = self.executions.len(), "flushed action queue");
        Ok(())
    }

    /// Execute one action.
    ///
    /// The action is registered for the post-completion sweep before it runs
    /// (when it has a callback, or whenever the query cache is on), and its
    /// spaces are pre-invalidated so no concurrent reader can cache data the
    /// write is about to make stale.
    pub fn execute(&mut self, action: Action) -> QueueResult<()> {
        if action.has_after_transaction_completion() || self.settings.query_cache_enabled {
            self.executions.push(action.clone());
        }

        if self.settings.query_cache_enabled {
            self.session.cache().pre_invalidate(action.property_spaces())?;
        }

        trace!(%action, "executing action");
        self.session.perform(&action)?;
        self.metrics.record_executed();
        Ok(())
    }

    /// Stable-sort updates by primary key (`order_updates`) and regroup
    /// inserts (`order_inserts`)
    pub fn sort_actions(&mut self) {
        if self.settings.order_updates {
            debug!(count = self.lists.updates.len(), "sorting updates");
            self.lists.updates.sort_by_cached_key(|a| a.sort_key());
        }
        if self.settings.order_inserts {
            debug!(count = self.lists.insertions.len(), "sorting insertions");
            self.insert_sorter.sort(&mut self.lists.insertions);
            self.metrics.record_insert_sort();
        }
    }

    /// Stable-sort the collection queues by role and key (`order_updates`)
    pub fn sort_collection_actions(&mut self) {
        if self.settings.order_updates {
            self.lists.collection_creations.sort_by_cached_key(|a| a.sort_key());
            self.lists.collection_updates.sort_by_cached_key(|a| a.sort_key());
            self.lists.collection_removals.sort_by_cached_key(|a| a.sort_key());
        }
    }

    fn execute_list<E, F, W>(&mut self, list_of: F, wrap: W) -> QueueResult<()>
    where
        E: Executable,
        F: Fn(&mut ActionLists) -> &mut Vec<E>,
        W: Fn(E) -> Action,
    {
        let mut list = std::mem::take(list_of(&mut self.lists));

        let result = list.iter().try_for_each(|action| self.execute(wrap(action.clone())));
        if let Err(e) = result {
            *list_of(&mut self.lists) = list;
            return Err(e);
        }

        list.clear();
        *list_of(&mut self.lists) = list;

        self.session.execute_batch()?;
        self.metrics.record_batch();
        Ok(())
    }
}
