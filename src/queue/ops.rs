use std::collections::HashSet;
use tracing::{debug, trace};
use crate::action::{
    Action, BulkCleanup, CollectionAction, EntityDelete, EntityInsert, EntityRef, EntityUpdate,
};
use crate::assertion_failure;
use crate::error::QueueResult;
use crate::session::Session;
use super::ActionQueue;

impl<S: Session> ActionQueue<S> {
    /// Enqueue an entity insert.
    ///
    /// An early (identity) insert is not queued: pending inserts are executed
    /// first, then the insert itself, so its generated identifier is known
    /// when this returns.
    pub fn add_insert(&mut self, insert: EntityInsert) -> QueueResult<()> {
        if insert.early {
            trace!(entity = %insert.target, "executing insertions before identity insert");
            self.execute_inserts()?;
            debug!(entity = %insert.target, "executing identity insert immediately");
            return self.execute(Action::Insert(insert));
        }

        trace!(entity = %insert.target, "adding an entity insert");
        self.lists.insertions.push(insert);
        Ok(())
    }

    pub fn add_update(&mut self, update: EntityUpdate) {
        self.lists.updates.push(update);
    }

    pub fn add_delete(&mut self, delete: EntityDelete) {
        self.lists.deletions.push(delete);
    }

    pub fn add_collection_recreate(&mut self, action: CollectionAction) {
        self.lists.collection_creations.push(action);
    }

    pub fn add_collection_update(&mut self, action: CollectionAction) {
        self.lists.collection_updates.push(action);
    }

    pub fn add_collection_remove(&mut self, action: CollectionAction) {
        self.lists.collection_removals.push(action);
    }

    /// Bulk cleanups skip the primary queues; they only need the
    /// post-completion callback.
    pub fn add_bulk_cleanup(&mut self, cleanup: BulkCleanup) {
        trace!(spaces = ?cleanup.spaces, "registering bulk cleanup");
        self.executions.push(Action::BulkCleanup(cleanup));
    }

    /// Enqueue any action into the queue matching its variant
    pub fn add_action(&mut self, action: Action) -> QueueResult<()> {
        match action {
            Action::Insert(a) => return self.add_insert(a),
            Action::Update(a) => self.add_update(a),
            Action::Delete(a) => self.add_delete(a),
            Action::CollectionRecreate(a) => self.add_collection_recreate(a),
            Action::CollectionUpdate(a) => self.add_collection_update(a),
            Action::CollectionRemove(a) => self.add_collection_remove(a),
            Action::BulkCleanup(a) => self.add_bulk_cleanup(a),
        }
        Ok(())
    }

    /// Would a read over `tables` observe state that is still queued here?
    ///
    /// Callers use this to decide whether a query needs an implicit flush
    /// first.
    pub fn are_tables_to_be_updated(&self, tables: &HashSet<String>) -> bool {
        if tables.is_empty() {
            return false;
        }
        self.lists.touches_any(tables)
    }

    /// Drop every action in the six primary queues.
    ///
    /// The post-completion list is untouched; it belongs to the transaction.
    pub fn clear(&mut self) {
        self.lists.clear();
    }

    pub fn number_of_insertions(&self) -> usize {
        self.lists.insertions.len()
    }

    pub fn number_of_updates(&self) -> usize {
        self.lists.updates.len()
    }

    pub fn number_of_deletions(&self) -> usize {
        self.lists.deletions.len()
    }

    pub fn number_of_collection_creations(&self) -> usize {
        self.lists.collection_creations.len()
    }

    pub fn number_of_collection_updates(&self) -> usize {
        self.lists.collection_updates.len()
    }

    pub fn number_of_collection_removals(&self) -> usize {
        self.lists.collection_removals.len()
    }

    pub fn has_any_queued_actions(&self) -> bool {
        !self.lists.is_empty()
    }

    pub fn are_insertions_or_deletions_queued(&self) -> bool {
        !self.lists.insertions.is_empty() || !self.lists.deletions.is_empty()
    }

    pub fn has_after_transaction_actions(&self) -> bool {
        !self.executions.is_empty()
    }

    /// Copy of the deletion queue; later changes to the queue do not show
    /// through it.
    pub fn clone_deletions(&self) -> Vec<EntityDelete> {
        self.lists.deletions.clone()
    }

    /// Withdraw the queued delete of an instance that was re-persisted
    /// before the flush.
    pub fn unschedule_deletion(&mut self, rescued: &EntityRef) -> QueueResult<()> {
        match self.lists.deletions.iter().position(|d| &d.target == rescued) {
            Some(index) => {
                self.lists.deletions.remove(index);
                Ok(())
            }
            None => Err(assertion_failure!("Unable to perform un-delete for instance {}", rescued)),
        }
    }

    /// Undo the actions a flush-needed check queued.
    ///
    /// Updates and collection creations/updates are dropped. Collection
    /// removals are truncated back to `previous_collection_removals`, since
    /// the check can legitimately add removals of collections the session
    /// never loaded.
    pub fn clear_from_flush_needed_check(&mut self, previous_collection_removals: usize) {
        self.lists.collection_creations.clear();
        self.lists.collection_updates.clear();
        self.lists.updates.clear();
        self.lists.collection_removals.truncate(previous_collection_removals);
    }
}
