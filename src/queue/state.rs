use std::collections::HashSet;
use tracing::debug;
use crate::action::{CollectionAction, EntityDelete, EntityInsert, EntityUpdate, Executable};

/// The six primary queues of one action queue.
///
/// Insertions, updates and deletions have list semantics because they must
/// run in the right order to respect referential integrity. The collection
/// queues are really bags that are reused between flushes for convenience.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActionLists {
    pub insertions: Vec<EntityInsert>,
    pub updates: Vec<EntityUpdate>,
    pub deletions: Vec<EntityDelete>,
    pub collection_creations: Vec<CollectionAction>,
    pub collection_updates: Vec<CollectionAction>,
    pub collection_removals: Vec<CollectionAction>,
}

impl ActionLists {
    pub fn clear(&mut self) {
        self.insertions.clear();
        self.updates.clear();
        self.deletions.clear();
        self.collection_creations.clear();
        self.collection_updates.clear();
        self.collection_removals.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
            && self.updates.is_empty()
            && self.deletions.is_empty()
            && self.collection_creations.is_empty()
            && self.collection_updates.is_empty()
            && self.collection_removals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.insertions.len()
            + self.updates.len()
            + self.deletions.len()
            + self.collection_creations.len()
            + self.collection_updates.len()
            + self.collection_removals.len()
    }

    /// Does any queued action write to one of `tables`?
    ///
    /// Scans updates, inserts, deletes, collection updates, collection
    /// creations, collection removals and stops at the first hit.
    pub fn touches_any(&self, tables: &HashSet<String>) -> bool {
        touches(&self.updates, tables)
            || touches(&self.insertions, tables)
            || touches(&self.deletions, tables)
            || touches(&self.collection_updates, tables)
            || touches(&self.collection_creations, tables)
            || touches(&self.collection_removals, tables)
    }
}

fn touches<E: Executable>(actions: &[E], tables: &HashSet<String>) -> bool {
    for action in actions {
        if let Some(space) = action.property_spaces().iter().find(|s| tables.contains(*s)) {
            debug!(space = %space, "changes must be flushed to space");
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::EntityRef;

    fn tables(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_lists_touch_nothing() {
        let lists = ActionLists::default();
        assert!(lists.is_empty());
        assert_eq!(lists.len(), 0);
        assert!(!lists.touches_any(&tables(&["orders"])));
    }

    #[test]
    fn test_touches_any_checks_every_queue() {
        let mut lists = ActionLists::default();
        lists.collection_removals.push(CollectionAction::new(
            "Order.lines", EntityRef::new("Order", 1), 1, ["order_lines"],
        ));

        assert!(lists.touches_any(&tables(&["order_lines"])));
        assert!(!lists.touches_any(&tables(&["orders"])));
        assert_eq!(lists.len(), 1);

        lists.clear();
        assert!(lists.is_empty());
    }
}
