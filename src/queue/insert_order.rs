use std::collections::HashMap;
use tracing::debug;
use crate::action::{EntityInsert, EntityRef};

/// Regroups pending inserts so that inserts of the same entity type run
/// back to back (one statement batch per run) without breaking foreign-key
/// order.
///
/// The incoming order is cascade order, which already puts every referenced
/// row before its referencer. The sorter keeps that guarantee: an insert is
/// never placed in a batch earlier than the batch of an instance it
/// references.
///
/// Example (cascade order `[A: Order, B: LineItem -> A, C: Order]`):
/// - `A` opens batch 0 for `Order`
/// - `B` opens batch 1 for `LineItem`
/// - `C` joins `Order`'s batch 0
///
/// Result: `[A, C, B]`
///
/// Single forward pass; batch numbers are handed out densely, so the batch
/// list index is the batch number. Nothing survives between passes.
#[derive(Debug, Default)]
pub struct InsertActionSorter {
    /// Entity name -> latest batch number for that type
    latest_batches: HashMap<String, usize>,
    /// Instance -> batch it was placed in
    entity_batch_number: HashMap<EntityRef, usize>,
    /// Batch number -> inserts, in placement order
    action_batches: Vec<Vec<EntityInsert>>,
}

impl InsertActionSorter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort `insertions` in place
    pub fn sort(&mut self, insertions: &mut Vec<EntityInsert>) {
        self.latest_batches.clear();
        self.entity_batch_number.clear();
        self.entity_batch_number.reserve(insertions.len());
        self.action_batches.clear();

        for action in insertions.drain(..) {
            let batch_number = match self.latest_batches.get(action.entity_name()) {
                Some(&latest) => self.find_batch_number(&action, latest),
                None => {
                    // First insert of this type: everything it references was
                    // already placed, so a fresh batch at the end is safe.
                    let batch_number = self.action_batches.len();
                    self.latest_batches.insert(action.entity_name().to_string(), batch_number);
                    batch_number
                }
            };

            self.entity_batch_number.insert(action.target.clone(), batch_number);
            self.add_to_batch(batch_number, action);
        }

        debug!(batches = self.action_batches.len(), "insert actions regrouped");

        for batch in self.action_batches.drain(..) {
            insertions.extend(batch);
        }
        self.latest_batches.clear();
        self.entity_batch_number.clear();
    }

    /// Batch for an insert whose type already has a latest batch.
    ///
    /// If any referenced instance sits in a later batch than the type's
    /// latest, the type moves to a brand-new batch at the end. That batch
    /// follows every placed reference, so scanning stops there.
    fn find_batch_number(&mut self, action: &EntityInsert, latest: usize) -> usize {
        for reference in action.entity_references() {
            if let Some(&association_batch) = self.entity_batch_number.get(reference) {
                if association_batch > latest {
                    let batch_number = self.action_batches.len();
                    self.latest_batches.insert(action.entity_name().to_string(), batch_number);
                    return batch_number;
                }
            }
        }
        latest
    }

    fn add_to_batch(&mut self, batch_number: usize, action: EntityInsert) {
        if batch_number == self.action_batches.len() {
            self.action_batches.push(Vec::new());
        }
        self.action_batches[batch_number].push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn insert(entity: &str, instance: u64) -> EntityInsert {
        EntityInsert::new(EntityRef::new(entity, instance), [entity.to_lowercase()])
    }

    fn order_of(insertions: &[EntityInsert]) -> Vec<String> {
        insertions.iter().map(|i| i.target.to_string()).collect()
    }

    #[test]
    fn test_order_line_item_order() {
        let a = insert("Order", 1);
        let b = insert("LineItem", 2).with_reference("order", a.target.clone());
        let c = insert("Order", 3);

        let mut insertions = vec![a, b, c];
        InsertActionSorter::new().sort(&mut insertions);

        // [[A, C], [B]]
        assert_eq!(order_of(&insertions), vec!["Order#1", "Order#3", "LineItem#2"]);
    }

    #[test]
    fn test_type_is_promoted_past_a_later_reference() {
        // Customer#1, Order#2 -> Customer#1, Customer#3 -> Order#2 (e.g. "last order")
        let customer = insert("Customer", 1);
        let order = insert("Order", 2).with_reference("customer", customer.target.clone());
        let second_customer = insert("Customer", 3).with_reference("last_order", order.target.clone());
        let third_customer = insert("Customer", 4);

        let mut insertions = vec![customer, order, second_customer, third_customer];
        InsertActionSorter::new().sort(&mut insertions);

        // Customer moves to batch 2 after seeing Order in batch 1; the
        // following Customer joins that latest batch.
        assert_eq!(
            order_of(&insertions),
            vec!["Customer#1", "Order#2", "Customer#3", "Customer#4"]
        );
    }

    #[test]
    fn test_reference_to_unprocessed_sibling_has_no_effect() {
        let parent = insert("Node", 1).with_reference("parent", EntityRef::new("Node", 2));
        let child = insert("Node", 2);
        let other = insert("Leaf", 3);
        let last = insert("Node", 4);

        let mut insertions = vec![parent, child, other, last];
        InsertActionSorter::new().sort(&mut insertions);

        assert_eq!(order_of(&insertions), vec!["Node#1", "Node#2", "Node#4", "Leaf#3"]);
    }

    #[test]
    fn test_null_and_unknown_references_are_ignored() {
        let a = insert("Order", 1);
        let b = insert("Order", 2)
            .with_property("shipper", crate::action::PropertyType::Entity("Shipper".to_string()),
                           crate::action::PropertyValue::Null)
            .with_reference("customer", EntityRef::new("Customer", 99)); // already persistent

        let mut insertions = vec![a, b];
        InsertActionSorter::new().sort(&mut insertions);
        assert_eq!(order_of(&insertions), vec!["Order#1", "Order#2"]);
    }

    #[test]
    fn test_sorter_is_reusable() {
        let mut sorter = InsertActionSorter::new();

        let mut first = vec![insert("A", 1), insert("B", 2), insert("A", 3)];
        sorter.sort(&mut first);
        assert_eq!(order_of(&first), vec!["A#1", "A#3", "B#2"]);

        let mut second = vec![insert("B", 4), insert("A", 5)];
        sorter.sort(&mut second);
        assert_eq!(order_of(&second), vec!["B#4", "A#5"]);
    }

    #[test]
    fn test_empty() {
        let mut insertions = Vec::new();
        InsertActionSorter::new().sort(&mut insertions);
        assert!(insertions.is_empty());
    }

    // (entity type, optional index of an earlier insert it references)
    fn arb_cascade() -> impl Strategy<Value = Vec<(u8, Option<prop::sample::Index>)>> {
        prop::collection::vec((0u8..4, prop::option::of(any::<prop::sample::Index>())), 0..40)
    }

    fn build(cascade: &[(u8, Option<prop::sample::Index>)]) -> Vec<EntityInsert> {
        let mut insertions: Vec<EntityInsert> = Vec::new();
        for (position, (ty, reference)) in cascade.iter().enumerate() {
            let mut action = insert(&format!("T{ty}"), position as u64);
            if let Some(index) = reference {
                if position > 0 {
                    let target = insertions[index.index(position)].target.clone();
                    action = action.with_reference("ref", target);
                }
            }
            insertions.push(action);
        }
        insertions
    }

    proptest! {
        #[test]
        fn referenced_before_referencer(cascade in arb_cascade()) {
            let mut insertions = build(&cascade);
            InsertActionSorter::new().sort(&mut insertions);

            prop_assert_eq!(insertions.len(), cascade.len());
            let position: HashMap<EntityRef, usize> = insertions
                .iter()
                .enumerate()
                .map(|(i, a)| (a.target.clone(), i))
                .collect();

            for action in &insertions {
                for reference in action.entity_references() {
                    prop_assert!(position[reference] < position[&action.target]);
                }
            }
        }

        #[test]
        fn same_type_without_associations_is_one_run(count in 0usize..50) {
            let mut insertions: Vec<EntityInsert> = (0..count as u64).map(|i| insert("Order", i)).collect();
            let original = order_of(&insertions);
            InsertActionSorter::new().sort(&mut insertions);

            prop_assert_eq!(order_of(&insertions), original);
        }

        #[test]
        fn independent_types_collapse_into_runs(types in prop::collection::vec(0u8..3, 0..40)) {
            let mut insertions: Vec<EntityInsert> = types
                .iter()
                .enumerate()
                .map(|(i, ty)| insert(&format!("T{ty}"), i as u64))
                .collect();
            InsertActionSorter::new().sort(&mut insertions);

            // Each type appears as exactly one contiguous run
            let mut runs: Vec<&str> = Vec::new();
            for action in &insertions {
                if runs.last() != Some(&action.entity_name()) {
                    runs.push(action.entity_name());
                }
            }
            let mut distinct = runs.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(runs.len(), distinct.len());
        }
    }
}
