use serde::{Deserialize, Serialize};
use super::key::{EntityRef, SortKey};
use super::{Executable, Sortable};

/// Deferred change to the rows of one collection.
///
/// The same payload backs the recreate, update and remove variants; which
/// queue it sits in decides what the session does with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionAction {
    /// Collection role (e.g., "Order.lines")
    pub role: String,
    /// Owning instance
    pub owner: EntityRef,
    /// Owner's identifier, the collection key
    pub owner_key: i64,
    /// Collection table(s)
    pub spaces: Vec<String>,
    /// Role has a collection cache region
    pub cached: bool,
}

impl CollectionAction {
    pub fn new<S: Into<String>>(
        role: impl Into<String>,
        owner: EntityRef,
        owner_key: i64,
        spaces: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            role: role.into(),
            owner,
            owner_key,
            spaces: spaces.into_iter().map(Into::into).collect(),
            cached: false,
        }
    }

    pub fn cached(mut self) -> Self {
        self.cached = true;
        self
    }
}

impl Executable for CollectionAction {
    fn property_spaces(&self) -> &[String] {
        &self.spaces
    }

    fn has_after_transaction_completion(&self) -> bool {
        self.cached
    }
}

impl Sortable for CollectionAction {
    fn sort_key(&self) -> SortKey {
        SortKey::new(self.role.clone(), self.owner_key)
    }
}

/// Cleanup after a bulk (set-based) UPDATE/DELETE statement.
///
/// Never queued for flushing; it only needs its completion callback so the
/// session can evict the affected cache regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCleanup {
    /// Tables touched by the bulk statement
    pub spaces: Vec<String>,
    /// Entity names whose cache regions must be evicted
    pub affected_entities: Vec<String>,
}

impl BulkCleanup {
    pub fn new<S: Into<String>>(spaces: impl IntoIterator<Item = S>) -> Self {
        Self {
            spaces: spaces.into_iter().map(Into::into).collect(),
            affected_entities: Vec::new(),
        }
    }

    pub fn with_affected_entity(mut self, entity: impl Into<String>) -> Self {
        self.affected_entities.push(entity.into());
        self
    }
}

impl Executable for BulkCleanup {
    fn property_spaces(&self) -> &[String] {
        &self.spaces
    }

    fn has_after_transaction_completion(&self) -> bool {
        true
    }
}
