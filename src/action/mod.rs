//! Deferred write actions
//!
//! Producers (dirty checking, cascades, bulk statements) build these and hand
//! them to the [`ActionQueue`](crate::queue::ActionQueue):
//! - `EntityInsert` / `EntityUpdate` / `EntityDelete`: row-level DML
//! - `CollectionAction`: collection recreate / update / remove
//! - `BulkCleanup`: cache cleanup after a set-based statement

pub mod key;
pub mod entity;
pub mod collection;

use std::fmt;
use serde::{Deserialize, Serialize};

pub use key::{EntityRef, SortKey};
pub use entity::{EntityDelete, EntityInsert, EntityUpdate, Property, PropertyType, PropertyValue, Scalar};
pub use collection::{BulkCleanup, CollectionAction};

/// Capabilities every queued action exposes to the queue
pub trait Executable: Clone {
    /// Tables/resources the action writes to
    fn property_spaces(&self) -> &[String];

    /// Whether the session must be called back once the transaction ends
    fn has_after_transaction_completion(&self) -> bool;
}

/// Actions the `order_updates` pass reorders: updates and the three
/// collection queues. Inserts are regrouped by the insert sorter instead;
/// deletes and bulk cleanups keep enqueue order.
pub trait Sortable: Executable {
    fn sort_key(&self) -> SortKey;
}

/// Which queue an action belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Insert,
    Update,
    Delete,
    CollectionRecreate,
    CollectionUpdate,
    CollectionRemove,
    BulkCleanup,
}

impl ActionKind {
    pub const fn label(self) -> &'static str {
        match self {
            ActionKind::Insert => "EntityInsert",
            ActionKind::Update => "EntityUpdate",
            ActionKind::Delete => "EntityDelete",
            ActionKind::CollectionRecreate => "CollectionRecreate",
            ActionKind::CollectionUpdate => "CollectionUpdate",
            ActionKind::CollectionRemove => "CollectionRemove",
            ActionKind::BulkCleanup => "BulkCleanup",
        }
    }
}

/// A deferred unit of write work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Insert(EntityInsert),
    Update(EntityUpdate),
    Delete(EntityDelete),
    CollectionRecreate(CollectionAction),
    CollectionUpdate(CollectionAction),
    CollectionRemove(CollectionAction),
    BulkCleanup(BulkCleanup),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Insert(_) => ActionKind::Insert,
            Action::Update(_) => ActionKind::Update,
            Action::Delete(_) => ActionKind::Delete,
            Action::CollectionRecreate(_) => ActionKind::CollectionRecreate,
            Action::CollectionUpdate(_) => ActionKind::CollectionUpdate,
            Action::CollectionRemove(_) => ActionKind::CollectionRemove,
            Action::BulkCleanup(_) => ActionKind::BulkCleanup,
        }
    }

    pub fn property_spaces(&self) -> &[String] {
        match self {
            Action::Insert(a) => a.property_spaces(),
            Action::Update(a) => a.property_spaces(),
            Action::Delete(a) => a.property_spaces(),
            Action::CollectionRecreate(a)
            | Action::CollectionUpdate(a)
            | Action::CollectionRemove(a) => a.property_spaces(),
            Action::BulkCleanup(a) => a.property_spaces(),
        }
    }

    pub fn has_after_transaction_completion(&self) -> bool {
        match self {
            Action::Insert(a) => a.has_after_transaction_completion(),
            Action::Update(a) => a.has_after_transaction_completion(),
            Action::Delete(a) => a.has_after_transaction_completion(),
            Action::CollectionRecreate(a)
            | Action::CollectionUpdate(a)
            | Action::CollectionRemove(a) => a.has_after_transaction_completion(),
            Action::BulkCleanup(a) => a.has_after_transaction_completion(),
        }
    }

    /// The instance this action is about, if any
    pub fn owner(&self) -> Option<&EntityRef> {
        match self {
            Action::Insert(a) => Some(&a.target),
            Action::Update(a) => Some(&a.target),
            Action::Delete(a) => Some(&a.target),
            Action::CollectionRecreate(a)
            | Action::CollectionUpdate(a)
            | Action::CollectionRemove(a) => Some(&a.owner),
            Action::BulkCleanup(_) => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.kind().label();
        match self {
            Action::CollectionRecreate(a)
            | Action::CollectionUpdate(a)
            | Action::CollectionRemove(a) => write!(f, "{label}[{}#{}]", a.role, a.owner_key),
            Action::BulkCleanup(a) => write!(f, "{label}[{}]", a.spaces.join(", ")),
            _ => match self.owner() {
                Some(owner) => write!(f, "{label}[{owner}]"),
                None => write!(f, "{label}"),
            },
        }
    }
}

impl From<EntityInsert> for Action {
    fn from(action: EntityInsert) -> Self {
        Action::Insert(action)
    }
}

impl From<EntityUpdate> for Action {
    fn from(action: EntityUpdate) -> Self {
        Action::Update(action)
    }
}

impl From<EntityDelete> for Action {
    fn from(action: EntityDelete) -> Self {
        Action::Delete(action)
    }
}

impl From<BulkCleanup> for Action {
    fn from(action: BulkCleanup) -> Self {
        Action::BulkCleanup(action)
    }
}
