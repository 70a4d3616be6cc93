//! Entity-level actions: insert, update, delete.

use serde::{Deserialize, Serialize};
use super::key::{EntityRef, SortKey};
use super::{Executable, Sortable};

/// Declared type of a mapped property, as reported by the metadata model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    /// Column-valued property (e.g., "string", "bigint")
    Basic(String),
    /// Many-to-one / one-to-one association to the named entity
    Entity(String),
    /// Collection role; rows live in another table
    Collection(String),
}

impl PropertyType {
    pub fn is_entity_type(&self) -> bool {
        matches!(self, PropertyType::Entity(_))
    }
}

/// Column-level value carried for diagnostics and re-hydration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Runtime value of one property at insert time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Null,
    Scalar(Scalar),
    /// Reference to another managed instance
    Entity(EntityRef),
}

/// One (value, declared type) pair of an insert's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub ty: PropertyType,
    pub value: PropertyValue,
}

/// Deferred INSERT of one entity instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInsert {
    pub target: EntityRef,
    /// Assigned identifier, `None` when the store generates it
    pub id: Option<i64>,
    /// Property values in mapping order
    pub state: Vec<Property>,
    /// Tables written by this insert
    pub spaces: Vec<String>,
    /// Entity has a second-level cache region to release after completion
    pub cached: bool,
    /// Identity insert: must reach the store before the caller continues
    pub early: bool,
}

impl EntityInsert {
    pub fn new<S: Into<String>>(target: EntityRef, spaces: impl IntoIterator<Item = S>) -> Self {
        Self {
            target,
            id: None,
            state: Vec::new(),
            spaces: spaces.into_iter().map(Into::into).collect(),
            cached: false,
            early: false,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, ty: PropertyType, value: PropertyValue) -> Self {
        self.state.push(Property {
            name: name.into(),
            ty,
            value,
        });
        self
    }

    /// Shorthand for a many-to-one property pointing at `target`
    pub fn with_reference(self, name: impl Into<String>, target: EntityRef) -> Self {
        let ty = PropertyType::Entity(target.entity.clone());
        self.with_property(name, ty, PropertyValue::Entity(target))
    }

    pub fn cached(mut self) -> Self {
        self.cached = true;
        self
    }

    pub fn early(mut self) -> Self {
        self.early = true;
        self
    }

    pub fn entity_name(&self) -> &str {
        &self.target.entity
    }

    /// Non-null values of entity-typed properties, in mapping order.
    ///
    /// This is the only view of the state the insert sorter needs.
    pub fn entity_references(&self) -> impl Iterator<Item = &EntityRef> + '_ {
        self.state
            .iter()
            .filter(|p| p.ty.is_entity_type())
            .filter_map(|p| match &p.value {
                PropertyValue::Entity(target) => Some(target),
                _ => None,
            })
    }
}

impl Executable for EntityInsert {
    fn property_spaces(&self) -> &[String] {
        &self.spaces
    }

    fn has_after_transaction_completion(&self) -> bool {
        self.cached
    }
}

/// Deferred UPDATE of one entity row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityUpdate {
    pub target: EntityRef,
    pub id: i64,
    /// Names of the dirty properties
    pub dirty: Vec<String>,
    pub spaces: Vec<String>,
    pub cached: bool,
}

impl EntityUpdate {
    pub fn new<S: Into<String>>(target: EntityRef, id: i64, spaces: impl IntoIterator<Item = S>) -> Self {
        Self {
            target,
            id,
            dirty: Vec::new(),
            spaces: spaces.into_iter().map(Into::into).collect(),
            cached: false,
        }
    }

    pub fn with_dirty(mut self, property: impl Into<String>) -> Self {
        self.dirty.push(property.into());
        self
    }

    pub fn cached(mut self) -> Self {
        self.cached = true;
        self
    }
}

impl Executable for EntityUpdate {
    fn property_spaces(&self) -> &[String] {
        &self.spaces
    }

    fn has_after_transaction_completion(&self) -> bool {
        self.cached
    }
}

impl Sortable for EntityUpdate {
    fn sort_key(&self) -> SortKey {
        SortKey::new(self.target.entity.clone(), self.id)
    }
}

/// Deferred DELETE of one entity row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDelete {
    pub target: EntityRef,
    pub id: i64,
    pub spaces: Vec<String>,
    pub cached: bool,
}

impl EntityDelete {
    pub fn new<S: Into<String>>(target: EntityRef, id: i64, spaces: impl IntoIterator<Item = S>) -> Self {
        Self {
            target,
            id,
            spaces: spaces.into_iter().map(Into::into).collect(),
            cached: false,
        }
    }

    pub fn cached(mut self) -> Self {
        self.cached = true;
        self
    }
}

impl Executable for EntityDelete {
    fn property_spaces(&self) -> &[String] {
        &self.spaces
    }

    fn has_after_transaction_completion(&self) -> bool {
        self.cached
    }
}
