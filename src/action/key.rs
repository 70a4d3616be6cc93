use std::fmt;

/// Identifies one managed instance within its session: (entity, instance)
///
/// Example: EntityRef { entity: "Order".to_string(), instance: 7 }
/// is the seventh object the session started tracking for `Order`.
/// The handle is stable before the row has an identifier, which is what
/// the insert sorter needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EntityRef {
    /// Entity name (e.g., "Order", "LineItem")
    pub entity: String,

    /// Session-scoped instance handle
    pub instance: u64,
}

impl EntityRef {
    pub fn new(entity: impl Into<String>, instance: u64) -> Self {
        Self {
            entity: entity.into(),
            instance,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity, self.instance)
    }
}

/// Total ordering key used by the update / collection sort passes.
///
/// Entity actions order by (entity name, identifier), collection actions
/// by (role, owner key). Comparison is lexicographic on the name first so
/// statements against the same table end up adjacent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    pub name: String,
    pub key: i64,
}

impl SortKey {
    pub fn new(name: impl Into<String>, key: i64) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }
}
