pub mod sparql;

use crate::error::Result;
use crate::types::indicator::{EntityType, Property};

/// One distinct property value and how many times it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedValue {
    pub value: String,
    pub count: u64,
}

impl GroupedValue {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Counting capability over the catalog graph.
///
/// Implementations must return deterministic results for a fixed catalog
/// snapshot.
pub trait QueryExecutor: Send + Sync {
    /// Distinct entities of `entity`.
    fn count(&self, entity: EntityType) -> Result<u64>;

    /// Distinct entities of `entity` with at least one value for `property`.
    fn count_with_property(&self, entity: EntityType, property: Property) -> Result<u64>;

    /// Values of `property` on entities of `entity`, grouped with their occurrence count.
    fn grouped_values(&self, entity: EntityType, property: Property) -> Result<Vec<GroupedValue>>;

    /// Human readable location, used in reports.
    fn describe(&self) -> String {
        "query executor".to_string()
    }
}
