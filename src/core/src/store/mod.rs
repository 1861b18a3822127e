//! Persistence collaborator
//!
//! The access layer talks to storage only through [`Store`]. Calls are
//! synchronous request/response; a store is shared between execution contexts
//! and must be safe to call from many threads at once.

pub mod memory;

pub use memory::MemoryStore;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::{JoinTable, Record, Relation};
use crate::RecordId;

/// Storage backend trait
pub trait Store: Send + Sync {
    /// First record (lowest id) matching the criteria
    fn find_one<R: Record>(&self, criteria: &Criteria) -> Result<Option<R>>;

    /// All records matching the criteria, ordered by id
    fn find_all<R: Record>(&self, criteria: &Criteria) -> Result<Vec<R>>;

    /// Insert or update a record, assigning an id on first save
    fn save<R: Record>(&self, record: &mut R) -> Result<()>;

    /// Remove a record and any join rows referencing it
    fn delete<R: Record>(&self, record: &R) -> Result<()>;

    /// Load the rows `relation` points at from `owner`
    ///
    /// Only the hydrator calls this; it never recurses into the loaded rows.
    fn load_related<O: Record, T: Record>(&self, owner: &O, relation: &Relation) -> Result<Vec<T>>;

    /// Add the join row `(left, right)`; adding an existing row is a no-op
    fn link(&self, join: &JoinTable, left: RecordId, right: RecordId) -> Result<()>;

    /// Remove the join row `(left, right)`; removing a missing row is a no-op
    fn unlink(&self, join: &JoinTable, left: RecordId, right: RecordId) -> Result<()>;
}

/// Conjunction of column equality tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    filters: Vec<(String, Value)>,
}

impl Criteria {
    /// Matches every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches the row with this id
    pub fn id(id: RecordId) -> Self {
        Self::all().eq("id", id)
    }

    /// Add a `column == value` test
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    /// Whether a serialized row satisfies every test
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        self.filters
            .iter()
            .all(|(column, expected)| row.get(column) == Some(expected))
    }
}
