//! In-memory store
//!
//! Rows are kept in their serialized JSON form, one ordered map per table,
//! so criteria and relation lookups work for any [`Record`] without per-type
//! code. Join rows live behind a separate lock; neither lock is held while
//! another is taken.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use super::{Criteria, Store};
use crate::error::{CoreError, Result};
use crate::types::relation::JOIN_TABLES;
use crate::types::{JoinTable, Record, Relation, RelationKind};
use crate::RecordId;

type Row = Map<String, Value>;

/// Thread-safe in-memory [`Store`]
pub struct MemoryStore {
    /// table name -> id -> row
    tables: RwLock<HashMap<&'static str, BTreeMap<RecordId, Row>>>,

    /// join table name -> (left, right) pairs
    joins: RwLock<HashMap<&'static str, BTreeSet<(RecordId, RecordId)>>>,

    /// Next id to hand out, shared by all tables
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            joins: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of rows in a record's table
    pub fn count<R: Record>(&self) -> usize {
        self.tables.read().get(R::TABLE).map_or(0, BTreeMap::len)
    }

    /// Current rows of a join table
    pub fn join_rows(&self, join: &JoinTable) -> Vec<(RecordId, RecordId)> {
        self.joins
            .read()
            .get(join.name)
            .map(|rows| rows.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Ids joined to `id` through `join`, reading from the given side
    fn partners(&self, join: &JoinTable, id: RecordId, owner_is_left: bool) -> Vec<RecordId> {
        let joins = self.joins.read();
        let Some(rows) = joins.get(join.name) else {
            return Vec::new();
        };

        rows.iter()
            .filter_map(|&(left, right)| match owner_is_left {
                true if left == id => Some(right),
                false if right == id => Some(left),
                _ => None,
            })
            .collect()
    }

    fn rows_by_id<T: Record>(&self, ids: &[RecordId]) -> Result<Vec<T>> {
        let tables = self.tables.read();
        let Some(table) = tables.get(T::TABLE) else {
            return Ok(Vec::new());
        };

        ids.iter()
            .filter_map(|id| table.get(id))
            .map(from_row)
            .collect()
    }

    fn check_unique<R: Record>(table: &BTreeMap<RecordId, Row>, id: RecordId, candidate: &Row) -> Result<()> {
        for group in R::UNIQUE {
            let taken = table.iter().any(|(other_id, row)| {
                *other_id != id && group.iter().all(|column| row.get(*column) == candidate.get(*column))
            });

            if taken {
                return Err(CoreError::conflict(format!(
                    "{}.{} already taken",
                    R::TABLE,
                    group.join("+")
                )));
            }
        }

        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn find_one<R: Record>(&self, criteria: &Criteria) -> Result<Option<R>> {
        let tables = self.tables.read();
        let Some(table) = tables.get(R::TABLE) else {
            return Ok(None);
        };

        table
            .values()
            .find(|row| criteria.matches(row))
            .map(from_row)
            .transpose()
    }

    fn find_all<R: Record>(&self, criteria: &Criteria) -> Result<Vec<R>> {
        let tables = self.tables.read();
        let Some(table) = tables.get(R::TABLE) else {
            return Ok(Vec::new());
        };

        table
            .values()
            .filter(|row| criteria.matches(row))
            .map(from_row)
            .collect()
    }

    fn save<R: Record>(&self, record: &mut R) -> Result<()> {
        let mut tables = self.tables.write();
        let table = tables.entry(R::TABLE).or_default();

        Self::check_unique::<R>(table, record.id(), &to_row(record)?)?;

        if !record.is_persisted() {
            record.set_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        }
        record.touch(Utc::now());

        table.insert(record.id(), to_row(record)?);
        debug!(table = R::TABLE, id = record.id(), "Saved record");
        Ok(())
    }

    fn delete<R: Record>(&self, record: &R) -> Result<()> {
        let id = record.id();
        let removed = self
            .tables
            .write()
            .get_mut(R::TABLE)
            .and_then(|table| table.remove(&id));

        if removed.is_none() {
            return Err(CoreError::not_found(format!("{}#{}", R::TABLE, id)));
        }

        let mut joins = self.joins.write();
        for join in JOIN_TABLES {
            let Some(rows) = joins.get_mut(join.name) else {
                continue;
            };
            if join.left == R::TABLE {
                rows.retain(|&(left, _)| left != id);
            }
            if join.right == R::TABLE {
                rows.retain(|&(_, right)| right != id);
            }
        }

        debug!(table = R::TABLE, id, "Deleted record");
        Ok(())
    }

    fn load_related<O: Record, T: Record>(&self, owner: &O, relation: &Relation) -> Result<Vec<T>> {
        let ids = match relation.kind {
            RelationKind::ManyToMany { join } => {
                check_join(&join, O::TABLE, T::TABLE, relation)?;
                self.partners(&join, owner.id(), true)
            }
            RelationKind::ManyToManyInverse { join } => {
                check_join(&join, T::TABLE, O::TABLE, relation)?;
                self.partners(&join, owner.id(), false)
            }
            RelationKind::BelongsTo { foreign_key } => {
                let row = to_row(owner)?;
                match row.get(foreign_key).and_then(Value::as_u64) {
                    Some(id) if id != 0 => vec![id],
                    _ => Vec::new(),
                }
            }
            RelationKind::HasMany { foreign_key } => {
                if !owner.is_persisted() {
                    return Ok(Vec::new());
                }
                return self.find_all(&Criteria::all().eq(foreign_key, owner.id()));
            }
        };

        self.rows_by_id(&ids)
    }

    fn link(&self, join: &JoinTable, left: RecordId, right: RecordId) -> Result<()> {
        if left == 0 || right == 0 {
            return Err(CoreError::invalid(format!(
                "Cannot link unsaved records through {}",
                join.name
            )));
        }

        self.joins
            .write()
            .entry(join.name)
            .or_default()
            .insert((left, right));
        Ok(())
    }

    fn unlink(&self, join: &JoinTable, left: RecordId, right: RecordId) -> Result<()> {
        if let Some(rows) = self.joins.write().get_mut(join.name) {
            rows.remove(&(left, right));
        }
        Ok(())
    }
}

fn check_join(join: &JoinTable, left: &str, right: &str, relation: &Relation) -> Result<()> {
    if join.left != left || join.right != right {
        return Err(CoreError::invalid(format!(
            "Relation '{}' joins {} to {}, not {} to {}",
            relation.name, join.left, join.right, left, right
        )));
    }
    Ok(())
}

fn to_row<R: Record>(record: &R) -> Result<Row> {
    match serde_json::to_value(record)? {
        Value::Object(row) => Ok(row),
        other => Err(CoreError::serialization(format!(
            "{} record serialized to {} instead of an object",
            R::TABLE,
            other
        ))),
    }
}

fn from_row<R: Record>(row: &Row) -> Result<R> {
    Ok(serde_json::from_value(Value::Object(row.clone()))?)
}
