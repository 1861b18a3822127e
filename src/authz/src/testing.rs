//! Store doubles for unit tests

use std::sync::atomic::{AtomicBool, Ordering};

use spacedock_core::{CoreError, Criteria, JoinTable, MemoryStore, Record, RecordId, Relation, Result, Store};

/// Delegating store that can fail relation loads, fail writes or panic
#[derive(Default)]
pub(crate) struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_loads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub panic: AtomicBool,
}

impl FaultyStore {
    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::storage("write rejected"));
        }
        Ok(())
    }
}

impl Store for FaultyStore {
    fn find_one<R: Record>(&self, criteria: &Criteria) -> Result<Option<R>> {
        self.inner.find_one(criteria)
    }

    fn find_all<R: Record>(&self, criteria: &Criteria) -> Result<Vec<R>> {
        self.inner.find_all(criteria)
    }

    fn save<R: Record>(&self, record: &mut R) -> Result<()> {
        self.check_write()?;
        self.inner.save(record)
    }

    fn delete<R: Record>(&self, record: &R) -> Result<()> {
        self.check_write()?;
        self.inner.delete(record)
    }

    fn load_related<O: Record, T: Record>(&self, owner: &O, relation: &Relation) -> Result<Vec<T>> {
        if self.panic.load(Ordering::SeqCst) {
            panic!("storage went away");
        }
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(CoreError::storage("connection reset"));
        }
        self.inner.load_related(owner, relation)
    }

    fn link(&self, join: &JoinTable, left: RecordId, right: RecordId) -> Result<()> {
        self.check_write()?;
        self.inner.link(join, left, right)
    }

    fn unlink(&self, join: &JoinTable, left: RecordId, right: RecordId) -> Result<()> {
        self.check_write()?;
        self.inner.unlink(join, left, right)
    }
}
