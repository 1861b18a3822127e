//! Execution context identifiers

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT: ContextId = ContextId::fresh();
}

/// Identifies one logical unit of work (usually one request)
///
/// Recursion depth is tracked per context. Each OS thread gets its own
/// context lazily; callers multiplexing several requests on one thread
/// allocate one per request with [`ContextId::fresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocate a context id never handed out before in this process
    pub fn fresh() -> Self {
        ContextId(NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The calling thread's context
    pub fn current() -> Self {
        CURRENT.with(|id| *id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}
