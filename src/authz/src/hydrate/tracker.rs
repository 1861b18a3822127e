//! Per-context recursion depth tracking
//!
//! One process-wide [`DepthTracker`] maps each active execution context to
//! its current hydration depth. The mutex guarding the map is held for a
//! single read-modify-write at a time and never while storage is queried.
//! An entry exists only while its context has a hydration in flight: the
//! outermost call removes it on the way out.

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;

use super::context::ContextId;

lazy_static! {
    /// Global depth map shared by every hydrator in the process
    static ref GLOBAL_TRACKER: Arc<DepthTracker> = Arc::new(DepthTracker::new());
}

/// Recursion depth per execution context
#[derive(Debug, Default)]
pub struct DepthTracker {
    depths: Mutex<HashMap<ContextId, usize>>,
}

impl DepthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide tracker
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_TRACKER)
    }

    /// Enter one hydration level for `ctx`
    ///
    /// Returns `None` when the context is already at `max_depth`; the caller
    /// must then skip relation loading. Otherwise the returned guard holds
    /// the level until dropped.
    pub fn enter(&self, ctx: ContextId, max_depth: usize) -> Option<DepthGuard<'_>> {
        let mut depths = self.depths.lock();
        let depth = depths.get(&ctx).copied().unwrap_or(0);
        if depth >= max_depth {
            return None;
        }

        depths.insert(ctx, depth + 1);
        Some(DepthGuard {
            tracker: self,
            ctx,
            outermost: depth == 0,
        })
    }

    /// Current depth of a context (0 when idle)
    pub fn depth(&self, ctx: ContextId) -> usize {
        self.depths.lock().get(&ctx).copied().unwrap_or(0)
    }

    /// Number of contexts with a hydration in flight
    pub fn active_contexts(&self) -> usize {
        self.depths.lock().len()
    }

    fn leave(&self, ctx: ContextId, outermost: bool) {
        let mut depths = self.depths.lock();
        if outermost {
            depths.remove(&ctx);
        } else if let Some(depth) = depths.get_mut(&ctx) {
            *depth = depth.saturating_sub(1);
        }
    }
}

/// One entered hydration level; leaving happens on drop
#[must_use = "dropping the guard immediately leaves the hydration level"]
pub struct DepthGuard<'a> {
    tracker: &'a DepthTracker,
    ctx: ContextId,
    outermost: bool,
}

impl DepthGuard<'_> {
    /// Whether this guard opened the context's first level
    pub fn is_outermost(&self) -> bool {
        self.outermost
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.tracker.leave(self.ctx, self.outermost);
    }
}
