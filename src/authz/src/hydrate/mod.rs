//! Relation hydration
//!
//! Records come out of the store with their relation fields empty. The
//! [`Hydrator`] fills them in on demand and hydrates whatever it loads in
//! turn, so cyclic graphs (user → role → user → ...) are cut off by a
//! per-context depth budget rather than by cycle detection:
//!
//! - depth is tracked per [`ContextId`] in a process-wide [`DepthTracker`]
//! - a call made at or beyond `max_depth` returns without touching the record
//! - the outermost call of a context removes its entry on the way out
//!
//! Storage failures while loading a relation leave that relation empty.

mod context;
mod relations;
mod tracker;

pub use context::ContextId;
pub use tracker::{DepthGuard, DepthTracker};

use std::sync::Arc;

use spacedock_core::{Criteria, Record, Relation, Store};
use tracing::{trace, warn};

use crate::error::Result;

/// Hydration depth used when nothing is configured
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// A record whose relation fields can be loaded by a [`Hydrator`]
pub trait Hydrate: Record {
    /// Load every declared relation of `self` under `ctx`
    ///
    /// Called by the hydrator once the depth budget has been checked;
    /// implementations load each relation through [`Hydrator::related_in`]
    /// or [`Hydrator::related_one_in`].
    fn resolve<S: Store>(&mut self, hydrator: &Hydrator<S>, ctx: ContextId);
}

/// Depth-bounded relation loader over a shared store
pub struct Hydrator<S> {
    store: Arc<S>,
    tracker: Arc<DepthTracker>,
    max_depth: usize,
}

impl<S> Clone for Hydrator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tracker: Arc::clone(&self.tracker),
            max_depth: self.max_depth,
        }
    }
}

impl<S: Store> Hydrator<S> {
    /// Create a hydrator using the process-wide depth tracker
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            tracker: DepthTracker::global(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Use a private tracker instead of the process-wide one
    pub fn with_tracker(mut self, tracker: Arc<DepthTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn tracker(&self) -> &Arc<DepthTracker> {
        &self.tracker
    }

    /// Hydrate `record` under the calling thread's context
    pub fn hydrate<R: Hydrate>(&self, record: &mut R) {
        self.hydrate_in(ContextId::current(), record);
    }

    /// Hydrate `record` under an explicit context
    pub fn hydrate_in<R: Hydrate>(&self, ctx: ContextId, record: &mut R) {
        let Some(_guard) = self.tracker.enter(ctx, self.max_depth) else {
            trace!(
                table = R::TABLE,
                id = record.id(),
                %ctx,
                max_depth = self.max_depth,
                "Hydration budget exhausted, relations left unloaded"
            );
            return;
        };

        record.resolve(self, ctx);
    }

    /// Load and hydrate every row `relation` points at from `owner`
    pub fn related_in<O: Record, T: Hydrate>(&self, ctx: ContextId, owner: &O, relation: &Relation) -> Vec<T> {
        match self.store.load_related::<O, T>(owner, relation) {
            Ok(mut rows) => {
                for row in &mut rows {
                    self.hydrate_in(ctx, row);
                }
                rows
            }
            Err(e) => {
                warn!(
                    table = O::TABLE,
                    id = owner.id(),
                    relation = relation.name,
                    error = %e,
                    "Failed to load relation"
                );
                Vec::new()
            }
        }
    }

    /// Single-valued form of [`related_in`](Self::related_in)
    pub fn related_one_in<O: Record, T: Hydrate>(&self, ctx: ContextId, owner: &O, relation: &Relation) -> Option<T> {
        self.related_in(ctx, owner, relation).into_iter().next()
    }

    /// Find one record and hydrate it
    pub fn load_one<R: Hydrate>(&self, criteria: &Criteria) -> Result<Option<R>> {
        let mut found = self.store.find_one::<R>(criteria)?;
        if let Some(record) = found.as_mut() {
            self.hydrate(record);
        }
        Ok(found)
    }

    /// Find all matching records and hydrate each
    pub fn load_all<R: Hydrate>(&self, criteria: &Criteria) -> Result<Vec<R>> {
        let mut found = self.store.find_all::<R>(criteria)?;
        for record in &mut found {
            self.hydrate(record);
        }
        Ok(found)
    }

    /// Current hydration depth of a context
    pub fn depth_of(&self, ctx: ContextId) -> usize {
        self.tracker.depth(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::Ordering;

    use spacedock_core::{Ability, Game, MemoryStore, Mod, Role, SharedAuthor, User, ROLE_ABILITIES, ROLE_USERS};

    use crate::testing::FaultyStore;

    /// alice holds "admin", which grants "mods-edit" and is held by alice
    fn cyclic<S: Store>(store: &S) -> User {
        let mut alice = User::new("alice", "alice@example.com");
        let mut admin = Role::new("admin");
        let mut edit = Ability::new("mods-edit");
        store.save(&mut alice).unwrap();
        store.save(&mut admin).unwrap();
        store.save(&mut edit).unwrap();
        store.link(&ROLE_ABILITIES, admin.id(), edit.id()).unwrap();
        store.link(&ROLE_USERS, admin.id(), alice.id()).unwrap();
        alice
    }

    fn hydrator<S: Store>(store: S) -> Hydrator<S> {
        Hydrator::new(Arc::new(store)).with_tracker(Arc::new(DepthTracker::new()))
    }

    #[test]
    fn test_default_depth_loads_roles_with_abilities() {
        let hydrator = hydrator(MemoryStore::new());
        let mut alice = cyclic(hydrator.store().as_ref());

        hydrator.hydrate(&mut alice);

        let admin = alice.role("admin").unwrap();
        assert_eq!(admin.ability_names(), vec!["mods-edit"]);

        // depth 3: the role's users are loaded with their roles, which stop there
        let again = &admin.users[0];
        assert_eq!(again.username, "alice");
        assert_eq!(again.roles.len(), 1);
        assert!(again.roles[0].abilities.is_empty());
        assert!(again.roles[0].users.is_empty());
    }

    #[test]
    fn test_depth_one_loads_only_direct_relations() {
        let hydrator = hydrator(MemoryStore::new()).with_max_depth(1);
        let mut alice = cyclic(hydrator.store().as_ref());

        hydrator.hydrate(&mut alice);

        assert_eq!(alice.roles.len(), 1);
        assert!(alice.roles[0].abilities.is_empty());
    }

    #[test]
    fn test_zero_depth_leaves_record_untouched() {
        let hydrator = hydrator(MemoryStore::new()).with_max_depth(0);
        let mut alice = cyclic(hydrator.store().as_ref());

        hydrator.hydrate(&mut alice);
        assert!(alice.roles.is_empty());
    }

    #[test]
    fn test_tracker_is_empty_after_outermost_call() {
        let hydrator = hydrator(MemoryStore::new());
        let mut alice = cyclic(hydrator.store().as_ref());
        let ctx = ContextId::fresh();

        hydrator.hydrate_in(ctx, &mut alice);

        assert_eq!(hydrator.depth_of(ctx), 0);
        assert_eq!(hydrator.tracker().active_contexts(), 0);
    }

    #[test]
    fn test_nested_call_runs_inside_outer_budget() {
        let hydrator = hydrator(MemoryStore::new()).with_max_depth(2);
        let mut alice = cyclic(hydrator.store().as_ref());
        let ctx = ContextId::fresh();

        let outer = hydrator.tracker().enter(ctx, 2).unwrap();
        hydrator.hydrate_in(ctx, &mut alice);
        assert_eq!(hydrator.depth_of(ctx), 1);
        drop(outer);

        // one level left: roles arrive without abilities
        assert_eq!(alice.roles.len(), 1);
        assert!(alice.roles[0].abilities.is_empty());
        assert_eq!(hydrator.depth_of(ctx), 0);
    }

    #[test]
    fn test_storage_failure_leaves_relation_empty() {
        let hydrator = hydrator(FaultyStore::default());
        let mut alice = cyclic(hydrator.store().as_ref());
        hydrator.store().fail_loads.store(true, Ordering::SeqCst);

        hydrator.hydrate(&mut alice);

        assert!(alice.roles.is_empty());
        assert_eq!(hydrator.tracker().active_contexts(), 0);
    }

    #[test]
    fn test_unwinding_releases_depth() {
        let hydrator = hydrator(FaultyStore::default());
        let mut alice = cyclic(hydrator.store().as_ref());
        hydrator.store().panic.store(true, Ordering::SeqCst);
        let ctx = ContextId::fresh();

        let result = panic::catch_unwind(AssertUnwindSafe(|| hydrator.hydrate_in(ctx, &mut alice)));

        assert!(result.is_err());
        assert_eq!(hydrator.depth_of(ctx), 0);
        assert_eq!(hydrator.tracker().active_contexts(), 0);
    }

    #[test]
    fn test_mod_graph() {
        let hydrator = hydrator(MemoryStore::new());
        let store = hydrator.store().as_ref();

        let mut owner = User::new("alice", "alice@example.com");
        let mut guest = User::new("bob", "bob@example.com");
        let mut game = Game::new("Kerbal Space Program", "kerbal-space-program");
        store.save(&mut owner).unwrap();
        store.save(&mut guest).unwrap();
        store.save(&mut game).unwrap();
        let mut target = Mod::new("MechJeb", &owner, &game, "GPL");
        store.save(&mut target).unwrap();
        let mut invite = SharedAuthor::new(&guest, &target);
        store.save(&mut invite).unwrap();

        let mut loaded: Mod = hydrator.load_one(&Criteria::id(target.id())).unwrap().unwrap();

        assert_eq!(loaded.user.as_ref().unwrap().username, "alice");
        assert_eq!(loaded.game_short(), Some("kerbal-space-program"));
        assert_eq!(loaded.shared_authors.len(), 1);
        let author = &loaded.shared_authors[0];
        assert_eq!(author.user.as_ref().unwrap().username, "bob");
        assert_eq!(author.target_mod.as_ref().unwrap().name, "MechJeb");

        // dangling foreign key loads nothing
        loaded.game_id = 999;
        hydrator.hydrate(&mut loaded);
        assert!(loaded.game.is_none());
    }

    #[test]
    fn test_load_all_hydrates_each() {
        let hydrator = hydrator(MemoryStore::new());
        cyclic(hydrator.store().as_ref());

        let roles: Vec<Role> = hydrator.load_all(&Criteria::all()).unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].ability_names(), vec!["mods-edit"]);
        assert_eq!(roles[0].users[0].username, "alice");
    }
}
