//! Role operations
//!
//! A [`Role`] bundles abilities (through the `role_abilities` join table)
//! with a [`ParamMap`] scoping each ability to resource instances. The
//! manager persists every mutation; [`RoleParams`] offers the same parameter
//! edits in memory only.

mod params;

pub use params::{ParamMap, RoleParams};

use std::sync::Arc;

use serde::Serialize;
use spacedock_core::{Ability, Criteria, Record, RecordId, Role, Store, ROLE_ABILITIES};
use tracing::{debug, info, warn};

use crate::ability::AbilityRegistry;
use crate::error::Result;
use crate::hydrate::Hydrator;

/// Flat view of a role for listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSummary {
    pub id: RecordId,
    pub name: String,
    pub abilities: Vec<String>,
    pub params: ParamMap,
}

/// Persisting role operations
pub struct RoleManager<S> {
    store: Arc<S>,
    abilities: AbilityRegistry<S>,
    hydrator: Hydrator<S>,
}

impl<S> Clone for RoleManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            abilities: self.abilities.clone(),
            hydrator: self.hydrator.clone(),
        }
    }
}

impl<S: Store> RoleManager<S> {
    pub fn new(hydrator: Hydrator<S>) -> Self {
        let store = Arc::clone(hydrator.store());
        Self {
            abilities: AbilityRegistry::new(Arc::clone(&store)),
            store,
            hydrator,
        }
    }

    pub fn abilities(&self) -> &AbilityRegistry<S> {
        &self.abilities
    }

    /// Grant an ability, creating it if it does not exist yet
    ///
    /// Saves an unsaved role first so the join row has both ends. Granting
    /// an ability the role already holds adds no second membership.
    pub fn add_ability(&self, role: &mut Role, name: &str) -> Result<Ability> {
        let mut ability = self.abilities.ensure(name)?;

        self.store.save(role)?;
        self.store.save(&mut ability)?;
        self.store.link(&ROLE_ABILITIES, role.id(), ability.id())?;

        if !role.abilities.iter().any(|a| a.id() == ability.id()) {
            role.abilities.push(ability.clone());
            debug!(role = %role.name, ability = name, "Granted ability");
        }
        Ok(ability)
    }

    /// Revoke an ability; unknown abilities and non-members are a no-op
    ///
    /// The loaded set only changes once the join row is gone.
    pub fn remove_ability(&self, role: &mut Role, name: &str) -> Result<()> {
        let Some(ability) = self.abilities.find(name)? else {
            return Ok(());
        };
        let Some(index) = role.abilities.iter().position(|a| a.id() == ability.id()) else {
            return Ok(());
        };

        self.store.unlink(&ROLE_ABILITIES, role.id(), ability.id())?;
        role.abilities.remove(index);
        self.store.save(role)?;
        debug!(role = %role.name, ability = name, "Revoked ability");
        Ok(())
    }

    /// Whether `name` exists and is among the role's loaded abilities
    pub fn has_ability(&self, role: &Role, name: &str) -> bool {
        match self.abilities.find(name) {
            Ok(Some(ability)) => role.abilities.iter().any(|a| a.id() == ability.id()),
            Ok(None) => false,
            Err(e) => {
                warn!(role = %role.name, ability = name, error = %e, "Ability lookup failed");
                false
            }
        }
    }

    /// Add a parameter pattern and save the role
    pub fn add_param(&self, role: &mut Role, ability: &str, param: &str, value: &str) -> Result<()> {
        role.add_param(ability, param, value)?;
        self.store.save(role)?;
        Ok(())
    }

    /// Remove a parameter pattern, saving the role only if it was present
    pub fn remove_param(&self, role: &mut Role, ability: &str, param: &str, value: &str) -> Result<bool> {
        let removed = role.remove_param(ability, param, value)?;
        if removed {
            self.store.save(role)?;
        }
        Ok(removed)
    }

    /// Grant every registered ability whose name matches `expression`
    pub fn grant_matching(&self, role: &mut Role, expression: &str) -> Result<Vec<Ability>> {
        self.abilities
            .matching(expression)?
            .iter()
            .map(|ability| self.add_ability(role, &ability.name))
            .collect()
    }

    /// Find a role by name or create an empty one
    pub fn create_role(&self, name: &str) -> Result<Role> {
        if let Some(role) = self.find_role(name)? {
            return Ok(role);
        }

        let mut role = Role::new(name);
        match self.store.save(&mut role) {
            Ok(()) => {
                info!(role = name, id = role.id(), "Created role");
                Ok(role)
            }
            Err(e) if e.is_conflict() => match self.find_role(name)? {
                Some(stored) => Ok(stored),
                None => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Load a hydrated role by name
    pub fn find_role(&self, name: &str) -> Result<Option<Role>> {
        self.hydrator.load_one(&Criteria::all().eq("name", name))
    }

    /// All roles, newest first
    pub fn list_roles(&self) -> Result<Vec<Role>> {
        let mut roles: Vec<Role> = self.hydrator.load_all(&Criteria::all())?;
        roles.reverse();
        Ok(roles)
    }

    pub fn summary(&self, role: &Role) -> RoleSummary {
        RoleSummary {
            id: role.id(),
            name: role.name.clone(),
            abilities: role.ability_names().into_iter().map(str::to_string).collect(),
            params: role.param_map(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthzError;
    use std::sync::atomic::Ordering;

    use crate::hydrate::DepthTracker;
    use crate::testing::FaultyStore;
    use spacedock_core::{MemoryStore, User, ROLE_USERS};

    fn manager_over<S: Store>(store: S) -> RoleManager<S> {
        let hydrator = Hydrator::new(Arc::new(store)).with_tracker(Arc::new(DepthTracker::new()));
        RoleManager::new(hydrator)
    }

    fn manager() -> RoleManager<MemoryStore> {
        manager_over(MemoryStore::new())
    }

    fn store(manager: &RoleManager<MemoryStore>) -> &MemoryStore {
        manager.store.as_ref()
    }

    #[test]
    fn test_add_then_has_ability() {
        let manager = manager();
        let mut role = manager.create_role("alice").unwrap();

        let ability = manager.add_ability(&mut role, "mods-edit").unwrap();

        assert_eq!(ability.name, "mods-edit");
        assert!(manager.has_ability(&role, "mods-edit"));
        assert!(!manager.has_ability(&role, "mods-view"));
        assert_eq!(store(&manager).join_rows(&ROLE_ABILITIES), vec![(role.id(), ability.id())]);
    }

    #[test]
    fn test_add_ability_twice_keeps_one_membership() {
        let manager = manager();
        let mut role = manager.create_role("alice").unwrap();

        let first = manager.add_ability(&mut role, "mods-edit").unwrap();
        let second = manager.add_ability(&mut role, "mods-edit").unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(role.abilities.len(), 1);
        assert_eq!(store(&manager).join_rows(&ROLE_ABILITIES).len(), 1);
    }

    #[test]
    fn test_add_ability_saves_unsaved_role() {
        let manager = manager();
        let mut role = Role::new("fresh");

        manager.add_ability(&mut role, "logged-in").unwrap();

        assert!(role.is_persisted());
        let reloaded = manager.find_role("fresh").unwrap().unwrap();
        assert_eq!(reloaded.ability_names(), vec!["logged-in"]);
    }

    #[test]
    fn test_remove_ability() {
        let manager = manager();
        let mut role = manager.create_role("alice").unwrap();
        manager.add_ability(&mut role, "mods-edit").unwrap();
        manager.add_ability(&mut role, "mods-add").unwrap();

        manager.remove_ability(&mut role, "mods-edit").unwrap();

        assert!(!manager.has_ability(&role, "mods-edit"));
        assert!(manager.has_ability(&role, "mods-add"));
        let reloaded = manager.find_role("alice").unwrap().unwrap();
        assert_eq!(reloaded.ability_names(), vec!["mods-add"]);
    }

    #[test]
    fn test_failed_revoke_keeps_loaded_ability() {
        let manager = manager_over(FaultyStore::default());
        let mut role = manager.create_role("alice").unwrap();
        manager.add_ability(&mut role, "mods-edit").unwrap();

        manager.store.fail_writes.store(true, Ordering::SeqCst);
        assert!(manager.remove_ability(&mut role, "mods-edit").is_err());

        assert!(manager.has_ability(&role, "mods-edit"));
        manager.store.fail_writes.store(false, Ordering::SeqCst);
        let reloaded = manager.find_role("alice").unwrap().unwrap();
        assert_eq!(reloaded.ability_names(), vec!["mods-edit"]);
    }

    #[test]
    fn test_remove_unknown_or_unheld_ability_is_noop() {
        let manager = manager();
        let mut role = manager.create_role("alice").unwrap();
        manager.abilities().ensure("game-edit").unwrap();

        manager.remove_ability(&mut role, "never-created").unwrap();
        manager.remove_ability(&mut role, "game-edit").unwrap();

        assert!(role.abilities.is_empty());
        assert!(manager.abilities().find("never-created").unwrap().is_none());
    }

    #[test]
    fn test_has_ability_reads_loaded_set_only() {
        let manager = manager();
        let mut role = manager.create_role("alice").unwrap();
        manager.add_ability(&mut role, "mods-edit").unwrap();

        let mut bare: Role = store(&manager).find_one(&Criteria::id(role.id())).unwrap().unwrap();
        assert!(!manager.has_ability(&bare, "mods-edit"));

        bare = manager.find_role("alice").unwrap().unwrap();
        assert!(manager.has_ability(&bare, "mods-edit"));
    }

    #[test]
    fn test_params_persist() {
        let manager = manager();
        let mut role = manager.create_role("alice").unwrap();

        manager.add_param(&mut role, "mods-edit", "modid", "42").unwrap();
        manager.add_param(&mut role, "mods-edit", "modid", "42").unwrap();

        let reloaded = manager.find_role("alice").unwrap().unwrap();
        assert_eq!(reloaded.get_params("mods-edit", "modid"), vec!["42"]);

        assert!(manager.remove_param(&mut role, "mods-edit", "modid", "42").unwrap());
        let reloaded = manager.find_role("alice").unwrap().unwrap();
        assert!(reloaded.get_params("mods-edit", "modid").is_empty());
    }

    #[test]
    fn test_remove_absent_param_does_not_save() {
        let manager = manager();
        let mut role = manager.create_role("alice").unwrap();
        manager.add_param(&mut role, "mods-edit", "modid", "42").unwrap();
        let before = manager.find_role("alice").unwrap().unwrap();

        assert!(!manager.remove_param(&mut role, "mods-edit", "modid", "99").unwrap());
        assert!(!manager.remove_param(&mut role, "lists-edit", "listid", "1").unwrap());

        let after = manager.find_role("alice").unwrap().unwrap();
        assert_eq!(after.model.updated_at, before.model.updated_at);
        assert_eq!(after.params, before.params);
        assert_eq!(role.params, before.params);
    }

    #[test]
    fn test_malformed_params_are_not_saved() {
        let manager = manager();
        let mut role = manager.create_role("alice").unwrap();
        role.params = "{broken".to_string();

        let err = manager.add_param(&mut role, "mods-edit", "modid", "42").unwrap_err();
        assert!(matches!(err, AuthzError::MalformedParams(_)));

        let reloaded = manager.find_role("alice").unwrap().unwrap();
        assert_eq!(reloaded.params, "{}");
    }

    #[test]
    fn test_create_role_is_find_or_create() {
        let manager = manager();
        let first = manager.create_role("admin").unwrap();
        let second = manager.create_role("admin").unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(store(&manager).count::<Role>(), 1);
    }

    #[test]
    fn test_list_roles_newest_first() {
        let manager = manager();
        for name in ["admin", "alice", "bob"] {
            manager.create_role(name).unwrap();
        }

        let names: Vec<_> = manager.list_roles().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["bob", "alice", "admin"]);
    }

    #[test]
    fn test_find_role_hydrates_users() {
        let manager = manager();
        let role = manager.create_role("alice").unwrap();
        let mut alice = User::new("alice", "alice@example.com");
        store(&manager).save(&mut alice).unwrap();
        store(&manager).link(&ROLE_USERS, role.id(), alice.id()).unwrap();

        let loaded = manager.find_role("alice").unwrap().unwrap();
        assert_eq!(loaded.users.len(), 1);
        assert_eq!(loaded.users[0].username, "alice");
    }

    #[test]
    fn test_grant_matching() {
        let manager = manager();
        for name in ["mods-edit", "mods-remove", "game-edit"] {
            manager.abilities().ensure(name).unwrap();
        }
        let mut role = manager.create_role("moderator").unwrap();

        let granted = manager.grant_matching(&mut role, "^mods-").unwrap();

        assert_eq!(granted.len(), 2);
        assert_eq!(role.ability_names(), vec!["mods-edit", "mods-remove"]);
        assert!(!manager.has_ability(&role, "game-edit"));
    }

    #[test]
    fn test_summary() {
        let manager = manager();
        let mut role = manager.create_role("alice").unwrap();
        manager.add_ability(&mut role, "user-edit").unwrap();
        manager.add_param(&mut role, "user-edit", "userid", "1").unwrap();

        let summary = manager.summary(&role);
        assert_eq!(summary.name, "alice");
        assert_eq!(summary.abilities, vec!["user-edit"]);
        assert_eq!(summary.params.values("user-edit", "userid"), ["1"]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["params"]["user-edit"]["userid"][0], "1");
    }
}
