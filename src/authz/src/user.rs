//! Role assignment on users

use std::sync::Arc;

use spacedock_core::{Record, Role, Store, User, ROLE_USERS};
use tracing::info;

use crate::error::{AuthzError, Result};
use crate::hydrate::Hydrator;
use crate::role::RoleManager;

/// Assigns and withdraws roles
pub struct UserRoles<S> {
    store: Arc<S>,
    roles: RoleManager<S>,
}

impl<S> Clone for UserRoles<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            roles: self.roles.clone(),
        }
    }
}

impl<S: Store> UserRoles<S> {
    pub fn new(hydrator: Hydrator<S>) -> Self {
        Self {
            store: Arc::clone(hydrator.store()),
            roles: RoleManager::new(hydrator),
        }
    }

    /// Give `user` the role `name`, creating the role if needed
    pub fn add_role(&self, user: &mut User, name: &str) -> Result<Role> {
        let role = self.roles.create_role(name)?;

        if !user.is_persisted() {
            self.store.save(user)?;
        }
        self.store.link(&ROLE_USERS, role.id(), user.id())?;

        if !user.roles.iter().any(|r| r.id() == role.id()) {
            user.roles.push(role.clone());
            info!(user = %user.username, role = name, "Assigned role");
        }
        Ok(role)
    }

    /// Withdraw a role the user holds
    ///
    /// The loaded roles only change once the join row is gone.
    pub fn remove_role(&self, user: &mut User, name: &str) -> Result<()> {
        let index = user
            .roles
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| AuthzError::NotAssigned(name.to_string()))?;

        self.store.unlink(&ROLE_USERS, user.roles[index].id(), user.id())?;
        user.roles.remove(index);
        info!(user = %user.username, role = name, "Withdrew role");
        Ok(())
    }

    /// Whether the user's loaded roles include `name`
    pub fn has_role(&self, user: &User, name: &str) -> bool {
        user.role(name).is_some()
    }
}
