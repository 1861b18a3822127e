//! Co-author invitations on mods

use std::sync::Arc;

use spacedock_core::{Criteria, Mod, Record, SharedAuthor, Store, User};
use tracing::info;

use crate::error::{AuthzError, Result};
use crate::hydrate::Hydrator;

/// Invite, accept and revoke shared authors
pub struct SharedAuthors<S> {
    store: Arc<S>,
    hydrator: Hydrator<S>,
}

impl<S> Clone for SharedAuthors<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hydrator: self.hydrator.clone(),
        }
    }
}

impl<S: Store> SharedAuthors<S> {
    pub fn new(hydrator: Hydrator<S>) -> Self {
        Self {
            store: Arc::clone(hydrator.store()),
            hydrator,
        }
    }

    /// Create a pending invitation for `user` on `target`
    pub fn invite(&self, target: &Mod, user: &User) -> Result<SharedAuthor> {
        if !target.is_persisted() || !user.is_persisted() {
            return Err(AuthzError::InvalidInput("mod and user must be saved first".to_string()));
        }
        if target.user_id == user.id() {
            return Err(AuthzError::InvalidInput("The owner cannot be invited to their own mod".to_string()));
        }
        if self.find(target, user)?.is_some() {
            return Err(AuthzError::InvalidInput(format!(
                "{} has already been invited to {}",
                user.username, target.name
            )));
        }

        let mut invite = SharedAuthor::new(user, target);
        self.store.save(&mut invite)?;
        info!(mod_id = target.id(), user = %user.username, "Invited shared author");
        Ok(invite)
    }

    /// Mark an invitation accepted
    pub fn accept(&self, target: &Mod, user: &User) -> Result<SharedAuthor> {
        let mut invite = self.find(target, user)?.ok_or_else(|| not_invited(target, user))?;
        invite.accepted = true;
        self.store.save(&mut invite)?;
        info!(mod_id = target.id(), user = %user.username, "Shared author accepted");
        Ok(invite)
    }

    /// Remove an invitation or co-authorship
    pub fn revoke(&self, target: &Mod, user: &User) -> Result<()> {
        let invite = self.find(target, user)?.ok_or_else(|| not_invited(target, user))?;
        self.store.delete(&invite)?;
        info!(mod_id = target.id(), user = %user.username, "Revoked shared author");
        Ok(())
    }

    /// Hydrated shared authors of a mod, pending ones included
    pub fn authors_of(&self, target: &Mod) -> Result<Vec<SharedAuthor>> {
        self.hydrator.load_all(&Criteria::all().eq("mod_id", target.id()))
    }

    fn find(&self, target: &Mod, user: &User) -> Result<Option<SharedAuthor>> {
        let criteria = Criteria::all().eq("mod_id", target.id()).eq("user_id", user.id());
        Ok(self.store.find_one(&criteria)?)
    }
}

fn not_invited(target: &Mod, user: &User) -> AuthzError {
    AuthzError::NotFound(format!("{} is not a shared author of {}", user.username, target.name))
}
