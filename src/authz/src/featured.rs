//! Featured mods
//!
//! Featuring is gated by the `mods-feature` ability scoped on the
//! `gameshort` parameter, so game admins can curate their own game only.

use std::sync::Arc;

use spacedock_core::{Criteria, Featured, Game, Mod, Record, RecordId, Store, User};
use tracing::info;

use crate::authorize::Authorizer;
use crate::error::{AuthzError, Result};
use crate::hydrate::Hydrator;

/// Ability required to change the featured list
pub const FEATURE_ABILITY: &str = "mods-feature";

/// Feature, unfeature and list mods
pub struct FeaturedMods<S> {
    store: Arc<S>,
    hydrator: Hydrator<S>,
    authorizer: Authorizer<S>,
}

impl<S> Clone for FeaturedMods<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hydrator: self.hydrator.clone(),
            authorizer: self.authorizer.clone(),
        }
    }
}

impl<S: Store> FeaturedMods<S> {
    pub fn new(hydrator: Hydrator<S>, authorizer: Authorizer<S>) -> Self {
        Self {
            store: Arc::clone(hydrator.store()),
            hydrator,
            authorizer,
        }
    }

    /// Put a published mod of `gameshort` on the featured list
    pub fn feature_mod(&self, actor: &User, gameshort: &str, mod_id: RecordId) -> Result<Featured> {
        let target = self.featurable(actor, gameshort, mod_id)?;
        if self.marker(mod_id)?.is_some() {
            return Err(AuthzError::AlreadyFeatured);
        }

        let mut featured = Featured::new(&target);
        self.store.save(&mut featured)?;
        info!(mod_id, gameshort, actor = %actor.username, "Featured mod");
        Ok(featured)
    }

    /// Take a mod off the featured list
    pub fn unfeature_mod(&self, actor: &User, gameshort: &str, mod_id: RecordId) -> Result<()> {
        self.featurable(actor, gameshort, mod_id)?;
        let featured = self.marker(mod_id)?.ok_or(AuthzError::NotFeatured)?;

        self.store.delete(&featured)?;
        info!(mod_id, gameshort, actor = %actor.username, "Unfeatured mod");
        Ok(())
    }

    /// Featured markers, optionally only those of one game
    pub fn list_featured(&self, gameshort: Option<&str>) -> Result<Vec<Featured>> {
        let featured: Vec<Featured> = self.hydrator.load_all(&Criteria::all())?;
        let Some(short) = gameshort else {
            return Ok(featured);
        };

        let game: Game = self
            .store
            .find_one(&Criteria::all().eq("short", short))?
            .ok_or_else(|| AuthzError::InvalidGame(short.to_string()))?;

        Ok(featured
            .into_iter()
            .filter(|f| f.target_mod.as_ref().is_some_and(|m| m.game_id == game.id()))
            .collect())
    }

    /// Authorize the actor and check the mod can be (un)featured
    fn featurable(&self, actor: &User, gameshort: &str, mod_id: RecordId) -> Result<Mod> {
        self.authorizer.require(actor, FEATURE_ABILITY, "gameshort", gameshort)?;

        let target: Mod = self
            .hydrator
            .load_one(&Criteria::id(mod_id))?
            .ok_or(AuthzError::ModNotFound(mod_id))?;

        if target.game_short() != Some(gameshort) {
            return Err(AuthzError::InvalidGame(gameshort.to_string()));
        }
        if !target.published {
            return Err(AuthzError::NotPublished);
        }
        Ok(target)
    }

    fn marker(&self, mod_id: RecordId) -> Result<Option<Featured>> {
        Ok(self.store.find_one(&Criteria::all().eq("mod_id", mod_id))?)
    }
}
