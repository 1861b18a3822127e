//! Ability registry
//!
//! Abilities are an open set of names created on first reference. Lookups
//! are by name; the store's unique constraint on `name` settles races
//! between contexts creating the same ability.

use std::sync::Arc;

use regex::Regex;
use spacedock_core::{Ability, Criteria, Store};
use tracing::{debug, info};

use crate::error::{AuthzError, Result};

/// Find-or-create access to abilities
pub struct AbilityRegistry<S> {
    store: Arc<S>,
}

impl<S> Clone for AbilityRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> AbilityRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Return the ability named `name`, creating it if needed
    ///
    /// Idempotent. When another context wins the race to create the same
    /// name, the stored ability is re-read and returned.
    pub fn ensure(&self, name: &str) -> Result<Ability> {
        if let Some(ability) = self.find(name)? {
            return Ok(ability);
        }

        let mut ability = Ability::new(name);
        match self.store.save(&mut ability) {
            Ok(()) => {
                info!(ability = name, id = ability.model.id, "Created ability");
                Ok(ability)
            }
            Err(e) if e.is_conflict() => {
                debug!(ability = name, "Ability created concurrently, re-reading");
                match self.find(name)? {
                    Some(stored) => Ok(stored),
                    None => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn find(&self, name: &str) -> Result<Option<Ability>> {
        Ok(self.store.find_one(&Criteria::all().eq("name", name))?)
    }

    /// Every registered ability, oldest first
    pub fn list(&self) -> Result<Vec<Ability>> {
        Ok(self.store.find_all(&Criteria::all())?)
    }

    /// Registered abilities whose name contains a match for `expression`
    ///
    /// Unlike parameter patterns this is a search, not a full match:
    /// `"^mods-"` selects every mods ability.
    pub fn matching(&self, expression: &str) -> Result<Vec<Ability>> {
        let pattern = Regex::new(expression).map_err(|e| AuthzError::InvalidPattern(e.to_string()))?;

        Ok(self
            .list()?
            .into_iter()
            .filter(|ability| pattern.is_match(&ability.name))
            .collect())
    }
}
