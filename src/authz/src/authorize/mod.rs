//! Authorization check
//!
//! A user may perform `ability` against a resource when one of their roles
//! holds the ability *and* scopes it to the resource: the role's parameter
//! map lists, for the named parameter, a pattern matching the candidate
//! value in full.
//!
//! Every failure mode (unknown ability, malformed parameter map, invalid
//! pattern, storage error) is a denial. Denials carry no reason.

mod patterns;

pub use patterns::{PatternCache, PatternCacheStats, DEFAULT_PATTERN_CAPACITY};

use std::sync::Arc;

use spacedock_core::{Criteria, Record, RecordId, Role, Store, User};
use tracing::{debug, warn};

use crate::ability::AbilityRegistry;
use crate::error::{AuthzError, Result};
use crate::hydrate::Hydrator;
use crate::role::RoleParams;

/// Stateless permission checker
pub struct Authorizer<S> {
    hydrator: Hydrator<S>,
    abilities: AbilityRegistry<S>,
    patterns: Arc<PatternCache>,
}

impl<S> Clone for Authorizer<S> {
    fn clone(&self) -> Self {
        Self {
            hydrator: self.hydrator.clone(),
            abilities: self.abilities.clone(),
            patterns: Arc::clone(&self.patterns),
        }
    }
}

impl<S: Store> Authorizer<S> {
    pub fn new(hydrator: Hydrator<S>, pattern_capacity: usize) -> Self {
        Self {
            abilities: AbilityRegistry::new(Arc::clone(hydrator.store())),
            hydrator,
            patterns: Arc::new(PatternCache::new(pattern_capacity)),
        }
    }

    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Check a hydrated user
    ///
    /// Only the roles already loaded on `user` are consulted, each with its
    /// loaded ability set.
    pub fn authorize(&self, user: &User, ability: &str, param: &str, value: &str) -> bool {
        let Some(ability_id) = self.ability_id(ability) else {
            debug!(user = %user.username, ability, "Denied: unknown ability");
            return false;
        };

        let granted = user
            .roles
            .iter()
            .find(|role| self.role_grants(role, ability_id, ability, param, value));

        match granted {
            Some(role) => {
                debug!(user = %user.username, role = %role.name, ability, param, value, "Allowed");
                true
            }
            None => {
                debug!(user = %user.username, ability, param, value, "Denied");
                false
            }
        }
    }

    /// Load and hydrate a user by id, then check it; unknown users are denied
    pub fn authorize_user(&self, user_id: RecordId, ability: &str, param: &str, value: &str) -> bool {
        match self.hydrator.load_one::<User>(&Criteria::id(user_id)) {
            Ok(Some(user)) => self.authorize(&user, ability, param, value),
            Ok(None) => {
                debug!(user_id, ability, "Denied: unknown user");
                false
            }
            Err(e) => {
                warn!(user_id, ability, error = %e, "Failed to load user, denying");
                false
            }
        }
    }

    /// Passes when any `(param, value)` pair passes
    pub fn authorize_any(&self, user: &User, ability: &str, checks: &[(&str, &str)]) -> bool {
        checks
            .iter()
            .any(|(param, value)| self.authorize(user, ability, param, value))
    }

    /// [`authorize`](Self::authorize) as a `Forbidden` error on denial
    pub fn require(&self, user: &User, ability: &str, param: &str, value: &str) -> Result<()> {
        if self.authorize(user, ability, param, value) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden {
                ability: ability.to_string(),
            })
        }
    }

    fn ability_id(&self, ability: &str) -> Option<RecordId> {
        match self.abilities.find(ability) {
            Ok(found) => found.map(|a| a.id()),
            Err(e) => {
                warn!(ability, error = %e, "Ability lookup failed, denying");
                None
            }
        }
    }

    fn role_grants(&self, role: &Role, ability_id: RecordId, ability: &str, param: &str, value: &str) -> bool {
        if !role.abilities.iter().any(|a| a.id() == ability_id) {
            return false;
        }

        role.get_params(ability, param)
            .iter()
            .any(|pattern| self.patterns.is_match(pattern, value))
    }
}
