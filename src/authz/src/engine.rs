//! Access engine
//!
//! Wires every component over one shared store and one hydrator so request
//! handlers need a single handle.
//!
//! ```text
//! Request → Authorizer → User roles (Hydrator) → ParamMap → PatternCache → allow/deny
//!              ↓
//!        RoleManager / UserRoles / SharedAuthors / FeaturedMods
//! ```

use std::sync::Arc;

use spacedock_core::{Store, User};
use tracing::info;

use crate::ability::AbilityRegistry;
use crate::authorize::Authorizer;
use crate::config::AccessConfig;
use crate::featured::FeaturedMods;
use crate::hydrate::Hydrator;
use crate::role::RoleManager;
use crate::shared_author::SharedAuthors;
use crate::user::UserRoles;

/// All access components over one store
pub struct AccessEngine<S> {
    hydrator: Hydrator<S>,
    abilities: AbilityRegistry<S>,
    roles: RoleManager<S>,
    authorizer: Authorizer<S>,
    users: UserRoles<S>,
    shared_authors: SharedAuthors<S>,
    featured: FeaturedMods<S>,
}

impl<S> Clone for AccessEngine<S> {
    fn clone(&self) -> Self {
        Self {
            hydrator: self.hydrator.clone(),
            abilities: self.abilities.clone(),
            roles: self.roles.clone(),
            authorizer: self.authorizer.clone(),
            users: self.users.clone(),
            shared_authors: self.shared_authors.clone(),
            featured: self.featured.clone(),
        }
    }
}

impl<S: Store> AccessEngine<S> {
    /// Build the engine from a validated configuration
    pub fn new(store: Arc<S>, config: &AccessConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let hydrator = Hydrator::new(store).with_max_depth(config.hydration.max_depth);
        let authorizer = Authorizer::new(hydrator.clone(), config.authorization.pattern_cache_capacity);

        info!(
            max_depth = config.hydration.max_depth,
            pattern_cache_capacity = config.authorization.pattern_cache_capacity,
            "Access engine ready"
        );

        Ok(Self {
            abilities: AbilityRegistry::new(Arc::clone(hydrator.store())),
            roles: RoleManager::new(hydrator.clone()),
            users: UserRoles::new(hydrator.clone()),
            shared_authors: SharedAuthors::new(hydrator.clone()),
            featured: FeaturedMods::new(hydrator.clone(), authorizer.clone()),
            authorizer,
            hydrator,
        })
    }

    /// Engine with default configuration
    pub fn with_defaults(store: Arc<S>) -> anyhow::Result<Self> {
        Self::new(store, &AccessConfig::default())
    }

    pub fn hydrator(&self) -> &Hydrator<S> {
        &self.hydrator
    }

    pub fn abilities(&self) -> &AbilityRegistry<S> {
        &self.abilities
    }

    pub fn roles(&self) -> &RoleManager<S> {
        &self.roles
    }

    pub fn authorizer(&self) -> &Authorizer<S> {
        &self.authorizer
    }

    pub fn users(&self) -> &UserRoles<S> {
        &self.users
    }

    pub fn shared_authors(&self) -> &SharedAuthors<S> {
        &self.shared_authors
    }

    pub fn featured(&self) -> &FeaturedMods<S> {
        &self.featured
    }

    /// Shorthand for [`Authorizer::authorize`]
    pub fn authorize(&self, user: &User, ability: &str, param: &str, value: &str) -> bool {
        self.authorizer.authorize(user, ability, param, value)
    }
}
