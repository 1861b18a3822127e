//! # SpaceDock Access Core
//!
//! Role, ability and parameter based authorization for the SpaceDock
//! backend, on top of a depth-bounded relation hydrator.
//!
//! ## Features
//!
//! - **Scoped abilities**: a role grants an ability only for resource
//!   instances whose parameter matches one of the role's patterns
//! - **Relation hydration** bounded per execution context, safe on cyclic
//!   graphs and under concurrent requests
//! - **Find-or-create abilities** with race-free creation
//! - **Compiled pattern cache** shared by all checks
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use spacedock_authz::AccessEngine;
//! use spacedock_core::{Criteria, MemoryStore, Record, User};
//!
//! fn main() -> anyhow::Result<()> {
//!     let engine = AccessEngine::with_defaults(Arc::new(MemoryStore::new()))?;
//!
//!     let mut alice = User::new("alice", "alice@example.com");
//!     let mut role = engine.users().add_role(&mut alice, "alice")?;
//!     engine.roles().add_ability(&mut role, "mods-edit")?;
//!     engine.roles().add_param(&mut role, "mods-edit", "modid", "42")?;
//!
//!     let alice: User = engine
//!         .hydrator()
//!         .load_one(&Criteria::id(alice.id()))?
//!         .expect("alice was saved");
//!
//!     assert!(engine.authorize(&alice, "mods-edit", "modid", "42"));
//!     assert!(!engine.authorize(&alice, "mods-edit", "modid", "43"));
//!     Ok(())
//! }
//! ```

pub mod ability;
pub mod authorize;
pub mod config;
pub mod engine;
pub mod error;
pub mod featured;
pub mod hydrate;
pub mod role;
pub mod shared_author;
pub mod telemetry;
pub mod user;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use ability::AbilityRegistry;
pub use authorize::{Authorizer, PatternCache, PatternCacheStats};
pub use config::AccessConfig;
pub use engine::AccessEngine;
pub use error::{AuthzError, Result};
pub use featured::{FeaturedMods, FEATURE_ABILITY};
pub use hydrate::{ContextId, DepthTracker, Hydrate, Hydrator};
pub use role::{ParamMap, RoleManager, RoleParams, RoleSummary};
pub use shared_author::SharedAuthors;
pub use user::UserRoles;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
