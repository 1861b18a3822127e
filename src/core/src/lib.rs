//! # SpaceDock Core
//!
//! Storage-facing records and the persistence collaborator for the SpaceDock
//! access layer. This package holds everything the authorization crate loads
//! and saves, so that records referencing each other (users, roles, mods)
//! live in one place.

pub mod types;
pub mod store;
pub mod error;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use store::{Criteria, MemoryStore, Store};
pub use types::{
    Ability, Featured, Game, JoinTable, Mod, Model, Record, Relation, RelationKind, Role,
    SharedAuthor, User, ROLE_ABILITIES, ROLE_USERS,
};

/// Identifier assigned to a record by the store (`0` means "not yet saved")
pub type RecordId = u64;
