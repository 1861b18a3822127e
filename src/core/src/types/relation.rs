//! Relation declarations
//!
//! Records describe their associations with [`Relation`] constants; the store
//! uses the declaration to find related rows and the hydrator uses it to know
//! which fields to fill.

/// A many-to-many join table between two record tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinTable {
    /// Join table name
    pub name: &'static str,

    /// Table of the left column
    pub left: &'static str,

    /// Table of the right column
    pub right: &'static str,
}

impl JoinTable {
    pub const fn new(name: &'static str, left: &'static str, right: &'static str) -> Self {
        Self { name, left, right }
    }
}

/// Roles ↔ abilities granted by the role
pub const ROLE_ABILITIES: JoinTable = JoinTable::new("role_abilities", "roles", "abilities");

/// Roles ↔ users holding the role
pub const ROLE_USERS: JoinTable = JoinTable::new("role_users", "roles", "users");

/// How a relation is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Join rows are (owner, target)
    ManyToMany { join: JoinTable },

    /// Join rows are (target, owner)
    ManyToManyInverse { join: JoinTable },

    /// Foreign key column on the owner row
    BelongsTo { foreign_key: &'static str },

    /// Foreign key column on each target row
    HasMany { foreign_key: &'static str },
}

/// A named relation field on a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub name: &'static str,
    pub kind: RelationKind,
}

impl Relation {
    pub const fn many_to_many(name: &'static str, join: JoinTable) -> Self {
        Self {
            name,
            kind: RelationKind::ManyToMany { join },
        }
    }

    pub const fn many_to_many_inverse(name: &'static str, join: JoinTable) -> Self {
        Self {
            name,
            kind: RelationKind::ManyToManyInverse { join },
        }
    }

    pub const fn belongs_to(name: &'static str, foreign_key: &'static str) -> Self {
        Self {
            name,
            kind: RelationKind::BelongsTo { foreign_key },
        }
    }

    pub const fn has_many(name: &'static str, foreign_key: &'static str) -> Self {
        Self {
            name,
            kind: RelationKind::HasMany { foreign_key },
        }
    }
}

/// Every join table the store maintains
pub const JOIN_TABLES: &[JoinTable] = &[ROLE_ABILITIES, ROLE_USERS];
