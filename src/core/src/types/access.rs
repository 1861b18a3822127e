//! Users, roles and abilities

use serde::{Deserialize, Serialize};

use super::relation::{Relation, ROLE_ABILITIES, ROLE_USERS};
use super::{impl_record, Model};

/// A named, grantable permission tag (e.g. "mods-edit")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    #[serde(flatten)]
    pub model: Model,

    /// Unique ability name
    pub name: String,
}

impl Ability {
    /// Create an unsaved ability with empty metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            model: Model::new(),
            name: name.into(),
        }
    }
}

impl_record!(Ability, "abilities", unique = [["name"]]);

/// A named bundle of abilities plus their parameter scope
///
/// `params` holds the serialized parameter map
/// (`{"ability": {"param": ["pattern", ...]}}`). The `abilities` and `users`
/// fields are empty until the role is hydrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(flatten)]
    pub model: Model,

    /// Unique role name
    pub name: String,

    /// Serialized parameter map
    #[serde(default = "empty_params")]
    pub params: String,

    #[serde(skip)]
    pub abilities: Vec<Ability>,

    #[serde(skip)]
    pub users: Vec<User>,
}

impl Role {
    pub const ABILITIES: Relation = Relation::many_to_many("abilities", ROLE_ABILITIES);
    pub const USERS: Relation = Relation::many_to_many("users", ROLE_USERS);

    /// Create an unsaved role with an empty parameter map
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            model: Model::new(),
            name: name.into(),
            params: empty_params(),
            abilities: Vec::new(),
            users: Vec::new(),
        }
    }

    /// Names of the abilities currently loaded on this role
    pub fn ability_names(&self) -> Vec<&str> {
        self.abilities.iter().map(|a| a.name.as_str()).collect()
    }
}

impl_record!(Role, "roles", unique = [["name"]]);

fn empty_params() -> String {
    "{}".to_string()
}

/// A site account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub model: Model,

    pub username: String,

    pub email: String,

    /// Whether the profile is publicly listed
    #[serde(default)]
    pub public: bool,

    #[serde(skip)]
    pub roles: Vec<Role>,
}

impl User {
    pub const ROLES: Relation = Relation::many_to_many_inverse("roles", ROLE_USERS);

    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            model: Model::new(),
            username: username.into(),
            email: email.into(),
            public: false,
            roles: Vec::new(),
        }
    }

    /// Find a loaded role by name
    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.name == name)
    }
}

impl_record!(User, "users", unique = [["username"]]);
