//! Parameter maps
//!
//! A role scopes each of its abilities to resource instances through a
//! two-level map `ability -> parameter -> [pattern, ...]`, persisted as JSON
//! text in `Role::params`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use spacedock_core::Role;
use tracing::warn;

use crate::error::{AuthzError, Result};

/// Structured form of a role's parameter map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamMap(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the persisted JSON text
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| AuthzError::MalformedParams(e.to_string()))
    }

    /// Serialize back to the persisted JSON text
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| AuthzError::MalformedParams(e.to_string()))
    }

    /// Patterns for `[ability][param]`, empty when either key is missing
    pub fn values(&self, ability: &str, param: &str) -> &[String] {
        self.0
            .get(ability)
            .and_then(|params| params.get(param))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append `value` unless already present; returns whether it was added
    pub fn insert(&mut self, ability: &str, param: &str, value: &str) -> bool {
        let values = self
            .0
            .entry(ability.to_string())
            .or_default()
            .entry(param.to_string())
            .or_default();

        if values.iter().any(|v| v == value) {
            return false;
        }
        values.push(value.to_string());
        true
    }

    /// Remove `value`; returns whether it was present
    ///
    /// Emptied containers are kept, so a removed pattern leaves `[]` behind.
    pub fn remove(&mut self, ability: &str, param: &str, value: &str) -> bool {
        let Some(values) = self.0.get_mut(ability).and_then(|params| params.get_mut(param)) else {
            return false;
        };

        match values.iter().position(|v| v == value) {
            Some(index) => {
                values.remove(index);
                true
            }
            None => false,
        }
    }

    /// Abilities with an entry in the map
    pub fn abilities(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Parameters scoped for one ability
    pub fn params_of(&self, ability: &str) -> Option<&BTreeMap<String, Vec<String>>> {
        self.0.get(ability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// In-memory parameter operations on a [`Role`]
///
/// These only rewrite `role.params`; nothing is saved. `RoleManager` wraps
/// the mutators with persistence.
pub trait RoleParams {
    /// Parsed parameter map, empty when the stored text is malformed
    fn param_map(&self) -> ParamMap;

    /// Patterns for `[ability][param]`; empty when missing or malformed
    fn get_params(&self, ability: &str, param: &str) -> Vec<String>;

    /// Add a pattern; a malformed map is returned as an error and left as is
    fn add_param(&mut self, ability: &str, param: &str, value: &str) -> Result<()>;

    /// Remove a pattern; returns whether it was present
    ///
    /// The map is re-serialized either way, so absent entries only normalize
    /// the text.
    fn remove_param(&mut self, ability: &str, param: &str, value: &str) -> Result<bool>;
}

impl RoleParams for Role {
    fn param_map(&self) -> ParamMap {
        ParamMap::parse(&self.params).unwrap_or_else(|e| {
            warn!(role = %self.name, error = %e, "Ignoring malformed parameter map");
            ParamMap::new()
        })
    }

    fn get_params(&self, ability: &str, param: &str) -> Vec<String> {
        self.param_map().values(ability, param).to_vec()
    }

    fn add_param(&mut self, ability: &str, param: &str, value: &str) -> Result<()> {
        let mut map = ParamMap::parse(&self.params)?;
        map.insert(ability, param, value);
        self.params = map.to_json()?;
        Ok(())
    }

    fn remove_param(&mut self, ability: &str, param: &str, value: &str) -> Result<bool> {
        let mut map = ParamMap::parse(&self.params)?;
        let removed = map.remove(ability, param, value);
        self.params = map.to_json()?;
        Ok(removed)
    }
}
