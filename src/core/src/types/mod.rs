//! Storage records shared by the access layer
//!
//! A record is a plain serde struct whose serialized form is the persisted
//! row. Relation fields are marked `#[serde(skip)]`: they never reach the
//! store and are only ever populated by hydration.

pub mod relation;
pub mod access;
pub mod content;

pub use relation::{JoinTable, Relation, RelationKind, ROLE_ABILITIES, ROLE_USERS};
pub use access::{Ability, Role, User};
pub use content::{Featured, Game, Mod, SharedAuthor};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RecordId;

/// Columns every record carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Store-assigned identifier, `0` until the first save
    #[serde(default)]
    pub id: RecordId,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Free-form metadata blob
    #[serde(default = "empty_meta")]
    pub meta: Value,
}

impl Model {
    /// Create an unsaved model stamped with the current time
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            created_at: now,
            updated_at: now,
            meta: empty_meta(),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_meta() -> Value {
    Value::Object(Default::default())
}

/// A persisted entity
///
/// Implementors name their table and the column groups that must be unique
/// across rows; stores enforce those groups on save.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table the rows live in
    const TABLE: &'static str;

    /// Column groups whose combined values must be unique
    const UNIQUE: &'static [&'static [&'static str]] = &[];

    fn model(&self) -> &Model;

    fn model_mut(&mut self) -> &mut Model;

    fn id(&self) -> RecordId {
        self.model().id
    }

    fn set_id(&mut self, id: RecordId) {
        self.model_mut().id = id;
    }

    /// Whether the record has been saved at least once
    fn is_persisted(&self) -> bool {
        self.id() != 0
    }

    /// Stamp the update time before a save
    fn touch(&mut self, now: DateTime<Utc>) {
        self.model_mut().updated_at = now;
    }
}

macro_rules! impl_record {
    ($ty:ty, $table:literal $(, unique = [$([$($col:literal),+]),+])?) => {
        impl $crate::types::Record for $ty {
            const TABLE: &'static str = $table;
            const UNIQUE: &'static [&'static [&'static str]] = &[$($(&[$($col),+]),+)?];

            fn model(&self) -> &$crate::types::Model {
                &self.model
            }

            fn model_mut(&mut self) -> &mut $crate::types::Model {
                &mut self.model
            }
        }
    };
}

pub(crate) use impl_record;
