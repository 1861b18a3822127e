//! Games, mods and the records hanging off them

use serde::{Deserialize, Serialize};

use super::access::User;
use super::relation::Relation;
use super::{impl_record, Model, Record};
use crate::RecordId;

/// A game mods are published for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(flatten)]
    pub model: Model,

    pub name: String,

    /// URL-safe short name (e.g. "kerbal-space-program")
    pub short: String,

    #[serde(default)]
    pub active: bool,
}

impl Game {
    pub fn new(name: impl Into<String>, short: impl Into<String>) -> Self {
        Self {
            model: Model::new(),
            name: name.into(),
            short: short.into(),
            active: true,
        }
    }
}

impl_record!(Game, "games", unique = [["short"]]);

/// A published modification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mod {
    #[serde(flatten)]
    pub model: Model,

    pub name: String,

    /// Owning (primary) author
    pub user_id: RecordId,

    pub game_id: RecordId,

    #[serde(default)]
    pub license: String,

    #[serde(default)]
    pub published: bool,

    #[serde(skip)]
    pub user: Option<User>,

    #[serde(skip)]
    pub game: Option<Game>,

    #[serde(skip)]
    pub shared_authors: Vec<SharedAuthor>,
}

impl Mod {
    pub const USER: Relation = Relation::belongs_to("user", "user_id");
    pub const GAME: Relation = Relation::belongs_to("game", "game_id");
    pub const SHARED_AUTHORS: Relation = Relation::has_many("shared_authors", "mod_id");

    pub fn new(name: impl Into<String>, user: &User, game: &Game, license: impl Into<String>) -> Self {
        Self {
            model: Model::new(),
            name: name.into(),
            user_id: user.id(),
            game_id: game.id(),
            license: license.into(),
            published: false,
            user: Some(user.clone()),
            game: Some(game.clone()),
            shared_authors: Vec::new(),
        }
    }

    /// Short name of the loaded game, if the game relation is populated
    pub fn game_short(&self) -> Option<&str> {
        self.game.as_ref().map(|g| g.short.as_str())
    }
}

impl_record!(Mod, "mods");

/// A co-author invitation on a mod
///
/// `accepted == false` is a pending invitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedAuthor {
    #[serde(flatten)]
    pub model: Model,

    pub user_id: RecordId,

    pub mod_id: RecordId,

    #[serde(default)]
    pub accepted: bool,

    #[serde(skip)]
    pub user: Option<User>,

    #[serde(skip)]
    pub target_mod: Option<Mod>,
}

impl SharedAuthor {
    pub const USER: Relation = Relation::belongs_to("user", "user_id");
    pub const MOD: Relation = Relation::belongs_to("mod", "mod_id");

    /// Create a pending invitation of `user` to co-author `target`
    pub fn new(user: &User, target: &Mod) -> Self {
        Self {
            model: Model::new(),
            user_id: user.id(),
            mod_id: target.id(),
            accepted: false,
            user: Some(user.clone()),
            target_mod: Some(target.clone()),
        }
    }
}

impl_record!(SharedAuthor, "shared_authors", unique = [["user_id", "mod_id"]]);

/// Marker for a mod on the featured list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Featured {
    #[serde(flatten)]
    pub model: Model,

    pub mod_id: RecordId,

    #[serde(skip)]
    pub target_mod: Option<Mod>,
}

impl Featured {
    pub const MOD: Relation = Relation::belongs_to("mod", "mod_id");

    pub fn new(target: &Mod) -> Self {
        Self {
            model: Model::new(),
            mod_id: target.id(),
            target_mod: Some(target.clone()),
        }
    }
}

impl_record!(Featured, "featured", unique = [["mod_id"]]);

#[cfg(test)]
mod tests {
    use super::*;

    fn saved<R: Record>(mut record: R, id: RecordId) -> R {
        record.set_id(id);
        record
    }

    #[test]
    fn test_mod_references_owner_and_game() {
        let user = saved(User::new("alice", "alice@example.com"), 1);
        let game = saved(Game::new("Kerbal Space Program", "kerbal-space-program"), 2);
        let target = Mod::new("DarkMultiPlayer", &user, &game, "MIT");

        assert_eq!(target.user_id, 1);
        assert_eq!(target.game_id, 2);
        assert_eq!(target.game_short(), Some("kerbal-space-program"));
        assert!(!target.published);
    }

    #[test]
    fn test_shared_author_starts_pending() {
        let owner = saved(User::new("alice", "alice@example.com"), 1);
        let guest = saved(User::new("bob", "bob@example.com"), 3);
        let game = saved(Game::new("Factorio", "factorio"), 2);
        let target = saved(Mod::new("CookieEngine", &owner, &game, "GPL"), 4);

        let invite = SharedAuthor::new(&guest, &target);
        assert!(!invite.accepted);
        assert_eq!(invite.user_id, 3);
        assert_eq!(invite.mod_id, 4);

        let row = serde_json::to_value(&invite).unwrap();
        assert!(row.get("user").is_none());
        assert!(row.get("target_mod").is_none());
    }
}
