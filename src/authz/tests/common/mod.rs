//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use spacedock_authz::{telemetry, AccessEngine};
use spacedock_core::{Criteria, Game, MemoryStore, Mod, Record, Role, Store, User};

pub fn engine() -> AccessEngine<MemoryStore> {
    telemetry::init("debug");
    AccessEngine::with_defaults(Arc::new(MemoryStore::new())).expect("default config is valid")
}

pub fn store(engine: &AccessEngine<MemoryStore>) -> &MemoryStore {
    engine.hydrator().store().as_ref()
}

/// Saved user holding a personal role of the same name
pub fn user(engine: &AccessEngine<MemoryStore>, name: &str) -> (User, Role) {
    let mut user = User::new(name, format!("{name}@example.com"));
    let role = engine.users().add_role(&mut user, name).unwrap();
    (user, role)
}

/// Fresh, hydrated copy of a saved user
pub fn reload(engine: &AccessEngine<MemoryStore>, user: &User) -> User {
    engine
        .hydrator()
        .load_one(&Criteria::id(user.id()))
        .unwrap()
        .expect("user exists")
}

pub fn game(engine: &AccessEngine<MemoryStore>, name: &str, short: &str) -> Game {
    let mut game = Game::new(name, short);
    store(engine).save(&mut game).unwrap();
    game
}

pub fn published_mod(engine: &AccessEngine<MemoryStore>, name: &str, owner: &User, game: &Game) -> Mod {
    let mut target = Mod::new(name, owner, game, "MIT");
    target.published = true;
    store(engine).save(&mut target).unwrap();
    target
}
