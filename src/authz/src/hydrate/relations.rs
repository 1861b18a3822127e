//! Relation declarations per record type

use spacedock_core::{Ability, Featured, Game, Mod, Role, SharedAuthor, Store, User};

use super::{ContextId, Hydrate, Hydrator};

impl Hydrate for Ability {
    fn resolve<S: Store>(&mut self, _hydrator: &Hydrator<S>, _ctx: ContextId) {}
}

impl Hydrate for Game {
    fn resolve<S: Store>(&mut self, _hydrator: &Hydrator<S>, _ctx: ContextId) {}
}

impl Hydrate for Role {
    fn resolve<S: Store>(&mut self, hydrator: &Hydrator<S>, ctx: ContextId) {
        self.abilities = hydrator.related_in(ctx, &*self, &Role::ABILITIES);
        self.users = hydrator.related_in(ctx, &*self, &Role::USERS);
    }
}

impl Hydrate for User {
    fn resolve<S: Store>(&mut self, hydrator: &Hydrator<S>, ctx: ContextId) {
        self.roles = hydrator.related_in(ctx, &*self, &User::ROLES);
    }
}

impl Hydrate for Mod {
    fn resolve<S: Store>(&mut self, hydrator: &Hydrator<S>, ctx: ContextId) {
        self.user = hydrator.related_one_in(ctx, &*self, &Mod::USER);
        self.game = hydrator.related_one_in(ctx, &*self, &Mod::GAME);
        self.shared_authors = hydrator.related_in(ctx, &*self, &Mod::SHARED_AUTHORS);
    }
}

impl Hydrate for SharedAuthor {
    fn resolve<S: Store>(&mut self, hydrator: &Hydrator<S>, ctx: ContextId) {
        self.user = hydrator.related_one_in(ctx, &*self, &SharedAuthor::USER);
        self.target_mod = hydrator.related_one_in(ctx, &*self, &SharedAuthor::MOD);
    }
}

impl Hydrate for Featured {
    fn resolve<S: Store>(&mut self, hydrator: &Hydrator<S>, ctx: ContextId) {
        self.target_mod = hydrator.related_one_in(ctx, &*self, &Featured::MOD);
    }
}
