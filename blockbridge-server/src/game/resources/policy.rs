use std::ops::{Deref, DerefMut};

use bevy::prelude::Resource;
use blockbridge_game_common::PlayerPolicy;

#[derive(Resource)]
pub struct Policy(Box<dyn PlayerPolicy>);

impl Policy {
    pub fn new(policy: Box<dyn PlayerPolicy>) -> Self {
        Self(policy)
    }
}

impl Deref for Policy {
    type Target = dyn PlayerPolicy;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl DerefMut for Policy {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}
