use bevy::ecs::prelude::Component;
use blockbridge_game_common::{
    messages::{server::PlayerSpawn, EntityId},
    Position,
};
use uuid::Uuid;

#[derive(Component, Clone, Debug)]
pub struct PlayerInfo {
    pub entity_id: EntityId,
    pub name: String,
    pub uuid: Uuid,
}

impl PlayerInfo {
    pub fn spawn(&self, position: Position) -> PlayerSpawn {
        PlayerSpawn {
            entity_id: self.entity_id,
            uuid: self.uuid,
            name: self.name.clone(),
            position,
        }
    }
}
