use std::collections::BTreeMap;

use bevy::{ecs::prelude::Entity, prelude::Resource};
use blockbridge_game_common::messages::EntityId;

use crate::game::components::PlayerInfo;

/// Connected players by entity id. Updated as soon as a join or leave is
/// handled, so lookups in the same frame already see it.
#[derive(Resource, Default)]
pub struct PlayerList {
    players: BTreeMap<EntityId, (Entity, PlayerInfo)>,
    last_entity_id: i32,
}

impl PlayerList {
    pub fn new() -> Self {
        Default::default()
    }

    /// Next free non-zero entity id.
    pub fn allocate_entity_id(&mut self) -> EntityId {
        loop {
            self.last_entity_id = if self.last_entity_id >= i32::MAX - 1 {
                1
            } else {
                self.last_entity_id + 1
            };

            let entity_id = EntityId(self.last_entity_id);
            if !self.players.contains_key(&entity_id) {
                return entity_id;
            }
        }
    }

    pub fn insert(&mut self, entity: Entity, info: PlayerInfo) {
        self.players.insert(info.entity_id, (entity, info));
    }

    pub fn remove(&mut self, entity: Entity) -> Option<PlayerInfo> {
        let entity_id = self
            .players
            .iter()
            .find(|(_, (player_entity, _))| *player_entity == entity)
            .map(|(entity_id, _)| *entity_id)?;
        self.players.remove(&entity_id).map(|(_, info)| info)
    }

    pub fn find_by_name(&self, name: &str) -> Option<(Entity, &PlayerInfo)> {
        self.players
            .values()
            .find(|(_, info)| info.name.eq_ignore_ascii_case(name))
            .map(|(entity, info)| (*entity, info))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &PlayerInfo)> {
        self.players.values().map(|(entity, info)| (*entity, info))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
