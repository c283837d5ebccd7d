use bevy::ecs::prelude::{Entity, Query, ResMut};

use crate::game::{components::GameClient, resources::ServerMessages};

pub fn server_messages_system(
    query: Query<(Entity, &GameClient)>,
    mut server_messages: ResMut<ServerMessages>,
) {
    for (entity, game_client) in query.iter() {
        for pending in server_messages.pending_messages.iter() {
            if pending.except != Some(entity) {
                game_client.send(pending.message.clone());
            }
        }
    }

    server_messages.pending_messages.clear();
}
