use bevy::ecs::prelude::{Changed, Entity, Query, Res, ResMut};
use blockbridge_game_common::messages::server::ServerMessage;
use log::info;

use crate::game::{
    components::{GameClient, PlayerInfo, Position},
    resources::{GameConfig, ServerMessages},
};

pub fn void_fall_system(
    mut query: Query<(Entity, &GameClient, &PlayerInfo, &mut Position), Changed<Position>>,
    game_config: Res<GameConfig>,
    mut server_messages: ResMut<ServerMessages>,
) {
    for (entity, game_client, player_info, mut position) in query.iter_mut() {
        if position.y >= game_config.void_fall_threshold {
            continue;
        }

        info!(
            "{} fell out of the world at y {:.1}, returning to spawn",
            player_info.name, position.y
        );
        *position = game_config.spawn;
        game_client.send(ServerMessage::Teleport(game_config.spawn));
        server_messages.send_global_message_except(
            entity,
            ServerMessage::MoveEntity {
                entity_id: player_info.entity_id,
                position: game_config.spawn,
            },
        );
    }
}
