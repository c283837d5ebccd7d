use bevy::{
    app::AppExit,
    ecs::prelude::{Commands, EventWriter, Query, Res, ResMut},
};
use blockbridge_game_common::{
    messages::server::{JoinError, JoinResponse, ServerMessage},
    Position,
};
use crossbeam_channel::TryRecvError;
use log::info;

use crate::game::{
    components::{GameClient, PlayerInfo},
    messages::control::{ControlMessage, JoinAccepted},
    resources::{
        BlockWorld, ControlChannel, GameConfig, Policy, PlayerList, ServerMessages, Weather,
        WorldTime,
    },
};

#[allow(clippy::too_many_arguments)]
pub fn control_server_system(
    mut commands: Commands,
    channel: Res<ControlChannel>,
    game_config: Res<GameConfig>,
    block_world: Res<BlockWorld>,
    policy: Res<Policy>,
    world_time: Res<WorldTime>,
    weather: Res<Weather>,
    mut player_list: ResMut<PlayerList>,
    mut server_messages: ResMut<ServerMessages>,
    position_query: Query<&Position>,
    mut app_exit_events: EventWriter<AppExit>,
) {
    loop {
        let message = match channel.control_rx.try_recv() {
            Ok(message) => message,
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                info!("all listeners have closed, stopping the game world");
                app_exit_events.send(AppExit);
                break;
            }
        };

        match message {
            ControlMessage::AddClient {
                name,
                uuid,
                version,
                client_message_rx,
                server_message_tx,
                response_tx,
            } => {
                let rejection = if policy.is_banned(&name) {
                    Some(JoinError::Banned)
                } else if policy.is_kicked(&name) {
                    Some(JoinError::Kicked)
                } else if player_list.find_by_name(&name).is_some() {
                    Some(JoinError::NameInUse)
                } else if player_list.len() >= game_config.max_players {
                    Some(JoinError::ServerFull)
                } else {
                    None
                };
                if let Some(error) = rejection {
                    info!("refused {} ({}): {}", name, version.name(), error);
                    response_tx.send(Err(error)).ok();
                    continue;
                }

                let player_info = PlayerInfo {
                    entity_id: player_list.allocate_entity_id(),
                    name,
                    uuid,
                };
                let position = game_config.spawn;
                let game_client = GameClient::new(client_message_rx, server_message_tx, version);

                // Join burst: terrain, the players already here, the sky,
                // and finally the teleport that places the client.
                let (spawn_chunk_x, spawn_chunk_z) = position.chunk();
                let view_distance = game_config.view_distance;
                for chunk_x in spawn_chunk_x - view_distance..=spawn_chunk_x + view_distance {
                    for chunk_z in spawn_chunk_z - view_distance..=spawn_chunk_z + view_distance {
                        game_client.send(ServerMessage::ChunkData(Box::new(
                            block_world.simulation.column_snapshot(chunk_x, chunk_z),
                        )));
                    }
                }
                for (other_entity, other_info) in player_list.iter() {
                    let other_position = position_query
                        .get(other_entity)
                        .copied()
                        .unwrap_or(game_config.spawn);
                    game_client.send(ServerMessage::SpawnPlayer(other_info.spawn(other_position)));
                }
                game_client.send(ServerMessage::Time(world_time.snapshot()));
                if weather.raining || weather.thundering {
                    game_client.send(ServerMessage::Weather {
                        raining: weather.raining,
                        thundering: weather.thundering,
                    });
                }
                game_client.send(ServerMessage::Teleport(position));

                let entity = commands
                    .spawn((game_client, player_info.clone(), position))
                    .id();

                let join = JoinResponse {
                    entity_id: player_info.entity_id,
                    position,
                    world_age: world_time.world_age,
                    time_of_day: world_time.time_of_day,
                    frozen: world_time.frozen,
                    raining: weather.raining,
                };
                if response_tx.send(Ok(JoinAccepted { entity, join })).is_err() {
                    // The session went away while waiting.
                    commands.entity(entity).despawn();
                    continue;
                }

                info!(
                    "{} joined as entity {} using {}",
                    player_info.name,
                    player_info.entity_id.0,
                    version.name()
                );
                server_messages.send_global_message_except(
                    entity,
                    ServerMessage::SpawnPlayer(player_info.spawn(position)),
                );
                server_messages.send_global_message_except(
                    entity,
                    ServerMessage::Chat(format!("{} joined the game", player_info.name)),
                );
                player_list.insert(entity, player_info);
            }
            ControlMessage::RemoveClient { entity } => {
                if let Some(player_info) = player_list.remove(entity) {
                    info!("{} left the game", player_info.name);
                    commands.entity(entity).despawn();
                    server_messages.send_global_message_except(
                        entity,
                        ServerMessage::RemovePlayer {
                            entity_id: player_info.entity_id,
                            uuid: player_info.uuid,
                            name: player_info.name.clone(),
                        },
                    );
                    server_messages.send_global_message_except(
                        entity,
                        ServerMessage::Chat(format!("{} left the game", player_info.name)),
                    );
                }
            }
        }
    }
}
