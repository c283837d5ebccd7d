use bevy::ecs::prelude::{Entity, EventWriter, Query, Res, ResMut};
use blockbridge_game_common::{
    messages::{
        client::{ClientMessage, PlaceBlock},
        server::ServerMessage,
    },
    BlockIdentity, BlockPosition,
};
use log::{debug, info};

use crate::{
    game::{
        components::{GameClient, PlayerInfo, Position},
        events::ChatCommandEvent,
        resources::{BlockWorld, GameConfig, ServerMessages},
    },
    translate::placement::resolve_placement,
};

/// Puts back whatever is really at `position` on a client that predicted
/// something else.
fn send_block_correction(game_client: &GameClient, block_world: &BlockWorld, position: BlockPosition) {
    game_client.send(ServerMessage::BlockChanged {
        position,
        block: block_world.simulation.block_at(position),
    });
}

fn place_block(
    game_client: &GameClient,
    player_info: &PlayerInfo,
    block_world: &mut BlockWorld,
    game_config: &GameConfig,
    place: PlaceBlock,
) {
    let target = place.position;
    let placed = resolve_placement(
        target,
        place.item_id,
        block_world.simulation.surface_depth(),
        game_config.max_build_height,
    )
    .map_err(|rejection| rejection.to_string())
    .and_then(|block| {
        if block_world.simulation.is_solid_at(target.x, target.y, target.z) {
            Err(format!("{:?} is occupied", target))
        } else {
            block_world
                .simulation
                .set_block(target, block)
                .map_err(|error| error.to_string())
        }
    });

    if let Err(reason) = placed {
        debug!("placement by {} rejected: {}", player_info.name, reason);
        send_block_correction(game_client, block_world, target);
    }
}

fn dig_block(
    game_client: &GameClient,
    player_info: &PlayerInfo,
    block_world: &mut BlockWorld,
    position: BlockPosition,
) {
    if let Err(error) = block_world
        .simulation
        .set_block(position, BlockIdentity::AIR)
    {
        debug!("dig by {} rejected: {}", player_info.name, error);
        send_block_correction(game_client, block_world, position);
    }
}

pub fn client_messages_system(
    mut query: Query<(Entity, &GameClient, &PlayerInfo, &mut Position)>,
    game_config: Res<GameConfig>,
    mut block_world: ResMut<BlockWorld>,
    mut server_messages: ResMut<ServerMessages>,
    mut chat_command_events: EventWriter<ChatCommandEvent>,
) {
    for (entity, game_client, player_info, mut position) in query.iter_mut() {
        while let Ok(message) = game_client.client_message_rx.try_recv() {
            match message {
                ClientMessage::Move(new_position) => {
                    *position = new_position;
                    server_messages.send_global_message_except(
                        entity,
                        ServerMessage::MoveEntity {
                            entity_id: player_info.entity_id,
                            position: new_position,
                        },
                    );
                }
                ClientMessage::Chat(text) => {
                    if let Some(command) = text.strip_prefix('/') {
                        chat_command_events.send(ChatCommandEvent {
                            entity,
                            command: command.to_string(),
                        });
                    } else {
                        info!("<{}> {}", player_info.name, text);
                        server_messages.send_global_message(ServerMessage::Chat(format!(
                            "<{}> {}",
                            player_info.name, text
                        )));
                    }
                }
                ClientMessage::PlaceBlock(place) => place_block(
                    game_client,
                    player_info,
                    &mut block_world,
                    &game_config,
                    place,
                ),
                ClientMessage::DigBlock(block_position) => {
                    dig_block(game_client, player_info, &mut block_world, block_position)
                }
            }
        }
    }
}
