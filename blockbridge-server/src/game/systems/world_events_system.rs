use bevy::ecs::prelude::{Res, ResMut};
use blockbridge_game_common::{messages::server::ServerMessage, WorldEvent};

use crate::game::resources::{BlockWorld, ServerMessages};

pub fn world_events_system(block_world: Res<BlockWorld>, mut server_messages: ResMut<ServerMessages>) {
    while let Ok(event) = block_world.events.try_recv() {
        match event {
            WorldEvent::BlockChanged { position, block } => {
                server_messages.send_global_message(ServerMessage::BlockChanged { position, block });
            }
        }
    }
}
