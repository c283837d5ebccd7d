use bevy::{
    ecs::prelude::{Res, ResMut},
    time::Time,
};
use blockbridge_game_common::messages::server::ServerMessage;

use crate::game::resources::{ServerMessages, WorldTime};

pub fn world_time_system(
    time: Res<Time>,
    mut world_time: ResMut<WorldTime>,
    mut server_messages: ResMut<ServerMessages>,
) {
    if world_time.advance(time.delta()) {
        server_messages.send_global_message(ServerMessage::Time(world_time.snapshot()));
    }
}
