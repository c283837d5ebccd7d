use bevy::prelude::Resource;
use blockbridge_game_common::{WorldEvent, WorldSimulation};
use crossbeam_channel::Receiver;

/// The world simulation plus the subscription its changes are broadcast
/// from. Only the game world thread writes to it.
#[derive(Resource)]
pub struct BlockWorld {
    pub simulation: Box<dyn WorldSimulation>,
    pub events: Receiver<WorldEvent>,
}

impl BlockWorld {
    pub fn new(mut simulation: Box<dyn WorldSimulation>) -> Self {
        let events = simulation.subscribe();
        Self { simulation, events }
    }
}
