use bevy::ecs::prelude::{Entity, Event};

#[derive(Event)]
pub struct ChatCommandEvent {
    pub entity: Entity,
    /// Command text without the leading `/`.
    pub command: String,
}
