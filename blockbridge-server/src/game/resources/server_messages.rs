use bevy::{ecs::prelude::Entity, prelude::Resource};
use blockbridge_game_common::messages::server::ServerMessage;

pub struct PendingMessage {
    /// The client that caused the message and already knows about it.
    pub except: Option<Entity>,
    pub message: ServerMessage,
}

/// Broadcasts queued during a frame, delivered in order at its end.
#[derive(Resource, Default)]
pub struct ServerMessages {
    pub pending_messages: Vec<PendingMessage>,
}

impl ServerMessages {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn send_global_message(&mut self, message: ServerMessage) {
        self.pending_messages.push(PendingMessage {
            except: None,
            message,
        });
    }

    pub fn send_global_message_except(&mut self, except: Entity, message: ServerMessage) {
        self.pending_messages.push(PendingMessage {
            except: Some(except),
            message,
        });
    }
}
