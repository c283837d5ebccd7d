use bevy::ecs::prelude::Component;
use blockbridge_game_common::messages::{client::ClientMessage, server::ServerMessage};
use blockbridge_network_common::ProtocolVersion;
use crossbeam_channel::Receiver;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Component)]
pub struct GameClient {
    pub client_message_rx: Receiver<ClientMessage>,
    pub server_message_tx: UnboundedSender<ServerMessage>,
    pub version: ProtocolVersion,
}

impl GameClient {
    pub fn new(
        client_message_rx: Receiver<ClientMessage>,
        server_message_tx: UnboundedSender<ServerMessage>,
        version: ProtocolVersion,
    ) -> Self {
        Self {
            client_message_rx,
            server_message_tx,
            version,
        }
    }

    /// Sends to this client only. A closed channel means the session is
    /// already on its way out and its removal is queued.
    pub fn send(&self, message: ServerMessage) {
        self.server_message_tx.send(message).ok();
    }
}
