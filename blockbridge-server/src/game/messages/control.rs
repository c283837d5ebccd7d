use bevy::ecs::prelude::Entity;
use blockbridge_game_common::messages::{
    client::ClientMessage,
    server::{JoinError, JoinResponse, ServerMessage},
};
use blockbridge_network_common::ProtocolVersion;
use crossbeam_channel::Receiver;
use tokio::sync::{mpsc::UnboundedSender, oneshot};
use uuid::Uuid;

#[derive(Debug)]
pub struct JoinAccepted {
    pub entity: Entity,
    pub join: JoinResponse,
}

pub enum ControlMessage {
    AddClient {
        name: String,
        uuid: Uuid,
        version: ProtocolVersion,
        client_message_rx: Receiver<ClientMessage>,
        server_message_tx: UnboundedSender<ServerMessage>,
        response_tx: oneshot::Sender<Result<JoinAccepted, JoinError>>,
    },
    RemoveClient {
        entity: Entity,
    },
}
