use std::time::Duration;

use async_trait::async_trait;
use bevy::ecs::prelude::Entity;
use blockbridge_game_common::messages::{
    client::ClientMessage,
    server::{JoinError, JoinResponse, ServerMessage},
    EntityId,
};
use blockbridge_network_common::ProtocolVersion;
use scopeguard::ScopeGuard;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::game::messages::control::{ControlMessage, JoinAccepted};

pub mod bedrock;
pub mod java;

/// How often a session in play checks its timers.
pub const SESSION_TICK: Duration = Duration::from_millis(50);

pub struct Client<C> {
    pub entity: Entity,
    pub entity_id: EntityId,
    pub connection: C,
    pub client_message_tx: crossbeam_channel::Sender<ClientMessage>,
    pub server_message_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

#[derive(Debug, Error)]
pub enum ProtocolServerError {
    #[error("server initiated disconnect")]
    ServerInitiatedDisconnect,

    #[error("client disconnected")]
    ClientDisconnected,

    #[error("{0}")]
    TimedOut(&'static str),

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(i32),

    #[error("unexpected {0} during login")]
    UnexpectedPacket(String),

    #[error("invalid player name {0:?}")]
    InvalidName(String),

    #[error("join refused: {0}")]
    JoinRefused(JoinError),

    #[error("game world is not running")]
    WorldUnavailable,
}

impl ProtocolServerError {
    /// Endings that are part of a normal session lifetime.
    pub fn is_clean_exit(error: &anyhow::Error) -> bool {
        matches!(
            error.downcast_ref::<ProtocolServerError>(),
            Some(ProtocolServerError::ServerInitiatedDisconnect)
                | Some(ProtocolServerError::ClientDisconnected)
                | Some(ProtocolServerError::JoinRefused(_))
        )
    }
}

#[async_trait]
pub trait ProtocolServer {
    type Connection: Send;

    async fn run_client(
        &mut self,
        client: &mut Client<Self::Connection>,
    ) -> Result<(), anyhow::Error>;
}

/// A player the game world accepted, before a connection is attached.
pub struct Joined {
    pub entity: Entity,
    pub join: JoinResponse,
    pub client_message_tx: crossbeam_channel::Sender<ClientMessage>,
    pub server_message_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Joined {
    pub fn into_client<C>(self, connection: C) -> Client<C> {
        Client {
            entity: self.entity,
            entity_id: self.join.entity_id,
            connection,
            client_message_tx: self.client_message_tx,
            server_message_rx: self.server_message_rx,
        }
    }
}

/// Asks the game world to add a player and waits for its decision.
pub async fn join_world(
    control_tx: &crossbeam_channel::Sender<ControlMessage>,
    name: String,
    uuid: Uuid,
    version: ProtocolVersion,
) -> Result<Result<Joined, JoinError>, ProtocolServerError> {
    let (client_message_tx, client_message_rx) = crossbeam_channel::unbounded();
    let (server_message_tx, server_message_rx) = mpsc::unbounded_channel();
    let (response_tx, response_rx) = oneshot::channel();

    control_tx
        .send(ControlMessage::AddClient {
            name,
            uuid,
            version,
            client_message_rx,
            server_message_tx,
            response_tx,
        })
        .map_err(|_| ProtocolServerError::WorldUnavailable)?;

    let response = response_rx
        .await
        .map_err(|_| ProtocolServerError::WorldUnavailable)?;
    Ok(response.map(|JoinAccepted { entity, join }| Joined {
        entity,
        join,
        client_message_tx,
        server_message_rx,
    }))
}

/// Tells the game world the player is gone when dropped, whichever way the
/// session ends.
pub fn remove_client_on_drop(
    control_tx: crossbeam_channel::Sender<ControlMessage>,
    entity: Entity,
) -> ScopeGuard<Entity, impl FnOnce(Entity)> {
    scopeguard::guard(entity, move |entity| {
        control_tx
            .send(ControlMessage::RemoveClient { entity })
            .ok();
    })
}

#[macro_export]
macro_rules! implement_protocol_server {
    ( $x:ident, $connection:ty ) => {
        #[async_trait]
        impl ProtocolServer for $x {
            type Connection = $connection;

            async fn run_client(
                &mut self,
                client: &mut Client<$connection>,
            ) -> Result<(), anyhow::Error> {
                let mut tick = tokio::time::interval($crate::protocol::SESSION_TICK);
                tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        packet = client.connection.read_packet() => {
                            match packet {
                                Ok(packet) => {
                                    match self.handle_packet(client, &packet).await {
                                        Ok(_) => {},
                                        Err(error) => {
                                            if !ProtocolServerError::is_clean_exit(&error) {
                                                log::warn!("RECV [{:02X}] {:02x?}", packet.id, &packet.data[..]);
                                            }
                                            return Err(error);
                                        },
                                    }
                                },
                                Err(error) => {
                                    return Err(error.into());
                                }
                            }
                        },
                        server_message = client.server_message_rx.recv() => {
                            if let Some(message) = server_message {
                                self.handle_server_message(client, message).await?;
                            } else {
                                return Err(ProtocolServerError::ServerInitiatedDisconnect.into());
                            }
                        },
                        _ = tick.tick() => {
                            self.handle_tick(client).await?;
                        }
                    };
                }
            }
        }
    };
}
