//! Bedrock sessions over the reliable UDP transport.

use async_trait::async_trait;
use blockbridge_game_common::{
    is_valid_player_name,
    messages::{
        client::ClientMessage,
        server::{JoinError, ServerMessage, WorldTime},
    },
    offline_player_uuid, Position,
};
use blockbridge_network_bedrock::{
    client_packets::{ClientPacket, ResourcePackResponse, TransactionData},
    login::parse_login_chain,
    server_packets::{
        PacketChunkRadiusUpdated, PacketNetworkSettings, PacketPlayStatus, PacketResourcePackStack,
        PacketResourcePacksInfo, PlayStatus,
    },
    BedrockConnection, BedrockPacket, BedrockTransport,
};
use blockbridge_network_common::{Packet, ProtocolVersion, WireFlavor};
use log::{debug, info, trace};
use uuid::Uuid;

use crate::{
    implement_protocol_server,
    protocol::{
        join_world, remove_client_on_drop, Client, ProtocolServer, ProtocolServerError,
    },
    server::ServerContext,
    translate::bedrock::{
        chunk_publisher_packet, disconnect_packet, feet_position, server_message_packets,
        start_game_packet, use_item_intent, StartGameParams,
    },
};

/// Batches at least this large are deflated once compression is on.
const COMPRESSION_THRESHOLD: u16 = 256;

const WORLD_NAME: &str = "Blockbridge";

pub type BedrockSessionConnection = BedrockConnection<Box<dyn BedrockTransport>>;

struct LoggedIn {
    version: ProtocolVersion,
    name: String,
    uuid: Uuid,
}

async fn send<P: BedrockPacket + Send>(
    connection: &mut BedrockSessionConnection,
    version: ProtocolVersion,
    packet: P,
) -> Result<(), anyhow::Error> {
    connection.write_packet(&packet.encode(version)?).await?;
    Ok(())
}

async fn send_play_status(
    connection: &mut BedrockSessionConnection,
    version: ProtocolVersion,
    status: PlayStatus,
) -> Result<(), anyhow::Error> {
    send(connection, version, PacketPlayStatus { status }).await
}

/// Fails the login of a client whose protocol number is not served. The
/// status tells the client which side is out of date.
async fn refuse_version(connection: &mut BedrockSessionConnection, number: i32) -> anyhow::Error {
    let oldest = ProtocolVersion::representative(WireFlavor::Bedrock);
    let status = if number < oldest.wire_number() {
        PlayStatus::LoginFailedClient
    } else {
        PlayStatus::LoginFailedServer
    };
    info!(
        "refusing bedrock protocol {}, supported: {}",
        number,
        ProtocolVersion::supported_names(WireFlavor::Bedrock)
    );
    if let Err(error) =
        send_play_status(connection, ProtocolVersion::LATEST_BEDROCK, status).await
    {
        return error;
    }
    ProtocolServerError::UnsupportedVersion(number).into()
}

async fn refuse_join(
    connection: &mut BedrockSessionConnection,
    version: ProtocolVersion,
    error: &JoinError,
) -> Result<(), anyhow::Error> {
    if matches!(error, JoinError::ServerFull) {
        send_play_status(connection, version, PlayStatus::LoginFailedServerFull).await
    } else {
        send(connection, version, disconnect_packet(&error.to_string())).await
    }
}

async fn read_client_packet(
    connection: &mut BedrockSessionConnection,
    version: ProtocolVersion,
) -> Result<ClientPacket, anyhow::Error> {
    loop {
        let packet = connection.read_packet().await?;
        match ClientPacket::decode(&packet, version)? {
            Some(ClientPacket::Disconnect(_)) => {
                return Err(ProtocolServerError::ClientDisconnected.into())
            }
            Some(packet) => return Ok(packet),
            None => trace!(target: "packets", "ignoring login packet 0x{:02X}", packet.id),
        }
    }
}

/// Network settings, login and the resource pack exchange.
async fn negotiate(connection: &mut BedrockSessionConnection) -> Result<LoggedIn, anyhow::Error> {
    let number = match read_client_packet(connection, ProtocolVersion::LATEST_BEDROCK).await? {
        ClientPacket::RequestNetworkSettings(request) => request.protocol_version,
        other => {
            return Err(ProtocolServerError::UnexpectedPacket(other.name().to_string()).into())
        }
    };
    let Some(version) = ProtocolVersion::lookup(WireFlavor::Bedrock, number) else {
        return Err(refuse_version(connection, number).await);
    };
    send(
        connection,
        version,
        PacketNetworkSettings::deflate(COMPRESSION_THRESHOLD),
    )
    .await?;
    connection.enable_compression();

    let login = match read_client_packet(connection, version).await? {
        ClientPacket::Login(login) => login,
        other => {
            return Err(ProtocolServerError::UnexpectedPacket(other.name().to_string()).into())
        }
    };
    if login.protocol_version != number {
        return Err(refuse_version(connection, login.protocol_version).await);
    }
    let identity = parse_login_chain(&login.chain)?;
    if !is_valid_player_name(&identity.display_name) {
        send(connection, version, disconnect_packet("Invalid username")).await?;
        return Err(ProtocolServerError::InvalidName(identity.display_name).into());
    }
    send_play_status(connection, version, PlayStatus::LoginSuccess).await?;

    send(
        connection,
        version,
        PacketResourcePacksInfo {
            must_accept: false,
            has_scripts: false,
            force_server_packs: false,
        },
    )
    .await?;
    loop {
        match read_client_packet(connection, version).await? {
            ClientPacket::ResourcePackClientResponse(response) => match response.response {
                ResourcePackResponse::Completed => break,
                _ => {
                    send(
                        connection,
                        version,
                        PacketResourcePackStack {
                            must_accept: false,
                            game_version: version.name().to_string(),
                        },
                    )
                    .await?
                }
            },
            other => trace!(target: "packets", "ignoring {} before start game", other.name()),
        }
    }

    let uuid = identity
        .identity
        .unwrap_or_else(|| offline_player_uuid(&identity.display_name));
    Ok(LoggedIn {
        version,
        name: identity.display_name,
        uuid,
    })
}

pub struct BedrockPlayServer {
    version: ProtocolVersion,
    position: Position,
    view_distance: i32,
    spawned: bool,
}

impl BedrockPlayServer {
    async fn write<P: BedrockPacket + Send>(
        &mut self,
        client: &mut Client<BedrockSessionConnection>,
        packet: P,
    ) -> Result<(), anyhow::Error> {
        send(&mut client.connection, self.version, packet).await
    }

    async fn handle_packet(
        &mut self,
        client: &mut Client<BedrockSessionConnection>,
        packet: &Packet,
    ) -> Result<(), anyhow::Error> {
        let packet = match ClientPacket::decode(packet, self.version)? {
            Some(packet) => packet,
            None => return Ok(()),
        };

        match packet {
            ClientPacket::Text(text) => {
                client
                    .client_message_tx
                    .send(ClientMessage::Chat(text.message))?;
            }
            ClientPacket::MovePlayer(movement) => {
                self.position = feet_position(&movement);
                client
                    .client_message_tx
                    .send(ClientMessage::Move(self.position))?;
            }
            ClientPacket::InventoryTransaction(transaction) => {
                if let TransactionData::UseItem(use_item) = &transaction.data {
                    if let Some(intent) = use_item_intent(use_item) {
                        client.client_message_tx.send(intent)?;
                    }
                }
            }
            ClientPacket::RequestChunkRadius(request) => {
                let radius = request.radius.clamp(1, self.view_distance.max(1));
                self.write(client, PacketChunkRadiusUpdated { radius })
                    .await?;
                let publisher = chunk_publisher_packet(&self.position, self.view_distance);
                self.write(client, publisher).await?;
            }
            ClientPacket::SetLocalPlayerAsInitialized(_) => {
                debug!("bedrock entity {} initialised", client.entity_id.0);
            }
            ClientPacket::Disconnect(_) => {
                return Err(ProtocolServerError::ClientDisconnected.into());
            }
            _ => {}
        }

        Ok(())
    }

    async fn handle_server_message(
        &mut self,
        client: &mut Client<BedrockSessionConnection>,
        message: ServerMessage,
    ) -> Result<(), anyhow::Error> {
        let packets = server_message_packets(self.version, client.entity_id, &message)?;
        client.connection.write_packets(&packets).await?;

        match message {
            ServerMessage::Teleport(position) => {
                self.position = position;
                let publisher = chunk_publisher_packet(&position, self.view_distance);
                self.write(client, publisher).await?;
                if !self.spawned {
                    self.spawned = true;
                    self.write(
                        client,
                        PacketPlayStatus {
                            status: PlayStatus::PlayerSpawn,
                        },
                    )
                    .await?;
                }
            }
            ServerMessage::Kick(_) => {
                return Err(ProtocolServerError::ServerInitiatedDisconnect.into());
            }
            _ => {}
        }
        Ok(())
    }

    /// The transport keeps bedrock sessions alive on its own.
    async fn handle_tick(
        &mut self,
        _client: &mut Client<BedrockSessionConnection>,
    ) -> Result<(), anyhow::Error> {
        Ok(())
    }
}

implement_protocol_server! { BedrockPlayServer, BedrockSessionConnection }

/// Serves one bedrock transport session until it closes.
pub async fn run_bedrock_session(
    context: &ServerContext,
    transport: Box<dyn BedrockTransport>,
) -> Result<(), anyhow::Error> {
    let mut connection = BedrockConnection::new(transport);
    let negotiated =
        match tokio::time::timeout(context.config.login_timeout, negotiate(&mut connection)).await
        {
            Ok(negotiated) => negotiated,
            Err(_) => {
                send(
                    &mut connection,
                    ProtocolVersion::LATEST_BEDROCK,
                    disconnect_packet("Login timed out"),
                )
                .await
                .ok();
                Err(ProtocolServerError::TimedOut("Login timed out").into())
            }
        };
    let LoggedIn {
        version,
        name,
        uuid,
    } = negotiated?;

    let joined = match join_world(&context.control_tx, name.clone(), uuid, version).await? {
        Ok(joined) => joined,
        Err(error) => {
            refuse_join(&mut connection, version, &error).await?;
            return Err(ProtocolServerError::JoinRefused(error).into());
        }
    };
    let _remove_client = remove_client_on_drop(context.control_tx.clone(), joined.entity);
    let _online = context.track_online();

    let join = &joined.join;
    let time = WorldTime {
        world_age: join.world_age,
        time_of_day: join.time_of_day,
        frozen: join.frozen,
    };
    send(
        &mut connection,
        version,
        start_game_packet(
            version,
            StartGameParams {
                entity_id: join.entity_id,
                position: join.position,
                time: &time,
                raining: join.raining,
                thundering: false,
                view_distance: context.config.view_distance,
                world_name: WORLD_NAME,
            },
        ),
    )
    .await?;
    info!(
        "{} logged in with {} from {} as entity {}",
        name,
        version.name(),
        connection.peer_addr(),
        join.entity_id.0
    );

    let mut server = BedrockPlayServer {
        version,
        position: join.position,
        view_distance: context.config.view_distance,
        spawned: false,
    };
    let mut client = joined.into_client(connection);
    server.run_client(&mut client).await
}
