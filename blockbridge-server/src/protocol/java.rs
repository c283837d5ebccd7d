//! Java edition sessions, from the first byte on the socket to play.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use blockbridge_game_common::{
    is_valid_player_name,
    messages::{
        client::{ClientMessage, PlaceBlock},
        server::{JoinResponse, ServerMessage},
    },
    nominal_hotbar, offline_player_uuid, BlockPosition, Position,
};
use blockbridge_network_common::{
    crypto::generate_verify_token, Connection, ConnectionError, ConnectionState, Direction,
    FrameCodec, Packet, PacketError, PacketSet, ProtocolVersion, SessionPacketTable,
    UnframedCodec, VarIntFrameCodec, WireFlavor,
};
use blockbridge_network_java::{
    legacy::{detect_handshake_flavor, ping_response, LegacyFrameMeasure, LegacyPacketId},
    modern::{HANDSHAKE_NEXT_LOGIN, HANDSHAKE_NEXT_STATUS},
    JavaPacket, PacketBlockPlacement, PacketDisconnect, PacketEncryptionRequest,
    PacketEncryptionResponse, PacketHandshake, PacketHandshakeReply, PacketKeepAlive,
    PacketLoginSuccess, PacketSetCompression, PacketStatusResponse, CLIENT_STATUS_LOGIN,
    DIGGING_DROP_ITEM, JAVA_PACKETS,
};
use bytes::BytesMut;
use log::{debug, info, trace};
use serde_json::json;
use tokio::io::{AsyncRead, AsyncWrite};
use uuid::Uuid;

use crate::{
    implement_protocol_server,
    protocol::{
        join_world, remove_client_on_drop, Client, ProtocolServer, ProtocolServerError,
    },
    server::ServerContext,
    translate::{
        inventory::{has_finite_stacks, inventory_packet, restore_packets, Replenisher},
        java::{
            abilities_packet, completes_dig, disconnect_packet, feet_y, join_game_packet,
            server_message_packets, spawn_position_packet,
        },
        placement::placement_target,
    },
};

const HANDSHAKE: u8 = LegacyPacketId::Handshake as u8;
const LOGIN: u8 = LegacyPacketId::Login as u8;
const SERVER_LIST_PING: u8 = LegacyPacketId::ServerListPing as u8;

/// 1.4 and later follow the ping byte with a 0x01 straight away.
const LEGACY_PING_GRACE: Duration = Duration::from_millis(250);
const LEGACY_PING_MAGIC: u8 = 0x01;

pub trait JavaStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> JavaStream for T {}

/// Framing for whichever Java era the session turned out to be.
pub enum JavaFrameCodec {
    Legacy(UnframedCodec<LegacyFrameMeasure>),
    Modern(VarIntFrameCodec),
}

impl JavaFrameCodec {
    pub fn legacy(version: ProtocolVersion) -> Self {
        JavaFrameCodec::Legacy(UnframedCodec::new(LegacyFrameMeasure::new(
            version,
            Direction::Serverbound,
        )))
    }

    fn set_version(&mut self, version: ProtocolVersion) {
        if let JavaFrameCodec::Legacy(codec) = self {
            codec.measure_mut().set_version(version);
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if let JavaFrameCodec::Legacy(codec) = self {
            codec.measure_mut().set_state(state);
        }
    }

    fn set_compression_threshold(&mut self, threshold: Option<usize>) {
        if let JavaFrameCodec::Modern(codec) = self {
            codec.set_compression_threshold(threshold);
        }
    }
}

impl FrameCodec for JavaFrameCodec {
    fn decode_frame(&mut self, buffer: &mut BytesMut) -> Result<Option<Packet>, ConnectionError> {
        match self {
            JavaFrameCodec::Legacy(codec) => codec.decode_frame(buffer),
            JavaFrameCodec::Modern(codec) => codec.decode_frame(buffer),
        }
    }

    fn encode_frame(
        &mut self,
        packet: &Packet,
        buffer: &mut BytesMut,
    ) -> Result<(), ConnectionError> {
        match self {
            JavaFrameCodec::Legacy(codec) => codec.encode_frame(packet, buffer),
            JavaFrameCodec::Modern(codec) => codec.encode_frame(packet, buffer),
        }
    }
}

pub type JavaConnection = Connection<Box<dyn JavaStream>, JavaFrameCodec>;

enum Opening {
    LegacyPing,
    Legacy(WireFlavor),
    Modern,
}

struct LoggedIn {
    version: ProtocolVersion,
    name: String,
}

fn unexpected(packet: &JavaPacket) -> anyhow::Error {
    ProtocolServerError::UnexpectedPacket(format!("{:?}", packet.kind())).into()
}

/// The connection while it is still working out who the client is.
struct JavaLogin<'a> {
    context: &'a ServerContext,
    connection: JavaConnection,
    table: SessionPacketTable<'static, JavaPacket>,
    state: ConnectionState,
}

impl<'a> JavaLogin<'a> {
    fn new(context: &'a ServerContext, stream: Box<dyn JavaStream>) -> Self {
        let version = ProtocolVersion::representative(WireFlavor::Modern);
        Self {
            context,
            connection: Connection::new(stream, JavaFrameCodec::Modern(VarIntFrameCodec::new())),
            table: JAVA_PACKETS.session_table(version, Direction::Serverbound),
            state: ConnectionState::Handshaking,
        }
    }

    fn version(&self) -> ProtocolVersion {
        self.table.version()
    }

    fn set_version(&mut self, version: ProtocolVersion) {
        if version != self.table.version() {
            self.table = JAVA_PACKETS.session_table(version, Direction::Serverbound);
        }
        self.connection.frame_codec_mut().set_version(version);
    }

    fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
        self.connection.frame_codec_mut().set_state(state);
    }

    fn use_legacy_framing(&mut self, version: ProtocolVersion) {
        *self.connection.frame_codec_mut() = JavaFrameCodec::legacy(version);
        self.set_version(version);
    }

    async fn read(&mut self) -> Result<JavaPacket, anyhow::Error> {
        let packet = self.connection.read_packet().await?;
        Ok(self.table.decode(self.state, &packet)?)
    }

    async fn write(&mut self, packet: JavaPacket) -> Result<(), anyhow::Error> {
        let packet = self.table.encode(self.state, &packet)?;
        self.connection.write_packet(&packet).await?;
        Ok(())
    }

    /// Sends the era's disconnect for the current state.
    async fn refuse(&mut self, reason: &str) -> Result<(), anyhow::Error> {
        info!("refusing {} client: {}", self.version().name(), reason);
        self.write(disconnect_packet(self.version(), reason)).await
    }

    async fn check_name(&mut self, name: &str) -> Result<(), anyhow::Error> {
        if is_valid_player_name(name) {
            Ok(())
        } else {
            self.refuse("Invalid username").await?;
            Err(ProtocolServerError::InvalidName(name.to_string()).into())
        }
    }

    /// Runs the era's login. `None` means the connection was only a server
    /// list query and has been answered.
    async fn negotiate(&mut self) -> Result<Option<LoggedIn>, anyhow::Error> {
        let opening = self
            .connection
            .peek_with(|buffer| {
                Ok(match buffer.first() {
                    None => None,
                    Some(&SERVER_LIST_PING) => Some(Opening::LegacyPing),
                    Some(&HANDSHAKE) => detect_handshake_flavor(buffer).map(Opening::Legacy),
                    Some(_) => Some(Opening::Modern),
                })
            })
            .await?;

        match opening {
            Opening::LegacyPing => {
                self.answer_legacy_ping().await?;
                Ok(None)
            }
            Opening::Legacy(WireFlavor::LegacyVersioned) => self.release_login().await.map(Some),
            Opening::Legacy(flavor) => self.legacy_login(flavor).await.map(Some),
            Opening::Modern => self.modern_handshake().await,
        }
    }

    async fn answer_legacy_ping(&mut self) -> Result<(), anyhow::Error> {
        let probe = self.connection.peek_with(|buffer| {
            Ok((buffer.len() >= 2).then(|| buffer[1] == LEGACY_PING_MAGIC))
        });
        let with_magic = match tokio::time::timeout(LEGACY_PING_GRACE, probe).await {
            Ok(with_magic) => with_magic?,
            Err(_) => false,
        };

        let (version, reported) = if with_magic {
            (ProtocolVersion::Release1_6_4, Some(ProtocolVersion::Release1_6_4))
        } else {
            (ProtocolVersion::Beta1_8, None)
        };
        self.use_legacy_framing(version);

        let context = self.context;
        let config = &context.config;
        let reason = ping_response(
            reported,
            &config.motd,
            context.online_players(),
            config.max_players,
        );
        self.write(PacketDisconnect { reason }.into()).await
    }

    /// Alpha through 1.2.4: username handshake, then a login packet whose
    /// leading protocol number fixes the version.
    async fn legacy_login(&mut self, flavor: WireFlavor) -> Result<LoggedIn, anyhow::Error> {
        self.use_legacy_framing(ProtocolVersion::representative(flavor));
        match self.read().await? {
            JavaPacket::Handshake(_) => {}
            other => return Err(unexpected(&other)),
        }
        self.write(
            PacketHandshakeReply {
                connection_hash: "-".to_string(),
            }
            .into(),
        )
        .await?;

        self.set_state(ConnectionState::Login);
        let number = self
            .connection
            .peek_with(|buffer| {
                Ok(match buffer {
                    [LOGIN, a, b, c, d, ..] => Some(Some(i32::from_be_bytes([*a, *b, *c, *d]))),
                    [id, ..] if *id != LOGIN => Some(None),
                    _ => None,
                })
            })
            .await?;
        let Some(number) = number else {
            let packet = self.read().await?;
            return Err(unexpected(&packet));
        };

        let Some(version) = ProtocolVersion::lookup(flavor, number) else {
            self.refuse(&unsupported_reason(flavor)).await?;
            return Err(ProtocolServerError::UnsupportedVersion(number).into());
        };
        self.set_version(version);

        let login = match self.read().await? {
            JavaPacket::LoginRequest(login) => login,
            other => return Err(unexpected(&other)),
        };
        self.check_name(&login.username).await?;
        Ok(LoggedIn {
            version,
            name: login.username,
        })
    }

    /// 1.3 through 1.6: versioned handshake followed by the mandatory key
    /// exchange.
    async fn release_login(&mut self) -> Result<LoggedIn, anyhow::Error> {
        self.use_legacy_framing(ProtocolVersion::representative(WireFlavor::LegacyVersioned));
        let handshake = match self.read().await? {
            JavaPacket::Handshake(handshake) => handshake,
            other => return Err(unexpected(&other)),
        };
        let Some(version) =
            ProtocolVersion::lookup(WireFlavor::LegacyVersioned, handshake.protocol_version)
        else {
            self.refuse(&unsupported_reason(WireFlavor::LegacyVersioned))
                .await?;
            return Err(ProtocolServerError::UnsupportedVersion(handshake.protocol_version).into());
        };
        self.set_version(version);
        self.check_name(&handshake.username).await?;

        self.set_state(ConnectionState::Login);
        self.exchange_keys("-").await?;

        match self.read().await? {
            JavaPacket::ClientStatus(status) if status.action == CLIENT_STATUS_LOGIN => {}
            other => return Err(unexpected(&other)),
        }
        Ok(LoggedIn {
            version,
            name: handshake.username,
        })
    }

    /// Key request, key response, and the cipher on both directions. Pre-netty
    /// clients wait for an empty response before switching.
    async fn exchange_keys(&mut self, server_id: &str) -> Result<(), anyhow::Error> {
        let context = self.context;
        let key_pair = &context.key_pair;
        let verify_token = generate_verify_token();
        self.write(
            PacketEncryptionRequest {
                server_id: server_id.to_string(),
                public_key: key_pair.public_key_der().to_vec(),
                verify_token: verify_token.to_vec(),
            }
            .into(),
        )
        .await?;

        let response = match self.read().await? {
            JavaPacket::EncryptionResponse(response) => response,
            other => return Err(unexpected(&other)),
        };
        let shared_secret = key_pair.decrypt_shared_secret(
            &response.shared_secret,
            &response.verify_token,
            &verify_token,
        )?;

        if self.version().is_unframed() {
            self.write(PacketEncryptionResponse::default().into())
                .await?;
        }
        self.connection.install_cipher(&shared_secret)?;
        debug!("cipher installed for {} session", self.version().name());
        Ok(())
    }

    async fn modern_handshake(&mut self) -> Result<Option<LoggedIn>, anyhow::Error> {
        let handshake = match self.read().await? {
            JavaPacket::Handshake(handshake) => handshake,
            other => return Err(unexpected(&other)),
        };
        let version = ProtocolVersion::lookup(WireFlavor::Modern, handshake.protocol_version);

        match handshake.next_state {
            HANDSHAKE_NEXT_STATUS => {
                self.set_version(version.unwrap_or(ProtocolVersion::LATEST_JAVA));
                self.set_state(ConnectionState::Status);
                self.answer_status(&handshake).await?;
                Ok(None)
            }
            HANDSHAKE_NEXT_LOGIN => {
                self.set_state(ConnectionState::Login);
                let Some(version) = version else {
                    self.set_version(ProtocolVersion::LATEST_JAVA);
                    self.refuse(&unsupported_reason(WireFlavor::Modern)).await?;
                    return Err(
                        ProtocolServerError::UnsupportedVersion(handshake.protocol_version).into(),
                    );
                };
                self.set_version(version);
                self.modern_login().await.map(Some)
            }
            other => Err(ProtocolServerError::UnexpectedPacket(format!(
                "handshake next state {}",
                other
            ))
            .into()),
        }
    }

    async fn answer_status(&mut self, handshake: &PacketHandshake) -> Result<(), anyhow::Error> {
        match self.read().await? {
            JavaPacket::StatusRequest(_) => {}
            other => return Err(unexpected(&other)),
        }

        let context = self.context;
        let config = &context.config;
        let supported = ProtocolVersion::lookup(WireFlavor::Modern, handshake.protocol_version);
        let reported = supported.unwrap_or(ProtocolVersion::LATEST_JAVA);
        let json = json!({
            "version": {
                "name": reported.name(),
                "protocol": reported.wire_number(),
            },
            "players": {
                "max": config.max_players,
                "online": context.online_players(),
                "sample": [],
            },
            "description": { "text": config.motd },
        })
        .to_string();
        self.write(PacketStatusResponse { json }.into()).await?;

        // Clients may hang up without measuring latency.
        match self.read().await {
            Ok(JavaPacket::StatusPing(ping)) => self.write(ping.into()).await,
            Ok(other) => Err(unexpected(&other)),
            Err(_) => Ok(()),
        }
    }

    async fn modern_login(&mut self) -> Result<LoggedIn, anyhow::Error> {
        let start = match self.read().await? {
            JavaPacket::LoginRequest(start) => start,
            other => return Err(unexpected(&other)),
        };
        self.check_name(&start.username).await?;

        if self.context.config.modern_encryption {
            self.exchange_keys("").await?;
        }

        if self.version().is_at_least(ProtocolVersion::Modern1_8) {
            if let Some(threshold) = self.context.config.compression_threshold {
                self.write(
                    PacketSetCompression {
                        threshold: threshold as i32,
                    }
                    .into(),
                )
                .await?;
                self.connection
                    .frame_codec_mut()
                    .set_compression_threshold(Some(threshold));
            }
        }

        Ok(LoggedIn {
            version: self.version(),
            name: start.username,
        })
    }

    /// Everything a client needs before the world's join burst arrives.
    async fn enter_play(
        &mut self,
        name: &str,
        uuid: Uuid,
        join: &JoinResponse,
    ) -> Result<(), anyhow::Error> {
        let version = self.version();
        if version.flavor() == WireFlavor::Modern {
            self.write(
                PacketLoginSuccess {
                    uuid: uuid.hyphenated().to_string(),
                    username: name.to_string(),
                }
                .into(),
            )
            .await?;
        }

        self.set_state(ConnectionState::Play);
        self.write(join_game_packet(
            version,
            join.entity_id,
            self.context.config.max_players,
        ))
        .await?;
        self.write(spawn_position_packet(&join.position)).await?;
        if let Some(abilities) = abilities_packet(version) {
            self.write(abilities).await?;
        }
        if has_finite_stacks(version) {
            self.write(inventory_packet(version, &nominal_hotbar()))
                .await?;
        }
        Ok(())
    }
}

fn unsupported_reason(flavor: WireFlavor) -> String {
    format!(
        "Unsupported client version, use one of: {}",
        ProtocolVersion::supported_names(flavor)
    )
}

/// A Java session in play.
pub struct JavaPlayServer {
    version: ProtocolVersion,
    table: SessionPacketTable<'static, JavaPacket>,
    position: Position,
    replenisher: Option<Replenisher>,
    keep_alive_interval: Duration,
    idle_timeout: Duration,
    last_received: Instant,
    last_keep_alive: Instant,
}

impl JavaPlayServer {
    fn new(
        context: &ServerContext,
        table: SessionPacketTable<'static, JavaPacket>,
        position: Position,
    ) -> Self {
        let version = table.version();
        let now = Instant::now();
        Self {
            version,
            table,
            position,
            replenisher: has_finite_stacks(version)
                .then(|| Replenisher::new(context.game_config.replenish_window)),
            keep_alive_interval: context.config.keep_alive_interval,
            idle_timeout: context.config.idle_timeout,
            last_received: now,
            last_keep_alive: now,
        }
    }

    async fn write(
        &mut self,
        client: &mut Client<JavaConnection>,
        packet: &JavaPacket,
    ) -> Result<(), anyhow::Error> {
        if !self.table.can_encode(ConnectionState::Play, packet.kind()) {
            trace!(target: "packets", "{:?} has no {} layout", packet.kind(), self.version.name());
            return Ok(());
        }
        let packet = self.table.encode(ConnectionState::Play, packet)?;
        client.connection.write_packet(&packet).await?;
        Ok(())
    }

    fn send_move(&self, client: &mut Client<JavaConnection>) -> Result<(), anyhow::Error> {
        client
            .client_message_tx
            .send(ClientMessage::Move(self.position))?;
        Ok(())
    }

    fn handle_placement(
        &mut self,
        client: &mut Client<JavaConnection>,
        placement: PacketBlockPlacement,
    ) -> Result<(), anyhow::Error> {
        let Some(item) = placement.item else {
            return Ok(());
        };
        let clicked = BlockPosition::new(placement.x, placement.y, placement.z);
        let Some(position) = placement_target(clicked, placement.direction) else {
            return Ok(());
        };

        client
            .client_message_tx
            .send(ClientMessage::PlaceBlock(PlaceBlock {
                position,
                item_id: item.id as i32,
            }))?;
        if let Some(replenisher) = self.replenisher.as_mut() {
            replenisher.consume_selected(Instant::now());
        }
        Ok(())
    }

    async fn handle_packet(
        &mut self,
        client: &mut Client<JavaConnection>,
        packet: &Packet,
    ) -> Result<(), anyhow::Error> {
        self.last_received = Instant::now();
        let packet = match self.table.decode(ConnectionState::Play, packet) {
            Ok(packet) => packet,
            Err(PacketError::UnknownPacket { id }) => {
                trace!(target: "packets", "ignoring unknown packet 0x{:02X}", id);
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };

        let now = Instant::now();
        match packet {
            JavaPacket::ChatMessage(chat) => {
                client
                    .client_message_tx
                    .send(ClientMessage::Chat(chat.message))?;
            }
            JavaPacket::PlayerOnGround(packet) => {
                self.position.on_ground = packet.on_ground;
            }
            JavaPacket::PlayerPosition(packet) => {
                self.position.x = packet.x;
                self.position.y = feet_y(self.version, packet.y);
                self.position.z = packet.z;
                self.position.on_ground = packet.on_ground;
                self.send_move(client)?;
            }
            JavaPacket::PlayerLook(packet) => {
                self.position.yaw = packet.yaw;
                self.position.pitch = packet.pitch;
                self.position.on_ground = packet.on_ground;
                self.send_move(client)?;
            }
            JavaPacket::PlayerPositionLook(packet) => {
                self.position = Position {
                    x: packet.x,
                    y: feet_y(self.version, packet.y),
                    z: packet.z,
                    yaw: packet.yaw,
                    pitch: packet.pitch,
                    on_ground: packet.on_ground,
                };
                self.send_move(client)?;
            }
            JavaPacket::PlayerDigging(digging) => {
                if digging.status == DIGGING_DROP_ITEM {
                    if let Some(replenisher) = self.replenisher.as_mut() {
                        replenisher.drop_selected(now);
                    }
                } else if completes_dig(self.version, digging.status) {
                    client
                        .client_message_tx
                        .send(ClientMessage::DigBlock(BlockPosition::new(
                            digging.x, digging.y, digging.z,
                        )))?;
                }
            }
            JavaPacket::BlockPlacement(placement) => self.handle_placement(client, placement)?,
            JavaPacket::HeldItemChange(held) => {
                if let (Some(replenisher), Ok(slot)) =
                    (self.replenisher.as_mut(), usize::try_from(held.slot))
                {
                    replenisher.select_slot(slot);
                }
            }
            JavaPacket::HoldingChange(holding) => {
                if let Some(replenisher) = self.replenisher.as_mut() {
                    replenisher.select_item(holding.item_id as u16);
                }
            }
            JavaPacket::PickupSpawn(drop) => {
                if let Some(replenisher) = self.replenisher.as_mut() {
                    replenisher.drop_item(drop.item.id as u16, drop.item.count as u8, now);
                }
            }
            JavaPacket::Disconnect(_) => {
                return Err(ProtocolServerError::ClientDisconnected.into());
            }
            _ => {}
        }

        Ok(())
    }

    async fn handle_server_message(
        &mut self,
        client: &mut Client<JavaConnection>,
        message: ServerMessage,
    ) -> Result<(), anyhow::Error> {
        if let ServerMessage::Teleport(position) = &message {
            self.position = *position;
        }

        for packet in server_message_packets(self.version, &message)? {
            self.write(client, &packet).await?;
        }

        if matches!(message, ServerMessage::Kick(_)) {
            return Err(ProtocolServerError::ServerInitiatedDisconnect.into());
        }
        Ok(())
    }

    async fn handle_tick(&mut self, client: &mut Client<JavaConnection>) -> Result<(), anyhow::Error> {
        let now = Instant::now();
        if now.duration_since(self.last_received) >= self.idle_timeout {
            self.write(client, &disconnect_packet(self.version, "Timed out"))
                .await
                .ok();
            return Err(ProtocolServerError::TimedOut("Timed out").into());
        }

        if now.duration_since(self.last_keep_alive) >= self.keep_alive_interval {
            self.last_keep_alive = now;
            let keep_alive = PacketKeepAlive {
                id: rand::random::<i32>() & i32::MAX,
            };
            self.write(client, &keep_alive.into()).await?;
        }

        let restores = match self.replenisher.as_mut() {
            Some(replenisher) => {
                let restored = replenisher.due(now);
                restore_packets(self.version, replenisher.hotbar(), &restored)
            }
            None => Vec::new(),
        };
        for packet in restores {
            self.write(client, &packet).await?;
        }
        Ok(())
    }
}

implement_protocol_server! { JavaPlayServer, JavaConnection }

/// Serves one Java connection until it closes.
pub async fn run_java_session(
    context: &ServerContext,
    stream: Box<dyn JavaStream>,
) -> Result<(), anyhow::Error> {
    let mut login = JavaLogin::new(context, stream);
    let negotiated =
        match tokio::time::timeout(context.config.login_timeout, login.negotiate()).await {
            Ok(negotiated) => negotiated,
            Err(_) => {
                login.refuse("Login timed out").await.ok();
                Err(ProtocolServerError::TimedOut("Login timed out").into())
            }
        };
    let LoggedIn { version, name } = match negotiated {
        Ok(Some(logged_in)) => logged_in,
        Ok(None) => {
            login.connection.shutdown().await;
            return Ok(());
        }
        Err(error) => {
            login.connection.shutdown().await;
            return Err(error);
        }
    };

    let uuid = offline_player_uuid(&name);
    let joined = match join_world(&context.control_tx, name.clone(), uuid, version).await? {
        Ok(joined) => joined,
        Err(error) => {
            login.refuse(&error.to_string()).await?;
            login.connection.shutdown().await;
            return Err(ProtocolServerError::JoinRefused(error).into());
        }
    };
    let _remove_client = remove_client_on_drop(context.control_tx.clone(), joined.entity);
    let _online = context.track_online();

    login.enter_play(&name, uuid, &joined.join).await?;
    info!(
        "{} logged in with {} as entity {}",
        name,
        version.name(),
        joined.join.entity_id.0
    );

    let JavaLogin {
        connection, table, ..
    } = login;
    let mut server = JavaPlayServer::new(context, table, joined.join.position);
    let mut client = joined.into_client(connection);
    let result = server.run_client(&mut client).await;
    client.connection.shutdown().await;
    result
}
