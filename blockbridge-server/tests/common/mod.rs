#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use blockbridge_game_common::{FlatWorld, PlayerLists};
use blockbridge_network_bedrock::{
    channel_listener,
    client_packets::{
        PacketLogin, PacketRequestNetworkSettings, PacketResourcePackClientResponse,
        PacketSetLocalPlayerAsInitialized, ResourcePackResponse,
    },
    login::offline_login_chain,
    server_packets::{PlayStatus, ServerPacket},
    BedrockConnection, BedrockPacket, ChannelConnector, ChannelTransport,
};
use blockbridge_network_common::{
    crypto::generate_shared_secret, Connection, ConnectionState, Direction, ProtocolVersion,
    ServerKeyPair, SessionPacketTable, UnframedCodec, VarIntFrameCodec,
};
use blockbridge_network_java::{
    legacy::LegacyFrameMeasure, JavaPacket, PacketClientStatus, PacketEncryptionResponse,
    PacketHandshake, PacketLoginRequest, CLIENT_STATUS_LOGIN, JAVA_PACKETS,
};
use blockbridge_server::{
    config::ServerConfig,
    game::{GameConfig, GameWorld},
    protocol::java::{run_java_session, JavaFrameCodec},
    server::{run_bedrock_listener, ServerContext},
};
use rsa::{pkcs8::DecodePublicKey, Pkcs1v15Encrypt, RsaPublicKey};
use tokio::io::DuplexStream;
use uuid::Uuid;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestServer {
    pub context: Arc<ServerContext>,
    pub bedrock: ChannelConnector,
}

/// Starts a game world thread plus an in-memory bedrock listener. Java
/// clients are connected per test over duplex pipes.
pub fn start_server(policy: PlayerLists, configure: impl FnOnce(&mut ServerConfig)) -> TestServer {
    let mut config = ServerConfig {
        view_distance: 1,
        ..Default::default()
    };
    configure(&mut config);

    let mut game_config = GameConfig::default();
    game_config.view_distance = config.view_distance;
    game_config.max_players = config.max_players;

    let (control_tx, control_rx) = crossbeam_channel::unbounded();
    let world_config = game_config.clone();
    let surface_depth = world_config.surface_depth;
    std::thread::spawn(move || {
        GameWorld::new(control_rx).run(
            world_config,
            Box::new(FlatWorld::new(surface_depth)),
            Box::new(policy),
        );
    });

    let context = Arc::new(ServerContext::new(
        config,
        game_config,
        ServerKeyPair::generate().unwrap(),
        control_tx,
    ));
    let (listener, bedrock) = channel_listener();
    tokio::spawn(run_bedrock_listener(listener, context.clone()));

    TestServer { context, bedrock }
}

pub struct JavaClient {
    connection: Connection<DuplexStream, JavaFrameCodec>,
    table: SessionPacketTable<'static, JavaPacket>,
    state: ConnectionState,
}

impl JavaClient {
    fn connect(server: &TestServer) -> DuplexStream {
        let (client, session) = tokio::io::duplex(1 << 20);
        let context = server.context.clone();
        tokio::spawn(async move {
            run_java_session(&context, Box::new(session)).await.ok();
        });
        client
    }

    pub fn legacy(server: &TestServer, version: ProtocolVersion) -> Self {
        let codec = JavaFrameCodec::Legacy(UnframedCodec::new(LegacyFrameMeasure::new(
            version,
            Direction::Clientbound,
        )));
        Self {
            connection: Connection::new(Self::connect(server), codec),
            table: JAVA_PACKETS.session_table(version, Direction::Clientbound),
            state: ConnectionState::Handshaking,
        }
    }

    pub fn modern(server: &TestServer, version: ProtocolVersion) -> Self {
        Self {
            connection: Connection::new(
                Self::connect(server),
                JavaFrameCodec::Modern(VarIntFrameCodec::new()),
            ),
            table: JAVA_PACKETS.session_table(version, Direction::Clientbound),
            state: ConnectionState::Handshaking,
        }
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
        if let JavaFrameCodec::Legacy(codec) = self.connection.frame_codec_mut() {
            codec.measure_mut().set_state(state);
        }
    }

    pub fn set_compression_threshold(&mut self, threshold: usize) {
        if let JavaFrameCodec::Modern(codec) = self.connection.frame_codec_mut() {
            codec.set_compression_threshold(Some(threshold));
        }
    }

    pub fn install_cipher(&mut self, shared_secret: &[u8]) {
        self.connection.install_cipher(shared_secret).unwrap();
    }

    pub async fn send(&mut self, packet: impl Into<JavaPacket>) {
        let packet = self.table.encode(self.state, &packet.into()).unwrap();
        self.connection.write_packet(&packet).await.unwrap();
    }

    pub async fn recv(&mut self) -> JavaPacket {
        let packet = tokio::time::timeout(RECV_TIMEOUT, self.connection.read_packet())
            .await
            .expect("timed out waiting for a packet")
            .unwrap();
        self.table.decode(self.state, &packet).unwrap()
    }

    /// Skips packets until `pick` accepts one.
    pub async fn recv_until<T>(&mut self, mut pick: impl FnMut(JavaPacket) -> Option<T>) -> T {
        loop {
            if let Some(picked) = pick(self.recv().await) {
                return picked;
            }
        }
    }

    /// Reads the join sequence up to the spawn teleport and returns the
    /// player's entity id.
    pub async fn finish_join(&mut self) -> i32 {
        let entity_id = match self.recv().await {
            JavaPacket::JoinGame(join) => join.entity_id,
            other => panic!("expected join game, got {:?}", other),
        };
        self.recv_until(|packet| match packet {
            JavaPacket::PlayerPositionLook(_) => Some(()),
            _ => None,
        })
        .await;
        entity_id
    }

    pub async fn wait_for_disconnect(&mut self) -> String {
        self.recv_until(|packet| match packet {
            JavaPacket::Disconnect(disconnect) => Some(disconnect.reason),
            _ => None,
        })
        .await
    }
}

/// Username handshake and login of an Alpha to 1.2 client, left in play.
pub async fn legacy_login(
    server: &TestServer,
    version: ProtocolVersion,
    name: &str,
) -> JavaClient {
    let mut client = JavaClient::legacy(server, version);
    client
        .send(PacketHandshake {
            username: name.to_string(),
            ..Default::default()
        })
        .await;
    match client.recv().await {
        JavaPacket::HandshakeReply(reply) => assert_eq!(reply.connection_hash, "-"),
        other => panic!("expected handshake reply, got {:?}", other),
    }

    client.set_state(ConnectionState::Login);
    client
        .send(PacketLoginRequest {
            protocol_version: version.wire_number(),
            username: name.to_string(),
        })
        .await;
    client.set_state(ConnectionState::Play);
    client
}

/// The 1.3 to 1.6 key exchange, left in play.
pub async fn release_login(server: &TestServer, version: ProtocolVersion, name: &str) -> JavaClient {
    let mut client = JavaClient::legacy(server, version);
    client
        .send(PacketHandshake {
            protocol_version: version.wire_number(),
            username: name.to_string(),
            host: "localhost".to_string(),
            port: 25565,
            next_state: 0,
        })
        .await;

    client.set_state(ConnectionState::Login);
    let request = match client.recv().await {
        JavaPacket::EncryptionRequest(request) => request,
        other => panic!("expected encryption request, got {:?}", other),
    };
    assert_eq!(request.server_id, "-");

    let shared_secret = generate_shared_secret();
    client
        .send(encrypt_response(&request.public_key, &shared_secret, &request.verify_token))
        .await;
    match client.recv().await {
        JavaPacket::EncryptionResponse(response) => {
            assert!(response.shared_secret.is_empty());
            assert!(response.verify_token.is_empty());
        }
        other => panic!("expected empty encryption response, got {:?}", other),
    }
    client.install_cipher(&shared_secret);

    client
        .send(PacketClientStatus {
            action: CLIENT_STATUS_LOGIN,
        })
        .await;
    client.set_state(ConnectionState::Play);
    client
}

pub fn encrypt_response(
    public_key_der: &[u8],
    shared_secret: &[u8],
    verify_token: &[u8],
) -> PacketEncryptionResponse {
    let public_key = RsaPublicKey::from_public_key_der(public_key_der).unwrap();
    let mut rng = rand::thread_rng();
    PacketEncryptionResponse {
        shared_secret: public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, shared_secret)
            .unwrap(),
        verify_token: public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, verify_token)
            .unwrap(),
    }
}

pub struct BedrockClient {
    connection: BedrockConnection<ChannelTransport>,
    version: ProtocolVersion,
}

impl BedrockClient {
    pub fn connect(server: &TestServer, version: ProtocolVersion) -> Self {
        Self {
            connection: BedrockConnection::new(server.bedrock.connect().unwrap()),
            version,
        }
    }

    pub async fn send<P: BedrockPacket>(&mut self, packet: P) {
        let packet = packet.encode(self.version).unwrap();
        self.connection.write_packet(&packet).await.unwrap();
    }

    pub async fn recv(&mut self) -> ServerPacket {
        let packet = tokio::time::timeout(RECV_TIMEOUT, self.connection.read_packet())
            .await
            .expect("timed out waiting for a packet")
            .unwrap();
        ServerPacket::decode(&packet, self.version).unwrap()
    }

    pub async fn recv_until<T>(&mut self, mut pick: impl FnMut(ServerPacket) -> Option<T>) -> T {
        loop {
            if let Some(picked) = pick(self.recv().await) {
                return picked;
            }
        }
    }

    pub async fn request_network_settings(&mut self, protocol_version: i32) -> ServerPacket {
        self.send(PacketRequestNetworkSettings { protocol_version })
            .await;
        self.recv().await
    }

    /// Runs the whole login and returns the runtime entity id once the
    /// server has announced the spawn.
    pub async fn login(&mut self, name: &str) -> u64 {
        let number = self.version.wire_number();
        match self.request_network_settings(number).await {
            ServerPacket::NetworkSettings(_) => {}
            _ => panic!("expected network settings"),
        }
        self.connection.enable_compression();

        self.send(PacketLogin {
            protocol_version: number,
            chain: offline_login_chain(name, Uuid::new_v4()).unwrap(),
            client_data: String::new(),
        })
        .await;
        match self.recv().await {
            ServerPacket::PlayStatus(status) => assert_eq!(status.status, PlayStatus::LoginSuccess),
            _ => panic!("expected login success"),
        }

        assert!(matches!(self.recv().await, ServerPacket::ResourcePacksInfo(_)));
        self.send(PacketResourcePackClientResponse {
            response: ResourcePackResponse::HaveAllPacks,
            packs: Vec::new(),
        })
        .await;
        assert!(matches!(self.recv().await, ServerPacket::ResourcePackStack(_)));
        self.send(PacketResourcePackClientResponse {
            response: ResourcePackResponse::Completed,
            packs: Vec::new(),
        })
        .await;

        let runtime_entity_id = match self.recv().await {
            ServerPacket::StartGame(start_game) => start_game.runtime_entity_id,
            _ => panic!("expected start game"),
        };
        self.recv_until(|packet| match packet {
            ServerPacket::PlayStatus(status) if status.status == PlayStatus::PlayerSpawn => {
                Some(())
            }
            _ => None,
        })
        .await;
        self.send(PacketSetLocalPlayerAsInitialized { runtime_entity_id })
            .await;
        runtime_entity_id
    }
}
