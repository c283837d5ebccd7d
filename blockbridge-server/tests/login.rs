mod common;

use std::time::Duration;

use blockbridge_game_common::{offline_player_uuid, PlayerLists, PlayerPolicy};
use blockbridge_network_bedrock::server_packets::{PlayStatus, ServerPacket};
use blockbridge_network_common::{ConnectionState, ProtocolVersion};
use blockbridge_network_java::{
    modern::{HANDSHAKE_NEXT_LOGIN, HANDSHAKE_NEXT_STATUS},
    JavaPacket, PacketChatMessage, PacketHandshake, PacketLoginRequest, PacketServerListPing,
    PacketStatusPing, PacketStatusRequest,
};
use common::{legacy_login, release_login, start_server, BedrockClient, JavaClient};

#[tokio::test]
async fn beta_1_7_login_reaches_play() {
    let server = start_server(PlayerLists::in_memory(), |_| {});
    let mut client = legacy_login(&server, ProtocolVersion::Beta1_7, "Alice").await;

    let entity_id = client.finish_join().await;
    assert!(entity_id > 0);
    assert_eq!(server.context.online_players(), 1);
}

#[tokio::test]
async fn release_1_4_6_login_is_encrypted() {
    let server = start_server(PlayerLists::in_memory(), |_| {});
    let mut client = release_login(&server, ProtocolVersion::Release1_4_6, "Carol").await;

    let entity_id = client.finish_join().await;
    assert!(entity_id > 0);
}

#[tokio::test]
async fn modern_1_8_login_turns_on_compression() {
    let server = start_server(PlayerLists::in_memory(), |config| {
        config.modern_encryption = false;
        config.compression_threshold = Some(256);
    });
    let mut client = JavaClient::modern(&server, ProtocolVersion::Modern1_8);
    client
        .send(PacketHandshake {
            protocol_version: ProtocolVersion::Modern1_8.wire_number(),
            host: "localhost".to_string(),
            port: 25565,
            next_state: HANDSHAKE_NEXT_LOGIN,
            ..Default::default()
        })
        .await;
    client.set_state(ConnectionState::Login);
    client
        .send(PacketLoginRequest {
            username: "Dave".to_string(),
            ..Default::default()
        })
        .await;

    match client.recv().await {
        JavaPacket::SetCompression(compression) => assert_eq!(compression.threshold, 256),
        other => panic!("expected set compression, got {:?}", other),
    }
    client.set_compression_threshold(256);

    match client.recv().await {
        JavaPacket::LoginSuccess(success) => {
            assert_eq!(success.username, "Dave");
            assert_eq!(
                success.uuid,
                offline_player_uuid("Dave").hyphenated().to_string()
            );
        }
        other => panic!("expected login success, got {:?}", other),
    }
    client.set_state(ConnectionState::Play);
    assert!(client.finish_join().await > 0);
}

#[tokio::test]
async fn modern_status_reports_players_and_echoes_ping() {
    let server = start_server(PlayerLists::in_memory(), |config| {
        config.motd = "Hello there".to_string();
        config.max_players = 7;
    });
    let mut client = JavaClient::modern(&server, ProtocolVersion::Modern1_7_6);
    client
        .send(PacketHandshake {
            protocol_version: ProtocolVersion::Modern1_7_6.wire_number(),
            host: "localhost".to_string(),
            port: 25565,
            next_state: HANDSHAKE_NEXT_STATUS,
            ..Default::default()
        })
        .await;
    client.set_state(ConnectionState::Status);
    client.send(PacketStatusRequest).await;

    let json = match client.recv().await {
        JavaPacket::StatusResponse(response) => response.json,
        other => panic!("expected status response, got {:?}", other),
    };
    let status: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(status["description"]["text"], "Hello there");
    assert_eq!(status["players"]["max"], 7);
    assert_eq!(status["players"]["online"], 0);
    assert_eq!(
        status["version"]["protocol"],
        ProtocolVersion::Modern1_7_6.wire_number()
    );

    client.send(PacketStatusPing { payload: 42 }).await;
    match client.recv().await {
        JavaPacket::StatusPing(pong) => assert_eq!(pong.payload, 42),
        other => panic!("expected pong, got {:?}", other),
    }
}

#[tokio::test]
async fn legacy_ping_with_magic_gets_the_1_4_format() {
    let server = start_server(PlayerLists::in_memory(), |config| {
        config.motd = "Old times".to_string();
    });
    let mut client = JavaClient::legacy(&server, ProtocolVersion::Release1_6_4);
    client
        .send(PacketServerListPing { magic: Some(1) })
        .await;

    let reason = client.wait_for_disconnect().await;
    let fields: Vec<&str> = reason.split('\0').collect();
    assert_eq!(fields[0], "\u{a7}1");
    assert_eq!(fields[1], "78");
    assert_eq!(fields[3], "Old times");
    assert_eq!(fields[4], "0");
    assert_eq!(fields[5], "20");
}

#[tokio::test]
async fn unknown_modern_version_is_refused_during_login() {
    let server = start_server(PlayerLists::in_memory(), |_| {});
    let mut client = JavaClient::modern(&server, ProtocolVersion::Modern1_8);
    client
        .send(PacketHandshake {
            protocol_version: 9999,
            host: "localhost".to_string(),
            port: 25565,
            next_state: HANDSHAKE_NEXT_LOGIN,
            ..Default::default()
        })
        .await;
    client.set_state(ConnectionState::Login);

    let reason = client.wait_for_disconnect().await;
    let reason: serde_json::Value = serde_json::from_str(&reason).unwrap();
    let text = reason["text"].as_str().unwrap();
    assert!(text.contains("1.8"), "{}", text);
}

#[tokio::test]
async fn banned_player_is_refused() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("players.json");
    let mut lists = PlayerLists::load(&path).unwrap();
    lists.ban("Mallory").unwrap();
    let lists = PlayerLists::load(&path).unwrap();
    assert!(lists.is_banned("mallory"));

    let server = start_server(lists, |_| {});
    let mut client = legacy_login(&server, ProtocolVersion::Beta1_7, "Mallory").await;
    let reason = client.wait_for_disconnect().await;
    assert_eq!(reason, "You are banned from this server");
    assert_eq!(server.context.online_players(), 0);
}

#[tokio::test]
async fn online_name_is_refused_in_any_case() {
    let server = start_server(PlayerLists::in_memory(), |_| {});
    let mut alice = legacy_login(&server, ProtocolVersion::Beta1_7, "Alice").await;
    alice.finish_join().await;

    let mut impostor = legacy_login(&server, ProtocolVersion::Beta1_7, "ALICE").await;
    let reason = impostor.wait_for_disconnect().await;
    assert_eq!(reason, "A player with that name is already online");
    assert_eq!(server.context.online_players(), 1);
}

#[tokio::test]
async fn full_server_refuses_the_next_player() {
    let server = start_server(PlayerLists::in_memory(), |config| {
        config.max_players = 1;
    });
    let mut alice = legacy_login(&server, ProtocolVersion::Beta1_7, "Alice").await;
    alice.finish_join().await;

    let mut bob = legacy_login(&server, ProtocolVersion::Beta1_7, "Bob").await;
    let reason = bob.wait_for_disconnect().await;
    assert_eq!(reason, "The server is full");
    assert_eq!(server.context.online_players(), 1);
}

#[tokio::test]
async fn silent_client_is_timed_out() {
    let server = start_server(PlayerLists::in_memory(), |config| {
        config.idle_timeout = Duration::from_secs(1);
    });
    let mut client = legacy_login(&server, ProtocolVersion::Beta1_7, "Quiet").await;
    client.finish_join().await;

    let reason = client.wait_for_disconnect().await;
    assert_eq!(reason, "Timed out");
}

#[tokio::test]
async fn ban_command_disconnects_and_persists() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("players.json");
    let mut lists = PlayerLists::load(&path).unwrap();
    lists.op("Olivia").unwrap();

    let server = start_server(lists, |_| {});
    let mut olivia = legacy_login(&server, ProtocolVersion::Beta1_7, "Olivia").await;
    olivia.finish_join().await;
    let mut mallory = legacy_login(&server, ProtocolVersion::Beta1_7, "Mallory").await;
    mallory.finish_join().await;

    olivia
        .send(PacketChatMessage {
            message: "/ban Mallory".to_string(),
            ..Default::default()
        })
        .await;
    let reason = mallory.wait_for_disconnect().await;
    assert_eq!(reason, "You are banned from this server");

    let reloaded = PlayerLists::load(&path).unwrap();
    assert!(reloaded.is_banned("mallory"));

    let mut retry = legacy_login(&server, ProtocolVersion::Beta1_7, "Mallory").await;
    assert_eq!(
        retry.wait_for_disconnect().await,
        "You are banned from this server"
    );
}

#[tokio::test]
async fn bedrock_login_over_memory_transport() {
    let server = start_server(PlayerLists::in_memory(), |_| {});
    let mut client = BedrockClient::connect(&server, ProtocolVersion::Bedrock1_20_0);
    let runtime_entity_id = client.login("Erin").await;
    assert!(runtime_entity_id > 0);
}

#[tokio::test]
async fn bedrock_client_too_old_is_told_so() {
    let server = start_server(PlayerLists::in_memory(), |_| {});
    let mut client = BedrockClient::connect(&server, ProtocolVersion::Bedrock1_19_30);
    match client.request_network_settings(400).await {
        ServerPacket::PlayStatus(status) => {
            assert_eq!(status.status, PlayStatus::LoginFailedClient)
        }
        _ => panic!("expected play status"),
    }
}
