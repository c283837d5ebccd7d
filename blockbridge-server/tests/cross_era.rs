mod common;

use blockbridge_game_common::PlayerLists;
use blockbridge_network_bedrock::{client_packets::PacketText, server_packets::ServerPacket};
use blockbridge_network_common::{ConnectionState, ProtocolVersion};
use blockbridge_network_java::{
    common_packets::ItemStack, modern::HANDSHAKE_NEXT_LOGIN, JavaPacket, PacketBlockPlacement,
    PacketDisconnect, PacketHandshake, PacketLoginRequest,
};
use common::{legacy_login, start_server, BedrockClient, JavaClient, TestServer};

/// Surface of the default flat world.
const SURFACE_Y: i32 = 4;
const DIRT: i32 = 3;

async fn modern_login(server: &TestServer, name: &str) -> JavaClient {
    let mut client = JavaClient::modern(server, ProtocolVersion::Modern1_8);
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
            username: name.to_string(),
            ..Default::default()
        })
        .await;
    client
        .recv_until(|packet| match packet {
            JavaPacket::LoginSuccess(_) => Some(()),
            _ => None,
        })
        .await;
    client.set_state(ConnectionState::Play);
    client
}

#[tokio::test]
async fn block_placed_by_beta_client_reaches_modern_client() {
    let server = start_server(PlayerLists::in_memory(), |config| {
        config.modern_encryption = false;
        config.compression_threshold = None;
    });

    let mut alice = legacy_login(&server, ProtocolVersion::Beta1_7, "Alice").await;
    alice.finish_join().await;
    let mut bob = modern_login(&server, "Bob").await;
    bob.finish_join().await;

    alice
        .send(PacketBlockPlacement {
            x: 3,
            y: SURFACE_Y,
            z: 3,
            direction: 1,
            item: Some(ItemStack::new(DIRT as i16, 64, 0)),
            ..Default::default()
        })
        .await;

    let change = bob
        .recv_until(|packet| match packet {
            JavaPacket::BlockChange(change) => Some(change),
            _ => None,
        })
        .await;
    assert_eq!((change.x, change.y, change.z), (3, SURFACE_Y + 1, 3));
    assert_eq!(change.block_id, DIRT);

    let echoed = alice
        .recv_until(|packet| match packet {
            JavaPacket::BlockChange(change) => Some(change),
            _ => None,
        })
        .await;
    assert_eq!(echoed.block_id, DIRT);
}

#[tokio::test]
async fn bedrock_chat_reaches_beta_client() {
    let server = start_server(PlayerLists::in_memory(), |_| {});

    let mut alice = legacy_login(&server, ProtocolVersion::Beta1_7, "Alice").await;
    alice.finish_join().await;
    let mut erin = BedrockClient::connect(&server, ProtocolVersion::Bedrock1_20_0);
    erin.login("Erin").await;

    erin.send(PacketText::chat("Erin", "hello from the other side"))
        .await;
    let message = alice
        .recv_until(|packet| match packet {
            JavaPacket::ChatMessage(chat) if chat.message.contains("hello") => Some(chat.message),
            _ => None,
        })
        .await;
    assert_eq!(message, "<Erin> hello from the other side");
}

#[tokio::test]
async fn leaving_java_player_despawns_for_bedrock() {
    let server = start_server(PlayerLists::in_memory(), |_| {});

    let mut alice = legacy_login(&server, ProtocolVersion::Beta1_7, "Alice").await;
    let alice_id = alice.finish_join().await;
    let mut erin = BedrockClient::connect(&server, ProtocolVersion::Bedrock1_20_0);
    erin.login("Erin").await;

    // The join burst already spawned Alice for Erin.
    alice
        .send(PacketDisconnect {
            reason: "Quitting".to_string(),
        })
        .await;

    let removed = erin
        .recv_until(|packet| match packet {
            ServerPacket::RemoveEntity(remove) => Some(remove.entity_unique_id),
            _ => None,
        })
        .await;
    assert_eq!(removed, alice_id as i64);
}

#[tokio::test]
async fn spawn_is_announced_to_players_already_online() {
    let server = start_server(PlayerLists::in_memory(), |config| {
        config.modern_encryption = false;
        config.compression_threshold = None;
    });

    let mut erin = BedrockClient::connect(&server, ProtocolVersion::Bedrock1_19_60);
    erin.login("Erin").await;
    let mut bob = modern_login(&server, "Bob").await;
    let bob_id = bob.finish_join().await;

    let added = erin
        .recv_until(|packet| match packet {
            ServerPacket::AddPlayer(add) => Some(add),
            _ => None,
        })
        .await;
    assert_eq!(added.username, "Bob");
    assert_eq!(added.runtime_entity_id, bob_id as u64);
}
