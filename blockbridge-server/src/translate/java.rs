//! Canonical server events projected onto Java packets, and the Java
//! specific rules for reading client intent.

use blockbridge_game_common::{
    chunk::{CHUNK_WIDTH, WORLD_HEIGHT},
    messages::{
        server::{PlayerSpawn, ServerMessage, WorldTime},
        EntityId,
    },
    BlockIdentity, BlockPosition, ChunkColumn, Position,
};
use blockbridge_network_common::ProtocolVersion;
use blockbridge_network_java::{
    legacy::{DEFAULT_FLY_SPEED, DEFAULT_WALK_SPEED},
    JavaPacket, PacketBlockChange, PacketChangeGameState, PacketChatMessage, PacketChunkData,
    PacketDestroyEntities, PacketDisconnect, PacketEntityTeleport, PacketFlatChunkData,
    PacketJoinGame, PacketPlayerAbilities, PacketPlayerListItem, PacketPlayerPositionLook,
    PacketPreChunk, PacketSpawnPlayer, PacketSpawnPosition, PacketTimeUpdate, PlayerListAction,
    PlayerListEntry, ABILITY_ALLOW_FLYING, ABILITY_CREATIVE, ABILITY_INVULNERABLE,
    DIGGING_FINISHED, DIGGING_STARTED, GAME_STATE_BEGIN_RAIN, GAME_STATE_END_RAIN,
    GAME_STATE_RAIN_LEVEL, GAME_STATE_THUNDER_LEVEL,
};
use serde_json::json;
use uuid::Uuid;

use crate::translate::{
    blocks::to_wire_block,
    chunk::{encode_block_states, encode_flat, encode_sections, ChunkError, FLAT_CHUNK_HEIGHT},
    coords::{to_angle_byte, to_fixed_point, YConvention, PLAYER_EYE_HEIGHT},
    inventory::has_finite_stacks,
};

/// Longest chat line a client before 1.6 accepts.
pub const LEGACY_CHAT_LIMIT: usize = 119;

/// Alpha reports a finished dig with its own status value.
const ALPHA_DIGGING_BROKEN: u8 = 3;

const GAME_MODE_SURVIVAL: u8 = 0;
const GAME_MODE_CREATIVE: u8 = 1;

/// Chat and disconnect reasons became JSON in 1.6.
fn uses_json_text(version: ProtocolVersion) -> bool {
    version.is_at_least(ProtocolVersion::Release1_6_1)
}

fn text_component(version: ProtocolVersion, text: &str) -> String {
    if uses_json_text(version) {
        json!({ "text": text }).to_string()
    } else {
        text.chars().take(LEGACY_CHAT_LIMIT).collect()
    }
}

pub fn chat_packet(version: ProtocolVersion, text: &str) -> JavaPacket {
    PacketChatMessage {
        message: text_component(version, text),
        position: 0,
    }
    .into()
}

/// Login disconnects on the modern protocol are JSON as well, even for 1.7.
pub fn disconnect_packet(version: ProtocolVersion, reason: &str) -> JavaPacket {
    let reason = if version.is_unframed() {
        text_component(version, reason)
    } else {
        json!({ "text": reason }).to_string()
    };
    PacketDisconnect { reason }.into()
}

/// From 1.4.2 a frozen daylight cycle is sent as a negative time of day.
pub fn time_packet(version: ProtocolVersion, time: &WorldTime) -> JavaPacket {
    let time_of_day = if time.frozen && version.is_at_least(ProtocolVersion::Release1_4_2) {
        -time.time_of_day.max(1)
    } else {
        time.time_of_day
    };
    PacketTimeUpdate {
        world_age: time.world_age,
        time_of_day,
    }
    .into()
}

pub fn weather_packets(version: ProtocolVersion, raining: bool, thundering: bool) -> Vec<JavaPacket> {
    let mut packets = vec![PacketChangeGameState {
        reason: if raining {
            GAME_STATE_BEGIN_RAIN
        } else {
            GAME_STATE_END_RAIN
        },
        value: 0.0,
    }
    .into()];

    if version.is_at_least(ProtocolVersion::Modern1_8) {
        let level = |on: bool| if on { 1.0 } else { 0.0 };
        packets.push(
            PacketChangeGameState {
                reason: GAME_STATE_RAIN_LEVEL,
                value: level(raining),
            }
            .into(),
        );
        packets.push(
            PacketChangeGameState {
                reason: GAME_STATE_THUNDER_LEVEL,
                value: level(raining && thundering),
            }
            .into(),
        );
    }
    packets
}

pub fn game_mode(version: ProtocolVersion) -> u8 {
    if has_finite_stacks(version) {
        GAME_MODE_SURVIVAL
    } else {
        GAME_MODE_CREATIVE
    }
}

pub fn join_game_packet(version: ProtocolVersion, entity_id: EntityId, max_players: usize) -> JavaPacket {
    PacketJoinGame {
        entity_id: entity_id.0,
        level_type: "flat".to_string(),
        game_mode: game_mode(version),
        dimension: 0,
        difficulty: 0,
        world_height: FLAT_CHUNK_HEIGHT as u8,
        max_players: max_players.min(u8::MAX as usize) as u8,
        seed: 0,
        reduced_debug_info: false,
    }
    .into()
}

pub fn spawn_position_packet(position: &Position) -> JavaPacket {
    let block = position.block();
    PacketSpawnPosition {
        x: block.x,
        y: block.y,
        z: block.z,
    }
    .into()
}

/// Flight for creative clients; older clients have no abilities packet.
pub fn abilities_packet(version: ProtocolVersion) -> Option<JavaPacket> {
    if !version.is_at_least(ProtocolVersion::Release1_0) || has_finite_stacks(version) {
        return None;
    }
    Some(
        PacketPlayerAbilities {
            flags: ABILITY_INVULNERABLE | ABILITY_ALLOW_FLYING | ABILITY_CREATIVE,
            fly_speed: DEFAULT_FLY_SPEED,
            walk_speed: DEFAULT_WALK_SPEED,
        }
        .into(),
    )
}

pub fn teleport_packet(version: ProtocolVersion, position: &Position) -> JavaPacket {
    let convention = YConvention::of(version);
    let y = convention.to_wire(position.y);
    let stance = match convention {
        YConvention::Eye => position.y,
        YConvention::Feet => position.y + PLAYER_EYE_HEIGHT,
    };
    PacketPlayerPositionLook {
        x: position.x,
        y,
        stance,
        z: position.z,
        yaw: position.yaw,
        pitch: position.pitch,
        on_ground: position.on_ground,
    }
    .into()
}

/// Feet position of a client position packet.
pub fn feet_y(version: ProtocolVersion, wire_y: f64) -> f64 {
    YConvention::of(version).from_wire(wire_y)
}

pub fn chunk_packets(version: ProtocolVersion, column: &ChunkColumn) -> Result<Vec<JavaPacket>, ChunkError> {
    let to_wire = |block| to_wire_block(version, block);
    let mut packets = Vec::with_capacity(2);

    if !version.is_at_least(ProtocolVersion::Release1_3_1) {
        packets.push(
            PacketPreChunk {
                chunk_x: column.chunk_x,
                chunk_z: column.chunk_z,
                load: true,
            }
            .into(),
        );
    }

    if !version.is_at_least(ProtocolVersion::Release1_2_1) {
        packets.push(
            PacketFlatChunkData {
                x: column.chunk_x * CHUNK_WIDTH as i32,
                y: 0,
                z: column.chunk_z * CHUNK_WIDTH as i32,
                size_x: CHUNK_WIDTH as u8,
                size_y: FLAT_CHUNK_HEIGHT as u8,
                size_z: CHUNK_WIDTH as u8,
                compressed_data: encode_flat(column, to_wire)?,
            }
            .into(),
        );
        return Ok(packets);
    }

    let sections = if version.is_at_least(ProtocolVersion::Modern1_8) {
        encode_block_states(column, to_wire)
    } else {
        encode_sections(column, to_wire)?
    };
    packets.push(
        PacketChunkData {
            chunk_x: column.chunk_x,
            chunk_z: column.chunk_z,
            ground_up: true,
            primary_bitmask: sections.primary_bitmask,
            add_bitmask: sections.add_bitmask,
            data: sections.data,
        }
        .into(),
    );
    Ok(packets)
}

/// `None` when the era cannot address the position at all.
pub fn block_change_packet(
    version: ProtocolVersion,
    position: BlockPosition,
    block: BlockIdentity,
) -> Option<JavaPacket> {
    let height = if version.is_at_least(ProtocolVersion::Release1_2_1) {
        WORLD_HEIGHT as i32
    } else {
        FLAT_CHUNK_HEIGHT as i32
    };
    if position.y < 0 || position.y >= height {
        return None;
    }

    let wire = to_wire_block(version, block);
    Some(
        PacketBlockChange {
            x: position.x,
            y: position.y,
            z: position.z,
            block_id: wire.id as i32,
            metadata: wire.data,
        }
        .into(),
    )
}

fn list_entry(uuid: Uuid, name: &str, version: ProtocolVersion) -> PlayerListEntry {
    PlayerListEntry {
        uuid: uuid.as_u128(),
        name: name.to_string(),
        game_mode: game_mode(version) as i32,
        ping: 0,
    }
}

/// The tab list exists from beta 1.8; on 1.8 it is also where the spawn
/// packet's name comes from, so it has to arrive first.
fn has_player_list(version: ProtocolVersion) -> bool {
    version.is_at_least(ProtocolVersion::Beta1_8)
}

pub fn spawn_player_packets(version: ProtocolVersion, spawn: &PlayerSpawn) -> Vec<JavaPacket> {
    let mut packets = Vec::with_capacity(2);
    if has_player_list(version) {
        packets.push(
            PacketPlayerListItem {
                action: PlayerListAction::Add,
                entries: vec![list_entry(spawn.uuid, &spawn.name, version)],
            }
            .into(),
        );
    }

    packets.push(
        PacketSpawnPlayer {
            entity_id: spawn.entity_id.0,
            uuid: spawn.uuid.as_u128(),
            name: spawn.name.clone(),
            x: to_fixed_point(spawn.position.x),
            y: to_fixed_point(spawn.position.y),
            z: to_fixed_point(spawn.position.z),
            yaw: to_angle_byte(spawn.position.yaw),
            pitch: to_angle_byte(spawn.position.pitch),
            current_item: 0,
        }
        .into(),
    );
    packets
}

pub fn remove_player_packets(
    version: ProtocolVersion,
    entity_id: EntityId,
    uuid: Uuid,
    name: &str,
) -> Vec<JavaPacket> {
    let mut packets = vec![PacketDestroyEntities {
        entity_ids: vec![entity_id.0],
    }
    .into()];
    if has_player_list(version) {
        packets.push(
            PacketPlayerListItem {
                action: PlayerListAction::Remove,
                entries: vec![list_entry(uuid, name, version)],
            }
            .into(),
        );
    }
    packets
}

pub fn move_entity_packet(entity_id: EntityId, position: &Position) -> JavaPacket {
    PacketEntityTeleport {
        entity_id: entity_id.0,
        x: to_fixed_point(position.x),
        y: to_fixed_point(position.y),
        z: to_fixed_point(position.z),
        yaw: to_angle_byte(position.yaw),
        pitch: to_angle_byte(position.pitch),
        on_ground: position.on_ground,
    }
    .into()
}

/// Every packet a canonical server event becomes for one Java session.
pub fn server_message_packets(
    version: ProtocolVersion,
    message: &ServerMessage,
) -> Result<Vec<JavaPacket>, ChunkError> {
    Ok(match message {
        ServerMessage::ChunkData(column) => chunk_packets(version, column)?,
        ServerMessage::Teleport(position) => vec![teleport_packet(version, position)],
        ServerMessage::SpawnPlayer(spawn) => spawn_player_packets(version, spawn),
        ServerMessage::RemovePlayer {
            entity_id,
            uuid,
            name,
        } => remove_player_packets(version, *entity_id, *uuid, name),
        ServerMessage::MoveEntity {
            entity_id,
            position,
        } => vec![move_entity_packet(*entity_id, position)],
        ServerMessage::BlockChanged { position, block } => {
            block_change_packet(version, *position, *block)
                .into_iter()
                .collect()
        }
        ServerMessage::Chat(text) => vec![chat_packet(version, text)],
        ServerMessage::Time(time) => vec![time_packet(version, time)],
        ServerMessage::Weather {
            raining,
            thundering,
        } => weather_packets(version, *raining, *thundering),
        ServerMessage::Kick(reason) => vec![disconnect_packet(version, reason)],
    })
}

/// Whether a digging packet means the block is gone. Creative clients
/// break instantly and only report the start.
pub fn completes_dig(version: ProtocolVersion, status: u8) -> bool {
    if !has_finite_stacks(version) {
        status == DIGGING_STARTED
    } else if version.is_at_least(ProtocolVersion::Beta1_0) {
        status == DIGGING_FINISHED
    } else {
        status == ALPHA_DIGGING_BROKEN
    }
}

#[cfg(test)]
mod tests {
    use blockbridge_game_common::{block::block_ids, FlatWorld, WorldSimulation};
    use blockbridge_network_java::DIGGING_DROP_ITEM;

    use super::*;

    fn spawn() -> PlayerSpawn {
        PlayerSpawn {
            entity_id: EntityId(7),
            uuid: Uuid::from_u128(0x1234),
            name: "Alex".to_string(),
            position: Position::new(0.5, 65.0, -1.5).with_look(90.0, 0.0),
        }
    }

    #[test]
    fn chat_is_json_from_1_6() {
        let long = "a".repeat(200);
        match chat_packet(ProtocolVersion::Beta1_7, &long) {
            JavaPacket::ChatMessage(chat) => assert_eq!(chat.message.len(), LEGACY_CHAT_LIMIT),
            other => panic!("unexpected {:?}", other),
        }
        match chat_packet(ProtocolVersion::Release1_6_4, "hi") {
            JavaPacket::ChatMessage(chat) => assert_eq!(chat.message, r#"{"text":"hi"}"#),
            other => panic!("unexpected {:?}", other),
        }
        match disconnect_packet(ProtocolVersion::Modern1_7_2, "bye") {
            JavaPacket::Disconnect(disconnect) => assert_eq!(disconnect.reason, r#"{"text":"bye"}"#),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn frozen_time_is_negative_from_1_4_2() {
        let time = WorldTime {
            world_age: 100,
            time_of_day: 6000,
            frozen: true,
        };
        assert_eq!(
            time_packet(ProtocolVersion::Release1_4_6, &time),
            PacketTimeUpdate {
                world_age: 100,
                time_of_day: -6000
            }
            .into()
        );
        assert_eq!(
            time_packet(ProtocolVersion::Release1_3_1, &time),
            PacketTimeUpdate {
                world_age: 100,
                time_of_day: 6000
            }
            .into()
        );
    }

    #[test]
    fn teleport_follows_the_y_convention() {
        let position = Position::new(0.5, 64.0, 0.5);
        match teleport_packet(ProtocolVersion::Beta1_7, &position) {
            JavaPacket::PlayerPositionLook(look) => {
                assert!((look.y - 65.62).abs() < 1e-9);
                assert_eq!(look.stance, 64.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        match teleport_packet(ProtocolVersion::Modern1_8, &position) {
            JavaPacket::PlayerPositionLook(look) => assert_eq!(look.y, 64.0),
            other => panic!("unexpected {:?}", other),
        }
        assert!((feet_y(ProtocolVersion::Modern1_7_6, 65.62) - 64.0).abs() < 1e-9);
    }

    #[test]
    fn chunk_shape_by_era() {
        let column = FlatWorld::new(4).column_snapshot(1, -2);

        let packets = chunk_packets(ProtocolVersion::Beta1_7, &column).unwrap();
        assert!(matches!(&packets[..], [JavaPacket::PreChunk(_), JavaPacket::FlatChunkData(flat)]
            if flat.x == 16 && flat.z == -32 && flat.size_y == 128));

        let packets = chunk_packets(ProtocolVersion::Release1_2_4, &column).unwrap();
        assert!(matches!(&packets[..], [JavaPacket::PreChunk(_), JavaPacket::ChunkData(data)]
            if data.primary_bitmask == 1));

        let packets = chunk_packets(ProtocolVersion::Modern1_8, &column).unwrap();
        assert!(matches!(&packets[..], [JavaPacket::ChunkData(data)]
            if data.data.len() == 4096 * 3 + 256));
    }

    #[test]
    fn block_changes_fall_back_and_respect_height() {
        let position = BlockPosition::new(3, 70, 3);
        let clay = BlockIdentity::with_data(159, 4);
        assert_eq!(
            block_change_packet(ProtocolVersion::Release1_5_2, position, clay),
            Some(
                PacketBlockChange {
                    x: 3,
                    y: 70,
                    z: 3,
                    block_id: block_ids::STONE as i32,
                    metadata: 0,
                }
                .into()
            )
        );
        assert!(block_change_packet(
            ProtocolVersion::Beta1_7,
            BlockPosition::new(0, 128, 0),
            clay
        )
        .is_none());
        assert!(block_change_packet(
            ProtocolVersion::Release1_2_4,
            BlockPosition::new(0, 128, 0),
            clay
        )
        .is_some());
    }

    #[test]
    fn player_list_brackets_spawn_and_despawn() {
        let spawn = spawn();
        let packets = spawn_player_packets(ProtocolVersion::Modern1_8, &spawn);
        assert!(matches!(&packets[..], [JavaPacket::PlayerListItem(_), JavaPacket::SpawnPlayer(player)]
            if player.y == 65 * 32 && player.yaw == 64));
        assert!(matches!(
            &spawn_player_packets(ProtocolVersion::Beta1_7, &spawn)[..],
            [JavaPacket::SpawnPlayer(_)]
        ));

        let packets = remove_player_packets(ProtocolVersion::Beta1_8, spawn.entity_id, spawn.uuid, "Alex");
        assert!(matches!(&packets[..], [JavaPacket::DestroyEntities(destroy), JavaPacket::PlayerListItem(list)]
            if destroy.entity_ids == vec![7] && list.action == PlayerListAction::Remove));
    }

    #[test]
    fn weather_levels_only_on_1_8() {
        assert_eq!(weather_packets(ProtocolVersion::Release1_6_4, true, false).len(), 1);
        let packets = weather_packets(ProtocolVersion::Modern1_8, true, true);
        assert_eq!(
            packets,
            vec![
                PacketChangeGameState { reason: GAME_STATE_BEGIN_RAIN, value: 0.0 }.into(),
                PacketChangeGameState { reason: GAME_STATE_RAIN_LEVEL, value: 1.0 }.into(),
                PacketChangeGameState { reason: GAME_STATE_THUNDER_LEVEL, value: 1.0 }.into(),
            ]
        );
    }

    #[test]
    fn dig_completion_by_era() {
        assert!(completes_dig(ProtocolVersion::Alpha1_2_6, ALPHA_DIGGING_BROKEN));
        assert!(!completes_dig(ProtocolVersion::Alpha1_2_6, DIGGING_FINISHED));
        assert!(completes_dig(ProtocolVersion::Beta1_7, DIGGING_FINISHED));
        assert!(!completes_dig(ProtocolVersion::Beta1_7, DIGGING_STARTED));
        assert!(completes_dig(ProtocolVersion::Release1_4_6, DIGGING_STARTED));
        assert!(!completes_dig(ProtocolVersion::Modern1_8, DIGGING_DROP_ITEM));
    }

    #[test]
    fn abilities_only_for_creative_clients() {
        assert!(abilities_packet(ProtocolVersion::Beta1_8).is_none());
        assert!(abilities_packet(ProtocolVersion::Release1_0).is_some());
        assert!(abilities_packet(ProtocolVersion::Beta1_5).is_none());
    }
}
