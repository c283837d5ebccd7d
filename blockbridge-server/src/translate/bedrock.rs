//! Canonical server events projected onto bedrock packets, and client
//! intent read back out of bedrock movement and item use.

use blockbridge_game_common::{
    messages::{
        client::{ClientMessage, PlaceBlock},
        server::{PlayerSpawn, ServerMessage, WorldTime},
        EntityId,
    },
    BlockIdentity, BlockPosition, ChunkColumn, Position,
};
use blockbridge_network_bedrock::{
    client_packets::{
        MoveMode, PacketMovePlayer, PacketText, UseItemAction, UseItemData,
    },
    common_packets::{BlockPos, NetworkItem, Skin, Vec3},
    server_packets::{
        GameRule, PacketAddPlayer, PacketDisconnect, PacketGameRulesChanged, PacketLevelChunk,
        PacketLevelEvent,
        PacketNetworkChunkPublisherUpdate, PacketPlayerList, PacketRemoveEntity, PacketSetTime,
        PacketStartGame, PacketUpdateBlock, PlayerListEntry, GAME_RULE_DAYLIGHT_CYCLE,
        LEVEL_EVENT_START_RAIN,
        LEVEL_EVENT_START_THUNDER, LEVEL_EVENT_STOP_RAIN, LEVEL_EVENT_STOP_THUNDER,
        UPDATE_BLOCK_NETWORK,
    },
    BedrockPacket,
};
use blockbridge_network_common::{Packet, PacketError, ProtocolVersion};
use uuid::Uuid;

use crate::translate::{
    blocks::BEDROCK_PALETTE,
    chunk::encode_sub_chunks,
    coords::{YConvention, PLAYER_EYE_HEIGHT},
};

pub const GAME_MODE_CREATIVE: i32 = 1;
const DIFFICULTY_PEACEFUL: i32 = 0;
const DIMENSION_OVERWORLD: i32 = 0;
const GENERATOR_FLAT: i32 = 2;

/// Full intensity for rain and thunder level events.
const WEATHER_INTENSITY: i32 = 65535;

/// Build platform of players relayed from other editions.
const BUILD_PLATFORM_UNKNOWN: i32 = -1;

pub fn runtime_entity_id(entity_id: EntityId) -> u64 {
    entity_id.0 as u64
}

pub fn entity_unique_id(entity_id: EntityId) -> i64 {
    entity_id.0 as i64
}

fn eye_vec(position: &Position) -> Vec3 {
    Vec3::new(
        position.x as f32,
        YConvention::Eye.to_wire(position.y) as f32,
        position.z as f32,
    )
}

fn block_pos(position: BlockPosition) -> BlockPos {
    BlockPos::new(position.x, position.y, position.z)
}

pub struct StartGameParams<'a> {
    pub entity_id: EntityId,
    pub position: Position,
    pub time: &'a WorldTime,
    pub raining: bool,
    pub thundering: bool,
    pub view_distance: i32,
    pub world_name: &'a str,
}

pub fn start_game_packet(version: ProtocolVersion, params: StartGameParams) -> PacketStartGame {
    let spawn = params.position.block();
    let level = |on: bool| if on { 1.0 } else { 0.0 };
    PacketStartGame {
        entity_unique_id: entity_unique_id(params.entity_id),
        runtime_entity_id: runtime_entity_id(params.entity_id),
        player_game_mode: GAME_MODE_CREATIVE,
        position: eye_vec(&params.position),
        pitch: params.position.pitch,
        yaw: params.position.yaw,
        seed: 0,
        dimension: DIMENSION_OVERWORLD,
        generator: GENERATOR_FLAT,
        world_game_mode: GAME_MODE_CREATIVE,
        difficulty: DIFFICULTY_PEACEFUL,
        spawn_position: block_pos(spawn),
        day_cycle_lock_time: if params.time.frozen {
            params.time.time_of_day as i32
        } else {
            -1
        },
        rain_level: level(params.raining),
        lightning_level: level(params.raining && params.thundering),
        commands_enabled: false,
        chunk_tick_radius: params.view_distance,
        level_id: params.world_name.to_string(),
        world_name: params.world_name.to_string(),
        time: params.time.world_age,
        block_palette: BEDROCK_PALETTE.entries().to_vec(),
        game_version: version.name().to_string(),
    }
}

pub fn chunk_packet(version: ProtocolVersion, column: &ChunkColumn) -> PacketLevelChunk {
    let (sub_chunk_count, payload) = encode_sub_chunks(column, &BEDROCK_PALETTE, version);
    PacketLevelChunk {
        chunk_x: column.chunk_x,
        chunk_z: column.chunk_z,
        sub_chunk_count,
        payload,
    }
}

/// Tells the client which area the server is publishing chunks for, in
/// blocks.
pub fn chunk_publisher_packet(position: &Position, view_distance: i32) -> PacketNetworkChunkPublisherUpdate {
    PacketNetworkChunkPublisherUpdate {
        position: block_pos(position.block()),
        radius: (view_distance.max(0) as u32) * 16,
    }
}

pub fn time_packet(time: &WorldTime) -> PacketSetTime {
    PacketSetTime {
        time: time.time_of_day as i32,
    }
}

/// Bedrock clients run their own day cycle, so a frozen clock is also a
/// game rule.
pub fn daylight_cycle_packet(time: &WorldTime) -> PacketGameRulesChanged {
    PacketGameRulesChanged {
        rules: vec![GameRule::bool(GAME_RULE_DAYLIGHT_CYCLE, !time.frozen)],
    }
}

pub fn weather_packets(raining: bool, thundering: bool) -> [PacketLevelEvent; 2] {
    let event = |event, on: bool| PacketLevelEvent {
        event,
        position: Vec3::default(),
        data: if on { WEATHER_INTENSITY } else { 0 },
    };
    [
        if raining {
            event(LEVEL_EVENT_START_RAIN, true)
        } else {
            event(LEVEL_EVENT_STOP_RAIN, false)
        },
        if raining && thundering {
            event(LEVEL_EVENT_START_THUNDER, true)
        } else {
            event(LEVEL_EVENT_STOP_THUNDER, false)
        },
    ]
}

pub fn block_update_packet(position: BlockPosition, block: BlockIdentity) -> PacketUpdateBlock {
    PacketUpdateBlock {
        position: block_pos(position),
        runtime_id: BEDROCK_PALETTE.runtime_id(block),
        flags: UPDATE_BLOCK_NETWORK,
        layer: 0,
    }
}

fn player_list_add(spawn: &PlayerSpawn) -> PacketPlayerList {
    PacketPlayerList::Add(vec![PlayerListEntry {
        uuid: spawn.uuid.as_u128(),
        entity_unique_id: entity_unique_id(spawn.entity_id),
        username: spawn.name.clone(),
        xuid: String::new(),
        build_platform: BUILD_PLATFORM_UNKNOWN,
        skin: Skin::blank(&spawn.uuid.to_string()),
    }])
}

pub fn add_player_packet(spawn: &PlayerSpawn) -> PacketAddPlayer {
    PacketAddPlayer {
        uuid: spawn.uuid.as_u128(),
        username: spawn.name.clone(),
        runtime_entity_id: runtime_entity_id(spawn.entity_id),
        entity_unique_id: entity_unique_id(spawn.entity_id),
        position: eye_vec(&spawn.position),
        pitch: spawn.position.pitch,
        yaw: spawn.position.yaw,
        head_yaw: spawn.position.yaw,
        held_item: NetworkItem::empty(),
        game_mode: GAME_MODE_CREATIVE,
    }
}

pub fn move_player_packet(entity_id: EntityId, position: &Position, mode: MoveMode) -> PacketMovePlayer {
    PacketMovePlayer {
        runtime_entity_id: runtime_entity_id(entity_id),
        position: eye_vec(position),
        pitch: position.pitch,
        yaw: position.yaw,
        head_yaw: position.yaw,
        mode,
        on_ground: position.on_ground,
        ridden_runtime_entity_id: 0,
        tick: 0,
    }
}

pub fn disconnect_packet(reason: &str) -> PacketDisconnect {
    PacketDisconnect {
        message: Some(reason.to_string()),
    }
}

/// Every packet a canonical server event becomes for one bedrock session.
/// `own` is the session's entity, the target of its own teleports.
pub fn server_message_packets(
    version: ProtocolVersion,
    own: EntityId,
    message: &ServerMessage,
) -> Result<Vec<Packet>, PacketError> {
    Ok(match message {
        ServerMessage::ChunkData(column) => vec![chunk_packet(version, column).encode(version)?],
        ServerMessage::Teleport(position) => {
            vec![move_player_packet(own, position, MoveMode::Teleport).encode(version)?]
        }
        ServerMessage::SpawnPlayer(spawn) => vec![
            player_list_add(spawn).encode(version)?,
            add_player_packet(spawn).encode(version)?,
        ],
        ServerMessage::RemovePlayer {
            entity_id, uuid, ..
        } => remove_player_packets(version, *entity_id, *uuid)?,
        ServerMessage::MoveEntity {
            entity_id,
            position,
        } => vec![move_player_packet(*entity_id, position, MoveMode::Normal).encode(version)?],
        ServerMessage::BlockChanged { position, block } => {
            vec![block_update_packet(*position, *block).encode(version)?]
        }
        ServerMessage::Chat(text) => vec![PacketText::raw(text).encode(version)?],
        ServerMessage::Time(time) => vec![
            daylight_cycle_packet(time).encode(version)?,
            time_packet(time).encode(version)?,
        ],
        ServerMessage::Weather {
            raining,
            thundering,
        } => weather_packets(*raining, *thundering)
            .iter()
            .map(|packet| packet.encode(version))
            .collect::<Result<_, _>>()?,
        ServerMessage::Kick(reason) => vec![disconnect_packet(reason).encode(version)?],
    })
}

fn remove_player_packets(
    version: ProtocolVersion,
    entity_id: EntityId,
    uuid: Uuid,
) -> Result<Vec<Packet>, PacketError> {
    Ok(vec![
        PacketRemoveEntity {
            entity_unique_id: entity_unique_id(entity_id),
        }
        .encode(version)?,
        PacketPlayerList::Remove(vec![uuid.as_u128()]).encode(version)?,
    ])
}

/// Feet position reported by a client movement packet.
pub fn feet_position(packet: &PacketMovePlayer) -> Position {
    Position {
        x: packet.position.x as f64,
        y: packet.position.y as f64 - PLAYER_EYE_HEIGHT,
        z: packet.position.z as f64,
        yaw: packet.yaw,
        pitch: packet.pitch,
        on_ground: packet.on_ground,
    }
}

/// Canonical intent of an item use. The held item is resolved through its
/// block runtime id; items with no block behind them are not placeable.
pub fn use_item_intent(data: &UseItemData) -> Option<ClientMessage> {
    let clicked = BlockPosition::new(
        data.block_position.x,
        data.block_position.y,
        data.block_position.z,
    );
    match data.action {
        UseItemAction::ClickBlock => {
            let position = clicked.offset(data.face as i8)?;
            let item_id = if data.held_item.is_empty() {
                0
            } else {
                BEDROCK_PALETTE
                    .block(data.held_item.block_runtime_id as u32)
                    .map_or(0, |block| block.id as i32)
            };
            Some(ClientMessage::PlaceBlock(PlaceBlock { position, item_id }))
        }
        UseItemAction::BreakBlock => Some(ClientMessage::DigBlock(clicked)),
        UseItemAction::ClickAir => None,
    }
}

#[cfg(test)]
mod tests {
    use blockbridge_game_common::{block::block_ids, FlatWorld, WorldSimulation};
    use blockbridge_network_bedrock::server_packets::ServerPacket;

    use super::*;

    const VERSION: ProtocolVersion = ProtocolVersion::Bedrock1_20_0;

    fn use_item(action: UseItemAction, face: i32, runtime_id: i32) -> UseItemData {
        let mut held_item = NetworkItem::empty();
        if runtime_id > 0 {
            held_item.id = 1;
            held_item.count = 64;
            held_item.block_runtime_id = runtime_id;
        }
        UseItemData {
            action,
            block_position: BlockPos::new(2, 4, -3),
            face,
            hotbar_slot: 0,
            held_item,
            player_position: Vec3::default(),
            click_position: Vec3::default(),
            block_runtime_id: 0,
        }
    }

    #[test]
    fn movement_is_reported_at_eye_height() {
        let position = Position::new(1.5, 5.0, -2.5).with_look(45.0, 10.0);
        let packet = move_player_packet(EntityId(3), &position, MoveMode::Normal);
        assert!((packet.position.y - 6.62).abs() < 1e-4);
        let back = feet_position(&packet);
        assert!((back.y - 5.0).abs() < 1e-4);
        assert_eq!(back.yaw, 45.0);
    }

    #[test]
    fn item_use_becomes_canonical_intent() {
        let stone = BEDROCK_PALETTE.runtime_id(BlockIdentity::new(block_ids::STONE)) as i32;
        assert_eq!(
            use_item_intent(&use_item(UseItemAction::ClickBlock, 1, stone)),
            Some(ClientMessage::PlaceBlock(PlaceBlock {
                position: BlockPosition::new(2, 5, -3),
                item_id: block_ids::STONE as i32,
            }))
        );
        assert_eq!(
            use_item_intent(&use_item(UseItemAction::ClickBlock, 1, 0)),
            Some(ClientMessage::PlaceBlock(PlaceBlock {
                position: BlockPosition::new(2, 5, -3),
                item_id: 0,
            }))
        );
        assert_eq!(
            use_item_intent(&use_item(UseItemAction::BreakBlock, 1, 0)),
            Some(ClientMessage::DigBlock(BlockPosition::new(2, 4, -3)))
        );
        assert_eq!(use_item_intent(&use_item(UseItemAction::ClickAir, -1, stone)), None);
    }

    #[test]
    fn spawn_lists_before_adding() {
        let spawn = PlayerSpawn {
            entity_id: EntityId(9),
            uuid: Uuid::from_u128(42),
            name: "Steve".to_string(),
            position: Position::new(0.5, 5.0, 0.5),
        };
        let packets =
            server_message_packets(VERSION, EntityId(1), &ServerMessage::SpawnPlayer(spawn)).unwrap();
        assert_eq!(packets.len(), 2);
        assert!(matches!(
            ServerPacket::decode(&packets[0], VERSION).unwrap(),
            ServerPacket::PlayerList(PacketPlayerList::Add(entries)) if entries[0].username == "Steve"
        ));
        assert!(matches!(
            ServerPacket::decode(&packets[1], VERSION).unwrap(),
            ServerPacket::AddPlayer(player) if player.runtime_entity_id == 9
        ));

        let packets = server_message_packets(
            VERSION,
            EntityId(1),
            &ServerMessage::RemovePlayer {
                entity_id: EntityId(9),
                uuid: Uuid::from_u128(42),
                name: "Steve".to_string(),
            },
        )
        .unwrap();
        assert!(matches!(
            ServerPacket::decode(&packets[1], VERSION).unwrap(),
            ServerPacket::PlayerList(PacketPlayerList::Remove(uuids)) if uuids == vec![42]
        ));
    }

    #[test]
    fn teleports_target_the_own_entity() {
        let packets = server_message_packets(
            VERSION,
            EntityId(5),
            &ServerMessage::Teleport(Position::new(0.5, 5.0, 0.5)),
        )
        .unwrap();
        assert!(matches!(
            ServerPacket::decode(&packets[0], VERSION).unwrap(),
            ServerPacket::MovePlayer(movement)
                if movement.runtime_entity_id == 5 && movement.mode == MoveMode::Teleport
        ));
    }

    #[test]
    fn frozen_time_stops_the_daylight_cycle() {
        let frozen = WorldTime {
            world_age: 400,
            time_of_day: 6000,
            frozen: true,
        };
        let packets =
            server_message_packets(VERSION, EntityId(1), &ServerMessage::Time(frozen)).unwrap();
        assert_eq!(packets.len(), 2);
        match ServerPacket::decode(&packets[0], VERSION).unwrap() {
            ServerPacket::GameRulesChanged(changed) => assert_eq!(
                changed.rules,
                vec![GameRule::bool(GAME_RULE_DAYLIGHT_CYCLE, false)]
            ),
            _ => panic!("expected game rules"),
        }
        assert!(matches!(
            ServerPacket::decode(&packets[1], VERSION).unwrap(),
            ServerPacket::SetTime(set_time) if set_time.time == 6000
        ));

        let running = WorldTime {
            world_age: 400,
            time_of_day: 6000,
            frozen: false,
        };
        assert_eq!(
            daylight_cycle_packet(&running).rules,
            vec![GameRule::bool(GAME_RULE_DAYLIGHT_CYCLE, true)]
        );
    }

    #[test]
    fn weather_sends_rain_and_thunder() {
        let [rain, thunder] = weather_packets(true, false);
        assert_eq!(rain.event, LEVEL_EVENT_START_RAIN);
        assert_eq!(rain.data, WEATHER_INTENSITY);
        assert_eq!(thunder.event, LEVEL_EVENT_STOP_THUNDER);
    }

    #[test]
    fn chunks_and_block_updates_use_the_palette() {
        let column = FlatWorld::new(4).column_snapshot(0, 0);
        let packet = chunk_packet(VERSION, &column);
        assert!(packet.sub_chunk_count > 0);

        let update = block_update_packet(BlockPosition::new(1, 2, 3), BlockIdentity::new(block_ids::GLASS));
        assert_eq!(
            BEDROCK_PALETTE.block(update.runtime_id),
            Some(BlockIdentity::new(block_ids::GLASS))
        );
    }

    #[test]
    fn start_game_announces_the_palette() {
        let time = WorldTime {
            world_age: 10,
            time_of_day: 6000,
            frozen: true,
        };
        let packet = start_game_packet(
            VERSION,
            StartGameParams {
                entity_id: EntityId(1),
                position: Position::new(0.5, 5.0, 0.5),
                time: &time,
                raining: false,
                thundering: false,
                view_distance: 4,
                world_name: "flat",
            },
        );
        assert_eq!(packet.block_palette.len(), BEDROCK_PALETTE.entries().len());
        assert_eq!(packet.day_cycle_lock_time, 6000);
        assert_eq!(packet.game_version, "1.20.0");
    }
}
