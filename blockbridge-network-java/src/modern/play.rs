use blockbridge_network_common::{PacketError, PacketReader, PacketWriter};

use crate::{
    common_packets::{
        skip_entity_metadata, uuid_from_string, uuid_to_string, PacketReadItemStack,
        PacketReadPosition, PacketWriteItemStack, PacketWritePosition, METADATA_END,
        PLAYER_EYE_HEIGHT,
    },
    expect_packet, JavaPacket, PacketAnimation, PacketBlockChange, PacketBlockPlacement,
    PacketChangeGameState, PacketChatMessage, PacketChunkData, PacketClientSettings,
    PacketClientStatus, PacketDestroyEntities, PacketEntityAction, PacketEntityTeleport,
    PacketJoinGame, PacketKeepAlive, PacketPlayerAbilities, PacketPlayerDigging,
    PacketPlayerListItem, PacketPlayerPosition, PacketPlayerPositionLook, PacketPluginMessage,
    PacketRespawn, PacketSpawnPlayer, PacketSpawnPosition, PacketTabComplete, PacketUpdateSign,
    PacketUseEntity, PlayerListAction, PlayerListEntry,
};

pub(crate) fn decode_keep_alive_varint(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketKeepAlive {
        id: reader.read_varint()?,
    }
    .into())
}

pub(crate) fn encode_keep_alive_varint(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, KeepAlive);
    writer.write_varint(packet.id);
    Ok(())
}

pub(crate) fn decode_join_game_v1(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketJoinGame {
        entity_id: reader.read_i32()?,
        game_mode: reader.read_u8()?,
        dimension: reader.read_i8()? as i32,
        difficulty: reader.read_u8()?,
        max_players: reader.read_u8()?,
        level_type: reader.read_string()?,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_join_game_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, JoinGame);
    writer.write_i32(packet.entity_id);
    writer.write_u8(packet.game_mode);
    writer.write_i8(packet.dimension as i8);
    writer.write_u8(packet.difficulty);
    writer.write_u8(packet.max_players);
    writer.write_string(&packet.level_type)
}

pub(crate) fn decode_join_game_v2(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketJoinGame {
        entity_id: reader.read_i32()?,
        game_mode: reader.read_u8()?,
        dimension: reader.read_i8()? as i32,
        difficulty: reader.read_u8()?,
        max_players: reader.read_u8()?,
        level_type: reader.read_string()?,
        reduced_debug_info: reader.read_bool()?,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_join_game_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, JoinGame);
    writer.write_i32(packet.entity_id);
    writer.write_u8(packet.game_mode);
    writer.write_i8(packet.dimension as i8);
    writer.write_u8(packet.difficulty);
    writer.write_u8(packet.max_players);
    writer.write_string(&packet.level_type)?;
    writer.write_bool(packet.reduced_debug_info);
    Ok(())
}

pub(crate) fn decode_chat_positioned(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketChatMessage {
        message: reader.read_string()?,
        position: reader.read_u8()?,
    }
    .into())
}

pub(crate) fn encode_chat_positioned(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ChatMessage);
    writer.write_string(&packet.message)?;
    writer.write_u8(packet.position);
    Ok(())
}

pub(crate) fn decode_spawn_position_packed(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let (x, y, z) = reader.read_position()?;
    Ok(PacketSpawnPosition { x, y, z }.into())
}

pub(crate) fn encode_spawn_position_packed(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, SpawnPosition);
    writer.write_position(packet.x, packet.y, packet.z);
    Ok(())
}

pub(crate) fn decode_respawn(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketRespawn {
        dimension: reader.read_i32()?,
        difficulty: reader.read_u8()?,
        game_mode: reader.read_u8()?,
        level_type: reader.read_string()?,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_respawn(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Respawn);
    writer.write_i32(packet.dimension);
    writer.write_u8(packet.difficulty);
    writer.write_u8(packet.game_mode);
    writer.write_string(&packet.level_type)
}

// 1.7 teleports by eye height and has no stance on this packet.
pub(crate) fn decode_position_look_clientbound_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let x = reader.read_f64()?;
    let y = reader.read_f64()?;
    Ok(PacketPlayerPositionLook {
        x,
        y,
        stance: y - PLAYER_EYE_HEIGHT,
        z: reader.read_f64()?,
        yaw: reader.read_f32()?,
        pitch: reader.read_f32()?,
        on_ground: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_position_look_clientbound_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerPositionLook);
    writer.write_f64(packet.x);
    writer.write_f64(packet.y);
    writer.write_f64(packet.z);
    writer.write_f32(packet.yaw);
    writer.write_f32(packet.pitch);
    writer.write_bool(packet.on_ground);
    Ok(())
}

// 1.8 uses feet height and a relative-axis flag byte, always absolute here.
pub(crate) fn decode_position_look_clientbound_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let x = reader.read_f64()?;
    let y = reader.read_f64()?;
    let packet = PacketPlayerPositionLook {
        x,
        y,
        stance: y + PLAYER_EYE_HEIGHT,
        z: reader.read_f64()?,
        yaw: reader.read_f32()?,
        pitch: reader.read_f32()?,
        on_ground: false,
    };
    if reader.read_u8()? != 0 {
        return Err(PacketError::InvalidValue("relative teleport"));
    }
    Ok(packet.into())
}

pub(crate) fn encode_position_look_clientbound_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerPositionLook);
    writer.write_f64(packet.x);
    writer.write_f64(packet.y);
    writer.write_f64(packet.z);
    writer.write_f32(packet.yaw);
    writer.write_f32(packet.pitch);
    writer.write_u8(0);
    Ok(())
}

fn read_spawn_player_tail(
    reader: &mut PacketReader,
    packet: &mut PacketSpawnPlayer,
) -> Result<(), PacketError> {
    packet.x = reader.read_i32()?;
    packet.y = reader.read_i32()?;
    packet.z = reader.read_i32()?;
    packet.yaw = reader.read_i8()?;
    packet.pitch = reader.read_i8()?;
    packet.current_item = reader.read_i16()?;
    skip_entity_metadata(reader)
}

fn write_spawn_player_tail(packet: &PacketSpawnPlayer, writer: &mut PacketWriter) {
    writer.write_i32(packet.x);
    writer.write_i32(packet.y);
    writer.write_i32(packet.z);
    writer.write_i8(packet.yaw);
    writer.write_i8(packet.pitch);
    writer.write_i16(packet.current_item);
    writer.write_u8(METADATA_END);
}

pub(crate) fn decode_spawn_player_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let mut packet = PacketSpawnPlayer {
        entity_id: reader.read_varint()?,
        uuid: uuid_from_string(&reader.read_string()?)?,
        name: reader.read_string()?,
        ..Default::default()
    };
    read_spawn_player_tail(reader, &mut packet)?;
    Ok(packet.into())
}

pub(crate) fn encode_spawn_player_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, SpawnPlayer);
    writer.write_varint(packet.entity_id);
    writer.write_string(&uuid_to_string(packet.uuid))?;
    writer.write_string(&packet.name)?;
    write_spawn_player_tail(packet, writer);
    Ok(())
}

// 1.7.6 adds skin properties after the name.
pub(crate) fn decode_spawn_player_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let mut packet = PacketSpawnPlayer {
        entity_id: reader.read_varint()?,
        uuid: uuid_from_string(&reader.read_string()?)?,
        name: reader.read_string()?,
        ..Default::default()
    };
    let properties = reader.read_varint()?;
    for _ in 0..properties {
        reader.read_string()?;
        reader.read_string()?;
        reader.read_string()?;
    }
    read_spawn_player_tail(reader, &mut packet)?;
    Ok(packet.into())
}

pub(crate) fn encode_spawn_player_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, SpawnPlayer);
    writer.write_varint(packet.entity_id);
    writer.write_string(&uuid_to_string(packet.uuid))?;
    writer.write_string(&packet.name)?;
    writer.write_varint(0);
    write_spawn_player_tail(packet, writer);
    Ok(())
}

// 1.8 identifies the player by uuid alone; the name comes from the tab list.
pub(crate) fn decode_spawn_player_v3(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let mut packet = PacketSpawnPlayer {
        entity_id: reader.read_varint()?,
        uuid: reader.read_u128()?,
        ..Default::default()
    };
    read_spawn_player_tail(reader, &mut packet)?;
    Ok(packet.into())
}

pub(crate) fn encode_spawn_player_v3(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, SpawnPlayer);
    writer.write_varint(packet.entity_id);
    writer.write_u128(packet.uuid);
    write_spawn_player_tail(packet, writer);
    Ok(())
}

pub(crate) fn decode_animation_v1(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketAnimation {
        entity_id: reader.read_varint()?,
        animation: reader.read_u8()? as i8,
    }
    .into())
}

pub(crate) fn encode_animation_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Animation);
    writer.write_varint(packet.entity_id);
    writer.write_u8(packet.animation as u8);
    Ok(())
}

pub(crate) fn decode_destroy_entities_varint(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let count = reader.read_varint()?;
    if count < 0 {
        return Err(PacketError::InvalidValue("entity count"));
    }
    let entity_ids = (0..count)
        .map(|_| reader.read_varint())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PacketDestroyEntities { entity_ids }.into())
}

pub(crate) fn encode_destroy_entities_varint(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, DestroyEntities);
    writer.write_varint(packet.entity_ids.len() as i32);
    for entity_id in &packet.entity_ids {
        writer.write_varint(*entity_id);
    }
    Ok(())
}

pub(crate) fn decode_entity_teleport_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketEntityTeleport {
        entity_id: reader.read_varint()?,
        x: reader.read_i32()?,
        y: reader.read_i32()?,
        z: reader.read_i32()?,
        yaw: reader.read_i8()?,
        pitch: reader.read_i8()?,
        on_ground: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_entity_teleport_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EntityTeleport);
    writer.write_varint(packet.entity_id);
    writer.write_i32(packet.x);
    writer.write_i32(packet.y);
    writer.write_i32(packet.z);
    writer.write_i8(packet.yaw);
    writer.write_i8(packet.pitch);
    writer.write_bool(packet.on_ground);
    Ok(())
}

// 1.8 sends the section data uncompressed with a varint length.
pub(crate) fn decode_chunk_v3(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketChunkData {
        chunk_x: reader.read_i32()?,
        chunk_z: reader.read_i32()?,
        ground_up: reader.read_bool()?,
        primary_bitmask: reader.read_u16()?,
        add_bitmask: 0,
        data: reader.read_varint_bytes()?.to_vec(),
    }
    .into())
}

pub(crate) fn encode_chunk_v3(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ChunkData);
    writer.write_i32(packet.chunk_x);
    writer.write_i32(packet.chunk_z);
    writer.write_bool(packet.ground_up);
    writer.write_u16(packet.primary_bitmask);
    writer.write_varint_bytes(&packet.data);
    Ok(())
}

pub(crate) fn decode_block_change_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketBlockChange {
        x: reader.read_i32()?,
        y: reader.read_u8()? as i32,
        z: reader.read_i32()?,
        block_id: reader.read_varint()?,
        metadata: reader.read_u8()?,
    }
    .into())
}

pub(crate) fn encode_block_change_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, BlockChange);
    writer.write_i32(packet.x);
    writer.write_u8(packet.y as u8);
    writer.write_i32(packet.z);
    writer.write_varint(packet.block_id);
    writer.write_u8(packet.metadata);
    Ok(())
}

// 1.8 folds id and metadata into one block state.
pub(crate) fn decode_block_change_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let (x, y, z) = reader.read_position()?;
    let state = reader.read_varint()?;
    Ok(PacketBlockChange {
        x,
        y,
        z,
        block_id: state >> 4,
        metadata: (state & 0xf) as u8,
    }
    .into())
}

pub(crate) fn encode_block_change_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, BlockChange);
    writer.write_position(packet.x, packet.y, packet.z);
    writer.write_varint((packet.block_id << 4) | (packet.metadata as i32 & 0xf));
    Ok(())
}

pub(crate) fn decode_change_game_state(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketChangeGameState {
        reason: reader.read_u8()?,
        value: reader.read_f32()?,
    }
    .into())
}

pub(crate) fn encode_change_game_state(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ChangeGameState);
    writer.write_u8(packet.reason);
    writer.write_f32(packet.value);
    Ok(())
}

const PLAYER_LIST_ADD: i32 = 0;
const PLAYER_LIST_REMOVE: i32 = 4;

pub(crate) fn decode_player_list_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let action = match reader.read_varint()? {
        PLAYER_LIST_ADD => PlayerListAction::Add,
        PLAYER_LIST_REMOVE => PlayerListAction::Remove,
        _ => return Err(PacketError::InvalidValue("player list action")),
    };
    let count = reader.read_varint()?;
    let mut entries = Vec::new();
    for _ in 0..count {
        let mut entry = PlayerListEntry {
            uuid: reader.read_u128()?,
            ..Default::default()
        };
        if action == PlayerListAction::Add {
            entry.name = reader.read_string()?;
            let properties = reader.read_varint()?;
            for _ in 0..properties {
                reader.read_string()?;
                reader.read_string()?;
                if reader.read_bool()? {
                    reader.read_string()?;
                }
            }
            entry.game_mode = reader.read_varint()?;
            entry.ping = reader.read_varint()?;
            if reader.read_bool()? {
                reader.read_string()?;
            }
        }
        entries.push(entry);
    }
    Ok(PacketPlayerListItem { action, entries }.into())
}

pub(crate) fn encode_player_list_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerListItem);
    writer.write_varint(match packet.action {
        PlayerListAction::Add => PLAYER_LIST_ADD,
        PlayerListAction::Remove => PLAYER_LIST_REMOVE,
    });
    writer.write_varint(packet.entries.len() as i32);
    for entry in &packet.entries {
        writer.write_u128(entry.uuid);
        if packet.action == PlayerListAction::Add {
            writer.write_string(&entry.name)?;
            writer.write_varint(0);
            writer.write_varint(entry.game_mode);
            writer.write_varint(entry.ping);
            writer.write_bool(false);
        }
    }
    Ok(())
}

pub(crate) fn decode_abilities(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketPlayerAbilities {
        flags: reader.read_u8()?,
        fly_speed: reader.read_f32()?,
        walk_speed: reader.read_f32()?,
    }
    .into())
}

pub(crate) fn encode_abilities(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerAbilities);
    writer.write_u8(packet.flags);
    writer.write_f32(packet.fly_speed);
    writer.write_f32(packet.walk_speed);
    Ok(())
}

pub(crate) fn decode_plugin_message_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketPluginMessage {
        channel: reader.read_string()?,
        data: reader.read_remaining_bytes().to_vec(),
    }
    .into())
}

pub(crate) fn encode_plugin_message_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PluginMessage);
    writer.write_string(&packet.channel)?;
    writer.write_bytes(&packet.data);
    Ok(())
}

pub(crate) fn decode_update_sign_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let (x, y, z) = reader.read_position()?;
    let lines = (0..4)
        .map(|_| reader.read_string())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PacketUpdateSign { x, y, z, lines }.into())
}

pub(crate) fn encode_update_sign_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, UpdateSign);
    if packet.lines.len() != 4 {
        return Err(PacketError::InvalidValue("sign lines"));
    }
    writer.write_position(packet.x, packet.y, packet.z);
    for line in &packet.lines {
        writer.write_string(line)?;
    }
    Ok(())
}

pub(crate) fn decode_use_entity_v1(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketUseEntity {
        user: 0,
        target: reader.read_i32()?,
        action: reader.read_i8()? as i32,
    }
    .into())
}

pub(crate) fn encode_use_entity_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, UseEntity);
    writer.write_i32(packet.target);
    writer.write_i8(packet.action as i8);
    Ok(())
}

const USE_ENTITY_INTERACT_AT: i32 = 2;

pub(crate) fn decode_use_entity_v2(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let target = reader.read_varint()?;
    let action = reader.read_varint()?;
    if action == USE_ENTITY_INTERACT_AT {
        reader.read_f32()?;
        reader.read_f32()?;
        reader.read_f32()?;
    }
    Ok(PacketUseEntity {
        user: 0,
        target,
        action,
    }
    .into())
}

pub(crate) fn encode_use_entity_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, UseEntity);
    writer.write_varint(packet.target);
    writer.write_varint(packet.action);
    if packet.action == USE_ENTITY_INTERACT_AT {
        writer.write_f32(0.0);
        writer.write_f32(0.0);
        writer.write_f32(0.0);
    }
    Ok(())
}

// 1.7 still sends feet then head; 1.8 drops the head value.
pub(crate) fn decode_player_position_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let x = reader.read_f64()?;
    let feet = reader.read_f64()?;
    let head = reader.read_f64()?;
    Ok(PacketPlayerPosition {
        x,
        y: head,
        stance: feet,
        z: reader.read_f64()?,
        on_ground: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_player_position_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerPosition);
    writer.write_f64(packet.x);
    writer.write_f64(packet.stance);
    writer.write_f64(packet.y);
    writer.write_f64(packet.z);
    writer.write_bool(packet.on_ground);
    Ok(())
}

pub(crate) fn decode_player_position_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let x = reader.read_f64()?;
    let y = reader.read_f64()?;
    Ok(PacketPlayerPosition {
        x,
        y,
        stance: y + PLAYER_EYE_HEIGHT,
        z: reader.read_f64()?,
        on_ground: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_player_position_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerPosition);
    writer.write_f64(packet.x);
    writer.write_f64(packet.y);
    writer.write_f64(packet.z);
    writer.write_bool(packet.on_ground);
    Ok(())
}

pub(crate) fn decode_player_position_look_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let x = reader.read_f64()?;
    let feet = reader.read_f64()?;
    let head = reader.read_f64()?;
    Ok(PacketPlayerPositionLook {
        x,
        y: head,
        stance: feet,
        z: reader.read_f64()?,
        yaw: reader.read_f32()?,
        pitch: reader.read_f32()?,
        on_ground: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_player_position_look_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerPositionLook);
    writer.write_f64(packet.x);
    writer.write_f64(packet.stance);
    writer.write_f64(packet.y);
    writer.write_f64(packet.z);
    writer.write_f32(packet.yaw);
    writer.write_f32(packet.pitch);
    writer.write_bool(packet.on_ground);
    Ok(())
}

pub(crate) fn decode_player_position_look_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let x = reader.read_f64()?;
    let y = reader.read_f64()?;
    Ok(PacketPlayerPositionLook {
        x,
        y,
        stance: y + PLAYER_EYE_HEIGHT,
        z: reader.read_f64()?,
        yaw: reader.read_f32()?,
        pitch: reader.read_f32()?,
        on_ground: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_player_position_look_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerPositionLook);
    writer.write_f64(packet.x);
    writer.write_f64(packet.y);
    writer.write_f64(packet.z);
    writer.write_f32(packet.yaw);
    writer.write_f32(packet.pitch);
    writer.write_bool(packet.on_ground);
    Ok(())
}

pub(crate) fn decode_player_digging_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let status = reader.read_u8()?;
    let (x, y, z) = reader.read_position()?;
    Ok(PacketPlayerDigging {
        status,
        x,
        y,
        z,
        face: reader.read_i8()?,
    }
    .into())
}

pub(crate) fn encode_player_digging_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerDigging);
    writer.write_u8(packet.status);
    writer.write_position(packet.x, packet.y, packet.z);
    writer.write_i8(packet.face);
    Ok(())
}

pub(crate) fn decode_block_placement_v3(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let (x, y, z) = reader.read_position()?;
    Ok(PacketBlockPlacement {
        x,
        y,
        z,
        direction: reader.read_i8()?,
        item: reader.read_item_stack()?,
        cursor_x: reader.read_u8()?,
        cursor_y: reader.read_u8()?,
        cursor_z: reader.read_u8()?,
    }
    .into())
}

pub(crate) fn encode_block_placement_v3(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, BlockPlacement);
    writer.write_position(packet.x, packet.y, packet.z);
    writer.write_i8(packet.direction);
    writer.write_item_stack(packet.item.as_ref())?;
    writer.write_u8(packet.cursor_x);
    writer.write_u8(packet.cursor_y);
    writer.write_u8(packet.cursor_z);
    Ok(())
}

pub const ANIMATION_SWING_ARM: i8 = 1;

pub(crate) fn decode_animation_swing(
    _reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketAnimation {
        entity_id: 0,
        animation: ANIMATION_SWING_ARM,
    }
    .into())
}

pub(crate) fn encode_animation_swing(
    packet: &JavaPacket,
    _writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    expect_packet!(packet, Animation);
    Ok(())
}

pub(crate) fn decode_entity_action_v3(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketEntityAction {
        entity_id: reader.read_varint()?,
        action: reader.read_varint()? as i8,
        jump_boost: reader.read_varint()?,
    }
    .into())
}

pub(crate) fn encode_entity_action_v3(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EntityAction);
    writer.write_varint(packet.entity_id);
    writer.write_varint(packet.action as i32);
    writer.write_varint(packet.jump_boost);
    Ok(())
}

pub(crate) fn decode_tab_complete_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let text = reader.read_string()?;
    if reader.read_bool()? {
        reader.read_position()?;
    }
    Ok(PacketTabComplete { text }.into())
}

pub(crate) fn encode_tab_complete_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, TabComplete);
    writer.write_string(&packet.text)?;
    writer.write_bool(false);
    Ok(())
}

pub(crate) fn decode_client_settings_v3(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketClientSettings {
        locale: reader.read_string()?,
        view_distance: reader.read_i8()?,
        chat_flags: reader.read_i8()?,
        chat_colors: reader.read_bool()?,
        difficulty: reader.read_u8()?,
        show_cape: reader.read_bool()?,
        skin_parts: 0,
    }
    .into())
}

pub(crate) fn encode_client_settings_v3(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ClientSettings);
    writer.write_string(&packet.locale)?;
    writer.write_i8(packet.view_distance);
    writer.write_i8(packet.chat_flags);
    writer.write_bool(packet.chat_colors);
    writer.write_u8(packet.difficulty);
    writer.write_bool(packet.show_cape);
    Ok(())
}

pub(crate) fn decode_client_settings_v4(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketClientSettings {
        locale: reader.read_string()?,
        view_distance: reader.read_i8()?,
        chat_flags: reader.read_i8()?,
        chat_colors: reader.read_bool()?,
        skin_parts: reader.read_u8()?,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_client_settings_v4(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ClientSettings);
    writer.write_string(&packet.locale)?;
    writer.write_i8(packet.view_distance);
    writer.write_i8(packet.chat_flags);
    writer.write_bool(packet.chat_colors);
    writer.write_u8(packet.skin_parts);
    Ok(())
}

pub(crate) fn decode_client_status_varint(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketClientStatus {
        action: reader.read_varint()?,
    }
    .into())
}

pub(crate) fn encode_client_status_varint(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ClientStatus);
    writer.write_varint(packet.action);
    Ok(())
}
