use blockbridge_network_common::{PacketError, PacketReader, PacketWriter};

use crate::{
    common_packets::{
        skip_entity_metadata, ItemStack, PacketReadItemStack, PacketWriteItemStack, METADATA_END,
    },
    expect_packet, JavaPacket, PacketAddToInventory, PacketAnimation, PacketBlockChange,
    PacketBlockPlacement, PacketChangeGameState, PacketChatMessage, PacketChunkData,
    PacketClickWindow, PacketClientSettings, PacketCloseWindow, PacketConfirmTransaction,
    PacketCreativeInventoryAction, PacketDestroyEntities, PacketEnchantItem, PacketEntityAction,
    PacketEntityTeleport, PacketFlatChunkData, PacketHeldItemChange, PacketHoldingChange,
    PacketKeepAlive, PacketPickupSpawn, PacketPlayerAbilities, PacketPlayerDigging,
    PacketPlayerInventory, PacketPlayerListItem, PacketPlayerLook, PacketPlayerOnGround,
    PacketPlayerPosition, PacketPlayerPositionLook, PacketPreChunk, PacketRespawn, PacketSetSlot,
    PacketSpawnPlayer, PacketSpawnPosition, PacketTabComplete, PacketTimeUpdate,
    PacketUpdateSign, PacketUseEntity, PacketWindowItems, PlayerListAction, PlayerListEntry,
    ABILITY_ALLOW_FLYING, ABILITY_CREATIVE, ABILITY_FLYING, ABILITY_INVULNERABLE,
};

pub const DEFAULT_FLY_SPEED: f32 = 0.05;
pub const DEFAULT_WALK_SPEED: f32 = 0.1;

pub(crate) fn decode_keep_alive_empty(
    _reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketKeepAlive { id: 0 }.into())
}

pub(crate) fn encode_keep_alive_empty(
    packet: &JavaPacket,
    _writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    expect_packet!(packet, KeepAlive);
    Ok(())
}

pub(crate) fn decode_keep_alive(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketKeepAlive {
        id: reader.read_i32()?,
    }
    .into())
}

pub(crate) fn encode_keep_alive(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, KeepAlive);
    writer.write_i32(packet.id);
    Ok(())
}

pub(crate) fn decode_chat(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketChatMessage {
        message: reader.read_string()?,
        position: 0,
    }
    .into())
}

pub(crate) fn encode_chat(packet: &JavaPacket, writer: &mut PacketWriter) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ChatMessage);
    writer.write_string(&packet.message)
}

pub(crate) fn decode_time_single(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let time_of_day = reader.read_i64()?;
    Ok(PacketTimeUpdate {
        world_age: time_of_day,
        time_of_day,
    }
    .into())
}

pub(crate) fn encode_time_single(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, TimeUpdate);
    writer.write_i64(packet.time_of_day);
    Ok(())
}

pub(crate) fn decode_time_double(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let world_age = reader.read_i64()?;
    let time_of_day = reader.read_i64()?;
    Ok(PacketTimeUpdate {
        world_age,
        time_of_day,
    }
    .into())
}

pub(crate) fn encode_time_double(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, TimeUpdate);
    writer.write_i64(packet.world_age);
    writer.write_i64(packet.time_of_day);
    Ok(())
}

pub(crate) fn decode_player_inventory(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let inventory_type = reader.read_i32()?;
    let items = reader.read_item_stacks()?;
    Ok(PacketPlayerInventory {
        inventory_type,
        items,
    }
    .into())
}

pub(crate) fn encode_player_inventory(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerInventory);
    writer.write_i32(packet.inventory_type);
    writer.write_item_stacks(&packet.items)
}

pub(crate) fn decode_spawn_position(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketSpawnPosition {
        x: reader.read_i32()?,
        y: reader.read_i32()?,
        z: reader.read_i32()?,
    }
    .into())
}

pub(crate) fn encode_spawn_position(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, SpawnPosition);
    writer.write_i32(packet.x);
    writer.write_i32(packet.y);
    writer.write_i32(packet.z);
    Ok(())
}

pub(crate) fn decode_use_entity(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketUseEntity {
        user: reader.read_i32()?,
        target: reader.read_i32()?,
        action: reader.read_bool()? as i32,
    }
    .into())
}

pub(crate) fn encode_use_entity(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, UseEntity);
    writer.write_i32(packet.user);
    writer.write_i32(packet.target);
    writer.write_bool(packet.action != 0);
    Ok(())
}

pub(crate) fn decode_respawn_empty(_reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketRespawn::default().into())
}

pub(crate) fn encode_respawn_empty(
    packet: &JavaPacket,
    _writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    expect_packet!(packet, Respawn);
    Ok(())
}

pub(crate) fn decode_respawn_v1(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketRespawn {
        dimension: reader.read_i8()? as i32,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_respawn_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Respawn);
    writer.write_i8(packet.dimension as i8);
    Ok(())
}

pub(crate) fn decode_respawn_v2(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketRespawn {
        dimension: reader.read_i8()? as i32,
        difficulty: reader.read_u8()?,
        game_mode: reader.read_u8()?,
        world_height: reader.read_u16()?,
        seed: reader.read_i64()?,
        level_type: String::new(),
    }
    .into())
}

pub(crate) fn encode_respawn_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Respawn);
    writer.write_i8(packet.dimension as i8);
    writer.write_u8(packet.difficulty);
    writer.write_u8(packet.game_mode);
    writer.write_u16(packet.world_height);
    writer.write_i64(packet.seed);
    Ok(())
}

pub(crate) fn decode_respawn_v3(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketRespawn {
        dimension: reader.read_i8()? as i32,
        difficulty: reader.read_u8()?,
        game_mode: reader.read_u8()?,
        world_height: reader.read_u16()?,
        seed: reader.read_i64()?,
        level_type: reader.read_string()?,
    }
    .into())
}

pub(crate) fn encode_respawn_v3(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Respawn);
    writer.write_i8(packet.dimension as i8);
    writer.write_u8(packet.difficulty);
    writer.write_u8(packet.game_mode);
    writer.write_u16(packet.world_height);
    writer.write_i64(packet.seed);
    writer.write_string(&packet.level_type)
}

pub(crate) fn decode_respawn_v4(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketRespawn {
        dimension: reader.read_i32()?,
        difficulty: reader.read_u8()?,
        game_mode: reader.read_u8()?,
        world_height: reader.read_u16()?,
        seed: 0,
        level_type: reader.read_string()?,
    }
    .into())
}

pub(crate) fn encode_respawn_v4(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Respawn);
    writer.write_i32(packet.dimension);
    writer.write_u8(packet.difficulty);
    writer.write_u8(packet.game_mode);
    writer.write_u16(packet.world_height);
    writer.write_string(&packet.level_type)
}

pub(crate) fn decode_player_on_ground(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketPlayerOnGround {
        on_ground: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_player_on_ground(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerOnGround);
    writer.write_bool(packet.on_ground);
    Ok(())
}

// Clients send their feet Y first and the eye Y ("stance") second.
pub(crate) fn decode_player_position(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let x = reader.read_f64()?;
    let feet = reader.read_f64()?;
    let eye = reader.read_f64()?;
    let z = reader.read_f64()?;
    let on_ground = reader.read_bool()?;
    Ok(PacketPlayerPosition {
        x,
        y: eye,
        stance: feet,
        z,
        on_ground,
    }
    .into())
}

pub(crate) fn encode_player_position(
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

pub(crate) fn decode_player_look(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketPlayerLook {
        yaw: reader.read_f32()?,
        pitch: reader.read_f32()?,
        on_ground: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_player_look(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerLook);
    writer.write_f32(packet.yaw);
    writer.write_f32(packet.pitch);
    writer.write_bool(packet.on_ground);
    Ok(())
}

pub(crate) fn decode_player_position_look_serverbound(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let x = reader.read_f64()?;
    let feet = reader.read_f64()?;
    let eye = reader.read_f64()?;
    let z = reader.read_f64()?;
    Ok(PacketPlayerPositionLook {
        x,
        y: eye,
        stance: feet,
        z,
        yaw: reader.read_f32()?,
        pitch: reader.read_f32()?,
        on_ground: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_player_position_look_serverbound(
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

// The server sends eye Y first and feet second.
pub(crate) fn decode_player_position_look_clientbound(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketPlayerPositionLook {
        x: reader.read_f64()?,
        y: reader.read_f64()?,
        stance: reader.read_f64()?,
        z: reader.read_f64()?,
        yaw: reader.read_f32()?,
        pitch: reader.read_f32()?,
        on_ground: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_player_position_look_clientbound(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerPositionLook);
    writer.write_f64(packet.x);
    writer.write_f64(packet.y);
    writer.write_f64(packet.stance);
    writer.write_f64(packet.z);
    writer.write_f32(packet.yaw);
    writer.write_f32(packet.pitch);
    writer.write_bool(packet.on_ground);
    Ok(())
}

pub(crate) fn decode_player_digging(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketPlayerDigging {
        status: reader.read_u8()?,
        x: reader.read_i32()?,
        y: reader.read_u8()? as i32,
        z: reader.read_i32()?,
        face: reader.read_i8()?,
    }
    .into())
}

pub(crate) fn encode_player_digging(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerDigging);
    writer.write_u8(packet.status);
    writer.write_i32(packet.x);
    writer.write_u8(packet.y as u8);
    writer.write_i32(packet.z);
    writer.write_i8(packet.face);
    Ok(())
}

// Alpha places by item id only, with the id first.
pub(crate) fn decode_block_placement_alpha(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let item_id = reader.read_i16()?;
    let x = reader.read_i32()?;
    let y = reader.read_i8()? as i32;
    let z = reader.read_i32()?;
    let direction = reader.read_i8()?;
    let item = (item_id >= 0).then(|| ItemStack::new(item_id, 1, 0));
    Ok(PacketBlockPlacement {
        x,
        y,
        z,
        direction,
        item,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_block_placement_alpha(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, BlockPlacement);
    writer.write_i16(packet.item.as_ref().map_or(-1, |item| item.id));
    writer.write_i32(packet.x);
    writer.write_i8(packet.y as i8);
    writer.write_i32(packet.z);
    writer.write_i8(packet.direction);
    Ok(())
}

pub(crate) fn decode_block_placement_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketBlockPlacement {
        x: reader.read_i32()?,
        y: reader.read_i8()? as i32,
        z: reader.read_i32()?,
        direction: reader.read_i8()?,
        item: reader.read_item_stack()?,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_block_placement_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, BlockPlacement);
    writer.write_i32(packet.x);
    writer.write_i8(packet.y as i8);
    writer.write_i32(packet.z);
    writer.write_i8(packet.direction);
    writer.write_item_stack(packet.item.as_ref())
}

// 1.3 reads y unsigned and appends the cursor position on the face.
pub(crate) fn decode_block_placement_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketBlockPlacement {
        x: reader.read_i32()?,
        y: reader.read_u8()? as i32,
        z: reader.read_i32()?,
        direction: reader.read_i8()?,
        item: reader.read_item_stack()?,
        cursor_x: reader.read_u8()?,
        cursor_y: reader.read_u8()?,
        cursor_z: reader.read_u8()?,
    }
    .into())
}

pub(crate) fn encode_block_placement_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, BlockPlacement);
    writer.write_i32(packet.x);
    writer.write_u8(packet.y as u8);
    writer.write_i32(packet.z);
    writer.write_i8(packet.direction);
    writer.write_item_stack(packet.item.as_ref())?;
    writer.write_u8(packet.cursor_x);
    writer.write_u8(packet.cursor_y);
    writer.write_u8(packet.cursor_z);
    Ok(())
}

pub(crate) fn decode_holding_change(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketHoldingChange {
        entity_id: reader.read_i32()?,
        item_id: reader.read_i16()?,
    }
    .into())
}

pub(crate) fn encode_holding_change(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, HoldingChange);
    writer.write_i32(packet.entity_id);
    writer.write_i16(packet.item_id);
    Ok(())
}

pub(crate) fn decode_held_item_change(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketHeldItemChange {
        slot: reader.read_i16()?,
    }
    .into())
}

pub(crate) fn encode_held_item_change(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, HeldItemChange);
    writer.write_i16(packet.slot);
    Ok(())
}

pub(crate) fn decode_add_to_inventory(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketAddToInventory {
        item: ItemStack::new(reader.read_i16()?, reader.read_i8()?, reader.read_i16()?),
    }
    .into())
}

pub(crate) fn encode_add_to_inventory(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, AddToInventory);
    writer.write_i16(packet.item.id);
    writer.write_i8(packet.item.count);
    writer.write_i16(packet.item.damage);
    Ok(())
}

pub(crate) fn decode_animation(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketAnimation {
        entity_id: reader.read_i32()?,
        animation: reader.read_i8()?,
    }
    .into())
}

pub(crate) fn encode_animation(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Animation);
    writer.write_i32(packet.entity_id);
    writer.write_i8(packet.animation);
    Ok(())
}

pub(crate) fn decode_entity_action_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketEntityAction {
        entity_id: reader.read_i32()?,
        action: reader.read_i8()?,
        jump_boost: 0,
    }
    .into())
}

pub(crate) fn encode_entity_action_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EntityAction);
    writer.write_i32(packet.entity_id);
    writer.write_i8(packet.action);
    Ok(())
}

pub(crate) fn decode_entity_action_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketEntityAction {
        entity_id: reader.read_i32()?,
        action: reader.read_i8()?,
        jump_boost: reader.read_i32()?,
    }
    .into())
}

pub(crate) fn encode_entity_action_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EntityAction);
    writer.write_i32(packet.entity_id);
    writer.write_i8(packet.action);
    writer.write_i32(packet.jump_boost);
    Ok(())
}

fn read_spawn_player(reader: &mut PacketReader) -> Result<PacketSpawnPlayer, PacketError> {
    Ok(PacketSpawnPlayer {
        entity_id: reader.read_i32()?,
        uuid: 0,
        name: reader.read_string()?,
        x: reader.read_i32()?,
        y: reader.read_i32()?,
        z: reader.read_i32()?,
        yaw: reader.read_i8()?,
        pitch: reader.read_i8()?,
        current_item: reader.read_i16()?,
    })
}

fn write_spawn_player(
    packet: &PacketSpawnPlayer,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    writer.write_i32(packet.entity_id);
    writer.write_string(&packet.name)?;
    writer.write_i32(packet.x);
    writer.write_i32(packet.y);
    writer.write_i32(packet.z);
    writer.write_i8(packet.yaw);
    writer.write_i8(packet.pitch);
    writer.write_i16(packet.current_item);
    Ok(())
}

pub(crate) fn decode_spawn_player_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(read_spawn_player(reader)?.into())
}

pub(crate) fn encode_spawn_player_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    write_spawn_player(expect_packet!(packet, SpawnPlayer), writer)
}

// 1.4.2 appends entity metadata.
pub(crate) fn decode_spawn_player_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let packet = read_spawn_player(reader)?;
    skip_entity_metadata(reader)?;
    Ok(packet.into())
}

pub(crate) fn encode_spawn_player_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    write_spawn_player(expect_packet!(packet, SpawnPlayer), writer)?;
    writer.write_u8(METADATA_END);
    Ok(())
}

pub(crate) fn decode_pickup_spawn(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let entity_id = reader.read_i32()?;
    let item = ItemStack::new(reader.read_i16()?, reader.read_i8()?, 0);
    Ok(PacketPickupSpawn {
        entity_id,
        item,
        x: reader.read_i32()?,
        y: reader.read_i32()?,
        z: reader.read_i32()?,
        rotation: reader.read_i8()?,
        pitch: reader.read_i8()?,
        roll: reader.read_i8()?,
    }
    .into())
}

pub(crate) fn encode_pickup_spawn(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PickupSpawn);
    writer.write_i32(packet.entity_id);
    writer.write_i16(packet.item.id);
    writer.write_i8(packet.item.count);
    writer.write_i32(packet.x);
    writer.write_i32(packet.y);
    writer.write_i32(packet.z);
    writer.write_i8(packet.rotation);
    writer.write_i8(packet.pitch);
    writer.write_i8(packet.roll);
    Ok(())
}

pub(crate) fn decode_destroy_entity(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketDestroyEntities {
        entity_ids: vec![reader.read_i32()?],
    }
    .into())
}

pub(crate) fn encode_destroy_entity(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, DestroyEntities);
    match packet.entity_ids.as_slice() {
        [entity_id] => {
            writer.write_i32(*entity_id);
            Ok(())
        }
        _ => Err(PacketError::InvalidValue("entity count")),
    }
}

pub(crate) fn decode_destroy_entities(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let count = reader.read_u8()?;
    let entity_ids = (0..count)
        .map(|_| reader.read_i32())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PacketDestroyEntities { entity_ids }.into())
}

pub(crate) fn encode_destroy_entities(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, DestroyEntities);
    if packet.entity_ids.len() > u8::MAX as usize {
        return Err(PacketError::InvalidValue("entity count"));
    }
    writer.write_u8(packet.entity_ids.len() as u8);
    for entity_id in &packet.entity_ids {
        writer.write_i32(*entity_id);
    }
    Ok(())
}

pub(crate) fn decode_entity_teleport(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketEntityTeleport {
        entity_id: reader.read_i32()?,
        x: reader.read_i32()?,
        y: reader.read_i32()?,
        z: reader.read_i32()?,
        yaw: reader.read_i8()?,
        pitch: reader.read_i8()?,
        on_ground: false,
    }
    .into())
}

pub(crate) fn encode_entity_teleport(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EntityTeleport);
    writer.write_i32(packet.entity_id);
    writer.write_i32(packet.x);
    writer.write_i32(packet.y);
    writer.write_i32(packet.z);
    writer.write_i8(packet.yaw);
    writer.write_i8(packet.pitch);
    Ok(())
}

pub(crate) fn decode_pre_chunk(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketPreChunk {
        chunk_x: reader.read_i32()?,
        chunk_z: reader.read_i32()?,
        load: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_pre_chunk(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PreChunk);
    writer.write_i32(packet.chunk_x);
    writer.write_i32(packet.chunk_z);
    writer.write_bool(packet.load);
    Ok(())
}

fn read_int_length_bytes<'a>(reader: &mut PacketReader<'a>) -> Result<&'a [u8], PacketError> {
    let length = reader.read_i32()?;
    if length < 0 {
        return Err(PacketError::InvalidValue("chunk data length"));
    }
    reader.read_fixed_length_bytes(length as usize)
}

pub(crate) fn decode_flat_chunk(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketFlatChunkData {
        x: reader.read_i32()?,
        y: reader.read_i16()?,
        z: reader.read_i32()?,
        size_x: reader.read_u8()?.wrapping_add(1),
        size_y: reader.read_u8()?.wrapping_add(1),
        size_z: reader.read_u8()?.wrapping_add(1),
        compressed_data: read_int_length_bytes(reader)?.to_vec(),
    }
    .into())
}

pub(crate) fn encode_flat_chunk(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, FlatChunkData);
    writer.write_i32(packet.x);
    writer.write_i16(packet.y);
    writer.write_i32(packet.z);
    writer.write_u8(packet.size_x.wrapping_sub(1));
    writer.write_u8(packet.size_y.wrapping_sub(1));
    writer.write_u8(packet.size_z.wrapping_sub(1));
    writer.write_i32(packet.compressed_data.len() as i32);
    writer.write_bytes(&packet.compressed_data);
    Ok(())
}

// 1.2 sections carry an unused int after the length.
pub(crate) fn decode_chunk_v1(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let chunk_x = reader.read_i32()?;
    let chunk_z = reader.read_i32()?;
    let ground_up = reader.read_bool()?;
    let primary_bitmask = reader.read_u16()?;
    let add_bitmask = reader.read_u16()?;
    let length = reader.read_i32()?;
    reader.read_i32()?;
    if length < 0 {
        return Err(PacketError::InvalidValue("chunk data length"));
    }
    let data = reader.read_fixed_length_bytes(length as usize)?.to_vec();
    Ok(PacketChunkData {
        chunk_x,
        chunk_z,
        ground_up,
        primary_bitmask,
        add_bitmask,
        data,
    }
    .into())
}

pub(crate) fn encode_chunk_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ChunkData);
    writer.write_i32(packet.chunk_x);
    writer.write_i32(packet.chunk_z);
    writer.write_bool(packet.ground_up);
    writer.write_u16(packet.primary_bitmask);
    writer.write_u16(packet.add_bitmask);
    writer.write_i32(packet.data.len() as i32);
    writer.write_i32(0);
    writer.write_bytes(&packet.data);
    Ok(())
}

pub(crate) fn decode_chunk_v2(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketChunkData {
        chunk_x: reader.read_i32()?,
        chunk_z: reader.read_i32()?,
        ground_up: reader.read_bool()?,
        primary_bitmask: reader.read_u16()?,
        add_bitmask: reader.read_u16()?,
        data: read_int_length_bytes(reader)?.to_vec(),
    }
    .into())
}

pub(crate) fn encode_chunk_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ChunkData);
    writer.write_i32(packet.chunk_x);
    writer.write_i32(packet.chunk_z);
    writer.write_bool(packet.ground_up);
    writer.write_u16(packet.primary_bitmask);
    writer.write_u16(packet.add_bitmask);
    writer.write_i32(packet.data.len() as i32);
    writer.write_bytes(&packet.data);
    Ok(())
}

pub(crate) fn decode_block_change_byte(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketBlockChange {
        x: reader.read_i32()?,
        y: reader.read_u8()? as i32,
        z: reader.read_i32()?,
        block_id: reader.read_u8()? as i32,
        metadata: reader.read_u8()?,
    }
    .into())
}

pub(crate) fn encode_block_change_byte(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, BlockChange);
    if !(0..=255).contains(&packet.block_id) {
        return Err(PacketError::InvalidValue("block id"));
    }
    writer.write_i32(packet.x);
    writer.write_u8(packet.y as u8);
    writer.write_i32(packet.z);
    writer.write_u8(packet.block_id as u8);
    writer.write_u8(packet.metadata);
    Ok(())
}

pub(crate) fn decode_block_change_short(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketBlockChange {
        x: reader.read_i32()?,
        y: reader.read_u8()? as i32,
        z: reader.read_i32()?,
        block_id: reader.read_i16()? as i32,
        metadata: reader.read_u8()?,
    }
    .into())
}

pub(crate) fn encode_block_change_short(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, BlockChange);
    writer.write_i32(packet.x);
    writer.write_u8(packet.y as u8);
    writer.write_i32(packet.z);
    writer.write_i16(packet.block_id as i16);
    writer.write_u8(packet.metadata);
    Ok(())
}

pub(crate) fn decode_new_state_v1(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketChangeGameState {
        reason: reader.read_u8()?,
        value: 0.0,
    }
    .into())
}

pub(crate) fn encode_new_state_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ChangeGameState);
    writer.write_u8(packet.reason);
    Ok(())
}

pub(crate) fn decode_new_state_v2(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketChangeGameState {
        reason: reader.read_u8()?,
        value: reader.read_u8()? as f32,
    }
    .into())
}

pub(crate) fn encode_new_state_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ChangeGameState);
    writer.write_u8(packet.reason);
    writer.write_u8(packet.value as u8);
    Ok(())
}

pub(crate) fn decode_close_window(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketCloseWindow {
        window_id: reader.read_i8()?,
    }
    .into())
}

pub(crate) fn encode_close_window(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, CloseWindow);
    writer.write_i8(packet.window_id);
    Ok(())
}

pub(crate) fn decode_click_window_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketClickWindow {
        window_id: reader.read_i8()?,
        slot: reader.read_i16()?,
        button: reader.read_i8()?,
        action: reader.read_i16()?,
        mode: 0,
        item: reader.read_item_stack()?,
    }
    .into())
}

pub(crate) fn encode_click_window_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ClickWindow);
    writer.write_i8(packet.window_id);
    writer.write_i16(packet.slot);
    writer.write_i8(packet.button);
    writer.write_i16(packet.action);
    writer.write_item_stack(packet.item.as_ref())
}

// Beta 1.5 adds a shift flag, 1.5 replaces it with a mode byte. Both sit in
// the same position so one layout reads either.
pub(crate) fn decode_click_window_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketClickWindow {
        window_id: reader.read_i8()?,
        slot: reader.read_i16()?,
        button: reader.read_i8()?,
        action: reader.read_i16()?,
        mode: reader.read_i8()?,
        item: reader.read_item_stack()?,
    }
    .into())
}

pub(crate) fn encode_click_window_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ClickWindow);
    writer.write_i8(packet.window_id);
    writer.write_i16(packet.slot);
    writer.write_i8(packet.button);
    writer.write_i16(packet.action);
    writer.write_i8(packet.mode);
    writer.write_item_stack(packet.item.as_ref())
}

pub(crate) fn decode_confirm_transaction(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketConfirmTransaction {
        window_id: reader.read_i8()?,
        action: reader.read_i16()?,
        accepted: reader.read_bool()?,
    }
    .into())
}

pub(crate) fn encode_confirm_transaction(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ConfirmTransaction);
    writer.write_i8(packet.window_id);
    writer.write_i16(packet.action);
    writer.write_bool(packet.accepted);
    Ok(())
}

pub(crate) fn decode_set_slot(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketSetSlot {
        window_id: reader.read_i8()?,
        slot: reader.read_i16()?,
        item: reader.read_item_stack()?,
    }
    .into())
}

pub(crate) fn encode_set_slot(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, SetSlot);
    writer.write_i8(packet.window_id);
    writer.write_i16(packet.slot);
    writer.write_item_stack(packet.item.as_ref())
}

pub(crate) fn decode_window_items(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketWindowItems {
        window_id: reader.read_u8()?,
        items: reader.read_item_stacks()?,
    }
    .into())
}

pub(crate) fn encode_window_items(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, WindowItems);
    writer.write_u8(packet.window_id);
    writer.write_item_stacks(&packet.items)
}

// Beta 1.8 sends the item as three shorts.
pub(crate) fn decode_creative_action_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let slot = reader.read_i16()?;
    let id = reader.read_i16()?;
    let count = reader.read_i16()?;
    let damage = reader.read_i16()?;
    let item = (id >= 0).then(|| ItemStack::new(id, count as i8, damage));
    Ok(PacketCreativeInventoryAction { slot, item }.into())
}

pub(crate) fn encode_creative_action_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, CreativeInventoryAction);
    writer.write_i16(packet.slot);
    match &packet.item {
        Some(item) => {
            writer.write_i16(item.id);
            writer.write_i16(item.count as i16);
            writer.write_i16(item.damage);
        }
        None => {
            writer.write_i16(-1);
            writer.write_i16(0);
            writer.write_i16(0);
        }
    }
    Ok(())
}

pub(crate) fn decode_creative_action_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketCreativeInventoryAction {
        slot: reader.read_i16()?,
        item: reader.read_item_stack()?,
    }
    .into())
}

pub(crate) fn encode_creative_action_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, CreativeInventoryAction);
    writer.write_i16(packet.slot);
    writer.write_item_stack(packet.item.as_ref())
}

pub(crate) fn decode_enchant_item(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketEnchantItem {
        window_id: reader.read_i8()?,
        enchantment: reader.read_i8()?,
    }
    .into())
}

pub(crate) fn encode_enchant_item(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EnchantItem);
    writer.write_i8(packet.window_id);
    writer.write_i8(packet.enchantment);
    Ok(())
}

pub(crate) fn decode_update_sign(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let x = reader.read_i32()?;
    let y = reader.read_i16()? as i32;
    let z = reader.read_i32()?;
    let lines = (0..4)
        .map(|_| reader.read_string())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PacketUpdateSign { x, y, z, lines }.into())
}

pub(crate) fn encode_update_sign(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, UpdateSign);
    if packet.lines.len() != 4 {
        return Err(PacketError::InvalidValue("sign lines"));
    }
    writer.write_i32(packet.x);
    writer.write_i16(packet.y as i16);
    writer.write_i32(packet.z);
    for line in &packet.lines {
        writer.write_string(line)?;
    }
    Ok(())
}

// One name per packet; "online" false removes it from the tab list.
pub(crate) fn decode_player_list_item(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let name = reader.read_string()?;
    let online = reader.read_bool()?;
    let ping = reader.read_i16()? as i32;
    Ok(PacketPlayerListItem {
        action: if online {
            PlayerListAction::Add
        } else {
            PlayerListAction::Remove
        },
        entries: vec![PlayerListEntry {
            uuid: 0,
            name,
            game_mode: 0,
            ping,
        }],
    }
    .into())
}

pub(crate) fn encode_player_list_item(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerListItem);
    let entry = match packet.entries.as_slice() {
        [entry] => entry,
        _ => return Err(PacketError::InvalidValue("player list entries")),
    };
    writer.write_string(&entry.name)?;
    writer.write_bool(packet.action == PlayerListAction::Add);
    writer.write_i16(entry.ping as i16);
    Ok(())
}

pub(crate) fn decode_abilities_v1(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let mut flags = 0;
    for flag in [
        ABILITY_INVULNERABLE,
        ABILITY_FLYING,
        ABILITY_ALLOW_FLYING,
        ABILITY_CREATIVE,
    ] {
        if reader.read_bool()? {
            flags |= flag;
        }
    }
    Ok(PacketPlayerAbilities {
        flags,
        fly_speed: DEFAULT_FLY_SPEED,
        walk_speed: DEFAULT_WALK_SPEED,
    }
    .into())
}

pub(crate) fn encode_abilities_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerAbilities);
    for flag in [
        ABILITY_INVULNERABLE,
        ABILITY_FLYING,
        ABILITY_ALLOW_FLYING,
        ABILITY_CREATIVE,
    ] {
        writer.write_bool(packet.flags & flag != 0);
    }
    Ok(())
}

// Speeds are sent as fractions of 255.
pub(crate) fn decode_abilities_v2(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketPlayerAbilities {
        flags: reader.read_u8()?,
        fly_speed: reader.read_u8()? as f32 / 255.0,
        walk_speed: reader.read_u8()? as f32 / 255.0,
    }
    .into())
}

pub(crate) fn encode_abilities_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PlayerAbilities);
    writer.write_u8(packet.flags);
    writer.write_u8((packet.fly_speed * 255.0).round() as u8);
    writer.write_u8((packet.walk_speed * 255.0).round() as u8);
    Ok(())
}

pub(crate) fn decode_tab_complete(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketTabComplete {
        text: reader.read_string()?,
    }
    .into())
}

pub(crate) fn encode_tab_complete(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, TabComplete);
    writer.write_string(&packet.text)
}

pub(crate) fn decode_client_settings_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketClientSettings {
        locale: reader.read_string()?,
        view_distance: reader.read_i8()?,
        chat_flags: reader.read_i8()?,
        difficulty: reader.read_u8()?,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_client_settings_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ClientSettings);
    writer.write_string(&packet.locale)?;
    writer.write_i8(packet.view_distance);
    writer.write_i8(packet.chat_flags);
    writer.write_u8(packet.difficulty);
    Ok(())
}

pub(crate) fn decode_client_settings_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketClientSettings {
        locale: reader.read_string()?,
        view_distance: reader.read_i8()?,
        chat_flags: reader.read_i8()?,
        difficulty: reader.read_u8()?,
        show_cape: reader.read_bool()?,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_client_settings_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ClientSettings);
    writer.write_string(&packet.locale)?;
    writer.write_i8(packet.view_distance);
    writer.write_i8(packet.chat_flags);
    writer.write_u8(packet.difficulty);
    writer.write_bool(packet.show_cape);
    Ok(())
}
