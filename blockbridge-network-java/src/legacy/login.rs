use blockbridge_network_common::{PacketError, PacketReader, PacketWriter};

use crate::{
    expect_packet, JavaPacket, PacketClientStatus, PacketDisconnect, PacketEncryptionRequest,
    PacketEncryptionResponse, PacketHandshake, PacketHandshakeReply, PacketJoinGame,
    PacketLoginRequest, PacketPluginMessage, PacketServerListPing,
};

pub(crate) fn decode_handshake_username(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    // 1.2 clients append ";host:port" to the username.
    let raw = reader.read_string()?;
    let (username, address) = match raw.split_once(';') {
        Some((username, address)) => (username.to_string(), address),
        None => (raw.clone(), ""),
    };
    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.parse().unwrap_or(0)),
        None => (address.to_string(), 0),
    };
    Ok(PacketHandshake {
        protocol_version: 0,
        username,
        host,
        port,
        next_state: 0,
    }
    .into())
}

pub(crate) fn encode_handshake_username(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Handshake);
    if packet.host.is_empty() {
        writer.write_string(&packet.username)
    } else {
        writer.write_string(&format!(
            "{};{}:{}",
            packet.username, packet.host, packet.port
        ))
    }
}

pub(crate) fn decode_handshake_versioned(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let protocol_version = reader.read_u8()? as i32;
    let username = reader.read_string()?;
    let host = reader.read_string()?;
    let port = reader.read_i32()?;
    Ok(PacketHandshake {
        protocol_version,
        username,
        host,
        port: port as u16,
        next_state: 0,
    }
    .into())
}

pub(crate) fn encode_handshake_versioned(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Handshake);
    writer.write_u8(packet.protocol_version as u8);
    writer.write_string(&packet.username)?;
    writer.write_string(&packet.host)?;
    writer.write_i32(packet.port as i32);
    Ok(())
}

pub(crate) fn decode_handshake_reply(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketHandshakeReply {
        connection_hash: reader.read_string()?,
    }
    .into())
}

pub(crate) fn encode_handshake_reply(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, HandshakeReply);
    writer.write_string(&packet.connection_hash)
}

// Login request, alpha through beta 1.4: protocol, username, password,
// seed, dimension.
pub(crate) fn decode_login_request_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let protocol_version = reader.read_i32()?;
    let username = reader.read_string()?;
    reader.read_string()?;
    reader.read_i64()?;
    reader.read_i8()?;
    Ok(PacketLoginRequest {
        protocol_version,
        username,
    }
    .into())
}

pub(crate) fn encode_login_request_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, LoginRequest);
    writer.write_i32(packet.protocol_version);
    writer.write_string(&packet.username)?;
    writer.write_string("")?;
    writer.write_i64(0);
    writer.write_i8(0);
    Ok(())
}

// Beta 1.5 to 1.7 dropped the password.
pub(crate) fn decode_login_request_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let protocol_version = reader.read_i32()?;
    let username = reader.read_string()?;
    reader.read_i64()?;
    reader.read_i8()?;
    Ok(PacketLoginRequest {
        protocol_version,
        username,
    }
    .into())
}

pub(crate) fn encode_login_request_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, LoginRequest);
    writer.write_i32(packet.protocol_version);
    writer.write_string(&packet.username)?;
    writer.write_i64(0);
    writer.write_i8(0);
    Ok(())
}

// Beta 1.8 and 1.0 add game mode, difficulty, height and max players.
pub(crate) fn decode_login_request_v3(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let protocol_version = reader.read_i32()?;
    let username = reader.read_string()?;
    reader.read_i64()?;
    reader.read_i32()?;
    reader.read_i8()?;
    reader.read_i8()?;
    reader.read_u8()?;
    reader.read_u8()?;
    Ok(PacketLoginRequest {
        protocol_version,
        username,
    }
    .into())
}

pub(crate) fn encode_login_request_v3(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, LoginRequest);
    writer.write_i32(packet.protocol_version);
    writer.write_string(&packet.username)?;
    writer.write_i64(0);
    writer.write_i32(0);
    writer.write_i8(0);
    writer.write_i8(0);
    writer.write_u8(0);
    writer.write_u8(0);
    Ok(())
}

// 1.1 inserts the level type after the seed.
pub(crate) fn decode_login_request_v4(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let protocol_version = reader.read_i32()?;
    let username = reader.read_string()?;
    reader.read_i64()?;
    reader.read_string()?;
    reader.read_i32()?;
    reader.read_i8()?;
    reader.read_i8()?;
    reader.read_u8()?;
    reader.read_u8()?;
    Ok(PacketLoginRequest {
        protocol_version,
        username,
    }
    .into())
}

pub(crate) fn encode_login_request_v4(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, LoginRequest);
    writer.write_i32(packet.protocol_version);
    writer.write_string(&packet.username)?;
    writer.write_i64(0);
    writer.write_string("")?;
    writer.write_i32(0);
    writer.write_i8(0);
    writer.write_i8(0);
    writer.write_u8(0);
    writer.write_u8(0);
    Ok(())
}

// 1.2 drops the seed and widens the dimension to an int.
pub(crate) fn decode_login_request_v5(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let protocol_version = reader.read_i32()?;
    let username = reader.read_string()?;
    reader.read_string()?;
    reader.read_i32()?;
    reader.read_i32()?;
    reader.read_i8()?;
    reader.read_u8()?;
    reader.read_u8()?;
    Ok(PacketLoginRequest {
        protocol_version,
        username,
    }
    .into())
}

pub(crate) fn encode_login_request_v5(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, LoginRequest);
    writer.write_i32(packet.protocol_version);
    writer.write_string(&packet.username)?;
    writer.write_string("")?;
    writer.write_i32(0);
    writer.write_i32(0);
    writer.write_i8(0);
    writer.write_u8(0);
    writer.write_u8(0);
    Ok(())
}

pub(crate) fn decode_join_game_v1(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let entity_id = reader.read_i32()?;
    reader.read_string()?;
    reader.read_string()?;
    let seed = reader.read_i64()?;
    let dimension = reader.read_i8()? as i32;
    Ok(PacketJoinGame {
        entity_id,
        seed,
        dimension,
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
    writer.write_string("")?;
    writer.write_string("")?;
    writer.write_i64(packet.seed);
    writer.write_i8(packet.dimension as i8);
    Ok(())
}

pub(crate) fn decode_join_game_v2(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let entity_id = reader.read_i32()?;
    reader.read_string()?;
    let seed = reader.read_i64()?;
    let dimension = reader.read_i8()? as i32;
    Ok(PacketJoinGame {
        entity_id,
        seed,
        dimension,
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
    writer.write_string("")?;
    writer.write_i64(packet.seed);
    writer.write_i8(packet.dimension as i8);
    Ok(())
}

pub(crate) fn decode_join_game_v3(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let entity_id = reader.read_i32()?;
    reader.read_string()?;
    let seed = reader.read_i64()?;
    let game_mode = reader.read_i32()? as u8;
    let dimension = reader.read_i8()? as i32;
    let difficulty = reader.read_u8()?;
    let world_height = reader.read_u8()?;
    let max_players = reader.read_u8()?;
    Ok(PacketJoinGame {
        entity_id,
        seed,
        game_mode,
        dimension,
        difficulty,
        world_height,
        max_players,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_join_game_v3(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, JoinGame);
    writer.write_i32(packet.entity_id);
    writer.write_string("")?;
    writer.write_i64(packet.seed);
    writer.write_i32(packet.game_mode as i32);
    writer.write_i8(packet.dimension as i8);
    writer.write_u8(packet.difficulty);
    writer.write_u8(packet.world_height);
    writer.write_u8(packet.max_players);
    Ok(())
}

pub(crate) fn decode_join_game_v4(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let entity_id = reader.read_i32()?;
    reader.read_string()?;
    let seed = reader.read_i64()?;
    let level_type = reader.read_string()?;
    let game_mode = reader.read_i32()? as u8;
    let dimension = reader.read_i8()? as i32;
    let difficulty = reader.read_u8()?;
    let world_height = reader.read_u8()?;
    let max_players = reader.read_u8()?;
    Ok(PacketJoinGame {
        entity_id,
        seed,
        level_type,
        game_mode,
        dimension,
        difficulty,
        world_height,
        max_players,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_join_game_v4(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, JoinGame);
    writer.write_i32(packet.entity_id);
    writer.write_string("")?;
    writer.write_i64(packet.seed);
    writer.write_string(&packet.level_type)?;
    writer.write_i32(packet.game_mode as i32);
    writer.write_i8(packet.dimension as i8);
    writer.write_u8(packet.difficulty);
    writer.write_u8(packet.world_height);
    writer.write_u8(packet.max_players);
    Ok(())
}

pub(crate) fn decode_join_game_v5(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let entity_id = reader.read_i32()?;
    reader.read_string()?;
    let level_type = reader.read_string()?;
    let game_mode = reader.read_i32()? as u8;
    let dimension = reader.read_i32()?;
    let difficulty = reader.read_u8()?;
    let world_height = reader.read_u8()?;
    let max_players = reader.read_u8()?;
    Ok(PacketJoinGame {
        entity_id,
        level_type,
        game_mode,
        dimension,
        difficulty,
        world_height,
        max_players,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_join_game_v5(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, JoinGame);
    writer.write_i32(packet.entity_id);
    writer.write_string("")?;
    writer.write_string(&packet.level_type)?;
    writer.write_i32(packet.game_mode as i32);
    writer.write_i32(packet.dimension);
    writer.write_u8(packet.difficulty);
    writer.write_u8(packet.world_height);
    writer.write_u8(packet.max_players);
    Ok(())
}

// 1.3 shrinks every numeric field to a byte and drops the username slot.
pub(crate) fn decode_join_game_v6(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    let entity_id = reader.read_i32()?;
    let level_type = reader.read_string()?;
    let game_mode = reader.read_u8()?;
    let dimension = reader.read_i8()? as i32;
    let difficulty = reader.read_u8()?;
    let world_height = reader.read_u8()?;
    let max_players = reader.read_u8()?;
    Ok(PacketJoinGame {
        entity_id,
        level_type,
        game_mode,
        dimension,
        difficulty,
        world_height,
        max_players,
        ..Default::default()
    }
    .into())
}

pub(crate) fn encode_join_game_v6(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, JoinGame);
    writer.write_i32(packet.entity_id);
    writer.write_string(&packet.level_type)?;
    writer.write_u8(packet.game_mode);
    writer.write_i8(packet.dimension as i8);
    writer.write_u8(packet.difficulty);
    writer.write_u8(packet.world_height);
    writer.write_u8(packet.max_players);
    Ok(())
}

pub(crate) fn decode_encryption_request(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let server_id = reader.read_string()?;
    let public_key = reader.read_short_bytes()?.to_vec();
    let verify_token = reader.read_short_bytes()?.to_vec();
    Ok(PacketEncryptionRequest {
        server_id,
        public_key,
        verify_token,
    }
    .into())
}

pub(crate) fn encode_encryption_request(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EncryptionRequest);
    writer.write_string(&packet.server_id)?;
    writer.write_short_bytes(&packet.public_key)?;
    writer.write_short_bytes(&packet.verify_token)
}

pub(crate) fn decode_encryption_response(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let shared_secret = reader.read_short_bytes()?.to_vec();
    let verify_token = reader.read_short_bytes()?.to_vec();
    Ok(PacketEncryptionResponse {
        shared_secret,
        verify_token,
    }
    .into())
}

pub(crate) fn encode_encryption_response(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EncryptionResponse);
    writer.write_short_bytes(&packet.shared_secret)?;
    writer.write_short_bytes(&packet.verify_token)
}

pub(crate) fn decode_client_status(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketClientStatus {
        action: reader.read_u8()? as i32,
    }
    .into())
}

pub(crate) fn encode_client_status(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ClientStatus);
    writer.write_u8(packet.action as u8);
    Ok(())
}

pub(crate) fn decode_ping(_reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketServerListPing { magic: None }.into())
}

pub(crate) fn encode_ping(packet: &JavaPacket, _writer: &mut PacketWriter) -> Result<(), PacketError> {
    expect_packet!(packet, ServerListPing);
    Ok(())
}

pub(crate) fn decode_ping_magic(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketServerListPing {
        magic: Some(reader.read_u8()?),
    }
    .into())
}

pub(crate) fn encode_ping_magic(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, ServerListPing);
    writer.write_u8(packet.magic.unwrap_or(1));
    Ok(())
}

pub(crate) fn decode_disconnect(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketDisconnect {
        reason: reader.read_string()?,
    }
    .into())
}

pub(crate) fn encode_disconnect(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Disconnect);
    writer.write_string(&packet.reason)
}

pub(crate) fn decode_plugin_message(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    let channel = reader.read_string()?;
    let data = reader.read_short_bytes()?.to_vec();
    Ok(PacketPluginMessage { channel, data }.into())
}

pub(crate) fn encode_plugin_message(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, PluginMessage);
    writer.write_string(&packet.channel)?;
    writer.write_short_bytes(&packet.data)
}
