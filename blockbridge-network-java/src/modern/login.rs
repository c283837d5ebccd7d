use blockbridge_network_common::{PacketError, PacketReader, PacketWriter};

use crate::{
    expect_packet, JavaPacket, PacketDisconnect, PacketEncryptionRequest,
    PacketEncryptionResponse, PacketHandshake, PacketLoginRequest, PacketLoginSuccess,
    PacketSetCompression, PacketStatusPing, PacketStatusRequest, PacketStatusResponse,
};

pub(crate) fn decode_handshake(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketHandshake {
        protocol_version: reader.read_varint()?,
        username: String::new(),
        host: reader.read_string()?,
        port: reader.read_u16()?,
        next_state: reader.read_varint()?,
    }
    .into())
}

pub(crate) fn encode_handshake(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, Handshake);
    writer.write_varint(packet.protocol_version);
    writer.write_string(&packet.host)?;
    writer.write_u16(packet.port);
    writer.write_varint(packet.next_state);
    Ok(())
}

pub(crate) fn decode_status_request(
    _reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketStatusRequest.into())
}

pub(crate) fn encode_status_request(
    packet: &JavaPacket,
    _writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    expect_packet!(packet, StatusRequest);
    Ok(())
}

pub(crate) fn decode_status_response(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketStatusResponse {
        json: reader.read_string()?,
    }
    .into())
}

pub(crate) fn encode_status_response(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, StatusResponse);
    writer.write_string(&packet.json)
}

pub(crate) fn decode_status_ping(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketStatusPing {
        payload: reader.read_i64()?,
    }
    .into())
}

pub(crate) fn encode_status_ping(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, StatusPing);
    writer.write_i64(packet.payload);
    Ok(())
}

pub(crate) fn decode_login_start(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketLoginRequest {
        protocol_version: 0,
        username: reader.read_string()?,
    }
    .into())
}

pub(crate) fn encode_login_start(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, LoginRequest);
    writer.write_string(&packet.username)
}

// 1.7 prefixes key material with a short, 1.8 with a varint.
pub(crate) fn decode_encryption_request_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketEncryptionRequest {
        server_id: reader.read_string()?,
        public_key: reader.read_short_bytes()?.to_vec(),
        verify_token: reader.read_short_bytes()?.to_vec(),
    }
    .into())
}

pub(crate) fn encode_encryption_request_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EncryptionRequest);
    writer.write_string(&packet.server_id)?;
    writer.write_short_bytes(&packet.public_key)?;
    writer.write_short_bytes(&packet.verify_token)
}

pub(crate) fn decode_encryption_request_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketEncryptionRequest {
        server_id: reader.read_string()?,
        public_key: reader.read_varint_bytes()?.to_vec(),
        verify_token: reader.read_varint_bytes()?.to_vec(),
    }
    .into())
}

pub(crate) fn encode_encryption_request_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EncryptionRequest);
    writer.write_string(&packet.server_id)?;
    writer.write_varint_bytes(&packet.public_key);
    writer.write_varint_bytes(&packet.verify_token);
    Ok(())
}

pub(crate) fn decode_encryption_response_v1(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketEncryptionResponse {
        shared_secret: reader.read_short_bytes()?.to_vec(),
        verify_token: reader.read_short_bytes()?.to_vec(),
    }
    .into())
}

pub(crate) fn encode_encryption_response_v1(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EncryptionResponse);
    writer.write_short_bytes(&packet.shared_secret)?;
    writer.write_short_bytes(&packet.verify_token)
}

pub(crate) fn decode_encryption_response_v2(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketEncryptionResponse {
        shared_secret: reader.read_varint_bytes()?.to_vec(),
        verify_token: reader.read_varint_bytes()?.to_vec(),
    }
    .into())
}

pub(crate) fn encode_encryption_response_v2(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, EncryptionResponse);
    writer.write_varint_bytes(&packet.shared_secret);
    writer.write_varint_bytes(&packet.verify_token);
    Ok(())
}

pub(crate) fn decode_login_success(reader: &mut PacketReader) -> Result<JavaPacket, PacketError> {
    Ok(PacketLoginSuccess {
        uuid: reader.read_string()?,
        username: reader.read_string()?,
    }
    .into())
}

pub(crate) fn encode_login_success(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, LoginSuccess);
    writer.write_string(&packet.uuid)?;
    writer.write_string(&packet.username)
}

pub(crate) fn decode_set_compression(
    reader: &mut PacketReader,
) -> Result<JavaPacket, PacketError> {
    Ok(PacketSetCompression {
        threshold: reader.read_varint()?,
    }
    .into())
}

pub(crate) fn encode_set_compression(
    packet: &JavaPacket,
    writer: &mut PacketWriter,
) -> Result<(), PacketError> {
    let packet = expect_packet!(packet, SetCompression);
    writer.write_varint(packet.threshold);
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
