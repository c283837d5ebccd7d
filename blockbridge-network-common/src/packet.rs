use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use std::str;
use thiserror::Error;

use crate::{ProtocolVersion, StringFormat};

pub const MAX_VARINT_BYTES: usize = 5;
pub const MAX_VARLONG_BYTES: usize = 10;
pub const MAX_STRING_CHARS: usize = 32767;

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("unexpected end of packet")]
    UnexpectedEof,

    #[error("invalid packet")]
    InvalidPacket,

    #[error("varint is too long")]
    VarIntTooLong,

    #[error("invalid string")]
    InvalidString,

    #[error("string too long ({length} > {max})")]
    StringTooLong { length: usize, max: usize },

    #[error("{0} unread bytes at end of packet")]
    TrailingBytes(usize),

    #[error("unknown packet id 0x{id:02X}")]
    UnknownPacket { id: u32 },

    #[error("no layout for packet {kind} in {version}")]
    UnsupportedPacket { kind: String, version: String },

    #[error("packet does not match its codec")]
    WrongVariant,

    #[error("invalid value for {0}")]
    InvalidValue(&'static str),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: u32,
    pub data: Bytes,
}

impl Packet {
    pub fn new(id: u32, data: impl Into<Bytes>) -> Packet {
        Packet {
            id,
            data: data.into(),
        }
    }

    pub fn with_data(id: u32, data: BytesMut) -> Packet {
        Packet {
            id,
            data: data.freeze(),
        }
    }
}

impl std::fmt::Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("id", &format_args!("{:02X}", &self.id))
            .field("data", &format_args!("{:02x?}", self.data))
            .finish()
    }
}

/// Reads a varint from the front of `buffer` without consuming it.
/// Returns `None` when the buffer ends before the varint does.
pub fn peek_varint(buffer: &[u8]) -> Result<Option<(i32, usize)>, PacketError> {
    let mut value = 0u32;
    for (i, byte) in buffer.iter().enumerate() {
        if i >= MAX_VARINT_BYTES {
            return Err(PacketError::VarIntTooLong);
        }
        value |= ((byte & 0x7f) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some((value as i32, i + 1)));
        }
    }

    if buffer.len() >= MAX_VARINT_BYTES {
        Err(PacketError::VarIntTooLong)
    } else {
        Ok(None)
    }
}

pub fn put_varint(buffer: &mut BytesMut, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !0x7f == 0 {
            buffer.put_u8(value as u8);
            return;
        }
        buffer.put_u8((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
}

pub fn varint_len(value: i32) -> usize {
    let mut value = value as u32;
    let mut length = 1;
    while value & !0x7f != 0 {
        value >>= 7;
        length += 1;
    }
    length
}

pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    out
}

pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String, PacketError> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let a = bytes[i] as u16;
        if a & 0x80 == 0 {
            units.push(a);
            i += 1;
        } else if a & 0xe0 == 0xc0 {
            let b = *bytes.get(i + 1).ok_or(PacketError::InvalidString)? as u16;
            if b & 0xc0 != 0x80 {
                return Err(PacketError::InvalidString);
            }
            units.push(((a & 0x1f) << 6) | (b & 0x3f));
            i += 2;
        } else if a & 0xf0 == 0xe0 {
            let b = *bytes.get(i + 1).ok_or(PacketError::InvalidString)? as u16;
            let c = *bytes.get(i + 2).ok_or(PacketError::InvalidString)? as u16;
            if b & 0xc0 != 0x80 || c & 0xc0 != 0x80 {
                return Err(PacketError::InvalidString);
            }
            units.push(((a & 0x0f) << 12) | ((b & 0x3f) << 6) | (c & 0x3f));
            i += 3;
        } else {
            return Err(PacketError::InvalidString);
        }
    }
    String::from_utf16(&units).map_err(|_| PacketError::InvalidString)
}

pub struct PacketReader<'a> {
    cursor: Cursor<&'a [u8]>,
    version: ProtocolVersion,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8], version: ProtocolVersion) -> Self {
        Self {
            cursor: Cursor::new(data),
            version,
        }
    }

    pub fn from_packet(packet: &'a Packet, version: ProtocolVersion) -> Self {
        Self::new(&packet.data[..], version)
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// The whole buffer being read, independent of the cursor.
    pub fn data(&self) -> &'a [u8] {
        self.cursor.get_ref()
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.remaining() == 0
    }

    fn ensure(&self, length: usize) -> Result<(), PacketError> {
        if self.cursor.remaining() < length {
            Err(PacketError::UnexpectedEof)
        } else {
            Ok(())
        }
    }

    pub fn peek_u8(&self) -> Result<u8, PacketError> {
        self.ensure(1)?;
        Ok(self.cursor.chunk()[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, PacketError> {
        self.ensure(1)?;
        Ok(self.cursor.get_i8())
    }

    pub fn read_u8(&mut self) -> Result<u8, PacketError> {
        self.ensure(1)?;
        Ok(self.cursor.get_u8())
    }

    pub fn read_bool(&mut self) -> Result<bool, PacketError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16, PacketError> {
        self.ensure(2)?;
        Ok(self.cursor.get_i16())
    }

    pub fn read_u16(&mut self) -> Result<u16, PacketError> {
        self.ensure(2)?;
        Ok(self.cursor.get_u16())
    }

    pub fn read_i32(&mut self) -> Result<i32, PacketError> {
        self.ensure(4)?;
        Ok(self.cursor.get_i32())
    }

    pub fn read_i64(&mut self) -> Result<i64, PacketError> {
        self.ensure(8)?;
        Ok(self.cursor.get_i64())
    }

    pub fn read_u128(&mut self) -> Result<u128, PacketError> {
        self.ensure(16)?;
        Ok(self.cursor.get_u128())
    }

    pub fn read_f32(&mut self) -> Result<f32, PacketError> {
        self.ensure(4)?;
        Ok(self.cursor.get_f32())
    }

    pub fn read_f64(&mut self) -> Result<f64, PacketError> {
        self.ensure(8)?;
        Ok(self.cursor.get_f64())
    }

    pub fn read_i16_le(&mut self) -> Result<i16, PacketError> {
        self.ensure(2)?;
        Ok(self.cursor.get_i16_le())
    }

    pub fn read_u16_le(&mut self) -> Result<u16, PacketError> {
        self.ensure(2)?;
        Ok(self.cursor.get_u16_le())
    }

    pub fn read_i32_le(&mut self) -> Result<i32, PacketError> {
        self.ensure(4)?;
        Ok(self.cursor.get_i32_le())
    }

    pub fn read_u32_le(&mut self) -> Result<u32, PacketError> {
        self.ensure(4)?;
        Ok(self.cursor.get_u32_le())
    }

    pub fn read_i64_le(&mut self) -> Result<i64, PacketError> {
        self.ensure(8)?;
        Ok(self.cursor.get_i64_le())
    }

    pub fn read_u64_le(&mut self) -> Result<u64, PacketError> {
        self.ensure(8)?;
        Ok(self.cursor.get_u64_le())
    }

    pub fn read_f32_le(&mut self) -> Result<f32, PacketError> {
        self.ensure(4)?;
        Ok(self.cursor.get_f32_le())
    }

    /// Mobile UUIDs are two little endian longs, most significant first.
    pub fn read_uuid_le(&mut self) -> Result<u128, PacketError> {
        let most = self.read_u64_le()? as u128;
        let least = self.read_u64_le()? as u128;
        Ok(most << 64 | least)
    }

    pub fn read_varint(&mut self) -> Result<i32, PacketError> {
        match peek_varint(self.cursor.chunk())? {
            Some((value, length)) => {
                self.cursor.advance(length);
                Ok(value)
            }
            None => Err(PacketError::UnexpectedEof),
        }
    }

    pub fn read_varlong(&mut self) -> Result<i64, PacketError> {
        let mut value = 0u64;
        for i in 0..MAX_VARLONG_BYTES {
            let byte = self.read_u8()?;
            value |= ((byte & 0x7f) as u64) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value as i64);
            }
        }
        Err(PacketError::VarIntTooLong)
    }

    pub fn read_varuint32(&mut self) -> Result<u32, PacketError> {
        Ok(self.read_varint()? as u32)
    }

    pub fn read_varuint64(&mut self) -> Result<u64, PacketError> {
        Ok(self.read_varlong()? as u64)
    }

    pub fn read_zigzag32(&mut self) -> Result<i32, PacketError> {
        let raw = self.read_varuint32()?;
        Ok((raw >> 1) as i32 ^ -((raw & 1) as i32))
    }

    pub fn read_zigzag64(&mut self) -> Result<i64, PacketError> {
        let raw = self.read_varuint64()?;
        Ok((raw >> 1) as i64 ^ -((raw & 1) as i64))
    }

    pub fn read_fixed_length_bytes(&mut self, length: usize) -> Result<&'a [u8], PacketError> {
        self.ensure(length)?;
        let start = self.cursor.position() as usize;
        let end = start + length;
        self.cursor.set_position(end as u64);
        Ok(&self.cursor.get_ref()[start..end])
    }

    pub fn read_remaining_bytes(&mut self) -> &'a [u8] {
        let start = self.cursor.position() as usize;
        let end = self.cursor.get_ref().len();
        self.cursor.set_position(end as u64);
        &self.cursor.get_ref()[start..end]
    }

    pub fn read_varint_bytes(&mut self) -> Result<&'a [u8], PacketError> {
        let length = self.read_varint()?;
        if length < 0 {
            return Err(PacketError::InvalidValue("byte array length"));
        }
        self.read_fixed_length_bytes(length as usize)
    }

    pub fn read_short_bytes(&mut self) -> Result<&'a [u8], PacketError> {
        let length = self.read_i16()?;
        if length < 0 {
            return Err(PacketError::InvalidValue("byte array length"));
        }
        self.read_fixed_length_bytes(length as usize)
    }

    pub fn read_string(&mut self) -> Result<String, PacketError> {
        match self.version.string_format() {
            StringFormat::ModifiedUtf8 => self.read_modified_utf8(),
            StringFormat::Utf16 => self.read_string16(),
            StringFormat::VarIntUtf8 => self.read_varint_string(),
        }
    }

    pub fn read_modified_utf8(&mut self) -> Result<String, PacketError> {
        let length = self.read_u16()? as usize;
        decode_modified_utf8(self.read_fixed_length_bytes(length)?)
    }

    pub fn read_string16(&mut self) -> Result<String, PacketError> {
        let length = self.read_i16()?;
        if length < 0 {
            return Err(PacketError::InvalidString);
        }
        let bytes = self.read_fixed_length_bytes(length as usize * 2)?;
        let units = bytes
            .chunks_exact(2)
            .map(|unit| u16::from_be_bytes([unit[0], unit[1]]))
            .collect::<Vec<_>>();
        String::from_utf16(&units).map_err(|_| PacketError::InvalidString)
    }

    pub fn read_varint_string(&mut self) -> Result<String, PacketError> {
        let length = self.read_varint()?;
        if length < 0 {
            return Err(PacketError::InvalidString);
        }
        let length = length as usize;
        if length > MAX_STRING_CHARS * 4 {
            return Err(PacketError::StringTooLong {
                length,
                max: MAX_STRING_CHARS * 4,
            });
        }
        match str::from_utf8(self.read_fixed_length_bytes(length)?) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => Err(PacketError::InvalidString),
        }
    }

    /// A u32 little endian length prefixed string, used inside mobile login
    /// payloads.
    pub fn read_u32_le_string(&mut self) -> Result<String, PacketError> {
        let length = self.read_u32_le()? as usize;
        match str::from_utf8(self.read_fixed_length_bytes(length)?) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => Err(PacketError::InvalidString),
        }
    }
}

pub struct PacketWriter {
    id: u32,
    data: BytesMut,
    version: ProtocolVersion,
}

impl PacketWriter {
    pub fn new(id: u32, version: ProtocolVersion) -> PacketWriter {
        PacketWriter {
            id,
            data: BytesMut::with_capacity(256),
            version,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        self.data.put(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.data.put_i8(value);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.put_u8(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.data.put_u8(value as u8);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.data.put_i16(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.put_u16(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.put_i32(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.data.put_i64(value);
    }

    pub fn write_u128(&mut self, value: u128) {
        self.data.put_u128(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.data.put_f32(value);
    }

    pub fn write_f64(&mut self, value: f64) {
        self.data.put_f64(value);
    }

    pub fn write_i16_le(&mut self, value: i16) {
        self.data.put_i16_le(value);
    }

    pub fn write_u16_le(&mut self, value: u16) {
        self.data.put_u16_le(value);
    }

    pub fn write_i32_le(&mut self, value: i32) {
        self.data.put_i32_le(value);
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.data.put_u32_le(value);
    }

    pub fn write_i64_le(&mut self, value: i64) {
        self.data.put_i64_le(value);
    }

    pub fn write_u64_le(&mut self, value: u64) {
        self.data.put_u64_le(value);
    }

    pub fn write_f32_le(&mut self, value: f32) {
        self.data.put_f32_le(value);
    }

    pub fn write_uuid_le(&mut self, value: u128) {
        self.data.put_u64_le((value >> 64) as u64);
        self.data.put_u64_le(value as u64);
    }

    pub fn write_varint(&mut self, value: i32) {
        put_varint(&mut self.data, value);
    }

    pub fn write_varlong(&mut self, value: i64) {
        let mut value = value as u64;
        loop {
            if value & !0x7f == 0 {
                self.data.put_u8(value as u8);
                return;
            }
            self.data.put_u8((value & 0x7f) as u8 | 0x80);
            value >>= 7;
        }
    }

    pub fn write_varuint32(&mut self, value: u32) {
        self.write_varint(value as i32);
    }

    pub fn write_varuint64(&mut self, value: u64) {
        self.write_varlong(value as i64);
    }

    pub fn write_zigzag32(&mut self, value: i32) {
        self.write_varuint32(((value << 1) ^ (value >> 31)) as u32);
    }

    pub fn write_zigzag64(&mut self, value: i64) {
        self.write_varuint64(((value << 1) ^ (value >> 63)) as u64);
    }

    pub fn write_varint_bytes(&mut self, value: &[u8]) {
        self.write_varint(value.len() as i32);
        self.data.put(value);
    }

    pub fn write_short_bytes(&mut self, value: &[u8]) -> Result<(), PacketError> {
        if value.len() > i16::MAX as usize {
            return Err(PacketError::InvalidValue("byte array length"));
        }
        self.write_i16(value.len() as i16);
        self.data.put(value);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), PacketError> {
        match self.version.string_format() {
            StringFormat::ModifiedUtf8 => self.write_modified_utf8(value),
            StringFormat::Utf16 => self.write_string16(value),
            StringFormat::VarIntUtf8 => self.write_varint_string(value),
        }
    }

    pub fn write_modified_utf8(&mut self, value: &str) -> Result<(), PacketError> {
        let bytes = encode_modified_utf8(value);
        if bytes.len() > u16::MAX as usize {
            return Err(PacketError::StringTooLong {
                length: bytes.len(),
                max: u16::MAX as usize,
            });
        }
        self.data.put_u16(bytes.len() as u16);
        self.data.put(&bytes[..]);
        Ok(())
    }

    pub fn write_string16(&mut self, value: &str) -> Result<(), PacketError> {
        let units = value.encode_utf16().collect::<Vec<_>>();
        if units.len() > MAX_STRING_CHARS {
            return Err(PacketError::StringTooLong {
                length: units.len(),
                max: MAX_STRING_CHARS,
            });
        }
        self.data.put_i16(units.len() as i16);
        for unit in units {
            self.data.put_u16(unit);
        }
        Ok(())
    }

    pub fn write_varint_string(&mut self, value: &str) -> Result<(), PacketError> {
        if value.len() > MAX_STRING_CHARS * 4 {
            return Err(PacketError::StringTooLong {
                length: value.len(),
                max: MAX_STRING_CHARS * 4,
            });
        }
        self.write_varint(value.len() as i32);
        self.data.put(value.as_bytes());
        Ok(())
    }

    pub fn write_u32_le_string(&mut self, value: &str) {
        self.data.put_u32_le(value.len() as u32);
        self.data.put(value.as_bytes());
    }
}

impl From<PacketWriter> for Packet {
    fn from(writer: PacketWriter) -> Packet {
        Packet::with_data(writer.id, writer.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn written(writer: PacketWriter) -> Packet {
        writer.into()
    }

    #[test]
    fn varint_boundaries() {
        for (value, expected) in [
            (0, vec![0x00]),
            (1, vec![0x01]),
            (127, vec![0x7f]),
            (128, vec![0x80, 0x01]),
            (25565, vec![0xdd, 0xc7, 0x01]),
            (-1, vec![0xff, 0xff, 0xff, 0xff, 0x0f]),
        ] {
            let mut buffer = BytesMut::new();
            put_varint(&mut buffer, value);
            assert_eq!(&buffer[..], &expected[..]);
            assert_eq!(varint_len(value), expected.len());
            assert_eq!(
                peek_varint(&buffer).unwrap(),
                Some((value, expected.len()))
            );
        }
    }

    #[test]
    fn varint_longer_than_five_bytes_is_rejected() {
        let bytes = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert!(matches!(
            peek_varint(&bytes),
            Err(PacketError::VarIntTooLong)
        ));
        let mut reader = PacketReader::new(&bytes, ProtocolVersion::Modern1_8);
        assert!(matches!(
            reader.read_varint(),
            Err(PacketError::VarIntTooLong)
        ));
    }

    #[test]
    fn partial_varint_needs_more_bytes() {
        assert_eq!(peek_varint(&[0x80, 0x80]).unwrap(), None);
        assert_eq!(peek_varint(&[]).unwrap(), None);
    }

    #[test]
    fn string_formats_follow_version() {
        let mut writer = PacketWriter::new(0x03, ProtocolVersion::Beta1_7);
        writer.write_string("Hi").unwrap();
        let packet = written(writer);
        assert_eq!(&packet.data[..], &[0x00, 0x02, 0x00, b'H', 0x00, b'i']);

        let mut writer = PacketWriter::new(0x03, ProtocolVersion::Beta1_4);
        writer.write_string("Hi").unwrap();
        let packet = written(writer);
        assert_eq!(&packet.data[..], &[0x00, 0x02, b'H', b'i']);

        let mut writer = PacketWriter::new(0x01, ProtocolVersion::Modern1_7_2);
        writer.write_string("Hi").unwrap();
        let packet = written(writer);
        assert_eq!(&packet.data[..], &[0x02, b'H', b'i']);
    }

    #[test]
    fn modified_utf8_encodes_nul_and_supplementary() {
        let value = "a\0\u{1F600}";
        let bytes = encode_modified_utf8(value);
        assert_eq!(&bytes[0..3], &[b'a', 0xc0, 0x80]);
        assert_eq!(bytes.len(), 3 + 6);
        assert_eq!(decode_modified_utf8(&bytes).unwrap(), value);
    }

    #[test]
    fn truncated_string_is_eof() {
        let data = [0x00, 0x05, 0x00, b'a'];
        let mut reader = PacketReader::new(&data, ProtocolVersion::Beta1_7);
        assert!(matches!(
            reader.read_string(),
            Err(PacketError::UnexpectedEof)
        ));
    }

    #[test]
    fn empty_and_maximum_length_strings() {
        let longest = "x".repeat(MAX_STRING_CHARS);
        for value in ["", longest.as_str()] {
            let mut writer = PacketWriter::new(0, ProtocolVersion::Release1_6_4);
            writer.write_string(value).unwrap();
            let packet = written(writer);
            let mut reader = PacketReader::from_packet(&packet, ProtocolVersion::Release1_6_4);
            assert_eq!(reader.read_string().unwrap(), value);
            assert!(reader.is_empty());
        }

        let mut writer = PacketWriter::new(0, ProtocolVersion::Release1_6_4);
        let too_long = "x".repeat(MAX_STRING_CHARS + 1);
        assert!(matches!(
            writer.write_string(&too_long),
            Err(PacketError::StringTooLong { .. })
        ));
    }

    proptest! {
        #[test]
        fn varint_round_trip(value in any::<i32>()) {
            let mut writer = PacketWriter::new(0, ProtocolVersion::Modern1_8);
            writer.write_varint(value);
            let packet = written(writer);
            let mut reader = PacketReader::from_packet(&packet, ProtocolVersion::Modern1_8);
            prop_assert_eq!(reader.read_varint().unwrap(), value);
            prop_assert!(reader.is_empty());
        }

        #[test]
        fn varlong_and_zigzag_round_trip(long in any::<i64>(), small in any::<i32>()) {
            let mut writer = PacketWriter::new(0, ProtocolVersion::Bedrock1_20_0);
            writer.write_varlong(long);
            writer.write_zigzag32(small);
            writer.write_zigzag64(long);
            let packet = written(writer);
            let mut reader = PacketReader::from_packet(&packet, ProtocolVersion::Bedrock1_20_0);
            prop_assert_eq!(reader.read_varlong().unwrap(), long);
            prop_assert_eq!(reader.read_zigzag32().unwrap(), small);
            prop_assert_eq!(reader.read_zigzag64().unwrap(), long);
            prop_assert!(reader.is_empty());
        }

        #[test]
        fn modified_utf8_round_trip(value in "\\PC*") {
            prop_assert_eq!(decode_modified_utf8(&encode_modified_utf8(&value)).unwrap(), value);
        }
    }
}
