use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::{
    packet::{peek_varint, put_varint, varint_len},
    ConnectionError, Packet, PacketError,
};

/// Largest frame a client may announce.
pub const MAX_FRAME_LENGTH: usize = 2 * 1024 * 1024;

/// Largest decompressed payload accepted from a compressed frame.
pub const MAX_DECOMPRESSED_LENGTH: usize = 8 * 1024 * 1024;

/// Splits a byte stream into packets and back.
pub trait FrameCodec: Send {
    /// Returns `Ok(None)` when `buffer` does not yet hold a whole frame.
    fn decode_frame(&mut self, buffer: &mut BytesMut) -> Result<Option<Packet>, ConnectionError>;

    fn encode_frame(&mut self, packet: &Packet, buffer: &mut BytesMut)
        -> Result<(), ConnectionError>;
}

/// Tells an unframed codec how long a packet body is. Pre-netty packets
/// carry no length so only their layout knows where they end.
pub trait FrameMeasure: Send {
    fn measure(&self, id: u32, body: &[u8]) -> Result<usize, PacketError>;
}

pub struct UnframedCodec<M> {
    measure: M,
}

impl<M: FrameMeasure> UnframedCodec<M> {
    pub fn new(measure: M) -> Self {
        Self { measure }
    }

    pub fn measure(&self) -> &M {
        &self.measure
    }

    pub fn measure_mut(&mut self) -> &mut M {
        &mut self.measure
    }
}

impl<M: FrameMeasure> FrameCodec for UnframedCodec<M> {
    fn decode_frame(&mut self, buffer: &mut BytesMut) -> Result<Option<Packet>, ConnectionError> {
        if buffer.is_empty() {
            return Ok(None);
        }

        let id = buffer[0] as u32;
        match self.measure.measure(id, &buffer[1..]) {
            Ok(length) => {
                buffer.advance(1);
                let data = buffer.split_to(length);
                Ok(Some(Packet::with_data(id, data)))
            }
            Err(PacketError::UnexpectedEof) => {
                if buffer.len() > MAX_FRAME_LENGTH {
                    Err(ConnectionError::FrameTooLarge(buffer.len()))
                } else {
                    Ok(None)
                }
            }
            Err(error) => Err(error.into()),
        }
    }

    fn encode_frame(
        &mut self,
        packet: &Packet,
        buffer: &mut BytesMut,
    ) -> Result<(), ConnectionError> {
        if packet.id > 0xff {
            return Err(PacketError::InvalidValue("packet id").into());
        }
        buffer.reserve(1 + packet.data.len());
        buffer.put_u8(packet.id as u8);
        buffer.put_slice(&packet.data);
        Ok(())
    }
}

/// Length prefixed frames: `varint length | varint id | body`, or with
/// compression enabled `varint length | varint data length | zlib(id | body)`.
pub struct VarIntFrameCodec {
    compression_threshold: Option<usize>,
}

impl VarIntFrameCodec {
    pub fn new() -> Self {
        Self {
            compression_threshold: None,
        }
    }

    pub fn compression_threshold(&self) -> Option<usize> {
        self.compression_threshold
    }

    pub fn set_compression_threshold(&mut self, threshold: Option<usize>) {
        self.compression_threshold = threshold;
    }

    fn split_packet(mut payload: BytesMut) -> Result<Packet, ConnectionError> {
        let (id, id_length) = peek_varint(&payload)?.ok_or(PacketError::UnexpectedEof)?;
        if id < 0 {
            return Err(PacketError::InvalidValue("packet id").into());
        }
        payload.advance(id_length);
        Ok(Packet::with_data(id as u32, payload))
    }
}

impl Default for VarIntFrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec for VarIntFrameCodec {
    fn decode_frame(&mut self, buffer: &mut BytesMut) -> Result<Option<Packet>, ConnectionError> {
        let (length, header_length) = match peek_varint(buffer)? {
            Some(header) => header,
            None => return Ok(None),
        };
        if length <= 0 {
            return Err(ConnectionError::InvalidFrameLength(length));
        }
        if length as usize > MAX_FRAME_LENGTH {
            return Err(ConnectionError::FrameTooLarge(length as usize));
        }

        let length = length as usize;
        if buffer.len() < header_length + length {
            buffer.reserve(header_length + length - buffer.len());
            return Ok(None);
        }

        buffer.advance(header_length);
        let mut frame = buffer.split_to(length);

        let threshold = match self.compression_threshold {
            None => return Self::split_packet(frame).map(Some),
            Some(threshold) => threshold,
        };

        let (data_length, data_length_size) =
            peek_varint(&frame)?.ok_or(PacketError::UnexpectedEof)?;
        frame.advance(data_length_size);
        if data_length == 0 {
            return Self::split_packet(frame).map(Some);
        }

        if data_length < 0
            || (data_length as usize) < threshold
            || data_length as usize > MAX_DECOMPRESSED_LENGTH
        {
            return Err(ConnectionError::InvalidCompression);
        }

        let mut decompressed = Vec::with_capacity(data_length as usize);
        ZlibDecoder::new(&frame[..])
            .take(data_length as u64 + 1)
            .read_to_end(&mut decompressed)
            .map_err(|_| ConnectionError::InvalidCompression)?;
        if decompressed.len() != data_length as usize {
            return Err(ConnectionError::InvalidCompression);
        }

        Self::split_packet(BytesMut::from(&decompressed[..])).map(Some)
    }

    fn encode_frame(
        &mut self,
        packet: &Packet,
        buffer: &mut BytesMut,
    ) -> Result<(), ConnectionError> {
        let mut payload = BytesMut::with_capacity(5 + packet.data.len());
        put_varint(&mut payload, packet.id as i32);
        payload.put_slice(&packet.data);

        match self.compression_threshold {
            None => {
                put_varint(buffer, payload.len() as i32);
                buffer.put_slice(&payload);
            }
            Some(threshold) if payload.len() < threshold => {
                put_varint(buffer, payload.len() as i32 + 1);
                put_varint(buffer, 0);
                buffer.put_slice(&payload);
            }
            Some(_) => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder
                    .write_all(&payload)
                    .map_err(|_| ConnectionError::InvalidCompression)?;
                let compressed = encoder
                    .finish()
                    .map_err(|_| ConnectionError::InvalidCompression)?;

                let data_length = payload.len() as i32;
                put_varint(
                    buffer,
                    (varint_len(data_length) + compressed.len()) as i32,
                );
                put_varint(buffer, data_length);
                buffer.put_slice(&compressed);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMeasure;

    // Packet 0x01 carries four bytes, everything else is unknown.
    impl FrameMeasure for FixedMeasure {
        fn measure(&self, id: u32, body: &[u8]) -> Result<usize, PacketError> {
            match id {
                0x01 if body.len() >= 4 => Ok(4),
                0x01 => Err(PacketError::UnexpectedEof),
                _ => Err(PacketError::UnknownPacket { id }),
            }
        }
    }

    #[test]
    fn unframed_waits_for_whole_packet() {
        let mut codec = UnframedCodec::new(FixedMeasure);
        let mut buffer = BytesMut::from(&[0x01, 0xaa, 0xbb][..]);
        assert!(codec.decode_frame(&mut buffer).unwrap().is_none());
        assert_eq!(buffer.len(), 3);

        buffer.put_slice(&[0xcc, 0xdd, 0x01]);
        let packet = codec.decode_frame(&mut buffer).unwrap().unwrap();
        assert_eq!(packet.id, 0x01);
        assert_eq!(&packet.data[..], &[0xaa, 0xbb, 0xcc, 0xdd]);
        assert_eq!(&buffer[..], &[0x01]);
    }

    #[test]
    fn unframed_unknown_id_is_fatal() {
        let mut codec = UnframedCodec::new(FixedMeasure);
        let mut buffer = BytesMut::from(&[0x7e, 0x00][..]);
        assert!(matches!(
            codec.decode_frame(&mut buffer),
            Err(ConnectionError::Packet(PacketError::UnknownPacket { id: 0x7e }))
        ));
    }

    #[test]
    fn varint_frames_round_trip() {
        let mut codec = VarIntFrameCodec::new();
        let mut buffer = BytesMut::new();
        let packet = Packet::new(0x21, vec![1u8, 2, 3]);
        codec.encode_frame(&packet, &mut buffer).unwrap();
        assert_eq!(&buffer[..], &[0x04, 0x21, 1, 2, 3]);

        let mut partial = BytesMut::from(&buffer[..3]);
        assert!(codec.decode_frame(&mut partial).unwrap().is_none());

        assert_eq!(codec.decode_frame(&mut buffer).unwrap().unwrap(), packet);
        assert!(buffer.is_empty());
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut codec = VarIntFrameCodec::new();
        let mut buffer = BytesMut::new();
        put_varint(&mut buffer, MAX_FRAME_LENGTH as i32 + 1);
        assert!(matches!(
            codec.decode_frame(&mut buffer),
            Err(ConnectionError::FrameTooLarge(_))
        ));
    }

    #[test]
    fn empty_or_negative_length_is_rejected() {
        let mut codec = VarIntFrameCodec::new();
        let mut buffer = BytesMut::from(&[0x00, 0x21][..]);
        assert!(matches!(
            codec.decode_frame(&mut buffer),
            Err(ConnectionError::InvalidFrameLength(0))
        ));

        let mut buffer = BytesMut::new();
        put_varint(&mut buffer, -5);
        assert!(matches!(
            codec.decode_frame(&mut buffer),
            Err(ConnectionError::InvalidFrameLength(-5))
        ));
    }

    #[test]
    fn overlong_length_prefix_is_rejected() {
        let mut codec = VarIntFrameCodec::new();
        let mut buffer = BytesMut::from(&[0xff, 0xff, 0xff, 0xff, 0xff, 0x01][..]);
        assert!(matches!(
            codec.decode_frame(&mut buffer),
            Err(ConnectionError::Packet(PacketError::VarIntTooLong))
        ));
    }

    #[test]
    fn compression_uses_zero_marker_below_threshold() {
        let mut codec = VarIntFrameCodec::new();
        codec.set_compression_threshold(Some(64));

        let small = Packet::new(0x02, vec![7u8; 8]);
        let mut buffer = BytesMut::new();
        codec.encode_frame(&small, &mut buffer).unwrap();
        assert_eq!(buffer[0], 10);
        assert_eq!(buffer[1], 0);
        assert_eq!(codec.decode_frame(&mut buffer).unwrap().unwrap(), small);

        let large = Packet::new(0x26, vec![0u8; 4096]);
        codec.encode_frame(&large, &mut buffer).unwrap();
        assert!(buffer.len() < 4096);
        assert_eq!(codec.decode_frame(&mut buffer).unwrap().unwrap(), large);
        assert!(buffer.is_empty());
    }
}
