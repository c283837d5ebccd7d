use std::io::{Read, Write};

use blockbridge_network_common::{
    packet::{peek_varint, put_varint, varint_len},
    ConnectionError, Packet, PacketError, MAX_DECOMPRESSED_LENGTH,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};

use crate::PACKET_ID_MASK;

/// First byte of every game payload handed to the transport.
pub const BATCH_HEADER: u8 = 0xfe;

/// Packs packets into 0xFE batches: each packet is a varuint length then a
/// varuint header and body. Once network settings are agreed the whole
/// batch body is raw deflate.
#[derive(Default)]
pub struct BatchCodec {
    compression: bool,
}

impl BatchCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_compressed(&self) -> bool {
        self.compression
    }

    pub fn enable_compression(&mut self) {
        self.compression = true;
    }

    pub fn encode(&self, packets: &[Packet]) -> Result<Vec<u8>, ConnectionError> {
        let mut body = BytesMut::new();
        for packet in packets {
            let header = (packet.id & PACKET_ID_MASK) as i32;
            put_varint(&mut body, (varint_len(header) + packet.data.len()) as i32);
            put_varint(&mut body, header);
            body.put_slice(&packet.data);
        }

        let mut batch = Vec::with_capacity(body.len() + 1);
        batch.push(BATCH_HEADER);
        if self.compression {
            let mut encoder = DeflateEncoder::new(batch, Compression::default());
            encoder
                .write_all(&body)
                .map_err(|_| ConnectionError::InvalidCompression)?;
            batch = encoder
                .finish()
                .map_err(|_| ConnectionError::InvalidCompression)?;
        } else {
            batch.extend_from_slice(&body);
        }
        Ok(batch)
    }

    pub fn decode(&self, batch: &[u8]) -> Result<Vec<Packet>, ConnectionError> {
        match batch.first() {
            Some(&BATCH_HEADER) => {}
            _ => return Err(PacketError::InvalidValue("batch header").into()),
        }

        let mut body = if self.compression {
            let mut decompressed = Vec::new();
            DeflateDecoder::new(&batch[1..])
                .take(MAX_DECOMPRESSED_LENGTH as u64 + 1)
                .read_to_end(&mut decompressed)
                .map_err(|_| ConnectionError::InvalidCompression)?;
            if decompressed.len() > MAX_DECOMPRESSED_LENGTH {
                return Err(ConnectionError::FrameTooLarge(decompressed.len()));
            }
            Bytes::from(decompressed)
        } else {
            Bytes::copy_from_slice(&batch[1..])
        };

        let mut packets = Vec::new();
        while body.has_remaining() {
            let (length, length_size) =
                peek_varint(&body)?.ok_or(PacketError::UnexpectedEof)?;
            if length <= 0 || length_size + length as usize > body.len() {
                return Err(PacketError::UnexpectedEof.into());
            }
            body.advance(length_size);
            let mut frame = body.split_to(length as usize);

            let (header, header_size) =
                peek_varint(&frame)?.ok_or(PacketError::UnexpectedEof)?;
            frame.advance(header_size);
            packets.push(Packet::new(header as u32 & PACKET_ID_MASK, frame));
        }
        Ok(packets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packets() -> Vec<Packet> {
        vec![
            Packet::new(0x8f, vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            Packet::new(0x02, vec![0, 0, 0, 0]),
            Packet::new(0x3a, vec![7u8; 600]),
        ]
    }

    #[test]
    fn plain_batch_layout() {
        let codec = BatchCodec::new();
        let batch = codec
            .encode(&[Packet::new(0xc1, vec![0, 0, 2, 0x37])])
            .unwrap();
        // length 6 = two byte header + four byte body
        assert_eq!(batch, vec![0xfe, 6, 0xc1, 0x01, 0, 0, 2, 0x37]);
        assert_eq!(codec.decode(&batch).unwrap(), vec![Packet::new(0xc1, vec![0, 0, 2, 0x37])]);
    }

    #[test]
    fn compressed_batches_shrink_and_survive() {
        let mut codec = BatchCodec::new();
        let plain = codec.encode(&packets()).unwrap();
        codec.enable_compression();
        let compressed = codec.encode(&packets()).unwrap();
        assert!(compressed.len() < plain.len());
        assert_eq!(codec.decode(&compressed).unwrap(), packets());
    }

    #[test]
    fn sub_client_bits_are_dropped() {
        let codec = BatchCodec::new();
        let header = 0x09 | (1 << 10) | (2 << 12);
        let mut body = BytesMut::new();
        put_varint(&mut body, varint_len(header) as i32 + 1);
        put_varint(&mut body, header);
        body.put_u8(0);
        let mut batch = vec![BATCH_HEADER];
        batch.extend_from_slice(&body);
        assert_eq!(codec.decode(&batch).unwrap(), vec![Packet::new(0x09, vec![0])]);
    }

    #[test]
    fn truncated_and_headerless_batches_fail() {
        let codec = BatchCodec::new();
        assert!(codec.decode(&[0xfe, 9, 0x01]).is_err());
        assert!(codec.decode(&[0x01, 1, 0x01]).is_err());
        assert!(codec.decode(&[]).is_err());
    }

    #[test]
    fn compressed_codec_rejects_garbage() {
        let mut codec = BatchCodec::new();
        codec.enable_compression();
        assert!(matches!(
            codec.decode(&[0xfe, 0xff, 0xff, 0xff]),
            Err(ConnectionError::InvalidCompression)
        ));
    }
}
