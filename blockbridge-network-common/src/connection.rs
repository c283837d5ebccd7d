use bytes::BytesMut;
use log::trace;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};

use crate::{
    crypto::{self, Aes128Cfb8Decryptor, Aes128Cfb8Encryptor, CryptoError},
    FrameCodec, Packet, PacketError,
};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection lost")]
    ConnectionLost,

    #[error("frame of {0} bytes is too large")]
    FrameTooLarge(usize),

    #[error("invalid frame length {0}")]
    InvalidFrameLength(i32),

    #[error("invalid compressed frame")]
    InvalidCompression,

    #[error("malformed packet: {0}")]
    Packet(#[from] PacketError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// A byte stream plus the framing and cipher state layered on it.
/// Decryption happens before de-framing, encryption after framing.
pub struct Connection<S, C> {
    stream: BufWriter<S>,
    buffer: BytesMut,
    frame_codec: C,
    encryptor: Option<Aes128Cfb8Encryptor>,
    decryptor: Option<Aes128Cfb8Decryptor>,
}

impl<S, C> Connection<S, C>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    C: FrameCodec,
{
    pub fn new(stream: S, frame_codec: C) -> Self {
        Self::with_buffer(stream, frame_codec, BytesMut::with_capacity(4 * 1024))
    }

    /// Starts from bytes that were already read off the stream.
    pub fn with_buffer(stream: S, frame_codec: C, buffer: BytesMut) -> Self {
        Self {
            stream: BufWriter::new(stream),
            buffer,
            frame_codec,
            encryptor: None,
            decryptor: None,
        }
    }

    pub fn frame_codec(&self) -> &C {
        &self.frame_codec
    }

    pub fn frame_codec_mut(&mut self) -> &mut C {
        &mut self.frame_codec
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryptor.is_some()
    }

    /// Installs the AES/CFB8 cipher on both directions. Bytes already
    /// buffered but not yet framed were sent after the client switched, so
    /// they are decrypted now.
    pub fn install_cipher(&mut self, shared_secret: &[u8]) -> Result<(), ConnectionError> {
        if self.encryptor.is_some() || self.decryptor.is_some() {
            return Err(CryptoError::AlreadyInstalled.into());
        }

        let (encryptor, mut decryptor) = crypto::create_cipher(shared_secret)?;
        crypto::decrypt_in_place(&mut decryptor, &mut self.buffer[..]);
        self.encryptor = Some(encryptor);
        self.decryptor = Some(decryptor);
        Ok(())
    }

    pub async fn shutdown(&mut self) {
        let _ = self.stream.shutdown().await;
    }

    async fn fill_buffer(&mut self) -> Result<(), ConnectionError> {
        let start = self.buffer.len();
        match self.stream.read_buf(&mut self.buffer).await {
            Ok(0) | Err(_) => Err(ConnectionError::ConnectionLost),
            Ok(_) => {
                if let Some(decryptor) = self.decryptor.as_mut() {
                    crypto::decrypt_in_place(decryptor, &mut self.buffer[start..]);
                }
                Ok(())
            }
        }
    }

    /// Reads until `probe` can make a decision about the buffered bytes.
    /// Nothing is consumed.
    pub async fn peek_with<T>(
        &mut self,
        mut probe: impl FnMut(&[u8]) -> Result<Option<T>, PacketError>,
    ) -> Result<T, ConnectionError> {
        loop {
            if let Some(result) = probe(&self.buffer)? {
                return Ok(result);
            }
            self.fill_buffer().await?;
        }
    }

    pub async fn read_packet(&mut self) -> Result<Packet, ConnectionError> {
        loop {
            if let Some(packet) = self.frame_codec.decode_frame(&mut self.buffer)? {
                trace!(target: "packets", "RECV [{:02X}] {:02x?}", packet.id, &packet.data[..]);
                return Ok(packet);
            }
            self.fill_buffer().await?;
        }
    }

    pub async fn write_packet(&mut self, packet: &Packet) -> Result<(), ConnectionError> {
        trace!(target: "packets", "SEND [{:02X}] {:02x?}", packet.id, &packet.data[..]);

        let mut buffer = BytesMut::with_capacity(packet.data.len() + 8);
        self.frame_codec.encode_frame(packet, &mut buffer)?;
        if let Some(encryptor) = self.encryptor.as_mut() {
            crypto::encrypt_in_place(encryptor, &mut buffer[..]);
        }

        self.stream
            .write_all(&buffer)
            .await
            .map_err(|_| ConnectionError::ConnectionLost)?;

        self.stream
            .flush()
            .await
            .map_err(|_| ConnectionError::ConnectionLost)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{crypto::generate_shared_secret, VarIntFrameCodec};

    #[tokio::test]
    async fn packets_survive_cipher_and_compression() {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let mut client = Connection::new(client, VarIntFrameCodec::new());
        let mut server = Connection::new(server, VarIntFrameCodec::new());

        let first = Packet::new(0x00, vec![1u8, 2, 3]);
        client.write_packet(&first).await.unwrap();
        assert_eq!(server.read_packet().await.unwrap(), first);

        let secret = generate_shared_secret();
        client.install_cipher(&secret).unwrap();
        server.install_cipher(&secret).unwrap();
        client.frame_codec_mut().set_compression_threshold(Some(16));
        server.frame_codec_mut().set_compression_threshold(Some(16));

        let large = Packet::new(0x21, vec![42u8; 1000]);
        let small = Packet::new(0x01, vec![9u8; 2]);
        client.write_packet(&large).await.unwrap();
        client.write_packet(&small).await.unwrap();
        assert_eq!(server.read_packet().await.unwrap(), large);
        assert_eq!(server.read_packet().await.unwrap(), small);

        server.write_packet(&small).await.unwrap();
        assert_eq!(client.read_packet().await.unwrap(), small);
    }

    #[tokio::test]
    async fn buffered_tail_is_decrypted_on_install() {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let mut client = Connection::new(client, VarIntFrameCodec::new());
        let mut server = Connection::new(server, VarIntFrameCodec::new());

        let secret = generate_shared_secret();
        let plain = Packet::new(0x01, vec![5u8; 4]);
        let encrypted = Packet::new(0x02, vec![6u8; 4]);
        client.write_packet(&plain).await.unwrap();
        client.install_cipher(&secret).unwrap();
        client.write_packet(&encrypted).await.unwrap();

        // Both frames may arrive in one read, before the server switches.
        server
            .peek_with(|buffer| Ok((buffer.len() >= 12).then_some(())))
            .await
            .unwrap();
        assert_eq!(server.read_packet().await.unwrap(), plain);
        server.install_cipher(&secret).unwrap();
        assert_eq!(server.read_packet().await.unwrap(), encrypted);
    }

    #[tokio::test]
    async fn second_install_is_rejected() {
        let (stream, _other) = tokio::io::duplex(64);
        let mut connection = Connection::new(stream, VarIntFrameCodec::new());
        let secret = generate_shared_secret();
        connection.install_cipher(&secret).unwrap();
        assert!(matches!(
            connection.install_cipher(&secret),
            Err(ConnectionError::Crypto(CryptoError::AlreadyInstalled))
        ));
    }

    #[tokio::test]
    async fn closed_stream_reports_connection_lost() {
        let (stream, other) = tokio::io::duplex(64);
        drop(other);
        let mut connection = Connection::new(stream, VarIntFrameCodec::new());
        assert!(matches!(
            connection.read_packet().await,
            Err(ConnectionError::ConnectionLost)
        ));
    }
}
