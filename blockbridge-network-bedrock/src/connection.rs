use std::collections::VecDeque;

use blockbridge_network_common::{ConnectionError, Packet};
use log::trace;

use crate::{BatchCodec, BedrockTransport};

/// A transport session plus batch state. Reads hand out one packet at a
/// time from however many arrived in a batch.
pub struct BedrockConnection<T> {
    transport: T,
    codec: BatchCodec,
    pending: VecDeque<Packet>,
}

impl<T: BedrockTransport> BedrockConnection<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            codec: BatchCodec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn peer_addr(&self) -> String {
        self.transport.peer_addr()
    }

    pub fn is_compressed(&self) -> bool {
        self.codec.is_compressed()
    }

    /// Applies to both directions from the next batch on.
    pub fn enable_compression(&mut self) {
        self.codec.enable_compression();
    }

    pub async fn read_packet(&mut self) -> Result<Packet, ConnectionError> {
        loop {
            if let Some(packet) = self.pending.pop_front() {
                trace!(target: "packets", "RECV [{:02X}] {:02x?}", packet.id, &packet.data[..]);
                return Ok(packet);
            }

            let batch = self
                .transport
                .recv()
                .await
                .ok_or(ConnectionError::ConnectionLost)?;
            self.pending.extend(self.codec.decode(&batch)?);
        }
    }

    pub async fn write_packet(&mut self, packet: &Packet) -> Result<(), ConnectionError> {
        self.write_packets(std::slice::from_ref(packet)).await
    }

    pub async fn write_packets(&mut self, packets: &[Packet]) -> Result<(), ConnectionError> {
        for packet in packets {
            trace!(target: "packets", "SEND [{:02X}] {:02x?}", packet.id, &packet.data[..]);
        }
        let batch = self.codec.encode(packets)?;
        self.transport.send(batch).await
    }
}
