//! Bedrock edition packets, 0xFE batches and the seam to the reliable UDP
//! transport that carries them.

mod batch;
pub mod client_packets;
pub mod common_packets;
mod connection;
pub mod login;
mod packet;
pub mod server_packets;
mod transport;

pub use batch::{BatchCodec, BATCH_HEADER};
pub use connection::BedrockConnection;
pub use packet::{BedrockPacket, BedrockPacketId, PACKET_ID_MASK};
pub use transport::{
    channel_listener, BedrockListener, BedrockTransport, ChannelConnector, ChannelListener,
    ChannelTransport,
};
