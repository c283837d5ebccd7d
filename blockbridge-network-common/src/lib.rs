mod connection;
pub mod crypto;
mod frame;
pub mod packet;
mod registry;
mod state;
mod version;

pub use connection::{Connection, ConnectionError};
pub use crypto::{CryptoError, ServerKeyPair};
pub use frame::{
    FrameCodec, FrameMeasure, UnframedCodec, VarIntFrameCodec, MAX_DECOMPRESSED_LENGTH,
    MAX_FRAME_LENGTH,
};
pub use packet::{Packet, PacketError, PacketReader, PacketWriter};
pub use registry::{
    DecodeFn, EncodeFn, PacketDescriptor, PacketRegistry, PacketSet, RegistryError,
    SessionPacketTable,
};
pub use state::{ConnectionState, Direction};
pub use version::{Era, ProtocolFamily, ProtocolVersion, StringFormat, VersionRange, WireFlavor};
