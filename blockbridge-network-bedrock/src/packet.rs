use blockbridge_network_common::{
    Packet, PacketError, PacketReader, PacketWriter, ProtocolVersion,
};
use log::trace;
use num_derive::FromPrimitive;

/// Bedrock shares one id space between both directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BedrockPacketId {
    Login = 0x01,
    PlayStatus = 0x02,
    ServerToClientHandshake = 0x03,
    ClientToServerHandshake = 0x04,
    Disconnect = 0x05,
    ResourcePacksInfo = 0x06,
    ResourcePackStack = 0x07,
    ResourcePackClientResponse = 0x08,
    Text = 0x09,
    SetTime = 0x0a,
    StartGame = 0x0b,
    AddPlayer = 0x0c,
    RemoveEntity = 0x0e,
    MovePlayer = 0x13,
    UpdateBlock = 0x15,
    LevelEvent = 0x19,
    InventoryTransaction = 0x1e,
    PlayerAction = 0x24,
    Animate = 0x2c,
    LevelChunk = 0x3a,
    PlayerList = 0x3f,
    RequestChunkRadius = 0x45,
    ChunkRadiusUpdated = 0x46,
    GameRulesChanged = 0x48,
    SetLocalPlayerAsInitialized = 0x71,
    NetworkChunkPublisherUpdate = 0x79,
    ClientCacheStatus = 0x81,
    NetworkSettings = 0x8f,
    PlayerAuthInput = 0x90,
    RequestNetworkSettings = 0xc1,
}

/// The low ten bits of a packet header hold the id, the rest address
/// split screen sub-clients.
pub const PACKET_ID_MASK: u32 = 0x3ff;

pub trait BedrockPacket: Sized {
    const ID: BedrockPacketId;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError>;

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError>;

    /// Fields newer than the layout we understand are left unread.
    fn decode(packet: &Packet, version: ProtocolVersion) -> Result<Self, PacketError> {
        if packet.id != Self::ID as u32 {
            return Err(PacketError::InvalidPacket);
        }

        let mut reader = PacketReader::from_packet(packet, version);
        let decoded = Self::read(&mut reader)?;
        if !reader.is_empty() {
            trace!(target: "packets", "{:?} left {} bytes unread", Self::ID, reader.remaining());
        }
        Ok(decoded)
    }

    fn encode(&self, version: ProtocolVersion) -> Result<Packet, PacketError> {
        let mut writer = PacketWriter::new(Self::ID as u32, version);
        self.write(&mut writer)?;
        Ok(writer.into())
    }
}
