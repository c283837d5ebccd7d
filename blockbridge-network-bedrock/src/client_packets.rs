use blockbridge_network_common::{
    Packet, PacketError, PacketReader, PacketWriter, ProtocolVersion,
};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{
    common_packets::{BlockPos, NetworkItem, PacketReadBedrock, PacketWriteBedrock, Vec3},
    server_packets::PacketDisconnect,
    BedrockPacket, BedrockPacketId,
};

pub struct PacketRequestNetworkSettings {
    pub protocol_version: i32,
}

impl BedrockPacket for PacketRequestNetworkSettings {
    const ID: BedrockPacketId = BedrockPacketId::RequestNetworkSettings;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        Ok(Self {
            protocol_version: reader.read_i32()?,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_i32(self.protocol_version);
        Ok(())
    }
}

/// The connection request is a varuint length wrapped pair of u32 little
/// endian strings: the identity chain JSON then the client data token.
pub struct PacketLogin {
    pub protocol_version: i32,
    pub chain: String,
    pub client_data: String,
}

impl BedrockPacket for PacketLogin {
    const ID: BedrockPacketId = BedrockPacketId::Login;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let protocol_version = reader.read_i32()?;
        let request = reader.read_varint_bytes()?;
        let mut request = PacketReader::new(request, reader.version());
        let chain = request.read_u32_le_string()?;
        let client_data = request.read_u32_le_string()?;

        Ok(Self {
            protocol_version,
            chain,
            client_data,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_i32(self.protocol_version);

        let mut request = PacketWriter::new(0, writer.version());
        request.write_u32_le_string(&self.chain);
        request.write_u32_le_string(&self.client_data);
        let request: Packet = request.into();
        writer.write_varint_bytes(&request.data);
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum ResourcePackResponse {
    Refused = 1,
    SendPacks = 2,
    HaveAllPacks = 3,
    Completed = 4,
}

pub struct PacketResourcePackClientResponse {
    pub response: ResourcePackResponse,
    pub packs: Vec<String>,
}

impl BedrockPacket for PacketResourcePackClientResponse {
    const ID: BedrockPacketId = BedrockPacketId::ResourcePackClientResponse;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let response = ResourcePackResponse::from_u8(reader.read_u8()?)
            .ok_or(PacketError::InvalidValue("resource pack response"))?;
        let count = reader.read_u16_le()?;
        let mut packs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            packs.push(reader.read_string()?);
        }
        Ok(Self { response, packs })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_u8(self.response as u8);
        writer.write_u16_le(self.packs.len() as u16);
        for pack in self.packs.iter() {
            writer.write_string(pack)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum TextType {
    Raw = 0,
    Chat = 1,
    Translation = 2,
    Popup = 3,
    JukeboxPopup = 4,
    Tip = 5,
    System = 6,
    Whisper = 7,
    Announcement = 8,
    ObjectWhisper = 9,
    Object = 10,
    ObjectAnnouncement = 11,
}

/// Sent in both directions.
#[derive(Clone, Debug, PartialEq)]
pub struct PacketText {
    pub text_type: TextType,
    pub needs_translation: bool,
    pub source_name: String,
    pub message: String,
    pub parameters: Vec<String>,
    pub xuid: String,
    pub platform_chat_id: String,
}

impl PacketText {
    pub fn raw(message: &str) -> Self {
        Self {
            text_type: TextType::Raw,
            needs_translation: false,
            source_name: String::new(),
            message: message.to_string(),
            parameters: Vec::new(),
            xuid: String::new(),
            platform_chat_id: String::new(),
        }
    }

    pub fn chat(source_name: &str, message: &str) -> Self {
        Self {
            text_type: TextType::Chat,
            source_name: source_name.to_string(),
            ..Self::raw(message)
        }
    }
}

impl BedrockPacket for PacketText {
    const ID: BedrockPacketId = BedrockPacketId::Text;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let text_type =
            TextType::from_u8(reader.read_u8()?).ok_or(PacketError::InvalidValue("text type"))?;
        let needs_translation = reader.read_bool()?;

        let mut source_name = String::new();
        let mut parameters = Vec::new();
        let message = match text_type {
            TextType::Chat | TextType::Whisper | TextType::Announcement => {
                source_name = reader.read_string()?;
                reader.read_string()?
            }
            TextType::Translation | TextType::Popup | TextType::JukeboxPopup => {
                let message = reader.read_string()?;
                let count = reader.read_varuint32()?;
                for _ in 0..count {
                    parameters.push(reader.read_string()?);
                }
                message
            }
            _ => reader.read_string()?,
        };

        Ok(Self {
            text_type,
            needs_translation,
            source_name,
            message,
            parameters,
            xuid: reader.read_string()?,
            platform_chat_id: reader.read_string()?,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_u8(self.text_type as u8);
        writer.write_bool(self.needs_translation);
        match self.text_type {
            TextType::Chat | TextType::Whisper | TextType::Announcement => {
                writer.write_string(&self.source_name)?;
                writer.write_string(&self.message)?;
            }
            TextType::Translation | TextType::Popup | TextType::JukeboxPopup => {
                writer.write_string(&self.message)?;
                writer.write_varuint32(self.parameters.len() as u32);
                for parameter in self.parameters.iter() {
                    writer.write_string(parameter)?;
                }
            }
            _ => writer.write_string(&self.message)?,
        }
        writer.write_string(&self.xuid)?;
        writer.write_string(&self.platform_chat_id)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum MoveMode {
    Normal = 0,
    Reset = 1,
    Teleport = 2,
    Rotation = 3,
}

/// Sent in both directions. `position` is at eye height.
#[derive(Clone, Debug, PartialEq)]
pub struct PacketMovePlayer {
    pub runtime_entity_id: u64,
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub mode: MoveMode,
    pub on_ground: bool,
    pub ridden_runtime_entity_id: u64,
    pub tick: u64,
}

/// Teleport cause written for server initiated teleports.
const TELEPORT_CAUSE_COMMAND: i32 = 2;

impl BedrockPacket for PacketMovePlayer {
    const ID: BedrockPacketId = BedrockPacketId::MovePlayer;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let runtime_entity_id = reader.read_varuint64()?;
        let position = reader.read_vec3()?;
        let pitch = reader.read_f32_le()?;
        let yaw = reader.read_f32_le()?;
        let head_yaw = reader.read_f32_le()?;
        let mode =
            MoveMode::from_u8(reader.read_u8()?).ok_or(PacketError::InvalidValue("move mode"))?;
        let on_ground = reader.read_bool()?;
        let ridden_runtime_entity_id = reader.read_varuint64()?;
        if mode == MoveMode::Teleport {
            let _cause = reader.read_i32_le()?;
            let _source_entity_type = reader.read_i32_le()?;
        }
        let tick = reader.read_varuint64()?;

        Ok(Self {
            runtime_entity_id,
            position,
            pitch,
            yaw,
            head_yaw,
            mode,
            on_ground,
            ridden_runtime_entity_id,
            tick,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_varuint64(self.runtime_entity_id);
        writer.write_vec3(self.position);
        writer.write_f32_le(self.pitch);
        writer.write_f32_le(self.yaw);
        writer.write_f32_le(self.head_yaw);
        writer.write_u8(self.mode as u8);
        writer.write_bool(self.on_ground);
        writer.write_varuint64(self.ridden_runtime_entity_id);
        if self.mode == MoveMode::Teleport {
            writer.write_i32_le(TELEPORT_CAUSE_COMMAND);
            writer.write_i32_le(0);
        }
        writer.write_varuint64(self.tick);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InventoryAction {
    pub source_type: u32,
    pub window_id: Option<i32>,
    pub source_flags: Option<u32>,
    pub slot: u32,
    pub old_item: NetworkItem,
    pub new_item: NetworkItem,
}

const ACTION_SOURCE_CONTAINER: u32 = 0;
const ACTION_SOURCE_WORLD: u32 = 2;
const ACTION_SOURCE_TODO: u32 = 99999;

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum UseItemAction {
    ClickBlock = 0,
    ClickAir = 1,
    BreakBlock = 2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UseItemData {
    pub action: UseItemAction,
    pub block_position: BlockPos,
    pub face: i32,
    pub hotbar_slot: i32,
    pub held_item: NetworkItem,
    pub player_position: Vec3,
    pub click_position: Vec3,
    pub block_runtime_id: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransactionData {
    Normal,
    Mismatch,
    UseItem(UseItemData),
    /// Use on entity and release item; their bodies are not read.
    Other(u32),
}

const TRANSACTION_NORMAL: u32 = 0;
const TRANSACTION_MISMATCH: u32 = 1;
const TRANSACTION_USE_ITEM: u32 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct PacketInventoryTransaction {
    pub legacy_request_id: i32,
    pub actions: Vec<InventoryAction>,
    pub data: TransactionData,
}

impl BedrockPacket for PacketInventoryTransaction {
    const ID: BedrockPacketId = BedrockPacketId::InventoryTransaction;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let legacy_request_id = reader.read_zigzag32()?;
        if legacy_request_id != 0 {
            let count = reader.read_varuint32()?;
            for _ in 0..count {
                let _container_id = reader.read_u8()?;
                let _slots = reader.read_varint_bytes()?;
            }
        }

        let transaction_type = reader.read_varuint32()?;

        let count = reader.read_varuint32()?;
        let mut actions = Vec::new();
        for _ in 0..count {
            let source_type = reader.read_varuint32()?;
            let (window_id, source_flags) = match source_type {
                ACTION_SOURCE_CONTAINER | ACTION_SOURCE_TODO => {
                    (Some(reader.read_zigzag32()?), None)
                }
                ACTION_SOURCE_WORLD => (None, Some(reader.read_varuint32()?)),
                _ => (None, None),
            };
            actions.push(InventoryAction {
                source_type,
                window_id,
                source_flags,
                slot: reader.read_varuint32()?,
                old_item: reader.read_network_item()?,
                new_item: reader.read_network_item()?,
            });
        }

        let data = match transaction_type {
            TRANSACTION_NORMAL => TransactionData::Normal,
            TRANSACTION_MISMATCH => TransactionData::Mismatch,
            TRANSACTION_USE_ITEM => TransactionData::UseItem(UseItemData {
                action: UseItemAction::from_u32(reader.read_varuint32()?)
                    .ok_or(PacketError::InvalidValue("use item action"))?,
                block_position: reader.read_unsigned_block_pos()?,
                face: reader.read_zigzag32()?,
                hotbar_slot: reader.read_zigzag32()?,
                held_item: reader.read_network_item()?,
                player_position: reader.read_vec3()?,
                click_position: reader.read_vec3()?,
                block_runtime_id: reader.read_varuint32()?,
            }),
            other => {
                reader.read_remaining_bytes();
                TransactionData::Other(other)
            }
        };

        Ok(Self {
            legacy_request_id,
            actions,
            data,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_zigzag32(0);
        let transaction_type = match &self.data {
            TransactionData::Normal => TRANSACTION_NORMAL,
            TransactionData::Mismatch => TRANSACTION_MISMATCH,
            TransactionData::UseItem(_) => TRANSACTION_USE_ITEM,
            TransactionData::Other(_) => return Err(PacketError::WrongVariant),
        };
        writer.write_varuint32(transaction_type);

        writer.write_varuint32(self.actions.len() as u32);
        for action in self.actions.iter() {
            writer.write_varuint32(action.source_type);
            if let Some(window_id) = action.window_id {
                writer.write_zigzag32(window_id);
            }
            if let Some(flags) = action.source_flags {
                writer.write_varuint32(flags);
            }
            writer.write_varuint32(action.slot);
            writer.write_network_item(&action.old_item);
            writer.write_network_item(&action.new_item);
        }

        if let TransactionData::UseItem(data) = &self.data {
            writer.write_varuint32(data.action as u32);
            writer.write_unsigned_block_pos(data.block_position);
            writer.write_zigzag32(data.face);
            writer.write_zigzag32(data.hotbar_slot);
            writer.write_network_item(&data.held_item);
            writer.write_vec3(data.player_position);
            writer.write_vec3(data.click_position);
            writer.write_varuint32(data.block_runtime_id);
        }
        Ok(())
    }
}

pub struct PacketRequestChunkRadius {
    pub radius: i32,
    pub max_radius: u8,
}

impl BedrockPacket for PacketRequestChunkRadius {
    const ID: BedrockPacketId = BedrockPacketId::RequestChunkRadius;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let radius = reader.read_zigzag32()?;
        let max_radius = if reader.version().is_at_least(ProtocolVersion::Bedrock1_20_0) {
            reader.read_u8()?
        } else {
            0
        };
        Ok(Self { radius, max_radius })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_zigzag32(self.radius);
        if writer.version().is_at_least(ProtocolVersion::Bedrock1_20_0) {
            writer.write_u8(self.max_radius);
        }
        Ok(())
    }
}

pub struct PacketSetLocalPlayerAsInitialized {
    pub runtime_entity_id: u64,
}

impl BedrockPacket for PacketSetLocalPlayerAsInitialized {
    const ID: BedrockPacketId = BedrockPacketId::SetLocalPlayerAsInitialized;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        Ok(Self {
            runtime_entity_id: reader.read_varuint64()?,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_varuint64(self.runtime_entity_id);
        Ok(())
    }
}

/// Everything the server acts on from a client.
pub enum ClientPacket {
    RequestNetworkSettings(PacketRequestNetworkSettings),
    Login(PacketLogin),
    ResourcePackClientResponse(PacketResourcePackClientResponse),
    Text(PacketText),
    MovePlayer(PacketMovePlayer),
    InventoryTransaction(PacketInventoryTransaction),
    RequestChunkRadius(PacketRequestChunkRadius),
    SetLocalPlayerAsInitialized(PacketSetLocalPlayerAsInitialized),
    Disconnect(PacketDisconnect),
}

impl ClientPacket {
    pub fn name(&self) -> &'static str {
        match self {
            ClientPacket::RequestNetworkSettings(_) => "RequestNetworkSettings",
            ClientPacket::Login(_) => "Login",
            ClientPacket::ResourcePackClientResponse(_) => "ResourcePackClientResponse",
            ClientPacket::Text(_) => "Text",
            ClientPacket::MovePlayer(_) => "MovePlayer",
            ClientPacket::InventoryTransaction(_) => "InventoryTransaction",
            ClientPacket::RequestChunkRadius(_) => "RequestChunkRadius",
            ClientPacket::SetLocalPlayerAsInitialized(_) => "SetLocalPlayerAsInitialized",
            ClientPacket::Disconnect(_) => "Disconnect",
        }
    }

    /// Returns `None` for packets the server has no use for.
    pub fn decode(
        packet: &Packet,
        version: ProtocolVersion,
    ) -> Result<Option<ClientPacket>, PacketError> {
        let id = match BedrockPacketId::from_u32(packet.id) {
            Some(id) => id,
            None => return Ok(None),
        };

        Ok(Some(match id {
            BedrockPacketId::RequestNetworkSettings => ClientPacket::RequestNetworkSettings(
                PacketRequestNetworkSettings::decode(packet, version)?,
            ),
            BedrockPacketId::Login => ClientPacket::Login(PacketLogin::decode(packet, version)?),
            BedrockPacketId::ResourcePackClientResponse => {
                ClientPacket::ResourcePackClientResponse(
                    PacketResourcePackClientResponse::decode(packet, version)?,
                )
            }
            BedrockPacketId::Text => ClientPacket::Text(PacketText::decode(packet, version)?),
            BedrockPacketId::MovePlayer => {
                ClientPacket::MovePlayer(PacketMovePlayer::decode(packet, version)?)
            }
            BedrockPacketId::InventoryTransaction => ClientPacket::InventoryTransaction(
                PacketInventoryTransaction::decode(packet, version)?,
            ),
            BedrockPacketId::RequestChunkRadius => {
                ClientPacket::RequestChunkRadius(PacketRequestChunkRadius::decode(packet, version)?)
            }
            BedrockPacketId::SetLocalPlayerAsInitialized => {
                ClientPacket::SetLocalPlayerAsInitialized(
                    PacketSetLocalPlayerAsInitialized::decode(packet, version)?,
                )
            }
            BedrockPacketId::Disconnect => {
                ClientPacket::Disconnect(PacketDisconnect::decode(packet, version)?)
            }
            _ => return Ok(None),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSION: ProtocolVersion = ProtocolVersion::Bedrock1_19_60;

    #[test]
    fn login_request_nests_little_endian_strings() {
        let login = PacketLogin {
            protocol_version: 567,
            chain: r#"{"chain":[]}"#.to_string(),
            client_data: "a.b.c".to_string(),
        };
        let packet = login.encode(VERSION).unwrap();
        assert_eq!(&packet.data[..4], &567i32.to_be_bytes());
        // varuint request length: 4 + 12 + 4 + 5
        assert_eq!(packet.data[4], 25);
        assert_eq!(&packet.data[5..9], &12u32.to_le_bytes());

        let decoded = PacketLogin::decode(&packet, VERSION).unwrap();
        assert_eq!(decoded.chain, login.chain);
        assert_eq!(decoded.client_data, login.client_data);
    }

    #[test]
    fn text_layout_follows_type() {
        let chat = PacketText::chat("Steve", "hello");
        let raw = PacketText::raw("hello");
        let chat_packet = chat.encode(VERSION).unwrap();
        let raw_packet = raw.encode(VERSION).unwrap();
        assert_eq!(chat_packet.data.len(), raw_packet.data.len() + 6);
        assert_eq!(PacketText::decode(&chat_packet, VERSION).unwrap(), chat);
        assert_eq!(PacketText::decode(&raw_packet, VERSION).unwrap(), raw);
    }

    #[test]
    fn teleport_moves_carry_a_cause() {
        let mut movement = PacketMovePlayer {
            runtime_entity_id: 1,
            position: Vec3::new(0.5, 5.62, 0.5),
            pitch: 0.0,
            yaw: 90.0,
            head_yaw: 90.0,
            mode: MoveMode::Normal,
            on_ground: true,
            ridden_runtime_entity_id: 0,
            tick: 0,
        };
        let normal = movement.encode(VERSION).unwrap();
        movement.mode = MoveMode::Teleport;
        let teleport = movement.encode(VERSION).unwrap();
        assert_eq!(teleport.data.len(), normal.data.len() + 8);
        assert_eq!(PacketMovePlayer::decode(&teleport, VERSION).unwrap(), movement);
    }

    #[test]
    fn use_item_transaction() {
        let transaction = PacketInventoryTransaction {
            legacy_request_id: 0,
            actions: vec![InventoryAction {
                source_type: ACTION_SOURCE_CONTAINER,
                window_id: Some(0),
                source_flags: None,
                slot: 3,
                old_item: NetworkItem::empty(),
                new_item: NetworkItem::empty(),
            }],
            data: TransactionData::UseItem(UseItemData {
                action: UseItemAction::ClickBlock,
                block_position: BlockPos::new(10, 4, -2),
                face: 1,
                hotbar_slot: 3,
                held_item: NetworkItem::empty(),
                player_position: Vec3::new(10.0, 6.62, -2.0),
                click_position: Vec3::new(0.5, 1.0, 0.5),
                block_runtime_id: 7,
            }),
        };
        let packet = transaction.encode(VERSION).unwrap();
        let decoded = PacketInventoryTransaction::decode(&packet, VERSION).unwrap();
        assert_eq!(decoded, transaction);
    }

    #[test]
    fn release_item_body_is_skipped() {
        // legacy id 0, type 4, no actions, then an opaque body
        let packet = Packet::new(
            BedrockPacketId::InventoryTransaction as u32,
            vec![0, 4, 0, 1, 2, 3],
        );
        let decoded = PacketInventoryTransaction::decode(&packet, VERSION).unwrap();
        assert_eq!(decoded.data, TransactionData::Other(4));
    }

    #[test]
    fn chunk_radius_gains_max_radius() {
        let request = PacketRequestChunkRadius {
            radius: 8,
            max_radius: 12,
        };
        assert_eq!(request.encode(VERSION).unwrap().data.len(), 1);
        let packet = request.encode(ProtocolVersion::Bedrock1_20_0).unwrap();
        assert_eq!(&packet.data[..], &[16, 12]);
    }

    #[test]
    fn unknown_and_ignored_packets_decode_to_none() {
        let unknown = Packet::new(0x2ff, vec![1, 2, 3]);
        assert!(ClientPacket::decode(&unknown, VERSION).unwrap().is_none());
        let ignored = Packet::new(BedrockPacketId::ClientCacheStatus as u32, vec![0]);
        assert!(ClientPacket::decode(&ignored, VERSION).unwrap().is_none());
    }
}
