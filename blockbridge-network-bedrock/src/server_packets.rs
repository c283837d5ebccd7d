use blockbridge_network_common::{
    Packet, PacketError, PacketReader, PacketWriter, ProtocolVersion,
};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{
    client_packets::{PacketMovePlayer, PacketText},
    common_packets::{
        BlockPaletteEntry, BlockPos, NetworkItem, PacketReadBedrock, PacketWriteBedrock, Skin, Vec3,
    },
    BedrockPacket, BedrockPacketId,
};

pub const COMPRESSION_ALGORITHM_DEFLATE: u16 = 0;

pub struct PacketNetworkSettings {
    pub compression_threshold: u16,
    pub compression_algorithm: u16,
    pub client_throttle: bool,
    pub client_throttle_threshold: u8,
    pub client_throttle_scalar: f32,
}

impl PacketNetworkSettings {
    pub fn deflate(compression_threshold: u16) -> Self {
        Self {
            compression_threshold,
            compression_algorithm: COMPRESSION_ALGORITHM_DEFLATE,
            client_throttle: false,
            client_throttle_threshold: 0,
            client_throttle_scalar: 0.0,
        }
    }
}

impl BedrockPacket for PacketNetworkSettings {
    const ID: BedrockPacketId = BedrockPacketId::NetworkSettings;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        Ok(Self {
            compression_threshold: reader.read_u16_le()?,
            compression_algorithm: reader.read_u16_le()?,
            client_throttle: reader.read_bool()?,
            client_throttle_threshold: reader.read_u8()?,
            client_throttle_scalar: reader.read_f32_le()?,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_u16_le(self.compression_threshold);
        writer.write_u16_le(self.compression_algorithm);
        writer.write_bool(self.client_throttle);
        writer.write_u8(self.client_throttle_threshold);
        writer.write_f32_le(self.client_throttle_scalar);
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum PlayStatus {
    LoginSuccess = 0,
    LoginFailedClient = 1,
    LoginFailedServer = 2,
    PlayerSpawn = 3,
    LoginFailedInvalidTenant = 4,
    LoginFailedVanillaEdu = 5,
    LoginFailedEduVanilla = 6,
    LoginFailedServerFull = 7,
}

pub struct PacketPlayStatus {
    pub status: PlayStatus,
}

impl BedrockPacket for PacketPlayStatus {
    const ID: BedrockPacketId = BedrockPacketId::PlayStatus;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        Ok(Self {
            status: PlayStatus::from_i32(reader.read_i32()?)
                .ok_or(PacketError::InvalidValue("play status"))?,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_i32(self.status as i32);
        Ok(())
    }
}

/// `None` hides the disconnection screen.
pub struct PacketDisconnect {
    pub message: Option<String>,
}

impl BedrockPacket for PacketDisconnect {
    const ID: BedrockPacketId = BedrockPacketId::Disconnect;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let hide_screen = reader.read_bool()?;
        let message = if hide_screen {
            None
        } else {
            Some(reader.read_string()?)
        };
        Ok(Self { message })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        match &self.message {
            Some(message) => {
                writer.write_bool(false);
                writer.write_string(message)
            }
            None => {
                writer.write_bool(true);
                Ok(())
            }
        }
    }
}

/// The server never offers packs, so both lists are always empty.
pub struct PacketResourcePacksInfo {
    pub must_accept: bool,
    pub has_scripts: bool,
    pub force_server_packs: bool,
}

impl BedrockPacket for PacketResourcePacksInfo {
    const ID: BedrockPacketId = BedrockPacketId::ResourcePacksInfo;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let packet = Self {
            must_accept: reader.read_bool()?,
            has_scripts: reader.read_bool()?,
            force_server_packs: reader.read_bool()?,
        };
        if reader.read_u16_le()? != 0 || reader.read_u16_le()? != 0 {
            return Err(PacketError::InvalidValue("resource pack count"));
        }
        Ok(packet)
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_bool(self.must_accept);
        writer.write_bool(self.has_scripts);
        writer.write_bool(self.force_server_packs);
        writer.write_u16_le(0);
        writer.write_u16_le(0);
        Ok(())
    }
}

pub struct PacketResourcePackStack {
    pub must_accept: bool,
    pub game_version: String,
}

impl BedrockPacket for PacketResourcePackStack {
    const ID: BedrockPacketId = BedrockPacketId::ResourcePackStack;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let must_accept = reader.read_bool()?;
        if reader.read_varuint32()? != 0 || reader.read_varuint32()? != 0 {
            return Err(PacketError::InvalidValue("resource pack count"));
        }
        let game_version = reader.read_string()?;
        let _experiments = reader.read_u32_le()?;
        let _experiments_toggled = reader.read_bool()?;
        Ok(Self {
            must_accept,
            game_version,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_bool(self.must_accept);
        writer.write_varuint32(0);
        writer.write_varuint32(0);
        writer.write_string(&self.game_version)?;
        writer.write_u32_le(0);
        writer.write_bool(false);
        Ok(())
    }
}

pub struct PacketSetTime {
    pub time: i32,
}

impl BedrockPacket for PacketSetTime {
    const ID: BedrockPacketId = BedrockPacketId::SetTime;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        Ok(Self {
            time: reader.read_zigzag32()?,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_zigzag32(self.time);
        Ok(())
    }
}

pub const GAME_RULE_DAYLIGHT_CYCLE: &str = "dodaylightcycle";

const GAME_RULE_TYPE_BOOL: u32 = 1;
const GAME_RULE_TYPE_INT: u32 = 2;
const GAME_RULE_TYPE_FLOAT: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameRuleValue {
    Bool(bool),
    Int(u32),
    Float(f32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameRule {
    pub name: String,
    pub editable: bool,
    pub value: GameRuleValue,
}

impl GameRule {
    pub fn bool(name: &str, value: bool) -> Self {
        Self {
            name: name.to_string(),
            editable: false,
            value: GameRuleValue::Bool(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PacketGameRulesChanged {
    pub rules: Vec<GameRule>,
}

impl BedrockPacket for PacketGameRulesChanged {
    const ID: BedrockPacketId = BedrockPacketId::GameRulesChanged;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let count = reader.read_varuint32()?;
        let mut rules = Vec::with_capacity(count.min(64) as usize);
        for _ in 0..count {
            let name = reader.read_string()?;
            let editable = reader.read_bool()?;
            let value = match reader.read_varuint32()? {
                GAME_RULE_TYPE_BOOL => GameRuleValue::Bool(reader.read_bool()?),
                GAME_RULE_TYPE_INT => GameRuleValue::Int(reader.read_varuint32()?),
                GAME_RULE_TYPE_FLOAT => GameRuleValue::Float(reader.read_f32_le()?),
                _ => return Err(PacketError::InvalidValue("game rule type")),
            };
            rules.push(GameRule {
                name,
                editable,
                value,
            });
        }
        Ok(Self { rules })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_varuint32(self.rules.len() as u32);
        for rule in self.rules.iter() {
            writer.write_string(&rule.name)?;
            writer.write_bool(rule.editable);
            match rule.value {
                GameRuleValue::Bool(value) => {
                    writer.write_varuint32(GAME_RULE_TYPE_BOOL);
                    writer.write_bool(value);
                }
                GameRuleValue::Int(value) => {
                    writer.write_varuint32(GAME_RULE_TYPE_INT);
                    writer.write_varuint32(value);
                }
                GameRuleValue::Float(value) => {
                    writer.write_varuint32(GAME_RULE_TYPE_FLOAT);
                    writer.write_f32_le(value);
                }
            }
        }
        Ok(())
    }
}

/// Movement authority the server claims in `StartGame`.
pub const MOVEMENT_AUTHORITY_CLIENT: i32 = 0;

/// Only the fields the server varies are kept; the rest of the layout is
/// written with fixed defaults. The block palette is sorted by name and
/// each entry's runtime id is its index.
#[derive(Clone, Debug, PartialEq)]
pub struct PacketStartGame {
    pub entity_unique_id: i64,
    pub runtime_entity_id: u64,
    pub player_game_mode: i32,
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub seed: u64,
    pub dimension: i32,
    pub generator: i32,
    pub world_game_mode: i32,
    pub difficulty: i32,
    pub spawn_position: BlockPos,
    pub day_cycle_lock_time: i32,
    pub rain_level: f32,
    pub lightning_level: f32,
    pub commands_enabled: bool,
    pub chunk_tick_radius: i32,
    pub level_id: String,
    pub world_name: String,
    pub time: i64,
    pub block_palette: Vec<BlockPaletteEntry>,
    pub game_version: String,
}

impl BedrockPacket for PacketStartGame {
    const ID: BedrockPacketId = BedrockPacketId::StartGame;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let entity_unique_id = reader.read_zigzag64()?;
        let runtime_entity_id = reader.read_varuint64()?;
        let player_game_mode = reader.read_zigzag32()?;
        let position = reader.read_vec3()?;
        let pitch = reader.read_f32_le()?;
        let yaw = reader.read_f32_le()?;
        let seed = reader.read_u64_le()?;
        let _biome_type = reader.read_i16_le()?;
        let _biome_name = reader.read_string()?;
        let dimension = reader.read_zigzag32()?;
        let generator = reader.read_zigzag32()?;
        let world_game_mode = reader.read_zigzag32()?;
        let difficulty = reader.read_zigzag32()?;
        let spawn_position = reader.read_unsigned_block_pos()?;
        let _achievements_disabled = reader.read_bool()?;
        let _editor_world = reader.read_bool()?;
        if reader.version().is_at_least(ProtocolVersion::Bedrock1_20_0) {
            let _created_in_editor = reader.read_bool()?;
            let _exported_from_editor = reader.read_bool()?;
        }
        let day_cycle_lock_time = reader.read_zigzag32()?;
        let _education_offer = reader.read_zigzag32()?;
        let _education_features = reader.read_bool()?;
        let _education_product_id = reader.read_string()?;
        let rain_level = reader.read_f32_le()?;
        let lightning_level = reader.read_f32_le()?;
        let _platform_locked_content = reader.read_bool()?;
        let _multiplayer_game = reader.read_bool()?;
        let _lan_broadcast = reader.read_bool()?;
        let _xbox_broadcast_mode = reader.read_zigzag32()?;
        let _platform_broadcast_mode = reader.read_zigzag32()?;
        let commands_enabled = reader.read_bool()?;
        let _texture_packs_required = reader.read_bool()?;
        if reader.read_varuint32()? != 0 {
            return Err(PacketError::InvalidValue("game rules"));
        }
        if reader.read_u32_le()? != 0 {
            return Err(PacketError::InvalidValue("experiments"));
        }
        let _experiments_toggled = reader.read_bool()?;
        let _bonus_chest = reader.read_bool()?;
        let _start_with_map = reader.read_bool()?;
        let _player_permissions = reader.read_zigzag32()?;
        let chunk_tick_radius = reader.read_i32_le()?;
        for _ in 0..10 {
            // locked packs, templates, persona and skin restrictions
            reader.read_bool()?;
        }
        let _base_game_version = reader.read_string()?;
        let _limited_world_width = reader.read_i32_le()?;
        let _limited_world_depth = reader.read_i32_le()?;
        let _new_nether = reader.read_bool()?;
        let _education_button_name = reader.read_string()?;
        let _education_link = reader.read_string()?;
        if reader.read_bool()? {
            let _force_experimental_gameplay = reader.read_bool()?;
        }
        let _chat_restriction_level = reader.read_u8()?;
        let _disable_player_interactions = reader.read_bool()?;
        let level_id = reader.read_string()?;
        let world_name = reader.read_string()?;
        let _template_content_identity = reader.read_string()?;
        let _trial = reader.read_bool()?;
        let _movement_authority = reader.read_zigzag32()?;
        let _rewind_history_size = reader.read_zigzag32()?;
        let _server_authoritative_block_breaking = reader.read_bool()?;
        let time = reader.read_i64_le()?;
        let _enchantment_seed = reader.read_zigzag32()?;

        let palette_length = reader.read_varuint32()?;
        let mut block_palette = Vec::with_capacity(palette_length as usize);
        for _ in 0..palette_length {
            block_palette.push(reader.read_block_palette_entry()?);
        }

        if reader.read_varuint32()? != 0 {
            return Err(PacketError::InvalidValue("item table"));
        }
        let _multiplayer_correlation_id = reader.read_string()?;
        let _server_authoritative_inventory = reader.read_bool()?;
        let game_version = reader.read_string()?;
        reader.read_empty_compound()?;
        let _block_state_checksum = reader.read_u64_le()?;
        let _world_template_id = reader.read_uuid_le()?;
        let _client_side_generation = reader.read_bool()?;
        if reader.version().is_at_least(ProtocolVersion::Bedrock1_20_0) {
            let _block_network_id_hashes = reader.read_bool()?;
        }

        Ok(Self {
            entity_unique_id,
            runtime_entity_id,
            player_game_mode,
            position,
            pitch,
            yaw,
            seed,
            dimension,
            generator,
            world_game_mode,
            difficulty,
            spawn_position,
            day_cycle_lock_time,
            rain_level,
            lightning_level,
            commands_enabled,
            chunk_tick_radius,
            level_id,
            world_name,
            time,
            block_palette,
            game_version,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_zigzag64(self.entity_unique_id);
        writer.write_varuint64(self.runtime_entity_id);
        writer.write_zigzag32(self.player_game_mode);
        writer.write_vec3(self.position);
        writer.write_f32_le(self.pitch);
        writer.write_f32_le(self.yaw);
        writer.write_u64_le(self.seed);
        writer.write_i16_le(0);
        writer.write_string("plains")?;
        writer.write_zigzag32(self.dimension);
        writer.write_zigzag32(self.generator);
        writer.write_zigzag32(self.world_game_mode);
        writer.write_zigzag32(self.difficulty);
        writer.write_unsigned_block_pos(self.spawn_position);
        writer.write_bool(true);
        writer.write_bool(false);
        if writer.version().is_at_least(ProtocolVersion::Bedrock1_20_0) {
            writer.write_bool(false);
            writer.write_bool(false);
        }
        writer.write_zigzag32(self.day_cycle_lock_time);
        writer.write_zigzag32(0);
        writer.write_bool(false);
        writer.write_string("")?;
        writer.write_f32_le(self.rain_level);
        writer.write_f32_le(self.lightning_level);
        writer.write_bool(false);
        writer.write_bool(true);
        writer.write_bool(true);
        writer.write_zigzag32(0);
        writer.write_zigzag32(0);
        writer.write_bool(self.commands_enabled);
        writer.write_bool(false);
        writer.write_varuint32(0);
        writer.write_u32_le(0);
        writer.write_bool(false);
        writer.write_bool(false);
        writer.write_bool(false);
        writer.write_zigzag32(1);
        writer.write_i32_le(self.chunk_tick_radius);
        for _ in 0..10 {
            writer.write_bool(false);
        }
        writer.write_string("*")?;
        writer.write_i32_le(0);
        writer.write_i32_le(0);
        writer.write_bool(false);
        writer.write_string("")?;
        writer.write_string("")?;
        writer.write_bool(false);
        writer.write_u8(0);
        writer.write_bool(false);
        writer.write_string(&self.level_id)?;
        writer.write_string(&self.world_name)?;
        writer.write_string("")?;
        writer.write_bool(false);
        writer.write_zigzag32(MOVEMENT_AUTHORITY_CLIENT);
        writer.write_zigzag32(0);
        writer.write_bool(false);
        writer.write_i64_le(self.time);
        writer.write_zigzag32(0);

        writer.write_varuint32(self.block_palette.len() as u32);
        for entry in self.block_palette.iter() {
            writer.write_block_palette_entry(entry)?;
        }

        writer.write_varuint32(0);
        writer.write_string("")?;
        writer.write_bool(false);
        writer.write_string(&self.game_version)?;
        writer.write_empty_compound();
        writer.write_u64_le(0);
        writer.write_uuid_le(0);
        writer.write_bool(false);
        if writer.version().is_at_least(ProtocolVersion::Bedrock1_20_0) {
            writer.write_bool(false);
        }
        Ok(())
    }
}

/// `position` is at eye height.
#[derive(Clone, Debug, PartialEq)]
pub struct PacketAddPlayer {
    pub uuid: u128,
    pub username: String,
    pub runtime_entity_id: u64,
    pub entity_unique_id: i64,
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub held_item: NetworkItem,
    pub game_mode: i32,
}

impl BedrockPacket for PacketAddPlayer {
    const ID: BedrockPacketId = BedrockPacketId::AddPlayer;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let uuid = reader.read_uuid_le()?;
        let username = reader.read_string()?;
        let runtime_entity_id = reader.read_varuint64()?;
        let _platform_chat_id = reader.read_string()?;
        let position = reader.read_vec3()?;
        let _velocity = reader.read_vec3()?;
        let pitch = reader.read_f32_le()?;
        let yaw = reader.read_f32_le()?;
        let head_yaw = reader.read_f32_le()?;
        let held_item = reader.read_network_item()?;
        let game_mode = reader.read_zigzag32()?;
        if reader.read_varuint32()? != 0 {
            return Err(PacketError::InvalidValue("entity metadata"));
        }
        let _int_properties = reader.read_varuint32()?;
        let _float_properties = reader.read_varuint32()?;
        let entity_unique_id = reader.read_i64_le()?;
        let _player_permissions = reader.read_u8()?;
        let _command_permissions = reader.read_u8()?;
        let _ability_layers = reader.read_u8()?;
        let _links = reader.read_varuint32()?;
        let _device_id = reader.read_string()?;
        let _build_platform = reader.read_i32_le()?;

        Ok(Self {
            uuid,
            username,
            runtime_entity_id,
            entity_unique_id,
            position,
            pitch,
            yaw,
            head_yaw,
            held_item,
            game_mode,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_uuid_le(self.uuid);
        writer.write_string(&self.username)?;
        writer.write_varuint64(self.runtime_entity_id);
        writer.write_string("")?;
        writer.write_vec3(self.position);
        writer.write_vec3(Vec3::default());
        writer.write_f32_le(self.pitch);
        writer.write_f32_le(self.yaw);
        writer.write_f32_le(self.head_yaw);
        writer.write_network_item(&self.held_item);
        writer.write_zigzag32(self.game_mode);
        writer.write_varuint32(0);
        writer.write_varuint32(0);
        writer.write_varuint32(0);
        writer.write_i64_le(self.entity_unique_id);
        writer.write_u8(1);
        writer.write_u8(0);
        writer.write_u8(0);
        writer.write_varuint32(0);
        writer.write_string("")?;
        writer.write_i32_le(-1);
        Ok(())
    }
}

pub struct PacketRemoveEntity {
    pub entity_unique_id: i64,
}

impl BedrockPacket for PacketRemoveEntity {
    const ID: BedrockPacketId = BedrockPacketId::RemoveEntity;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        Ok(Self {
            entity_unique_id: reader.read_zigzag64()?,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_zigzag64(self.entity_unique_id);
        Ok(())
    }
}

pub const UPDATE_BLOCK_NEIGHBOURS: u32 = 0x1;
pub const UPDATE_BLOCK_NETWORK: u32 = 0x2;

pub struct PacketUpdateBlock {
    pub position: BlockPos,
    pub runtime_id: u32,
    pub flags: u32,
    pub layer: u32,
}

impl BedrockPacket for PacketUpdateBlock {
    const ID: BedrockPacketId = BedrockPacketId::UpdateBlock;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        Ok(Self {
            position: reader.read_unsigned_block_pos()?,
            runtime_id: reader.read_varuint32()?,
            flags: reader.read_varuint32()?,
            layer: reader.read_varuint32()?,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_unsigned_block_pos(self.position);
        writer.write_varuint32(self.runtime_id);
        writer.write_varuint32(self.flags);
        writer.write_varuint32(self.layer);
        Ok(())
    }
}

pub const LEVEL_EVENT_START_RAIN: i32 = 3001;
pub const LEVEL_EVENT_START_THUNDER: i32 = 3002;
pub const LEVEL_EVENT_STOP_RAIN: i32 = 3003;
pub const LEVEL_EVENT_STOP_THUNDER: i32 = 3004;

pub struct PacketLevelEvent {
    pub event: i32,
    pub position: Vec3,
    pub data: i32,
}

impl BedrockPacket for PacketLevelEvent {
    const ID: BedrockPacketId = BedrockPacketId::LevelEvent;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        Ok(Self {
            event: reader.read_zigzag32()?,
            position: reader.read_vec3()?,
            data: reader.read_zigzag32()?,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_zigzag32(self.event);
        writer.write_vec3(self.position);
        writer.write_zigzag32(self.data);
        Ok(())
    }
}

/// `payload` is the serialized sub-chunks, biomes and border bytes.
pub struct PacketLevelChunk {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub sub_chunk_count: u32,
    pub payload: Vec<u8>,
}

impl BedrockPacket for PacketLevelChunk {
    const ID: BedrockPacketId = BedrockPacketId::LevelChunk;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let chunk_x = reader.read_zigzag32()?;
        let chunk_z = reader.read_zigzag32()?;
        let sub_chunk_count = reader.read_varuint32()?;
        if reader.read_bool()? {
            return Err(PacketError::InvalidValue("chunk cache"));
        }
        let payload = reader.read_varint_bytes()?.to_vec();
        Ok(Self {
            chunk_x,
            chunk_z,
            sub_chunk_count,
            payload,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_zigzag32(self.chunk_x);
        writer.write_zigzag32(self.chunk_z);
        writer.write_varuint32(self.sub_chunk_count);
        writer.write_bool(false);
        writer.write_varint_bytes(&self.payload);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerListEntry {
    pub uuid: u128,
    pub entity_unique_id: i64,
    pub username: String,
    pub xuid: String,
    pub build_platform: i32,
    pub skin: Skin,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PacketPlayerList {
    Add(Vec<PlayerListEntry>),
    Remove(Vec<u128>),
}

const PLAYER_LIST_ADD: u8 = 0;
const PLAYER_LIST_REMOVE: u8 = 1;

impl BedrockPacket for PacketPlayerList {
    const ID: BedrockPacketId = BedrockPacketId::PlayerList;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let action = reader.read_u8()?;
        let count = reader.read_varuint32()?;
        match action {
            PLAYER_LIST_ADD => {
                let mut entries = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let uuid = reader.read_uuid_le()?;
                    let entity_unique_id = reader.read_zigzag64()?;
                    let username = reader.read_string()?;
                    let xuid = reader.read_string()?;
                    let _platform_chat_id = reader.read_string()?;
                    let build_platform = reader.read_i32_le()?;
                    let skin = reader.read_skin()?;
                    let _edu_instructor = reader.read_bool()?;
                    let _host = reader.read_bool()?;
                    entries.push(PlayerListEntry {
                        uuid,
                        entity_unique_id,
                        username,
                        xuid,
                        build_platform,
                        skin,
                    });
                }
                for _ in 0..count {
                    let _trusted_skin = reader.read_bool()?;
                }
                Ok(PacketPlayerList::Add(entries))
            }
            PLAYER_LIST_REMOVE => {
                let mut uuids = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    uuids.push(reader.read_uuid_le()?);
                }
                Ok(PacketPlayerList::Remove(uuids))
            }
            _ => Err(PacketError::InvalidValue("player list action")),
        }
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        match self {
            PacketPlayerList::Add(entries) => {
                writer.write_u8(PLAYER_LIST_ADD);
                writer.write_varuint32(entries.len() as u32);
                for entry in entries.iter() {
                    writer.write_uuid_le(entry.uuid);
                    writer.write_zigzag64(entry.entity_unique_id);
                    writer.write_string(&entry.username)?;
                    writer.write_string(&entry.xuid)?;
                    writer.write_string("")?;
                    writer.write_i32_le(entry.build_platform);
                    writer.write_skin(&entry.skin)?;
                    writer.write_bool(false);
                    writer.write_bool(false);
                }
                for _ in entries.iter() {
                    writer.write_bool(true);
                }
            }
            PacketPlayerList::Remove(uuids) => {
                writer.write_u8(PLAYER_LIST_REMOVE);
                writer.write_varuint32(uuids.len() as u32);
                for uuid in uuids.iter() {
                    writer.write_uuid_le(*uuid);
                }
            }
        }
        Ok(())
    }
}

pub struct PacketChunkRadiusUpdated {
    pub radius: i32,
}

impl BedrockPacket for PacketChunkRadiusUpdated {
    const ID: BedrockPacketId = BedrockPacketId::ChunkRadiusUpdated;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        Ok(Self {
            radius: reader.read_zigzag32()?,
        })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_zigzag32(self.radius);
        Ok(())
    }
}

/// Tells the client which area it may render, in blocks.
pub struct PacketNetworkChunkPublisherUpdate {
    pub position: BlockPos,
    pub radius: u32,
}

impl BedrockPacket for PacketNetworkChunkPublisherUpdate {
    const ID: BedrockPacketId = BedrockPacketId::NetworkChunkPublisherUpdate;

    fn read(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let position = reader.read_block_pos()?;
        let radius = reader.read_varuint32()?;
        let saved_chunks = reader.read_u32_le()?;
        for _ in 0..saved_chunks {
            reader.read_zigzag32()?;
            reader.read_zigzag32()?;
        }
        Ok(Self { position, radius })
    }

    fn write(&self, writer: &mut PacketWriter) -> Result<(), PacketError> {
        writer.write_block_pos(self.position);
        writer.write_varuint32(self.radius);
        writer.write_u32_le(0);
        Ok(())
    }
}

/// What a client sees from the server, decoded by test clients.
pub enum ServerPacket {
    NetworkSettings(PacketNetworkSettings),
    PlayStatus(PacketPlayStatus),
    Disconnect(PacketDisconnect),
    ResourcePacksInfo(PacketResourcePacksInfo),
    ResourcePackStack(PacketResourcePackStack),
    Text(PacketText),
    SetTime(PacketSetTime),
    GameRulesChanged(PacketGameRulesChanged),
    StartGame(Box<PacketStartGame>),
    AddPlayer(PacketAddPlayer),
    RemoveEntity(PacketRemoveEntity),
    MovePlayer(PacketMovePlayer),
    UpdateBlock(PacketUpdateBlock),
    LevelEvent(PacketLevelEvent),
    LevelChunk(PacketLevelChunk),
    PlayerList(PacketPlayerList),
    ChunkRadiusUpdated(PacketChunkRadiusUpdated),
    NetworkChunkPublisherUpdate(PacketNetworkChunkPublisherUpdate),
}

impl ServerPacket {
    pub fn decode(packet: &Packet, version: ProtocolVersion) -> Result<ServerPacket, PacketError> {
        let id = BedrockPacketId::from_u32(packet.id)
            .ok_or(PacketError::UnknownPacket { id: packet.id })?;

        Ok(match id {
            BedrockPacketId::NetworkSettings => {
                ServerPacket::NetworkSettings(PacketNetworkSettings::decode(packet, version)?)
            }
            BedrockPacketId::PlayStatus => {
                ServerPacket::PlayStatus(PacketPlayStatus::decode(packet, version)?)
            }
            BedrockPacketId::Disconnect => {
                ServerPacket::Disconnect(PacketDisconnect::decode(packet, version)?)
            }
            BedrockPacketId::ResourcePacksInfo => {
                ServerPacket::ResourcePacksInfo(PacketResourcePacksInfo::decode(packet, version)?)
            }
            BedrockPacketId::ResourcePackStack => {
                ServerPacket::ResourcePackStack(PacketResourcePackStack::decode(packet, version)?)
            }
            BedrockPacketId::Text => ServerPacket::Text(PacketText::decode(packet, version)?),
            BedrockPacketId::SetTime => {
                ServerPacket::SetTime(PacketSetTime::decode(packet, version)?)
            }
            BedrockPacketId::GameRulesChanged => {
                ServerPacket::GameRulesChanged(PacketGameRulesChanged::decode(packet, version)?)
            }
            BedrockPacketId::StartGame => {
                ServerPacket::StartGame(Box::new(PacketStartGame::decode(packet, version)?))
            }
            BedrockPacketId::AddPlayer => {
                ServerPacket::AddPlayer(PacketAddPlayer::decode(packet, version)?)
            }
            BedrockPacketId::RemoveEntity => {
                ServerPacket::RemoveEntity(PacketRemoveEntity::decode(packet, version)?)
            }
            BedrockPacketId::MovePlayer => {
                ServerPacket::MovePlayer(PacketMovePlayer::decode(packet, version)?)
            }
            BedrockPacketId::UpdateBlock => {
                ServerPacket::UpdateBlock(PacketUpdateBlock::decode(packet, version)?)
            }
            BedrockPacketId::LevelEvent => {
                ServerPacket::LevelEvent(PacketLevelEvent::decode(packet, version)?)
            }
            BedrockPacketId::LevelChunk => {
                ServerPacket::LevelChunk(PacketLevelChunk::decode(packet, version)?)
            }
            BedrockPacketId::PlayerList => {
                ServerPacket::PlayerList(PacketPlayerList::decode(packet, version)?)
            }
            BedrockPacketId::ChunkRadiusUpdated => ServerPacket::ChunkRadiusUpdated(
                PacketChunkRadiusUpdated::decode(packet, version)?,
            ),
            BedrockPacketId::NetworkChunkPublisherUpdate => {
                ServerPacket::NetworkChunkPublisherUpdate(
                    PacketNetworkChunkPublisherUpdate::decode(packet, version)?,
                )
            }
            _ => return Err(PacketError::UnknownPacket { id: packet.id }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_game() -> PacketStartGame {
        PacketStartGame {
            entity_unique_id: 7,
            runtime_entity_id: 7,
            player_game_mode: 1,
            position: Vec3::new(0.5, 5.62, 0.5),
            pitch: 0.0,
            yaw: 0.0,
            seed: 0,
            dimension: 0,
            generator: 2,
            world_game_mode: 1,
            difficulty: 1,
            spawn_position: BlockPos::new(0, 4, 0),
            day_cycle_lock_time: 0,
            rain_level: 0.0,
            lightning_level: 0.0,
            commands_enabled: true,
            chunk_tick_radius: 4,
            level_id: "world".to_string(),
            world_name: "blockbridge".to_string(),
            time: 6000,
            block_palette: vec![
                BlockPaletteEntry::new("minecraft:air", 0),
                BlockPaletteEntry::new("minecraft:bedrock", 0),
                BlockPaletteEntry::new("minecraft:wool", 14),
            ],
            game_version: "*".to_string(),
        }
    }

    #[test]
    fn start_game_carries_the_palette() {
        for version in [
            ProtocolVersion::Bedrock1_19_30,
            ProtocolVersion::Bedrock1_19_60,
            ProtocolVersion::Bedrock1_20_0,
        ] {
            let packet = start_game().encode(version).unwrap();
            match ServerPacket::decode(&packet, version).unwrap() {
                ServerPacket::StartGame(decoded) => assert_eq!(*decoded, start_game()),
                _ => panic!("expected start game"),
            }
        }
    }

    #[test]
    fn game_rules_carry_their_type() {
        let version = ProtocolVersion::Bedrock1_19_60;
        let packet = PacketGameRulesChanged {
            rules: vec![GameRule::bool(GAME_RULE_DAYLIGHT_CYCLE, false)],
        }
        .encode(version)
        .unwrap();

        let mut expected = vec![1, 15];
        expected.extend_from_slice(b"dodaylightcycle");
        expected.extend_from_slice(&[0, 1, 0]);
        assert_eq!(&packet.data[..], &expected[..]);

        let rules = PacketGameRulesChanged {
            rules: vec![
                GameRule::bool("showcoordinates", true),
                GameRule {
                    name: "spawnradius".to_string(),
                    editable: true,
                    value: GameRuleValue::Int(5),
                },
            ],
        };
        let decoded =
            PacketGameRulesChanged::decode(&rules.encode(version).unwrap(), version).unwrap();
        assert_eq!(decoded, rules);
    }

    #[test]
    fn play_status_is_big_endian() {
        let packet = PacketPlayStatus {
            status: PlayStatus::PlayerSpawn,
        }
        .encode(ProtocolVersion::Bedrock1_19_30)
        .unwrap();
        assert_eq!(&packet.data[..], &[0, 0, 0, 3]);
    }

    #[test]
    fn hidden_disconnect_has_no_message() {
        let hidden = PacketDisconnect { message: None }
            .encode(ProtocolVersion::Bedrock1_19_30)
            .unwrap();
        assert_eq!(&hidden.data[..], &[1]);

        let shown = PacketDisconnect {
            message: Some("Banned".to_string()),
        }
        .encode(ProtocolVersion::Bedrock1_19_30)
        .unwrap();
        let decoded = PacketDisconnect::decode(&shown, ProtocolVersion::Bedrock1_19_30).unwrap();
        assert_eq!(decoded.message.as_deref(), Some("Banned"));
    }

    #[test]
    fn player_list_add_then_remove() {
        let entry = PlayerListEntry {
            uuid: 0x0123_4567_89ab_cdef_0123_4567_89ab_cdef,
            entity_unique_id: 3,
            username: "Alex".to_string(),
            xuid: String::new(),
            build_platform: -1,
            skin: Skin::blank("alex"),
        };
        let version = ProtocolVersion::Bedrock1_20_0;

        let add = PacketPlayerList::Add(vec![entry.clone()])
            .encode(version)
            .unwrap();
        assert_eq!(
            PacketPlayerList::decode(&add, version).unwrap(),
            PacketPlayerList::Add(vec![entry.clone()])
        );

        let remove = PacketPlayerList::Remove(vec![entry.uuid])
            .encode(version)
            .unwrap();
        assert_eq!(remove.data.len(), 1 + 1 + 16);
        assert_eq!(
            PacketPlayerList::decode(&remove, version).unwrap(),
            PacketPlayerList::Remove(vec![entry.uuid])
        );
    }

    #[test]
    fn add_player_round_trip() {
        let add_player = PacketAddPlayer {
            uuid: 42,
            username: "Steve".to_string(),
            runtime_entity_id: 9,
            entity_unique_id: 9,
            position: Vec3::new(1.5, 70.62, -3.5),
            pitch: 10.0,
            yaw: 180.0,
            head_yaw: 180.0,
            held_item: NetworkItem::empty(),
            game_mode: 1,
        };
        let packet = add_player.encode(ProtocolVersion::Bedrock1_19_60).unwrap();
        assert_eq!(
            PacketAddPlayer::decode(&packet, ProtocolVersion::Bedrock1_19_60).unwrap(),
            add_player
        );
    }

    #[test]
    fn chunk_publisher_writes_no_saved_chunks() {
        let packet = PacketNetworkChunkPublisherUpdate {
            position: BlockPos::new(8, 64, 8),
            radius: 64,
        }
        .encode(ProtocolVersion::Bedrock1_19_30)
        .unwrap();
        assert_eq!(&packet.data[packet.data.len() - 4..], &[0, 0, 0, 0]);
    }
}
