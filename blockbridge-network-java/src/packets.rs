//! Canonical packet shapes shared by every Java era. Field widths and
//! ordering differences live in the `legacy` and `modern` codecs.

use blockbridge_network_common::PacketSet;

use crate::common_packets::ItemStack;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketHandshake {
    pub protocol_version: i32,
    pub username: String,
    pub host: String,
    pub port: u16,
    pub next_state: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketHandshakeReply {
    pub connection_hash: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketLoginRequest {
    pub protocol_version: i32,
    pub username: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketJoinGame {
    pub entity_id: i32,
    pub level_type: String,
    pub game_mode: u8,
    pub dimension: i32,
    pub difficulty: u8,
    pub world_height: u8,
    pub max_players: u8,
    pub seed: i64,
    pub reduced_debug_info: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketEncryptionRequest {
    pub server_id: String,
    pub public_key: Vec<u8>,
    pub verify_token: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketEncryptionResponse {
    pub shared_secret: Vec<u8>,
    pub verify_token: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketLoginSuccess {
    pub uuid: String,
    pub username: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketSetCompression {
    pub threshold: i32,
}

pub const CLIENT_STATUS_LOGIN: i32 = 0;
pub const CLIENT_STATUS_RESPAWN: i32 = 1;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketClientStatus {
    pub action: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketServerListPing {
    pub magic: Option<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketStatusRequest;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketStatusResponse {
    pub json: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketStatusPing {
    pub payload: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketDisconnect {
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketKeepAlive {
    pub id: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketChatMessage {
    pub message: String,
    pub position: u8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketTimeUpdate {
    pub world_age: i64,
    /// Negative when the daylight cycle is frozen.
    pub time_of_day: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPlayerInventory {
    pub inventory_type: i32,
    pub items: Vec<Option<ItemStack>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketSpawnPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketUseEntity {
    pub user: i32,
    pub target: i32,
    pub action: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketRespawn {
    pub dimension: i32,
    pub difficulty: u8,
    pub game_mode: u8,
    pub world_height: u16,
    pub seed: i64,
    pub level_type: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPlayerOnGround {
    pub on_ground: bool,
}

/// `y` is the Y value in the era's own convention (eye height before 1.8,
/// feet from 1.8). `stance` carries the other value where the wire has one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPlayerPosition {
    pub x: f64,
    pub y: f64,
    pub stance: f64,
    pub z: f64,
    pub on_ground: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPlayerLook {
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

/// Same Y convention as [`PacketPlayerPosition`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPlayerPositionLook {
    pub x: f64,
    pub y: f64,
    pub stance: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

pub const DIGGING_STARTED: u8 = 0;
pub const DIGGING_CANCELLED: u8 = 1;
pub const DIGGING_FINISHED: u8 = 2;
pub const DIGGING_DROP_ITEM: u8 = 4;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPlayerDigging {
    pub status: u8,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub face: i8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketBlockPlacement {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub direction: i8,
    pub item: Option<ItemStack>,
    pub cursor_x: u8,
    pub cursor_y: u8,
    pub cursor_z: u8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketHeldItemChange {
    pub slot: i16,
}

/// Alpha clients report the held item id rather than a hotbar slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketHoldingChange {
    pub entity_id: i32,
    pub item_id: i16,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketAddToInventory {
    pub item: ItemStack,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketAnimation {
    pub entity_id: i32,
    pub animation: i8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketEntityAction {
    pub entity_id: i32,
    pub action: i8,
    pub jump_boost: i32,
}

/// Positions are 1/32 block fixed point, feet height.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketSpawnPlayer {
    pub entity_id: i32,
    pub uuid: u128,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub yaw: i8,
    pub pitch: i8,
    pub current_item: i16,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPickupSpawn {
    pub entity_id: i32,
    pub item: ItemStack,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub rotation: i8,
    pub pitch: i8,
    pub roll: i8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketDestroyEntities {
    pub entity_ids: Vec<i32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketEntityTeleport {
    pub entity_id: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub yaw: i8,
    pub pitch: i8,
    pub on_ground: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPreChunk {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub load: bool,
}

/// Single region blob used before sectioned chunks. `x`/`y`/`z` are block
/// coordinates, sizes are real sizes (the wire stores size - 1).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketFlatChunkData {
    pub x: i32,
    pub y: i16,
    pub z: i32,
    pub size_x: u8,
    pub size_y: u8,
    pub size_z: u8,
    pub compressed_data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketChunkData {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub ground_up: bool,
    pub primary_bitmask: u16,
    pub add_bitmask: u16,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketBlockChange {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub block_id: i32,
    pub metadata: u8,
}

pub const GAME_STATE_END_RAIN: u8 = 1;
pub const GAME_STATE_BEGIN_RAIN: u8 = 2;
pub const GAME_STATE_CHANGE_GAME_MODE: u8 = 3;
pub const GAME_STATE_RAIN_LEVEL: u8 = 7;
pub const GAME_STATE_THUNDER_LEVEL: u8 = 8;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketChangeGameState {
    pub reason: u8,
    pub value: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketCloseWindow {
    pub window_id: i8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketClickWindow {
    pub window_id: i8,
    pub slot: i16,
    pub button: i8,
    pub action: i16,
    pub mode: i8,
    pub item: Option<ItemStack>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketConfirmTransaction {
    pub window_id: i8,
    pub action: i16,
    pub accepted: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketSetSlot {
    pub window_id: i8,
    pub slot: i16,
    pub item: Option<ItemStack>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketWindowItems {
    pub window_id: u8,
    pub items: Vec<Option<ItemStack>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketCreativeInventoryAction {
    pub slot: i16,
    pub item: Option<ItemStack>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketEnchantItem {
    pub window_id: i8,
    pub enchantment: i8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketUpdateSign {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub lines: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerListAction {
    #[default]
    Add,
    Remove,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerListEntry {
    pub uuid: u128,
    pub name: String,
    pub game_mode: i32,
    pub ping: i32,
}

/// Eras before 1.8 carry exactly one entry per packet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPlayerListItem {
    pub action: PlayerListAction,
    pub entries: Vec<PlayerListEntry>,
}

pub const ABILITY_INVULNERABLE: u8 = 0x01;
pub const ABILITY_FLYING: u8 = 0x02;
pub const ABILITY_ALLOW_FLYING: u8 = 0x04;
pub const ABILITY_CREATIVE: u8 = 0x08;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPlayerAbilities {
    pub flags: u8,
    pub fly_speed: f32,
    pub walk_speed: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketTabComplete {
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketClientSettings {
    pub locale: String,
    pub view_distance: i8,
    pub chat_flags: i8,
    pub chat_colors: bool,
    pub difficulty: u8,
    pub show_cape: bool,
    pub skin_parts: u8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacketPluginMessage {
    pub channel: String,
    pub data: Vec<u8>,
}

macro_rules! java_packets {
    ($($variant:ident($shape:ident)),* $(,)?) => {
        #[derive(Clone, Debug, PartialEq)]
        pub enum JavaPacket {
            $($variant($shape)),*
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum JavaPacketKind {
            $($variant),*
        }

        impl PacketSet for JavaPacket {
            type Kind = JavaPacketKind;

            fn kind(&self) -> JavaPacketKind {
                match self {
                    $(JavaPacket::$variant(_) => JavaPacketKind::$variant),*
                }
            }
        }

        $(
            impl From<$shape> for JavaPacket {
                fn from(packet: $shape) -> Self {
                    JavaPacket::$variant(packet)
                }
            }
        )*
    };
}

java_packets! {
    Handshake(PacketHandshake),
    HandshakeReply(PacketHandshakeReply),
    LoginRequest(PacketLoginRequest),
    JoinGame(PacketJoinGame),
    EncryptionRequest(PacketEncryptionRequest),
    EncryptionResponse(PacketEncryptionResponse),
    LoginSuccess(PacketLoginSuccess),
    SetCompression(PacketSetCompression),
    ClientStatus(PacketClientStatus),
    ServerListPing(PacketServerListPing),
    StatusRequest(PacketStatusRequest),
    StatusResponse(PacketStatusResponse),
    StatusPing(PacketStatusPing),
    Disconnect(PacketDisconnect),
    KeepAlive(PacketKeepAlive),
    ChatMessage(PacketChatMessage),
    TimeUpdate(PacketTimeUpdate),
    PlayerInventory(PacketPlayerInventory),
    SpawnPosition(PacketSpawnPosition),
    UseEntity(PacketUseEntity),
    Respawn(PacketRespawn),
    PlayerOnGround(PacketPlayerOnGround),
    PlayerPosition(PacketPlayerPosition),
    PlayerLook(PacketPlayerLook),
    PlayerPositionLook(PacketPlayerPositionLook),
    PlayerDigging(PacketPlayerDigging),
    BlockPlacement(PacketBlockPlacement),
    HeldItemChange(PacketHeldItemChange),
    HoldingChange(PacketHoldingChange),
    AddToInventory(PacketAddToInventory),
    Animation(PacketAnimation),
    EntityAction(PacketEntityAction),
    SpawnPlayer(PacketSpawnPlayer),
    PickupSpawn(PacketPickupSpawn),
    DestroyEntities(PacketDestroyEntities),
    EntityTeleport(PacketEntityTeleport),
    PreChunk(PacketPreChunk),
    FlatChunkData(PacketFlatChunkData),
    ChunkData(PacketChunkData),
    BlockChange(PacketBlockChange),
    ChangeGameState(PacketChangeGameState),
    CloseWindow(PacketCloseWindow),
    ClickWindow(PacketClickWindow),
    ConfirmTransaction(PacketConfirmTransaction),
    SetSlot(PacketSetSlot),
    WindowItems(PacketWindowItems),
    CreativeInventoryAction(PacketCreativeInventoryAction),
    EnchantItem(PacketEnchantItem),
    UpdateSign(PacketUpdateSign),
    PlayerListItem(PacketPlayerListItem),
    PlayerAbilities(PacketPlayerAbilities),
    TabComplete(PacketTabComplete),
    ClientSettings(PacketClientSettings),
    PluginMessage(PacketPluginMessage),
}

/// Borrows the expected shape out of a [`JavaPacket`] inside an encoder.
#[macro_export]
macro_rules! expect_packet {
    ($packet:expr, $variant:ident) => {
        match $packet {
            $crate::JavaPacket::$variant(inner) => inner,
            _ => return Err(blockbridge_network_common::PacketError::WrongVariant),
        }
    };
}
