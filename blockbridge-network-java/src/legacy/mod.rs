//! Pre-netty wire layouts (alpha through 1.6.4). These packets carry no
//! length prefix, so the frame boundary is found by decoding the layout
//! registered for the session's version.

pub(crate) mod login;
pub(crate) mod play;

use blockbridge_network_common::{
    ConnectionState, Direction, FrameMeasure, PacketDescriptor, PacketError, ProtocolVersion,
    SessionPacketTable, WireFlavor,
};
use log::debug;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;

use crate::{registry::JAVA_PACKETS, JavaPacket};

pub use play::{DEFAULT_FLY_SPEED, DEFAULT_WALK_SPEED};

#[derive(Copy, Clone, Debug, FromPrimitive, PartialEq, Eq)]
pub enum LegacyPacketId {
    KeepAlive = 0x00,
    Login = 0x01,
    Handshake = 0x02,
    Chat = 0x03,
    TimeUpdate = 0x04,
    PlayerInventory = 0x05,
    SpawnPosition = 0x06,
    UseEntity = 0x07,
    Respawn = 0x09,
    PlayerOnGround = 0x0A,
    PlayerPosition = 0x0B,
    PlayerLook = 0x0C,
    PlayerPositionLook = 0x0D,
    PlayerDigging = 0x0E,
    BlockPlacement = 0x0F,
    HeldItem = 0x10,
    AddToInventory = 0x11,
    Animation = 0x12,
    EntityAction = 0x13,
    SpawnPlayer = 0x14,
    PickupSpawn = 0x15,
    DestroyEntity = 0x1D,
    EntityTeleport = 0x22,
    PreChunk = 0x32,
    ChunkData = 0x33,
    BlockChange = 0x35,
    NewState = 0x46,
    CloseWindow = 0x65,
    ClickWindow = 0x66,
    SetSlot = 0x67,
    WindowItems = 0x68,
    ConfirmTransaction = 0x6A,
    CreativeInventoryAction = 0x6B,
    EnchantItem = 0x6C,
    UpdateSign = 0x82,
    PlayerListItem = 0xC9,
    PlayerAbilities = 0xCA,
    TabComplete = 0xCB,
    ClientSettings = 0xCC,
    ClientStatus = 0xCD,
    PluginMessage = 0xFA,
    EncryptionResponse = 0xFC,
    EncryptionRequest = 0xFD,
    ServerListPing = 0xFE,
    Disconnect = 0xFF,
}

pub(crate) fn descriptors() -> Vec<PacketDescriptor<JavaPacket>> {
    use LegacyPacketId::*;
    use ProtocolVersion::*;

    packet_descriptors! {
        Handshaking Serverbound [Alpha1_0_17 ..= Release1_2_4]
            Handshake => Handshake (login::decode_handshake_username, login::encode_handshake_username);
        Handshaking Serverbound [Release1_3_1 ..= Release1_6_4]
            Handshake => Handshake (login::decode_handshake_versioned, login::encode_handshake_versioned);
        Handshaking Clientbound [Alpha1_0_17 ..= Release1_2_4]
            Handshake => HandshakeReply (login::decode_handshake_reply, login::encode_handshake_reply);
        Handshaking Serverbound [Alpha1_0_17 ..= Release1_3_1]
            ServerListPing => ServerListPing (login::decode_ping, login::encode_ping);
        Handshaking Serverbound [Release1_4_2 ..= Release1_6_4]
            ServerListPing => ServerListPing (login::decode_ping_magic, login::encode_ping_magic);
        Handshaking Serverbound [Release1_6_1 ..= Release1_6_4]
            PluginMessage => PluginMessage (login::decode_plugin_message, login::encode_plugin_message);
        Handshaking Serverbound [Alpha1_0_17 ..= Release1_6_4]
            Disconnect => Disconnect (login::decode_disconnect, login::encode_disconnect);
        Handshaking Clientbound [Alpha1_0_17 ..= Release1_6_4]
            Disconnect => Disconnect (login::decode_disconnect, login::encode_disconnect);

        Login Serverbound [Alpha1_0_17 ..= Beta1_4]
            Login => LoginRequest (login::decode_login_request_v1, login::encode_login_request_v1);
        Login Serverbound [Beta1_5 ..= Beta1_7]
            Login => LoginRequest (login::decode_login_request_v2, login::encode_login_request_v2);
        Login Serverbound [Beta1_8 ..= Release1_0]
            Login => LoginRequest (login::decode_login_request_v3, login::encode_login_request_v3);
        Login Serverbound [Release1_1 ..= Release1_1]
            Login => LoginRequest (login::decode_login_request_v4, login::encode_login_request_v4);
        Login Serverbound [Release1_2_1 ..= Release1_2_4]
            Login => LoginRequest (login::decode_login_request_v5, login::encode_login_request_v5);
        Login Clientbound [Release1_3_1 ..= Release1_6_4]
            EncryptionRequest => EncryptionRequest (login::decode_encryption_request, login::encode_encryption_request);
        Login Serverbound [Release1_3_1 ..= Release1_6_4]
            EncryptionResponse => EncryptionResponse (login::decode_encryption_response, login::encode_encryption_response);
        Login Clientbound [Release1_3_1 ..= Release1_6_4]
            EncryptionResponse => EncryptionResponse (login::decode_encryption_response, login::encode_encryption_response);
        Login Serverbound [Release1_3_1 ..= Release1_6_4]
            ClientStatus => ClientStatus (login::decode_client_status, login::encode_client_status);
        Login Serverbound [Alpha1_0_17 ..= Release1_6_4]
            Disconnect => Disconnect (login::decode_disconnect, login::encode_disconnect);
        Login Clientbound [Alpha1_0_17 ..= Release1_6_4]
            Disconnect => Disconnect (login::decode_disconnect, login::encode_disconnect);

        Play Clientbound [Alpha1_0_17 ..= Beta1_4]
            Login => JoinGame (login::decode_join_game_v1, login::encode_join_game_v1);
        Play Clientbound [Beta1_5 ..= Beta1_7]
            Login => JoinGame (login::decode_join_game_v2, login::encode_join_game_v2);
        Play Clientbound [Beta1_8 ..= Release1_0]
            Login => JoinGame (login::decode_join_game_v3, login::encode_join_game_v3);
        Play Clientbound [Release1_1 ..= Release1_1]
            Login => JoinGame (login::decode_join_game_v4, login::encode_join_game_v4);
        Play Clientbound [Release1_2_1 ..= Release1_2_4]
            Login => JoinGame (login::decode_join_game_v5, login::encode_join_game_v5);
        Play Clientbound [Release1_3_1 ..= Release1_6_4]
            Login => JoinGame (login::decode_join_game_v6, login::encode_join_game_v6);

        Play Serverbound [Alpha1_0_17 ..= Beta1_7]
            KeepAlive => KeepAlive (play::decode_keep_alive_empty, play::encode_keep_alive_empty);
        Play Clientbound [Alpha1_0_17 ..= Beta1_7]
            KeepAlive => KeepAlive (play::decode_keep_alive_empty, play::encode_keep_alive_empty);
        Play Serverbound [Beta1_8 ..= Release1_6_4]
            KeepAlive => KeepAlive (play::decode_keep_alive, play::encode_keep_alive);
        Play Clientbound [Beta1_8 ..= Release1_6_4]
            KeepAlive => KeepAlive (play::decode_keep_alive, play::encode_keep_alive);

        Play Serverbound [Alpha1_0_17 ..= Release1_6_4]
            Chat => ChatMessage (play::decode_chat, play::encode_chat);
        Play Clientbound [Alpha1_0_17 ..= Release1_6_4]
            Chat => ChatMessage (play::decode_chat, play::encode_chat);

        Play Clientbound [Alpha1_0_17 ..= Release1_3_1]
            TimeUpdate => TimeUpdate (play::decode_time_single, play::encode_time_single);
        Play Clientbound [Release1_4_2 ..= Release1_6_4]
            TimeUpdate => TimeUpdate (play::decode_time_double, play::encode_time_double);

        Play Serverbound [Alpha1_0_17 ..= Alpha1_2_6]
            PlayerInventory => PlayerInventory (play::decode_player_inventory, play::encode_player_inventory);
        Play Clientbound [Alpha1_0_17 ..= Alpha1_2_6]
            PlayerInventory => PlayerInventory (play::decode_player_inventory, play::encode_player_inventory);

        Play Clientbound [Alpha1_0_17 ..= Release1_6_4]
            SpawnPosition => SpawnPosition (play::decode_spawn_position, play::encode_spawn_position);
        Play Serverbound [Alpha1_0_17 ..= Release1_6_4]
            UseEntity => UseEntity (play::decode_use_entity, play::encode_use_entity);

        Play Serverbound [Alpha1_0_17 ..= Alpha1_2_6]
            Respawn => Respawn (play::decode_respawn_empty, play::encode_respawn_empty);
        Play Clientbound [Alpha1_0_17 ..= Alpha1_2_6]
            Respawn => Respawn (play::decode_respawn_empty, play::encode_respawn_empty);
        Play Serverbound [Beta1_0 ..= Beta1_7]
            Respawn => Respawn (play::decode_respawn_v1, play::encode_respawn_v1);
        Play Clientbound [Beta1_0 ..= Beta1_7]
            Respawn => Respawn (play::decode_respawn_v1, play::encode_respawn_v1);
        Play Serverbound [Beta1_8 ..= Release1_0]
            Respawn => Respawn (play::decode_respawn_v2, play::encode_respawn_v2);
        Play Clientbound [Beta1_8 ..= Release1_0]
            Respawn => Respawn (play::decode_respawn_v2, play::encode_respawn_v2);
        Play Serverbound [Release1_1 ..= Release1_1]
            Respawn => Respawn (play::decode_respawn_v3, play::encode_respawn_v3);
        Play Clientbound [Release1_1 ..= Release1_1]
            Respawn => Respawn (play::decode_respawn_v3, play::encode_respawn_v3);
        Play Serverbound [Release1_2_1 ..= Release1_2_4]
            Respawn => Respawn (play::decode_respawn_v4, play::encode_respawn_v4);
        Play Clientbound [Release1_2_1 ..= Release1_6_4]
            Respawn => Respawn (play::decode_respawn_v4, play::encode_respawn_v4);

        Play Serverbound [Alpha1_0_17 ..= Release1_6_4]
            PlayerOnGround => PlayerOnGround (play::decode_player_on_ground, play::encode_player_on_ground);
        Play Serverbound [Alpha1_0_17 ..= Release1_6_4]
            PlayerPosition => PlayerPosition (play::decode_player_position, play::encode_player_position);
        Play Serverbound [Alpha1_0_17 ..= Release1_6_4]
            PlayerLook => PlayerLook (play::decode_player_look, play::encode_player_look);
        Play Serverbound [Alpha1_0_17 ..= Release1_6_4]
            PlayerPositionLook => PlayerPositionLook (play::decode_player_position_look_serverbound, play::encode_player_position_look_serverbound);
        Play Clientbound [Alpha1_0_17 ..= Release1_6_4]
            PlayerPositionLook => PlayerPositionLook (play::decode_player_position_look_clientbound, play::encode_player_position_look_clientbound);
        Play Serverbound [Alpha1_0_17 ..= Release1_6_4]
            PlayerDigging => PlayerDigging (play::decode_player_digging, play::encode_player_digging);

        Play Serverbound [Alpha1_0_17 ..= Alpha1_2_6]
            BlockPlacement => BlockPlacement (play::decode_block_placement_alpha, play::encode_block_placement_alpha);
        Play Serverbound [Beta1_0 ..= Release1_2_4]
            BlockPlacement => BlockPlacement (play::decode_block_placement_v1, play::encode_block_placement_v1);
        Play Serverbound [Release1_3_1 ..= Release1_6_4]
            BlockPlacement => BlockPlacement (play::decode_block_placement_v2, play::encode_block_placement_v2);

        Play Serverbound [Alpha1_0_17 ..= Alpha1_2_6]
            HeldItem => HoldingChange (play::decode_holding_change, play::encode_holding_change);
        Play Serverbound [Beta1_0 ..= Release1_6_4]
            HeldItem => HeldItemChange (play::decode_held_item_change, play::encode_held_item_change);
        Play Clientbound [Alpha1_0_17 ..= Alpha1_2_6]
            AddToInventory => AddToInventory (play::decode_add_to_inventory, play::encode_add_to_inventory);

        Play Serverbound [Alpha1_0_17 ..= Release1_6_4]
            Animation => Animation (play::decode_animation, play::encode_animation);
        Play Clientbound [Alpha1_0_17 ..= Release1_6_4]
            Animation => Animation (play::decode_animation, play::encode_animation);
        Play Serverbound [Alpha1_0_17 ..= Release1_5_2]
            EntityAction => EntityAction (play::decode_entity_action_v1, play::encode_entity_action_v1);
        Play Serverbound [Release1_6_1 ..= Release1_6_4]
            EntityAction => EntityAction (play::decode_entity_action_v2, play::encode_entity_action_v2);

        Play Clientbound [Alpha1_0_17 ..= Release1_3_1]
            SpawnPlayer => SpawnPlayer (play::decode_spawn_player_v1, play::encode_spawn_player_v1);
        Play Clientbound [Release1_4_2 ..= Release1_6_4]
            SpawnPlayer => SpawnPlayer (play::decode_spawn_player_v2, play::encode_spawn_player_v2);
        Play Serverbound [Alpha1_0_17 ..= Alpha1_2_6]
            PickupSpawn => PickupSpawn (play::decode_pickup_spawn, play::encode_pickup_spawn);

        Play Clientbound [Alpha1_0_17 ..= Release1_2_4]
            DestroyEntity => DestroyEntities (play::decode_destroy_entity, play::encode_destroy_entity);
        Play Clientbound [Release1_3_1 ..= Release1_6_4]
            DestroyEntity => DestroyEntities (play::decode_destroy_entities, play::encode_destroy_entities);
        Play Clientbound [Alpha1_0_17 ..= Release1_6_4]
            EntityTeleport => EntityTeleport (play::decode_entity_teleport, play::encode_entity_teleport);

        Play Clientbound [Alpha1_0_17 ..= Release1_2_4]
            PreChunk => PreChunk (play::decode_pre_chunk, play::encode_pre_chunk);
        Play Clientbound [Alpha1_0_17 ..= Release1_1]
            ChunkData => FlatChunkData (play::decode_flat_chunk, play::encode_flat_chunk);
        Play Clientbound [Release1_2_1 ..= Release1_2_4]
            ChunkData => ChunkData (play::decode_chunk_v1, play::encode_chunk_v1);
        Play Clientbound [Release1_3_1 ..= Release1_6_4]
            ChunkData => ChunkData (play::decode_chunk_v2, play::encode_chunk_v2);

        Play Clientbound [Alpha1_0_17 ..= Release1_2_4]
            BlockChange => BlockChange (play::decode_block_change_byte, play::encode_block_change_byte);
        Play Clientbound [Release1_3_1 ..= Release1_6_4]
            BlockChange => BlockChange (play::decode_block_change_short, play::encode_block_change_short);

        Play Clientbound [Beta1_0 ..= Beta1_7]
            NewState => ChangeGameState (play::decode_new_state_v1, play::encode_new_state_v1);
        Play Clientbound [Beta1_8 ..= Release1_6_4]
            NewState => ChangeGameState (play::decode_new_state_v2, play::encode_new_state_v2);

        Play Serverbound [Beta1_0 ..= Release1_6_4]
            CloseWindow => CloseWindow (play::decode_close_window, play::encode_close_window);
        Play Clientbound [Beta1_0 ..= Release1_6_4]
            CloseWindow => CloseWindow (play::decode_close_window, play::encode_close_window);
        Play Serverbound [Beta1_0 ..= Beta1_4]
            ClickWindow => ClickWindow (play::decode_click_window_v1, play::encode_click_window_v1);
        Play Serverbound [Beta1_5 ..= Release1_6_4]
            ClickWindow => ClickWindow (play::decode_click_window_v2, play::encode_click_window_v2);
        Play Clientbound [Beta1_0 ..= Release1_6_4]
            SetSlot => SetSlot (play::decode_set_slot, play::encode_set_slot);
        Play Clientbound [Beta1_0 ..= Release1_6_4]
            WindowItems => WindowItems (play::decode_window_items, play::encode_window_items);
        Play Serverbound [Beta1_0 ..= Release1_6_4]
            ConfirmTransaction => ConfirmTransaction (play::decode_confirm_transaction, play::encode_confirm_transaction);
        Play Clientbound [Beta1_0 ..= Release1_6_4]
            ConfirmTransaction => ConfirmTransaction (play::decode_confirm_transaction, play::encode_confirm_transaction);

        Play Serverbound [Beta1_8 ..= Beta1_8]
            CreativeInventoryAction => CreativeInventoryAction (play::decode_creative_action_v1, play::encode_creative_action_v1);
        Play Serverbound [Release1_0 ..= Release1_6_4]
            CreativeInventoryAction => CreativeInventoryAction (play::decode_creative_action_v2, play::encode_creative_action_v2);
        Play Serverbound [Release1_0 ..= Release1_6_4]
            EnchantItem => EnchantItem (play::decode_enchant_item, play::encode_enchant_item);

        Play Serverbound [Alpha1_0_17 ..= Release1_6_4]
            UpdateSign => UpdateSign (play::decode_update_sign, play::encode_update_sign);
        Play Clientbound [Alpha1_0_17 ..= Release1_6_4]
            UpdateSign => UpdateSign (play::decode_update_sign, play::encode_update_sign);

        Play Clientbound [Beta1_8 ..= Release1_6_4]
            PlayerListItem => PlayerListItem (play::decode_player_list_item, play::encode_player_list_item);

        Play Serverbound [Release1_0 ..= Release1_2_4]
            PlayerAbilities => PlayerAbilities (play::decode_abilities_v1, play::encode_abilities_v1);
        Play Clientbound [Release1_0 ..= Release1_2_4]
            PlayerAbilities => PlayerAbilities (play::decode_abilities_v1, play::encode_abilities_v1);
        Play Serverbound [Release1_3_1 ..= Release1_6_4]
            PlayerAbilities => PlayerAbilities (play::decode_abilities_v2, play::encode_abilities_v2);
        Play Clientbound [Release1_3_1 ..= Release1_6_4]
            PlayerAbilities => PlayerAbilities (play::decode_abilities_v2, play::encode_abilities_v2);

        Play Serverbound [Release1_3_1 ..= Release1_6_4]
            TabComplete => TabComplete (play::decode_tab_complete, play::encode_tab_complete);
        Play Clientbound [Release1_3_1 ..= Release1_6_4]
            TabComplete => TabComplete (play::decode_tab_complete, play::encode_tab_complete);
        Play Serverbound [Release1_2_1 ..= Release1_3_1]
            ClientSettings => ClientSettings (play::decode_client_settings_v1, play::encode_client_settings_v1);
        Play Serverbound [Release1_4_2 ..= Release1_6_4]
            ClientSettings => ClientSettings (play::decode_client_settings_v2, play::encode_client_settings_v2);
        Play Serverbound [Release1_3_1 ..= Release1_6_4]
            ClientStatus => ClientStatus (login::decode_client_status, login::encode_client_status);

        Play Serverbound [Release1_1 ..= Release1_6_4]
            PluginMessage => PluginMessage (login::decode_plugin_message, login::encode_plugin_message);
        Play Clientbound [Release1_1 ..= Release1_6_4]
            PluginMessage => PluginMessage (login::decode_plugin_message, login::encode_plugin_message);

        Play Serverbound [Alpha1_0_17 ..= Release1_6_4]
            Disconnect => Disconnect (login::decode_disconnect, login::encode_disconnect);
        Play Clientbound [Alpha1_0_17 ..= Release1_6_4]
            Disconnect => Disconnect (login::decode_disconnect, login::encode_disconnect);
    }
}

/// Finds packet boundaries on an unframed stream by decoding each packet
/// with the layout the session's version and state expect.
pub struct LegacyFrameMeasure {
    table: SessionPacketTable<'static, JavaPacket>,
    inbound: Direction,
    state: ConnectionState,
}

impl LegacyFrameMeasure {
    pub fn new(version: ProtocolVersion, inbound: Direction) -> Self {
        Self {
            table: JAVA_PACKETS.session_table(version, inbound),
            inbound,
            state: ConnectionState::Handshaking,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.table.version()
    }

    pub fn set_version(&mut self, version: ProtocolVersion) {
        if version != self.table.version() {
            self.table = JAVA_PACKETS.session_table(version, self.inbound);
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }
}

impl FrameMeasure for LegacyFrameMeasure {
    fn measure(&self, id: u32, body: &[u8]) -> Result<usize, PacketError> {
        let measured = self
            .table
            .decode_prefix(self.state, id, body)
            .map(|(_, consumed)| consumed);
        if let Err(PacketError::UnknownPacket { id }) = &measured {
            match LegacyPacketId::from_u32(*id) {
                Some(known) => debug!(
                    "{:?} has no {} layout in {:?}",
                    known,
                    self.version().name(),
                    self.state
                ),
                None => debug!("unknown pre-netty packet 0x{:02X}", id),
            }
        }
        measured
    }
}

/// Guesses the string encoding of a pre-netty handshake from its first
/// bytes. Returns `None` until enough bytes have arrived.
///
/// From 1.3 the handshake opens with a non-zero protocol byte. Older
/// handshakes open with a short string length; UTF-16 names then start
/// with a zero high byte, which modified UTF-8 never produces.
pub fn detect_handshake_flavor(buffer: &[u8]) -> Option<WireFlavor> {
    match buffer {
        [0x02, 0, 0, ..] => Some(WireFlavor::LegacyModifiedUtf8),
        [0x02, 0, _, 0, ..] => Some(WireFlavor::LegacyString16),
        [0x02, 0, _, _, ..] => Some(WireFlavor::LegacyModifiedUtf8),
        [0x02, protocol, ..] if *protocol != 0 => Some(WireFlavor::LegacyVersioned),
        _ => None,
    }
}

/// Server list reply for a pre-netty ping. 1.4 and later parse the
/// `§1` form, older clients read `motd§online§max`.
pub fn ping_response(
    version: Option<ProtocolVersion>,
    motd: &str,
    online: usize,
    max_players: usize,
) -> String {
    match version {
        Some(version) => format!(
            "\u{a7}1\0{}\0{}\0{}\0{}\0{}",
            version.wire_number(),
            version.name(),
            motd,
            online,
            max_players
        ),
        None => format!("{}\u{a7}{}\u{a7}{}", motd, online, max_players),
    }
}
