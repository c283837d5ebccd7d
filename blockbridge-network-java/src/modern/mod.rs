//! Netty era layouts (1.7.2 to 1.8). Frames are length prefixed, see
//! [`blockbridge_network_common::VarIntFrameCodec`].

pub(crate) mod login;
pub(crate) mod play;

use blockbridge_network_common::{PacketDescriptor, ProtocolVersion};

use crate::{
    legacy::{login as legacy_login, play as legacy_play},
    JavaPacket,
};

pub use play::ANIMATION_SWING_ARM;

/// Values of the handshake `next_state` field.
pub const HANDSHAKE_NEXT_STATUS: i32 = 1;
pub const HANDSHAKE_NEXT_LOGIN: i32 = 2;

pub(crate) fn descriptors() -> Vec<PacketDescriptor<JavaPacket>> {
    use ProtocolVersion::*;

    packet_descriptors! {
        Handshaking Serverbound [Modern1_7_2 ..= Modern1_8]
            0x00 => Handshake (login::decode_handshake, login::encode_handshake);

        Status Serverbound [Modern1_7_2 ..= Modern1_8]
            0x00 => StatusRequest (login::decode_status_request, login::encode_status_request);
        Status Serverbound [Modern1_7_2 ..= Modern1_8]
            0x01 => StatusPing (login::decode_status_ping, login::encode_status_ping);
        Status Clientbound [Modern1_7_2 ..= Modern1_8]
            0x00 => StatusResponse (login::decode_status_response, login::encode_status_response);
        Status Clientbound [Modern1_7_2 ..= Modern1_8]
            0x01 => StatusPing (login::decode_status_ping, login::encode_status_ping);

        Login Serverbound [Modern1_7_2 ..= Modern1_8]
            0x00 => LoginRequest (login::decode_login_start, login::encode_login_start);
        Login Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x01 => EncryptionResponse (login::decode_encryption_response_v1, login::encode_encryption_response_v1);
        Login Serverbound [Modern1_8 ..= Modern1_8]
            0x01 => EncryptionResponse (login::decode_encryption_response_v2, login::encode_encryption_response_v2);
        Login Clientbound [Modern1_7_2 ..= Modern1_8]
            0x00 => Disconnect (login::decode_disconnect, login::encode_disconnect);
        Login Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x01 => EncryptionRequest (login::decode_encryption_request_v1, login::encode_encryption_request_v1);
        Login Clientbound [Modern1_8 ..= Modern1_8]
            0x01 => EncryptionRequest (login::decode_encryption_request_v2, login::encode_encryption_request_v2);
        Login Clientbound [Modern1_7_2 ..= Modern1_8]
            0x02 => LoginSuccess (login::decode_login_success, login::encode_login_success);
        Login Clientbound [Modern1_8 ..= Modern1_8]
            0x03 => SetCompression (login::decode_set_compression, login::encode_set_compression);

        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x00 => KeepAlive (legacy_play::decode_keep_alive, legacy_play::encode_keep_alive);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x00 => KeepAlive (play::decode_keep_alive_varint, play::encode_keep_alive_varint);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x01 => JoinGame (play::decode_join_game_v1, play::encode_join_game_v1);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x01 => JoinGame (play::decode_join_game_v2, play::encode_join_game_v2);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x02 => ChatMessage (legacy_play::decode_chat, legacy_play::encode_chat);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x02 => ChatMessage (play::decode_chat_positioned, play::encode_chat_positioned);
        Play Clientbound [Modern1_7_2 ..= Modern1_8]
            0x03 => TimeUpdate (legacy_play::decode_time_double, legacy_play::encode_time_double);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x05 => SpawnPosition (legacy_play::decode_spawn_position, legacy_play::encode_spawn_position);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x05 => SpawnPosition (play::decode_spawn_position_packed, play::encode_spawn_position_packed);
        Play Clientbound [Modern1_7_2 ..= Modern1_8]
            0x07 => Respawn (play::decode_respawn, play::encode_respawn);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x08 => PlayerPositionLook (play::decode_position_look_clientbound_v1, play::encode_position_look_clientbound_v1);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x08 => PlayerPositionLook (play::decode_position_look_clientbound_v2, play::encode_position_look_clientbound_v2);
        Play Clientbound [Modern1_7_2 ..= Modern1_8]
            0x0B => Animation (play::decode_animation_v1, play::encode_animation_v1);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_2]
            0x0C => SpawnPlayer (play::decode_spawn_player_v1, play::encode_spawn_player_v1);
        Play Clientbound [Modern1_7_6 ..= Modern1_7_6]
            0x0C => SpawnPlayer (play::decode_spawn_player_v2, play::encode_spawn_player_v2);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x0C => SpawnPlayer (play::decode_spawn_player_v3, play::encode_spawn_player_v3);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x13 => DestroyEntities (legacy_play::decode_destroy_entities, legacy_play::encode_destroy_entities);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x13 => DestroyEntities (play::decode_destroy_entities_varint, play::encode_destroy_entities_varint);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x18 => EntityTeleport (legacy_play::decode_entity_teleport, legacy_play::encode_entity_teleport);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x18 => EntityTeleport (play::decode_entity_teleport_v2, play::encode_entity_teleport_v2);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x21 => ChunkData (legacy_play::decode_chunk_v2, legacy_play::encode_chunk_v2);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x21 => ChunkData (play::decode_chunk_v3, play::encode_chunk_v3);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x23 => BlockChange (play::decode_block_change_v1, play::encode_block_change_v1);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x23 => BlockChange (play::decode_block_change_v2, play::encode_block_change_v2);
        Play Clientbound [Modern1_7_2 ..= Modern1_8]
            0x2B => ChangeGameState (play::decode_change_game_state, play::encode_change_game_state);
        Play Clientbound [Modern1_7_2 ..= Modern1_8]
            0x2E => CloseWindow (legacy_play::decode_close_window, legacy_play::encode_close_window);
        Play Clientbound [Modern1_7_2 ..= Modern1_8]
            0x2F => SetSlot (legacy_play::decode_set_slot, legacy_play::encode_set_slot);
        Play Clientbound [Modern1_7_2 ..= Modern1_8]
            0x30 => WindowItems (legacy_play::decode_window_items, legacy_play::encode_window_items);
        Play Clientbound [Modern1_7_2 ..= Modern1_8]
            0x32 => ConfirmTransaction (legacy_play::decode_confirm_transaction, legacy_play::encode_confirm_transaction);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x33 => UpdateSign (legacy_play::decode_update_sign, legacy_play::encode_update_sign);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x33 => UpdateSign (play::decode_update_sign_v2, play::encode_update_sign_v2);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x38 => PlayerListItem (legacy_play::decode_player_list_item, legacy_play::encode_player_list_item);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x38 => PlayerListItem (play::decode_player_list_v2, play::encode_player_list_v2);
        Play Clientbound [Modern1_7_2 ..= Modern1_8]
            0x39 => PlayerAbilities (play::decode_abilities, play::encode_abilities);
        Play Clientbound [Modern1_7_2 ..= Modern1_7_6]
            0x3F => PluginMessage (legacy_login::decode_plugin_message, legacy_login::encode_plugin_message);
        Play Clientbound [Modern1_8 ..= Modern1_8]
            0x3F => PluginMessage (play::decode_plugin_message_v2, play::encode_plugin_message_v2);
        Play Clientbound [Modern1_7_2 ..= Modern1_8]
            0x40 => Disconnect (login::decode_disconnect, login::encode_disconnect);

        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x00 => KeepAlive (legacy_play::decode_keep_alive, legacy_play::encode_keep_alive);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x00 => KeepAlive (play::decode_keep_alive_varint, play::encode_keep_alive_varint);
        Play Serverbound [Modern1_7_2 ..= Modern1_8]
            0x01 => ChatMessage (legacy_play::decode_chat, legacy_play::encode_chat);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x02 => UseEntity (play::decode_use_entity_v1, play::encode_use_entity_v1);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x02 => UseEntity (play::decode_use_entity_v2, play::encode_use_entity_v2);
        Play Serverbound [Modern1_7_2 ..= Modern1_8]
            0x03 => PlayerOnGround (legacy_play::decode_player_on_ground, legacy_play::encode_player_on_ground);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x04 => PlayerPosition (play::decode_player_position_v1, play::encode_player_position_v1);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x04 => PlayerPosition (play::decode_player_position_v2, play::encode_player_position_v2);
        Play Serverbound [Modern1_7_2 ..= Modern1_8]
            0x05 => PlayerLook (legacy_play::decode_player_look, legacy_play::encode_player_look);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x06 => PlayerPositionLook (play::decode_player_position_look_v1, play::encode_player_position_look_v1);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x06 => PlayerPositionLook (play::decode_player_position_look_v2, play::encode_player_position_look_v2);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x07 => PlayerDigging (legacy_play::decode_player_digging, legacy_play::encode_player_digging);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x07 => PlayerDigging (play::decode_player_digging_v2, play::encode_player_digging_v2);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x08 => BlockPlacement (legacy_play::decode_block_placement_v2, legacy_play::encode_block_placement_v2);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x08 => BlockPlacement (play::decode_block_placement_v3, play::encode_block_placement_v3);
        Play Serverbound [Modern1_7_2 ..= Modern1_8]
            0x09 => HeldItemChange (legacy_play::decode_held_item_change, legacy_play::encode_held_item_change);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x0A => Animation (legacy_play::decode_animation, legacy_play::encode_animation);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x0A => Animation (play::decode_animation_swing, play::encode_animation_swing);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x0B => EntityAction (legacy_play::decode_entity_action_v2, legacy_play::encode_entity_action_v2);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x0B => EntityAction (play::decode_entity_action_v3, play::encode_entity_action_v3);
        Play Serverbound [Modern1_7_2 ..= Modern1_8]
            0x0D => CloseWindow (legacy_play::decode_close_window, legacy_play::encode_close_window);
        Play Serverbound [Modern1_7_2 ..= Modern1_8]
            0x0E => ClickWindow (legacy_play::decode_click_window_v2, legacy_play::encode_click_window_v2);
        Play Serverbound [Modern1_7_2 ..= Modern1_8]
            0x0F => ConfirmTransaction (legacy_play::decode_confirm_transaction, legacy_play::encode_confirm_transaction);
        Play Serverbound [Modern1_7_2 ..= Modern1_8]
            0x10 => CreativeInventoryAction (legacy_play::decode_creative_action_v2, legacy_play::encode_creative_action_v2);
        Play Serverbound [Modern1_7_2 ..= Modern1_8]
            0x11 => EnchantItem (legacy_play::decode_enchant_item, legacy_play::encode_enchant_item);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x12 => UpdateSign (legacy_play::decode_update_sign, legacy_play::encode_update_sign);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x12 => UpdateSign (play::decode_update_sign_v2, play::encode_update_sign_v2);
        Play Serverbound [Modern1_7_2 ..= Modern1_8]
            0x13 => PlayerAbilities (play::decode_abilities, play::encode_abilities);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x14 => TabComplete (legacy_play::decode_tab_complete, legacy_play::encode_tab_complete);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x14 => TabComplete (play::decode_tab_complete_v2, play::encode_tab_complete_v2);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x15 => ClientSettings (play::decode_client_settings_v3, play::encode_client_settings_v3);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x15 => ClientSettings (play::decode_client_settings_v4, play::encode_client_settings_v4);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x16 => ClientStatus (legacy_login::decode_client_status, legacy_login::encode_client_status);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x16 => ClientStatus (play::decode_client_status_varint, play::encode_client_status_varint);
        Play Serverbound [Modern1_7_2 ..= Modern1_7_6]
            0x17 => PluginMessage (legacy_login::decode_plugin_message, legacy_login::encode_plugin_message);
        Play Serverbound [Modern1_8 ..= Modern1_8]
            0x17 => PluginMessage (play::decode_plugin_message_v2, play::encode_plugin_message_v2);
    }
}

#[cfg(test)]
mod tests {
    use blockbridge_network_common::{ConnectionState, Direction, PacketReader, PacketWriter};

    use super::*;
    use crate::{
        common_packets::{pack_position, ItemStack},
        registry::JAVA_PACKETS,
        PacketBlockChange, PacketHandshake, PacketPlayerListItem, PacketPlayerPosition,
        PacketSetSlot, PacketSpawnPlayer, PlayerListAction, PlayerListEntry,
    };

    fn round_trip(
        version: ProtocolVersion,
        state: ConnectionState,
        direction: Direction,
        packet: JavaPacket,
    ) -> JavaPacket {
        let encoder = JAVA_PACKETS.session_table(version, direction.opposite());
        let decoder = JAVA_PACKETS.session_table(version, direction);
        let encoded = encoder.encode(state, &packet).unwrap();
        decoder.decode(state, &encoded).unwrap()
    }

    #[test]
    fn handshake_decodes_next_state() {
        let mut writer = PacketWriter::new(0x00, ProtocolVersion::Modern1_8);
        writer.write_varint(47);
        writer.write_string("localhost").unwrap();
        writer.write_u16(25565);
        writer.write_varint(HANDSHAKE_NEXT_LOGIN);
        let packet = writer.into();

        let table = JAVA_PACKETS.session_table(ProtocolVersion::Modern1_8, Direction::Serverbound);
        assert_eq!(
            table.decode(ConnectionState::Handshaking, &packet).unwrap(),
            PacketHandshake {
                protocol_version: 47,
                username: String::new(),
                host: "localhost".to_string(),
                port: 25565,
                next_state: HANDSHAKE_NEXT_LOGIN,
            }
            .into()
        );
    }

    #[test]
    fn block_change_packs_state_in_1_8() {
        let packet: JavaPacket = PacketBlockChange {
            x: -5,
            y: 70,
            z: 12,
            block_id: 35,
            metadata: 14,
        }
        .into();
        let table = JAVA_PACKETS.session_table(ProtocolVersion::Modern1_8, Direction::Serverbound);
        let encoded = table.encode(ConnectionState::Play, &packet).unwrap();
        let mut reader = PacketReader::from_packet(&encoded, ProtocolVersion::Modern1_8);
        assert_eq!(reader.read_i64().unwrap(), pack_position(-5, 70, 12));
        assert_eq!(reader.read_varint().unwrap(), 35 << 4 | 14);

        for version in [ProtocolVersion::Modern1_7_2, ProtocolVersion::Modern1_8] {
            assert_eq!(
                round_trip(version, ConnectionState::Play, Direction::Clientbound, packet.clone()),
                packet
            );
        }
    }

    #[test]
    fn position_y_follows_era_convention() {
        let mut writer = PacketWriter::new(0x04, ProtocolVersion::Modern1_7_6);
        writer.write_f64(0.5);
        writer.write_f64(64.0);
        writer.write_f64(65.62);
        writer.write_f64(0.5);
        writer.write_bool(true);
        let packet = writer.into();
        let table = JAVA_PACKETS.session_table(ProtocolVersion::Modern1_7_6, Direction::Serverbound);
        match table.decode(ConnectionState::Play, &packet).unwrap() {
            JavaPacket::PlayerPosition(PacketPlayerPosition { y, stance, .. }) => {
                assert_eq!(y, 65.62);
                assert_eq!(stance, 64.0);
            }
            other => panic!("unexpected {:?}", other),
        }

        let mut writer = PacketWriter::new(0x04, ProtocolVersion::Modern1_8);
        writer.write_f64(0.5);
        writer.write_f64(64.0);
        writer.write_f64(0.5);
        writer.write_bool(true);
        let packet = writer.into();
        let table = JAVA_PACKETS.session_table(ProtocolVersion::Modern1_8, Direction::Serverbound);
        match table.decode(ConnectionState::Play, &packet).unwrap() {
            JavaPacket::PlayerPosition(PacketPlayerPosition { y, .. }) => assert_eq!(y, 64.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn spawn_player_identity_by_version() {
        let packet: JavaPacket = PacketSpawnPlayer {
            entity_id: 9,
            uuid: 0x0123_4567_89ab_cdef_0123_4567_89ab_cdef,
            name: "steve".to_string(),
            x: 32,
            y: 64 * 32,
            z: -32,
            yaw: 64,
            pitch: 0,
            current_item: 0,
        }
        .into();
        for version in [ProtocolVersion::Modern1_7_2, ProtocolVersion::Modern1_7_6] {
            assert_eq!(
                round_trip(version, ConnectionState::Play, Direction::Clientbound, packet.clone()),
                packet
            );
        }

        let JavaPacket::SpawnPlayer(decoded) = round_trip(
            ProtocolVersion::Modern1_8,
            ConnectionState::Play,
            Direction::Clientbound,
            packet,
        ) else {
            panic!("expected spawn player");
        };
        assert_eq!(decoded.uuid, 0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        assert!(decoded.name.is_empty());
    }

    #[test]
    fn player_list_actions_in_1_8() {
        let add: JavaPacket = PacketPlayerListItem {
            action: PlayerListAction::Add,
            entries: vec![PlayerListEntry {
                uuid: 7,
                name: "alex".to_string(),
                game_mode: 1,
                ping: 20,
            }],
        }
        .into();
        assert_eq!(
            round_trip(
                ProtocolVersion::Modern1_8,
                ConnectionState::Play,
                Direction::Clientbound,
                add.clone()
            ),
            add
        );

        let remove: JavaPacket = PacketPlayerListItem {
            action: PlayerListAction::Remove,
            entries: vec![PlayerListEntry {
                uuid: 7,
                ..Default::default()
            }],
        }
        .into();
        assert_eq!(
            round_trip(
                ProtocolVersion::Modern1_8,
                ConnectionState::Play,
                Direction::Clientbound,
                remove.clone()
            ),
            remove
        );
    }

    #[test]
    fn slots_carry_raw_nbt_in_1_8() {
        let packet: JavaPacket = PacketSetSlot {
            window_id: 0,
            slot: 36,
            item: Some(ItemStack {
                id: 276,
                count: 1,
                damage: 3,
                tag: Some(vec![0x0a, 0x00, 0x00, 0x00]),
            }),
        }
        .into();
        assert_eq!(
            round_trip(
                ProtocolVersion::Modern1_8,
                ConnectionState::Play,
                Direction::Clientbound,
                packet.clone()
            ),
            packet
        );
    }

    #[test]
    fn set_compression_only_exists_in_1_8() {
        let table = JAVA_PACKETS.session_table(ProtocolVersion::Modern1_7_6, Direction::Serverbound);
        assert!(!table.can_encode(
            ConnectionState::Login,
            crate::JavaPacketKind::SetCompression
        ));
        let table = JAVA_PACKETS.session_table(ProtocolVersion::Modern1_8, Direction::Serverbound);
        assert!(table.can_encode(
            ConnectionState::Login,
            crate::JavaPacketKind::SetCompression
        ));
    }
}
