use blockbridge_network_common::{PacketError, PacketReader, PacketWriter, ProtocolVersion};
use uuid::Uuid;

/// Distance from a player's feet to their eyes.
pub const PLAYER_EYE_HEIGHT: f64 = 1.62;

/// An item as it appears in a slot on the wire. Tags are carried as opaque
/// bytes in the era's own encoding and never interpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemStack {
    pub id: i16,
    pub count: i8,
    pub damage: i16,
    pub tag: Option<Vec<u8>>,
}

impl ItemStack {
    pub fn new(id: i16, count: i8, damage: i16) -> Self {
        Self {
            id,
            count,
            damage,
            tag: None,
        }
    }
}

/// How an era follows a slot's count and damage with an item tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemTagRule {
    None,
    /// Only damageable items carry a length prefixed gzip tag.
    Conditional,
    /// Every item carries a length prefixed gzip tag (-1 for none).
    Unconditional,
    /// Raw uncompressed NBT, a single zero byte for none.
    RawNbt,
}

impl ItemTagRule {
    pub fn for_version(version: ProtocolVersion) -> ItemTagRule {
        if version >= ProtocolVersion::Modern1_8 {
            ItemTagRule::RawNbt
        } else if version >= ProtocolVersion::Release1_3_1 {
            ItemTagRule::Unconditional
        } else if version >= ProtocolVersion::Release1_0 {
            ItemTagRule::Conditional
        } else {
            ItemTagRule::None
        }
    }
}

/// Items whose damage value is wear rather than a subtype: tools, weapons,
/// armour, bow, fishing rod and shears of the 1.0 to 1.2 item list.
pub fn is_nbt_damageable(id: i16) -> bool {
    matches!(
        id,
        256..=259 | 261 | 267..=279 | 283..=286 | 290..=294 | 298..=317 | 346 | 359
    )
}

pub trait PacketReadItemStack {
    fn read_item_stack(&mut self) -> Result<Option<ItemStack>, PacketError>;
    fn read_item_stacks(&mut self) -> Result<Vec<Option<ItemStack>>, PacketError>;
}

pub trait PacketWriteItemStack {
    fn write_item_stack(&mut self, item: Option<&ItemStack>) -> Result<(), PacketError>;
    fn write_item_stacks(&mut self, items: &[Option<ItemStack>]) -> Result<(), PacketError>;
}

impl<'a> PacketReadItemStack for PacketReader<'a> {
    fn read_item_stack(&mut self) -> Result<Option<ItemStack>, PacketError> {
        let id = self.read_i16()?;
        if id < 0 {
            return Ok(None);
        }

        let count = self.read_i8()?;
        let damage = self.read_i16()?;
        let tag = match ItemTagRule::for_version(self.version()) {
            ItemTagRule::None => None,
            ItemTagRule::Conditional if !is_nbt_damageable(id) => None,
            ItemTagRule::Conditional | ItemTagRule::Unconditional => {
                let length = self.read_i16()?;
                if length < 0 {
                    None
                } else {
                    Some(self.read_fixed_length_bytes(length as usize)?.to_vec())
                }
            }
            ItemTagRule::RawNbt => {
                if self.peek_u8()? == 0 {
                    self.read_u8()?;
                    None
                } else {
                    Some(read_raw_nbt(self)?.to_vec())
                }
            }
        };

        Ok(Some(ItemStack {
            id,
            count,
            damage,
            tag,
        }))
    }

    fn read_item_stacks(&mut self) -> Result<Vec<Option<ItemStack>>, PacketError> {
        let count = self.read_i16()?;
        if count < 0 {
            return Err(PacketError::InvalidValue("item count"));
        }
        (0..count).map(|_| self.read_item_stack()).collect()
    }
}

impl PacketWriteItemStack for PacketWriter {
    fn write_item_stack(&mut self, item: Option<&ItemStack>) -> Result<(), PacketError> {
        let item = match item {
            Some(item) if item.id >= 0 => item,
            _ => {
                self.write_i16(-1);
                return Ok(());
            }
        };

        self.write_i16(item.id);
        self.write_i8(item.count);
        self.write_i16(item.damage);
        match ItemTagRule::for_version(self.version()) {
            ItemTagRule::None => {}
            ItemTagRule::Conditional if !is_nbt_damageable(item.id) => {}
            ItemTagRule::Conditional | ItemTagRule::Unconditional => match &item.tag {
                Some(tag) => self.write_short_bytes(tag)?,
                None => self.write_i16(-1),
            },
            ItemTagRule::RawNbt => match &item.tag {
                Some(tag) => self.write_bytes(tag),
                None => self.write_u8(0),
            },
        }
        Ok(())
    }

    fn write_item_stacks(&mut self, items: &[Option<ItemStack>]) -> Result<(), PacketError> {
        if items.len() > i16::MAX as usize {
            return Err(PacketError::InvalidValue("item count"));
        }
        self.write_i16(items.len() as i16);
        for item in items {
            self.write_item_stack(item.as_ref())?;
        }
        Ok(())
    }
}

/// Returns the bytes of one named NBT tag, walking its structure only to
/// find where it ends.
pub fn read_raw_nbt<'a>(reader: &mut PacketReader<'a>) -> Result<&'a [u8], PacketError> {
    let start = reader.position();
    let tag_type = reader.read_u8()?;
    if tag_type != 0 {
        let name_length = reader.read_u16()? as usize;
        reader.read_fixed_length_bytes(name_length)?;
        skip_nbt_payload(reader, tag_type, 0)?;
    }
    let end = reader.position();
    Ok(&reader.data()[start..end])
}

const MAX_NBT_DEPTH: usize = 64;

fn array_length(reader: &mut PacketReader) -> Result<usize, PacketError> {
    let length = reader.read_i32()?;
    if length < 0 {
        Err(PacketError::InvalidValue("nbt array length"))
    } else {
        Ok(length as usize)
    }
}

fn skip_nbt_payload(
    reader: &mut PacketReader,
    tag_type: u8,
    depth: usize,
) -> Result<(), PacketError> {
    if depth > MAX_NBT_DEPTH {
        return Err(PacketError::InvalidValue("nbt depth"));
    }

    match tag_type {
        1 => {
            reader.read_fixed_length_bytes(1)?;
        }
        2 => {
            reader.read_fixed_length_bytes(2)?;
        }
        3 | 5 => {
            reader.read_fixed_length_bytes(4)?;
        }
        4 | 6 => {
            reader.read_fixed_length_bytes(8)?;
        }
        7 => {
            let length = array_length(reader)?;
            reader.read_fixed_length_bytes(length)?;
        }
        8 => {
            let length = reader.read_u16()? as usize;
            reader.read_fixed_length_bytes(length)?;
        }
        9 => {
            let element_type = reader.read_u8()?;
            let length = array_length(reader)?;
            for _ in 0..length {
                skip_nbt_payload(reader, element_type, depth + 1)?;
            }
        }
        10 => loop {
            let child_type = reader.read_u8()?;
            if child_type == 0 {
                break;
            }
            let name_length = reader.read_u16()? as usize;
            reader.read_fixed_length_bytes(name_length)?;
            skip_nbt_payload(reader, child_type, depth + 1)?;
        },
        11 => {
            let length = array_length(reader)?;
            reader.read_fixed_length_bytes(length * 4)?;
        }
        12 => {
            let length = array_length(reader)?;
            reader.read_fixed_length_bytes(length * 8)?;
        }
        _ => return Err(PacketError::InvalidValue("nbt tag type")),
    }
    Ok(())
}

/// Entity metadata terminator.
pub const METADATA_END: u8 = 0x7f;

/// Skips an entity metadata list. This server only ever sends empty lists.
pub fn skip_entity_metadata(reader: &mut PacketReader) -> Result<(), PacketError> {
    loop {
        let header = reader.read_u8()?;
        if header == METADATA_END {
            return Ok(());
        }

        match header >> 5 {
            0 => {
                reader.read_u8()?;
            }
            1 => {
                reader.read_i16()?;
            }
            2 | 3 => {
                reader.read_i32()?;
            }
            4 => {
                reader.read_string()?;
            }
            5 => {
                reader.read_item_stack()?;
            }
            6 | 7 => {
                reader.read_fixed_length_bytes(12)?;
            }
            _ => return Err(PacketError::InvalidValue("metadata type")),
        }
    }
}

/// 1.8 packs block positions into one long: 26 bits x, 12 bits y, 26 bits z.
pub fn pack_position(x: i32, y: i32, z: i32) -> i64 {
    ((x as i64 & 0x3ff_ffff) << 38) | ((y as i64 & 0xfff) << 26) | (z as i64 & 0x3ff_ffff)
}

pub fn unpack_position(value: i64) -> (i32, i32, i32) {
    let x = (value >> 38) as i32;
    let y = ((value << 26) >> 52) as i32;
    let z = ((value << 38) >> 38) as i32;
    (x, y, z)
}

pub trait PacketReadPosition {
    fn read_position(&mut self) -> Result<(i32, i32, i32), PacketError>;
}

pub trait PacketWritePosition {
    fn write_position(&mut self, x: i32, y: i32, z: i32);
}

impl<'a> PacketReadPosition for PacketReader<'a> {
    fn read_position(&mut self) -> Result<(i32, i32, i32), PacketError> {
        Ok(unpack_position(self.read_i64()?))
    }
}

impl PacketWritePosition for PacketWriter {
    fn write_position(&mut self, x: i32, y: i32, z: i32) {
        self.write_i64(pack_position(x, y, z));
    }
}

pub fn uuid_to_string(uuid: u128) -> String {
    Uuid::from_u128(uuid).hyphenated().to_string()
}

pub fn uuid_from_string(value: &str) -> Result<u128, PacketError> {
    Uuid::parse_str(value)
        .map(|uuid| uuid.as_u128())
        .map_err(|_| PacketError::InvalidValue("uuid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbridge_network_common::Packet;

    fn round_trip_item(version: ProtocolVersion, item: Option<ItemStack>) -> Option<ItemStack> {
        let mut writer = PacketWriter::new(0, version);
        writer.write_item_stack(item.as_ref()).unwrap();
        let packet: Packet = writer.into();
        let mut reader = PacketReader::from_packet(&packet, version);
        let decoded = reader.read_item_stack().unwrap();
        assert!(reader.is_empty());
        decoded
    }

    #[test]
    fn empty_slot_is_minus_one() {
        for version in [
            ProtocolVersion::Alpha1_2_6,
            ProtocolVersion::Release1_1,
            ProtocolVersion::Release1_6_4,
            ProtocolVersion::Modern1_8,
        ] {
            assert_eq!(round_trip_item(version, None), None);
        }
    }

    #[test]
    fn tag_rule_by_era() {
        let sword = ItemStack {
            id: 276,
            count: 1,
            damage: 12,
            tag: Some(vec![0x1f, 0x8b, 0x00]),
        };
        let stone = ItemStack {
            id: 1,
            count: 64,
            damage: 0,
            tag: None,
        };

        // No tags at all before 1.0.
        let decoded = round_trip_item(ProtocolVersion::Beta1_8, Some(sword.clone()));
        assert_eq!(decoded.unwrap().tag, None);

        // Conditional eras only carry tags for damageable items.
        assert_eq!(
            round_trip_item(ProtocolVersion::Release1_2_4, Some(sword.clone())),
            Some(sword.clone())
        );
        let mut writer = PacketWriter::new(0, ProtocolVersion::Release1_2_4);
        writer.write_item_stack(Some(&stone)).unwrap();
        assert_eq!(writer.len(), 5);

        // Unconditional eras always carry a length.
        let mut writer = PacketWriter::new(0, ProtocolVersion::Release1_3_1);
        writer.write_item_stack(Some(&stone)).unwrap();
        assert_eq!(writer.len(), 7);
        assert_eq!(
            round_trip_item(ProtocolVersion::Release1_3_1, Some(stone.clone())),
            Some(stone.clone())
        );
        assert_eq!(
            round_trip_item(ProtocolVersion::Modern1_8, Some(stone.clone())),
            Some(stone)
        );
    }

    #[test]
    fn raw_nbt_is_measured_structurally() {
        // compound "" { short "Damage" = 3, list "ench" of 1 compound { } }
        let mut nbt = vec![10, 0, 0];
        nbt.extend_from_slice(&[2, 0, 6]);
        nbt.extend_from_slice(b"Damage");
        nbt.extend_from_slice(&[0, 3]);
        nbt.extend_from_slice(&[9, 0, 4]);
        nbt.extend_from_slice(b"ench");
        nbt.extend_from_slice(&[10, 0, 0, 0, 1, 0]);
        nbt.push(0);

        let item = ItemStack {
            id: 278,
            count: 1,
            damage: 3,
            tag: Some(nbt),
        };
        assert_eq!(
            round_trip_item(ProtocolVersion::Modern1_8, Some(item.clone())),
            Some(item)
        );
    }

    #[test]
    fn positions_pack_with_sign() {
        for (x, y, z) in [(0, 0, 0), (-1, 64, -1), (33554431, 2047, -33554432), (-300, 5, 12)] {
            assert_eq!(unpack_position(pack_position(x, y, z)), (x, y, z));
        }
    }

    #[test]
    fn uuid_strings_round_trip() {
        let uuid = 0x0123_4567_89ab_cdef_0123_4567_89ab_cdefu128;
        let text = uuid_to_string(uuid);
        assert_eq!(text, "01234567-89ab-cdef-0123-456789abcdef");
        assert_eq!(uuid_from_string(&text).unwrap(), uuid);
    }
}
