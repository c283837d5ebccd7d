use blockbridge_network_common::{PacketError, PacketReader, PacketWriter, ProtocolVersion};

const NBT_TAG_END: u8 = 0x00;
const NBT_TAG_INT: u8 = 0x03;
const NBT_TAG_COMPOUND: u8 = 0x0a;

const BLOCK_STATE_DATA: &str = "data";

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// One block of the start game palette. The entry's index is its runtime id.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlockPaletteEntry {
    pub name: String,
    pub data: u8,
}

impl BlockPaletteEntry {
    pub fn new(name: impl Into<String>, data: u8) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkItem {
    pub id: i32,
    pub count: u16,
    pub metadata: u32,
    pub stack_id: Option<i32>,
    pub block_runtime_id: i32,
    /// Item NBT and can-place/can-break lists, kept opaque.
    pub extra: Vec<u8>,
}

impl NetworkItem {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.id == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skin {
    pub skin_id: String,
    pub play_fab_id: String,
    pub resource_patch: String,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub geometry: String,
    pub full_id: String,
    pub arm_size: String,
    pub colour: String,
}

impl Skin {
    /// A fully transparent 64x64 humanoid skin, for players whose client
    /// sent nothing usable.
    pub fn blank(skin_id: &str) -> Self {
        Self {
            skin_id: skin_id.to_string(),
            play_fab_id: String::new(),
            resource_patch: r#"{"geometry":{"default":"geometry.humanoid.custom"}}"#.to_string(),
            width: 64,
            height: 64,
            data: vec![0; 64 * 64 * 4],
            geometry: String::new(),
            full_id: skin_id.to_string(),
            arm_size: "wide".to_string(),
            colour: "#0".to_string(),
        }
    }
}

pub trait PacketReadBedrock {
    fn read_vec3(&mut self) -> Result<Vec3, PacketError>;
    fn read_block_pos(&mut self) -> Result<BlockPos, PacketError>;
    fn read_unsigned_block_pos(&mut self) -> Result<BlockPos, PacketError>;
    fn read_network_item(&mut self) -> Result<NetworkItem, PacketError>;
    fn read_empty_compound(&mut self) -> Result<(), PacketError>;
    fn read_block_palette_entry(&mut self) -> Result<BlockPaletteEntry, PacketError>;
    fn read_skin(&mut self) -> Result<Skin, PacketError>;
}

pub trait PacketWriteBedrock {
    fn write_vec3(&mut self, value: Vec3);
    fn write_block_pos(&mut self, value: BlockPos);
    fn write_unsigned_block_pos(&mut self, value: BlockPos);
    fn write_network_item(&mut self, item: &NetworkItem);
    fn write_empty_compound(&mut self);
    fn write_block_palette_entry(&mut self, entry: &BlockPaletteEntry) -> Result<(), PacketError>;
    fn write_skin(&mut self, skin: &Skin) -> Result<(), PacketError>;
}

impl<'a> PacketReadBedrock for PacketReader<'a> {
    fn read_vec3(&mut self) -> Result<Vec3, PacketError> {
        Ok(Vec3 {
            x: self.read_f32_le()?,
            y: self.read_f32_le()?,
            z: self.read_f32_le()?,
        })
    }

    fn read_block_pos(&mut self) -> Result<BlockPos, PacketError> {
        Ok(BlockPos {
            x: self.read_zigzag32()?,
            y: self.read_zigzag32()?,
            z: self.read_zigzag32()?,
        })
    }

    fn read_unsigned_block_pos(&mut self) -> Result<BlockPos, PacketError> {
        Ok(BlockPos {
            x: self.read_zigzag32()?,
            y: self.read_varuint32()? as i32,
            z: self.read_zigzag32()?,
        })
    }

    fn read_network_item(&mut self) -> Result<NetworkItem, PacketError> {
        let id = self.read_zigzag32()?;
        if id == 0 {
            return Ok(NetworkItem::empty());
        }

        let count = self.read_u16_le()?;
        let metadata = self.read_varuint32()?;
        let stack_id = if self.read_bool()? {
            Some(self.read_zigzag32()?)
        } else {
            None
        };
        let block_runtime_id = self.read_zigzag32()?;
        let extra = self.read_varint_bytes()?.to_vec();

        Ok(NetworkItem {
            id,
            count,
            metadata,
            stack_id,
            block_runtime_id,
            extra,
        })
    }

    fn read_empty_compound(&mut self) -> Result<(), PacketError> {
        if self.read_u8()? != NBT_TAG_COMPOUND {
            return Err(PacketError::InvalidValue("nbt compound"));
        }
        let name_length = self.read_varuint32()? as usize;
        self.read_fixed_length_bytes(name_length)?;
        if self.read_u8()? != NBT_TAG_END {
            return Err(PacketError::InvalidValue("nbt compound"));
        }
        Ok(())
    }

    /// Name followed by a states compound holding a single int tag.
    fn read_block_palette_entry(&mut self) -> Result<BlockPaletteEntry, PacketError> {
        let name = self.read_string()?;
        if self.read_u8()? != NBT_TAG_COMPOUND {
            return Err(PacketError::InvalidValue("block states"));
        }
        let root_name_length = self.read_varuint32()? as usize;
        self.read_fixed_length_bytes(root_name_length)?;
        if self.read_u8()? != NBT_TAG_INT || self.read_string()? != BLOCK_STATE_DATA {
            return Err(PacketError::InvalidValue("block states"));
        }
        let data = u8::try_from(self.read_zigzag32()?)
            .map_err(|_| PacketError::InvalidValue("block data"))?;
        if self.read_u8()? != NBT_TAG_END {
            return Err(PacketError::InvalidValue("block states"));
        }
        Ok(BlockPaletteEntry { name, data })
    }

    fn read_skin(&mut self) -> Result<Skin, PacketError> {
        let skin_id = self.read_string()?;
        let play_fab_id = self.read_string()?;
        let resource_patch = self.read_string()?;
        let width = self.read_u32_le()?;
        let height = self.read_u32_le()?;
        let data = self.read_varint_bytes()?.to_vec();
        if self.read_u32_le()? != 0 {
            return Err(PacketError::InvalidValue("skin animations"));
        }
        let _cape_width = self.read_u32_le()?;
        let _cape_height = self.read_u32_le()?;
        let _cape_data = self.read_varint_bytes()?;
        let geometry = self.read_string()?;
        let _geometry_engine_version = self.read_string()?;
        let _animation_data = self.read_string()?;
        let _cape_id = self.read_string()?;
        let full_id = self.read_string()?;
        let arm_size = self.read_string()?;
        let colour = self.read_string()?;
        if self.read_u32_le()? != 0 || self.read_u32_le()? != 0 {
            return Err(PacketError::InvalidValue("persona pieces"));
        }
        let _premium = self.read_bool()?;
        let _persona = self.read_bool()?;
        let _cape_on_classic = self.read_bool()?;
        let _primary_user = self.read_bool()?;
        if self.version().is_at_least(ProtocolVersion::Bedrock1_19_60) {
            let _override_appearance = self.read_bool()?;
        }

        Ok(Skin {
            skin_id,
            play_fab_id,
            resource_patch,
            width,
            height,
            data,
            geometry,
            full_id,
            arm_size,
            colour,
        })
    }
}

impl PacketWriteBedrock for PacketWriter {
    fn write_vec3(&mut self, value: Vec3) {
        self.write_f32_le(value.x);
        self.write_f32_le(value.y);
        self.write_f32_le(value.z);
    }

    fn write_block_pos(&mut self, value: BlockPos) {
        self.write_zigzag32(value.x);
        self.write_zigzag32(value.y);
        self.write_zigzag32(value.z);
    }

    fn write_unsigned_block_pos(&mut self, value: BlockPos) {
        self.write_zigzag32(value.x);
        self.write_varuint32(value.y as u32);
        self.write_zigzag32(value.z);
    }

    fn write_network_item(&mut self, item: &NetworkItem) {
        self.write_zigzag32(item.id);
        if item.is_empty() {
            return;
        }

        self.write_u16_le(item.count);
        self.write_varuint32(item.metadata);
        match item.stack_id {
            Some(stack_id) => {
                self.write_bool(true);
                self.write_zigzag32(stack_id);
            }
            None => self.write_bool(false),
        }
        self.write_zigzag32(item.block_runtime_id);
        self.write_varint_bytes(&item.extra);
    }

    fn write_empty_compound(&mut self) {
        self.write_u8(NBT_TAG_COMPOUND);
        self.write_varuint32(0);
        self.write_u8(NBT_TAG_END);
    }

    fn write_block_palette_entry(&mut self, entry: &BlockPaletteEntry) -> Result<(), PacketError> {
        self.write_string(&entry.name)?;
        self.write_u8(NBT_TAG_COMPOUND);
        self.write_varuint32(0);
        self.write_u8(NBT_TAG_INT);
        self.write_string(BLOCK_STATE_DATA)?;
        self.write_zigzag32(entry.data as i32);
        self.write_u8(NBT_TAG_END);
        Ok(())
    }

    fn write_skin(&mut self, skin: &Skin) -> Result<(), PacketError> {
        self.write_string(&skin.skin_id)?;
        self.write_string(&skin.play_fab_id)?;
        self.write_string(&skin.resource_patch)?;
        self.write_u32_le(skin.width);
        self.write_u32_le(skin.height);
        self.write_varint_bytes(&skin.data);
        self.write_u32_le(0);
        self.write_u32_le(0);
        self.write_u32_le(0);
        self.write_varint_bytes(&[]);
        self.write_string(&skin.geometry)?;
        self.write_string("0.0.0")?;
        self.write_string("")?;
        self.write_string("")?;
        self.write_string(&skin.full_id)?;
        self.write_string(&skin.arm_size)?;
        self.write_string(&skin.colour)?;
        self.write_u32_le(0);
        self.write_u32_le(0);
        self.write_bool(false);
        self.write_bool(false);
        self.write_bool(false);
        self.write_bool(true);
        if self.version().is_at_least(ProtocolVersion::Bedrock1_19_60) {
            self.write_bool(false);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use blockbridge_network_common::Packet;

    use super::*;

    #[test]
    fn unsigned_block_pos_keeps_height_unsigned() {
        let mut writer = PacketWriter::new(0, ProtocolVersion::Bedrock1_19_30);
        writer.write_unsigned_block_pos(BlockPos::new(-3, 64, 7));
        let packet: Packet = writer.into();
        // zigzag(-3) = 5, plain 64, zigzag(7) = 14
        assert_eq!(&packet.data[..], &[5, 64, 14]);

        let mut reader = PacketReader::from_packet(&packet, ProtocolVersion::Bedrock1_19_30);
        assert_eq!(
            reader.read_unsigned_block_pos().unwrap(),
            BlockPos::new(-3, 64, 7)
        );
    }

    #[test]
    fn empty_item_is_a_single_zero() {
        let mut writer = PacketWriter::new(0, ProtocolVersion::Bedrock1_20_0);
        writer.write_network_item(&NetworkItem::empty());
        let packet: Packet = writer.into();
        assert_eq!(&packet.data[..], &[0]);
    }

    #[test]
    fn item_with_stack_id() {
        let item = NetworkItem {
            id: 5,
            count: 64,
            metadata: 2,
            stack_id: Some(-9),
            block_runtime_id: 1234,
            extra: vec![0, 0],
        };
        let mut writer = PacketWriter::new(0, ProtocolVersion::Bedrock1_20_0);
        writer.write_network_item(&item);
        let packet: Packet = writer.into();
        let mut reader = PacketReader::from_packet(&packet, ProtocolVersion::Bedrock1_20_0);
        assert_eq!(reader.read_network_item().unwrap(), item);
        assert!(reader.is_empty());
    }

    #[test]
    fn skin_layout_depends_on_version() {
        let skin = Skin::blank("steve");
        for version in [
            ProtocolVersion::Bedrock1_19_30,
            ProtocolVersion::Bedrock1_19_60,
        ] {
            let mut writer = PacketWriter::new(0, version);
            writer.write_skin(&skin).unwrap();
            let packet: Packet = writer.into();
            let mut reader = PacketReader::from_packet(&packet, version);
            assert_eq!(reader.read_skin().unwrap(), skin);
            assert!(reader.is_empty(), "{} left bytes", version);
        }
    }

    #[test]
    fn palette_entry_carries_its_data_state() {
        let entry = BlockPaletteEntry::new("minecraft:wool", 14);
        let mut writer = PacketWriter::new(0, ProtocolVersion::Bedrock1_20_0);
        writer.write_block_palette_entry(&entry).unwrap();
        let packet: Packet = writer.into();

        let mut reader = PacketReader::from_packet(&packet, ProtocolVersion::Bedrock1_20_0);
        assert_eq!(reader.read_block_palette_entry().unwrap(), entry);
        assert!(reader.is_empty());
    }

    #[test]
    fn compound_must_be_closed() {
        let packet = Packet::new(0, vec![NBT_TAG_COMPOUND, 0, 0x01]);
        let mut reader = PacketReader::from_packet(&packet, ProtocolVersion::Bedrock1_19_30);
        assert!(reader.read_empty_compound().is_err());
    }
}
