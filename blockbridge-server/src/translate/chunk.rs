//! Wire layouts of a [`ChunkColumn`]. Every layout is a view of the
//! canonical column; the decoders exist so clients and tests can check a
//! layout against the column it came from.

use std::io::{Read, Write};

use blockbridge_game_common::{
    chunk::{CHUNK_WIDTH, SECTION_COUNT, SECTION_HEIGHT, WORLD_HEIGHT},
    BlockIdentity, ChunkColumn,
};
use blockbridge_network_common::{Packet, PacketError, PacketReader, PacketWriter, ProtocolVersion};
use bytes::{Buf, BufMut};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use thiserror::Error;

use crate::translate::blocks::{from_block_state, to_block_state, BedrockPalette};

/// Height of the single region blob used before 1.2.
pub const FLAT_CHUNK_HEIGHT: usize = 128;

const SECTION_VOLUME: usize = CHUNK_WIDTH * SECTION_HEIGHT * CHUNK_WIDTH;
const BIOME_PLAINS: u8 = 1;
const FULL_SKY_LIGHT: u8 = 0xff;

/// Bedrock columns start at y -64, four sub chunks below the canonical floor.
pub const BEDROCK_SUB_CHUNKS_BELOW_ZERO: usize = 4;
const BEDROCK_SUB_CHUNK_VERSION: u8 = 8;
const BEDROCK_BIOME_STORAGES: usize = 24;
const BEDROCK_PALETTE_BITS: [u32; 8] = [1, 2, 3, 4, 5, 6, 8, 16];

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("chunk compression failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk data is truncated")]
    Truncated,

    #[error("invalid chunk data: {0}")]
    Invalid(&'static str),
}

impl From<PacketError> for ChunkError {
    fn from(error: PacketError) -> Self {
        match error {
            PacketError::UnexpectedEof => ChunkError::Truncated,
            _ => ChunkError::Invalid("malformed sub chunk"),
        }
    }
}

/// Section payload plus the masks that say which sections it holds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectionedChunk {
    pub primary_bitmask: u16,
    pub add_bitmask: u16,
    pub data: Vec<u8>,
}

struct NibbleArray(Vec<u8>);

impl NibbleArray {
    fn new(length: usize, fill: u8) -> Self {
        NibbleArray(vec![fill; length / 2])
    }

    fn set(&mut self, index: usize, value: u8) {
        let byte = &mut self.0[index / 2];
        if index % 2 == 0 {
            *byte = (*byte & 0xf0) | (value & 0x0f);
        } else {
            *byte = (*byte & 0x0f) | ((value & 0x0f) << 4);
        }
    }

    fn get(bytes: &[u8], index: usize) -> u8 {
        let byte = bytes[index / 2];
        if index % 2 == 0 {
            byte & 0x0f
        } else {
            byte >> 4
        }
    }
}

fn zlib_compress(data: &[u8]) -> Result<Vec<u8>, ChunkError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zlib_decompress(data: &[u8], expected: usize) -> Result<Vec<u8>, ChunkError> {
    let mut decompressed = Vec::with_capacity(expected);
    ZlibDecoder::new(data)
        .take(expected as u64 + 1)
        .read_to_end(&mut decompressed)?;
    if decompressed.len() != expected {
        return Err(ChunkError::Invalid("unexpected decompressed length"));
    }
    Ok(decompressed)
}

fn flat_index(x: usize, y: usize, z: usize) -> usize {
    y + z * FLAT_CHUNK_HEIGHT + x * FLAT_CHUNK_HEIGHT * CHUNK_WIDTH
}

fn section_index(x: usize, y: usize, z: usize) -> usize {
    ((y & 0xf) << 8) | (z << 4) | x
}

/// Pre-1.2 region blob: ids, data, block light and sky light for a
/// 16x128x16 box, zlib compressed. Blocks above 127 are dropped.
pub fn encode_flat(
    column: &ChunkColumn,
    to_wire: impl Fn(BlockIdentity) -> BlockIdentity,
) -> Result<Vec<u8>, ChunkError> {
    let volume = CHUNK_WIDTH * FLAT_CHUNK_HEIGHT * CHUNK_WIDTH;
    let mut ids = vec![0u8; volume];
    let mut data = NibbleArray::new(volume, 0);

    for x in 0..CHUNK_WIDTH {
        for z in 0..CHUNK_WIDTH {
            for y in 0..FLAT_CHUNK_HEIGHT {
                let block = to_wire(column.get(x, y, z));
                let index = flat_index(x, y, z);
                ids[index] = block.id as u8;
                data.set(index, block.data);
            }
        }
    }

    let mut raw = Vec::with_capacity(volume * 5 / 2);
    raw.extend_from_slice(&ids);
    raw.extend_from_slice(&data.0);
    raw.extend(std::iter::repeat(0).take(volume / 2));
    raw.extend(std::iter::repeat(FULL_SKY_LIGHT).take(volume / 2));
    zlib_compress(&raw)
}

pub fn decode_flat(chunk_x: i32, chunk_z: i32, compressed: &[u8]) -> Result<ChunkColumn, ChunkError> {
    let volume = CHUNK_WIDTH * FLAT_CHUNK_HEIGHT * CHUNK_WIDTH;
    let raw = zlib_decompress(compressed, volume * 5 / 2)?;
    let (ids, rest) = raw.split_at(volume);

    let mut column = ChunkColumn::new(chunk_x, chunk_z);
    for x in 0..CHUNK_WIDTH {
        for z in 0..CHUNK_WIDTH {
            for y in 0..FLAT_CHUNK_HEIGHT {
                let index = flat_index(x, y, z);
                let block =
                    BlockIdentity::with_data(ids[index] as u16, NibbleArray::get(rest, index));
                column.set(x, y, z, block);
            }
        }
    }
    Ok(column)
}

/// 1.2 to 1.7 sections: byte ids, data, light, sky light and the high
/// "add" nibbles, then biomes, all zlib compressed.
pub fn encode_sections(
    column: &ChunkColumn,
    to_wire: impl Fn(BlockIdentity) -> BlockIdentity,
) -> Result<SectionedChunk, ChunkError> {
    let primary_bitmask = column.non_empty_sections();
    let sections = (0..SECTION_COUNT)
        .filter(|section_y| primary_bitmask & (1 << section_y) != 0)
        .collect::<Vec<_>>();

    let mut ids = Vec::with_capacity(sections.len() * SECTION_VOLUME);
    let mut data = Vec::with_capacity(sections.len() * SECTION_VOLUME / 2);
    let mut add = Vec::new();
    let mut add_bitmask = 0u16;

    for section_y in sections.iter().copied() {
        let mut section_ids = vec![0u8; SECTION_VOLUME];
        let mut section_data = NibbleArray::new(SECTION_VOLUME, 0);
        let mut section_add = NibbleArray::new(SECTION_VOLUME, 0);
        let mut has_add = false;

        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in 0..SECTION_HEIGHT {
                    let block = to_wire(column.get(x, section_y * SECTION_HEIGHT + y, z));
                    let index = section_index(x, y, z);
                    section_ids[index] = block.id as u8;
                    section_data.set(index, block.data);
                    if block.id > 0xff {
                        section_add.set(index, (block.id >> 8) as u8);
                        has_add = true;
                    }
                }
            }
        }

        ids.extend_from_slice(&section_ids);
        data.extend_from_slice(&section_data.0);
        if has_add {
            add_bitmask |= 1 << section_y;
            add.extend_from_slice(&section_add.0);
        }
    }

    let light_length = sections.len() * SECTION_VOLUME / 2;
    let mut raw = Vec::with_capacity(ids.len() + data.len() + light_length * 2 + add.len() + 256);
    raw.extend_from_slice(&ids);
    raw.extend_from_slice(&data);
    raw.extend(std::iter::repeat(0).take(light_length));
    raw.extend(std::iter::repeat(FULL_SKY_LIGHT).take(light_length));
    raw.extend_from_slice(&add);
    raw.extend(std::iter::repeat(BIOME_PLAINS).take(CHUNK_WIDTH * CHUNK_WIDTH));

    Ok(SectionedChunk {
        primary_bitmask,
        add_bitmask,
        data: zlib_compress(&raw)?,
    })
}

pub fn decode_sections(
    chunk_x: i32,
    chunk_z: i32,
    chunk: &SectionedChunk,
) -> Result<ChunkColumn, ChunkError> {
    let count = chunk.primary_bitmask.count_ones() as usize;
    let add_count = chunk.add_bitmask.count_ones() as usize;
    let expected = count * SECTION_VOLUME * 5 / 2 + add_count * SECTION_VOLUME / 2 + 256;
    let raw = zlib_decompress(&chunk.data, expected)?;

    let ids = &raw[..count * SECTION_VOLUME];
    let data = &raw[count * SECTION_VOLUME..count * SECTION_VOLUME * 3 / 2];
    let add_start = count * SECTION_VOLUME * 5 / 2;
    let add = &raw[add_start..add_start + add_count * SECTION_VOLUME / 2];

    let mut column = ChunkColumn::new(chunk_x, chunk_z);
    let mut add_slot = 0;
    for (slot, section_y) in (0..SECTION_COUNT)
        .filter(|section_y| chunk.primary_bitmask & (1 << section_y) != 0)
        .enumerate()
    {
        let section_add = if chunk.add_bitmask & (1 << section_y) != 0 {
            add_slot += 1;
            Some(&add[(add_slot - 1) * SECTION_VOLUME / 2..add_slot * SECTION_VOLUME / 2])
        } else {
            None
        };

        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in 0..SECTION_HEIGHT {
                    let index = section_index(x, y, z);
                    let mut id = ids[slot * SECTION_VOLUME + index] as u16;
                    if let Some(section_add) = section_add {
                        id |= (NibbleArray::get(section_add, index) as u16) << 8;
                    }
                    let meta = NibbleArray::get(&data[slot * SECTION_VOLUME / 2..], index);
                    column.set(
                        x,
                        section_y * SECTION_HEIGHT + y,
                        z,
                        BlockIdentity::with_data(id, meta),
                    );
                }
            }
        }
    }
    Ok(column)
}

/// 1.8 sections: little endian block states, then light and biomes. The
/// frame compression replaces the per-chunk zlib.
pub fn encode_block_states(
    column: &ChunkColumn,
    to_wire: impl Fn(BlockIdentity) -> BlockIdentity,
) -> SectionedChunk {
    let primary_bitmask = column.non_empty_sections();
    let count = primary_bitmask.count_ones() as usize;
    let mut data = Vec::with_capacity(count * SECTION_VOLUME * 3 + 256);

    for section_y in (0..SECTION_COUNT).filter(|section_y| primary_bitmask & (1 << section_y) != 0)
    {
        let mut states = vec![0u16; SECTION_VOLUME];
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in 0..SECTION_HEIGHT {
                    let block = to_wire(column.get(x, section_y * SECTION_HEIGHT + y, z));
                    states[section_index(x, y, z)] = to_block_state(block);
                }
            }
        }
        for state in states {
            data.put_u16_le(state);
        }
    }

    data.extend(std::iter::repeat(0).take(count * SECTION_VOLUME / 2));
    data.extend(std::iter::repeat(FULL_SKY_LIGHT).take(count * SECTION_VOLUME / 2));
    data.extend(std::iter::repeat(BIOME_PLAINS).take(CHUNK_WIDTH * CHUNK_WIDTH));

    SectionedChunk {
        primary_bitmask,
        add_bitmask: 0,
        data,
    }
}

pub fn decode_block_states(
    chunk_x: i32,
    chunk_z: i32,
    chunk: &SectionedChunk,
) -> Result<ChunkColumn, ChunkError> {
    let count = chunk.primary_bitmask.count_ones() as usize;
    if chunk.data.len() != count * SECTION_VOLUME * 3 + 256 {
        return Err(ChunkError::Invalid("unexpected section data length"));
    }

    let mut column = ChunkColumn::new(chunk_x, chunk_z);
    let mut states = &chunk.data[..count * SECTION_VOLUME * 2];
    for section_y in (0..SECTION_COUNT).filter(|section_y| chunk.primary_bitmask & (1 << section_y) != 0)
    {
        let mut section = vec![0u16; SECTION_VOLUME];
        for state in section.iter_mut() {
            *state = states.get_u16_le();
        }
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in 0..SECTION_HEIGHT {
                    column.set(
                        x,
                        section_y * SECTION_HEIGHT + y,
                        z,
                        from_block_state(section[section_index(x, y, z)]),
                    );
                }
            }
        }
    }
    Ok(column)
}

fn bedrock_index(x: usize, y: usize, z: usize) -> usize {
    (x << 8) | (z << 4) | y
}

fn palette_bits(palette_length: usize) -> u32 {
    BEDROCK_PALETTE_BITS
        .iter()
        .copied()
        .find(|bits| palette_length <= 1 << bits)
        .unwrap_or(16)
}

fn write_block_storage(writer: &mut PacketWriter, indices: &[u16], palette: &[u32]) {
    let bits = palette_bits(palette.len());
    let per_word = 32 / bits;
    let words = (SECTION_VOLUME as u32 + per_word - 1) / per_word;

    writer.write_u8(((bits as u8) << 1) | 1);
    for word_index in 0..words {
        let mut word = 0u32;
        for slot in 0..per_word {
            let index = (word_index * per_word + slot) as usize;
            if let Some(value) = indices.get(index) {
                word |= (*value as u32) << (slot * bits);
            }
        }
        writer.write_u32_le(word);
    }

    writer.write_zigzag32(palette.len() as i32);
    for runtime_id in palette {
        writer.write_zigzag32(*runtime_id as i32);
    }
}

fn write_sub_chunk(writer: &mut PacketWriter, indices: &[u16], palette: &[u32]) {
    writer.write_u8(BEDROCK_SUB_CHUNK_VERSION);
    writer.write_u8(1);
    write_block_storage(writer, indices, palette);
}

/// Bedrock sub chunks (version 8, one palette storage each) followed by
/// single-value biome storages and an empty border block list. Returns the
/// sub chunk count for the level chunk packet.
pub fn encode_sub_chunks(
    column: &ChunkColumn,
    palette: &BedrockPalette,
    version: ProtocolVersion,
) -> (u32, Vec<u8>) {
    let mask = column.non_empty_sections();
    let highest = (0..SECTION_COUNT)
        .rev()
        .find(|section_y| mask & (1 << section_y) != 0)
        .map_or(0, |section_y| section_y + 1);

    let mut writer = PacketWriter::new(0, version);
    let empty_indices = vec![0u16; SECTION_VOLUME];
    for _ in 0..BEDROCK_SUB_CHUNKS_BELOW_ZERO {
        write_sub_chunk(&mut writer, &empty_indices, &[palette.air()]);
    }

    for section_y in 0..highest {
        let mut section_palette = vec![palette.air()];
        let mut indices = vec![0u16; SECTION_VOLUME];
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in 0..SECTION_HEIGHT {
                    let runtime_id =
                        palette.runtime_id(column.get(x, section_y * SECTION_HEIGHT + y, z));
                    let slot = match section_palette.iter().position(|id| *id == runtime_id) {
                        Some(slot) => slot,
                        None => {
                            section_palette.push(runtime_id);
                            section_palette.len() - 1
                        }
                    };
                    indices[bedrock_index(x, y, z)] = slot as u16;
                }
            }
        }
        write_sub_chunk(&mut writer, &indices, &section_palette);
    }

    for _ in 0..BEDROCK_BIOME_STORAGES {
        writer.write_u8(1);
        writer.write_zigzag32(BIOME_PLAINS as i32);
    }
    writer.write_u8(0);

    let sub_chunk_count = (BEDROCK_SUB_CHUNKS_BELOW_ZERO + highest) as u32;
    let packet: Packet = writer.into();
    (sub_chunk_count, packet.data.to_vec())
}

fn read_block_storage(reader: &mut PacketReader) -> Result<Vec<u32>, ChunkError> {
    let header = reader.read_u8()?;
    let bits = (header >> 1) as u32;
    if header & 1 == 0 || !BEDROCK_PALETTE_BITS.contains(&bits) {
        return Err(ChunkError::Invalid("unsupported block storage"));
    }

    let per_word = 32 / bits;
    let words = (SECTION_VOLUME as u32 + per_word - 1) / per_word;
    let mut indices = Vec::with_capacity(SECTION_VOLUME);
    for _ in 0..words {
        let word = reader.read_u32_le()?;
        for slot in 0..per_word {
            if indices.len() < SECTION_VOLUME {
                indices.push((word >> (slot * bits)) & ((1u32 << bits) - 1));
            }
        }
    }

    let palette_length = reader.read_zigzag32()?;
    let mut palette = Vec::with_capacity(palette_length.max(0) as usize);
    for _ in 0..palette_length {
        palette.push(reader.read_zigzag32()? as u32);
    }

    indices
        .into_iter()
        .map(|index| {
            palette
                .get(index as usize)
                .copied()
                .ok_or(ChunkError::Invalid("palette index out of range"))
        })
        .collect()
}

pub fn decode_sub_chunks(
    chunk_x: i32,
    chunk_z: i32,
    sub_chunk_count: u32,
    payload: &[u8],
    palette: &BedrockPalette,
    version: ProtocolVersion,
) -> Result<ChunkColumn, ChunkError> {
    let mut reader = PacketReader::new(payload, version);
    let mut column = ChunkColumn::new(chunk_x, chunk_z);

    for sub_chunk in 0..sub_chunk_count as usize {
        if reader.read_u8()? != BEDROCK_SUB_CHUNK_VERSION || reader.read_u8()? != 1 {
            return Err(ChunkError::Invalid("unsupported sub chunk"));
        }
        let runtime_ids = read_block_storage(&mut reader)?;

        let section_y = match sub_chunk.checked_sub(BEDROCK_SUB_CHUNKS_BELOW_ZERO) {
            Some(section_y) if section_y < WORLD_HEIGHT / SECTION_HEIGHT => section_y,
            _ => continue,
        };
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in 0..SECTION_HEIGHT {
                    let runtime_id = runtime_ids[bedrock_index(x, y, z)];
                    let block = palette
                        .block(runtime_id)
                        .ok_or(ChunkError::Invalid("unknown runtime id"))?;
                    column.set(x, section_y * SECTION_HEIGHT + y, z, block);
                }
            }
        }
    }
    Ok(column)
}

#[cfg(test)]
mod tests {
    use blockbridge_game_common::block::{block_ids, MAX_BLOCK_ID};
    use proptest::prelude::*;

    use super::*;
    use crate::translate::blocks::BEDROCK_PALETTE;

    fn column_strategy(max_y: usize) -> impl Strategy<Value = ChunkColumn> {
        prop::collection::vec(
            (
                0..CHUNK_WIDTH,
                0..max_y,
                0..CHUNK_WIDTH,
                0..=MAX_BLOCK_ID,
                0u8..16,
            ),
            0..64,
        )
        .prop_map(move |blocks| {
            let mut column = ChunkColumn::new(3, -7);
            for (x, y, z, id, data) in blocks {
                let data = if id == block_ids::AIR { 0 } else { data };
                column.set(x, y, z, BlockIdentity::with_data(id, data));
            }
            column
        })
    }

    #[test]
    fn flat_layout_indexes_y_fastest() {
        let mut column = ChunkColumn::new(0, 0);
        column.set(1, 2, 3, BlockIdentity::with_data(block_ids::WOOL, 5));
        let raw = zlib_decompress(
            &encode_flat(&column, |block| block).unwrap(),
            CHUNK_WIDTH * FLAT_CHUNK_HEIGHT * CHUNK_WIDTH * 5 / 2,
        )
        .unwrap();
        let index = 2 + 3 * 128 + 2048;
        assert_eq!(raw[index], block_ids::WOOL as u8);
        assert_eq!(raw[32768 + index / 2], 0x50);
    }

    #[test]
    fn flat_layout_drops_blocks_above_its_height() {
        let mut column = ChunkColumn::new(0, 0);
        column.set(0, 200, 0, BlockIdentity::new(block_ids::STONE));
        let decoded = decode_flat(0, 0, &encode_flat(&column, |block| block).unwrap()).unwrap();
        assert!(decoded.get(0, 200, 0).is_air());
    }

    #[test]
    fn sections_use_y_z_x_order() {
        let mut column = ChunkColumn::new(0, 0);
        column.set(1, 17, 2, BlockIdentity::new(block_ids::STONE));
        let chunk = encode_sections(&column, |block| block).unwrap();
        assert_eq!(chunk.primary_bitmask, 0b10);
        assert_eq!(chunk.add_bitmask, 0);

        let raw = zlib_decompress(&chunk.data, SECTION_VOLUME * 5 / 2 + 256).unwrap();
        assert_eq!(raw[(1 << 8) | (2 << 4) | 1], block_ids::STONE as u8);
    }

    #[test]
    fn wide_ids_use_the_add_array() {
        let mut column = ChunkColumn::new(0, 0);
        column.set(0, 0, 0, BlockIdentity::new(0x123));
        let chunk = encode_sections(&column, |block| block).unwrap();
        assert_eq!(chunk.add_bitmask, 1);
        let decoded = decode_sections(0, 0, &chunk).unwrap();
        assert_eq!(decoded.get(0, 0, 0), BlockIdentity::new(0x123));
    }

    #[test]
    fn fallback_mapping_is_applied() {
        let mut column = ChunkColumn::new(0, 0);
        column.set(0, 0, 0, BlockIdentity::new(170));
        let chunk = encode_block_states(&column, |_| BlockIdentity::new(block_ids::STONE));
        let decoded = decode_block_states(0, 0, &chunk).unwrap();
        assert_eq!(decoded.get(0, 0, 0), BlockIdentity::new(block_ids::STONE));
    }

    #[test]
    fn empty_column_has_only_the_floor_padding() {
        let column = ChunkColumn::new(0, 0);
        let (count, payload) =
            encode_sub_chunks(&column, &BEDROCK_PALETTE, ProtocolVersion::Bedrock1_20_0);
        assert_eq!(count, BEDROCK_SUB_CHUNKS_BELOW_ZERO as u32);
        assert_eq!(payload.last(), Some(&0));
    }

    #[test]
    fn palette_widths() {
        assert_eq!(palette_bits(1), 1);
        assert_eq!(palette_bits(3), 2);
        assert_eq!(palette_bits(9), 4);
        assert_eq!(palette_bits(65), 8);
        assert_eq!(palette_bits(257), 16);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn flat_round_trip(column in column_strategy(FLAT_CHUNK_HEIGHT)) {
            let decoded = decode_flat(3, -7, &encode_flat(&column, |block| block).unwrap()).unwrap();
            prop_assert_eq!(decoded, column);
        }

        #[test]
        fn sections_round_trip(column in column_strategy(WORLD_HEIGHT)) {
            let chunk = encode_sections(&column, |block| block).unwrap();
            prop_assert_eq!(decode_sections(3, -7, &chunk).unwrap(), column);
        }

        #[test]
        fn block_states_round_trip(column in column_strategy(WORLD_HEIGHT)) {
            let chunk = encode_block_states(&column, |block| block);
            prop_assert_eq!(decode_block_states(3, -7, &chunk).unwrap(), column);
        }

        #[test]
        fn sub_chunks_round_trip(column in column_strategy(WORLD_HEIGHT)) {
            let version = ProtocolVersion::Bedrock1_19_60;
            let (count, payload) = encode_sub_chunks(&column, &BEDROCK_PALETTE, version);
            let decoded = decode_sub_chunks(3, -7, count, &payload, &BEDROCK_PALETTE, version).unwrap();
            prop_assert_eq!(decoded, column);
        }
    }
}
