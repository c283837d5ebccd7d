use std::collections::HashMap;

use blockbridge_game_common::{
    block::{block_ids, block_name, known_block_ids},
    BlockIdentity,
};
use blockbridge_network_bedrock::common_packets::BlockPaletteEntry;
use blockbridge_network_common::ProtocolVersion;
use lazy_static::lazy_static;

const MAX_BLOCK_DATA: u8 = 0x0f;

/// Highest block id a client of `version` can render.
pub fn highest_block_id(version: ProtocolVersion) -> u16 {
    use ProtocolVersion::*;

    match version {
        Alpha1_0_17 | Alpha1_1_2 => 85,
        Alpha1_2_6 | Beta1_0 | Beta1_1 => 91,
        Beta1_3 => 94,
        Beta1_4 | Beta1_5 => 95,
        Beta1_6 | Beta1_7 => 96,
        Beta1_8 => 109,
        Release1_0 | Release1_1 => 122,
        Release1_2_1 | Release1_2_4 => 124,
        Release1_3_1 => 136,
        Release1_4_2 | Release1_4_4 | Release1_4_6 => 145,
        Release1_5_1 | Release1_5_2 => 158,
        Release1_6_1 | Release1_6_2 | Release1_6_4 => 173,
        Modern1_7_2 | Modern1_7_6 => 175,
        Modern1_8 | Bedrock1_19_30 | Bedrock1_19_60 | Bedrock1_20_0 => 197,
    }
}

/// 1.6 skipped ids that 1.7 and 1.8 filled in later.
fn is_gap(version: ProtocolVersion, id: u16) -> bool {
    if version.is_at_least(ProtocolVersion::Modern1_8) {
        false
    } else if version.is_at_least(ProtocolVersion::Modern1_7_2) {
        (165..=169).contains(&id)
    } else if version.is_at_least(ProtocolVersion::Release1_6_1) {
        (160..=169).contains(&id)
    } else {
        false
    }
}

pub fn is_known_block(version: ProtocolVersion, id: u16) -> bool {
    id <= highest_block_id(version) && !is_gap(version, id)
}

/// The block a client of `version` is shown for `block`. Blocks newer than
/// the client become stone.
pub fn to_wire_block(version: ProtocolVersion, block: BlockIdentity) -> BlockIdentity {
    if is_known_block(version, block.id) {
        block
    } else {
        BlockIdentity::new(block_ids::STONE)
    }
}

/// 1.8 block state: id in the high bits, data in the low nibble.
pub fn to_block_state(block: BlockIdentity) -> u16 {
    (block.id << 4) | (block.data as u16 & 0xf)
}

pub fn from_block_state(state: u16) -> BlockIdentity {
    BlockIdentity::with_data(state >> 4, (state & 0xf) as u8)
}

/// Runtime ids announced to bedrock clients in start game, one per block id
/// and data value. Entries are sorted by name so the numbering never depends
/// on the canonical id order.
pub struct BedrockPalette {
    entries: Vec<BlockPaletteEntry>,
    runtime_ids: HashMap<BlockIdentity, u32>,
    blocks: Vec<BlockIdentity>,
}

impl BedrockPalette {
    fn build() -> Self {
        let mut entries = known_block_ids()
            .filter_map(|id| block_name(id).map(|name| (format!("minecraft:{}", name), id)))
            .flat_map(|(name, id)| {
                (0..=MAX_BLOCK_DATA).map(move |data| {
                    (
                        BlockPaletteEntry::new(name.clone(), data),
                        BlockIdentity::with_data(id, data),
                    )
                })
            })
            .collect::<Vec<_>>();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut runtime_ids = HashMap::with_capacity(entries.len());
        for (runtime_id, (_, block)) in entries.iter().enumerate() {
            runtime_ids.insert(*block, runtime_id as u32);
        }

        Self {
            blocks: entries.iter().map(|(_, block)| *block).collect(),
            entries: entries.into_iter().map(|(entry, _)| entry).collect(),
            runtime_ids,
        }
    }

    pub fn entries(&self) -> &[BlockPaletteEntry] {
        &self.entries
    }

    pub fn air(&self) -> u32 {
        self.runtime_id(BlockIdentity::AIR)
    }

    /// Unknown ids fall back to stone.
    pub fn runtime_id(&self, block: BlockIdentity) -> u32 {
        self.runtime_ids
            .get(&block)
            .or_else(|| self.runtime_ids.get(&BlockIdentity::new(block_ids::STONE)))
            .copied()
            .unwrap_or(0)
    }

    pub fn block(&self, runtime_id: u32) -> Option<BlockIdentity> {
        self.blocks.get(runtime_id as usize).copied()
    }
}

lazy_static! {
    pub static ref BEDROCK_PALETTE: BedrockPalette = BedrockPalette::build();
}

#[cfg(test)]
mod tests {
    use blockbridge_game_common::block::MAX_BLOCK_ID;

    use super::*;

    #[test]
    fn newer_blocks_fall_back_to_stone() {
        let stained_clay = BlockIdentity::with_data(159, 3);
        assert_eq!(
            to_wire_block(ProtocolVersion::Beta1_7, stained_clay),
            BlockIdentity::new(block_ids::STONE)
        );
        assert_eq!(
            to_wire_block(ProtocolVersion::Release1_6_4, stained_clay),
            stained_clay
        );
        assert!(!is_known_block(ProtocolVersion::Release1_6_4, 162));
        assert!(is_known_block(ProtocolVersion::Modern1_7_6, 162));
        assert!(!is_known_block(ProtocolVersion::Modern1_7_6, 165));
        assert!(is_known_block(ProtocolVersion::Modern1_8, MAX_BLOCK_ID));
    }

    #[test]
    fn highest_ids_never_shrink() {
        for pair in ProtocolVersion::ALL.windows(2) {
            assert!(highest_block_id(pair[0]) <= highest_block_id(pair[1]));
        }
    }

    #[test]
    fn block_states_pack_data() {
        let block = BlockIdentity::with_data(block_ids::WOOL, 14);
        assert_eq!(to_block_state(block), (35 << 4) | 14);
        assert_eq!(from_block_state(to_block_state(block)), block);
    }

    #[test]
    fn palette_is_sorted_and_complete() {
        let palette = &*BEDROCK_PALETTE;
        assert_eq!(
            palette.entries().len(),
            (MAX_BLOCK_ID as usize + 1) * (MAX_BLOCK_DATA as usize + 1)
        );
        assert!(palette.entries().windows(2).all(|pair| pair[0] < pair[1]));

        let runtime_id = palette.runtime_id(BlockIdentity::new(block_ids::GRASS));
        assert_eq!(
            palette.entries()[runtime_id as usize],
            BlockPaletteEntry::new("minecraft:grass", 0)
        );
        assert_eq!(
            palette.block(runtime_id),
            Some(BlockIdentity::new(block_ids::GRASS))
        );
        assert_eq!(
            palette.entries()[palette.air() as usize],
            BlockPaletteEntry::new("minecraft:air", 0)
        );
    }

    #[test]
    fn palette_keeps_data_values() {
        let palette = &*BEDROCK_PALETTE;
        let red_wool = BlockIdentity::with_data(block_ids::WOOL, 14);
        let runtime_id = palette.runtime_id(red_wool);
        assert_ne!(runtime_id, palette.runtime_id(BlockIdentity::new(block_ids::WOOL)));
        assert_eq!(
            palette.entries()[runtime_id as usize],
            BlockPaletteEntry::new("minecraft:wool", 14)
        );
        assert_eq!(palette.block(runtime_id), Some(red_wool));

        for data in 0..=MAX_BLOCK_DATA {
            let log = BlockIdentity::with_data(block_ids::LOG, data);
            assert_eq!(palette.block(palette.runtime_id(log)), Some(log));
        }
    }
}
