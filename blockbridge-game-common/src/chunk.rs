use serde::{Deserialize, Serialize};

use crate::BlockIdentity;

pub const CHUNK_WIDTH: usize = 16;
pub const WORLD_HEIGHT: usize = 256;
pub const SECTION_HEIGHT: usize = 16;
pub const SECTION_COUNT: usize = WORLD_HEIGHT / SECTION_HEIGHT;

/// One full-height column of blocks, stored densely as `[x][y][z]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkColumn {
    pub chunk_x: i32,
    pub chunk_z: i32,
    blocks: Vec<BlockIdentity>,
}

fn index(x: usize, y: usize, z: usize) -> usize {
    (x * WORLD_HEIGHT + y) * CHUNK_WIDTH + z
}

impl ChunkColumn {
    pub fn new(chunk_x: i32, chunk_z: i32) -> Self {
        Self {
            chunk_x,
            chunk_z,
            blocks: vec![BlockIdentity::AIR; CHUNK_WIDTH * WORLD_HEIGHT * CHUNK_WIDTH],
        }
    }

    /// Out of range coordinates read as air.
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockIdentity {
        if x >= CHUNK_WIDTH || y >= WORLD_HEIGHT || z >= CHUNK_WIDTH {
            return BlockIdentity::AIR;
        }
        self.blocks[index(x, y, z)]
    }

    /// Returns false when the coordinates are outside the column.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockIdentity) -> bool {
        if x >= CHUNK_WIDTH || y >= WORLD_HEIGHT || z >= CHUNK_WIDTH {
            return false;
        }
        self.blocks[index(x, y, z)] = block;
        true
    }

    pub fn is_section_empty(&self, section_y: usize) -> bool {
        let min_y = section_y * SECTION_HEIGHT;
        let max_y = (min_y + SECTION_HEIGHT).min(WORLD_HEIGHT);
        (0..CHUNK_WIDTH).all(|x| {
            (min_y..max_y).all(|y| (0..CHUNK_WIDTH).all(|z| self.get(x, y, z).is_air()))
        })
    }

    /// Bit `n` set when section `n` holds any non-air block.
    pub fn non_empty_sections(&self) -> u16 {
        (0..SECTION_COUNT)
            .filter(|section_y| !self.is_section_empty(*section_y))
            .fold(0, |mask, section_y| mask | (1 << section_y))
    }

    /// Y of the topmost non-air block at `(x, z)`.
    pub fn highest_block(&self, x: usize, z: usize) -> Option<usize> {
        (0..WORLD_HEIGHT).rev().find(|y| !self.get(x, *y, z).is_air())
    }

    pub fn contains_block(chunk_x: i32, chunk_z: i32, block_x: i32, block_z: i32) -> bool {
        block_x.div_euclid(CHUNK_WIDTH as i32) == chunk_x
            && block_z.div_euclid(CHUNK_WIDTH as i32) == chunk_z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::block_ids;

    #[test]
    fn reads_back_what_was_set() {
        let mut column = ChunkColumn::new(1, -2);
        let block = BlockIdentity::with_data(block_ids::WOOL, 14);
        assert!(column.set(15, 255, 0, block));
        assert_eq!(column.get(15, 255, 0), block);
        assert_eq!(column.get(0, 255, 15), BlockIdentity::AIR);
        assert!(!column.set(16, 0, 0, block));
        assert_eq!(column.get(0, 256, 0), BlockIdentity::AIR);
    }

    #[test]
    fn section_mask_tracks_content() {
        let mut column = ChunkColumn::new(0, 0);
        assert_eq!(column.non_empty_sections(), 0);
        column.set(3, 0, 3, BlockIdentity::new(block_ids::BEDROCK));
        column.set(3, 70, 3, BlockIdentity::new(block_ids::STONE));
        assert_eq!(column.non_empty_sections(), 0b10001);
        assert_eq!(column.highest_block(3, 3), Some(70));
        assert_eq!(column.highest_block(4, 3), None);
    }

    #[test]
    fn block_membership_uses_floor_division() {
        assert!(ChunkColumn::contains_block(-1, 0, -1, 15));
        assert!(!ChunkColumn::contains_block(0, 0, -1, 15));
        assert!(ChunkColumn::contains_block(2, -3, 40, -33));
    }
}
