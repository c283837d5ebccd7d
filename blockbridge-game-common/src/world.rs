use std::collections::HashMap;

use crossbeam_channel::{Receiver, Sender};
use log::debug;
use thiserror::Error;

use crate::{
    block::{block_ids, is_solid, FILLER, GROUND_COVER},
    chunk::{CHUNK_WIDTH, WORLD_HEIGHT},
    BlockIdentity, BlockPosition, ChunkColumn,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    BlockChanged {
        position: BlockPosition,
        block: BlockIdentity,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("block position {0:?} is outside the world")]
    OutOfBounds(BlockPosition),
}

/// The voxel world as seen by the protocol layer.
pub trait WorldSimulation: Send + Sync {
    fn is_solid_at(&self, x: i32, y: i32, z: i32) -> bool;

    fn block_at(&self, position: BlockPosition) -> BlockIdentity;

    fn set_block(&mut self, position: BlockPosition, block: BlockIdentity)
        -> Result<(), WorldError>;

    /// Y of the topmost natural layer.
    fn surface_depth(&self) -> i32;

    fn column_snapshot(&self, chunk_x: i32, chunk_z: i32) -> ChunkColumn;

    /// Every later block change is sent to the returned receiver.
    fn subscribe(&mut self) -> Receiver<WorldEvent>;
}

/// Bedrock at y 0, filler up to the surface, ground cover on top. Edits are
/// kept as a sparse overlay.
pub struct FlatWorld {
    surface_depth: i32,
    edits: HashMap<BlockPosition, BlockIdentity>,
    subscribers: Vec<Sender<WorldEvent>>,
}

impl FlatWorld {
    pub fn new(surface_depth: i32) -> Self {
        Self {
            surface_depth: surface_depth.clamp(1, WORLD_HEIGHT as i32 - 1),
            edits: HashMap::new(),
            subscribers: Vec::new(),
        }
    }

    fn generated(&self, y: i32) -> BlockIdentity {
        match y {
            0 => BlockIdentity::new(block_ids::BEDROCK),
            y if y > 0 && y < self.surface_depth => FILLER,
            y if y == self.surface_depth => GROUND_COVER,
            _ => BlockIdentity::AIR,
        }
    }

    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }
}

impl WorldSimulation for FlatWorld {
    fn is_solid_at(&self, x: i32, y: i32, z: i32) -> bool {
        is_solid(self.block_at(BlockPosition::new(x, y, z)))
    }

    fn block_at(&self, position: BlockPosition) -> BlockIdentity {
        if position.y < 0 || position.y >= WORLD_HEIGHT as i32 {
            return BlockIdentity::AIR;
        }
        self.edits
            .get(&position)
            .copied()
            .unwrap_or_else(|| self.generated(position.y))
    }

    fn set_block(
        &mut self,
        position: BlockPosition,
        block: BlockIdentity,
    ) -> Result<(), WorldError> {
        if position.y < 0 || position.y >= WORLD_HEIGHT as i32 {
            return Err(WorldError::OutOfBounds(position));
        }
        if self.block_at(position) == block {
            return Ok(());
        }

        if self.generated(position.y) == block {
            self.edits.remove(&position);
        } else {
            self.edits.insert(position, block);
        }

        debug!("block at {:?} is now {:?}", position, block);
        let event = WorldEvent::BlockChanged { position, block };
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
        Ok(())
    }

    fn surface_depth(&self) -> i32 {
        self.surface_depth
    }

    fn column_snapshot(&self, chunk_x: i32, chunk_z: i32) -> ChunkColumn {
        let mut column = ChunkColumn::new(chunk_x, chunk_z);
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in 0..=self.surface_depth as usize {
                    column.set(x, y, z, self.generated(y as i32));
                }
            }
        }

        let base_x = chunk_x * CHUNK_WIDTH as i32;
        let base_z = chunk_z * CHUNK_WIDTH as i32;
        for (position, block) in self.edits.iter() {
            if ChunkColumn::contains_block(chunk_x, chunk_z, position.x, position.z) {
                column.set(
                    (position.x - base_x) as usize,
                    position.y as usize,
                    (position.z - base_z) as usize,
                    *block,
                );
            }
        }
        column
    }

    fn subscribe(&mut self) -> Receiver<WorldEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers() {
        let world = FlatWorld::new(4);
        assert_eq!(
            world.block_at(BlockPosition::new(9, 0, -9)).id,
            block_ids::BEDROCK
        );
        assert_eq!(world.block_at(BlockPosition::new(9, 3, -9)), FILLER);
        assert_eq!(world.block_at(BlockPosition::new(9, 4, -9)), GROUND_COVER);
        assert!(world.block_at(BlockPosition::new(9, 5, -9)).is_air());
        assert!(world.is_solid_at(0, 4, 0));
        assert!(!world.is_solid_at(0, 5, 0));
        assert!(!world.is_solid_at(0, -1, 0));
    }

    #[test]
    fn edits_notify_subscribers() {
        let mut world = FlatWorld::new(4);
        let events = world.subscribe();
        let position = BlockPosition::new(-1, 5, 17);
        world.set_block(position, FILLER).unwrap();
        assert_eq!(
            events.try_recv(),
            Ok(WorldEvent::BlockChanged {
                position,
                block: FILLER
            })
        );

        world.set_block(position, FILLER).unwrap();
        assert!(events.try_recv().is_err());

        world.set_block(position, BlockIdentity::AIR).unwrap();
        assert_eq!(world.edit_count(), 0);
        assert!(events.try_recv().is_ok());
    }

    #[test]
    fn writes_outside_the_world_fail() {
        let mut world = FlatWorld::new(4);
        let position = BlockPosition::new(0, WORLD_HEIGHT as i32, 0);
        assert_eq!(
            world.set_block(position, FILLER),
            Err(WorldError::OutOfBounds(position))
        );
    }

    #[test]
    fn snapshots_include_edits_in_their_column() {
        let mut world = FlatWorld::new(4);
        world
            .set_block(BlockPosition::new(-1, 10, -16), FILLER)
            .unwrap();
        world
            .set_block(BlockPosition::new(0, 10, 0), FILLER)
            .unwrap();

        let column = world.column_snapshot(-1, -1);
        assert_eq!(column.get(15, 10, 0), FILLER);
        assert_eq!(column.get(0, 4, 0), GROUND_COVER);
        assert_eq!(column.get(0, 0, 0).id, block_ids::BEDROCK);
        assert_eq!(column.non_empty_sections(), 0b1);
    }
}
