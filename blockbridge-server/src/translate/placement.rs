use blockbridge_game_common::{
    block::{is_placeable, FILLER, GROUND_COVER},
    BlockIdentity, BlockPosition,
};
use thiserror::Error;

/// Why a placement left the world untouched. The client is still answered
/// with the block that is really there.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PlacementRejection {
    #[error("item {0} is not a placeable block")]
    NotABlock(i32),

    #[error("{0:?} is outside the build height")]
    OutOfBounds(BlockPosition),
}

/// Every placement is creative: the held item only decides whether a block
/// is placed at all, the target depth decides which one.
pub fn resolve_placement(
    target: BlockPosition,
    item_id: i32,
    surface_depth: i32,
    max_build_height: i32,
) -> Result<BlockIdentity, PlacementRejection> {
    if !is_placeable(item_id) {
        return Err(PlacementRejection::NotABlock(item_id));
    }
    if target.y < 0 || target.y >= max_build_height {
        return Err(PlacementRejection::OutOfBounds(target));
    }

    if target.y == surface_depth {
        Ok(GROUND_COVER)
    } else {
        Ok(FILLER)
    }
}

/// The block a placement fills: the neighbour of the clicked block on the
/// clicked face. Face -1 means the item was used in the air.
pub fn placement_target(clicked: BlockPosition, face: i8) -> Option<BlockPosition> {
    clicked.offset(face)
}

#[cfg(test)]
mod tests {
    use blockbridge_game_common::block::{block_ids, MAX_BLOCK_ID};
    use proptest::prelude::*;

    use super::*;

    const SURFACE: i32 = 4;
    const MAX_HEIGHT: i32 = 128;

    #[test]
    fn items_that_are_not_blocks_are_rejected() {
        let target = BlockPosition::new(0, SURFACE, 0);
        assert_eq!(
            resolve_placement(target, 256, SURFACE, MAX_HEIGHT),
            Err(PlacementRejection::NotABlock(256))
        );
        assert_eq!(
            resolve_placement(target, -1, SURFACE, MAX_HEIGHT),
            Err(PlacementRejection::NotABlock(-1))
        );
        assert_eq!(
            resolve_placement(target, block_ids::AIR as i32, SURFACE, MAX_HEIGHT),
            Err(PlacementRejection::NotABlock(0))
        );
    }

    #[test]
    fn used_in_air_has_no_target() {
        assert_eq!(placement_target(BlockPosition::new(1, 2, 3), -1), None);
        assert_eq!(
            placement_target(BlockPosition::new(1, 2, 3), 1),
            Some(BlockPosition::new(1, 3, 3))
        );
    }

    proptest! {
        #[test]
        fn surface_placements_become_ground_cover(
            x in -1000i32..1000,
            z in -1000i32..1000,
            item in 1..=MAX_BLOCK_ID as i32,
        ) {
            let target = BlockPosition::new(x, SURFACE, z);
            prop_assert_eq!(resolve_placement(target, item, SURFACE, MAX_HEIGHT), Ok(GROUND_COVER));
        }

        #[test]
        fn deeper_placements_become_filler(
            y in 0..SURFACE,
            item in 1..=MAX_BLOCK_ID as i32,
        ) {
            let target = BlockPosition::new(0, y, 0);
            prop_assert_eq!(resolve_placement(target, item, SURFACE, MAX_HEIGHT), Ok(FILLER));
        }

        #[test]
        fn placements_at_the_build_limit_are_rejected(
            y in MAX_HEIGHT..MAX_HEIGHT + 200,
            item in 1..=MAX_BLOCK_ID as i32,
        ) {
            let target = BlockPosition::new(0, y, 0);
            prop_assert_eq!(
                resolve_placement(target, item, SURFACE, MAX_HEIGHT),
                Err(PlacementRejection::OutOfBounds(target))
            );
        }
    }
}
