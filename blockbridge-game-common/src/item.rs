use serde::{Deserialize, Serialize};

use crate::block::{block_ids, FILLER, GROUND_COVER};

pub const HOTBAR_SIZE: usize = 9;
pub const NOMINAL_STACK_SIZE: u8 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: u16,
    pub count: u8,
    pub damage: u16,
}

impl ItemStack {
    pub fn new(id: u16, count: u8) -> Self {
        Self {
            id,
            count,
            damage: 0,
        }
    }
}

/// The stacks every player starts with, and what finite-stack clients are
/// topped back up to.
pub fn nominal_hotbar() -> [ItemStack; HOTBAR_SIZE] {
    [
        GROUND_COVER.id,
        FILLER.id,
        block_ids::STONE,
        block_ids::COBBLESTONE,
        block_ids::PLANKS,
        block_ids::LOG,
        block_ids::GLASS,
        block_ids::BRICK_BLOCK,
        block_ids::SAND,
    ]
    .map(|id| ItemStack::new(id, NOMINAL_STACK_SIZE))
}
