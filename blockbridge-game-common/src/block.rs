use serde::{Deserialize, Serialize};

/// A canonical block: classic numeric id plus the 4-bit auxiliary value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockIdentity {
    pub id: u16,
    pub data: u8,
}

impl BlockIdentity {
    pub const AIR: BlockIdentity = BlockIdentity::new(block_ids::AIR);

    pub const fn new(id: u16) -> Self {
        Self { id, data: 0 }
    }

    pub const fn with_data(id: u16, data: u8) -> Self {
        Self {
            id,
            data: data & 0x0f,
        }
    }

    pub fn is_air(&self) -> bool {
        self.id == block_ids::AIR
    }

    pub fn name(&self) -> Option<&'static str> {
        block_name(self.id)
    }
}

pub mod block_ids {
    pub const AIR: u16 = 0;
    pub const STONE: u16 = 1;
    pub const GRASS: u16 = 2;
    pub const DIRT: u16 = 3;
    pub const COBBLESTONE: u16 = 4;
    pub const PLANKS: u16 = 5;
    pub const BEDROCK: u16 = 7;
    pub const SAND: u16 = 12;
    pub const LOG: u16 = 17;
    pub const GLASS: u16 = 20;
    pub const WOOL: u16 = 35;
    pub const BRICK_BLOCK: u16 = 45;
    pub const BOOKSHELF: u16 = 47;
}

/// Placements collapse to this at the surface.
pub const GROUND_COVER: BlockIdentity = BlockIdentity::new(block_ids::GRASS);

/// Placements collapse to this below the surface.
pub const FILLER: BlockIdentity = BlockIdentity::new(block_ids::DIRT);

static BLOCK_NAMES: [&str; 198] = [
    "air",
    "stone",
    "grass",
    "dirt",
    "cobblestone",
    "planks",
    "sapling",
    "bedrock",
    "flowing_water",
    "water",
    "flowing_lava",
    "lava",
    "sand",
    "gravel",
    "gold_ore",
    "iron_ore",
    "coal_ore",
    "log",
    "leaves",
    "sponge",
    "glass",
    "lapis_ore",
    "lapis_block",
    "dispenser",
    "sandstone",
    "noteblock",
    "bed",
    "golden_rail",
    "detector_rail",
    "sticky_piston",
    "web",
    "tallgrass",
    "deadbush",
    "piston",
    "piston_head",
    "wool",
    "piston_extension",
    "yellow_flower",
    "red_flower",
    "brown_mushroom",
    "red_mushroom",
    "gold_block",
    "iron_block",
    "double_stone_slab",
    "stone_slab",
    "brick_block",
    "tnt",
    "bookshelf",
    "mossy_cobblestone",
    "obsidian",
    "torch",
    "fire",
    "mob_spawner",
    "oak_stairs",
    "chest",
    "redstone_wire",
    "diamond_ore",
    "diamond_block",
    "crafting_table",
    "wheat",
    "farmland",
    "furnace",
    "lit_furnace",
    "standing_sign",
    "wooden_door",
    "ladder",
    "rail",
    "stone_stairs",
    "wall_sign",
    "lever",
    "stone_pressure_plate",
    "iron_door",
    "wooden_pressure_plate",
    "redstone_ore",
    "lit_redstone_ore",
    "unlit_redstone_torch",
    "redstone_torch",
    "stone_button",
    "snow_layer",
    "ice",
    "snow",
    "cactus",
    "clay",
    "reeds",
    "jukebox",
    "fence",
    "pumpkin",
    "netherrack",
    "soul_sand",
    "glowstone",
    "portal",
    "lit_pumpkin",
    "cake",
    "unpowered_repeater",
    "powered_repeater",
    "stained_glass",
    "trapdoor",
    "monster_egg",
    "stonebrick",
    "brown_mushroom_block",
    "red_mushroom_block",
    "iron_bars",
    "glass_pane",
    "melon_block",
    "pumpkin_stem",
    "melon_stem",
    "vine",
    "fence_gate",
    "brick_stairs",
    "stone_brick_stairs",
    "mycelium",
    "waterlily",
    "nether_brick",
    "nether_brick_fence",
    "nether_brick_stairs",
    "nether_wart",
    "enchanting_table",
    "brewing_stand",
    "cauldron",
    "end_portal",
    "end_portal_frame",
    "end_stone",
    "dragon_egg",
    "redstone_lamp",
    "lit_redstone_lamp",
    "double_wooden_slab",
    "wooden_slab",
    "cocoa",
    "sandstone_stairs",
    "emerald_ore",
    "ender_chest",
    "tripwire_hook",
    "tripwire",
    "emerald_block",
    "spruce_stairs",
    "birch_stairs",
    "jungle_stairs",
    "command_block",
    "beacon",
    "cobblestone_wall",
    "flower_pot",
    "carrots",
    "potatoes",
    "wooden_button",
    "skull",
    "anvil",
    "trapped_chest",
    "light_weighted_pressure_plate",
    "heavy_weighted_pressure_plate",
    "unpowered_comparator",
    "powered_comparator",
    "daylight_detector",
    "redstone_block",
    "quartz_ore",
    "hopper",
    "quartz_block",
    "quartz_stairs",
    "activator_rail",
    "dropper",
    "stained_hardened_clay",
    "stained_glass_pane",
    "leaves2",
    "log2",
    "acacia_stairs",
    "dark_oak_stairs",
    "slime",
    "barrier",
    "iron_trapdoor",
    "prismarine",
    "sea_lantern",
    "hay_block",
    "carpet",
    "hardened_clay",
    "coal_block",
    "packed_ice",
    "double_plant",
    "standing_banner",
    "wall_banner",
    "daylight_detector_inverted",
    "red_sandstone",
    "red_sandstone_stairs",
    "double_stone_slab2",
    "stone_slab2",
    "spruce_fence_gate",
    "birch_fence_gate",
    "jungle_fence_gate",
    "dark_oak_fence_gate",
    "acacia_fence_gate",
    "spruce_fence",
    "birch_fence",
    "jungle_fence",
    "dark_oak_fence",
    "acacia_fence",
    "spruce_door",
    "birch_door",
    "jungle_door",
    "acacia_door",
    "dark_oak_door",
];

/// Highest id the canonical model knows. Everything from 256 up is an item.
pub const MAX_BLOCK_ID: u16 = (BLOCK_NAMES.len() - 1) as u16;

pub fn block_name(id: u16) -> Option<&'static str> {
    BLOCK_NAMES.get(id as usize).copied()
}

/// Ids in the canonical block table, air included.
pub fn known_block_ids() -> impl Iterator<Item = u16> {
    0..=MAX_BLOCK_ID
}

/// True for item ids that name a block a player could place.
pub fn is_placeable(item_id: i32) -> bool {
    item_id > block_ids::AIR as i32 && item_id <= MAX_BLOCK_ID as i32
}

/// Blocks a player cannot stand inside.
pub fn is_solid(block: BlockIdentity) -> bool {
    !matches!(
        block_name(block.id),
        None | Some(
            "air"
                | "flowing_water"
                | "water"
                | "flowing_lava"
                | "lava"
                | "sapling"
                | "tallgrass"
                | "deadbush"
                | "yellow_flower"
                | "red_flower"
                | "brown_mushroom"
                | "red_mushroom"
                | "torch"
                | "fire"
                | "redstone_wire"
                | "wheat"
                | "reeds"
                | "portal"
                | "vine"
                | "snow_layer"
                | "carpet"
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_classic_ids() {
        assert_eq!(block_name(block_ids::STONE), Some("stone"));
        assert_eq!(block_name(block_ids::BEDROCK), Some("bedrock"));
        assert_eq!(block_name(block_ids::WOOL), Some("wool"));
        assert_eq!(block_name(block_ids::BOOKSHELF), Some("bookshelf"));
        assert_eq!(block_name(85), Some("fence"));
        assert_eq!(block_name(137), Some("command_block"));
        assert_eq!(block_name(MAX_BLOCK_ID), Some("dark_oak_door"));
        assert_eq!(block_name(MAX_BLOCK_ID + 1), None);
    }

    #[test]
    fn only_block_items_are_placeable() {
        assert!(!is_placeable(-1));
        assert!(!is_placeable(0));
        assert!(is_placeable(1));
        assert!(is_placeable(MAX_BLOCK_ID as i32));
        assert!(!is_placeable(256));
        assert!(!is_placeable(280));
    }

    #[test]
    fn solidity() {
        assert!(is_solid(GROUND_COVER));
        assert!(is_solid(FILLER));
        assert!(!is_solid(BlockIdentity::AIR));
        assert!(!is_solid(BlockIdentity::new(9)));
        assert!(!is_solid(BlockIdentity::new(250)));
    }

    #[test]
    fn data_is_a_nibble() {
        assert_eq!(BlockIdentity::with_data(35, 0x1e).data, 0x0e);
    }
}
