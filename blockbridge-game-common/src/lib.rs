//! Version independent model of the world and its players. Nothing in here
//! knows about wire formats.

pub mod block;
pub mod chunk;
mod item;
pub mod messages;
mod player;
pub mod policy;
mod position;
pub mod world;

pub use block::BlockIdentity;
pub use chunk::ChunkColumn;
pub use item::{nominal_hotbar, ItemStack, HOTBAR_SIZE, NOMINAL_STACK_SIZE};
pub use player::{is_valid_player_name, offline_player_uuid};
pub use policy::{PlayerLists, PlayerPolicy, PolicyError};
pub use position::{BlockPosition, Position};
pub use world::{FlatWorld, WorldError, WorldEvent, WorldSimulation};
