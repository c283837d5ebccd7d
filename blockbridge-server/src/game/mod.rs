mod events;
mod game_world;
mod resources;
mod systems;

pub mod components;
pub mod messages;

pub use game_world::GameWorld;
pub use resources::GameConfig;
