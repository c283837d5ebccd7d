mod block_world;
mod control_channel;
mod game_config;
mod player_list;
mod policy;
mod server_messages;
mod weather;
mod world_time;

pub use block_world::BlockWorld;
pub use control_channel::ControlChannel;
pub use game_config::GameConfig;
pub use player_list::PlayerList;
pub use policy::Policy;
pub use server_messages::{PendingMessage, ServerMessages};
pub use weather::Weather;
pub use world_time::{WorldTime, TICKS_PER_DAY, TICKS_PER_SECOND, TICK_DURATION};
