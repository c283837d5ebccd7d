mod game_client;
mod player_info;

pub use blockbridge_game_common::Position;

pub use game_client::GameClient;
pub use player_info::PlayerInfo;
