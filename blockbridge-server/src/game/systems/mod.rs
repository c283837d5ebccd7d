mod chat_commands_system;
mod client_messages_system;
mod control_server_system;
mod server_messages_system;
mod void_fall_system;
mod world_events_system;
mod world_time_system;

pub use chat_commands_system::chat_commands_system;
pub use client_messages_system::client_messages_system;
pub use control_server_system::control_server_system;
pub use server_messages_system::server_messages_system;
pub use void_fall_system::void_fall_system;
pub use world_events_system::world_events_system;
pub use world_time_system::world_time_system;
