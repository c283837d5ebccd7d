mod chat_command_event;

pub use chat_command_event::ChatCommandEvent;
