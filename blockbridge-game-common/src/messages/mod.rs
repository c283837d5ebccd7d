use serde::{Deserialize, Serialize};

pub mod client;
pub mod server;

/// Non-zero network id of a player entity, shared by every session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub i32);
