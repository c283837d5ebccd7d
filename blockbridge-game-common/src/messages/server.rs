use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{messages::EntityId, BlockIdentity, BlockPosition, ChunkColumn, Position};

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinError {
    #[error("You are banned from this server")]
    Banned,
    #[error("You have been kicked from this server")]
    Kicked,
    #[error("The server is full")]
    ServerFull,
    #[error("A player with that name is already online")]
    NameInUse,
}

/// What a session needs before it can send its join packet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub entity_id: EntityId,
    pub position: Position,
    pub world_age: i64,
    pub time_of_day: i64,
    pub frozen: bool,
    pub raining: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSpawn {
    pub entity_id: EntityId,
    pub uuid: Uuid,
    pub name: String,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldTime {
    pub world_age: i64,
    pub time_of_day: i64,
    pub frozen: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    ChunkData(Box<ChunkColumn>),
    /// Moves the receiving player. Also marks the end of the join burst.
    Teleport(Position),
    SpawnPlayer(PlayerSpawn),
    RemovePlayer {
        entity_id: EntityId,
        uuid: Uuid,
        name: String,
    },
    MoveEntity {
        entity_id: EntityId,
        position: Position,
    },
    BlockChanged {
        position: BlockPosition,
        block: BlockIdentity,
    },
    Chat(String),
    Time(WorldTime),
    Weather {
        raining: bool,
        thundering: bool,
    },
    Kick(String),
}
