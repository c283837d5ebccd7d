use serde::{Deserialize, Serialize};

use crate::{BlockPosition, Position};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceBlock {
    /// The block that will be filled, already offset from the clicked face.
    pub position: BlockPosition,
    pub item_id: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    Move(Position),
    Chat(String),
    PlaceBlock(PlaceBlock),
    DigBlock(BlockPosition),
}
