use bevy::prelude::Component;
use serde::{Deserialize, Serialize};

/// Canonical player position. `y` is always the height of the feet.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    pub fn with_look(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    pub fn block(&self) -> BlockPosition {
        BlockPosition::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    pub fn chunk(&self) -> (i32, i32) {
        self.block().chunk()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn chunk(&self) -> (i32, i32) {
        (self.x.div_euclid(16), self.z.div_euclid(16))
    }

    /// The neighbour touching `face` (0 down, 1 up, 2 -z, 3 +z, 4 -x, 5 +x).
    pub fn offset(&self, face: i8) -> Option<BlockPosition> {
        let (dx, dy, dz) = match face {
            0 => (0, -1, 0),
            1 => (0, 1, 0),
            2 => (0, 0, -1),
            3 => (0, 0, 1),
            4 => (-1, 0, 0),
            5 => (1, 0, 0),
            _ => return None,
        };
        Some(BlockPosition::new(self.x + dx, self.y + dy, self.z + dz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_positions_floor() {
        let position = Position::new(-0.5, 64.9, -16.0);
        assert_eq!(position.block(), BlockPosition::new(-1, 64, -16));
        assert_eq!(position.chunk(), (-1, -1));
    }

    #[test]
    fn faces() {
        let origin = BlockPosition::new(0, 10, 0);
        assert_eq!(origin.offset(1), Some(BlockPosition::new(0, 11, 0)));
        assert_eq!(origin.offset(4), Some(BlockPosition::new(-1, 10, 0)));
        assert_eq!(origin.offset(-1), None);
        assert_eq!(origin.offset(6), None);
    }
}
