use std::time::Duration;

use bevy::prelude::Resource;
use blockbridge_game_common::Position;

#[derive(Resource, Clone, Debug)]
pub struct GameConfig {
    pub surface_depth: i32,
    pub max_build_height: i32,
    pub spawn: Position,
    /// Players whose feet drop below this are put back at spawn.
    pub void_fall_threshold: f64,
    pub view_distance: i32,
    pub max_players: usize,
    pub replenish_window: Duration,
}

impl GameConfig {
    pub fn new(surface_depth: i32) -> Self {
        Self {
            surface_depth,
            max_build_height: 128,
            spawn: Position::new(0.5, (surface_depth + 1) as f64, 0.5),
            void_fall_threshold: -16.0,
            view_distance: 2,
            max_players: 20,
            replenish_window: Duration::from_millis(250),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(4)
    }
}
