use bevy::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Weather {
    pub raining: bool,
    pub thundering: bool,
}
