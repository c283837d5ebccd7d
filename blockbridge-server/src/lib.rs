#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod config;
pub mod game;
pub mod protocol;
pub mod server;
pub mod translate;
