//! The cross-version translator. Everything in here is a pure function of a
//! protocol version and canonical state, so sessions call it from their own
//! tasks without any locking.

pub mod bedrock;
pub mod blocks;
pub mod chunk;
pub mod coords;
pub mod inventory;
pub mod java;
pub mod placement;
