//! This is a plugin for Bevy game engine to maintain a single, continuously relaxed flow field over a growable grid of chunks, along with a spatial hash of agents for neighbour queries
//!

pub mod error;
pub mod flowfields;
pub mod grid;
pub mod plugin;
pub mod settings;
pub mod spatial;

pub mod prelude;
