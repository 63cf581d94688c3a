//! Arcade shooter built on a generic object-pooling engine.
//!
//! `pooling` holds the engine, `plugins` the game features that run on it and
//! `game` the app composition shared by the binary and the integration tests.

pub mod common;
pub mod game;
pub mod plugins;
pub mod pooling;
