//! Real-time bridge between a MIDI controller, an on-screen keyboard and a
//! sound-synthesis engine.
//!
//! MIDI input and pointer gestures publish the same raw MIDI messages onto
//! one bus. A single dispatcher applies them to the key registry and queues
//! them for the engine, while the audio callback pulls rendered blocks from
//! the engine without locking.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod messaging;
pub mod ui;

pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
