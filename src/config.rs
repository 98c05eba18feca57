use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BridgeError, BridgeResult};

/// Runtime settings for the bridge. The binary always starts from
/// `BridgeConfig::default()`; nothing is read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Frames requested from the engine per render call.
    pub block_size: usize,
    /// Capacity in bytes of the MIDI ring between the routers and the engine.
    pub midi_ring_capacity: usize,
    /// Velocity used for on-screen key presses and releases.
    pub pointer_velocity: u8,
    /// Client name registered with the MIDI subsystem.
    pub client_name: String,
    pub device_poll_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            block_size: 256,
            midi_ring_capacity: 1024,
            pointer_velocity: 64,
            client_name: "keybridge".to_string(),
            device_poll_interval_ms: 1000,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON override; missing fields keep their defaults.
    pub fn from_json(json: &str) -> BridgeResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BridgeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if self.block_size == 0 {
            return Err(BridgeError::InvalidConfig("block_size must be non-zero".into()));
        }
        if self.midi_ring_capacity < 3 {
            return Err(BridgeError::InvalidConfig(
                "midi_ring_capacity must hold at least one message".into(),
            ));
        }
        if self.pointer_velocity > 127 {
            return Err(BridgeError::InvalidConfig(format!(
                "pointer_velocity {} exceeds 127",
                self.pointer_velocity
            )));
        }
        Ok(())
    }

    pub fn device_poll_interval(&self) -> Duration {
        Duration::from_millis(self.device_poll_interval_ms)
    }
}
