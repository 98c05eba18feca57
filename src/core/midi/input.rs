use log::warn;
use midir::{MidiInput, MidiInputConnection};

use super::router::{MidiCallback, MidiInputHost};
use crate::error::{BridgeError, BridgeResult};

/// MIDI inputs as seen through `midir`.
pub struct MidirHost {
    client_name: String,
    enumerator: MidiInput,
}

impl MidirHost {
    /// Open the MIDI subsystem. Failure means the host refused access.
    pub fn open(client_name: &str) -> BridgeResult<Self> {
        let enumerator = MidiInput::new(client_name)
            .map_err(|e| BridgeError::DeviceAccessDenied(e.to_string()))?;
        Ok(Self {
            client_name: client_name.to_string(),
            enumerator,
        })
    }

    /// Open the subsystem, logging and absorbing a refusal.
    pub fn open_or_log(client_name: &str) -> Option<Self> {
        match Self::open(client_name) {
            Ok(host) => Some(host),
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }
}

impl MidiInputHost for MidirHost {
    type Binding = MidiInputConnection<()>;

    fn port_names(&self) -> Vec<String> {
        self.enumerator
            .ports()
            .iter()
            .filter_map(|port| self.enumerator.port_name(port).ok())
            .collect()
    }

    fn connect(&mut self, port_name: &str, mut callback: MidiCallback) -> BridgeResult<Self::Binding> {
        // `connect` consumes the client, so each binding gets its own.
        let midi_in = MidiInput::new(&self.client_name)
            .map_err(|e| BridgeError::MidiConnect(format!("failed to create MIDI input: {}", e)))?;

        let port = midi_in
            .ports()
            .into_iter()
            .find(|port| {
                midi_in
                    .port_name(port)
                    .map(|name| name == port_name)
                    .unwrap_or(false)
            })
            .ok_or_else(|| BridgeError::MidiConnect(format!("MIDI port '{}' not found", port_name)))?;

        midi_in
            .connect(
                &port,
                "keybridge-input",
                move |_stamp, message, _| callback(message),
                (),
            )
            .map_err(|e| BridgeError::MidiConnect(format!("'{}': {}", port_name, e)))
    }
}
