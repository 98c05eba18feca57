use thiserror::Error;

/// Failures the bridge can report.
///
/// A missing MIDI controller and a note outside the keyboard are not
/// errors; both are silent states handled where they occur.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("synthesis engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("MIDI access denied: {0}")]
    DeviceAccessDenied(String),

    #[error("failed to connect MIDI input: {0}")]
    MidiConnect(String),

    #[error("audio device error: {0}")]
    AudioDevice(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
