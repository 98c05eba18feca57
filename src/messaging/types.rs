/// Message shape shared by every event producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeMessage {
    /// Raw MIDI bytes, forwarded to the engine as received.
    Midi(Vec<u8>),
    /// Stop the dispatch thread.
    Shutdown,
}
