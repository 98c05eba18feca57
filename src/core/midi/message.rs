use crate::core::note::{key_to_note, note_to_key};

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;

/// Status class of a channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiStatus {
    NoteOn,
    NoteOff,
    /// Anything else; carried through untouched.
    Other(u8),
}

impl MidiStatus {
    pub fn from_byte(status: u8) -> Self {
        match status & 0xF0 {
            NOTE_ON => MidiStatus::NoteOn,
            NOTE_OFF => MidiStatus::NoteOff,
            _ => MidiStatus::Other(status),
        }
    }
}

/// A decoded MIDI message. Transient: built and consumed within one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiMessage {
    pub status: MidiStatus,
    pub note_number: u8,
    pub velocity: u8,
}

impl MidiMessage {
    pub fn note_on(note_number: u8, velocity: u8) -> Self {
        Self {
            status: MidiStatus::NoteOn,
            note_number: note_number & 0x7F,
            velocity: velocity & 0x7F,
        }
    }

    pub fn note_off(note_number: u8, velocity: u8) -> Self {
        Self {
            status: MidiStatus::NoteOff,
            note_number: note_number & 0x7F,
            velocity: velocity & 0x7F,
        }
    }

    /// Decode the first three bytes of a raw message. Returns `None` for an
    /// empty buffer; missing data bytes read as zero.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let status = MidiStatus::from_byte(*bytes.first()?);
        Some(Self {
            status,
            note_number: bytes.get(1).copied().unwrap_or(0),
            velocity: bytes.get(2).copied().unwrap_or(0),
        })
    }

    /// Note-on and note-off as a channel 1 byte triplet.
    pub fn to_bytes(&self) -> [u8; 3] {
        let status = match self.status {
            MidiStatus::NoteOn => NOTE_ON,
            MidiStatus::NoteOff => NOTE_OFF,
            MidiStatus::Other(byte) => byte,
        };
        [status, self.note_number, self.velocity]
    }

    /// Keyboard key this message addresses, if any.
    pub fn key(&self) -> Option<usize> {
        note_to_key(self.note_number)
    }

    /// Build a note-on for a keyboard key.
    pub fn key_on(id: usize, velocity: u8) -> Option<Self> {
        key_to_note(id).map(|note| Self::note_on(note, velocity))
    }

    pub fn key_off(id: usize, velocity: u8) -> Option<Self> {
        key_to_note(id).map(|note| Self::note_off(note, velocity))
    }

    /// Whether the message should light a key. Any note-on does, whatever
    /// its velocity; only the engine reads velocity 0 as a release.
    pub fn presses(&self) -> bool {
        self.status == MidiStatus::NoteOn
    }

    pub fn releases(&self) -> bool {
        self.status == MidiStatus::NoteOff
    }
}
