mod input;
mod message;
mod router;

pub use input::MidirHost;
pub use message::{MidiMessage, MidiStatus, NOTE_OFF, NOTE_ON};
pub use router::{MidiCallback, MidiInputHost, MidiRouter, RouterState};
