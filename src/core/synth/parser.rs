/// Reassembles complete MIDI messages from a byte stream.
///
/// Holds at most one pending message in a fixed buffer so it can run inside
/// the render callback. Running status is not supported and SysEx is skipped.
#[derive(Debug, Default)]
pub struct MidiStreamParser {
    pending: [u8; 3],
    len: usize,
    expected: usize,
    realtime: [u8; 1],
    in_sysex: bool,
}

impl MidiStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns a complete message when this byte finishes one.
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        if byte >= 0xF8 {
            // Real-time bytes may interleave with anything.
            self.realtime[0] = byte;
            return Some(&self.realtime[..]);
        }

        match byte {
            0xF0 => {
                self.in_sysex = true;
                self.len = 0;
                None
            }
            0xF7 => {
                self.in_sysex = false;
                self.len = 0;
                None
            }
            0x80..=0xF6 => {
                self.in_sysex = false;
                self.pending[0] = byte;
                self.len = 1;
                self.expected = message_len(byte);
                self.complete()
            }
            _ => {
                if self.in_sysex || self.len == 0 {
                    return None;
                }
                self.pending[self.len] = byte;
                self.len += 1;
                self.complete()
            }
        }
    }

    fn complete(&mut self) -> Option<&[u8]> {
        if self.len == self.expected {
            self.len = 0;
            Some(&self.pending[..self.expected])
        } else {
            None
        }
    }
}

/// Total length in bytes of a message starting with `status`.
fn message_len(status: u8) -> usize {
    match status {
        0xC0..=0xDF => 2,
        0x80..=0xEF => 3,
        0xF1 | 0xF3 => 2,
        0xF2 => 3,
        _ => 1,
    }
}
