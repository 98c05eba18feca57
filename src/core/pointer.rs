use std::collections::HashMap;

use crossbeam_channel::Sender;
use log::debug;

use crate::core::midi::MidiMessage;
use crate::messaging::BridgeMessage;

/// Identifies one pointing contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

/// Turns press/release gestures into note-on/note-off messages.
///
/// Each pointer carries its own gesture: a release ends only the key that
/// pointer pressed, wherever the release happens.
pub struct PointerRouter {
    sender: Sender<BridgeMessage>,
    velocity: u8,
    gestures: HashMap<PointerId, usize>,
}

impl PointerRouter {
    pub fn new(sender: Sender<BridgeMessage>, velocity: u8) -> Self {
        Self {
            sender,
            velocity,
            gestures: HashMap::new(),
        }
    }

    /// Start a gesture on key `id`. Ids off the keyboard are ignored.
    pub fn press(&mut self, pointer: PointerId, id: usize) {
        let Some(message) = MidiMessage::key_on(id, self.velocity) else {
            return;
        };
        // A pointer can't hold two keys; close a gesture whose release was missed.
        if self.gestures.contains_key(&pointer) {
            self.release(pointer);
        }
        debug!("{:?} down on key {}", pointer, id);
        self.gestures.insert(pointer, id);
        self.publish(message);
    }

    /// End the pointer's gesture, if it has one.
    pub fn release(&mut self, pointer: PointerId) {
        let Some(id) = self.gestures.remove(&pointer) else {
            return;
        };
        debug!("{:?} up from key {}", pointer, id);
        if let Some(message) = MidiMessage::key_off(id, self.velocity) {
            self.publish(message);
        }
    }

    /// Release every outstanding gesture.
    pub fn release_all(&mut self) {
        let pointers: Vec<PointerId> = self.gestures.keys().copied().collect();
        for pointer in pointers {
            self.release(pointer);
        }
    }

    pub fn held_key(&self, pointer: PointerId) -> Option<usize> {
        self.gestures.get(&pointer).copied()
    }

    pub fn active_gestures(&self) -> usize {
        self.gestures.len()
    }

    fn publish(&self, message: MidiMessage) {
        self.sender
            .send(BridgeMessage::Midi(message.to_bytes().to_vec()))
            .ok();
    }
}
