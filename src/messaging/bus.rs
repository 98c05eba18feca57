use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;

use super::BridgeMessage;
use crate::core::midi::MidiMessage;
use crate::core::note::NoteRegistry;
use crate::core::synth::SynthHandle;

/// Applies MIDI to the key registry and the engine.
///
/// The only writer of `NoteRegistry` and the only caller of
/// `SynthHandle::send_midi`, so both routers' updates are serialized here.
pub struct NoteDispatcher {
    registry: Arc<RwLock<NoteRegistry>>,
    synth: SynthHandle,
    on_change: Option<Box<dyn Fn() + Send>>,
}

impl NoteDispatcher {
    pub fn new(registry: Arc<RwLock<NoteRegistry>>, synth: SynthHandle) -> Self {
        Self {
            registry,
            synth,
            on_change: None,
        }
    }

    /// Hook run after each message, e.g. to request a UI repaint.
    pub fn with_change_hook(mut self, hook: impl Fn() + Send + 'static) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }

    pub fn dispatch(&mut self, bytes: &[u8]) {
        if let Some(msg) = MidiMessage::decode(bytes) {
            if let Some(id) = msg.key() {
                if let Ok(mut registry) = self.registry.write() {
                    if msg.presses() {
                        registry.note_on(id);
                    } else if msg.releases() {
                        registry.note_off(id);
                    }
                }
            } else {
                debug!("note {} is off the keyboard", msg.note_number);
            }
        }

        // Forwarded even when no key matched.
        self.synth.send_midi(bytes);

        if let Some(hook) = &self.on_change {
            hook();
        }
    }
}

/// Single-consumer queue between the event producers and the dispatcher.
pub struct MessageBus {
    sender: Sender<BridgeMessage>,
    receiver: Receiver<BridgeMessage>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// A sender that can be cloned into routers and callbacks.
    pub fn sender(&self) -> Sender<BridgeMessage> {
        self.sender.clone()
    }

    /// Dispatch up to `max_messages` pending messages. Returns how many ran,
    /// or `None` once `Shutdown` is seen.
    pub fn process_messages(
        &self,
        dispatcher: &mut NoteDispatcher,
        max_messages: usize,
    ) -> Option<usize> {
        let mut count = 0;
        while count < max_messages {
            match self.receiver.try_recv() {
                Ok(BridgeMessage::Midi(bytes)) => {
                    dispatcher.dispatch(&bytes);
                    count += 1;
                }
                Ok(BridgeMessage::Shutdown) => return None,
                Err(_) => break,
            }
        }
        Some(count)
    }

    /// Block and dispatch until `Shutdown` arrives.
    pub fn run(self, mut dispatcher: NoteDispatcher) {
        while let Ok(message) = self.receiver.recv() {
            match message {
                BridgeMessage::Midi(bytes) => dispatcher.dispatch(&bytes),
                BridgeMessage::Shutdown => break,
            }
        }
        info!("Note dispatcher stopped");
    }

    /// Run the dispatcher on its own thread.
    pub fn spawn(self, dispatcher: NoteDispatcher) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("note-dispatch".to_string())
            .spawn(move || self.run(dispatcher))
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
