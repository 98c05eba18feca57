//! Boundary to the synthesis engine.
//!
//! The engine is split in two ends that share a lock-free MIDI byte ring:
//! `SynthHandle` is the send side used by the event dispatcher, and
//! `SynthRenderer` owns the engine and is driven by the audio callback.

pub mod parser;
pub mod tone;
pub mod voice;

pub use parser::MidiStreamParser;
pub use tone::ToneEngine;

use log::warn;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::config::BridgeConfig;
use crate::error::BridgeResult;

/// A sound-synthesis engine: consumes MIDI, produces signed 16-bit PCM.
pub trait SynthEngine: Send + 'static {
    /// Apply one complete MIDI message.
    fn handle_midi(&mut self, message: &[u8]);

    /// Fill `out` with the next `out.len()` mono samples.
    fn render(&mut self, out: &mut [i16]);
}

/// Send side of the engine. Fire-and-forget.
pub struct SynthHandle {
    producer: Producer<u8>,
    dropped: u64,
}

impl SynthHandle {
    /// Queue raw MIDI bytes for the engine. The message is written whole or
    /// not at all; a full ring drops it.
    pub fn send_midi(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        match self.producer.write_chunk_uninit(bytes.len()) {
            Ok(chunk) => {
                chunk.fill_from_iter(bytes.iter().copied());
            }
            Err(_) => {
                self.dropped += 1;
                warn!(
                    "MIDI ring full, dropped {:02X?} ({} dropped so far)",
                    bytes, self.dropped
                );
            }
        }
    }

    /// Messages lost to a full ring since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Render side of the engine, owned exclusively by the audio path.
pub struct SynthRenderer<E: SynthEngine> {
    engine: E,
    consumer: Consumer<u8>,
    parser: MidiStreamParser,
}

impl<E: SynthEngine> SynthRenderer<E> {
    /// Deliver pending MIDI to the engine, then render `out.len()` samples.
    /// Never blocks or allocates.
    pub fn render(&mut self, out: &mut [i16]) {
        while let Ok(byte) = self.consumer.pop() {
            if let Some(message) = self.parser.push(byte) {
                self.engine.handle_midi(message);
            }
        }
        self.engine.render(out);
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

/// Create the built-in engine for `sample_rate`.
pub fn create(
    sample_rate: f32,
    config: &BridgeConfig,
) -> BridgeResult<(SynthHandle, SynthRenderer<ToneEngine>)> {
    let engine = ToneEngine::new(sample_rate)?;
    Ok(create_with(engine, config.midi_ring_capacity))
}

/// Wrap any engine with a MIDI ring of `capacity` bytes.
pub fn create_with<E: SynthEngine>(
    engine: E,
    capacity: usize,
) -> (SynthHandle, SynthRenderer<E>) {
    let (producer, consumer) = RingBuffer::new(capacity);
    (
        SynthHandle {
            producer,
            dropped: 0,
        },
        SynthRenderer {
            engine,
            consumer,
            parser: MidiStreamParser::new(),
        },
    )
}
