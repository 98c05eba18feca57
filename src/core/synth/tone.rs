use super::voice::{Envelope, Voice};
use super::SynthEngine;
use crate::core::midi::{MidiMessage, MidiStatus};
use crate::error::{BridgeError, BridgeResult};

const VOICE_COUNT: usize = 16;
const MASTER_GAIN: f32 = 0.25;

/// Small polyphonic tone generator used when no other engine is supplied.
pub struct ToneEngine {
    sample_rate: f32,
    envelope: Envelope,
    voices: [Voice; VOICE_COUNT],
    next_age: u64,
}

impl ToneEngine {
    pub fn new(sample_rate: f32) -> BridgeResult<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(BridgeError::EngineUnavailable(format!(
                "unsupported sample rate {}",
                sample_rate
            )));
        }
        Ok(Self {
            sample_rate,
            envelope: Envelope::default(),
            voices: [Voice::default(); VOICE_COUNT],
            next_age: 0,
        })
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    fn note_on(&mut self, note: u8, velocity: u8) {
        self.next_age += 1;
        let age = self.next_age;

        // Retrigger a held note, else take an idle voice, else steal the oldest.
        let slot = self
            .voices
            .iter()
            .position(|v| v.is_held() && v.note == note)
            .or_else(|| self.voices.iter().position(|v| !v.is_active()))
            .unwrap_or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.age())
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            });

        self.voices[slot].start(note, velocity, self.sample_rate, age);
    }

    fn note_off(&mut self, note: u8) {
        for voice in self.voices.iter_mut().filter(|v| v.note == note) {
            voice.release();
        }
    }
}

impl SynthEngine for ToneEngine {
    fn handle_midi(&mut self, message: &[u8]) {
        let Some(msg) = MidiMessage::decode(message) else {
            return;
        };
        match msg.status {
            MidiStatus::NoteOn if msg.velocity > 0 => self.note_on(msg.note_number, msg.velocity),
            MidiStatus::NoteOn | MidiStatus::NoteOff => self.note_off(msg.note_number),
            MidiStatus::Other(_) => {}
        }
    }

    fn render(&mut self, out: &mut [i16]) {
        for sample in out.iter_mut() {
            let mut mix = 0.0;
            for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
                mix += voice.next_sample(&self.envelope, self.sample_rate);
            }
            let value = (mix * MASTER_GAIN).clamp(-1.0, 1.0);
            *sample = (value * i16::MAX as f32) as i16;
        }
    }
}
