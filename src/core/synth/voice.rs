#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
    Idle,
}

/// Linear ADSR times in seconds, sustain as a level.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.005,
            decay: 0.2,
            sustain: 0.6,
            release: 0.25,
        }
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0f32.powf((note as f32 - 69.0) / 12.0)
}

/// One sounding note in the tone engine.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    pub note: u8,
    pub velocity: f32,
    pub stage: EnvelopeStage,
    level: f32,
    phase: f32,
    phase_increment: f32,
    age: u64,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            note: 0,
            velocity: 0.0,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            phase: 0.0,
            phase_increment: 0.0,
            age: 0,
        }
    }
}

impl Voice {
    pub fn start(&mut self, note: u8, velocity: u8, sample_rate: f32, age: u64) {
        self.note = note;
        self.velocity = velocity as f32 / 127.0;
        self.stage = EnvelopeStage::Attack;
        self.phase = 0.0;
        self.phase_increment = midi_note_to_freq(note) / sample_rate;
        self.age = age;
    }

    pub fn release(&mut self) {
        if self.is_held() {
            self.stage = EnvelopeStage::Release;
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn is_held(&self) -> bool {
        matches!(
            self.stage,
            EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Sustain
        )
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    /// Advance one sample and return the voice output in [-1, 1].
    pub fn next_sample(&mut self, env: &Envelope, sample_rate: f32) -> f32 {
        self.advance_envelope(env, sample_rate);
        if self.stage == EnvelopeStage::Idle {
            return 0.0;
        }

        let sine = (2.0 * std::f32::consts::PI * self.phase).sin();
        let saw = 2.0 * self.phase - 1.0;
        self.phase = (self.phase + self.phase_increment) % 1.0;

        (0.75 * sine + 0.25 * saw) * self.level * self.velocity
    }

    fn advance_envelope(&mut self, env: &Envelope, sample_rate: f32) {
        let step = |seconds: f32| 1.0 / (seconds.max(1.0e-4) * sample_rate);
        match self.stage {
            EnvelopeStage::Attack => {
                self.level += step(env.attack);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                self.level -= (1.0 - env.sustain) * step(env.decay);
                if self.level <= env.sustain {
                    self.level = env.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => self.level = env.sustain,
            EnvelopeStage::Release => {
                self.level -= env.sustain.max(0.05) * step(env.release);
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
            EnvelopeStage::Idle => {}
        }
    }
}
