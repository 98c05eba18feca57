use anyhow::{Context, Result};
use cpal::Stream;
use crossbeam_channel::Sender;
use eframe::egui;
use log::{info, warn};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::BridgeConfig;
use crate::core::audio::{AudioBridge, AudioOutput};
use crate::core::midi::{MidiRouter, MidirHost};
use crate::core::note::NoteRegistry;
use crate::core::pointer::PointerRouter;
use crate::core::synth;
use crate::messaging::{BridgeMessage, MessageBus, NoteDispatcher};
use crate::ui::keyboard::{self, KeyGesture};

/// The on-screen keyboard wired to the engine and the MIDI input.
pub struct KeyboardApp {
    registry: Arc<RwLock<NoteRegistry>>,
    pointer: PointerRouter,
    midi: MidiRouter<MidirHost>,
    sender: Sender<BridgeMessage>,
    dispatcher: Option<JoinHandle<()>>,
    _stream: Stream,
    poll_interval: Duration,
    last_poll: Instant,
}

impl KeyboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: BridgeConfig) -> Result<Self> {
        config.validate()?;

        let output = AudioOutput::open_default().context("opening audio output")?;
        let sample_rate = output.sample_rate();

        let (handle, renderer) = synth::create(sample_rate, &config)?;
        let bridge = AudioBridge::new(renderer, config.block_size);
        let stream = output.start(bridge).context("starting audio stream")?;

        let registry = Arc::new(RwLock::new(NoteRegistry::new()));
        let bus = MessageBus::new();
        let sender = bus.sender();

        let ctx = cc.egui_ctx.clone();
        let dispatcher = NoteDispatcher::new(Arc::clone(&registry), handle)
            .with_change_hook(move || ctx.request_repaint());
        let dispatcher = bus.spawn(dispatcher).context("spawning note dispatcher")?;

        let pointer = PointerRouter::new(sender.clone(), config.pointer_velocity);
        let mut midi = MidiRouter::new(MidirHost::open_or_log(&config.client_name), sender.clone());
        midi.poll();

        info!("Keyboard ready");
        Ok(Self {
            registry,
            pointer,
            midi,
            sender,
            dispatcher: Some(dispatcher),
            _stream: stream,
            poll_interval: config.device_poll_interval(),
            last_poll: Instant::now(),
        })
    }

    fn poll_midi_devices(&mut self) {
        if self.last_poll.elapsed() >= self.poll_interval {
            self.midi.poll();
            self.last_poll = Instant::now();
        }
    }

    fn apply_gestures(&mut self, gestures: Vec<KeyGesture>) {
        for gesture in gestures {
            match gesture {
                KeyGesture::Press(pointer, id) => self.pointer.press(pointer, id),
                KeyGesture::Release(pointer) => self.pointer.release(pointer),
            }
        }
    }
}

impl eframe::App for KeyboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_midi_devices();

        let gestures = egui::CentralPanel::default()
            .show(ctx, |ui| {
                ui.heading("keybridge");
                match self.midi.bound_port() {
                    Some(port) => ui.label(format!("MIDI input: {}", port)),
                    None => ui.label("No MIDI input"),
                };
                ui.add_space(8.0);

                match self.registry.read() {
                    Ok(registry) => keyboard::show(ui, &registry),
                    Err(_) => Vec::new(),
                }
            })
            .inner;

        self.apply_gestures(gestures);

        // Keep polling for controllers even when idle.
        ctx.request_repaint_after(self.poll_interval);
    }
}

impl Drop for KeyboardApp {
    fn drop(&mut self) {
        self.pointer.release_all();
        self.sender.send(BridgeMessage::Shutdown).ok();
        if let Some(handle) = self.dispatcher.take() {
            if handle.join().is_err() {
                warn!("Note dispatcher panicked");
            }
        }
    }
}
