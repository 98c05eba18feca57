use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, Stream};
use log::{error, info};

use super::AudioBridge;
use crate::core::synth::SynthEngine;
use crate::error::{BridgeError, BridgeResult};

/// The host's default output device and its preferred stream settings.
pub struct AudioOutput {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: SampleFormat,
}

impl AudioOutput {
    pub fn open_default() -> BridgeResult<Self> {
        let host = cpal::default_host();
        info!("Using audio host: {}", host.id().name());

        let device = host
            .default_output_device()
            .ok_or_else(|| BridgeError::AudioDevice("no output device available".into()))?;
        info!("Using output device: {:?}", device.name());

        let supported = device
            .default_output_config()
            .map_err(|e| BridgeError::AudioDevice(e.to_string()))?;
        info!("Device config: {:?}", supported);

        let sample_format = supported.sample_format();
        Ok(Self {
            device,
            config: supported.into(),
            sample_format,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate.0 as f32
    }

    pub fn channels(&self) -> usize {
        self.config.channels as usize
    }

    /// Build and start the output stream. The bridge moves into the
    /// callback, which is its only user from then on.
    pub fn start<E: SynthEngine>(&self, bridge: AudioBridge<E>) -> BridgeResult<Stream> {
        let stream = match self.sample_format {
            SampleFormat::F32 => self.build::<f32, E>(bridge),
            SampleFormat::I16 => self.build::<i16, E>(bridge),
            SampleFormat::U16 => self.build::<u16, E>(bridge),
            other => Err(BridgeError::AudioDevice(format!(
                "unsupported sample format {:?}",
                other
            ))),
        }?;

        stream
            .play()
            .map_err(|e| BridgeError::AudioDevice(e.to_string()))?;
        info!(
            "Audio stream started: {} Hz, {} channel(s)",
            self.config.sample_rate.0, self.config.channels
        );
        Ok(stream)
    }

    fn build<T, E>(&self, mut bridge: AudioBridge<E>) -> BridgeResult<Stream>
    where
        T: SizedSample + Sample + FromSample<f32> + Send + 'static,
        E: SynthEngine,
    {
        let channels = self.channels();
        let err_fn = |err| error!("an error occurred on the audio stream: {}", err);

        self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    bridge.fill_interleaved(data, channels);
                },
                err_fn,
                None,
            )
            .map_err(|e| BridgeError::AudioDevice(e.to_string()))
    }
}
