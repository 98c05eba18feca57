//! Sample exchange between the engine and the host audio output.

pub mod stream;

pub use stream::AudioOutput;

use cpal::{FromSample, Sample};

use crate::core::synth::{SynthEngine, SynthRenderer};

/// Convert one engine sample to the host's float range. Exact: -32768 maps
/// to -1.0 and 32767 to 32767/32768.
#[inline]
pub fn sample_to_f32(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

/// Pulls blocks from the engine into the host's output buffers.
///
/// The transfer buffer is allocated once here and reused for every block;
/// nothing else reads or writes it.
pub struct AudioBridge<E: SynthEngine> {
    renderer: SynthRenderer<E>,
    transfer: Vec<i16>,
}

impl<E: SynthEngine> AudioBridge<E> {
    pub fn new(renderer: SynthRenderer<E>, block_size: usize) -> Self {
        Self {
            renderer,
            transfer: vec![0; block_size.max(1)],
        }
    }

    pub fn block_size(&self) -> usize {
        self.transfer.len()
    }

    /// Render `out.len()` mono frames, one block at a time.
    pub fn render_block(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(self.transfer.len()) {
            let xfer = &mut self.transfer[..chunk.len()];
            self.renderer.render(xfer);
            for (dst, &src) in chunk.iter_mut().zip(xfer.iter()) {
                *dst = sample_to_f32(src);
            }
        }
    }

    /// Fill an interleaved host buffer, copying the mono signal to every channel.
    pub fn fill_interleaved<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: Sample + FromSample<f32>,
    {
        let channels = channels.max(1);
        let block_samples = self.transfer.len() * channels;
        for chunk in data.chunks_mut(block_samples) {
            let frames = chunk.len() / channels;
            let xfer = &mut self.transfer[..frames];
            self.renderer.render(xfer);
            for (frame, &src) in chunk.chunks_mut(channels).zip(xfer.iter()) {
                let value = T::from_sample(sample_to_f32(src));
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        }
    }

    pub fn renderer(&self) -> &SynthRenderer<E> {
        &self.renderer
    }

    #[cfg(test)]
    fn transfer_ptr(&self) -> *const i16 {
        self.transfer.as_ptr()
    }
}
