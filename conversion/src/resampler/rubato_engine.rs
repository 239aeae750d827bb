//! Float resample engine on top of rubato.
//!
//! rubato works on planar buffers and fixed input chunks. The handle keeps
//! a planar input queue and an interleaved output queue so callers can push
//! any number of frames and read back at most the room they offer.

use std::collections::VecDeque;

use rubato::{FastFixedIn, PolynomialDegree, Resampler as RubatoResampler};
use tracing::warn;

use crate::error::Result;

use super::engine::{ResampleEngine, ResampleHandle};

/// Default number of input frames per rubato chunk.
pub const DEFAULT_CHUNK_FRAMES: usize = 256;

/// Polynomial interpolation engine.
#[derive(Debug, Clone)]
pub struct RubatoEngine {
    chunk_frames: usize,
}

impl Default for RubatoEngine {
    fn default() -> Self {
        Self {
            chunk_frames: DEFAULT_CHUNK_FRAMES,
        }
    }
}

impl RubatoEngine {
    /// Sets the number of input frames rubato processes at once.
    pub fn with_chunk_frames(mut self, frames: usize) -> Self {
        self.chunk_frames = frames.max(1);
        self
    }
}

impl ResampleEngine<f32> for RubatoEngine {
    fn name(&self) -> &str {
        "rubato"
    }

    fn supports(&self, src_rate: u32, dst_rate: u32) -> bool {
        src_rate > 0 && dst_rate > 0
    }

    fn create(
        &self,
        channels: usize,
        src_rate: u32,
        dst_rate: u32,
    ) -> Option<Box<dyn ResampleHandle<f32>>> {
        if channels == 0 || !self.supports(src_rate, dst_rate) {
            return None;
        }
        let ratio = f64::from(dst_rate) / f64::from(src_rate);
        let resampler = FastFixedIn::<f32>::new(
            ratio,
            1.0,
            PolynomialDegree::Cubic,
            self.chunk_frames,
            channels,
        )
        .map_err(|e| warn!(src_rate, dst_rate, channels, "rubato construction failed: {e}"))
        .ok()?;

        Some(Box::new(RubatoHandle {
            resampler,
            channels,
            pending_in: vec![Vec::new(); channels],
            chunk_in: vec![Vec::new(); channels],
            chunk_out: vec![Vec::new(); channels],
            pending_out: VecDeque::new(),
        }))
    }
}

struct RubatoHandle {
    resampler: FastFixedIn<f32>,
    channels: usize,
    /// Input frames waiting for a full chunk, per channel.
    pending_in: Vec<Vec<f32>>,
    chunk_in: Vec<Vec<f32>>,
    chunk_out: Vec<Vec<f32>>,
    /// Converted interleaved samples not yet handed out.
    pending_out: VecDeque<f32>,
}

impl RubatoHandle {
    fn pending_out_frames(&self) -> usize {
        self.pending_out.len() / self.channels
    }

    /// Runs one chunk through rubato if enough input is queued.
    fn process_chunk(&mut self) -> Result<bool> {
        let needed = self.resampler.input_frames_next();
        if self.pending_in[0].len() < needed {
            return Ok(false);
        }

        for (chunk, queue) in self.chunk_in.iter_mut().zip(self.pending_in.iter_mut()) {
            chunk.clear();
            chunk.extend(queue.drain(..needed));
        }
        let out_frames = self.resampler.output_frames_next();
        for chunk in self.chunk_out.iter_mut() {
            chunk.clear();
            chunk.resize(out_frames, 0.0);
        }

        let (_, written) = self
            .resampler
            .process_into_buffer(&self.chunk_in, &mut self.chunk_out, None)?;

        for frame in 0..written {
            for ch in 0..self.channels {
                self.pending_out.push_back(self.chunk_out[ch][frame]);
            }
        }
        Ok(true)
    }
}

impl ResampleHandle<f32> for RubatoHandle {
    fn reset(&mut self) {
        self.resampler.reset();
        for queue in self.pending_in.iter_mut() {
            queue.clear();
        }
        self.pending_out.clear();
    }

    fn process(&mut self, input: &[f32], in_frames: usize, output: &mut [f32]) -> Result<usize> {
        let channels = self.channels;
        for frame in input.chunks_exact(channels).take(in_frames) {
            for (queue, sample) in self.pending_in.iter_mut().zip(frame) {
                queue.push(*sample);
            }
        }

        let capacity = output.len() / channels;
        while self.pending_out_frames() < capacity && self.process_chunk()? {}

        let frames = capacity.min(self.pending_out_frames());
        for (dst, sample) in output[..frames * channels]
            .iter_mut()
            .zip(self.pending_out.drain(..frames * channels))
        {
            *dst = sample;
        }
        Ok(frames)
    }
}
