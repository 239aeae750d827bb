#![allow(dead_code)]

use std::f64::consts::PI;

use audioconv::{ResampleEngine, ResampleHandle, Result};

/// Installs a test subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn s16(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub fn u32s(samples: &[u32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub fn read_s16(bytes: &[u8]) -> Vec<i16> {
    bytes.chunks_exact(2).map(|c| i16::from_le_bytes([c[0], c[1]])).collect()
}

pub fn read_u32(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Interleaved 16-bit sine, the same tone on every channel.
pub fn sine_s16(freq_hz: f64, frames: usize, rate: u32, channels: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(frames * channels * 2);
    for i in 0..frames {
        let t = i as f64 / f64::from(rate);
        let sample = (12000.0 * (freq_hz * 2.0 * PI * t).sin()) as i16;
        for _ in 0..channels {
            out.extend_from_slice(&sample.to_le_bytes());
        }
    }
    out
}

/// Ramp whose frame `i` holds `i` on every channel, wrapping at `i16::MAX`.
pub fn ramp_s16(frames: usize, channels: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(frames * channels * 2);
    for i in 0..frames {
        let sample = (i % i16::MAX as usize) as i16;
        for _ in 0..channels {
            out.extend_from_slice(&sample.to_le_bytes());
        }
    }
    out
}

/// Integer engine picking the nearest earlier input frame.
///
/// Output is a pure function of the input stream, however it is split
/// across calls. Without `any_pair` it only converts to or from 48 kHz.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestEngine {
    pub any_pair: bool,
}

impl NearestEngine {
    pub fn any_pair() -> Self {
        Self { any_pair: true }
    }
}

struct NearestHandle {
    channels: usize,
    src_rate: u64,
    dst_rate: u64,
    consumed: u64,
    produced: u64,
}

impl ResampleEngine<i16> for NearestEngine {
    fn name(&self) -> &str {
        "nearest"
    }

    fn supports(&self, src_rate: u32, dst_rate: u32) -> bool {
        src_rate != 0 && dst_rate != 0 && (self.any_pair || src_rate == 48000 || dst_rate == 48000)
    }

    fn create(
        &self,
        channels: usize,
        src_rate: u32,
        dst_rate: u32,
    ) -> Option<Box<dyn ResampleHandle<i16>>> {
        Some(Box::new(NearestHandle {
            channels,
            src_rate: src_rate.into(),
            dst_rate: dst_rate.into(),
            consumed: 0,
            produced: 0,
        }))
    }
}

impl ResampleHandle<i16> for NearestHandle {
    fn reset(&mut self) {
        self.consumed = 0;
        self.produced = 0;
    }

    fn process(&mut self, input: &[i16], in_frames: usize, output: &mut [i16]) -> Result<usize> {
        if in_frames == 0 {
            return Ok(0);
        }
        let total = self.consumed + in_frames as u64;
        let target = (total * self.dst_rate).div_ceil(self.src_rate);
        let capacity = (output.len() / self.channels) as u64;
        let n = target.saturating_sub(self.produced).min(capacity) as usize;
        for j in 0..n {
            let pos = (self.produced + j as u64) * self.src_rate / self.dst_rate;
            let frame = pos.saturating_sub(self.consumed).min(in_frames as u64 - 1) as usize;
            let (from, to) = (frame * self.channels, j * self.channels);
            output[to..to + self.channels].copy_from_slice(&input[from..from + self.channels]);
        }
        self.produced += n as u64;
        self.consumed = total;
        Ok(n)
    }
}
