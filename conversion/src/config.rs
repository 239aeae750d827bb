//! Conversion configuration.
//!
//! # Example
//!
//! ```
//! use audioconv::{ConversionConfig, ResamplerBackend};
//!
//! let cfg = ConversionConfig::from_yaml(b"pivot_rate: 44100\nresampler: rubato\n").unwrap();
//! assert_eq!(cfg.pivot_rate, 44100);
//! assert_eq!(cfg.resampler, ResamplerBackend::Rubato);
//! assert_eq!(cfg.margin_frames(), 22);
//! ```

use serde::{Deserialize, Serialize};

/// Highest sample rate the accumulation margin accounts for.
pub const DEFAULT_MAX_RATE: u32 = 92000;
/// Lowest sample rate the accumulation margin accounts for.
pub const DEFAULT_MIN_RATE: u32 = 8000;
pub const DEFAULT_ALLOC_MARGIN_FACTOR: u32 = 2;
/// Intermediate rate for engines that cannot convert a pair directly.
pub const DEFAULT_PIVOT_RATE: u32 = 48000;
/// Initial frame capacity of the float resampler buffers.
pub const DEFAULT_FLOAT_BASE_FRAMES: usize = 1024;

/// Resample engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplerBackend {
    /// Float polynomial interpolation (pure Rust).
    #[default]
    Rubato,
    /// libsoxr over 16-bit samples, needs the `soxr` feature.
    Soxr,
}

/// Configuration for [`AudioConversion`](crate::AudioConversion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Highest expected rate (default: 92000).
    pub max_rate: u32,
    /// Lowest expected rate (default: 8000).
    pub min_rate: u32,
    /// Multiplier of the rate spread for the accumulation margin (default: 2).
    pub alloc_margin_factor: u32,
    /// Pivot rate for two-stage resampling (default: 48000).
    pub pivot_rate: u32,
    /// Initial float buffer capacity in frames (default: 1024).
    pub float_base_frames: usize,
    /// Resample engine (default: rubato).
    pub resampler: ResamplerBackend,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_rate: DEFAULT_MAX_RATE,
            min_rate: DEFAULT_MIN_RATE,
            alloc_margin_factor: DEFAULT_ALLOC_MARGIN_FACTOR,
            pivot_rate: DEFAULT_PIVOT_RATE,
            float_base_frames: DEFAULT_FLOAT_BASE_FRAMES,
            resampler: ResamplerBackend::default(),
        }
    }
}

impl ConversionConfig {
    /// Parses a configuration from YAML. Missing fields keep their defaults.
    pub fn from_yaml(data: &[u8]) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_slice(data)
    }

    /// Extra destination frames kept in the accumulation buffer beyond the
    /// requested count.
    pub fn margin_frames(&self) -> usize {
        (self.max_rate / self.min_rate.max(1)) as usize * self.alloc_margin_factor as usize
    }

    pub fn with_rate_bounds(mut self, min_rate: u32, max_rate: u32) -> Self {
        self.min_rate = min_rate;
        self.max_rate = max_rate;
        self
    }

    pub fn with_alloc_margin_factor(mut self, factor: u32) -> Self {
        self.alloc_margin_factor = factor;
        self
    }

    pub fn with_pivot_rate(mut self, rate: u32) -> Self {
        self.pivot_rate = rate;
        self
    }

    pub fn with_float_base_frames(mut self, frames: usize) -> Self {
        self.float_base_frames = frames;
        self
    }

    pub fn with_resampler(mut self, backend: ResamplerBackend) -> Self {
        self.resampler = backend;
        self
    }
}
