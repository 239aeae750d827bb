//! Pluggable rate conversion engines.
//!
//! An engine creates per-stream handles keyed by channel count and rate
//! pair. Handles keep their filter state across calls; the number of frames
//! a call produces is decided by the handle, callers may only rely on the
//! aggregate ratio.

use std::fmt;
use std::sync::Arc;

use crate::config::ResamplerBackend;
use crate::error::Result;

use super::rubato_engine::RubatoEngine;

/// A rate conversion engine working on interleaved samples of type `S`.
pub trait ResampleEngine<S>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether the engine converts `src_rate` to `dst_rate` directly.
    fn supports(&self, src_rate: u32, dst_rate: u32) -> bool;

    /// Creates a handle. Returns `None` when the engine cannot allocate one.
    fn create(
        &self,
        channels: usize,
        src_rate: u32,
        dst_rate: u32,
    ) -> Option<Box<dyn ResampleHandle<S>>>;
}

/// A stateful conversion instance. Dropping the handle releases it.
pub trait ResampleHandle<S>: Send {
    /// Clears the filter history.
    fn reset(&mut self);

    /// Converts `in_frames` interleaved frames from `input` into `output`.
    ///
    /// `output.len() / channels` is the capacity in frames. Returns the
    /// number of frames written.
    fn process(&mut self, input: &[S], in_frames: usize, output: &mut [S]) -> Result<usize>;
}

/// The engine a rate converter uses, with the sample type it works on.
#[derive(Clone)]
pub enum RateEngine {
    /// Integer engine over 16-bit samples.
    Integer(Arc<dyn ResampleEngine<i16>>),
    /// Float engine; integer samples are converted without scaling.
    Float(Arc<dyn ResampleEngine<f32>>),
}

impl RateEngine {
    pub fn integer(engine: impl ResampleEngine<i16> + 'static) -> Self {
        RateEngine::Integer(Arc::new(engine))
    }

    pub fn float(engine: impl ResampleEngine<f32> + 'static) -> Self {
        RateEngine::Float(Arc::new(engine))
    }

    /// Builds the engine selected in the configuration.
    pub fn from_backend(backend: ResamplerBackend) -> Result<Self> {
        match backend {
            ResamplerBackend::Rubato => Ok(RateEngine::float(RubatoEngine::default())),
            #[cfg(feature = "soxr")]
            ResamplerBackend::Soxr => Ok(RateEngine::integer(super::soxr::SoxrEngine::default())),
            #[cfg(not(feature = "soxr"))]
            ResamplerBackend::Soxr => Err(crate::error::ConversionError::invalid(
                "soxr backend requires the `soxr` feature",
            )),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RateEngine::Integer(e) => e.name(),
            RateEngine::Float(e) => e.name(),
        }
    }

    pub fn supports(&self, src_rate: u32, dst_rate: u32) -> bool {
        match self {
            RateEngine::Integer(e) => e.supports(src_rate, dst_rate),
            RateEngine::Float(e) => e.supports(src_rate, dst_rate),
        }
    }
}

impl Default for RateEngine {
    fn default() -> Self {
        RateEngine::float(RubatoEngine::default())
    }
}

impl fmt::Debug for RateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateEngine::Integer(e) => write!(f, "RateEngine::Integer({})", e.name()),
            RateEngine::Float(e) => write!(f, "RateEngine::Float({})", e.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;

    #[test]
    fn test_default_is_rubato() {
        let engine = RateEngine::default();
        assert!(matches!(engine, RateEngine::Float(_)));
        assert_eq!(engine.name(), "rubato");
        assert!(engine.supports(44100, 48000));
        assert!(!engine.supports(0, 48000));
    }

    #[test]
    fn test_from_backend() {
        assert!(RateEngine::from_backend(ResamplerBackend::Rubato).is_ok());
        #[cfg(not(feature = "soxr"))]
        assert!(matches!(
            RateEngine::from_backend(ResamplerBackend::Soxr),
            Err(ConversionError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", RateEngine::default()), "RateEngine::Float(rubato)");
    }
}
