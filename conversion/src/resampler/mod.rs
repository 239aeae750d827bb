//! Sample rate conversion.
//!
//! [`Resampler`] is a single conversion stage driving a [`RateEngine`].
//! [`AudioResampler`] is the rate axis converter used by the conversion
//! chain: it tries a direct stage first and falls back to two stages through
//! a pivot rate when the engine cannot convert the pair directly.
//!
//! # Example
//!
//! ```
//! use audioconv::resampler::AudioResampler;
//! use audioconv::AudioConverter;
//! use audioconv_samplespec::{SampleFormat, SampleSpec};
//!
//! let src = SampleSpec::new(1, SampleFormat::S16, 16000);
//! let dst = SampleSpec::new(1, SampleFormat::S16, 48000);
//!
//! let mut resampler = AudioResampler::new();
//! resampler.configure(&src, &dst).unwrap();
//! let frames = resampler.convert(&[0u8; 640], None, 320).unwrap();
//! assert!(frames <= 961);
//! ```

pub mod engine;
#[cfg(feature = "soxr")]
mod ffi;
mod rubato_engine;
#[cfg(feature = "soxr")]
mod soxr;

pub use engine::*;
pub use rubato_engine::{DEFAULT_CHUNK_FRAMES, RubatoEngine};
#[cfg(feature = "soxr")]
pub use soxr::SoxrEngine;

use audioconv_samplespec::{SampleSpec, SampleSpecItem};
use tracing::{debug, error};

use crate::buffer::try_resize;
use crate::config::{DEFAULT_FLOAT_BASE_FRAMES, DEFAULT_PIVOT_RATE};
use crate::converter::{AudioConverter, ConverterCore};
use crate::error::{ConversionError, Result};
use crate::sample::{Sample, decode_into, encode_from};

/// Engine state bound at configure time.
enum Kernel {
    Integer {
        handle: Box<dyn ResampleHandle<i16>>,
        input: Vec<i16>,
        output: Vec<i16>,
    },
    Float {
        handle: Box<dyn ResampleHandle<f32>>,
        /// Capacity in frames of the float buffers, minus one.
        max_frames: usize,
        input: Vec<f32>,
        output: Vec<f32>,
    },
}

impl Kernel {
    fn reset(&mut self) {
        match self {
            Kernel::Integer { handle, .. } => handle.reset(),
            Kernel::Float { handle, .. } => handle.reset(),
        }
    }
}

/// One rate conversion stage.
pub struct Resampler {
    core: ConverterCore,
    engine: RateEngine,
    kernel: Option<Kernel>,
    float_base_frames: usize,
}

impl std::fmt::Debug for Resampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resampler")
            .field("engine", &self.engine)
            .field("src", self.core.src())
            .field("dst", self.core.dst())
            .field("ready", &self.kernel.is_some())
            .finish()
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new(RateEngine::default())
    }
}

impl Resampler {
    pub fn new(engine: RateEngine) -> Self {
        Self {
            core: ConverterCore::new(SampleSpecItem::Rate),
            engine,
            kernel: None,
            float_base_frames: DEFAULT_FLOAT_BASE_FRAMES,
        }
    }

    /// Sets the initial frame capacity of the float buffers.
    pub fn with_float_base_frames(mut self, frames: usize) -> Self {
        self.float_base_frames = frames.max(1);
        self
    }

    /// Frame capacity of the float buffers, `None` for integer engines.
    pub fn float_capacity(&self) -> Option<usize> {
        match &self.kernel {
            Some(Kernel::Float { max_frames, .. }) => Some(*max_frames),
            _ => None,
        }
    }

    fn create_kernel(&self, src: &SampleSpec, dst: &SampleSpec) -> Result<Kernel> {
        let channels = src.channel_count() as usize;
        if !self.engine.supports(src.rate(), dst.rate()) {
            return Err(ConversionError::invalid(format!(
                "{} cannot convert {}Hz to {}Hz",
                self.engine.name(),
                src.rate(),
                dst.rate()
            )));
        }

        match &self.engine {
            RateEngine::Integer(engine) => {
                if src.format().is_wide() {
                    return Err(ConversionError::invalid(format!(
                        "{} only converts 16-bit samples, got {}",
                        engine.name(),
                        src.format()
                    )));
                }
                let handle = engine
                    .create(channels, src.rate(), dst.rate())
                    .ok_or_else(|| {
                        ConversionError::bad_value(format!("{} create failed", engine.name()))
                    })?;
                Ok(Kernel::Integer {
                    handle,
                    input: Vec::new(),
                    output: Vec::new(),
                })
            }
            RateEngine::Float(engine) => {
                let handle = engine
                    .create(channels, src.rate(), dst.rate())
                    .ok_or_else(|| {
                        ConversionError::bad_value(format!("{} create failed", engine.name()))
                    })?;
                let max_frames = self.float_base_frames;
                let mut input = Vec::new();
                let mut output = Vec::new();
                try_resize(&mut input, (max_frames + 1) * channels)?;
                try_resize(&mut output, (max_frames + 1) * channels)?;
                Ok(Kernel::Float {
                    handle,
                    max_frames,
                    input,
                    output,
                })
            }
        }
    }
}

impl AudioConverter for Resampler {
    fn item(&self) -> SampleSpecItem {
        SampleSpecItem::Rate
    }

    fn configure(&mut self, src: &SampleSpec, dst: &SampleSpec) -> Result<()> {
        let previous = self.kernel.take();
        if src.rate() == 0 || dst.rate() == 0 {
            return Err(ConversionError::bad_value(format!(
                "null sample rate ({}Hz -> {}Hz)",
                src.rate(),
                dst.rate()
            )));
        }
        let unchanged = self.core.src() == src && self.core.dst() == dst;
        self.core.configure(src, dst)?;

        if let (true, Some(mut kernel)) = (unchanged, previous) {
            kernel.reset();
            self.kernel = Some(kernel);
            return Ok(());
        }

        match self.create_kernel(src, dst) {
            Ok(kernel) => {
                debug!(
                    engine = self.engine.name(),
                    src_rate = src.rate(),
                    dst_rate = dst.rate(),
                    "resampler created"
                );
                self.kernel = Some(kernel);
                Ok(())
            }
            Err(e) => {
                debug!(engine = self.engine.name(), "resampler not available: {e}");
                Err(e)
            }
        }
    }

    fn convert(&mut self, src: &[u8], dst: Option<&mut [u8]>, in_frames: usize) -> Result<usize> {
        let kernel = self.kernel.as_mut().ok_or(ConversionError::NoInit)?;
        let channels = self.core.src().channel_count() as usize;
        let frame_size = self.core.dst().frame_size();
        let wide = self.core.src().format().is_wide();
        let out_bound = self.core.max_output_frames(in_frames);

        self.core.process(src, dst, in_frames, |src, out, in_frames| {
            let capacity = out.len() / frame_size;
            match kernel {
                Kernel::Integer { handle, input, output } => {
                    try_resize(input, in_frames * channels)?;
                    try_resize(output, capacity * channels)?;
                    decode_into(src, input);
                    let frames = handle.process(input, in_frames, output)?.min(capacity);
                    encode_from(&output[..frames * channels], out);
                    Ok(frames)
                }
                Kernel::Float { handle, max_frames, input, output } => {
                    let needed = in_frames.max(out_bound);
                    if needed > *max_frames {
                        while needed > *max_frames {
                            *max_frames *= 2;
                        }
                        let len = (*max_frames + 1) * channels;
                        try_resize(input, len)?;
                        try_resize(output, len)?;
                    }
                    let in_samples = in_frames * channels;
                    let out_samples = capacity.min(*max_frames + 1) * channels;
                    let buffers = FloatBuffers {
                        channels,
                        input: &mut input[..in_samples],
                        output: &mut output[..out_samples],
                    };
                    if wide {
                        buffers.process::<u32>(handle.as_mut(), src, out, in_frames)
                    } else {
                        buffers.process::<i16>(handle.as_mut(), src, out, in_frames)
                    }
                }
            }
        })
    }

    fn output(&self) -> &[u8] {
        self.core.output()
    }

    fn max_output_frames(&self, in_frames: usize) -> usize {
        self.core.max_output_frames(in_frames)
    }

    fn src_spec(&self) -> &SampleSpec {
        self.core.src()
    }

    fn dst_spec(&self) -> &SampleSpec {
        self.core.dst()
    }
}

struct FloatBuffers<'a> {
    channels: usize,
    input: &'a mut [f32],
    output: &'a mut [f32],
}

impl FloatBuffers<'_> {
    /// Integer to float, engine, float back to integer with clipping.
    fn process<S: Sample>(
        self,
        handle: &mut dyn ResampleHandle<f32>,
        src: &[u8],
        out: &mut [u8],
        in_frames: usize,
    ) -> Result<usize> {
        for (dst, chunk) in self.input.iter_mut().zip(src.chunks_exact(S::BYTES)) {
            *dst = S::read(chunk).to_f32();
        }
        let frames = handle.process(self.input, in_frames, self.output)?;
        let frames = frames.min(self.output.len() / self.channels);
        for (sample, chunk) in self.output[..frames * self.channels]
            .iter()
            .zip(out.chunks_exact_mut(S::BYTES))
        {
            S::from_f32(*sample).write(chunk);
        }
        Ok(frames)
    }
}

/// Rate axis converter with pivot fallback.
pub struct AudioResampler {
    src: SampleSpec,
    dst: SampleSpec,
    primary: Resampler,
    pivot: Resampler,
    pivot_rate: u32,
    use_pivot: bool,
}

impl std::fmt::Debug for AudioResampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioResampler")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("pivot_rate", &self.pivot_rate)
            .field("use_pivot", &self.use_pivot)
            .finish()
    }
}

impl Default for AudioResampler {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioResampler {
    pub fn new() -> Self {
        Self::with_engine(RateEngine::default())
    }

    pub fn with_engine(engine: RateEngine) -> Self {
        Self {
            src: SampleSpec::default(),
            dst: SampleSpec::default(),
            primary: Resampler::new(engine.clone()),
            pivot: Resampler::new(engine),
            pivot_rate: DEFAULT_PIVOT_RATE,
            use_pivot: false,
        }
    }

    pub fn with_pivot_rate(mut self, rate: u32) -> Self {
        self.pivot_rate = rate;
        self
    }

    pub fn with_float_base_frames(mut self, frames: usize) -> Self {
        self.primary = self.primary.with_float_base_frames(frames);
        self.pivot = self.pivot.with_float_base_frames(frames);
        self
    }

    /// Whether the last configure went through the pivot rate.
    pub fn uses_pivot(&self) -> bool {
        self.use_pivot
    }

    pub fn pivot_rate(&self) -> u32 {
        self.pivot_rate
    }

    fn configure_pivot(
        &mut self,
        src: &SampleSpec,
        dst: &SampleSpec,
        direct: ConversionError,
    ) -> Result<()> {
        if self.pivot_rate == 0 || src.rate() == self.pivot_rate || dst.rate() == self.pivot_rate {
            error!(
                src_rate = src.rate(),
                dst_rate = dst.rate(),
                "no resampler available: {direct}"
            );
            return Err(direct);
        }
        debug!(
            src_rate = src.rate(),
            pivot_rate = self.pivot_rate,
            dst_rate = dst.rate(),
            "resampling through pivot rate"
        );
        let mut pivot_spec = src.clone();
        pivot_spec.set_rate(self.pivot_rate);
        self.primary.configure(src, &pivot_spec)?;
        self.pivot.configure(&pivot_spec, dst)?;
        self.use_pivot = true;
        Ok(())
    }
}

impl AudioConverter for AudioResampler {
    fn item(&self) -> SampleSpecItem {
        SampleSpecItem::Rate
    }

    fn configure(&mut self, src: &SampleSpec, dst: &SampleSpec) -> Result<()> {
        self.src = src.clone();
        self.dst = dst.clone();
        self.use_pivot = false;

        match self.primary.configure(src, dst) {
            Ok(()) => Ok(()),
            Err(e @ ConversionError::InvalidOperation(_))
                if SampleSpec::is_item_equal(SampleSpecItem::Channels, src, dst)
                    && SampleSpec::is_item_equal(SampleSpecItem::Format, src, dst)
                    && src.rate() != dst.rate() =>
            {
                self.configure_pivot(src, dst, e)
            }
            Err(e) => Err(e),
        }
    }

    fn convert(&mut self, src: &[u8], dst: Option<&mut [u8]>, in_frames: usize) -> Result<usize> {
        if !self.use_pivot {
            return self.primary.convert(src, dst, in_frames);
        }
        let frames = self.primary.convert(src, None, in_frames)?;
        self.pivot.convert(self.primary.output(), dst, frames)
    }

    fn output(&self) -> &[u8] {
        if self.use_pivot {
            self.pivot.output()
        } else {
            self.primary.output()
        }
    }

    fn max_output_frames(&self, in_frames: usize) -> usize {
        let frames = self.primary.max_output_frames(in_frames);
        if self.use_pivot {
            self.pivot.max_output_frames(frames)
        } else {
            frames
        }
    }

    fn src_spec(&self) -> &SampleSpec {
        &self.src
    }

    fn dst_spec(&self) -> &SampleSpec {
        &self.dst
    }
}
