//! Conversion chain orchestration.
//!
//! [`AudioConversion`] owns one converter per axis and, on configure, links
//! the ones needed to turn the source spec into the destination spec. Axes
//! are visited in the order channels, format, rate: an axis that shrinks the
//! data is converted before the later axes, an axis that grows it after them.
//!
//! # Example
//!
//! ```
//! use audioconv::AudioConversion;
//! use audioconv_samplespec::{SampleFormat, SampleSpec, SampleSpecItem};
//!
//! let src = SampleSpec::new(2, SampleFormat::S16, 44100);
//! let dst = SampleSpec::new(1, SampleFormat::S16, 44100);
//!
//! let mut conversion = AudioConversion::new();
//! conversion.configure(&src, &dst).unwrap();
//! assert_eq!(conversion.chain(), &[SampleSpecItem::Channels]);
//!
//! let input: Vec<u8> = [10i16, 10, 2, 9].iter().flat_map(|s| s.to_le_bytes()).collect();
//! let (out, frames) = conversion.convert(&input, 2).unwrap();
//! assert_eq!(frames, 2);
//! assert_eq!(out, &[10, 0, 5, 0]);
//! ```

use audioconv_samplespec::{SampleSpec, SampleSpecItem, convert_src_to_dst_in_frames};
use tracing::{debug, error, warn};

use crate::buffer::try_resize;
use crate::config::ConversionConfig;
use crate::converter::AudioConverter;
use crate::error::{ConversionError, Result};
use crate::provider::BufferProvider;
use crate::reformatter::AudioReformatter;
use crate::remapper::AudioRemapper;
use crate::resampler::{AudioResampler, RateEngine};

type Converter = Box<dyn AudioConverter>;

/// Destination frames converted ahead of what the caller asked for.
#[derive(Debug, Default)]
struct AccumulationBuffer {
    data: Vec<u8>,
    size_in_frames: usize,
    /// Converted frames not yet delivered.
    frames: usize,
}

impl AccumulationBuffer {
    fn reset(&mut self) {
        self.data = Vec::new();
        self.size_in_frames = 0;
        self.frames = 0;
    }

    /// Grows to `frames` frames, keeping the undelivered content.
    fn grow(&mut self, frames: usize, frame_size: usize) -> Result<()> {
        try_resize(&mut self.data, frames * frame_size)?;
        self.size_in_frames = frames;
        Ok(())
    }

    fn room(&self) -> usize {
        self.size_in_frames - self.frames
    }

    /// Hands `frames` frames to `dst` and moves the rest to the front.
    fn deliver(&mut self, dst: &mut [u8], frames: usize, frame_size: usize) {
        let bytes = frames * frame_size;
        let held = self.frames * frame_size;
        dst[..bytes].copy_from_slice(&self.data[..bytes]);
        self.data.copy_within(bytes..held, 0);
        self.frames -= frames;
    }
}

/// Converts PCM frames between two sample specs.
///
/// One instance serves one stream. Every `configure` rebuilds the chain and
/// drops any frames held for the pull API.
pub struct AudioConversion {
    /// One converter per axis, indexed by [`SampleSpecItem::index`].
    converters: [Converter; 3],
    chain: Vec<SampleSpecItem>,
    src: SampleSpec,
    dst: SampleSpec,
    configured: bool,
    acc: AccumulationBuffer,
    margin_frames: usize,
}

impl std::fmt::Debug for AudioConversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioConversion")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("chain", &self.chain)
            .field("configured", &self.configured)
            .finish()
    }
}

impl Default for AudioConversion {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioConversion {
    /// Creates a conversion with the default configuration and engine.
    pub fn new() -> Self {
        Self::with_engine(ConversionConfig::default(), RateEngine::default())
    }

    /// Creates a conversion with the engine named in `cfg`.
    pub fn with_config(cfg: ConversionConfig) -> Result<Self> {
        let engine = RateEngine::from_backend(cfg.resampler)?;
        Ok(Self::with_engine(cfg, engine))
    }

    /// Creates a conversion resampling with `engine`.
    pub fn with_engine(cfg: ConversionConfig, engine: RateEngine) -> Self {
        let resampler = AudioResampler::with_engine(engine)
            .with_pivot_rate(cfg.pivot_rate)
            .with_float_base_frames(cfg.float_base_frames);
        Self {
            converters: [
                Box::new(AudioRemapper::new()),
                Box::new(AudioReformatter::new()),
                Box::new(resampler),
            ],
            chain: Vec::new(),
            src: SampleSpec::default(),
            dst: SampleSpec::default(),
            configured: false,
            acc: AccumulationBuffer::default(),
            margin_frames: cfg.margin_frames(),
        }
    }

    /// Axes converted by the current chain, in processing order.
    pub fn chain(&self) -> &[SampleSpecItem] {
        &self.chain
    }

    pub fn src_spec(&self) -> &SampleSpec {
        &self.src
    }

    pub fn dst_spec(&self) -> &SampleSpec {
        &self.dst
    }

    /// Whether the last configure succeeded.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Builds the chain converting `src` into `dst`.
    ///
    /// Identical specs give an empty chain. A zero sample rate on either side
    /// is a `BadValue`. On failure the instance stays unconfigured.
    ///
    /// # Panics
    ///
    /// Panics if the chain it built does not lead to `dst`.
    pub fn configure(&mut self, src: &SampleSpec, dst: &SampleSpec) -> Result<()> {
        self.chain.clear();
        self.acc.reset();
        self.configured = false;
        self.src = src.clone();
        self.dst = dst.clone();

        if src.rate() == 0 || dst.rate() == 0 {
            error!(%src, %dst, "null sample rate");
            return Err(ConversionError::bad_value(format!(
                "null sample rate ({}Hz -> {}Hz)",
                src.rate(),
                dst.rate()
            )));
        }

        if src == dst {
            debug!(%src, "no conversion needed");
            self.configured = true;
            return Ok(());
        }

        let mut working = src.clone();
        if let Err(e) = self.add_converters_from(0, &mut working) {
            error!(%src, %dst, "conversion not available: {e}");
            self.chain.clear();
            return Err(e);
        }
        assert_eq!(working, *dst, "conversion chain does not reach the destination spec");

        debug!(%src, %dst, chain = ?self.chain, "conversion configured");
        self.configured = true;
        Ok(())
    }

    /// Shrinking conversion on `axis`, then the later axes, then a growing
    /// conversion on `axis` if it still differs.
    fn add_converters_from(&mut self, axis: usize, working: &mut SampleSpec) -> Result<()> {
        let Some(&item) = SampleSpecItem::ALL.get(axis) else {
            return Ok(());
        };
        if working.item_value(item) > self.dst.item_value(item) {
            self.add_converter(item, working)?;
        }
        self.add_converters_from(axis + 1, working)?;
        if !SampleSpec::is_item_equal(item, working, &self.dst) {
            self.add_converter(item, working)?;
        }
        Ok(())
    }

    fn add_converter(&mut self, item: SampleSpecItem, working: &mut SampleSpec) -> Result<()> {
        let mut next = working.clone();
        next.copy_item_from(item, &self.dst);
        self.converters[item.index()].configure(working, &next)?;
        self.chain.push(item);
        *working = next;
        Ok(())
    }

    /// Converts `in_frames` frames of `src`.
    ///
    /// With an empty chain the source is returned as is. Otherwise the
    /// result lives in the last converter's scratch buffer until the next call.
    pub fn convert<'a>(&'a mut self, src: &'a [u8], in_frames: usize) -> Result<(&'a [u8], usize)> {
        if !self.configured {
            return Err(ConversionError::NoInit);
        }
        let Some(last) = self.chain.last().copied() else {
            let bytes = self.src.frames_to_bytes(in_frames);
            if src.len() < bytes {
                return Err(ConversionError::bad_value(format!(
                    "source holds {} bytes, {in_frames} frames need {bytes}",
                    src.len()
                )));
            }
            return Ok((&src[..bytes], in_frames));
        };

        let frames = run_chain(&mut self.converters, &self.chain, src, None, in_frames)?;
        Ok((self.converters[last.index()].output(), frames))
    }

    /// Converts `in_frames` frames of `src` into `dst`.
    ///
    /// `dst` must hold the worst-case output, see
    /// [`AudioConversion::max_output_frames`].
    pub fn convert_into(&mut self, src: &[u8], dst: &mut [u8], in_frames: usize) -> Result<usize> {
        if !self.configured {
            return Err(ConversionError::NoInit);
        }
        if self.chain.is_empty() {
            let bytes = self.src.frames_to_bytes(in_frames);
            if src.len() < bytes || dst.len() < bytes {
                return Err(ConversionError::bad_value(format!(
                    "{in_frames} frames need {bytes} bytes, source holds {} and destination {}",
                    src.len(),
                    dst.len()
                )));
            }
            dst[..bytes].copy_from_slice(&src[..bytes]);
            return Ok(in_frames);
        }
        run_chain(&mut self.converters, &self.chain, src, Some(dst), in_frames)
    }

    /// Upper bound of the frames the chain produces from `in_frames` frames.
    pub fn max_output_frames(&self, in_frames: usize) -> usize {
        self.chain
            .iter()
            .fold(in_frames, |frames, item| self.converters[item.index()].max_output_frames(frames))
    }

    /// Fills `dst` with exactly `frames` converted frames pulled from `provider`.
    ///
    /// Frames converted beyond the request are kept for the next call.
    pub fn get_converted_buffer(
        &mut self,
        dst: &mut [u8],
        frames: usize,
        provider: &mut dyn BufferProvider,
    ) -> Result<()> {
        if !self.configured || self.chain.is_empty() {
            return Err(ConversionError::NoInit);
        }
        let frame_size = self.dst.frame_size();
        let out_bytes = frame_size * frames;
        if dst.len() < out_bytes {
            return Err(ConversionError::bad_value(format!(
                "destination holds {} bytes, {frames} frames need {out_bytes}",
                dst.len()
            )));
        }

        if self.acc.size_in_frames < frames {
            let size = frames + self.margin_frames;
            debug!(frames = size, "growing accumulation buffer");
            self.acc.grow(size, frame_size)?;
        }

        let mut remaining = frames.saturating_sub(self.acc.frames);
        while remaining > 0 {
            let wanted = convert_src_to_dst_in_frames(remaining, &self.dst, &self.src);
            let buffer = provider.next_buffer(wanted)?;
            let got = self.src.bytes_to_frames(buffer.len());

            let converted = if got == 0 {
                Err(ConversionError::NotEnoughData)
            } else {
                let bound = self.max_output_frames(got);
                if bound > self.acc.room() {
                    let size = self.acc.frames + bound;
                    warn!(frames = size, "accumulation margin exceeded, growing");
                    self.acc.grow(size, frame_size)?;
                }
                let start = self.acc.frames * frame_size;
                run_chain(
                    &mut self.converters,
                    &self.chain,
                    buffer,
                    Some(&mut self.acc.data[start..]),
                    got,
                )
            };
            provider.release_buffer(got);

            let converted = converted?;
            self.acc.frames += converted;
            remaining -= remaining.min(converted);
        }

        self.acc.deliver(dst, frames, frame_size);
        Ok(())
    }
}

/// Runs `src` through the converters listed in `chain`. The last one writes
/// into `dst` when given.
fn run_chain(
    converters: &mut [Converter; 3],
    chain: &[SampleSpecItem],
    src: &[u8],
    mut dst: Option<&mut [u8]>,
    in_frames: usize,
) -> Result<usize> {
    let last = chain.len() - 1;
    let mut frames = in_frames;
    for (pos, item) in chain.iter().enumerate() {
        let out = if pos == last { dst.take() } else { None };
        frames = if pos == 0 {
            converters[item.index()].convert(src, out, frames)?
        } else {
            let (input, converter) = pair_mut(converters, chain[pos - 1].index(), item.index());
            converter.convert(input.output(), out, frames)?
        };
    }
    Ok(frames)
}

/// Borrows converter `read` shared and converter `write` exclusively.
fn pair_mut(
    converters: &mut [Converter; 3],
    read: usize,
    write: usize,
) -> (&Converter, &mut Converter) {
    if read < write {
        let (head, tail) = converters.split_at_mut(write);
        (&head[read], &mut tail[0])
    } else {
        let (head, tail) = converters.split_at_mut(read);
        (&tail[0], &mut head[write])
    }
}
