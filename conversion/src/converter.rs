//! Common contract of the per-axis converters.

use audioconv_samplespec::{SampleSpec, SampleSpecItem, convert_src_to_dst_in_frames};
use tracing::debug;

use crate::buffer::ScratchBuffer;
use crate::error::{ConversionError, Result};

/// A converter responsible for exactly one [`SampleSpecItem`].
///
/// A converter is configured with a source and destination spec that differ
/// on its axis only. Conversions either write into a caller buffer or into
/// the converter's own scratch buffer, readable through [`AudioConverter::output`]
/// until the next call.
pub trait AudioConverter: Send {
    /// The axis this converter changes.
    fn item(&self) -> SampleSpecItem;

    /// Selects the conversion for `src -> dst`.
    fn configure(&mut self, src: &SampleSpec, dst: &SampleSpec) -> Result<()>;

    /// Converts `in_frames` frames from `src`.
    ///
    /// When `dst` is `None` the result lands in the scratch buffer. Returns
    /// the number of destination frames produced.
    fn convert(&mut self, src: &[u8], dst: Option<&mut [u8]>, in_frames: usize) -> Result<usize>;

    /// Frames produced into the scratch buffer by the last conversion.
    fn output(&self) -> &[u8];

    /// Upper bound of the frames produced from `in_frames` input frames.
    fn max_output_frames(&self, in_frames: usize) -> usize;

    fn src_spec(&self) -> &SampleSpec;

    fn dst_spec(&self) -> &SampleSpec;
}

/// State shared by every converter: the configured specs and the scratch
/// output buffer.
#[derive(Debug)]
pub struct ConverterCore {
    item: SampleSpecItem,
    src: SampleSpec,
    dst: SampleSpec,
    scratch: ScratchBuffer,
}

impl ConverterCore {
    pub fn new(item: SampleSpecItem) -> Self {
        Self {
            item,
            src: SampleSpec::default(),
            dst: SampleSpec::default(),
            scratch: ScratchBuffer::new(),
        }
    }

    pub fn src(&self) -> &SampleSpec {
        &self.src
    }

    pub fn dst(&self) -> &SampleSpec {
        &self.dst
    }

    /// Stores the specs and checks that they differ on this axis only.
    ///
    /// Releases the scratch buffer on success.
    pub fn configure(&mut self, src: &SampleSpec, dst: &SampleSpec) -> Result<()> {
        self.src = src.clone();
        self.dst = dst.clone();

        for other in SampleSpecItem::ALL {
            if other != self.item && !SampleSpec::is_item_equal(other, src, dst) {
                return Err(ConversionError::invalid(format!(
                    "{} converter cannot change {} ({src} -> {dst})",
                    self.item, other
                )));
            }
        }
        if SampleSpec::is_item_equal(self.item, src, dst) {
            return Err(ConversionError::invalid(format!(
                "{} converter has nothing to do ({src} -> {dst})",
                self.item
            )));
        }

        self.scratch.reset();
        debug!(item = %self.item, %src, %dst, "converter configured");
        Ok(())
    }

    /// Destination frames for `in_frames` source frames plus one frame of
    /// slack for resampler overshoot.
    pub fn max_output_frames(&self, in_frames: usize) -> usize {
        let frames = if self.src.rate() == self.dst.rate()
            || self.src.rate() == 0
            || self.dst.rate() == 0
        {
            in_frames
        } else {
            convert_src_to_dst_in_frames(in_frames, &self.src, &self.dst)
        };
        frames + 1
    }

    /// Runs `f` over the source frames and the output buffer.
    ///
    /// `f` receives the source bytes of exactly `in_frames` frames, the
    /// output bytes (caller buffer or scratch sized for the worst case) and
    /// `in_frames`, and returns the number of frames it wrote.
    pub fn process<F>(
        &mut self,
        src: &[u8],
        dst: Option<&mut [u8]>,
        in_frames: usize,
        f: F,
    ) -> Result<usize>
    where
        F: FnOnce(&[u8], &mut [u8], usize) -> Result<usize>,
    {
        let needed = self.src.frames_to_bytes(in_frames);
        if src.len() < needed {
            return Err(ConversionError::bad_value(format!(
                "source holds {} bytes, {in_frames} frames need {needed}",
                src.len()
            )));
        }
        let src = &src[..needed];

        match dst {
            Some(out) => f(src, out, in_frames),
            None => {
                let bytes = self.dst.frames_to_bytes(self.max_output_frames(in_frames));
                let out = self.scratch.reserve(bytes)?;
                let frames = f(src, out, in_frames)?;
                self.scratch.set_filled(self.dst.frames_to_bytes(frames));
                Ok(frames)
            }
        }
    }

    pub fn output(&self) -> &[u8] {
        self.scratch.filled()
    }

    pub fn scratch_size(&self) -> usize {
        self.scratch.size()
    }
}

/// Fails unless `out` can hold `bytes` bytes.
pub(crate) fn check_room(out: &[u8], bytes: usize) -> Result<()> {
    if out.len() < bytes {
        return Err(ConversionError::bad_value(format!(
            "destination holds {} bytes, {bytes} needed",
            out.len()
        )));
    }
    Ok(())
}
