//! Channel count and channel policy conversion.

use audioconv_samplespec::{ChannelsPolicy, SampleSpec, SampleSpecItem};
use tracing::error;

use crate::converter::{AudioConverter, ConverterCore, check_room};
use crate::error::{ConversionError, Result};
use crate::sample::Sample;

const LEFT: usize = 0;
const RIGHT: usize = 1;
const BACK_LEFT: usize = 2;
const BACK_RIGHT: usize = 3;

/// Channel conversion algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemapStrategy {
    /// Averages the contributing source channels into every non-ignored
    /// destination channel.
    NToM,
    /// Duplicates front left/right into back left/right.
    StereoToQuad,
    /// Folds back channels onto the front pair.
    QuadToStereo,
    /// Stereo to stereo where only the channel policies differ.
    StereoPolicy,
}

/// Supported `(source channels, destination channels)` pairs.
pub const SUPPORTED_REMAPS: &[(u32, u32, RemapStrategy)] = &[
    (1, 2, RemapStrategy::NToM),
    (1, 4, RemapStrategy::NToM),
    (1, 8, RemapStrategy::NToM),
    (2, 1, RemapStrategy::NToM),
    (2, 2, RemapStrategy::StereoPolicy),
    (2, 4, RemapStrategy::StereoToQuad),
    (2, 8, RemapStrategy::NToM),
    (4, 1, RemapStrategy::NToM),
    (4, 2, RemapStrategy::QuadToStereo),
    (8, 1, RemapStrategy::NToM),
    (8, 2, RemapStrategy::NToM),
];

impl RemapStrategy {
    pub fn lookup(src_channels: u32, dst_channels: u32) -> Option<Self> {
        SUPPORTED_REMAPS
            .iter()
            .find(|(s, d, _)| *s == src_channels && *d == dst_channels)
            .map(|(_, _, r)| *r)
    }
}

/// Channel conversion over one sample type.
struct Remap<'a> {
    src_policy: &'a [ChannelsPolicy],
    dst_policy: &'a [ChannelsPolicy],
}

impl Remap<'_> {
    fn run<S: Sample>(&self, strategy: RemapStrategy, src: &[u8], dst: &mut [u8], frames: usize) {
        let in_size = self.src_policy.len() * S::BYTES;
        let out_size = self.dst_policy.len() * S::BYTES;

        for (input, output) in src
            .chunks_exact(in_size)
            .zip(dst.chunks_exact_mut(out_size))
            .take(frames)
        {
            match strategy {
                RemapStrategy::NToM => self.n_to_m::<S>(input, output),
                RemapStrategy::StereoToQuad => stereo_to_quad::<S>(input, output),
                RemapStrategy::QuadToStereo => self.quad_to_stereo::<S>(input, output),
                RemapStrategy::StereoPolicy => self.stereo_policy::<S>(input, output),
            }
        }
    }

    /// Averages the non-ignored channels among `channels`, rounding toward
    /// negative infinity. Returns 0 when none contributes.
    fn average<S: Sample>(&self, frame: &[u8], channels: impl IntoIterator<Item = usize>) -> S {
        let mut sum = 0i64;
        let mut count = 0i64;
        for ch in channels {
            if self.src_policy[ch] != ChannelsPolicy::Ignore {
                sum += sample_at::<S>(frame, ch).widen();
                count += 1;
            }
        }
        if count == 0 {
            return S::default();
        }
        S::narrow(sum.div_euclid(count))
    }

    fn n_to_m<S: Sample>(&self, input: &[u8], output: &mut [u8]) {
        let value: S = self.average(input, 0..self.src_policy.len());
        for (ch, policy) in self.dst_policy.iter().enumerate() {
            if *policy != ChannelsPolicy::Ignore {
                put_sample(output, ch, value);
            }
        }
    }

    fn quad_to_stereo<S: Sample>(&self, input: &[u8], output: &mut [u8]) {
        let right: S = self.average(input, [RIGHT, BACK_RIGHT]);
        let left: S = self.average(input, [LEFT, BACK_LEFT]);
        put_sample(output, RIGHT, right);
        put_sample(output, LEFT, left);
    }

    fn stereo_policy<S: Sample>(&self, input: &[u8], output: &mut [u8]) {
        let valid: S = self.average(input, [LEFT, RIGHT]);
        for ch in [LEFT, RIGHT] {
            let value = match self.dst_policy[ch] {
                ChannelsPolicy::Ignore => S::default(),
                ChannelsPolicy::Average => valid,
                ChannelsPolicy::Copy if self.src_policy[ch] != ChannelsPolicy::Ignore => {
                    sample_at(input, ch)
                }
                ChannelsPolicy::Copy => valid,
            };
            put_sample(output, ch, value);
        }
    }
}

fn stereo_to_quad<S: Sample>(input: &[u8], output: &mut [u8]) {
    let left: S = sample_at(input, LEFT);
    let right: S = sample_at(input, RIGHT);
    put_sample(output, LEFT, left);
    put_sample(output, RIGHT, right);
    put_sample(output, BACK_LEFT, left);
    put_sample(output, BACK_RIGHT, right);
}

#[inline]
fn sample_at<S: Sample>(frame: &[u8], ch: usize) -> S {
    S::read(&frame[ch * S::BYTES..])
}

#[inline]
fn put_sample<S: Sample>(frame: &mut [u8], ch: usize, value: S) {
    value.write(&mut frame[ch * S::BYTES..]);
}

/// Channel axis converter.
#[derive(Debug)]
pub struct AudioRemapper {
    core: ConverterCore,
    strategy: Option<RemapStrategy>,
}

impl Default for AudioRemapper {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioRemapper {
    pub fn new() -> Self {
        Self {
            core: ConverterCore::new(SampleSpecItem::Channels),
            strategy: None,
        }
    }

    /// The algorithm selected by the last successful configure.
    pub fn strategy(&self) -> Option<RemapStrategy> {
        self.strategy
    }
}

impl AudioConverter for AudioRemapper {
    fn item(&self) -> SampleSpecItem {
        SampleSpecItem::Channels
    }

    fn configure(&mut self, src: &SampleSpec, dst: &SampleSpec) -> Result<()> {
        self.strategy = None;
        self.core.configure(src, dst)?;

        let Some(strategy) = RemapStrategy::lookup(src.channel_count(), dst.channel_count()) else {
            error!(
                src = src.channel_count(),
                dst = dst.channel_count(),
                "remapper not available"
            );
            return Err(ConversionError::invalid(format!(
                "no remapper from {} to {} channels",
                src.channel_count(),
                dst.channel_count()
            )));
        };
        if strategy == RemapStrategy::StereoPolicy && src.channels_policy() == dst.channels_policy()
        {
            return Err(ConversionError::invalid("stereo channel policies are identical"));
        }
        self.strategy = Some(strategy);
        Ok(())
    }

    fn convert(&mut self, src: &[u8], dst: Option<&mut [u8]>, in_frames: usize) -> Result<usize> {
        let strategy = self.strategy.ok_or(ConversionError::NoInit)?;
        let out_bytes = self.core.dst().frames_to_bytes(in_frames);
        let wide = self.core.src().format().is_wide();
        let src_policy = self.core.src().channels_policy().to_vec();
        let dst_policy = self.core.dst().channels_policy().to_vec();

        self.core.process(src, dst, in_frames, |src, out, frames| {
            check_room(out, out_bytes)?;
            let remap = Remap {
                src_policy: &src_policy,
                dst_policy: &dst_policy,
            };
            if wide {
                remap.run::<u32>(strategy, src, out, frames);
            } else {
                remap.run::<i16>(strategy, src, out, frames);
            }
            Ok(frames)
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
