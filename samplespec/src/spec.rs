//! Sample specification value type.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::format::SampleFormat;

/// Maximum number of channels a [`SampleSpec`] may carry.
pub const MAX_CHANNELS: u32 = 32;

/// Microseconds per second.
pub const USEC_PER_SEC: u64 = 1_000_000;

/// How one channel takes part in channel conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelsPolicy {
    /// The channel is copied as is.
    #[default]
    Copy,
    /// The channel receives the average of the contributing channels.
    Average,
    /// The channel neither contributes nor receives data.
    Ignore,
}

/// One axis of a [`SampleSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleSpecItem {
    /// Channel count and per-channel policy.
    Channels,
    /// Sample container format.
    Format,
    /// Sample rate.
    Rate,
}

impl SampleSpecItem {
    /// All axes in the order the conversion chain visits them.
    pub const ALL: [SampleSpecItem; 3] = [
        SampleSpecItem::Channels,
        SampleSpecItem::Format,
        SampleSpecItem::Rate,
    ];

    /// Returns the position of this axis in [`SampleSpecItem::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            SampleSpecItem::Channels => 0,
            SampleSpecItem::Format => 1,
            SampleSpecItem::Rate => 2,
        }
    }
}

impl std::fmt::Display for SampleSpecItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleSpecItem::Channels => write!(f, "channels"),
            SampleSpecItem::Format => write!(f, "format"),
            SampleSpecItem::Rate => write!(f, "rate"),
        }
    }
}

/// Describes a PCM stream: channels with their policies, format and rate.
///
/// The channel count is always the length of the policy vector. Changing the
/// channel count resets every channel to [`ChannelsPolicy::Copy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SpecRepr", into = "SpecRepr")]
pub struct SampleSpec {
    policy: Vec<ChannelsPolicy>,
    format: SampleFormat,
    rate: u32,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self::new(2, SampleFormat::S16, 48000)
    }
}

impl SampleSpec {
    /// Creates a spec whose channels all use [`ChannelsPolicy::Copy`].
    ///
    /// # Panics
    ///
    /// Panics if `channels` exceeds [`MAX_CHANNELS`].
    pub fn new(channels: u32, format: SampleFormat, rate: u32) -> Self {
        let mut spec = Self {
            policy: Vec::new(),
            format,
            rate,
        };
        spec.set_channel_count(channels);
        spec
    }

    /// Replaces the channel policy vector, see [`SampleSpec::set_channels_policy`].
    pub fn with_policy(mut self, policy: &[ChannelsPolicy]) -> Self {
        self.set_channels_policy(policy);
        self
    }

    pub fn channel_count(&self) -> u32 {
        self.policy.len() as u32
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn channels_policy(&self) -> &[ChannelsPolicy] {
        &self.policy
    }

    /// Sets the channel count and resets every channel to `Copy`.
    ///
    /// # Panics
    ///
    /// Panics if `channels` exceeds [`MAX_CHANNELS`].
    pub fn set_channel_count(&mut self, channels: u32) {
        assert!(
            channels <= MAX_CHANNELS,
            "channel count {channels} exceeds the {MAX_CHANNELS} channel limit"
        );
        self.policy = vec![ChannelsPolicy::Copy; channels as usize];
    }

    pub fn set_format(&mut self, format: SampleFormat) {
        self.format = format;
    }

    pub fn set_rate(&mut self, rate: u32) {
        self.rate = rate;
    }

    /// Replaces the per-channel policy vector.
    ///
    /// A vector whose length differs from the channel count is rejected with
    /// a warning and the current policy is kept.
    pub fn set_channels_policy(&mut self, policy: &[ChannelsPolicy]) {
        if policy.len() != self.policy.len() {
            warn!(
                expected = self.policy.len(),
                got = policy.len(),
                "channels policy length does not match channel count, ignored"
            );
            return;
        }
        self.policy.copy_from_slice(policy);
    }

    /// Returns the scalar value of one axis.
    ///
    /// The format axis is expressed by [`SampleFormat::rank`], so that a
    /// larger value always means a larger sample.
    pub fn item_value(&self, item: SampleSpecItem) -> u32 {
        match item {
            SampleSpecItem::Channels => self.channel_count(),
            SampleSpecItem::Format => self.format.rank(),
            SampleSpecItem::Rate => self.rate,
        }
    }

    /// Copies one axis from `other`. The channel axis brings the policy vector along.
    pub fn copy_item_from(&mut self, item: SampleSpecItem, other: &SampleSpec) {
        match item {
            SampleSpecItem::Channels => self.policy.clone_from(&other.policy),
            SampleSpecItem::Format => self.format = other.format,
            SampleSpecItem::Rate => self.rate = other.rate,
        }
    }

    /// Compares two specs on one axis. The channel axis compares the policy
    /// vectors as well as the counts.
    pub fn is_item_equal(item: SampleSpecItem, a: &SampleSpec, b: &SampleSpec) -> bool {
        match item {
            SampleSpecItem::Channels => a.policy == b.policy,
            SampleSpecItem::Format => a.format == b.format,
            SampleSpecItem::Rate => a.rate == b.rate,
        }
    }

    /// Returns the size of one frame in bytes.
    pub fn frame_size(&self) -> usize {
        self.format.bytes_per_sample() * self.policy.len()
    }

    pub fn frames_to_bytes(&self, frames: usize) -> usize {
        frames * self.frame_size()
    }

    /// Converts a byte count to whole frames. Returns 0 when the frame size is 0.
    pub fn bytes_to_frames(&self, bytes: usize) -> usize {
        let frame_size = self.frame_size();
        if frame_size == 0 {
            error!("bytes_to_frames: null frame size");
            return 0;
        }
        bytes / frame_size
    }

    /// Converts a frame count to microseconds. Returns 0 when the rate is 0.
    pub fn frames_to_usec(&self, frames: u64) -> u64 {
        if self.rate == 0 {
            error!("frames_to_usec: null sample rate");
            return 0;
        }
        frames * USEC_PER_SEC / u64::from(self.rate)
    }

    pub fn usec_to_frames(&self, usec: u64) -> u64 {
        usec * u64::from(self.rate) / USEC_PER_SEC
    }
}

impl std::fmt::Display for SampleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ch {} {}Hz", self.policy.len(), self.format, self.rate)
    }
}

/// Serialized form of [`SampleSpec`]. The policy may be omitted, in which
/// case every channel is `Copy`.
#[derive(Serialize, Deserialize)]
struct SpecRepr {
    channels: u32,
    format: SampleFormat,
    rate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    policy: Option<Vec<ChannelsPolicy>>,
}

impl TryFrom<SpecRepr> for SampleSpec {
    type Error = String;

    fn try_from(repr: SpecRepr) -> Result<Self, Self::Error> {
        if repr.channels > MAX_CHANNELS {
            return Err(format!(
                "channel count {} exceeds the {MAX_CHANNELS} channel limit",
                repr.channels
            ));
        }
        let mut spec = SampleSpec::new(repr.channels, repr.format, repr.rate);
        if let Some(policy) = repr.policy {
            if policy.len() != repr.channels as usize {
                return Err(format!(
                    "policy has {} entries for {} channels",
                    policy.len(),
                    repr.channels
                ));
            }
            spec.policy = policy;
        }
        Ok(spec)
    }
}

impl From<SampleSpec> for SpecRepr {
    fn from(spec: SampleSpec) -> Self {
        let policy = if spec.policy.iter().all(|p| *p == ChannelsPolicy::Copy) {
            None
        } else {
            Some(spec.policy.clone())
        };
        SpecRepr {
            channels: spec.channel_count(),
            format: spec.format,
            rate: spec.rate,
            policy,
        }
    }
}
