//! Sample container formats.

use serde::{Deserialize, Serialize};

/// PCM sample container format.
///
/// Variants are declared from the narrowest to the widest container so the
/// derived ordering can be used to tell whether a format change shrinks or
/// grows the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// Signed 16-bit little-endian.
    S16,
    /// Signed Q8.24 fixed point in a 32-bit little-endian container.
    #[serde(rename = "s8_24")]
    S8_24,
    /// Signed 32-bit little-endian, left-justified.
    S32,
}

impl SampleFormat {
    /// Returns the number of bytes of one sample of one channel.
    pub const fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::S16 => 2,
            SampleFormat::S8_24 | SampleFormat::S32 => 4,
        }
    }

    /// Returns the ordinal used when comparing two specs on the format axis.
    pub const fn rank(&self) -> u32 {
        match self {
            SampleFormat::S16 => 0,
            SampleFormat::S8_24 => 1,
            SampleFormat::S32 => 2,
        }
    }

    /// Returns true for formats stored in a 32-bit container.
    pub const fn is_wide(&self) -> bool {
        self.bytes_per_sample() == 4
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleFormat::S16 => write!(f, "s16"),
            SampleFormat::S8_24 => write!(f, "s8_24"),
            SampleFormat::S32 => write!(f, "s32"),
        }
    }
}
