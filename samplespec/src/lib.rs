//! PCM sample specification.
//!
//! A [`SampleSpec`] describes one end of an audio stream: how many channels
//! it carries, how each channel takes part in mixing ([`ChannelsPolicy`]),
//! the sample container format and the sample rate. The conversion crate
//! compares two specs axis by axis ([`SampleSpecItem`]) to decide which
//! converters it needs.
//!
//! # Example
//!
//! ```
//! use audioconv_samplespec::{SampleFormat, SampleSpec};
//!
//! let spec = SampleSpec::new(2, SampleFormat::S16, 48000);
//! assert_eq!(spec.frame_size(), 4);
//! assert_eq!(spec.frames_to_bytes(480), 1920);
//! assert_eq!(spec.frames_to_usec(480), 10_000);
//! ```

pub mod format;
pub mod spec;
pub mod utils;

pub use format::*;
pub use spec::*;
pub use utils::*;
