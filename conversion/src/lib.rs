//! Chained PCM audio conversion.
//!
//! Converts frames between two [`SampleSpec`]s by linking up to three
//! converters, one per axis:
//!
//! - [`AudioRemapper`]: channel count and channel policy
//! - [`AudioReformatter`]: sample container format
//! - [`AudioResampler`]: sample rate, through a pluggable [`RateEngine`]
//!
//! [`AudioConversion`] builds the chain and offers two entry points:
//! [`AudioConversion::convert`] for buffers the caller already holds, and
//! [`AudioConversion::get_converted_buffer`], which pulls source frames from
//! a [`BufferProvider`] and always returns exactly the requested number of
//! destination frames.
//!
//! # Example
//!
//! ```
//! use audioconv::{AudioConversion, SliceProvider};
//! use audioconv_samplespec::{SampleFormat, SampleSpec};
//!
//! let src = SampleSpec::new(2, SampleFormat::S16, 48000);
//! let dst = SampleSpec::new(1, SampleFormat::S8_24, 48000);
//!
//! let mut conversion = AudioConversion::new();
//! conversion.configure(&src, &dst).unwrap();
//!
//! let input = vec![0u8; src.frames_to_bytes(480)];
//! let mut provider = SliceProvider::new(&input, src.frame_size());
//! let mut out = vec![0u8; dst.frames_to_bytes(240)];
//! conversion.get_converted_buffer(&mut out, 240, &mut provider).unwrap();
//! ```

pub mod buffer;
pub mod config;
pub mod conversion;
pub mod converter;
pub mod error;
pub mod provider;
pub mod reformatter;
pub mod remapper;
pub mod resampler;
pub mod sample;

pub use audioconv_samplespec::{ChannelsPolicy, SampleFormat, SampleSpec, SampleSpecItem};
pub use config::{ConversionConfig, ResamplerBackend};
pub use conversion::AudioConversion;
pub use converter::{AudioConverter, ConverterCore};
pub use error::{ConversionError, Result};
pub use provider::{BufferProvider, ReaderProvider, SliceProvider};
pub use reformatter::AudioReformatter;
pub use remapper::AudioRemapper;
pub use resampler::{AudioResampler, RateEngine, ResampleEngine, ResampleHandle, Resampler};
