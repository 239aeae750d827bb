//! Sample format conversion.
//!
//! Every reformat keeps the frame count. Narrowing truncates, no dithering
//! or rounding is applied.

use audioconv_samplespec::{SampleFormat, SampleSpec, SampleSpecItem};
use tracing::error;

use crate::converter::{AudioConverter, ConverterCore, check_room};
use crate::error::{ConversionError, Result};
use crate::sample::Sample;

/// A supported format conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reformat {
    S16ToS8_24,
    S8_24ToS16,
    S16ToS32,
    S32ToS16,
}

/// Supported `(source, destination)` format pairs.
pub const SUPPORTED_REFORMATS: &[(SampleFormat, SampleFormat, Reformat)] = &[
    (SampleFormat::S16, SampleFormat::S8_24, Reformat::S16ToS8_24),
    (SampleFormat::S8_24, SampleFormat::S16, Reformat::S8_24ToS16),
    (SampleFormat::S16, SampleFormat::S32, Reformat::S16ToS32),
    (SampleFormat::S32, SampleFormat::S16, Reformat::S32ToS16),
];

impl Reformat {
    /// Looks up the conversion for a format pair.
    pub fn lookup(src: SampleFormat, dst: SampleFormat) -> Option<Self> {
        SUPPORTED_REFORMATS
            .iter()
            .find(|(s, d, _)| *s == src && *d == dst)
            .map(|(_, _, r)| *r)
    }

    fn run(self, src: &[u8], dst: &mut [u8], samples: usize) {
        match self {
            Reformat::S16ToS8_24 => map_samples(src, dst, samples, s16_to_q8_24),
            Reformat::S8_24ToS16 => map_samples(src, dst, samples, q8_24_to_s16),
            Reformat::S16ToS32 => map_samples(src, dst, samples, s16_to_s32),
            Reformat::S32ToS16 => map_samples(src, dst, samples, s32_to_s16),
        }
    }
}

/// Moves a 16-bit sample into bits 8..24 of a 32-bit word.
#[inline]
pub fn s16_to_q8_24(s: i16) -> u32 {
    ((s as i32 as u32) << 16) >> 8
}

/// Takes bits 8..24 of an 8.24 word as a 16-bit sample.
#[inline]
pub fn q8_24_to_s16(x: u32) -> i16 {
    (((x as i32) << 8) >> 16) as i16
}

#[inline]
pub fn s16_to_s32(s: i16) -> u32 {
    ((s as i32) << 16) as u32
}

#[inline]
pub fn s32_to_s16(x: u32) -> i16 {
    ((x as i32) >> 16) as i16
}

fn map_samples<A: Sample, B: Sample>(src: &[u8], dst: &mut [u8], samples: usize, f: fn(A) -> B) {
    for (i, o) in src
        .chunks_exact(A::BYTES)
        .zip(dst.chunks_exact_mut(B::BYTES))
        .take(samples)
    {
        f(A::read(i)).write(o);
    }
}

/// Format axis converter.
#[derive(Debug)]
pub struct AudioReformatter {
    core: ConverterCore,
    reformat: Option<Reformat>,
}

impl Default for AudioReformatter {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioReformatter {
    pub fn new() -> Self {
        Self {
            core: ConverterCore::new(SampleSpecItem::Format),
            reformat: None,
        }
    }

    /// The conversion selected by the last successful configure.
    pub fn reformat(&self) -> Option<Reformat> {
        self.reformat
    }
}

impl AudioConverter for AudioReformatter {
    fn item(&self) -> SampleSpecItem {
        SampleSpecItem::Format
    }

    fn configure(&mut self, src: &SampleSpec, dst: &SampleSpec) -> Result<()> {
        self.reformat = None;
        self.core.configure(src, dst)?;

        let Some(reformat) = Reformat::lookup(src.format(), dst.format()) else {
            error!(src = %src.format(), dst = %dst.format(), "reformatter not available");
            return Err(ConversionError::invalid(format!(
                "no reformatter from {} to {}",
                src.format(),
                dst.format()
            )));
        };
        self.reformat = Some(reformat);
        Ok(())
    }

    fn convert(&mut self, src: &[u8], dst: Option<&mut [u8]>, in_frames: usize) -> Result<usize> {
        let reformat = self.reformat.ok_or(ConversionError::NoInit)?;
        let channels = self.core.src().channel_count() as usize;
        let out_bytes = self.core.dst().frames_to_bytes(in_frames);

        self.core.process(src, dst, in_frames, |src, out, frames| {
            check_room(out, out_bytes)?;
            reformat.run(src, out, frames * channels);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(format: SampleFormat) -> SampleSpec {
        SampleSpec::new(2, format, 44100)
    }

    fn to_bytes16(v: &[u16]) -> Vec<u8> {
        v.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn to_bytes32(v: &[u32]) -> Vec<u8> {
        v.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_s16_to_q8_24() {
        assert_eq!(s16_to_q8_24(0xDEADu16 as i16), 0x00DE_AD00);
        assert_eq!(s16_to_q8_24(0x1234), 0x0012_3400);
        assert_eq!(s16_to_q8_24(-1), 0x00FF_FF00);
        assert_eq!(s16_to_q8_24(0), 0);
    }

    #[test]
    fn test_q8_24_to_s16() {
        assert_eq!(q8_24_to_s16(0x00AD_BEEF) as u16, 0xADBE);
        assert_eq!(q8_24_to_s16(0xBEEF_DEAD) as u16, 0xEFDE);
        assert_eq!(q8_24_to_s16(0x1234_5678) as u16, 0x3456);
        assert_eq!(q8_24_to_s16(0x0000_FFFF) as u16, 0x00FF);
        assert_eq!(q8_24_to_s16(0xFFFF_0000) as u16, 0xFF00);
    }

    #[test]
    fn test_s16_s32() {
        assert_eq!(s16_to_s32(0x1234), 0x1234_0000);
        assert_eq!(s16_to_s32(-1), 0xFFFF_0000);
        assert_eq!(s32_to_s16(0x1234_5678), 0x1234);
        assert_eq!(s32_to_s16(0xFFFF_0000) as u16, 0xFFFF);
        assert_eq!(s32_to_s16(0x8000_0000) as u16, 0x8000);
    }

    #[test]
    fn test_lookup_table() {
        assert_eq!(
            Reformat::lookup(SampleFormat::S16, SampleFormat::S8_24),
            Some(Reformat::S16ToS8_24)
        );
        assert_eq!(
            Reformat::lookup(SampleFormat::S32, SampleFormat::S16),
            Some(Reformat::S32ToS16)
        );
        assert_eq!(Reformat::lookup(SampleFormat::S8_24, SampleFormat::S32), None);
        assert_eq!(Reformat::lookup(SampleFormat::S16, SampleFormat::S16), None);
    }

    #[test]
    fn test_configure_unsupported_pair() {
        let mut r = AudioReformatter::new();
        let err = r.configure(&spec(SampleFormat::S8_24), &spec(SampleFormat::S32)).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidOperation(_)));
        assert_eq!(r.reformat(), None);
    }

    #[test]
    fn test_convert_without_configure() {
        let mut r = AudioReformatter::new();
        let err = r.convert(&[0u8; 4], None, 1).unwrap_err();
        assert!(matches!(err, ConversionError::NoInit));
    }

    #[test]
    fn test_convert_s16_to_s8_24_scratch() {
        let mut r = AudioReformatter::new();
        r.configure(&spec(SampleFormat::S16), &spec(SampleFormat::S8_24)).unwrap();

        let src = to_bytes16(&[0xDEAD, 0xBEEF, 0x0000, 0xFFFF]);
        let frames = r.convert(&src, None, 2).unwrap();
        assert_eq!(frames, 2);
        assert_eq!(r.output(), to_bytes32(&[0x00DE_AD00, 0x00BE_EF00, 0, 0x00FF_FF00]).as_slice());
    }

    #[test]
    fn test_convert_s32_to_s16_caller_buffer() {
        let mut r = AudioReformatter::new();
        r.configure(&spec(SampleFormat::S32), &spec(SampleFormat::S16)).unwrap();

        let src = to_bytes32(&[0x1234_5678, 0xFFFF_0000]);
        let mut out = [0u8; 4];
        assert_eq!(r.convert(&src, Some(&mut out), 1).unwrap(), 1);
        assert_eq!(out.to_vec(), to_bytes16(&[0x1234, 0xFFFF]));
        assert!(r.output().is_empty());
    }

    #[test]
    fn test_convert_caller_buffer_too_small() {
        let mut r = AudioReformatter::new();
        r.configure(&spec(SampleFormat::S16), &spec(SampleFormat::S32)).unwrap();
        let mut out = [0u8; 4];
        let err = r.convert(&[0u8; 4], Some(&mut out), 1).unwrap_err();
        assert!(matches!(err, ConversionError::BadValue(_)));
    }
}
