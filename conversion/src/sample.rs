//! Typed access to little-endian PCM samples stored in byte buffers.

/// A PCM sample as stored in a frame buffer.
///
/// 16-bit samples are signed. 32-bit containers (8.24 and left-justified
/// 32-bit) are handled as raw `u32` words so that bit-exact shifts and the
/// channel averaging arithmetic match the stored layout.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    /// Size of one sample in bytes.
    const BYTES: usize;

    /// Decodes one sample from the first `BYTES` bytes of `bytes`.
    fn read(bytes: &[u8]) -> Self;

    /// Encodes this sample into the first `BYTES` bytes of `out`.
    fn write(self, out: &mut [u8]);

    /// Widens the sample into the signed 64-bit averaging accumulator.
    fn widen(self) -> i64;

    /// Truncates an accumulator value back to a sample.
    fn narrow(acc: i64) -> Self;

    /// Converts to float without scaling.
    fn to_f32(self) -> f32;

    /// Converts from float, saturating at the integer range.
    fn from_f32(value: f32) -> Self;
}

impl Sample for i16 {
    const BYTES: usize = 2;

    #[inline]
    fn read(bytes: &[u8]) -> Self {
        i16::from_le_bytes([bytes[0], bytes[1]])
    }

    #[inline]
    fn write(self, out: &mut [u8]) {
        out[..2].copy_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn widen(self) -> i64 {
        i64::from(self)
    }

    #[inline]
    fn narrow(acc: i64) -> Self {
        acc as i16
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value.clamp(i16::MIN as f32, i16::MAX as f32) as i16
    }
}

impl Sample for u32 {
    const BYTES: usize = 4;

    #[inline]
    fn read(bytes: &[u8]) -> Self {
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[inline]
    fn write(self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn widen(self) -> i64 {
        i64::from(self)
    }

    #[inline]
    fn narrow(acc: i64) -> Self {
        acc as u32
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as i32 as f32
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value.clamp(i32::MIN as f32, i32::MAX as f32) as i32 as u32
    }
}

/// Decodes `out.len()` samples from `bytes`.
pub(crate) fn decode_into<S: Sample>(bytes: &[u8], out: &mut [S]) {
    for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(S::BYTES)) {
        *dst = S::read(chunk);
    }
}

/// Encodes `samples` into `bytes`.
pub(crate) fn encode_from<S: Sample>(samples: &[S], bytes: &mut [u8]) {
    for (src, chunk) in samples.iter().zip(bytes.chunks_exact_mut(S::BYTES)) {
        src.write(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i16_roundtrip_bytes() {
        let mut buf = [0u8; 2];
        (-2i16).write(&mut buf);
        assert_eq!(buf, [0xFE, 0xFF]);
        assert_eq!(i16::read(&buf), -2);
    }

    #[test]
    fn test_i16_accumulator_sign_extends() {
        let sum = (0xFF00u16 as i16).widen() + (0x00FFu16 as i16).widen();
        assert_eq!(sum, -1);
        assert_eq!(i16::narrow(sum.div_euclid(2)) as u16, 0xFFFF);
    }

    #[test]
    fn test_u32_accumulator_zero_extends() {
        let sum = 0xBEEF_DEADu32.widen() + 0xDEAD_BEEFu32.widen();
        assert_eq!(u32::narrow(sum.div_euclid(2)), 0xCECE_CECE);
    }

    #[test]
    fn test_float_saturation() {
        assert_eq!(i16::from_f32(40000.0), i16::MAX);
        assert_eq!(i16::from_f32(-40000.0), i16::MIN);
        assert_eq!(i16::from_f32(123.7), 123);
        assert_eq!(u32::from_f32(-1.0), 0xFFFF_FFFF);
        assert_eq!(u32::from_f32(1e12), i32::MAX as u32);
        assert_eq!((-5i16).to_f32(), -5.0);
        assert_eq!(0xFFFF_FFFEu32.to_f32(), -2.0);
    }

    #[test]
    fn test_decode_encode() {
        let bytes = [1u8, 0, 0xFF, 0xFF, 0x34, 0x12];
        let mut samples = [0i16; 3];
        decode_into(&bytes, &mut samples);
        assert_eq!(samples, [1, -1, 0x1234]);

        let mut out = [0u8; 6];
        encode_from(&samples, &mut out);
        assert_eq!(out, bytes);
    }
}
