//! Frame, byte and time helpers shared by the converters.

use crate::spec::SampleSpec;

/// Returns the number of destination frames produced from `frames` source
/// frames, rounded up.
///
/// # Panics
///
/// Panics if either spec has a zero sample rate.
pub fn convert_src_to_dst_in_frames(frames: usize, src: &SampleSpec, dst: &SampleSpec) -> usize {
    assert!(src.rate() != 0, "null source sample rate");
    assert!(dst.rate() != 0, "null destination sample rate");
    let src_rate = u64::from(src.rate());
    let dst_rate = u64::from(dst.rate());
    (frames as u64 * dst_rate).div_ceil(src_rate) as usize
}

/// Byte variant of [`convert_src_to_dst_in_frames`]: counts whole source
/// frames in `bytes` and returns the destination byte count.
pub fn convert_src_to_dst_in_bytes(bytes: usize, src: &SampleSpec, dst: &SampleSpec) -> usize {
    dst.frames_to_bytes(convert_src_to_dst_in_frames(src.bytes_to_frames(bytes), src, dst))
}

/// Rounds `u` up to the next multiple of 16.
pub fn align_on_16(u: u32) -> u32 {
    u.wrapping_add(15) & !15
}

/// Converts microseconds to milliseconds, rounding up.
pub fn usec_to_msec(usec: u32) -> u32 {
    u64::from(usec).div_ceil(1000) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SampleFormat;

    fn spec(rate: u32) -> SampleSpec {
        SampleSpec::new(2, SampleFormat::S16, rate)
    }

    #[test]
    fn test_align_on_16() {
        assert_eq!(align_on_16(0), 0);
        assert_eq!(align_on_16(1), 0x10);
        assert_eq!(align_on_16(0x10), 0x10);
        assert_eq!(align_on_16(0x11), 0x20);
        assert_eq!(align_on_16(0xFFFF_FFE1), 0xFFFF_FFF0);
    }

    #[test]
    fn test_usec_to_msec() {
        assert_eq!(usec_to_msec(0), 0);
        assert_eq!(usec_to_msec(1000), 1);
        assert_eq!(usec_to_msec(999), 1);
        assert_eq!(usec_to_msec(1), 1);
        assert_eq!(usec_to_msec(1001), 2);
        assert_eq!(usec_to_msec(u32::MAX), 4_294_968);
    }

    #[test]
    fn test_src_to_dst_frames_rounds_up() {
        assert_eq!(convert_src_to_dst_in_frames(0, &spec(44100), &spec(48000)), 0);
        assert_eq!(convert_src_to_dst_in_frames(441, &spec(44100), &spec(48000)), 480);
        assert_eq!(convert_src_to_dst_in_frames(1, &spec(44100), &spec(48000)), 2);
        assert_eq!(convert_src_to_dst_in_frames(45, &spec(8000), &spec(48000)), 270);
        assert_eq!(convert_src_to_dst_in_frames(7, &spec(48000), &spec(8000)), 2);
        assert_eq!(convert_src_to_dst_in_frames(6, &spec(48000), &spec(8000)), 1);
    }

    #[test]
    fn test_src_to_dst_frames_grid() {
        let rates = [8000, 11025, 12000, 16000, 22050, 24000, 32000, 44100, 48000];
        for &s in &rates {
            for &d in &rates {
                for f in [0usize, 1, 17, 160, 1024] {
                    let got = convert_src_to_dst_in_frames(f, &spec(s), &spec(d));
                    let exact = (f as f64) * (d as f64) / (s as f64);
                    assert_eq!(got, exact.ceil() as usize, "{f} frames {s} -> {d}");
                }
            }
        }
    }

    #[test]
    fn test_src_to_dst_bytes() {
        let src = SampleSpec::new(2, SampleFormat::S16, 16000);
        let dst = SampleSpec::new(1, SampleFormat::S32, 48000);
        assert_eq!(convert_src_to_dst_in_bytes(400, &src, &dst), 300 * 4);
    }

    #[test]
    #[should_panic]
    fn test_src_to_dst_zero_rate() {
        let _ = convert_src_to_dst_in_frames(10, &spec(0), &spec(48000));
    }
}
