//! Integer resample engine backed by libsoxr.

use std::ptr;

use tracing::warn;

use crate::error::{ConversionError, Result};

use super::engine::{ResampleEngine, ResampleHandle};
use super::ffi::{self, SOXR_HQ, SOXR_INT16_I};

/// libsoxr with interleaved 16-bit input and output.
#[derive(Debug, Clone, Default)]
pub struct SoxrEngine;

impl ResampleEngine<i16> for SoxrEngine {
    fn name(&self) -> &str {
        "soxr"
    }

    fn supports(&self, src_rate: u32, dst_rate: u32) -> bool {
        src_rate > 0 && dst_rate > 0
    }

    fn create(
        &self,
        channels: usize,
        src_rate: u32,
        dst_rate: u32,
    ) -> Option<Box<dyn ResampleHandle<i16>>> {
        if channels == 0 || !self.supports(src_rate, dst_rate) {
            return None;
        }
        // SAFETY: the spec structs outlive the call and soxr copies them.
        let raw = unsafe {
            let io_spec = ffi::soxr_io_spec(SOXR_INT16_I, SOXR_INT16_I);
            let quality_spec = ffi::soxr_quality_spec(SOXR_HQ, 0);
            let mut error: ffi::SoxrError = ptr::null();
            let raw = ffi::soxr_create(
                f64::from(src_rate),
                f64::from(dst_rate),
                channels as u32,
                &mut error,
                &io_spec,
                &quality_spec,
                ptr::null(),
            );
            if raw.is_null() {
                let msg = ffi::error_string(error).unwrap_or_else(|| "unknown error".to_string());
                warn!(src_rate, dst_rate, channels, "soxr_create failed: {msg}");
                return None;
            }
            raw
        };
        Some(Box::new(SoxrHandle { raw, channels }))
    }
}

struct SoxrHandle {
    raw: *mut ffi::Soxr,
    channels: usize,
}

// SAFETY: a soxr instance has no thread affinity and the handle is only
// used through &mut self.
unsafe impl Send for SoxrHandle {}

impl Drop for SoxrHandle {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            // SAFETY: raw came from soxr_create and is deleted once.
            unsafe { ffi::soxr_delete(self.raw) };
            self.raw = ptr::null_mut();
        }
    }
}

impl ResampleHandle<i16> for SoxrHandle {
    fn reset(&mut self) {
        // SAFETY: raw is a live instance.
        let err = unsafe { ffi::soxr_clear(self.raw) };
        if let Some(msg) = ffi::error_string(err) {
            warn!("soxr_clear failed: {msg}");
        }
    }

    fn process(&mut self, input: &[i16], in_frames: usize, output: &mut [i16]) -> Result<usize> {
        let in_frames = in_frames.min(input.len() / self.channels);
        let out_frames = output.len() / self.channels;
        let mut idone = 0usize;
        let mut odone = 0usize;

        // SAFETY: lengths are in frames and bounded by the slice sizes.
        let err = unsafe {
            ffi::soxr_process(
                self.raw,
                input.as_ptr().cast(),
                in_frames,
                &mut idone,
                output.as_mut_ptr().cast(),
                out_frames,
                &mut odone,
            )
        };
        if let Some(msg) = ffi::error_string(err) {
            return Err(ConversionError::Engine(msg));
        }
        if idone < in_frames {
            warn!(in_frames, idone, "soxr did not consume all input");
        }
        Ok(odone)
    }
}
