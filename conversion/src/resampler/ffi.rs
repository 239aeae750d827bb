//! FFI bindings to libsoxr.

use std::os::raw::{c_char, c_double, c_uint, c_void};

/// Opaque soxr instance.
pub enum Soxr {}

/// Error message, null on success.
pub type SoxrError = *const c_char;

/// High quality recipe.
pub const SOXR_HQ: c_uint = 4;

/// Interleaved int16 samples.
pub const SOXR_INT16_I: c_uint = 3;

#[repr(C)]
pub struct SoxrIoSpec {
    pub itype: c_uint,
    pub otype: c_uint,
    pub scale: c_double,
    pub e: *mut c_void,
    pub flags: c_uint,
}

#[repr(C)]
pub struct SoxrQualitySpec {
    pub precision: c_double,
    pub phase_response: c_double,
    pub passband_end: c_double,
    pub stopband_begin: c_double,
    pub e: *mut c_void,
    pub flags: c_uint,
}

unsafe extern "C" {
    pub fn soxr_io_spec(itype: c_uint, otype: c_uint) -> SoxrIoSpec;

    pub fn soxr_quality_spec(recipe: c_uint, flags: c_uint) -> SoxrQualitySpec;

    pub fn soxr_create(
        input_rate: c_double,
        output_rate: c_double,
        num_channels: c_uint,
        error: *mut SoxrError,
        io_spec: *const SoxrIoSpec,
        quality_spec: *const SoxrQualitySpec,
        runtime_spec: *const c_void,
    ) -> *mut Soxr;

    pub fn soxr_process(
        handle: *mut Soxr,
        input: *const c_void,
        input_len: usize,
        input_done: *mut usize,
        output: *mut c_void,
        output_len: usize,
        output_done: *mut usize,
    ) -> SoxrError;

    /// Returns the instance to its initial state.
    pub fn soxr_clear(handle: *mut Soxr) -> SoxrError;

    pub fn soxr_delete(handle: *mut Soxr);
}

/// Copies a soxr error message.
pub fn error_string(err: SoxrError) -> Option<String> {
    if err.is_null() {
        None
    } else {
        // SAFETY: soxr error values are null or static NUL-terminated strings.
        let c_str = unsafe { std::ffi::CStr::from_ptr(err) };
        Some(c_str.to_string_lossy().into_owned())
    }
}
