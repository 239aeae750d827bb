//! Owned working buffers.
//!
//! Converter scratch buffers grow to the exact size requested. Allocation
//! failures are reported as [`ConversionError::OutOfMemory`] instead of
//! aborting.

use crate::error::{ConversionError, Result};

/// Resizes `buf` to `len` elements, reporting allocation failure.
///
/// Shrinking only truncates, the allocation is kept.
pub(crate) fn try_resize<T: Clone + Default>(buf: &mut Vec<T>, len: usize) -> Result<()> {
    if len > buf.len() {
        buf.try_reserve_exact(len - buf.len())
            .map_err(|_| ConversionError::OutOfMemory {
                bytes: len.saturating_mul(std::mem::size_of::<T>()),
            })?;
    }
    buf.resize(len, T::default());
    Ok(())
}

/// Scratch output buffer of a converter.
///
/// The buffer only grows within a configuration epoch. [`ScratchBuffer::reset`]
/// releases it so that the next conversion reallocates to the new spec.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    data: Vec<u8>,
    /// Bytes written by the last conversion.
    filled: usize,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases the buffer.
    pub fn reset(&mut self) {
        self.data = Vec::new();
        self.filled = 0;
    }

    /// Returns at least `bytes` writable bytes, growing to fit.
    pub fn reserve(&mut self, bytes: usize) -> Result<&mut [u8]> {
        if self.data.len() < bytes {
            try_resize(&mut self.data, bytes)?;
        }
        self.filled = 0;
        Ok(&mut self.data[..bytes])
    }

    /// Marks `bytes` bytes as produced by the last conversion.
    pub fn set_filled(&mut self, bytes: usize) {
        self.filled = bytes.min(self.data.len());
    }

    /// Bytes produced by the last conversion.
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    /// Current allocation size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
