//! Sources of raw frames for the pull conversion API.

use std::io::{self, Read};

use crate::buffer::try_resize;
use crate::error::Result;

/// A pull source of raw frames in the conversion's source spec.
///
/// Every [`BufferProvider::next_buffer`] is followed by exactly one
/// [`BufferProvider::release_buffer`] with the number of frames the returned
/// buffer held.
pub trait BufferProvider {
    /// Returns up to `frames` whole frames.
    ///
    /// The provider may return fewer frames than asked; the returned length
    /// is authoritative. An empty buffer means no data is available.
    fn next_buffer(&mut self, frames: usize) -> Result<&[u8]>;

    /// Releases the buffer returned by the last `next_buffer`.
    fn release_buffer(&mut self, frames: usize);
}

/// Serves frames from a byte slice.
#[derive(Debug)]
pub struct SliceProvider<'a> {
    data: &'a [u8],
    frame_size: usize,
    pos: usize,
    max_frames: usize,
}

impl<'a> SliceProvider<'a> {
    pub fn new(data: &'a [u8], frame_size: usize) -> Self {
        Self {
            data,
            frame_size: frame_size.max(1),
            pos: 0,
            max_frames: usize::MAX,
        }
    }

    /// Caps the frames returned per call, to mimic a device that delivers
    /// short periods.
    pub fn with_max_frames(mut self, frames: usize) -> Self {
        self.max_frames = frames;
        self
    }

    /// Frames not yet consumed.
    pub fn remaining_frames(&self) -> usize {
        (self.data.len() - self.pos) / self.frame_size
    }
}

impl BufferProvider for SliceProvider<'_> {
    fn next_buffer(&mut self, frames: usize) -> Result<&[u8]> {
        let frames = frames.min(self.max_frames).min(self.remaining_frames());
        Ok(&self.data[self.pos..self.pos + frames * self.frame_size])
    }

    fn release_buffer(&mut self, frames: usize) {
        self.pos = (self.pos + frames * self.frame_size).min(self.data.len());
    }
}

/// Serves frame-aligned buffers from an [`io::Read`].
///
/// A read that ends inside a frame keeps the partial frame for the next call.
#[derive(Debug)]
pub struct ReaderProvider<R: Read> {
    inner: R,
    frame_size: usize,
    buf: Vec<u8>,
    /// Valid bytes in `buf`.
    filled: usize,
    eof: bool,
}

impl<R: Read> ReaderProvider<R> {
    pub fn new(inner: R, frame_size: usize) -> Self {
        Self {
            inner,
            frame_size: frame_size.max(1),
            buf: Vec::new(),
            filled: 0,
            eof: false,
        }
    }

    /// Returns true once the reader reported end of stream.
    pub fn is_eof(&self) -> bool {
        self.eof
    }
}

impl<R: Read> BufferProvider for ReaderProvider<R> {
    fn next_buffer(&mut self, frames: usize) -> Result<&[u8]> {
        let want = frames * self.frame_size;
        if self.buf.len() < want {
            try_resize(&mut self.buf, want)?;
        }

        while self.filled < want && !self.eof {
            match self.inner.read(&mut self.buf[self.filled..want]) {
                Ok(0) => self.eof = true,
                Ok(n) => {
                    self.filled += n;
                    if self.filled >= self.frame_size {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let whole = self.filled.min(want) / self.frame_size * self.frame_size;
        Ok(&self.buf[..whole])
    }

    fn release_buffer(&mut self, frames: usize) {
        let used = (frames * self.frame_size).min(self.filled);
        self.buf.copy_within(used..self.filled, 0);
        self.filled -= used;
    }
}
