// SPDX-License-Identifier: MIT
//
// Output channel — the single gate between drawing calls and the terminal.
//
// All escape sequences and text land in one fixed-capacity byte buffer.
// The buffer is written to the sink only when it would overflow or when
// the caller presents a frame. Nothing else in the workspace writes to the
// sink, so the byte order the terminal observes is exactly the order the
// drawing calls were made.
//
// The capacity is a hard bound. The buffer never reallocates: a chunk
// that would not fit triggers a flush first, and a chunk larger than the
// whole buffer skips it entirely (after the buffered bytes went out).

use std::io::{self, Write};

use tracing::trace;

/// Default buffer capacity: 256 KB. A full-screen redraw of a large
/// terminal with true-color escapes fits without an intermediate flush.
pub const DEFAULT_CAPACITY: usize = 262_144;

// ─── OutputChannel ───────────────────────────────────────────────────────────

/// A fixed-capacity byte buffer in front of an output sink.
///
/// Implements [`Write`], so every function in [`ansi`](crate::ansi) and
/// [`draw`](crate::draw) can write straight into it. [`Write::flush`]
/// behaves like [`present`](Self::present).
///
/// # Example
///
/// ```
/// use strata_term::output::OutputChannel;
///
/// let mut out = OutputChannel::with_capacity(Vec::new(), 16);
/// out.emit(b"hello")?;
/// assert_eq!(out.position(), 5);
/// assert!(out.sink().is_empty());
///
/// out.present()?;
/// assert_eq!(out.sink().as_slice(), b"hello");
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct OutputChannel<W: Write> {
    buf: Vec<u8>,
    capacity: usize,
    sink: W,
}

impl<W: Write> OutputChannel<W> {
    /// Create a channel with the default 256 KB capacity.
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self::with_capacity(sink, DEFAULT_CAPACITY)
    }

    /// Create a channel with an explicit capacity.
    ///
    /// A capacity of zero is bumped to one byte so the buffer still exists;
    /// every non-empty chunk then goes straight to the sink.
    #[must_use]
    pub fn with_capacity(sink: W, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            sink,
        }
    }

    /// Total buffer capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Write cursor: number of bytes currently buffered.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Free space left before the next append would force a flush.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Whether nothing is buffered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The buffered bytes that have not reached the sink yet.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Borrow the sink (for inspecting test sinks).
    #[inline]
    #[must_use]
    pub const fn sink(&self) -> &W {
        &self.sink
    }

    /// Consume the channel and return the sink. Buffered bytes are dropped;
    /// call [`present`](Self::present) first to keep them.
    #[must_use]
    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Append a chunk of bytes.
    ///
    /// - A chunk longer than the whole capacity flushes the buffer and is
    ///   written directly to the sink.
    /// - A chunk that does not fit in the remaining space flushes the buffer
    ///   first, then is appended.
    /// - A chunk that fits exactly is appended without flushing.
    ///
    /// # Errors
    ///
    /// Returns an error if a flush or the direct write fails.
    pub fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.len() > self.capacity {
            self.flush_buffer()?;
            trace!(len = bytes.len(), "output chunk bypasses buffer");
            return self.sink.write_all(bytes);
        }

        if bytes.len() > self.remaining() {
            self.flush_buffer()?;
        }

        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Write the buffered region to the sink and reset the position.
    ///
    /// Idempotent: with nothing buffered the sink is not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the sink fails. The buffer is kept
    /// intact in that case so nothing is silently lost.
    pub fn flush_buffer(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        trace!(len = self.buf.len(), "flushing output buffer");
        self.sink.write_all(&self.buf)?;
        self.buf.clear();
        Ok(())
    }

    /// Flush the buffer and force the sink to deliver everything it holds.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing the sink fails.
    pub fn present(&mut self) -> io::Result<()> {
        self.flush_buffer()?;
        self.sink.flush()
    }
}

impl<W: Write> Write for OutputChannel<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.emit(buf)?;
        Ok(buf.len())
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.emit(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.present()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
