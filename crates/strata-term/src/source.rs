// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event source — raw input bytes in, text events out.
//
// A `ByteSource` is anything that can hand over whatever input is
// available right now without blocking. `EventSource` sits on top of one
// and turns each successful read into a single `Event::Text`.
//
// Polling reads once and returns immediately. Waiting polls in a loop and
// sleeps a fixed interval between empty polls, with no timeout and no
// cancellation. Hosts running an async executor use `wait_event_async`
// (feature `tokio`), which awaits a timer between polls instead of
// parking the whole thread, so it composes with `select!` and timeouts.
//
// Reads are capped at `TEXT_CAPACITY` bytes, so a read that fills the
// buffer can split a multi-byte UTF-8 character across two polls. That
// incomplete tail is held back and prepended to the next read. A shorter
// read is everything that was available and is emitted as it is.

use std::collections::VecDeque;
use std::io;
use std::thread;
use std::time::Duration;

use tracing::trace;

use crate::event::{Event, TEXT_CAPACITY};

/// Sleep between empty polls in [`EventSource::wait_event`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

// ─── ByteSource ──────────────────────────────────────────────────────────────

/// A non-blocking source of raw input bytes.
pub trait ByteSource {
    /// Read whatever input is available into `buf` without blocking.
    ///
    /// Returns the number of bytes read; `0` means nothing is available
    /// right now.
    ///
    /// # Errors
    ///
    /// Returns an error only for real I/O failures. "Would block" is not
    /// an error: it is reported as `Ok(0)`.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_available(buf)
    }
}

// ─── StdinSource ─────────────────────────────────────────────────────────────

/// Non-blocking reader for the process's stdin.
///
/// Each read first polls the descriptor with a zero timeout, so it never
/// blocks even when the terminal is not in non-blocking mode. Off unix it
/// never has input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl StdinSource {
    /// A source reading from stdin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ByteSource for StdinSource {
    #[cfg(unix)]
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: libc::STDIN_FILENO,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, 0)
        };
        if ready <= 0 {
            return Ok(0);
        }

        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(0),
                _ => Err(err),
            };
        }

        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }

    #[cfg(not(unix))]
    fn read_available(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

// ─── ScriptedSource ──────────────────────────────────────────────────────────

/// A byte source that replays queued chunks, one chunk per read.
///
/// A read returns `Ok(0)` when the queue is empty. Chunks larger than the
/// caller's buffer are split and the rest stays at the front of the queue.
/// Handy for tests and for replaying recorded input.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    chunks: VecDeque<Vec<u8>>,
}

impl ScriptedSource {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chunk of input.
    pub fn push(&mut self, bytes: impl Into<Vec<u8>>) {
        let bytes = bytes.into();
        if !bytes.is_empty() {
            self.chunks.push_back(bytes);
        }
    }

    /// Queue an empty read (a poll that finds nothing).
    pub fn push_idle(&mut self) {
        self.chunks.push_back(Vec::new());
    }

    /// Number of queued reads left.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.chunks.len()
    }
}

impl ByteSource for ScriptedSource {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };
        if chunk.len() > buf.len() {
            let rest = chunk.split_off(buf.len());
            self.chunks.push_front(rest);
        }
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }
}

// ─── EventSource ─────────────────────────────────────────────────────────────

/// Turns raw input from a [`ByteSource`] into [`Event::Text`] events.
///
/// # Example
///
/// ```
/// use strata_term::event::Event;
/// use strata_term::source::{EventSource, ScriptedSource};
///
/// let mut input = ScriptedSource::new();
/// input.push("hi");
/// let mut events = EventSource::new(input);
///
/// assert_eq!(events.poll_event()?, Some(Event::Text("hi".into())));
/// assert_eq!(events.poll_event()?, None);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventSource<S: ByteSource> {
    source: S,
    /// Incomplete UTF-8 tail from the previous read (at most 3 bytes).
    pending: Vec<u8>,
    poll_interval: Duration,
}

impl<S: ByteSource> EventSource<S> {
    /// Wrap a byte source with the default 20 ms wait interval.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_poll_interval(source, DEFAULT_POLL_INTERVAL)
    }

    /// Wrap a byte source with a custom wait interval.
    #[must_use]
    pub const fn with_poll_interval(source: S, poll_interval: Duration) -> Self {
        Self {
            source,
            pending: Vec::new(),
            poll_interval,
        }
    }

    /// Sleep between empty polls while waiting.
    #[inline]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Borrow the underlying byte source.
    #[inline]
    pub const fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Attempt a single non-blocking read.
    ///
    /// Returns `Ok(Some(Event::Text(..)))` when input was available and
    /// `Ok(None)` when it was not. Invalid UTF-8 is replaced with U+FFFD.
    /// A character cut off by a read that filled the whole buffer is held
    /// back and completed on the next poll; any other read is emitted in
    /// full, even if it ends mid-sequence.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the byte source.
    pub fn poll_event(&mut self) -> io::Result<Option<Event>> {
        let mut buf = [0u8; TEXT_CAPACITY];
        let carried = self.pending.len();
        buf[..carried].copy_from_slice(&self.pending);

        let n = self.source.read_available(&mut buf[carried..])?;
        if n == 0 {
            return Ok(None);
        }

        let total = carried + n;
        // Only a full buffer can have cut a character short; a short read
        // ending mid-sequence is all the input there is and goes out now.
        let split = if total == TEXT_CAPACITY {
            total - incomplete_tail_len(&buf[..total])
        } else {
            total
        };
        self.pending.clear();
        self.pending.extend_from_slice(&buf[split..total]);

        trace!(bytes = split, "input text event");
        let text = String::from_utf8_lossy(&buf[..split]).into_owned();
        Ok(Some(Event::Text(text)))
    }

    /// Block until an event arrives.
    ///
    /// Polls, and sleeps [`poll_interval`](Self::poll_interval) after every
    /// empty poll. There is no timeout.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the byte source.
    pub fn wait_event(&mut self) -> io::Result<Event> {
        loop {
            if let Some(event) = self.poll_event()? {
                return Ok(event);
            }
            thread::sleep(self.poll_interval);
        }
    }

    /// Wait for an event without blocking the executor thread.
    ///
    /// Same loop as [`wait_event`](Self::wait_event), but each empty poll
    /// awaits a tokio timer, which is a cancellation point: dropping the
    /// future (e.g. in `tokio::select!` or `tokio::time::timeout`) stops
    /// the wait cleanly.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the byte source.
    #[cfg(feature = "tokio")]
    pub async fn wait_event_async(&mut self) -> io::Result<Event> {
        loop {
            if let Some(event) = self.poll_event()? {
                return Ok(event);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Length of an incomplete multi-byte UTF-8 sequence at the end of `bytes`.
///
/// Returns 0 when the input ends on a character boundary or when the tail
/// is invalid anyway (lossy decoding deals with that).
fn incomplete_tail_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let b = bytes[bytes.len() - back];
        if b & 0b1100_0000 == 0b1000_0000 {
            continue; // continuation byte, keep looking for the lead
        }
        let needed = match b {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if needed > back { back } else { 0 };
    }
    0
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Event {
        Event::Text(s.into())
    }

    /// Source that fails every read.
    struct FailingSource;

    impl ByteSource for FailingSource {
        fn read_available(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("tty gone"))
        }
    }

    // ── poll_event ──────────────────────────────────────────────────────

    #[test]
    fn poll_without_input_returns_none() {
        let mut events = EventSource::new(ScriptedSource::new());
        assert_eq!(events.poll_event().unwrap(), None);
    }

    #[test]
    fn poll_packages_bytes_as_text() {
        let mut input = ScriptedSource::new();
        input.push("q");
        let mut events = EventSource::new(input);
        assert_eq!(events.poll_event().unwrap(), Some(text("q")));
    }

    #[test]
    fn escape_bytes_stay_raw() {
        let mut input = ScriptedSource::new();
        input.push("\x1b[A");
        let mut events = EventSource::new(input);
        assert_eq!(events.poll_event().unwrap(), Some(text("\x1b[A")));
    }

    #[test]
    fn long_input_is_split_at_capacity() {
        let long = "x".repeat(100);
        let mut input = ScriptedSource::new();
        input.push(long.as_str());
        let mut events = EventSource::new(input);

        let first = events.poll_event().unwrap().unwrap();
        assert_eq!(first.as_text().unwrap().len(), TEXT_CAPACITY);
        let second = events.poll_event().unwrap().unwrap();
        assert_eq!(second.as_text().unwrap().len(), 100 - TEXT_CAPACITY);
        assert_eq!(events.poll_event().unwrap(), None);
    }

    #[test]
    fn split_character_is_carried_over() {
        // 62 ASCII bytes + "é" (2 bytes) = 64 bytes: the lead byte of "é"
        // lands at index 62, its continuation byte in the next read.
        let mut s = "a".repeat(62);
        s.push('é');
        let mut input = ScriptedSource::new();
        input.push(s.as_str());
        let mut events = EventSource::new(input);

        let first = events.poll_event().unwrap().unwrap();
        assert_eq!(first.as_text().unwrap(), "a".repeat(62));
        assert_eq!(events.poll_event().unwrap(), Some(text("é")));
    }

    #[test]
    fn short_read_ending_mid_sequence_is_emitted() {
        let mut input = ScriptedSource::new();
        input.push(&b"\xe4\xb8"[..]);
        input.push(&b"\xad"[..]);
        let mut events = EventSource::new(input);

        assert_eq!(events.poll_event().unwrap(), Some(text("\u{fffd}")));
        assert_eq!(events.poll_event().unwrap(), Some(text("\u{fffd}")));
        assert_eq!(events.poll_event().unwrap(), None);
    }

    #[test]
    fn lone_eight_bit_byte_is_not_swallowed() {
        // Alt+a with eight-bit input: a single 0xE1 byte.
        let mut input = ScriptedSource::new();
        input.push(vec![0xE1]);
        let mut events = EventSource::new(input);

        assert_eq!(events.poll_event().unwrap(), Some(text("\u{fffd}")));
        assert_eq!(events.poll_event().unwrap(), None);
        assert_eq!(events.source_mut().pending(), 0);
    }

    #[test]
    fn wait_returns_for_lone_lead_byte() {
        let mut input = ScriptedSource::new();
        input.push_idle();
        input.push(vec![0xE9]);
        let mut events = EventSource::with_poll_interval(input, Duration::from_millis(1));
        assert_eq!(events.wait_event().unwrap(), text("\u{fffd}"));
    }

    #[test]
    fn invalid_bytes_count_against_raw_limit() {
        let mut input = ScriptedSource::new();
        input.push(vec![0xFF; TEXT_CAPACITY]);
        let mut events = EventSource::new(input);

        let event = events.poll_event().unwrap().unwrap();
        let decoded = event.as_text().unwrap();
        assert_eq!(decoded.chars().count(), TEXT_CAPACITY);
        assert!(decoded.chars().all(|c| c == '\u{fffd}'));
        assert_eq!(events.poll_event().unwrap(), None);
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let mut input = ScriptedSource::new();
        input.push(&b"a\xffb"[..]);
        let mut events = EventSource::new(input);
        assert_eq!(events.poll_event().unwrap(), Some(text("a\u{fffd}b")));
    }

    #[test]
    fn read_errors_propagate() {
        let mut events = EventSource::new(FailingSource);
        assert!(events.poll_event().is_err());
    }

    // ── wait_event ──────────────────────────────────────────────────────

    #[test]
    fn wait_retries_until_input() {
        let mut input = ScriptedSource::new();
        input.push_idle();
        input.push_idle();
        input.push("k");
        let mut events = EventSource::with_poll_interval(input, Duration::from_millis(1));
        assert_eq!(events.wait_event().unwrap(), text("k"));
        assert_eq!(events.source_mut().pending(), 0);
    }

    #[test]
    fn wait_propagates_errors() {
        let mut events = EventSource::with_poll_interval(FailingSource, Duration::from_millis(1));
        assert!(events.wait_event().is_err());
    }

    #[test]
    fn default_interval_is_20ms() {
        let events = EventSource::new(ScriptedSource::new());
        assert_eq!(events.poll_interval(), Duration::from_millis(20));
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn async_wait_yields_until_input() {
        let mut input = ScriptedSource::new();
        input.push_idle();
        input.push("z");
        let mut events = EventSource::with_poll_interval(input, Duration::from_millis(1));
        assert_eq!(events.wait_event_async().await.unwrap(), text("z"));
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn async_wait_is_cancellable() {
        let mut events =
            EventSource::with_poll_interval(ScriptedSource::new(), Duration::from_millis(1));
        let waited =
            tokio::time::timeout(Duration::from_millis(20), events.wait_event_async()).await;
        assert!(waited.is_err());
    }

    // ── ScriptedSource ──────────────────────────────────────────────────

    #[test]
    fn scripted_source_splits_large_chunks() {
        let mut input = ScriptedSource::new();
        input.push("abcdef");
        let mut buf = [0u8; 4];
        assert_eq!(input.read_available(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(input.read_available(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(input.read_available(&mut buf).unwrap(), 0);
    }

    #[test]
    fn scripted_source_ignores_empty_push() {
        let mut input = ScriptedSource::new();
        input.push("");
        assert_eq!(input.pending(), 0);
    }

    // ── UTF-8 tail detection ────────────────────────────────────────────

    #[test]
    fn tail_len_complete_input() {
        assert_eq!(incomplete_tail_len(b"abc"), 0);
        assert_eq!(incomplete_tail_len("中".as_bytes()), 0);
        assert_eq!(incomplete_tail_len(b""), 0);
    }

    #[test]
    fn tail_len_partial_sequences() {
        assert_eq!(incomplete_tail_len(b"a\xc3"), 1);
        assert_eq!(incomplete_tail_len(b"a\xe4\xb8"), 2);
        assert_eq!(incomplete_tail_len(b"\xf0\x9f\x94"), 3);
    }

    #[test]
    fn tail_len_stray_continuations() {
        assert_eq!(incomplete_tail_len(b"\x80\x80\x80"), 0);
    }
}
