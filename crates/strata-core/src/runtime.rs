// SPDX-License-Identifier: MIT
//
// Runtime — one value that owns a whole terminal session.
//
// Bundles the output channel, the event source, the window stack, the
// focus registry and the timer table behind a single owner, replacing
// process-wide state. Two runtimes never share anything, which is what
// lets tests build as many as they like over in-memory sinks, scripted
// input and a manual clock.
//
// # The wait loop
//
// `wait_event` is the only blocking call. Each turn it:
//
//   1. fires every timer whose deadline has passed,
//   2. polls the byte source once,
//   3. sleeps for the poll interval or until the next deadline,
//      whichever is shorter.
//
// so timers are serviced while the host waits for input instead of only
// when a key arrives. `wait_event_async` (feature `tokio`) runs the same
// loop but awaits a tokio timer, which makes it cancellable.
//
// # Coordinates
//
// Screen positions and cell columns are 0-based; the escape encoder is
// 1-based like the terminal. `compose` adds one on the way out, so a
// screen at (0, 0) paints from the top-left corner.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use strata_term::ansi;
use strata_term::clock::{Clock, MonotonicClock};
use strata_term::event::Event;
use strata_term::output::OutputChannel;
use strata_term::source::{ByteSource, EventSource, StdinSource};
use strata_term::terminal::{self, Size};
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::focus::FocusRegistry;
use crate::stack::WindowStack;
use crate::timer::TimerTable;

/// A runtime over the process's stdout and stdin.
pub type StdioRuntime = Runtime<Stdout, StdinSource, MonotonicClock>;

/// Output, input, windows, focus and timers for one terminal session.
pub struct Runtime<W: Write, S: ByteSource, C: Clock> {
    output: OutputChannel<W>,
    events: EventSource<S>,
    screens: WindowStack,
    focus: FocusRegistry,
    timers: TimerTable<C>,
    config: RuntimeConfig,
    shut_down: bool,
}

impl StdioRuntime {
    /// A runtime drawing to stdout and reading stdin.
    ///
    /// Raw mode is the host's business: put the terminal in raw mode
    /// before building this if key-at-a-time input is wanted.
    ///
    /// # Errors
    ///
    /// Returns an error if the startup sequence cannot be written.
    pub fn stdio(config: RuntimeConfig) -> Result<Self> {
        Self::new(config, io::stdout(), StdinSource::new(), MonotonicClock::new())
    }
}

impl<W: Write, S: ByteSource, C: Clock> Runtime<W, S, C> {
    /// Assemble a runtime from its collaborators.
    ///
    /// With `sync_output` set, synchronized output is switched on here
    /// and off again at [`shutdown`](Self::shutdown).
    ///
    /// # Errors
    ///
    /// Returns an error if the startup sequence cannot be written.
    pub fn new(config: RuntimeConfig, sink: W, source: S, clock: C) -> Result<Self> {
        let mut rt = Self {
            output: OutputChannel::with_capacity(sink, config.output_capacity),
            events: EventSource::with_poll_interval(source, config.poll_interval),
            screens: WindowStack::new(),
            focus: FocusRegistry::new(),
            timers: TimerTable::with_capacity(clock, config.timer_capacity),
            config,
            shut_down: false,
        };
        if config.sync_output {
            ansi::begin_sync(&mut rt.output)?;
        }
        debug!(?config, "runtime started");
        Ok(rt)
    }

    // ─── Components ──────────────────────────────────────────────────────

    /// Configuration the runtime was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The output channel.
    #[inline]
    #[must_use]
    pub const fn output(&self) -> &OutputChannel<W> {
        &self.output
    }

    /// The output channel, for use with `ansi` and `draw`.
    #[inline]
    pub const fn output_mut(&mut self) -> &mut OutputChannel<W> {
        &mut self.output
    }

    /// Mutable access to the event source.
    #[inline]
    pub const fn events_mut(&mut self) -> &mut EventSource<S> {
        &mut self.events
    }

    /// The window stack.
    #[inline]
    #[must_use]
    pub const fn screens(&self) -> &WindowStack {
        &self.screens
    }

    /// Mutable access to the window stack.
    #[inline]
    pub const fn screens_mut(&mut self) -> &mut WindowStack {
        &mut self.screens
    }

    /// The focus registry.
    #[inline]
    #[must_use]
    pub const fn focus(&self) -> &FocusRegistry {
        &self.focus
    }

    /// Mutable access to the focus registry.
    #[inline]
    pub const fn focus_mut(&mut self) -> &mut FocusRegistry {
        &mut self.focus
    }

    /// The timer table.
    #[inline]
    #[must_use]
    pub const fn timers(&self) -> &TimerTable<C> {
        &self.timers
    }

    /// Mutable access to the timer table.
    #[inline]
    pub const fn timers_mut(&mut self) -> &mut TimerTable<C> {
        &mut self.timers
    }

    /// Terminal size, or 80×24 when it cannot be queried.
    #[allow(clippy::unused_self)] // queries the process's terminal, not ours
    #[must_use]
    pub fn size(&self) -> Size {
        terminal::size_or_fallback()
    }

    // ─── Session ─────────────────────────────────────────────────────────

    /// Switch to the alternate screen, hide the cursor and clear.
    ///
    /// # Errors
    ///
    /// Returns an error if the output sink fails.
    pub fn enter(&mut self) -> Result<()> {
        ansi::enter_alt_screen(&mut self.output)?;
        ansi::cursor_hide(&mut self.output)?;
        ansi::clear_screen(&mut self.output)?;
        self.output.present()?;
        Ok(())
    }

    /// Restore the terminal and release every screen, widget and timer.
    ///
    /// Emits (synchronized output off, if it was turned on), leave the
    /// alternate screen, show the cursor, reset attributes, then presents.
    /// Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the output sink fails. Components are released
    /// either way.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        let restored = self.write_restore_sequence();
        self.screens.clear_all();
        self.focus.clear();
        self.timers.clear();
        debug!("runtime shut down");
        restored.map_err(Into::into)
    }

    fn write_restore_sequence(&mut self) -> io::Result<()> {
        if self.config.sync_output {
            ansi::end_sync(&mut self.output)?;
        }
        ansi::exit_alt_screen(&mut self.output)?;
        ansi::cursor_show(&mut self.output)?;
        ansi::reset(&mut self.output)?;
        self.output.present()
    }

    /// True once `shutdown` has run.
    #[inline]
    #[must_use]
    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Fire due timers, then poll input once without blocking.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the byte source.
    pub fn poll_event(&mut self) -> Result<Option<Event>> {
        self.timers.fire_due();
        Ok(self.events.poll_event()?)
    }

    /// Block until input arrives, servicing timers meanwhile.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the byte source.
    pub fn wait_event(&mut self) -> Result<Event> {
        loop {
            if let Some(event) = self.poll_event()? {
                return Ok(event);
            }
            std::thread::sleep(self.idle_nap());
        }
    }

    /// [`wait_event`](Self::wait_event) without blocking the executor
    /// thread. Dropping the future stops the wait.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the byte source.
    #[cfg(feature = "tokio")]
    pub async fn wait_event_async(&mut self) -> Result<Event> {
        loop {
            if let Some(event) = self.poll_event()? {
                return Ok(event);
            }
            tokio::time::sleep(self.idle_nap()).await;
        }
    }

    /// How long to sleep after an empty poll.
    fn idle_nap(&self) -> Duration {
        let interval = self.events.poll_interval();
        self.timers
            .time_until_next()
            .map_or(interval, |ms| interval.min(Duration::from_millis(ms)))
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Repaint every visible screen, bottom to top, then present.
    ///
    /// Every non-empty cell gets its own absolute cursor move; there is no
    /// diffing against the previous frame. Attributes are reset at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the output sink fails.
    pub fn compose(&mut self) -> Result<()> {
        let Self {
            output, screens, ..
        } = self;

        for (_, screen) in screens.iter_bottom_up().filter(|(_, s)| s.is_visible()) {
            for row in 0..screen.height() {
                for col in 0..screen.width() {
                    let Some(grapheme) = screen.cell(col, row).and_then(|c| c.grapheme()) else {
                        continue;
                    };
                    let x = screen.x().saturating_add(col).saturating_add(1);
                    let y = screen.y().saturating_add(row).saturating_add(1);
                    ansi::cursor_to(output, x, y)?;
                    output.emit(grapheme.as_bytes())?;
                }
            }
        }
        ansi::reset(output)?;
        output.present()?;
        Ok(())
    }
}

impl<W: Write, S: ByteSource, C: Clock> Drop for Runtime<W, S, C> {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
