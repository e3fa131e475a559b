// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal queries.
//
// The two facts about the physical terminal the runtime asks the host
// for: how big it is, and whether stdin is a TTY at all. Raw-mode setup
// and console configuration are the host's business and do not live here.
//
// Both queries are single libc calls (ioctl TIOCGWINSZ, isatty). Off unix
// they report "unknown" and callers fall back to defaults.

// ─── Size ────────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns.
    pub cols: u16,
    /// Number of rows.
    pub rows: u16,
}

impl Size {
    /// Size assumed when the terminal cannot be queried (tests, pipes).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.cols as u32 * self.rows as u32
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::FALLBACK
    }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Query the terminal size of stdout.
///
/// Returns `None` if stdout is not a terminal or reports a zero size.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    (result == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

/// Always `None` off unix.
#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Terminal size, or [`Size::FALLBACK`] when it cannot be determined.
#[must_use]
pub fn size_or_fallback() -> Size {
    get_size().unwrap_or(Size::FALLBACK)
}

/// Whether stdin is connected to a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

/// Always false off unix.
#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Tests ───────────────────────────────────────────────────────────────────
