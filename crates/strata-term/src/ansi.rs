// SPDX-License-Identifier: MIT
//
// ANSI / VT escape sequence encoding.
//
// Pure functions that write one escape sequence each to any `impl Write`
// (in practice the `OutputChannel`). No state, no coalescing: every call
// emits its bytes immediately and in the order written here, because
// scroll regions and modes are stateful on the real terminal.
//
// Coordinates are passed through untouched. Callers supply 1-based
// columns and rows exactly as the terminal expects them, and integers are
// printed in plain decimal. There is no bounds checking at this layer.

use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to column `x`, row `y` (CUP, both 1-based).
///
/// The row comes first on the wire: `cursor_to(w, 3, 5)` emits `ESC[5;3H`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: i32, y: i32) -> io::Result<()> {
    write!(w, "\x1b[{y};{x}H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Cursor Shape ───────────────────────────────────────────────────────────

/// Terminal cursor shape (DECSCUSR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// Steady block.
    #[default]
    Block,
    /// Blinking block.
    BlockBlink,
    /// Steady bar (I-beam).
    Bar,
    /// Blinking bar.
    BarBlink,
    /// Steady underline.
    Underline,
    /// Blinking underline.
    UnderlineBlink,
}

impl CursorShape {
    /// The DECSCUSR parameter for this shape.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::BlockBlink => 0,
            Self::Block => 1,
            Self::Underline => 3,
            Self::UnderlineBlink => 4,
            Self::Bar => 5,
            Self::BarBlink => 6,
        }
    }
}

/// Set the cursor shape: `ESC[{code} q`.
#[inline]
pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    write!(w, "\x1b[{} q", shape.code())
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the whole screen and home the cursor (ED 2 + CUP).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J\x1b[H")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Enter the alternate screen buffer (DEC 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Leave the alternate screen buffer and restore the original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// 24-bit foreground color: `ESC[38;2;{r};{g};{b}m`.
#[inline]
pub fn fg_rgb(w: &mut impl Write, r: u8, g: u8, b: u8) -> io::Result<()> {
    write!(w, "\x1b[38;2;{r};{g};{b}m")
}

/// 24-bit background color: `ESC[48;2;{r};{g};{b}m`.
#[inline]
pub fn bg_rgb(w: &mut impl Write, r: u8, g: u8, b: u8) -> io::Result<()> {
    write!(w, "\x1b[48;2;{r};{g};{b}m")
}

/// 256-color palette foreground: `ESC[38;5;{n}m`.
///
/// Always uses the extended form, even for the first 16 entries, so the
/// output is the same no matter what the index is.
#[inline]
pub fn fg_indexed(w: &mut impl Write, idx: u8) -> io::Result<()> {
    write!(w, "\x1b[38;5;{idx}m")
}

/// 256-color palette background: `ESC[48;5;{n}m`.
#[inline]
pub fn bg_indexed(w: &mut impl Write, idx: u8) -> io::Result<()> {
    write!(w, "\x1b[48;5;{idx}m")
}

// ─── Modes ───────────────────────────────────────────────────────────────────

/// Enable bracketed paste mode (DEC 2004).
///
/// Pasted text arrives wrapped in `ESC[200~` / `ESC[201~`.
#[inline]
pub fn enable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004h")
}

/// Disable bracketed paste mode.
#[inline]
pub fn disable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004l")
}

/// Begin synchronized output (DEC 2026).
///
/// The terminal holds back rendering until [`end_sync`], so a frame
/// appears at once instead of tearing.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── OSC ─────────────────────────────────────────────────────────────────────

/// Set the window title (OSC 2), terminated by BEL.
pub fn set_title(w: &mut impl Write, title: &str) -> io::Result<()> {
    w.write_all(b"\x1b]2;")?;
    w.write_all(title.as_bytes())?;
    w.write_all(b"\x07")
}

/// Wrap `text` in an OSC 8 hyperlink pointing at `url`.
///
/// Emits `ESC]8;;{url}BEL{text}ESC]8;;BEL`. Terminals without OSC 8
/// support ignore the wrapper and print the text as-is.
pub fn hyperlink(w: &mut impl Write, url: &str, text: &str) -> io::Result<()> {
    w.write_all(b"\x1b]8;;")?;
    w.write_all(url.as_bytes())?;
    w.write_all(b"\x07")?;
    w.write_all(text.as_bytes())?;
    w.write_all(b"\x1b]8;;\x07")
}

// ─── Scrolling ───────────────────────────────────────────────────────────────

/// Restrict scrolling to rows `top..=bottom` (DECSTBM).
#[inline]
pub fn set_scroll_region(w: &mut impl Write, top: i32, bottom: i32) -> io::Result<()> {
    write!(w, "\x1b[{top};{bottom}r")
}

/// Reset the scroll region to the full screen.
#[inline]
pub fn reset_scroll_region(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[r")
}

/// Scroll the current region by `lines`.
///
/// Positive values scroll content up (`ESC[{n}S`), negative values scroll
/// it down (`ESC[{n}T`). Zero emits nothing.
pub fn scroll(w: &mut impl Write, lines: i32) -> io::Result<()> {
    match lines.signum() {
        1 => write!(w, "\x1b[{lines}S"),
        -1 => write!(w, "\x1b[{}T", lines.unsigned_abs()),
        _ => Ok(()),
    }
}

/// Scroll rows `top..=bottom` by `lines`, then reset the region.
///
/// The three sequences are always emitted in this order: region, scroll,
/// region reset. Leaving the region set would confine every later cursor
/// movement on the real terminal.
pub fn scroll_region(w: &mut impl Write, top: i32, bottom: i32, lines: i32) -> io::Result<()> {
    set_scroll_region(w, top, bottom)?;
    scroll(w, lines)?;
    reset_scroll_region(w)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
