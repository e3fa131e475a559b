// SPDX-License-Identifier: MIT
//
// Drawing primitives on top of the ANSI encoder.
//
// Every primitive positions the cursor absolutely before it writes, so
// calls are independent of each other and of whatever the terminal cursor
// was doing. There is no damage tracking here: drawing the same thing
// twice emits it twice.
//
// Regions use inclusive corners `(x1, y1)`–`(x2, y2)` in 1-based terminal
// coordinates. Empty or inverted ranges draw nothing.

use std::fmt;
use std::io::{self, Write};

use crate::ansi;

// ─── Text ────────────────────────────────────────────────────────────────────

/// Write a single character at `(x, y)`.
pub fn put_char(w: &mut impl Write, x: i32, y: i32, ch: char) -> io::Result<()> {
    ansi::cursor_to(w, x, y)?;
    let mut enc = [0u8; 4];
    w.write_all(ch.encode_utf8(&mut enc).as_bytes())
}

/// Write a UTF-8 string starting at `(x, y)`.
pub fn put_str(w: &mut impl Write, x: i32, y: i32, text: &str) -> io::Result<()> {
    ansi::cursor_to(w, x, y)?;
    w.write_all(text.as_bytes())
}

/// Write formatted text starting at `(x, y)`.
///
/// ```
/// use strata_term::draw;
///
/// let mut out = Vec::new();
/// draw::print(&mut out, 1, 2, format_args!("{} files", 3))?;
/// assert_eq!(out, b"\x1b[2;1H3 files");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn print(w: &mut impl Write, x: i32, y: i32, args: fmt::Arguments<'_>) -> io::Result<()> {
    ansi::cursor_to(w, x, y)?;
    w.write_fmt(args)
}

/// Write `text` at `(x, y)` as an OSC 8 hyperlink to `url`.
pub fn put_link(w: &mut impl Write, x: i32, y: i32, text: &str, url: &str) -> io::Result<()> {
    ansi::cursor_to(w, x, y)?;
    ansi::hyperlink(w, url, text)
}

// ─── Regions ─────────────────────────────────────────────────────────────────

/// Overwrite the inclusive rectangle with spaces.
pub fn clear_region(w: &mut impl Write, x1: i32, y1: i32, x2: i32, y2: i32) -> io::Result<()> {
    fill_region(w, x1, y1, x2, y2, ' ')
}

/// Fill the inclusive rectangle with `ch`, one cursor move per row.
pub fn fill_region(
    w: &mut impl Write,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    ch: char,
) -> io::Result<()> {
    let mut enc = [0u8; 4];
    let glyph = ch.encode_utf8(&mut enc).as_bytes();
    for y in y1..=y2 {
        ansi::cursor_to(w, x1, y)?;
        for _ in x1..=x2 {
            w.write_all(glyph)?;
        }
    }
    Ok(())
}

/// Horizontal run of `len` copies of `ch` starting at `(x, y)`.
///
/// Each cell gets its own cursor move. Non-positive lengths draw nothing,
/// and the run stops at the last column an `i32` can address.
pub fn hline(w: &mut impl Write, x: i32, y: i32, len: i32, ch: char) -> io::Result<()> {
    for i in 0..len {
        let Some(cx) = x.checked_add(i) else { break };
        put_char(w, cx, y, ch)?;
    }
    Ok(())
}

/// Vertical run of `len` copies of `ch` starting at `(x, y)`.
///
/// Stops at the last row an `i32` can address.
pub fn vline(w: &mut impl Write, x: i32, y: i32, len: i32, ch: char) -> io::Result<()> {
    for i in 0..len {
        let Some(cy) = y.checked_add(i) else { break };
        put_char(w, x, cy, ch)?;
    }
    Ok(())
}

// ─── Boxes ───────────────────────────────────────────────────────────────────

/// Line weight for [`draw_box`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxStyle {
    /// `┌─┐` thin lines.
    #[default]
    Light,
    /// `┏━┓` thick lines.
    Heavy,
    /// `╔═╗` double lines.
    Double,
}

/// The six glyphs a box is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxGlyphs {
    /// Glyph for horizontal edges.
    pub horizontal: char,
    /// Glyph for vertical edges.
    pub vertical: char,
    /// Top-left corner.
    pub top_left: char,
    /// Top-right corner.
    pub top_right: char,
    /// Bottom-left corner.
    pub bottom_left: char,
    /// Bottom-right corner.
    pub bottom_right: char,
}

impl BoxStyle {
    /// Glyph set for this style.
    #[must_use]
    pub const fn glyphs(self) -> BoxGlyphs {
        match self {
            Self::Light => BoxGlyphs {
                horizontal: '─',
                vertical: '│',
                top_left: '┌',
                top_right: '┐',
                bottom_left: '└',
                bottom_right: '┘',
            },
            Self::Heavy => BoxGlyphs {
                horizontal: '━',
                vertical: '┃',
                top_left: '┏',
                top_right: '┓',
                bottom_left: '┗',
                bottom_right: '┛',
            },
            Self::Double => BoxGlyphs {
                horizontal: '═',
                vertical: '║',
                top_left: '╔',
                top_right: '╗',
                bottom_left: '╚',
                bottom_right: '╝',
            },
        }
    }
}

/// Draw a box outline with corners at `(x1, y1)` and `(x2, y2)`.
///
/// Corners go first (top-left, top-right, bottom-left, bottom-right), then
/// the top and bottom edges, then the left and right edges. Inverted
/// corners get no edges.
pub fn draw_box(
    w: &mut impl Write,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    style: BoxStyle,
) -> io::Result<()> {
    let g = style.glyphs();

    put_char(w, x1, y1, g.top_left)?;
    put_char(w, x2, y1, g.top_right)?;
    put_char(w, x1, y2, g.bottom_left)?;
    put_char(w, x2, y2, g.bottom_right)?;

    let across = x2.saturating_sub(x1).saturating_sub(1);
    let down = y2.saturating_sub(y1).saturating_sub(1);
    let (left, top) = (x1.saturating_add(1), y1.saturating_add(1));

    hline(w, left, y1, across, g.horizontal)?;
    hline(w, left, y2, across, g.horizontal)?;

    vline(w, x1, top, down, g.vertical)?;
    vline(w, x2, top, down, g.vertical)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
