// SPDX-License-Identifier: MIT
//
// Screen — a rectangular window with its own grid of cells.
//
// A screen knows where it sits on the terminal (x, y), how big it is
// (w, h), whether it is visible, and what each of its w*h cells holds.
// It does not know about other screens: ordering, hit-testing and the
// active window are the stack's business (see `stack.rs`).
//
// A cell holds one grapheme cluster as an owned string, or nothing. Wide
// clusters (CJK, most emoji) take two columns; the cell after them is
// left empty so a repaint does not draw over the second half.
//
// Invariant: `cells.len() == w * h` at all times. Geometry that would
// break it (non-positive or overflowing sizes) is rejected before any
// state changes.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::error::{Error, Result};

// ─── Cell ────────────────────────────────────────────────────────────────────

/// One character position: a grapheme cluster, or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    grapheme: Option<Box<str>>,
}

impl Cell {
    /// A cell holding `grapheme`. An empty string gives an empty cell.
    #[must_use]
    pub fn new(grapheme: &str) -> Self {
        Self {
            grapheme: (!grapheme.is_empty()).then(|| grapheme.into()),
        }
    }

    /// The grapheme, if any.
    #[inline]
    #[must_use]
    pub fn grapheme(&self) -> Option<&str> {
        self.grapheme.as_deref()
    }

    /// Byte length of the stored grapheme (0 when empty).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.grapheme.as_ref().map_or(0, |g| g.len())
    }

    /// True when the cell holds no glyph.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.grapheme.is_none()
    }

    /// Release the content, leaving the cell empty.
    #[inline]
    pub fn clear(&mut self) {
        self.grapheme = None;
    }
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// A rectangular window: position, size, visibility and a cell grid.
///
/// Created and owned by a [`WindowStack`](crate::stack::WindowStack);
/// borrow one with [`WindowStack::get`](crate::stack::WindowStack::get).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    visible: bool,
    cells: Vec<Cell>,
}

impl Screen {
    /// A visible screen with an empty grid.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGeometry`] if `w` or `h` is not positive or the
    /// grid would not fit in memory.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        let area = grid_area(w, h)?;
        Ok(Self {
            x,
            y,
            w,
            h,
            visible: true,
            cells: vec![Cell::default(); area],
        })
    }

    // ── Geometry ────────────────────────────────────────────────────

    /// Left column on the terminal.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Top row on the terminal.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.w
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.h
    }

    /// Whether `(px, py)` lies inside the rectangle `[x, x+w) × [y, y+h)`.
    #[must_use]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        // i64 so x + w cannot overflow near i32::MAX.
        let (px, py) = (i64::from(px), i64::from(py));
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        px >= x && py >= y && px < x + i64::from(self.w) && py < y + i64::from(self.h)
    }

    pub(crate) const fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Reallocate the grid for a new size.
    ///
    /// Cells keep their linear index, like a raw reallocation: content is
    /// not re-mapped into the new geometry, so callers re-render after a
    /// resize. Invalid sizes leave the screen untouched.
    pub(crate) fn resize(&mut self, w: i32, h: i32) -> Result<()> {
        let area = grid_area(w, h)?;
        self.cells.resize_with(area, Cell::default);
        self.cells.shrink_to_fit();
        self.w = w;
        self.h = h;
        Ok(())
    }

    // ── Visibility ──────────────────────────────────────────────────

    /// True unless the screen is hidden.
    #[inline]
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) const fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // ── Cells ───────────────────────────────────────────────────────

    /// All cells in row-major order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell at local `(col, row)`, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, col: i32, row: i32) -> Option<&Cell> {
        self.index(col, row).map(|i| &self.cells[i])
    }

    /// Store `grapheme` at local `(col, row)`. Out-of-range writes are
    /// ignored. Returns whether the cell was written.
    pub fn set_cell(&mut self, col: i32, row: i32, grapheme: &str) -> bool {
        let Some(i) = self.index(col, row) else {
            return false;
        };
        self.cells[i] = Cell::new(grapheme);
        true
    }

    /// Write `text` into row `row` starting at column `col`.
    ///
    /// Text is split into grapheme clusters. Each cluster advances by its
    /// display width; the column after a wide cluster is cleared. Writing
    /// stops at the right edge. Zero-width clusters are dropped. Returns the
    /// column after the last cluster written.
    pub fn put_str(&mut self, col: i32, row: i32, text: &str) -> i32 {
        let mut x = col;
        for g in text.graphemes(true) {
            let width = i32::try_from(g.width()).unwrap_or(i32::MAX);
            if width == 0 {
                continue;
            }
            if x.saturating_add(width) > self.w {
                break;
            }
            self.set_cell(x, row, g);
            for pad in 1..width {
                if let Some(i) = self.index(x + pad, row) {
                    self.cells[i].clear();
                }
            }
            x += width;
        }
        x
    }

    /// Release every cell's content. Geometry and stack position stay.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(Cell::clear);
    }

    /// Row-major index of local `(col, row)`.
    #[allow(clippy::cast_sign_loss)] // bounds checked: both are non-negative.
    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.w || row >= self.h {
            return None;
        }
        Some(row as usize * self.w as usize + col as usize)
    }
}

/// `w * h` as a cell count, rejecting non-positive or overflowing sizes.
fn grid_area(w: i32, h: i32) -> Result<usize> {
    if w <= 0 || h <= 0 {
        return Err(Error::InvalidGeometry { w, h });
    }
    let (Ok(uw), Ok(uh)) = (usize::try_from(w), usize::try_from(h)) else {
        return Err(Error::InvalidGeometry { w, h });
    };
    uw.checked_mul(uh).ok_or(Error::InvalidGeometry { w, h })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
