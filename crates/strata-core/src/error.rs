// SPDX-License-Identifier: MIT
//
// Error type for the core crate.
//
// Only two things can actually go wrong in here: asking for a window with
// an impossible size, and running out of timer slots. Everything else
// (unknown or stale handles) is a silent no-op. I/O errors from the
// output sink or the input source pass through unchanged.

use std::io;

use thiserror::Error;

/// Errors returned by the window stack, timer table and runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// Width and height must both be positive and their product must fit
    /// in memory.
    #[error("invalid screen geometry {w}x{h}")]
    InvalidGeometry {
        /// Requested width.
        w: i32,
        /// Requested height.
        h: i32,
    },

    /// Every timer slot is in use.
    #[error("timer table full ({capacity} slots in use)")]
    TimerTableFull {
        /// Number of slots in the table.
        capacity: usize,
    },

    /// The output sink or the input source failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias used across the core crate.
pub type Result<T> = std::result::Result<T, Error>;
