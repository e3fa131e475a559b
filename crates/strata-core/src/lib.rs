// SPDX-License-Identifier: MIT
//
// strata-core — Windows, focus and timers on top of strata-term.
//
// The structural half of the runtime. Screens are rectangular windows
// kept in a z-ordered stack; widgets are focusable regions in a separate
// registry; timers sit in a fixed table of slots. All three are plain
// context objects with no global state, so any number of runtimes (or
// tests) can exist side by side.
//
// `Runtime` bundles them with the output channel and event source from
// strata-term into one value a host application owns.

pub mod config;
pub mod error;
pub mod focus;
pub mod logging;
pub mod runtime;
pub mod screen;
pub mod stack;
pub mod timer;

pub use error::{Error, Result};
