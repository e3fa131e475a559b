// SPDX-License-Identifier: MIT
//
// strata-term — Terminal layer for strata.
//
// Everything that touches bytes lives here: the fixed-capacity output
// channel every drawing call funnels through, the ANSI/VT encoder, the
// drawing primitives built on it, and the raw input side (a byte source
// and the event source that packages its bytes into events).
//
// The window stack, focus registry and timers live one layer up in
// strata-core. This crate knows nothing about screens; it only knows
// how to get bytes to the terminal in the order they were produced.

pub mod ansi;
pub mod clock;
pub mod draw;
pub mod event;
pub mod output;
pub mod source;
pub mod terminal;
