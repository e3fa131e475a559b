// SPDX-License-Identifier: MIT
//
// strata — layered terminal windows over batched ANSI output.
//
// Façade over the two workspace crates:
//
//   strata-term  bytes in, bytes out: output buffer, escape encoder,
//                drawing primitives, input events, clocks, terminal size
//   strata-core  structure: screens, the window stack, focus, timers,
//                and the `Runtime` that owns one of each
//
// A typical host builds a `Runtime` (usually `Runtime::stdio` with
// `RuntimeConfig::from_env`), calls `enter`, creates screens and writes
// into their cells, then alternates `compose` and `wait_event` until it
// is done and calls `shutdown`.

pub use strata_core;
pub use strata_term;

pub use strata_core::config::RuntimeConfig;
pub use strata_core::focus::{FocusRegistry, Widget, WidgetId};
pub use strata_core::runtime::{Runtime, StdioRuntime};
pub use strata_core::screen::{Cell, Screen};
pub use strata_core::stack::{ScreenId, WindowStack};
pub use strata_core::timer::{TimerId, TimerTable};
pub use strata_core::{Error, Result, logging};
pub use strata_term::event::Event;
pub use strata_term::{ansi, draw};
