// SPDX-License-Identifier: MIT
//
// Runtime configuration.
//
// A small `Copy` struct with sensible defaults, optionally overridden from
// the environment:
//
//   STRATA_OUTPUT_CAPACITY   output buffer size in bytes     (262144)
//   STRATA_TIMER_SLOTS       number of timer slots           (64)
//   STRATA_POLL_INTERVAL_MS  sleep between empty input polls (20)
//   STRATA_SYNC_OUTPUT       "1" wraps the session in synchronized output
//
// Values that do not parse, or that are zero where zero makes no sense,
// are ignored with a warning and the default is kept.

use std::env;
use std::time::Duration;

use strata_term::output::DEFAULT_CAPACITY;
use strata_term::source::DEFAULT_POLL_INTERVAL;
use tracing::warn;

/// Default number of timer slots.
pub const DEFAULT_TIMER_SLOTS: usize = 64;

/// Settings for a [`Runtime`](crate::runtime::Runtime).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Output buffer capacity in bytes.
    pub output_capacity: usize,
    /// Hard limit on concurrently scheduled timers.
    pub timer_capacity: usize,
    /// Sleep between empty polls while waiting for input.
    pub poll_interval: Duration,
    /// Enable synchronized output at startup and disable it at shutdown.
    pub sync_output: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            output_capacity: DEFAULT_CAPACITY,
            timer_capacity: DEFAULT_TIMER_SLOTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            sync_output: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `STRATA_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    ///
    /// `from_env` is this with `std::env::var`; tests pass a map instead.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            output_capacity: positive(&lookup, "STRATA_OUTPUT_CAPACITY")
                .unwrap_or(defaults.output_capacity),
            timer_capacity: positive(&lookup, "STRATA_TIMER_SLOTS")
                .unwrap_or(defaults.timer_capacity),
            poll_interval: positive(&lookup, "STRATA_POLL_INTERVAL_MS")
                .map_or(defaults.poll_interval, |ms| {
                    Duration::from_millis(u64::try_from(ms).unwrap_or(u64::MAX))
                }),
            sync_output: lookup("STRATA_SYNC_OUTPUT").is_some_and(|v| v.trim() == "1"),
        }
    }
}

/// Parse a strictly positive integer, warning on garbage.
fn positive(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!(key, value = raw, "ignoring invalid config value");
            None
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
