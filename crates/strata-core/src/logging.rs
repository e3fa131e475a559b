// SPDX-License-Identifier: MIT
//
// Diagnostics setup.
//
// The runtime logs through `tracing` and never installs a subscriber on
// its own. Hosts that want the logs call `init`, which reads the filter
// from `STRATA_LOG` (default `warn`) and writes either to the file named
// by `STRATA_LOG_FILE` or to stderr.
//
// Prefer the file while the terminal is in use: stderr usually points at
// the same TTY the runtime is drawing on.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter directive.
pub const FILTER_ENV: &str = "STRATA_LOG";
/// Environment variable naming a log file.
pub const FILE_ENV: &str = "STRATA_LOG_FILE";

const DEFAULT_FILTER: &str = "warn";

/// Install a global subscriber configured from the environment.
///
/// Returns `Ok(false)` if a global subscriber was already installed
/// (by an earlier call or by the host), `Ok(true)` if this call installed
/// one.
///
/// # Errors
///
/// Returns an error if `STRATA_LOG_FILE` is set but cannot be opened.
pub fn init() -> io::Result<bool> {
    let filter = std::env::var(FILTER_ENV).ok();
    match std::env::var_os(FILE_ENV) {
        Some(path) if !path.is_empty() => init_with(filter.as_deref(), Some(Path::new(&path))),
        _ => init_with(filter.as_deref(), None),
    }
}

/// Install a global subscriber with an explicit filter and destination.
///
/// `filter` uses `EnvFilter` syntax (`"strata_core=debug,warn"`); `None`
/// or an unparsable directive falls back to `warn`. `file` is opened in
/// append mode; `None` logs to stderr.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_with(filter: Option<&str>, file: Option<&Path>) -> io::Result<bool> {
    let env_filter = filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if let Some(path) = file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!("strata logging initialized");
    }
    Ok(installed)
}
