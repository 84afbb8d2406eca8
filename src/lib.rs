#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! uiscript: a line-oriented UI automation script interpreter.
//!
//! A script is parsed into bounded commands, then executed one by one against
//! an automation backend (UI Automation on Windows, a headless backend
//! elsewhere). The first failing command halts the run.
//!
//! Modules:
//! - `error`: The `EngineError` taxonomy.
//! - `config`: Settings model, loader, and schema helpers.
//! - `script`: Command model and line parser.
//! - `executor`: Variables, element locator, conditions, dispatch table, and runtime.
//! - `backend`: Automation backend trait and its implementations.
//! - `htmllog`: The per-run HTML log written by `StartLog`.
//! - `utils`: Substitution and lenient number parsing.
//!
//! Use `uiscript::prelude::*` to bring commonly used items into scope quickly.

/// Public module: backends (trait, headless, Windows UI Automation).
pub mod backend;
/// Public module: configuration (models, loader, schema helpers).
pub mod config;
/// Public module: error taxonomy.
pub mod error;
/// Public module: execution engine (context, dispatch, runtime).
pub mod executor;
/// Public module: HTML run log.
pub mod htmllog;
/// Public module: script model and parser.
pub mod script;
/// Public module: utilities (substitution, number parsing).
pub mod utils;

/// Crate-level constants for consumers that want to inspect package metadata at runtime.
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version (e.g., "0.1.0").
#[inline]
pub const fn version() -> &'static str {
    PKG_VERSION
}

/// Parse a simple level name (trace|debug|info|warn|error).
pub fn parse_level(s: &str) -> Option<tracing::Level> {
    use tracing::Level;
    match s.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize tracing (logging) with a reasonable default.
/// - Honors the `RUST_LOG` environment variable if set.
/// - Then the `fallback` level (usually from the settings file).
/// - Falls back to `info` level.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_tracing(fallback: Option<&str>) {
    use tracing::Level;
    use tracing_subscriber::fmt;

    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| parse_level(&s))
        .or_else(|| fallback.and_then(parse_level))
        .unwrap_or(Level::INFO);

    // Ignore the error if the global subscriber was already set.
    let _ = fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// A convenient set of exports for most consumers.
///
/// Bring this into scope with:
/// `use uiscript::prelude::*;`
pub mod prelude {
    // Common result/error handling
    pub use crate::error::{EngineError, Result as EngineResult};
    pub use anyhow::{Context, Error, Result, anyhow, bail, ensure};

    // Tracing macros
    pub use tracing::{debug, error, info, instrument, trace, warn};

    // Timing helpers
    pub use std::time::Duration;

    // External crates (namespaced) if callers want direct access
    pub use crate as uiscript;
    pub use enigo;

    // Frequently used items
    pub use crate::backend::{AutomationBackend, native as native_backend};
    pub use crate::config::Settings;
    pub use crate::executor::{RunOutcome, Runtime};
    pub use crate::script::{Command, ParsedScript, parse_file, parse_str};
    pub use crate::{backend, config, executor, script, utils};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level("WARNING"), Some(tracing::Level::WARN));
        assert_eq!(parse_level(" debug "), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level("loud"), None);
    }
}
