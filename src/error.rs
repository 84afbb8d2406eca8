use std::path::PathBuf;

use thiserror::Error;

use crate::executor::dispatch::Arity;

/// Every way a script run can fail.
///
/// All variants only halt the current run; none of them leaves persistent
/// state behind other than a partially written HTML log.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot read script file {}: {source}", path.display())]
    ScriptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid parameter count for {command}: expected {expected}, got {got}")]
    ArityMismatch {
        command: String,
        expected: Arity,
        got: usize,
    },

    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    #[error("Variable table is full, cannot set '{0}'")]
    VariableStoreFull(String),

    #[error("No window attached")]
    NoWindowAttached,

    #[error("Could not find element with {0}")]
    ElementNotFound(String),

    #[error("Timeout after {timeout_ms} ms waiting for element with {query}")]
    Timeout { query: String, timeout_ms: u64 },

    #[error("Invalid key combination: {0}")]
    InvalidKeyCombination(String),

    #[error("Log file already exists: {}", .0.display())]
    LogFileExists(PathBuf),

    #[error("Log file error for {}: {source}", path.display())]
    LogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Attach(String),

    #[error("{0}")]
    Backend(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
