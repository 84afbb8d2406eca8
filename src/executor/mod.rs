#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

/*!
Executor module for uiscript.

This module wires together:
- `variables`: the bounded name/value store used for `$name` substitution and result flags
- `locator`: element queries and the polling wait helper
- `condition`: the three `IF` condition forms
- `keys`: modifier/key token parsing
- `context`: the per-run `ExecutionContext`
- `dispatch`: the static command table and its handlers
- `runtime`: the execution loop

Typical usage:
- Pick a backend (`backend::native`) and construct a `Runtime`.
- Call `Runtime::run_file` (or `Runtime::run` with an already parsed script).

Example:
```no_run
use uiscript::backend;
use uiscript::config::Settings;
use uiscript::executor::Runtime;

let settings = Settings::default();
let mut rt = Runtime::new(backend::native(&settings)?, &settings);
let outcome = rt.run_file("script.txt")?;
std::process::exit(outcome.exit_code());
# Ok::<(), anyhow::Error>(())
```
*/

pub mod condition;
pub mod context;
pub mod dispatch;
pub mod keys;
pub mod locator;
pub mod runtime;
pub mod variables;

// Re-exports for convenient access from `uiscript::executor::*`
pub use context::ExecutionContext;
pub use dispatch::{Arity, COMMANDS, CommandDefinition, Effect, dispatch, lookup};
pub use locator::{ControlTypeFilter, ElementQuery};
pub use runtime::{RunOutcome, Runtime};
pub use variables::VariableStore;
