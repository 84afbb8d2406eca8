use tracing::trace;

use crate::error::{EngineError, Result};
use crate::script::command::truncated;

/// Maximum number of distinct variables per run.
pub const MAX_VARIABLES: usize = 100;
/// Longest variable name kept (in characters).
pub const MAX_VAR_NAME: usize = 31;
/// Longest variable value kept (in characters).
pub const MAX_VAR_VALUE: usize = 255;

/// Result variable written by `ContainsElementText`.
pub const CONTAINS_RESULT: &str = "_CONTAINS_RESULT";
/// Result variable written by `IF` and reset by `ENDIF`.
pub const IF_CONDITION: &str = "_IF_CONDITION";
/// Result variable written by `IsElementEnabled`.
pub const ENABLED_RESULT: &str = "_ENABLED_RESULT";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Variable {
    name: String,
    value: String,
}

/// Bounded name -> value table.
///
/// Setting an existing name overwrites it in place. Setting a new name once
/// [`MAX_VARIABLES`] entries exist fails and leaves the table untouched.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    vars: Vec<Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self {
            vars: Vec::with_capacity(MAX_VARIABLES),
        }
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let name = truncated(name, MAX_VAR_NAME);
        let value = truncated(value, MAX_VAR_VALUE);

        if let Some(existing) = self.vars.iter_mut().find(|v| v.name == name) {
            trace!(target: "uiscript::vars", %name, %value, "Overwriting variable");
            existing.value = value;
            return Ok(());
        }
        if self.vars.len() >= MAX_VARIABLES {
            return Err(EngineError::VariableStoreFull(name));
        }
        trace!(target: "uiscript::vars", %name, %value, "New variable");
        self.vars.push(Variable { name, value });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    /// Store `"true"` or `"false"`.
    pub fn set_flag(&mut self, name: &str, flag: bool) -> Result<()> {
        self.set(name, if flag { "true" } else { "false" })
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
