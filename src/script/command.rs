use std::fmt;

/// Maximum number of commands kept from a single script.
pub const MAX_COMMANDS: usize = 100;
/// Maximum number of parameters a single command line can carry.
pub const MAX_PARAMS: usize = 4;
/// Longest command name kept (in characters).
pub const MAX_NAME_LEN: usize = 31;
/// Longest parameter kept (in characters).
pub const MAX_PARAM_LEN: usize = 255;

/// Copy `s`, cutting it to at most `max_chars` characters.
pub(crate) fn truncated(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Fixed-capacity parameter list. Never holds more than [`MAX_PARAMS`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    items: Vec<String>,
}

impl Params {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(MAX_PARAMS),
        }
    }

    /// Append a parameter, truncating it to [`MAX_PARAM_LEN`].
    /// Returns `false` (and drops the value) once the list is full.
    pub fn try_push(&mut self, value: &str) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(truncated(value, MAX_PARAM_LEN));
        true
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_PARAMS
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.items.get(idx).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a str> for Params {
    /// Collects up to [`MAX_PARAMS`] values; the rest are dropped.
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut params = Params::new();
        for value in iter {
            if !params.try_push(value) {
                break;
            }
        }
        params
    }
}

/// One script line turned into a command name and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    params: Params,
    line: usize,
}

impl Command {
    /// Build a command; the name is truncated to [`MAX_NAME_LEN`].
    pub fn new(name: &str, params: Params, line: usize) -> Self {
        Self {
            name: truncated(name, MAX_NAME_LEN),
            params,
            line,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Parameter `idx`, or the empty string when absent.
    pub fn param(&self, idx: usize) -> &str {
        self.params.get(idx).unwrap_or("")
    }

    /// 1-based source line the command came from.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for p in self.params.iter() {
            write!(f, " '{p}'")?;
        }
        Ok(())
    }
}

/// Ordered commands of one script, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedScript {
    commands: Vec<Command>,
}

impl ParsedScript {
    /// Append a command. Returns `false` once [`MAX_COMMANDS`] is reached.
    pub fn try_push(&mut self, cmd: Command) -> bool {
        if self.commands.len() >= MAX_COMMANDS {
            return false;
        }
        self.commands.push(cmd);
        true
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
