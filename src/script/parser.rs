//! Line-oriented script parser.
//!
//! Every line is handled on its own:
//! - everything from the first `#` onward is a comment (quotes do not protect it);
//! - blank lines produce nothing;
//! - the first whitespace-separated token is the command name;
//! - up to [`MAX_PARAMS`] parameters follow, see [`ParamTokens`] for quoting.
//!
//! Malformed lines never fail the parse; they simply yield whatever tokens
//! could be read.

use std::fs;
use std::path::Path;

use tracing::{debug, trace, warn};

use super::command::{Command, MAX_COMMANDS, MAX_PARAMS, ParsedScript, Params};
use crate::error::{EngineError, Result};

/// Iterator over the parameters of one line.
///
/// A token starting with `"` opens a quoted parameter. If the same token holds
/// another `"`, the parameter ends at the *last* quote of that token. Otherwise
/// the parameter swallows the rest of the line, spacing intact, and is cut at
/// the line's last `"`; nothing after it is read. Unquoted tokens are taken
/// verbatim.
pub struct ParamTokens<'a> {
    rest: &'a str,
}

impl<'a> ParamTokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl Iterator for ParamTokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let text = self.rest.trim_start();
        if text.is_empty() {
            self.rest = text;
            return None;
        }
        let end = text.find(char::is_whitespace).unwrap_or(text.len());
        let (token, after) = text.split_at(end);
        self.rest = after;

        let Some(inner) = token.strip_prefix('"') else {
            return Some(token.to_string());
        };
        if let Some(close) = inner.rfind('"') {
            return Some(inner[..close].to_string());
        }

        // The separator after the opening token reads as one space.
        let mut chars = after.chars();
        chars.next();
        let tail = chars.as_str();
        self.rest = "";
        if tail.is_empty() {
            return Some(inner.to_string());
        }
        let mut acc = format!("{inner} {tail}");
        if let Some(close) = acc.rfind('"') {
            acc.truncate(close);
        }
        Some(acc)
    }
}

/// Parse one physical line. Returns `None` for blank and comment-only lines.
pub fn parse_line(line: &str, line_no: usize) -> Option<Command> {
    let code = match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    };

    let code = code.trim_start();
    if code.is_empty() {
        return None;
    }
    let (name, rest) = match code.find(char::is_whitespace) {
        Some(idx) => code.split_at(idx),
        None => (code, ""),
    };

    let params: Vec<String> = ParamTokens::new(rest).take(MAX_PARAMS).collect();
    let params: Params = params.iter().map(String::as_str).collect();
    Some(Command::new(name, params, line_no))
}

/// Parse a whole script held in memory.
pub fn parse_str(text: &str) -> ParsedScript {
    let mut script = ParsedScript::default();
    for (idx, line) in text.lines().enumerate() {
        let Some(cmd) = parse_line(line, idx + 1) else {
            continue;
        };
        trace!(target: "uiscript::parser", line = cmd.line(), command = %cmd, "Parsed command");
        if !script.try_push(cmd) {
            warn!(
                target: "uiscript::parser",
                line = idx + 1,
                max = MAX_COMMANDS,
                "Command limit reached; ignoring the rest of the script"
            );
            break;
        }
    }
    debug!(target: "uiscript::parser", commands = script.len(), "Script parsed");
    script
}

/// Read and parse a script file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedScript> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| EngineError::ScriptFile {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(target: "uiscript::parser", path = %path.display(), "Loaded script file");
    Ok(parse_str(&text))
}
