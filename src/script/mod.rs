//! Script model and parser.
//!
//! - `command`: bounded `Command`/`Params`/`ParsedScript` types.
//! - `parser`: turns script text into a `ParsedScript`.

pub mod command;
pub mod parser;

pub use command::{
    Command, MAX_COMMANDS, MAX_NAME_LEN, MAX_PARAM_LEN, MAX_PARAMS, ParsedScript, Params,
};
pub use parser::{ParamTokens, parse_file, parse_line, parse_str};
