use std::borrow::Cow;

use crate::error::{EngineError, Result};
use crate::executor::variables::VariableStore;

/// Resolve a script parameter against the variable table.
///
/// Supported forms:
/// - `$name` -> the current value of `name` (error if it was never set)
/// - anything else -> returned unchanged
///
/// Notes:
/// - Only a leading `$` triggers lookup; `$` elsewhere in the text is literal.
/// - Lookup happens when the command runs, so a variable set after parsing is visible.
pub fn substitute<'a>(param: &'a str, vars: &'a VariableStore) -> Result<Cow<'a, str>> {
    match param.strip_prefix('$') {
        Some(name) => vars
            .get(name)
            .map(Cow::Borrowed)
            .ok_or_else(|| EngineError::VariableNotFound(name.to_string())),
        None => Ok(Cow::Borrowed(param)),
    }
}

/// Parse an integer the forgiving way numeric script parameters are read:
/// leading whitespace, an optional sign, then as many digits as present.
/// Anything unparsable yields 0; overflow saturates.
pub fn parse_int_lenient(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative { -value } else { value }
}

/// Lenient parse clamped into `i32` range (screen coordinates, control types).
pub fn parse_i32_lenient(s: &str) -> i32 {
    let v = parse_int_lenient(s);
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Lenient parse of a duration in milliseconds; negatives become 0.
pub fn parse_millis_lenient(s: &str) -> u64 {
    parse_int_lenient(s).max(0) as u64
}
