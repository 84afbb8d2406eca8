//! Modifier and key token parsing for `SendModKey` / `SendMultiModKey`.

use crate::backend::{Key, Modifiers};
use crate::error::{EngineError, Result};

/// `CTRL`, `ALT`, `SHIFT` or `WIN`, exact case.
pub fn parse_modifier(token: &str) -> Option<Modifiers> {
    match token {
        "CTRL" => Some(Modifiers::CTRL),
        "ALT" => Some(Modifiers::ALT),
        "SHIFT" => Some(Modifiers::SHIFT),
        "WIN" => Some(Modifiers::WIN),
        _ => None,
    }
}

/// A single character, or one of the named keys.
pub fn parse_key(token: &str) -> Option<Key> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(Key::Char(c));
    }
    let key = match token {
        "TAB" => Key::Tab,
        "ENTER" => Key::Enter,
        "ESC" => Key::Escape,
        "DELETE" => Key::Delete,
        "HOME" => Key::Home,
        "END" => Key::End,
        "PAGEUP" => Key::PageUp,
        "PAGEDOWN" => Key::PageDown,
        _ => {
            let n: u8 = token.strip_prefix('F')?.parse().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            Key::F(n)
        }
    };
    Some(key)
}

/// Split `tokens` into modifiers and the final key.
///
/// Every token but the last must be a modifier name; the last must be a key.
pub fn parse_combo<'a, I>(tokens: I) -> Result<(Modifiers, Key)>
where
    I: IntoIterator<Item = &'a str>,
{
    let tokens: Vec<&str> = tokens.into_iter().collect();
    let Some((key_token, modifier_tokens)) = tokens.split_last() else {
        return Err(EngineError::InvalidKeyCombination("no key given".into()));
    };

    let mut modifiers = Modifiers::NONE;
    for token in modifier_tokens {
        let m = parse_modifier(token).ok_or_else(|| {
            EngineError::InvalidKeyCombination(format!("unknown modifier '{token}'"))
        })?;
        modifiers.insert(m);
    }
    let key = parse_key(key_token).ok_or_else(|| {
        EngineError::InvalidKeyCombination(tokens.join(" + "))
    })?;
    Ok((modifiers, key))
}
