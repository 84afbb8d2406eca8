//! Boolean conditions for `IF`.
//!
//! Three prefix forms are recognised; anything else is simply false:
//!
//! - `ElementExists <automation-id>`
//! - `ElementNotExists <automation-id>`
//! - `ContainsElementText <automation-id> <class> <control-type> <needle>`

use tracing::debug;

use super::context::ExecutionContext;
use super::locator::{self, ElementQuery};
use crate::script::ParamTokens;
use crate::utils::interpolation::substitute;

const ELEMENT_EXISTS: &str = "ElementExists ";
const ELEMENT_NOT_EXISTS: &str = "ElementNotExists ";
const CONTAINS_ELEMENT_TEXT: &str = "ContainsElementText ";

/// Evaluate `condition` against the attached window and the variables.
///
/// Never fails: malformed conditions and lookup errors read as `false`,
/// except that a missing element (or window) makes `ElementNotExists` true.
pub fn evaluate(ctx: &mut ExecutionContext, condition: &str) -> bool {
    let result = if let Some(id) = condition.strip_prefix(ELEMENT_EXISTS) {
        element_exists(ctx, id.trim())
    } else if let Some(id) = condition.strip_prefix(ELEMENT_NOT_EXISTS) {
        let id = id.trim();
        !id.is_empty() && !element_exists(ctx, id)
    } else if let Some(rest) = condition.strip_prefix(CONTAINS_ELEMENT_TEXT) {
        contains_element_text(ctx, rest)
    } else {
        false
    };
    debug!(target: "uiscript::dispatch", %condition, result, "Condition evaluated");
    result
}

fn element_exists(ctx: &mut ExecutionContext, automation_id: &str) -> bool {
    if automation_id.is_empty() {
        return false;
    }
    locator::locate(ctx, &ElementQuery::by_automation_id(automation_id)).is_ok()
}

fn contains_element_text(ctx: &mut ExecutionContext, rest: &str) -> bool {
    let tokens: Vec<String> = ParamTokens::new(rest).collect();
    let [id, class, control_type, needle] = tokens.as_slice() else {
        return false;
    };
    let Ok(needle) = substitute(needle, ctx.vars()).map(|n| n.into_owned()) else {
        return false;
    };
    let query = ElementQuery::from_slots(id, class, control_type);
    match locator::locate(ctx, &query) {
        Ok(element) => element
            .text()
            .is_some_and(|text| text.contains(needle.as_str())),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{FakeBackend, FakeElement};
    use crate::config::Settings;
    use crate::executor::Effect;

    fn ctx_with(fake: &FakeBackend, attach: bool) -> ExecutionContext {
        let mut ctx = ExecutionContext::new(Box::new(fake.clone()), &Settings::default());
        if attach {
            let target = ctx.backend_mut().attach_by_name("app.exe").unwrap();
            ctx.apply(Effect::Attached(target));
        }
        ctx
    }

    fn app() -> FakeBackend {
        FakeBackend::new()
            .with_process("app.exe", 7)
            .with_element(FakeElement::new("status", "Static", 50020).named("Hello World"))
    }

    #[test]
    fn element_exists_forms() {
        let fake = app();
        let mut ctx = ctx_with(&fake, true);
        assert!(evaluate(&mut ctx, "ElementExists status"));
        assert!(!evaluate(&mut ctx, "ElementExists missing"));
        assert!(evaluate(&mut ctx, "ElementNotExists missing"));
        assert!(!evaluate(&mut ctx, "ElementNotExists status"));
    }

    #[test]
    fn not_exists_is_true_without_a_window() {
        let fake = app();
        let mut ctx = ctx_with(&fake, false);
        assert!(evaluate(&mut ctx, "ElementNotExists status"));
        assert!(!evaluate(&mut ctx, "ElementExists status"));
    }

    #[test]
    fn contains_text_with_variable_needle() {
        let fake = app();
        let mut ctx = ctx_with(&fake, true);
        ctx.vars_mut().set("needle", "World").unwrap();
        assert!(evaluate(&mut ctx, "ContainsElementText status Static 50020 $needle"));
        assert!(evaluate(&mut ctx, "ContainsElementText status null -1 Hello"));
        assert!(!evaluate(&mut ctx, "ContainsElementText status Static 50020 Bye"));
        assert!(!evaluate(&mut ctx, "ContainsElementText status Static 50020 $unset"));
    }

    #[test]
    fn contains_text_reads_value_when_name_is_missing() {
        let fake =
            app().with_element(FakeElement::new("input", "Edit", 50004).valued("Hello World"));
        let mut ctx = ctx_with(&fake, true);
        assert!(evaluate(&mut ctx, "ContainsElementText input Edit 50004 World"));
        assert!(!evaluate(&mut ctx, "ContainsElementText input Edit 50004 Bye"));
    }

    #[test]
    fn malformed_conditions_are_false() {
        let fake = app();
        let mut ctx = ctx_with(&fake, true);
        assert!(!evaluate(&mut ctx, "ContainsElementText status Static 50020"));
        assert!(!evaluate(&mut ctx, "ContainsElementText status Static 50020 Hello extra"));
        assert!(!evaluate(&mut ctx, "ElementExists"));
        assert!(!evaluate(&mut ctx, "ElementNotExists "));
        assert!(!evaluate(&mut ctx, "true"));
        assert!(!evaluate(&mut ctx, ""));
    }
}
