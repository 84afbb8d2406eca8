//! Table-driven command dispatch.
//!
//! Every script command is looked up by exact name in [`COMMANDS`], checked
//! against its [`Arity`], then handed to its handler. Handlers never touch the
//! attachment or the typing delay directly; they return an [`Effect`] that
//! the runtime applies.

use std::fmt;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use super::condition;
use super::context::ExecutionContext;
use super::keys;
use super::locator::{self, ElementQuery};
use super::variables::{CONTAINS_RESULT, ENABLED_RESULT, IF_CONDITION};
use crate::backend::{Key, Target};
use crate::error::{EngineError, Result};
use crate::htmllog::{self, HtmlLog, LogLevel};
use crate::script::Command;
use crate::utils::interpolation::{
    parse_i32_lenient, parse_int_lenient, parse_millis_lenient, substitute,
};

/// Required parameter count of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// State change requested by a handler, applied by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Attached(Target),
    TypingDelay(Duration),
}

type Handler = fn(&mut ExecutionContext, &Command) -> Result<Effect>;

/// One entry of the command table.
#[derive(Debug)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub arity: Arity,
    /// Parameter synopsis shown in the usage text.
    pub synopsis: &'static str,
    handler: Handler,
}

impl CommandDefinition {
    const fn new(
        name: &'static str,
        arity: Arity,
        synopsis: &'static str,
        handler: Handler,
    ) -> Self {
        Self {
            name,
            arity,
            synopsis,
            handler,
        }
    }
}

/// Every command the interpreter understands.
pub static COMMANDS: &[CommandDefinition] = &[
    CommandDefinition::new("AttachProcess", Arity::Exact(1), "\"process.exe\"", attach_process),
    CommandDefinition::new("AttachPid", Arity::Exact(1), "pid", attach_pid),
    CommandDefinition::new("BringToFront", Arity::Exact(0), "", bring_to_front),
    CommandDefinition::new("Click", Arity::Exact(2), "x y", click),
    CommandDefinition::new("RightClick", Arity::Exact(2), "x y", right_click),
    CommandDefinition::new("DoubleClick", Arity::Exact(2), "x y", double_click),
    CommandDefinition::new("SendKeystroke", Arity::Exact(1), "\"text\"", send_keystroke),
    CommandDefinition::new("SetDelay", Arity::Exact(1), "ms", set_delay),
    CommandDefinition::new("SendModKey", Arity::Exact(2), "MOD KEY", send_mod_key),
    CommandDefinition::new("SendMultiModKey", Arity::AtLeast(2), "MOD.. KEY", send_mod_key),
    CommandDefinition::new("ClickElementByProperties", Arity::Exact(3), "id class type", click_element),
    CommandDefinition::new("RightClickElementByProperties", Arity::Exact(3), "id class type", right_click_element),
    CommandDefinition::new("DoubleClickElementByProperties", Arity::Exact(3), "id class type", double_click_element),
    CommandDefinition::new("ClickMenuItem", Arity::Exact(2), "\"menu\" \"item\"", click_menu_item),
    CommandDefinition::new("WaitForElement", Arity::Exact(4), "id class type timeout_ms", wait_for_element),
    CommandDefinition::new("IsElementEnabled", Arity::Exact(3), "id class type", is_element_enabled),
    CommandDefinition::new("ContainsElementText", Arity::Exact(4), "id class type \"needle\"", contains_element_text),
    CommandDefinition::new("SET", Arity::Exact(2), "name \"value\"", set_variable),
    CommandDefinition::new("IF", Arity::AtLeast(1), "CONDITION..", if_condition),
    CommandDefinition::new("ENDIF", Arity::Exact(0), "", end_if),
    CommandDefinition::new("Sleep", Arity::Exact(1), "ms", sleep),
    CommandDefinition::new("StartLog", Arity::Exact(1), "\"base_name\"", start_log),
    CommandDefinition::new("Log", Arity::Exact(1), "\"message\"", log_normal),
    CommandDefinition::new("LogWarning", Arity::Exact(1), "\"message\"", log_warning),
    CommandDefinition::new("LogError", Arity::Exact(1), "\"message\"", log_error),
    CommandDefinition::new("LogHeader", Arity::Exact(1), "\"message\"", log_header),
    CommandDefinition::new("EndLog", Arity::Exact(0), "", end_log),
];

/// Exact, case-sensitive lookup.
pub fn lookup(name: &str) -> Option<&'static CommandDefinition> {
    COMMANDS.iter().find(|def| def.name == name)
}

/// Validate and run one command. On failure the error text is also recorded
/// as the context's last error.
pub fn dispatch(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let result = run(ctx, cmd);
    if let Err(e) = &result {
        ctx.set_last_error(e.to_string());
    }
    result
}

fn run(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    debug!(target: "uiscript::dispatch", line = cmd.line(), %cmd, "Executing command");
    let def = lookup(cmd.name()).ok_or_else(|| EngineError::UnknownCommand(cmd.name().into()))?;
    if !def.arity.accepts(cmd.param_count()) {
        return Err(EngineError::ArityMismatch {
            command: cmd.name().into(),
            expected: def.arity,
            got: cmd.param_count(),
        });
    }
    (def.handler)(ctx, cmd)
}

fn attached(ctx: &ExecutionContext) -> Result<Target> {
    ctx.attachment().ok_or(EngineError::NoWindowAttached)
}

// Attachment

fn attach_process(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let name = cmd.param(0);
    info!(target: "uiscript::dispatch", process = %name, "Attaching to process");
    let target = ctx.backend_mut().attach_by_name(name)?;
    Ok(Effect::Attached(target))
}

fn attach_pid(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let pid = u32::try_from(parse_int_lenient(cmd.param(0)))
        .ok()
        .filter(|pid| *pid != 0)
        .ok_or_else(|| EngineError::Attach(format!("Invalid process ID: {}", cmd.param(0))))?;
    info!(target: "uiscript::dispatch", pid, "Attaching to process id");
    let target = ctx.backend_mut().attach_by_pid(pid)?;
    Ok(Effect::Attached(target))
}

fn bring_to_front(ctx: &mut ExecutionContext, _cmd: &Command) -> Result<Effect> {
    let target = attached(ctx)?;
    if ctx.backend_mut().bring_to_front(&target) {
        Ok(Effect::None)
    } else {
        Err(EngineError::Backend("Failed to bring window to front".into()))
    }
}

// Pointer

fn coords(cmd: &Command) -> (i32, i32) {
    (parse_i32_lenient(cmd.param(0)), parse_i32_lenient(cmd.param(1)))
}

fn click(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let (x, y) = coords(cmd);
    ctx.backend_mut().click(x, y)?;
    Ok(Effect::None)
}

fn right_click(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let (x, y) = coords(cmd);
    ctx.backend_mut().right_click(x, y)?;
    Ok(Effect::None)
}

fn double_click(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let (x, y) = coords(cmd);
    ctx.backend_mut().double_click(x, y)?;
    Ok(Effect::None)
}

// Keyboard

fn send_keystroke(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let text = substitute(cmd.param(0), ctx.vars())?.into_owned();
    let delay = ctx.typing_delay();
    info!(target: "uiscript::dispatch", chars = text.chars().count(), "Sending keystrokes");
    for (i, c) in text.chars().enumerate() {
        if i > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        ctx.backend_mut().send_key(Key::Char(c))?;
    }
    Ok(Effect::None)
}

fn set_delay(_ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let ms = parse_millis_lenient(cmd.param(0));
    debug!(target: "uiscript::dispatch", ms, "Typing delay changed");
    Ok(Effect::TypingDelay(Duration::from_millis(ms)))
}

/// `SendModKey MOD KEY` and `SendMultiModKey MOD.. KEY`.
fn send_mod_key(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let (modifiers, key) = keys::parse_combo(cmd.params().iter())?;
    info!(target: "uiscript::dispatch", %modifiers, %key, "Sending modified key");
    ctx.backend_mut().send_key_with_modifiers(modifiers, key)?;
    Ok(Effect::None)
}

// Elements

fn slot_query(cmd: &Command) -> ElementQuery {
    ElementQuery::from_slots(cmd.param(0), cmd.param(1), cmd.param(2))
}

#[derive(Clone, Copy)]
enum ClickKind {
    Left,
    Right,
    Double,
}

fn click_element_with(
    ctx: &mut ExecutionContext,
    query: &ElementQuery,
    kind: ClickKind,
) -> Result<()> {
    let element = locator::locate(ctx, query)?;
    if matches!(kind, ClickKind::Left) && element.is_offscreen() {
        return Err(EngineError::Backend(format!("Element with {query} is offscreen")));
    }
    let (x, y) = element
        .bounds()
        .ok_or_else(|| EngineError::Backend(format!("Element with {query} has no bounds")))?
        .center();
    drop(element);

    trace!(target: "uiscript::dispatch", x, y, "Clicking element centre");
    let backend = ctx.backend_mut();
    match kind {
        ClickKind::Left => backend.click(x, y)?,
        ClickKind::Right => backend.right_click(x, y)?,
        ClickKind::Double => backend.double_click(x, y)?,
    }
    let settle = ctx.click_settle();
    if !settle.is_zero() {
        thread::sleep(settle);
    }
    Ok(())
}

fn click_element(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    click_element_with(ctx, &slot_query(cmd), ClickKind::Left)?;
    Ok(Effect::None)
}

fn right_click_element(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    click_element_with(ctx, &slot_query(cmd), ClickKind::Right)?;
    Ok(Effect::None)
}

fn double_click_element(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    click_element_with(ctx, &slot_query(cmd), ClickKind::Double)?;
    Ok(Effect::None)
}

/// Open a menu by its name, wait for it to drop down, then click the item.
fn click_menu_item(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let (menu, item) = (cmd.param(0), cmd.param(1));
    info!(target: "uiscript::dispatch", %menu, %item, "Clicking menu item");
    click_element_with(ctx, &ElementQuery::by_name(menu), ClickKind::Left)?;
    let open = ctx.menu_open();
    if !open.is_zero() {
        thread::sleep(open);
    }
    click_element_with(ctx, &ElementQuery::by_name(item), ClickKind::Left)?;
    Ok(Effect::None)
}

fn wait_for_element(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let query = slot_query(cmd);
    let timeout = Duration::from_millis(parse_millis_lenient(cmd.param(3)));
    locator::wait_for_element(ctx, &query, timeout)?;
    Ok(Effect::None)
}

fn is_element_enabled(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let enabled = locator::locate(ctx, &slot_query(cmd))?.is_enabled();
    ctx.vars_mut().set_flag(ENABLED_RESULT, enabled)?;
    Ok(Effect::None)
}

fn contains_element_text(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let text = locator::locate(ctx, &slot_query(cmd))?
        .text()
        .ok_or_else(|| EngineError::Backend("Could not get element text".into()))?;
    let needle = substitute(cmd.param(3), ctx.vars())?.into_owned();
    let contains = text.contains(needle.as_str());
    info!(
        target: "uiscript::dispatch",
        %text, %needle, contains,
        "Checked element text"
    );
    ctx.vars_mut().set_flag(CONTAINS_RESULT, contains)?;
    Ok(Effect::None)
}

// Variables and conditions

fn set_variable(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    ctx.vars_mut().set(cmd.param(0), cmd.param(1))?;
    Ok(Effect::None)
}

/// Records the outcome in `_IF_CONDITION`; following commands run regardless.
fn if_condition(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let text = cmd.params().iter().collect::<Vec<_>>().join(" ");
    let met = condition::evaluate(ctx, &text);
    info!(target: "uiscript::dispatch", condition = %text, met, "Evaluated condition");
    ctx.vars_mut().set_flag(IF_CONDITION, met)?;
    Ok(Effect::None)
}

fn end_if(ctx: &mut ExecutionContext, _cmd: &Command) -> Result<Effect> {
    ctx.vars_mut().set_flag(IF_CONDITION, true)?;
    Ok(Effect::None)
}

fn sleep(_ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let ms = parse_millis_lenient(cmd.param(0));
    info!(target: "uiscript::dispatch", ms, "Sleeping");
    thread::sleep(Duration::from_millis(ms));
    Ok(Effect::None)
}

// HTML log

fn start_log(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    let log = HtmlLog::start(ctx.log_dir(), cmd.param(0))?;
    info!(target: "uiscript::dispatch", path = %log.path().display(), "Started HTML log");
    if let Some(previous) = ctx.replace_log(Some(log)) {
        warn!(
            target: "uiscript::dispatch",
            path = %previous.path().display(),
            "Closing log left open by an earlier StartLog"
        );
        previous.end()?;
    }
    Ok(Effect::None)
}

fn write_log(ctx: &mut ExecutionContext, cmd: &Command, level: LogLevel) -> Result<Effect> {
    match ctx.log_mut() {
        Some(log) => log.write(level, cmd.param(0))?,
        None => {
            debug!(target: "uiscript::dispatch", "No log open, message only traced");
            htmllog::mirror(level, cmd.param(0));
        }
    }
    Ok(Effect::None)
}

fn log_normal(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    write_log(ctx, cmd, LogLevel::Normal)
}

fn log_warning(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    write_log(ctx, cmd, LogLevel::Warning)
}

fn log_error(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    write_log(ctx, cmd, LogLevel::Error)
}

fn log_header(ctx: &mut ExecutionContext, cmd: &Command) -> Result<Effect> {
    write_log(ctx, cmd, LogLevel::Header)
}

fn end_log(ctx: &mut ExecutionContext, _cmd: &Command) -> Result<Effect> {
    if let Some(log) = ctx.replace_log(None) {
        let path = log.end()?;
        info!(target: "uiscript::dispatch", path = %path.display(), "Closed HTML log");
    }
    Ok(Effect::None)
}
