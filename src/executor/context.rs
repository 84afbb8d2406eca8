use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::{AutomationBackend, Target};
use crate::config::Settings;
use crate::htmllog::HtmlLog;

use super::dispatch::Effect;
use super::variables::VariableStore;

/// Mutable state shared by every command of one run.
///
/// Attachment and typing delay only change through [`Effect`]s applied by the
/// runtime; handlers own the variables and the log slot.
pub struct ExecutionContext {
    backend: Box<dyn AutomationBackend>,
    attachment: Option<Target>,
    vars: VariableStore,
    typing_delay: Duration,
    last_error: Option<String>,
    log: Option<HtmlLog>,
    log_dir: PathBuf,
    click_settle: Duration,
    menu_open: Duration,
    poll_interval: Duration,
}

impl ExecutionContext {
    pub fn new(backend: Box<dyn AutomationBackend>, settings: &Settings) -> Self {
        Self {
            backend,
            attachment: None,
            vars: VariableStore::new(),
            typing_delay: Duration::from_millis(settings.typing_delay_ms),
            last_error: None,
            log: None,
            log_dir: PathBuf::from(&settings.log_dir),
            click_settle: Duration::from_millis(settings.click_settle_ms),
            menu_open: Duration::from_millis(settings.menu_open_ms),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        }
    }

    /// Currently attached process/window, if any.
    pub fn attachment(&self) -> Option<Target> {
        self.attachment
    }

    pub(crate) fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Attached(target) => self.attachment = Some(target),
            Effect::TypingDelay(delay) => self.typing_delay = delay,
        }
    }

    pub fn vars(&self) -> &VariableStore {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut VariableStore {
        &mut self.vars
    }

    pub fn typing_delay(&self) -> Duration {
        self.typing_delay
    }

    /// Message of the most recent failure. Overwritten on every failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn set_last_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub fn backend_mut(&mut self) -> &mut dyn AutomationBackend {
        self.backend.as_mut()
    }

    pub fn log(&self) -> Option<&HtmlLog> {
        self.log.as_ref()
    }

    pub(crate) fn log_mut(&mut self) -> Option<&mut HtmlLog> {
        self.log.as_mut()
    }

    /// Replace the open log, handing back the previous one.
    pub(crate) fn replace_log(&mut self, log: Option<HtmlLog>) -> Option<HtmlLog> {
        std::mem::replace(&mut self.log, log)
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn click_settle(&self) -> Duration {
        self.click_settle
    }

    pub fn menu_open(&self) -> Duration {
        self.menu_open
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
