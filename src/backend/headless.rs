//! Backend for hosts without an accessibility tree.
//!
//! Process attachment uses real process enumeration, so a script still halts
//! when the process it names is not running. The attached process gets a
//! synthetic window id; element queries never resolve. Input goes through
//! [`InputInjector`], which only logs in dry-run mode.

use tracing::{debug, info};

use super::input::MouseButton;
use super::{AutomationBackend, InputInjector, Key, Modifiers, Target, UiElement, WindowId, process};
use crate::error::{EngineError, Result};
use crate::executor::locator::ElementQuery;

pub struct HeadlessBackend {
    input: InputInjector,
}

impl HeadlessBackend {
    pub fn new(input: InputInjector) -> Self {
        Self { input }
    }

    fn target_for(pid: u32) -> Target {
        Target {
            pid,
            window: WindowId::from(pid),
        }
    }
}

impl AutomationBackend for HeadlessBackend {
    fn attach_by_name(&mut self, name: &str) -> Result<Target> {
        let pid = process::find_pid_by_name(name)
            .ok_or_else(|| EngineError::Attach(format!("Process '{name}' not found")))?;
        info!(target: "uiscript::backend", %name, pid, "Attached to process");
        Ok(Self::target_for(pid))
    }

    fn attach_by_pid(&mut self, pid: u32) -> Result<Target> {
        if !process::is_process_running(pid) {
            return Err(EngineError::Attach(format!("Process ID {pid} not found")));
        }
        info!(target: "uiscript::backend", pid, "Attached to process");
        Ok(Self::target_for(pid))
    }

    fn bring_to_front(&mut self, target: &Target) -> bool {
        info!(target: "uiscript::backend", pid = target.pid, "bring_to_front (no window manager access)");
        true
    }

    fn find_element(
        &mut self,
        target: &Target,
        query: &ElementQuery,
    ) -> Option<Box<dyn UiElement>> {
        debug!(
            target: "uiscript::backend",
            pid = target.pid, %query,
            "No accessibility tree available; element not found"
        );
        None
    }

    fn click(&mut self, x: i32, y: i32) -> Result<()> {
        self.input.click(MouseButton::Left, x, y)
    }

    fn right_click(&mut self, x: i32, y: i32) -> Result<()> {
        self.input.click(MouseButton::Right, x, y)
    }

    fn double_click(&mut self, x: i32, y: i32) -> Result<()> {
        self.input.double_click(x, y)
    }

    fn send_key(&mut self, key: Key) -> Result<()> {
        self.input.key(key)
    }

    fn send_key_with_modifiers(&mut self, modifiers: Modifiers, key: Key) -> Result<()> {
        self.input.key_combo(modifiers, key)
    }
}
