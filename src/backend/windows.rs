//! Microsoft UI Automation backend.
//!
//! Attachment resolves a process to its main top-level window and keeps that
//! window's automation element in an [`AttachedWindow`] slot. Element
//! lookups search the window's whole descendant subtree with an AND of
//! property conditions. Pointer and keyboard input go through
//! [`InputInjector`], so dry-run still resolves elements but injects nothing.

use anyhow::Context as _;
use tracing::{debug, info, warn};
use uiautomation::core::UICondition;
use uiautomation::patterns;
use uiautomation::types::{TreeScope, UIProperty, WindowVisualState};
use uiautomation::variants::Variant;
use uiautomation::{UIAutomation, UIElement};

use super::input::MouseButton;
use super::{
    AttachedWindow, AutomationBackend, InputInjector, Key, Modifiers, Rect, Target, UiElement,
    process,
};
use crate::error::{EngineError, Result};
use crate::executor::locator::{ElementQuery, PropertyPredicate};

pub struct UiaBackend {
    automation: UIAutomation,
    window: AttachedWindow<UIElement>,
    input: InputInjector,
}

impl UiaBackend {
    pub fn new(input: InputInjector) -> anyhow::Result<Self> {
        let automation = UIAutomation::new()
            .context("Failed to create UI Automation instance (try running as administrator)")?;
        debug!(target: "uiscript::backend", "UI Automation initialized");
        Ok(Self {
            automation,
            window: AttachedWindow::new(),
            input,
        })
    }

    /// Main window of `pid`: a top-level desktop child owned by the process,
    /// preferring a titled, on-screen one.
    fn main_window(&self, pid: u32) -> Result<UIElement> {
        let root = self.automation.get_root_element().map_err(uia_err)?;
        let pid_i32 = i32::try_from(pid)
            .map_err(|_| EngineError::Attach(format!("Process ID {pid} out of range")))?;
        let condition = self
            .automation
            .create_property_condition(UIProperty::ProcessId, Variant::from(pid_i32), None)
            .map_err(uia_err)?;
        let candidates = root
            .find_all(TreeScope::Children, &condition)
            .unwrap_or_default();

        let mut fallback = None;
        for window in candidates {
            let titled = window.get_name().map(|n| !n.is_empty()).unwrap_or(false);
            let visible = !window.is_offscreen().unwrap_or(true);
            if titled && visible {
                return Ok(window);
            }
            if fallback.is_none() {
                fallback = Some(window);
            }
        }
        fallback.ok_or_else(|| {
            EngineError::Attach(format!("Could not find main window for process ID {pid}"))
        })
    }

    fn register(&mut self, pid: u32, window: UIElement) -> Target {
        Target {
            pid,
            window: self.window.replace(window),
        }
    }

    fn condition_for(&self, query: &ElementQuery) -> Result<UICondition> {
        let mut combined: Option<UICondition> = None;
        for predicate in query.predicates() {
            let cond = match predicate {
                PropertyPredicate::AutomationId(id) => self.automation.create_property_condition(
                    UIProperty::AutomationId,
                    Variant::from(id.as_str()),
                    None,
                ),
                PropertyPredicate::ClassName(class) => self.automation.create_property_condition(
                    UIProperty::ClassName,
                    Variant::from(class.as_str()),
                    None,
                ),
                PropertyPredicate::ControlType(ct) => self.automation.create_property_condition(
                    UIProperty::ControlType,
                    Variant::from(ct),
                    None,
                ),
                PropertyPredicate::Name(name) => self.automation.create_property_condition(
                    UIProperty::Name,
                    Variant::from(name.as_str()),
                    None,
                ),
            }
            .map_err(uia_err)?;
            combined = Some(match combined {
                Some(prev) => self
                    .automation
                    .create_and_condition(prev, cond)
                    .map_err(uia_err)?,
                None => cond,
            });
        }
        match combined {
            Some(cond) => Ok(cond),
            None => self.automation.create_true_condition().map_err(uia_err),
        }
    }
}

impl AutomationBackend for UiaBackend {
    fn attach_by_name(&mut self, name: &str) -> Result<Target> {
        let pid = process::find_pid_by_name(name)
            .ok_or_else(|| EngineError::Attach(format!("Process '{name}' not found")))?;
        let window = self.main_window(pid)?;
        info!(
            target: "uiscript::backend",
            %name, pid,
            title = %window.get_name().unwrap_or_default(),
            "Attached to process window"
        );
        Ok(self.register(pid, window))
    }

    fn attach_by_pid(&mut self, pid: u32) -> Result<Target> {
        if !process::is_process_running(pid) {
            return Err(EngineError::Attach(format!("Process ID {pid} not found")));
        }
        let window = self.main_window(pid)?;
        info!(target: "uiscript::backend", pid, "Attached to process window");
        Ok(self.register(pid, window))
    }

    fn bring_to_front(&mut self, target: &Target) -> bool {
        let Some(window) = self.window.get(target.window) else {
            return false;
        };
        if let Ok(pattern) = window.get_pattern::<patterns::UIWindowPattern>() {
            if matches!(
                pattern.get_window_visual_state(),
                Ok(WindowVisualState::Minimized)
            ) {
                if let Err(e) = pattern.set_window_visual_state(WindowVisualState::Normal) {
                    warn!(target: "uiscript::backend", error = %e, "Failed to restore window");
                }
            }
        }
        match window.set_focus() {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "uiscript::backend", error = %e, "Failed to focus window");
                false
            }
        }
    }

    fn find_element(
        &mut self,
        target: &Target,
        query: &ElementQuery,
    ) -> Option<Box<dyn UiElement>> {
        let window = self.window.get(target.window)?;
        let condition = match self.condition_for(query) {
            Ok(cond) => cond,
            Err(e) => {
                warn!(target: "uiscript::backend", error = %e, "Failed to build element condition");
                return None;
            }
        };
        window
            .find_first(TreeScope::Descendants, &condition)
            .ok()
            .map(|element| Box::new(WindowsElement { element }) as Box<dyn UiElement>)
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

/// A resolved automation element; released when dropped.
struct WindowsElement {
    element: UIElement,
}

impl UiElement for WindowsElement {
    fn bounds(&self) -> Option<Rect> {
        let r = self.element.get_bounding_rectangle().ok()?;
        Some(Rect::new(r.get_left(), r.get_top(), r.get_right(), r.get_bottom()))
    }

    fn text(&self) -> Option<String> {
        match self.element.get_name() {
            Ok(name) if !name.is_empty() => Some(name),
            _ => self
                .element
                .get_pattern::<patterns::UIValuePattern>()
                .and_then(|p| p.get_value())
                .ok(),
        }
    }

    fn is_enabled(&self) -> bool {
        self.element.is_enabled().unwrap_or(false)
    }

    fn is_offscreen(&self) -> bool {
        self.element.is_offscreen().unwrap_or(false)
    }
}

fn uia_err(e: uiautomation::Error) -> EngineError {
    EngineError::Backend(format!("UI Automation call failed: {e}"))
}
