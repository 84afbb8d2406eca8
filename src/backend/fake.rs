//! In-memory backend for unit tests: a flat element list (in traversal
//! order), a process table and a recorder for injected input.

use std::cell::RefCell;
use std::rc::Rc;

use super::{AutomationBackend, Key, Modifiers, Rect, Target, UiElement, process};
use crate::error::{EngineError, Result};
use crate::executor::locator::ElementQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputEvent {
    Click(i32, i32),
    RightClick(i32, i32),
    DoubleClick(i32, i32),
    Key(Key),
    Combo(Modifiers, Key),
    BringToFront(u32),
}

#[derive(Debug, Clone)]
pub(crate) struct FakeElement {
    automation_id: String,
    class_name: String,
    control_type: i32,
    name: Option<String>,
    value: Option<String>,
    bounds: Option<Rect>,
    enabled: bool,
    offscreen: bool,
    visible_after: usize,
}

impl FakeElement {
    pub(crate) fn new(automation_id: &str, class_name: &str, control_type: i32) -> Self {
        Self {
            automation_id: automation_id.into(),
            class_name: class_name.into(),
            control_type,
            name: None,
            value: None,
            bounds: Some(Rect::new(0, 0, 100, 40)),
            enabled: true,
            offscreen: false,
            visible_after: 0,
        }
    }

    pub(crate) fn named(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn valued(mut self, value: &str) -> Self {
        self.value = Some(value.into());
        self
    }

    pub(crate) fn bounded(mut self, rect: Rect) -> Self {
        self.bounds = Some(rect);
        self
    }

    pub(crate) fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub(crate) fn offscreen(mut self) -> Self {
        self.offscreen = true;
        self
    }

    /// Hide the element from the first `queries` lookups.
    pub(crate) fn visible_after(mut self, queries: usize) -> Self {
        self.visible_after = queries;
        self
    }
}

impl UiElement for FakeElement {
    fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn text(&self) -> Option<String> {
        match &self.name {
            Some(name) if !name.is_empty() => Some(name.clone()),
            _ => self.value.clone(),
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_offscreen(&self) -> bool {
        self.offscreen
    }
}

#[derive(Debug, Default)]
struct FakeState {
    processes: Vec<(String, u32)>,
    elements: Vec<FakeElement>,
    events: Vec<InputEvent>,
    queries: usize,
}

/// Cloning shares state, so a test can keep a handle after boxing the backend.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeBackend {
    state: Rc<RefCell<FakeState>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_process(self, name: &str, pid: u32) -> Self {
        self.state.borrow_mut().processes.push((name.into(), pid));
        self
    }

    pub(crate) fn with_element(self, element: FakeElement) -> Self {
        self.state.borrow_mut().elements.push(element);
        self
    }

    pub(crate) fn events(&self) -> Vec<InputEvent> {
        self.state.borrow().events.clone()
    }

    pub(crate) fn queries(&self) -> usize {
        self.state.borrow().queries
    }

    fn record(&self, event: InputEvent) {
        self.state.borrow_mut().events.push(event);
    }

    fn target_for(pid: u32) -> Target {
        Target {
            pid,
            window: u64::from(pid) + 1000,
        }
    }
}

impl AutomationBackend for FakeBackend {
    fn attach_by_name(&mut self, name: &str) -> Result<Target> {
        let state = self.state.borrow();
        state
            .processes
            .iter()
            .find(|(proc_name, _)| process::name_matches(proc_name, name))
            .map(|(_, pid)| Self::target_for(*pid))
            .ok_or_else(|| EngineError::Attach(format!("Process '{name}' not found")))
    }

    fn attach_by_pid(&mut self, pid: u32) -> Result<Target> {
        let state = self.state.borrow();
        if state.processes.iter().any(|(_, p)| *p == pid) {
            Ok(Self::target_for(pid))
        } else {
            Err(EngineError::Attach(format!("Process ID {pid} not found")))
        }
    }

    fn bring_to_front(&mut self, target: &Target) -> bool {
        self.record(InputEvent::BringToFront(target.pid));
        true
    }

    fn find_element(
        &mut self,
        _target: &Target,
        query: &ElementQuery,
    ) -> Option<Box<dyn UiElement>> {
        let mut state = self.state.borrow_mut();
        state.queries += 1;
        let seen = state.queries;
        state
            .elements
            .iter()
            .filter(|e| seen > e.visible_after)
            .find(|e| {
                query.matches(
                    &e.automation_id,
                    &e.class_name,
                    e.control_type,
                    e.name.as_deref().unwrap_or_default(),
                )
            })
            .map(|e| Box::new(e.clone()) as Box<dyn UiElement>)
    }

    fn click(&mut self, x: i32, y: i32) -> Result<()> {
        self.record(InputEvent::Click(x, y));
        Ok(())
    }

    fn right_click(&mut self, x: i32, y: i32) -> Result<()> {
        self.record(InputEvent::RightClick(x, y));
        Ok(())
    }

    fn double_click(&mut self, x: i32, y: i32) -> Result<()> {
        self.record(InputEvent::DoubleClick(x, y));
        Ok(())
    }

    fn send_key(&mut self, key: Key) -> Result<()> {
        self.record(InputEvent::Key(key));
        Ok(())
    }

    fn send_key_with_modifiers(&mut self, modifiers: Modifiers, key: Key) -> Result<()> {
        self.record(InputEvent::Combo(modifiers, key));
        Ok(())
    }
}
