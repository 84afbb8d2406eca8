//! Element queries and lookup against the attached window.
//!
//! An [`ElementQuery`] is a conjunction of up to four equality constraints.
//! Backends turn [`ElementQuery::predicates`] into their native conditions and
//! AND them together; an empty predicate list means "first descendant".

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::context::ExecutionContext;
use crate::backend::UiElement;
use crate::error::{EngineError, Result};
use crate::utils::interpolation::parse_i32_lenient;

/// Script spelling for "no constraint" in a string slot.
pub const NULL_SLOT: &str = "null";

/// Control-type constraint. `Any` is the `-1` sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlTypeFilter {
    #[default]
    Any,
    Is(i32),
}

impl ControlTypeFilter {
    /// Read a control-type slot: `-1`, `any` and `null` mean unconstrained,
    /// anything else is read as a (leniently parsed) integer id.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") || s == NULL_SLOT {
            return Self::Any;
        }
        Self::from_id(parse_i32_lenient(s))
    }

    pub fn from_id(id: i32) -> Self {
        if id == -1 { Self::Any } else { Self::Is(id) }
    }
}

/// One equality constraint of an element query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyPredicate {
    AutomationId(String),
    ClassName(String),
    ControlType(i32),
    Name(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementQuery {
    automation_id: Option<String>,
    class_name: Option<String>,
    control_type: ControlTypeFilter,
    name: Option<String>,
}

impl ElementQuery {
    /// The unconstrained query.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_automation_id(id: &str) -> Self {
        Self::new().with_automation_id(id)
    }

    /// Match on the element's display name, as used for menus.
    pub fn by_name(name: &str) -> Self {
        Self::new().with_name(name)
    }

    /// Build from the three script slots (automation-id, class-name, control-type).
    /// The literal `null` in a string slot leaves that constraint out.
    pub fn from_slots(automation_id: &str, class_name: &str, control_type: &str) -> Self {
        let mut q = Self::new().with_control_type(ControlTypeFilter::parse(control_type));
        if automation_id != NULL_SLOT {
            q = q.with_automation_id(automation_id);
        }
        if class_name != NULL_SLOT {
            q = q.with_class_name(class_name);
        }
        q
    }

    pub fn with_automation_id(mut self, id: &str) -> Self {
        self.automation_id = Some(id.to_string());
        self
    }

    pub fn with_class_name(mut self, class: &str) -> Self {
        self.class_name = Some(class.to_string());
        self
    }

    pub fn with_control_type(mut self, control_type: ControlTypeFilter) -> Self {
        self.control_type = control_type;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn automation_id(&self) -> Option<&str> {
        self.automation_id.as_deref()
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn control_type(&self) -> ControlTypeFilter {
        self.control_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Present constraints in a fixed order: automation-id, class-name,
    /// control-type, name.
    pub fn predicates(&self) -> Vec<PropertyPredicate> {
        let mut preds = Vec::with_capacity(4);
        if let Some(id) = &self.automation_id {
            preds.push(PropertyPredicate::AutomationId(id.clone()));
        }
        if let Some(class) = &self.class_name {
            preds.push(PropertyPredicate::ClassName(class.clone()));
        }
        if let ControlTypeFilter::Is(ct) = self.control_type {
            preds.push(PropertyPredicate::ControlType(ct));
        }
        if let Some(name) = &self.name {
            preds.push(PropertyPredicate::Name(name.clone()));
        }
        preds
    }

    pub fn is_unconstrained(&self) -> bool {
        self.predicates().is_empty()
    }

    /// Evaluate the conjunction against plain property values.
    pub fn matches(
        &self,
        automation_id: &str,
        class_name: &str,
        control_type: i32,
        name: &str,
    ) -> bool {
        self.predicates().iter().all(|p| match p {
            PropertyPredicate::AutomationId(id) => id == automation_id,
            PropertyPredicate::ClassName(class) => class == class_name,
            PropertyPredicate::ControlType(ct) => *ct == control_type,
            PropertyPredicate::Name(n) => n == name,
        })
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .predicates()
            .iter()
            .map(|p| match p {
                PropertyPredicate::AutomationId(id) => format!("automation id '{id}'"),
                PropertyPredicate::ClassName(class) => format!("class '{class}'"),
                PropertyPredicate::ControlType(ct) => format!("control type {ct}"),
                PropertyPredicate::Name(name) => format!("name '{name}'"),
            })
            .collect();
        if parts.is_empty() {
            f.write_str("no constraints")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Resolve `query` in the attached window's descendant subtree.
///
/// Fails with `NoWindowAttached` before touching the backend when nothing is
/// attached. Among several matches the backend's traversal order decides.
pub fn locate(ctx: &mut ExecutionContext, query: &ElementQuery) -> Result<Box<dyn UiElement>> {
    let target = ctx.attachment().ok_or(EngineError::NoWindowAttached)?;
    trace!(target: "uiscript::locator", pid = target.pid, %query, "Looking for element");
    match ctx.backend_mut().find_element(&target, query) {
        Some(element) => {
            debug!(target: "uiscript::locator", %query, "Element found");
            Ok(element)
        }
        None => {
            debug!(target: "uiscript::locator", %query, "Element not found");
            Err(EngineError::ElementNotFound(query.to_string()))
        }
    }
}

/// Poll [`locate`] at the context's poll interval until it succeeds or
/// `timeout` elapses. Always tries at least once.
pub fn wait_for_element(
    ctx: &mut ExecutionContext,
    query: &ElementQuery,
    timeout: Duration,
) -> Result<Box<dyn UiElement>> {
    let started = Instant::now();
    let interval = ctx.poll_interval();
    loop {
        match locate(ctx, query) {
            Ok(element) => return Ok(element),
            Err(EngineError::ElementNotFound(_)) => {}
            Err(other) => return Err(other),
        }
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            return Err(EngineError::Timeout {
                query: query.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }
        thread::sleep(interval.min(timeout - elapsed));
    }
}
