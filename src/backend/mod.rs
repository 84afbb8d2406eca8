//! Automation backends.
//!
//! The interpreter core only talks to the narrow [`AutomationBackend`] trait:
//! process attachment, element lookup, and pointer/keyboard injection.
//!
//! Submodules:
//! - `input`: Enigo-based pointer/keyboard injection (dry-run aware).
//! - `process`: process enumeration via `sysinfo`.
//! - `headless`: backend without an accessibility tree (non-Windows hosts).
//! - `windows`: Microsoft UI Automation backend (Windows only).

use std::fmt;

use anyhow::Result as AnyResult;
use tracing::debug;

use crate::config::Settings;
use crate::error::Result;
use crate::executor::locator::ElementQuery;

pub mod headless;
pub mod input;
pub mod process;
#[cfg(windows)]
pub mod windows;

#[cfg(test)]
pub(crate) mod fake;

pub use headless::HeadlessBackend;
pub use input::InputInjector;

/// Backend-assigned identifier of an attached top-level window.
pub type WindowId = u64;

/// The process/window pair commands operate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub pid: u32,
    pub window: WindowId,
}

/// Holds the native handle of the one attached window.
///
/// Each attachment gets a fresh [`WindowId`] and releases the previous handle,
/// so targets from earlier attachments stop resolving.
#[derive(Debug)]
pub struct AttachedWindow<W> {
    current: Option<(WindowId, W)>,
    next_id: WindowId,
}

impl<W> Default for AttachedWindow<W> {
    fn default() -> Self {
        Self {
            current: None,
            next_id: 1,
        }
    }
}

impl<W> AttachedWindow<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `window` as the attached one and return its id.
    pub fn replace(&mut self, window: W) -> WindowId {
        let id = self.next_id;
        self.next_id += 1;
        self.current = Some((id, window));
        id
    }

    pub fn get(&self, id: WindowId) -> Option<&W> {
        match &self.current {
            Some((current, window)) if *current == id => Some(window),
            _ => None,
        }
    }
}

/// Screen rectangle in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (
            ((i64::from(self.left) + i64::from(self.right)) / 2) as i32,
            ((i64::from(self.top) + i64::from(self.bottom)) / 2) as i32,
        )
    }
}

/// A key that can be injected on its own or combined with modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Tab,
    Enter,
    Escape,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    /// Function key `F1`..`F12`.
    F(u8),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Tab => f.write_str("TAB"),
            Key::Enter => f.write_str("ENTER"),
            Key::Escape => f.write_str("ESC"),
            Key::Delete => f.write_str("DELETE"),
            Key::Home => f.write_str("HOME"),
            Key::End => f.write_str("END"),
            Key::PageUp => f.write_str("PAGEUP"),
            Key::PageDown => f.write_str("PAGEDOWN"),
            Key::F(n) => write!(f, "F{n}"),
        }
    }
}

/// Set of held modifier keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(1);
    pub const ALT: Modifiers = Modifiers(2);
    pub const SHIFT: Modifiers = Modifiers(4);
    pub const WIN: Modifiers = Modifiers(8);

    /// Press order; release happens in reverse.
    pub const ORDER: [Modifiers; 4] = [Self::CTRL, Self::ALT, Self::SHIFT, Self::WIN];

    pub fn contains(self, other: Modifiers) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Held modifiers in press order.
    pub fn iter(self) -> impl DoubleEndedIterator<Item = Modifiers> {
        Self::ORDER.into_iter().filter(move |m| self.contains(*m))
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .iter()
            .map(|m| match m {
                Modifiers::CTRL => "CTRL",
                Modifiers::ALT => "ALT",
                Modifiers::SHIFT => "SHIFT",
                _ => "WIN",
            })
            .collect();
        if names.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&names.join("+"))
        }
    }
}

/// A resolved UI element. Dropping the handle releases it.
pub trait UiElement {
    /// Bounding rectangle on screen, if the element reports one.
    fn bounds(&self) -> Option<Rect>;
    /// Display text: the element name, falling back to its value text.
    fn text(&self) -> Option<String>;
    fn is_enabled(&self) -> bool;
    fn is_offscreen(&self) -> bool;
}

/// Everything the interpreter needs from the operating system.
pub trait AutomationBackend {
    /// Attach to the first running process whose executable name matches.
    fn attach_by_name(&mut self, name: &str) -> Result<Target>;
    /// Attach to a running process by id.
    fn attach_by_pid(&mut self, pid: u32) -> Result<Target>;
    /// Restore and focus the attached window. Returns `false` on failure.
    fn bring_to_front(&mut self, target: &Target) -> bool;
    /// First element in the target window's descendant subtree matching `query`.
    fn find_element(&mut self, target: &Target, query: &ElementQuery)
    -> Option<Box<dyn UiElement>>;

    fn click(&mut self, x: i32, y: i32) -> Result<()>;
    fn right_click(&mut self, x: i32, y: i32) -> Result<()>;
    fn double_click(&mut self, x: i32, y: i32) -> Result<()>;
    fn send_key(&mut self, key: Key) -> Result<()>;
    fn send_key_with_modifiers(&mut self, modifiers: Modifiers, key: Key) -> Result<()>;
}

/// Pick the backend for this host.
///
/// - Windows: UI Automation, with input only logged in dry-run mode.
/// - Elsewhere: the headless backend (real process lookup, no element tree).
pub fn native(settings: &Settings) -> AnyResult<Box<dyn AutomationBackend>> {
    debug!(target: "uiscript::backend", dry_run = settings.dry_run, "Selecting backend");
    host_backend(InputInjector::from_settings(settings))
}

#[cfg(windows)]
fn host_backend(input: InputInjector) -> AnyResult<Box<dyn AutomationBackend>> {
    Ok(Box::new(windows::UiaBackend::new(input)?))
}

#[cfg(not(windows))]
fn host_backend(input: InputInjector) -> AnyResult<Box<dyn AutomationBackend>> {
    Ok(Box::new(HeadlessBackend::new(input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_center() {
        assert_eq!(Rect::new(10, 20, 110, 60).center(), (60, 40));
        assert_eq!(Rect::new(0, 0, 1, 1).center(), (0, 0));
    }

    #[test]
    fn modifiers_iterate_in_press_order() {
        let mods = Modifiers::SHIFT | Modifiers::CTRL | Modifiers::WIN;
        let order: Vec<_> = mods.iter().collect();
        assert_eq!(order, vec![Modifiers::CTRL, Modifiers::SHIFT, Modifiers::WIN]);
        assert_eq!(mods.to_string(), "CTRL+SHIFT+WIN");
        assert!(!mods.contains(Modifiers::ALT));
        assert!(Modifiers::NONE.is_empty());
    }

    #[test]
    fn attaching_again_releases_the_previous_window() {
        let mut slot = AttachedWindow::new();
        let first = slot.replace("notepad");
        assert_eq!(slot.get(first), Some(&"notepad"));

        let second = slot.replace("calc");
        assert_ne!(first, second);
        assert_eq!(slot.get(first), None);
        assert_eq!(slot.get(second), Some(&"calc"));
    }

    #[test]
    fn key_display_matches_script_names() {
        assert_eq!(Key::Enter.to_string(), "ENTER");
        assert_eq!(Key::F(5).to_string(), "F5");
        assert_eq!(Key::Char('a').to_string(), "a");
    }
}
