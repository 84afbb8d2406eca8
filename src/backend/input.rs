use std::thread;
use std::time::Duration;

use enigo::Keyboard as _;
use enigo::Mouse as _;
use enigo::{Button as EButton, Coordinate, Direction, Enigo, Key as EKey, Settings as EnigoSettings};
use tracing::{info, trace};

use super::{Key, Modifiers};
use crate::config::Settings;
use crate::error::{EngineError, Result};

/// Mouse button used by a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Injects pointer and keyboard events with optional dry-run mode.
/// In dry-run mode, events are only logged and no real input is simulated.
pub struct InputInjector {
    dry_run: bool,
    key_press: Duration,
    enigo: Option<Enigo>,
}

impl InputInjector {
    /// Create a new injector.
    /// - dry_run: when true, only logs instead of simulating real input.
    /// - key_press: pause between press and release of a button or key.
    pub fn new(dry_run: bool, key_press: Duration) -> Self {
        Self {
            dry_run,
            key_press,
            enigo: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.dry_run, Duration::from_millis(settings.key_press_ms))
    }

    /// Returns whether the injector is currently in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Move to absolute screen coordinates and click once.
    pub fn click(&mut self, button: MouseButton, x: i32, y: i32) -> Result<()> {
        if self.dry_run {
            info!(target: "uiscript::input", ?button, x, y, "DRY-RUN click");
            return Ok(());
        }
        trace!(target: "uiscript::input", ?button, x, y, "click");
        let pause = self.key_press;
        let enigo = self.ensure_enigo()?;
        enigo.move_mouse(x, y, Coordinate::Abs).map_err(input_err)?;
        let btn = map_button(button);
        enigo.button(btn, Direction::Press).map_err(input_err)?;
        thread::sleep(pause);
        enigo.button(btn, Direction::Release).map_err(input_err)?;
        Ok(())
    }

    /// Move to absolute screen coordinates and left-click twice.
    pub fn double_click(&mut self, x: i32, y: i32) -> Result<()> {
        if self.dry_run {
            info!(target: "uiscript::input", x, y, "DRY-RUN double_click");
            return Ok(());
        }
        trace!(target: "uiscript::input", x, y, "double_click");
        let pause = self.key_press;
        let enigo = self.ensure_enigo()?;
        enigo.move_mouse(x, y, Coordinate::Abs).map_err(input_err)?;
        enigo.button(EButton::Left, Direction::Click).map_err(input_err)?;
        thread::sleep(pause);
        enigo.button(EButton::Left, Direction::Click).map_err(input_err)?;
        Ok(())
    }

    /// Press and release a single key.
    pub fn key(&mut self, key: Key) -> Result<()> {
        self.key_combo(Modifiers::NONE, key)
    }

    /// Hold `modifiers` (CTRL, ALT, SHIFT, WIN order), tap `key`, release in reverse.
    pub fn key_combo(&mut self, modifiers: Modifiers, key: Key) -> Result<()> {
        if self.dry_run {
            info!(target: "uiscript::input", %modifiers, %key, "DRY-RUN key");
            return Ok(());
        }
        trace!(target: "uiscript::input", %modifiers, %key, "key");
        let pause = self.key_press;
        let enigo = self.ensure_enigo()?;

        for m in modifiers.iter() {
            enigo.key(map_modifier(m), Direction::Press).map_err(input_err)?;
        }
        let ekey = map_key(key);
        enigo.key(ekey, Direction::Press).map_err(input_err)?;
        thread::sleep(pause);
        enigo.key(ekey, Direction::Release).map_err(input_err)?;
        for m in modifiers.iter().rev() {
            enigo.key(map_modifier(m), Direction::Release).map_err(input_err)?;
        }
        Ok(())
    }

    fn ensure_enigo(&mut self) -> Result<&mut Enigo> {
        let enigo = match self.enigo.take() {
            Some(enigo) => enigo,
            None => {
                trace!(target: "uiscript::input", "Initializing Enigo");
                Enigo::new(&EnigoSettings::default()).map_err(|e| {
                    EngineError::Backend(format!("Failed to initialize input driver: {e}"))
                })?
            }
        };
        Ok(self.enigo.insert(enigo))
    }
}

fn input_err(e: enigo::InputError) -> EngineError {
    EngineError::Backend(format!("Input injection failed: {e}"))
}

fn map_button(btn: MouseButton) -> EButton {
    match btn {
        MouseButton::Left => EButton::Left,
        MouseButton::Right => EButton::Right,
    }
}

fn map_modifier(m: Modifiers) -> EKey {
    match m {
        Modifiers::CTRL => EKey::Control,
        Modifiers::ALT => EKey::Alt,
        Modifiers::SHIFT => EKey::Shift,
        _ => EKey::Meta,
    }
}

fn map_key(key: Key) -> EKey {
    match key {
        Key::Char(c) => EKey::Unicode(c),
        Key::Tab => EKey::Tab,
        Key::Enter => EKey::Return,
        Key::Escape => EKey::Escape,
        Key::Delete => EKey::Delete,
        Key::Home => EKey::Home,
        Key::End => EKey::End,
        Key::PageUp => EKey::PageUp,
        Key::PageDown => EKey::PageDown,
        Key::F(n) => match n {
            1 => EKey::F1,
            2 => EKey::F2,
            3 => EKey::F3,
            4 => EKey::F4,
            5 => EKey::F5,
            6 => EKey::F6,
            7 => EKey::F7,
            8 => EKey::F8,
            9 => EKey::F9,
            10 => EKey::F10,
            11 => EKey::F11,
            _ => EKey::F12,
        },
    }
}
