use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// Runtime settings for the interpreter.
///
/// Read from an optional JSON file (see `loader`), then overridden by
/// environment variables. The script itself is not part of the settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Log input events instead of injecting them.
    pub dry_run: bool,

    /// Directory where `StartLog` creates HTML logs.
    pub log_dir: String,

    /// Diagnostic log level (trace|debug|info|warn|error). `RUST_LOG` wins when set.
    pub log_level: Option<String>,

    /// Initial delay between typed characters, in milliseconds.
    #[validate(maximum = 60_000)]
    pub typing_delay_ms: u64,

    /// Pause between press and release of a key or mouse button.
    #[validate(maximum = 1_000)]
    pub key_press_ms: u64,

    /// Pause after clicking an element, letting the UI settle.
    #[validate(maximum = 10_000)]
    pub click_settle_ms: u64,

    /// Pause between opening a menu and clicking one of its items.
    #[validate(maximum = 10_000)]
    pub menu_open_ms: u64,

    /// Poll interval used while waiting for an element.
    #[validate(minimum = 10)]
    #[validate(maximum = 5_000)]
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dry_run: false,
            log_dir: ".".to_string(),
            log_level: None,
            typing_delay_ms: 0,
            key_press_ms: 10,
            click_settle_ms: 100,
            menu_open_ms: 500,
            poll_interval_ms: 100,
        }
    }
}
