//! Configuration module for uiscript.
//!
//! This module wires together the settings model and its loading/validation
//! helpers. Import from here for a convenient, stable API.
//!
//! Example:
//! use uiscript::config::{Settings, load_from_env};
//!
//! let settings: Settings = load_from_env()?;

pub mod loader;
pub mod models;

pub use models::Settings;

pub use loader::{
    ENV_CONFIG, ENV_DRY_RUN, ENV_LOG_DIR, apply_env_overrides, generate_schema, load_from_env,
    load_from_path, load_from_reader, load_from_str, resolve, validate_settings,
    write_schema_to_writer,
};
