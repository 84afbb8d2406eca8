use anyhow::{Context, Result, anyhow};
use schemars::{Schema, schema_for};
use serde_valid::Validate;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

use super::models::Settings;

/// Environment variable naming an optional JSON settings file.
pub const ENV_CONFIG: &str = "UISCRIPT_CONFIG";
/// Environment variable forcing dry-run (`1`, `true`, `yes`).
pub const ENV_DRY_RUN: &str = "UISCRIPT_DRY_RUN";
/// Environment variable overriding the HTML log directory.
pub const ENV_LOG_DIR: &str = "UISCRIPT_LOG_DIR";

/// Load settings from a string slice.
pub fn load_from_str(s: &str) -> Result<Settings> {
    let settings: Settings =
        serde_json::from_str(s).context("Failed to parse JSON settings string")?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Load settings from any reader (e.g., a file).
pub fn load_from_reader<R: Read>(reader: R) -> Result<Settings> {
    let settings: Settings =
        serde_json::from_reader(reader).context("Failed to parse JSON settings from reader")?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Load settings from a file path.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref)
        .with_context(|| format!("Failed to open settings file {}", path_ref.display()))?;
    let settings = load_from_reader(file)
        .with_context(|| format!("Invalid settings file {}", path_ref.display()))?;
    debug!("Loaded settings from {}", path_ref.display());
    Ok(settings)
}

/// Resolve settings from the process environment:
/// the file named by `UISCRIPT_CONFIG` (or defaults), then env overrides.
pub fn load_from_env() -> Result<Settings> {
    resolve(|key| std::env::var(key).ok())
}

/// Same as [`load_from_env`] with an injectable variable lookup.
pub fn resolve<F>(lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match lookup(ENV_CONFIG) {
        Some(path) if !path.trim().is_empty() => load_from_path(path.trim())?,
        _ => Settings::default(),
    };
    let settings = apply_env_overrides(base, &lookup);
    validate_settings(&settings)?;
    Ok(settings)
}

/// Apply `UISCRIPT_DRY_RUN` and `UISCRIPT_LOG_DIR` on top of `settings`.
pub fn apply_env_overrides<F>(mut settings: Settings, lookup: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(ENV_DRY_RUN) {
        settings.dry_run = matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes");
    }
    if let Some(dir) = lookup(ENV_LOG_DIR) {
        if !dir.trim().is_empty() {
            settings.log_dir = dir.trim().to_string();
        }
    }
    settings
}

/// Range checks declared on the model, plus a non-empty log directory.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    settings
        .validate()
        .map_err(|e| anyhow!("Invalid settings: {e}"))?;
    if settings.log_dir.trim().is_empty() {
        return Err(anyhow!("Invalid settings: log_dir must not be empty"));
    }
    Ok(())
}

/// Generate the JSON Schema for the settings model.
pub fn generate_schema() -> Schema {
    schema_for!(Settings)
}

/// Write the JSON Schema for the settings model to any writer (pretty-printed).
pub fn write_schema_to_writer<W: Write>(mut writer: W) -> Result<()> {
    let schema = generate_schema();
    let json = serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?;
    writer
        .write_all(json.as_bytes())
        .context("Failed to write schema to writer")?;
    Ok(())
}
