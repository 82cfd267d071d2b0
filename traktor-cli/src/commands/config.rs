//! Config command - manage configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;
use tracing::info;
use traktor_store::{Settings, SettingsStore, default_config_dir, default_settings_path};

use super::param_value;
use crate::output::{JsonFormatter, TextFormatter, format_seconds};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration (secrets masked).
    Show,

    /// Show configuration paths.
    Path,

    /// Set a value by dotted key, e.g. `trakt.client_id`.
    ///
    /// An empty value or `null` unsets optional keys.
    Set {
        /// Dotted settings key.
        key: String,
        /// New value.
        value: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Set { key, value } => set_value(key, value).await,
        ConfigAction::Reset => reset_config().await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let secret = |value: &Option<String>| value.as_deref().map_or_else(unset, mask);
            let plain = |value: &Option<String>| value.clone().unwrap_or_else(unset);

            println!("Traktor Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!(
                "{}",
                formatter.format_section(
                    "Trakt",
                    &[
                        ("client_id", plain(&settings.trakt.client_id)),
                        ("client_secret", secret(&settings.trakt.client_secret)),
                        ("endpoint", plain(&settings.trakt.endpoint)),
                        ("access_token", secret(&settings.trakt.access_token)),
                        ("vip", settings.trakt.vip.to_string()),
                    ],
                )
            );
            println!(
                "{}",
                formatter.format_section(
                    "TMDB",
                    &[
                        ("read_token", secret(&settings.tmdb.read_token)),
                        ("endpoint", plain(&settings.tmdb.endpoint)),
                        ("session_id", secret(&settings.tmdb.session_id)),
                    ],
                )
            );
            println!(
                "{}",
                formatter.format_section(
                    "TVDB",
                    &[
                        ("api_key", secret(&settings.tvdb.api_key)),
                        ("pin", secret(&settings.tvdb.pin)),
                        ("endpoint", plain(&settings.tvdb.endpoint)),
                        ("token", secret(&settings.tvdb.token)),
                    ],
                )
            );
            println!(
                "{}",
                formatter.format_section(
                    "Cache",
                    &[
                        ("backend", settings.cache.backend.to_string()),
                        ("path", settings.cache.file_path().display().to_string()),
                        (
                            "retention",
                            settings
                                .cache
                                .retention_secs
                                .map_or_else(unset, format_seconds),
                        ),
                        (
                            "evict_on_error",
                            settings
                                .cache
                                .evict_on_error
                                .map_or_else(unset, |v| v.to_string()),
                        ),
                    ],
                )
            );
            println!();
            println!("Log level: {}", settings.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&masked(&settings)?)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = default_settings_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_value(key: &str, raw: &str) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let updated = apply_setting(&store.get().await, key, raw)?;

    store.update(|s| *s = updated).await;
    store.save().await?;

    info!(key, "Setting updated");
    println!("Set {key}");

    Ok(())
}

async fn reset_config() -> Result<()> {
    let path = default_settings_path();

    if path.exists() {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

const SECRET_KEYS: &[&str] = &[
    "trakt.client_secret",
    "trakt.access_token",
    "tmdb.read_token",
    "tmdb.session_id",
    "tvdb.api_key",
    "tvdb.pin",
    "tvdb.token",
];

fn unset() -> String {
    "(not set)".to_string()
}

/// Keeps the first four characters of a secret.
fn mask(secret: &str) -> String {
    let shown: String = secret.chars().take(4).collect();
    if shown.len() == secret.len() {
        "****".to_string()
    } else {
        format!("{shown}****")
    }
}

/// Settings as JSON with every secret masked.
fn masked(settings: &Settings) -> Result<Value> {
    let mut value = serde_json::to_value(settings)?;
    for key in SECRET_KEYS {
        if let Some(Value::String(secret)) = value.pointer_mut(&pointer(key)) {
            *secret = mask(secret);
        }
    }
    Ok(value)
}

/// JSON pointer of a dotted settings key.
fn pointer(key: &str) -> String {
    format!("/{}", key.replace('.', "/"))
}

/// Returns `settings` with the dotted `key` set to `raw`.
///
/// The value is tried as JSON first and then as a plain string, so
/// `trakt.vip true` stores a boolean while `tvdb.pin 0042` stays a string.
fn apply_setting(settings: &Settings, key: &str, raw: &str) -> Result<Settings> {
    let base = serde_json::to_value(settings)?;
    let path = pointer(key);
    match base.pointer(&path) {
        Some(current) if !current.is_object() => {}
        _ => anyhow::bail!("Unknown setting: {key}"),
    }

    let candidates = if raw.is_empty() || raw == "null" {
        vec![Value::Null]
    } else {
        vec![param_value(raw), Value::String(raw.to_string())]
    };

    let mut last_error = None;
    for candidate in candidates {
        let mut value = base.clone();
        if let Some(slot) = value.pointer_mut(&path) {
            *slot = candidate;
        }
        match serde_json::from_value::<Settings>(value) {
            Ok(updated) => return Ok(updated),
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(e).with_context(|| format!("Invalid value for {key}: {raw}")),
        None => anyhow::bail!("Invalid value for {key}: {raw}"),
    }
}

// ============================================================================
// Tests
// ============================================================================
