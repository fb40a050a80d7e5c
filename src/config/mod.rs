//! Configuration system for churnwatch.
//!
//! Layered, later layers win:
//!
//! 1. **Built-in defaults** — [`schema::ChurnwatchConfig::default()`]
//! 2. **User global config** — `~/.churnwatch/config.toml`
//! 3. **Project local config** — `.churnwatch.toml` in the current directory
//! 4. **Environment variables** — `CHURNWATCH_*`
//!
//! Malformed files are ignored rather than reported, so a typo in a config
//! file never stops a prediction from being made.

pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::ChurnwatchConfig;

use crate::predict::controller::OrderingPolicy;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> ChurnwatchConfig {
    let mut config = ChurnwatchConfig::default();

    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    // A project file replaces the global one wholesale; unset keys in it
    // come back as defaults.
    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    apply_env_overrides(&mut config);

    config
}

fn load_toml_file(path: Option<PathBuf>) -> Option<ChurnwatchConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.churnwatch`, where config and logs live.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".churnwatch"))
}

fn global_config_path() -> Option<PathBuf> {
    home_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".churnwatch.toml"))
}

/// Path to the global config file, for display and `config init`.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to the project config file, for display.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `CHURNWATCH_URL` — prediction service base URL
/// - `CHURNWATCH_PREDICT_PATH` — prediction route
/// - `CHURNWATCH_TIMEOUT_MS` — request timeout; `0` or `none` removes it
/// - `CHURNWATCH_ORDERING` — `last-resolved-wins` | `latest-submission-wins`
/// - `CHURNWATCH_ANIMATION` — counter animation on/off
/// - `CHURNWATCH_LOG` — prediction log on/off
/// - `CHURNWATCH_LOG_PATH` — prediction log file
/// - `CHURNWATCH_WEB_ADDR` — `serve` listen address
fn apply_env_overrides(config: &mut ChurnwatchConfig) {
    if let Ok(val) = std::env::var("CHURNWATCH_URL")
        && !val.is_empty()
    {
        config.endpoint.base_url = val;
    }
    if let Ok(val) = std::env::var("CHURNWATCH_PREDICT_PATH")
        && !val.is_empty()
    {
        config.endpoint.predict_path = val;
    }
    if let Ok(val) = std::env::var("CHURNWATCH_TIMEOUT_MS") {
        config.endpoint.timeout_ms = parse_timeout(&val).unwrap_or(config.endpoint.timeout_ms);
    }
    if let Ok(val) = std::env::var("CHURNWATCH_ORDERING")
        && let Some(ordering) = parse_ordering(&val)
    {
        config.controller.ordering = ordering;
    }
    if let Ok(val) = std::env::var("CHURNWATCH_ANIMATION") {
        config.animation.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("CHURNWATCH_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("CHURNWATCH_LOG_PATH")
        && !val.is_empty()
    {
        config.logging.path = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("CHURNWATCH_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// `Some(None)` clears the timeout, `None` means the value was not understood.
fn parse_timeout(val: &str) -> Option<Option<u64>> {
    match val.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "none" | "off" => Some(None),
        other => other.parse::<u64>().ok().map(Some),
    }
}

pub fn parse_ordering(val: &str) -> Option<OrderingPolicy> {
    match val.to_ascii_lowercase().replace('_', "-").as_str() {
        "last-resolved-wins" | "last-resolved" => Some(OrderingPolicy::LastResolvedWins),
        "latest-submission-wins" | "latest-submission" => {
            Some(OrderingPolicy::LatestSubmissionWins)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / show
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.churnwatch/config.toml`.
///
/// Fails if the file already exists unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.churnwatch/ directory")?;
    }

    fs::write(&path, ChurnwatchConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// The effective (merged) configuration rendered as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
