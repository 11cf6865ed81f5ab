// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Values are layered: built-in defaults, then the TOML file, then
//! `PULP_CONSOLE_*` environment variables. Command-line flags are applied
//! on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of environment variables overriding file settings
pub const ENV_PREFIX: &str = "PULP_CONSOLE";

/// Keys accepted by `config get/set`
pub const KEYS: &[&str] = &[
    "base_url",
    "api_root",
    "username",
    "password",
    "page_size",
    "timeout_secs",
    "task_poll_ms",
    "task_timeout_secs",
    "log_level",
];

const NUMERIC_KEYS: &[&str] = &["page_size", "timeout_secs", "task_poll_ms", "task_timeout_secs"];

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheme, host and port of the backend
    pub base_url: String,
    /// Path prefix of the REST API
    pub api_root: String,
    /// Basic-auth user
    pub username: String,
    /// Basic-auth password; requests are anonymous without it
    pub password: Option<String>,
    /// Rows per list page
    pub page_size: u64,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Delay between task polls
    pub task_poll_ms: u64,
    /// Give up waiting for a task after this long
    pub task_timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_root: "/pulp/api/v3/".to_string(),
            username: "admin".to_string(),
            password: None,
            page_size: 25,
            timeout_secs: 30,
            task_poll_ms: 1000,
            task_timeout_secs: 600,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Current value of a key, `None` for unknown or unset keys
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base_url" => Some(self.base_url.clone()),
            "api_root" => Some(self.api_root.clone()),
            "username" => Some(self.username.clone()),
            "password" => self.password.as_ref().map(|_| "********".to_string()),
            "page_size" => Some(self.page_size.to_string()),
            "timeout_secs" => Some(self.timeout_secs.to_string()),
            "task_poll_ms" => Some(self.task_poll_ms.to_string()),
            "task_timeout_secs" => Some(self.task_timeout_secs.to_string()),
            "log_level" => Some(self.log_level.clone()),
            _ => None,
        }
    }
}

/// Default location of the configuration file
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "pulp", "pulp-console")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from `path` (or the default location) and the environment
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut builder = config::Config::builder();

    if let Some(path) = path.map(Path::to_path_buf).or_else(default_path) {
        tracing::debug!(path = %path.display(), "reading configuration");
        builder = builder.add_source(
            config::File::from(path)
                .format(config::FileFormat::Toml)
                .required(false),
        );
    }

    let settings = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .context("Failed to read configuration")?;

    let config: Config = settings
        .try_deserialize()
        .context("Invalid configuration")?;

    if config.page_size == 0 {
        anyhow::bail!("page_size must be at least 1");
    }

    Ok(config)
}

/// Write `key = value` into the TOML file at `path`, creating it if needed
pub fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
    if !KEYS.contains(&key) {
        anyhow::bail!("Unknown configuration key: {}. Known keys: {}", key, KEYS.join(", "));
    }

    let mut table: toml::Table = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        toml::Table::new()
    };

    let parsed = if NUMERIC_KEYS.contains(&key) {
        let number: i64 = value
            .parse()
            .with_context(|| format!("{key} must be a non-negative integer"))?;
        if number < 0 {
            anyhow::bail!("{key} must be a non-negative integer");
        }
        toml::Value::Integer(number)
    } else {
        toml::Value::String(value.to_string())
    };
    table.insert(key.to_string(), parsed);

    // Reject values that would make the file unloadable
    let _: Config = toml::Value::Table(table.clone())
        .try_into()
        .context("Resulting configuration is invalid")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, toml::to_string_pretty(&table)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
