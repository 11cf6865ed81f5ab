// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - read and write the configuration file

use crate::config::{self, Config, KEYS};
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Run config command.
///
/// With no key every effective value is printed; with a key its value is
/// printed; with a key and value the file at `path` is updated.
pub fn run(
    path: Option<&Path>,
    effective: &Config,
    key: Option<String>,
    value: Option<String>,
) -> Result<()> {
    match (key, value) {
        (None, _) => {
            if let Some(path) = resolve_path(path) {
                println!("# {}", path.display());
            }
            for key in KEYS {
                println!("{} = {}", key, effective.get(key).unwrap_or_else(|| "-".into()));
            }
            Ok(())
        }
        (Some(key), None) => {
            if !KEYS.contains(&key.as_str()) {
                bail!("Unknown configuration key: {}. Known keys: {}", key, KEYS.join(", "));
            }
            println!("{}", effective.get(&key).unwrap_or_else(|| "-".into()));
            Ok(())
        }
        (Some(key), Some(value)) => {
            let Some(path) = resolve_path(path) else {
                bail!("No configuration directory available; pass --config");
            };
            config::set_value(&path, &key, &value)?;
            tracing::info!(path = %path.display(), key = %key, "configuration updated");
            println!("Set {key} in {}", path.display());
            Ok(())
        }
    }
}

fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
    path.map(Path::to_path_buf).or_else(config::default_path)
}
