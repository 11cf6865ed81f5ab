// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Backend status report

use super::output::format_bytes;
use super::Console;
use crate::types::{Connection, Status};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// Run status command
pub async fn run(console: &Console) -> Result<()> {
    let status = console
        .client
        .status()
        .await
        .with_context(|| format!("Failed to reach {}", console.config.base_url))?;

    if console.output.json {
        return console.output.print_json(&status);
    }

    for line in report(&status, console.output.color) {
        println!("{line}");
    }
    Ok(())
}

fn connection(connection: Option<Connection>, color: bool) -> String {
    let (text, ok) = match connection {
        Some(c) if c.connected => ("connected", true),
        Some(_) => ("disconnected", false),
        None => ("unknown", false),
    };
    match (color, ok) {
        (false, _) => text.to_string(),
        (true, true) => text.green().to_string(),
        (true, false) => text.red().to_string(),
    }
}

/// Lines of the human-readable report
#[must_use]
pub fn report(status: &Status, color: bool) -> Vec<String> {
    let mut lines = vec!["Components:".to_string()];
    for version in &status.versions {
        lines.push(format!("  {} {}", version.component, version.version));
    }

    lines.push(format!("Workers: {}", status.online_workers.len()));
    for worker in &status.online_workers {
        let current = worker.current_task.as_deref().unwrap_or("idle");
        lines.push(format!("  {} ({})", worker.name, current));
    }
    lines.push(format!("Content apps: {}", status.online_content_apps.len()));

    lines.push(format!(
        "Database: {}",
        connection(status.database_connection, color)
    ));
    lines.push(format!("Redis: {}", connection(status.redis_connection, color)));

    if let Some(storage) = status.storage {
        let bytes = |value: Option<u64>| value.map_or_else(|| "-".to_string(), format_bytes);
        lines.push(format!(
            "Storage: {} used, {} free, {} total",
            bytes(storage.used),
            bytes(storage.free),
            bytes(storage.total)
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report() {
        let status: Status = serde_json::from_value(json!({
            "versions": [{"component": "core", "version": "3.49.0"}],
            "online_workers": [{"name": "worker-1"}],
            "online_content_apps": [],
            "database_connection": {"connected": true},
            "redis_connection": {"connected": false},
            "storage": {"total": 2048, "used": 1024, "free": 1024}
        }))
        .unwrap();

        insta::assert_snapshot!(report(&status, false).join("\n"), @r"
        Components:
          core 3.49.0
        Workers: 1
          worker-1 (idle)
        Content apps: 0
        Database: connected
        Redis: disconnected
        Storage: 1.0 KiB used, 1.0 KiB free, 2.0 KiB total
        ");
    }

    #[test]
    fn test_missing_connection_is_unknown() {
        let lines = report(&Status::default(), false);
        assert!(lines.contains(&"Redis: unknown".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Storage")));
    }
}
