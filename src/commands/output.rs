// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Text and JSON rendering for command output

use crate::listing::ListState;
use crate::types::{total_pages, Listable, Task, TaskState};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

/// Output preferences from the global flags
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Print JSON instead of tables
    pub json: bool,
    /// Colorize task states
    pub color: bool,
}

#[derive(Serialize)]
struct ListOutput<'a, T> {
    count: u64,
    page: u64,
    page_size: u64,
    results: &'a [T],
}

impl Output {
    /// Print one page of a list screen
    pub fn print_list<T: Listable + Serialize>(
        &self,
        state: &ListState<T>,
        page_size: u64,
    ) -> Result<()> {
        if self.json {
            return self.print_json(&ListOutput {
                count: state.total_count,
                page: state.page + 1,
                page_size,
                results: &state.items,
            });
        }

        if state.items.is_empty() {
            println!("No results.");
        } else {
            let rows: Vec<Vec<String>> = state.items.iter().map(Listable::cells).collect();
            println!("{}", render_table(T::COLUMNS, &rows));
        }
        println!();
        println!("{}", page_footer(state.page, page_size, state.total_count));
        Ok(())
    }

    /// Pretty JSON to stdout
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// A single resource: JSON, or one `key: value` line per field
    pub fn print_detail(&self, value: &Value) -> Result<()> {
        if self.json {
            return self.print_json(value);
        }
        match value {
            Value::Object(fields) => {
                for (key, field) in fields {
                    println!("  {}: {}", key, detail_value(field));
                }
            }
            other => println!("{}", serde_json::to_string_pretty(other)?),
        }
        Ok(())
    }

    /// Task state, colored when enabled
    #[must_use]
    pub fn task_state(&self, state: TaskState) -> String {
        let code = state.code();
        if !self.color {
            return code.to_string();
        }
        match state {
            TaskState::Completed => code.green().to_string(),
            TaskState::Failed => code.red().to_string(),
            TaskState::Canceled | TaskState::Canceling | TaskState::Skipped => {
                code.yellow().to_string()
            }
            TaskState::Waiting | TaskState::Running => code.cyan().to_string(),
        }
    }

    /// Outcome of a finished task
    pub fn print_task_summary(&self, task: &Task) -> Result<()> {
        if self.json {
            return self.print_json(task);
        }
        println!("  task: {} [{}]", task.pulp_href, self.task_state(task.state));
        for href in &task.created_resources {
            println!("  created: {href}");
        }
        if let Some(error) = task.error_description() {
            println!("  error: {error}");
        }
        Ok(())
    }
}

fn detail_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        other => other.to_string(),
    }
}

/// Left-aligned columns separated by two spaces, no trailing whitespace
#[must_use]
pub fn render_table(columns: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<&str>| {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    };

    let mut lines = vec![format_row(columns.to_vec())];
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// `page X of Y (N total)` for a zero-indexed page
#[must_use]
pub fn page_footer(page: u64, page_size: u64, total_count: u64) -> String {
    let pages = total_pages(total_count, page_size).max(1);
    format!("page {} of {} ({} total)", page.saturating_add(1), pages, total_count)
}

/// Human-readable byte count
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
