// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Task commands - inspect, cancel and wait on background work

use super::{is_href, list_resources, Console, ListArgs};
use crate::fields::{normalize_resource_reference, require_text};
use crate::types::{Task, TaskState, TASKS_ENDPOINT};
use anyhow::{bail, Context, Result};

/// Arguments for task commands
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TaskArgs {
    /// Only list tasks in this state
    #[arg(long, value_enum)]
    pub state: Option<TaskState>,

    /// Only list tasks whose name contains this text
    #[arg(long)]
    pub name: Option<String>,
}

/// Run task command
pub async fn run(
    console: &Console,
    action: &str,
    href: Option<String>,
    args: TaskArgs,
    list: ListArgs,
) -> Result<()> {
    match action {
        "list" | "ls" => {
            let mut source = console.client.page_source::<Task>(TASKS_ENDPOINT);
            if let Some(state) = args.state {
                source = source.with_filter("state", state.code());
            }
            if let Some(name) = args.name {
                source = source.with_filter("name__contains", name);
            }
            list_resources(console, source, "tasks", &list).await
        }
        "show" => {
            let href = task_href(href)?;
            let task = console
                .client
                .task(&href)
                .await
                .with_context(|| format!("Failed to fetch task {href}"))?;
            if console.output.json {
                return console.output.print_json(&task);
            }
            println!("{} [{}]", task.name, console.output.task_state(task.state));
            println!("  href: {}", task.pulp_href);
            if let Some(worker) = &task.worker {
                println!("  worker: {worker}");
            }
            for (label, time) in [
                ("created", task.pulp_created),
                ("started", task.started_at),
                ("finished", task.finished_at),
            ] {
                if let Some(time) = time {
                    println!("  {label}: {}", time.format("%Y-%m-%d %H:%M:%S"));
                }
            }
            for resource in &task.created_resources {
                println!("  created: {resource}");
            }
            if let Some(error) = task.error_description() {
                println!("  error: {error}");
            }
            Ok(())
        }
        "cancel" => {
            let href = task_href(href)?;
            let task = console
                .client
                .cancel_task(&href)
                .await
                .with_context(|| format!("Failed to cancel task {href}"))?;
            println!("Task {} is {}", href, console.output.task_state(task.state));
            Ok(())
        }
        "wait" => {
            let href = task_href(href)?;
            let task = console
                .client
                .wait_for_task(&href)
                .await
                .with_context(|| format!("Task {href} did not complete"))?;
            console.output.print_task_summary(&task)
        }
        _ => bail!("Unknown action: {}. Use list, show, cancel, or wait", action),
    }
}

/// Task href from an href, a URL or a bare task id
fn task_href(href: Option<String>) -> Result<String> {
    let href = href.unwrap_or_default();
    let reference = require_text("task", &href)?;
    if is_href(reference) {
        return Ok(normalize_resource_reference(reference));
    }
    let id = reference.trim_matches('/');
    if id.is_empty() || id.contains('/') {
        bail!("Invalid task reference: {reference}. Pass a task href, URL or id");
    }
    Ok(format!("{TASKS_ENDPOINT}{id}/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_href_normalizes_urls() {
        assert_eq!(
            task_href(Some("https://pulp.example/pulp/api/v3/tasks/01/".into())).unwrap(),
            "/pulp/api/v3/tasks/01/"
        );
        assert!(task_href(None).is_err());
    }

    #[test]
    fn test_task_href_expands_bare_id() {
        assert_eq!(task_href(Some("0190a3c2".into())).unwrap(), "tasks/0190a3c2/");
        assert_eq!(task_href(Some(" 01/ ".into())).unwrap(), "tasks/01/");
        assert_eq!(
            task_href(Some("/pulp/api/v3/tasks/01/".into())).unwrap(),
            "/pulp/api/v3/tasks/01/"
        );
        assert!(task_href(Some("tasks/01/extra".into())).is_err());
    }
}
