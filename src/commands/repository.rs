// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repository commands - list, inspect, create, update, delete and sync repositories

use super::{
    finish_operation, href_of, list_resources, lookup, resolve_href, section_endpoint, set_opt,
    Console, ListArgs,
};
use crate::fields::{parse_labels, require_text};
use crate::types::{Repository, ResourceKind, Section};
use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};

/// Arguments for repository commands
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RepositoryArgs {
    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Labels as a JSON object of strings, e.g. '{"env":"prod"}'
    #[arg(long)]
    pub labels: Option<String>,

    /// Remote (name, href or URL) used by default for syncing
    #[arg(long)]
    pub remote: Option<String>,

    /// Number of repository versions to keep
    #[arg(long)]
    pub retain_versions: Option<u64>,

    /// Mirror the remote on sync (remove content missing upstream)
    #[arg(long)]
    pub mirror: bool,
}

/// Run repository command
pub async fn run(
    console: &Console,
    action: &str,
    section: Section,
    name: Option<String>,
    args: RepositoryArgs,
    list: ListArgs,
) -> Result<()> {
    let endpoint = section_endpoint(section, ResourceKind::Repository)?;

    match action {
        "list" | "ls" => {
            let source = console.client.page_source::<Repository>(endpoint.as_str());
            list_resources(console, source, "repositories", &list).await
        }
        "show" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Repository name is required"))?;
            let repository = lookup(console, &endpoint, "name", &name).await?;
            console.output.print_detail(&repository)
        }
        "create" | "new" => create(console, section, &endpoint, name, args).await,
        "update" | "edit" => update(console, section, &endpoint, name, args).await,
        "delete" | "rm" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Repository name is required"))?;
            let href = href_of(&lookup(console, &endpoint, "name", &name).await?)?;
            let response = console.client.delete(&href).await
                .with_context(|| format!("Failed to delete repository {name}"))?;
            finish_operation(
                console,
                response.map(|op| json!({ "task": op.task })),
                &format!("Deleted repository: {name}"),
            )
            .await
        }
        "sync" => sync(console, section, &endpoint, name, args).await,
        _ => bail!(
            "Unknown action: {}. Use list, show, create, update, delete, or sync",
            action
        ),
    }
}

async fn payload(
    console: &Console,
    section: Section,
    args: RepositoryArgs,
) -> Result<Map<String, Value>> {
    let mut payload = Map::new();
    set_opt(&mut payload, "description", args.description)?;
    set_opt(&mut payload, "retain_repo_versions", args.retain_versions)?;

    if let Some(labels) = args.labels {
        let labels = parse_labels(&labels).context("Invalid --labels")?;
        payload.insert("pulp_labels".into(), json!(labels));
    }

    if let Some(remote) = args.remote {
        let remotes = section_endpoint(section, ResourceKind::Remote)?;
        let href = resolve_href(console, &remotes, "name", &remote).await?;
        payload.insert("remote".into(), json!(href));
    }

    Ok(payload)
}

async fn create(
    console: &Console,
    section: Section,
    endpoint: &str,
    name: Option<String>,
    args: RepositoryArgs,
) -> Result<()> {
    let name = require_text("name", name.as_deref().unwrap_or_default())?.to_string();
    let mut body = payload(console, section, args).await?;
    body.insert("name".into(), json!(name));

    let created: Value = console
        .client
        .post(endpoint, &body)
        .await
        .with_context(|| format!("Failed to create repository {name}"))?;

    finish_operation(
        console,
        Some(created),
        &format!("Created {} repository: {}", section.label(), name),
    )
    .await
}

async fn update(
    console: &Console,
    section: Section,
    endpoint: &str,
    name: Option<String>,
    args: RepositoryArgs,
) -> Result<()> {
    let name = name.ok_or_else(|| anyhow::anyhow!("Repository name is required"))?;
    let href = href_of(&lookup(console, endpoint, "name", &name).await?)?;

    let body = payload(console, section, args).await?;
    if body.is_empty() {
        bail!("Nothing to update. Pass --description, --labels, --remote or --retain-versions");
    }

    let response: Value = console
        .client
        .patch(&href, &body)
        .await
        .with_context(|| format!("Failed to update repository {name}"))?;

    finish_operation(console, Some(response), &format!("Updated repository: {name}")).await
}

async fn sync(
    console: &Console,
    section: Section,
    endpoint: &str,
    name: Option<String>,
    args: RepositoryArgs,
) -> Result<()> {
    let name = name.ok_or_else(|| anyhow::anyhow!("Repository name is required"))?;
    let repository = lookup(console, endpoint, "name", &name).await?;
    let href = href_of(&repository)?;

    let remote = match args.remote {
        Some(remote) => {
            let remotes = section_endpoint(section, ResourceKind::Remote)?;
            resolve_href(console, &remotes, "name", &remote).await?
        }
        None => repository
            .get("remote")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| {
                anyhow::anyhow!("Repository {} has no remote; pass --remote", name)
            })?,
    };

    let body = json!({ "remote": remote, "mirror": args.mirror });
    let response: Value = console
        .client
        .post(&format!("{href}sync/"), &body)
        .await
        .with_context(|| format!("Failed to start sync of {name}"))?;

    finish_operation(console, Some(response), &format!("Synced repository: {name}")).await
}
