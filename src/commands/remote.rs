// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Remote commands - manage the upstream sources repositories sync from

use super::{
    finish_operation, href_of, list_resources, lookup, section_endpoint, set_opt, Console,
    ListArgs,
};
use crate::fields::{headers_from_map, parse_labels, parse_string_map, require_text};
use crate::types::{Remote, ResourceKind, Section};
use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};

/// Download policies accepted by the backend
pub const POLICIES: &[&str] = &["immediate", "on_demand", "streamed"];

/// Arguments for remote commands
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RemoteArgs {
    /// Upstream URL
    #[arg(long)]
    pub url: Option<String>,

    /// Download policy (immediate, on_demand, streamed)
    #[arg(long)]
    pub policy: Option<String>,

    /// Extra request headers as a JSON object of strings
    #[arg(long)]
    pub headers: Option<String>,

    /// Labels as a JSON object of strings
    #[arg(long)]
    pub labels: Option<String>,

    /// Verify the upstream TLS certificate
    #[arg(long)]
    pub tls_validation: Option<bool>,
}

/// Run remote command
pub async fn run(
    console: &Console,
    action: &str,
    section: Section,
    name: Option<String>,
    args: RemoteArgs,
    list: ListArgs,
) -> Result<()> {
    let endpoint = section_endpoint(section, ResourceKind::Remote)?;

    match action {
        "list" | "ls" => {
            let source = console.client.page_source::<Remote>(endpoint.as_str());
            list_resources(console, source, "remotes", &list).await
        }
        "show" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Remote name is required"))?;
            let remote = lookup(console, &endpoint, "name", &name).await?;
            console.output.print_detail(&remote)
        }
        "create" | "new" => {
            let name = require_text("name", name.as_deref().unwrap_or_default())?.to_string();
            let url = args.url.clone().unwrap_or_default();
            let url = require_text("url", &url)?.to_string();

            let mut body = payload(args)?;
            body.insert("name".into(), json!(name));
            body.insert("url".into(), json!(url));

            let created: Value = console
                .client
                .post(&endpoint, &body)
                .await
                .with_context(|| format!("Failed to create remote {name}"))?;
            finish_operation(
                console,
                Some(created),
                &format!("Created {} remote: {}", section.label(), name),
            )
            .await
        }
        "update" | "edit" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Remote name is required"))?;
            let body = payload(args)?;
            if body.is_empty() {
                bail!("Nothing to update. Pass --url, --policy, --headers, --labels or --tls-validation");
            }
            let href = href_of(&lookup(console, &endpoint, "name", &name).await?)?;
            let response: Value = console
                .client
                .patch(&href, &body)
                .await
                .with_context(|| format!("Failed to update remote {name}"))?;
            finish_operation(console, Some(response), &format!("Updated remote: {name}")).await
        }
        "delete" | "rm" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Remote name is required"))?;
            let href = href_of(&lookup(console, &endpoint, "name", &name).await?)?;
            let response = console
                .client
                .delete(&href)
                .await
                .with_context(|| format!("Failed to delete remote {name}"))?;
            finish_operation(
                console,
                response.map(|op| json!({ "task": op.task })),
                &format!("Deleted remote: {name}"),
            )
            .await
        }
        _ => bail!(
            "Unknown action: {}. Use list, show, create, update, or delete",
            action
        ),
    }
}

/// Validated request body from the optional flags
pub fn payload(args: RemoteArgs) -> Result<Map<String, Value>> {
    let mut payload = Map::new();

    if let Some(url) = &args.url {
        payload.insert("url".into(), json!(require_text("url", url)?));
    }

    if let Some(policy) = &args.policy {
        if !POLICIES.contains(&policy.as_str()) {
            bail!("Unknown policy: {}. Valid: {}", policy, POLICIES.join(", "));
        }
        payload.insert("policy".into(), json!(policy));
    }

    if let Some(headers) = &args.headers {
        if let Some(map) = parse_string_map(headers).context("Invalid --headers")? {
            payload.insert("headers".into(), json!(headers_from_map(&map)));
        }
    }

    if let Some(labels) = &args.labels {
        let labels = parse_labels(labels).context("Invalid --labels")?;
        payload.insert("pulp_labels".into(), json!(labels));
    }

    set_opt(&mut payload, "tls_validation", args.tls_validation)?;
    Ok(payload)
}
