// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Distribution commands - publish repositories or publications under a base path

use super::{
    finish_operation, href_of, list_resources, lookup, resolve_href, section_endpoint, Console,
    ListArgs,
};
use crate::fields::{normalize_resource_reference, parse_labels, require_text};
use crate::types::{Distribution, ResourceKind, Section};
use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};

/// Arguments for distribution commands
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DistributionArgs {
    /// Path the content is served under
    #[arg(long)]
    pub base_path: Option<String>,

    /// Repository (name, href or URL) whose latest version is served
    #[arg(long)]
    pub repository: Option<String>,

    /// Publication href or URL to serve
    #[arg(long, conflicts_with = "repository")]
    pub publication: Option<String>,

    /// Labels as a JSON object of strings
    #[arg(long)]
    pub labels: Option<String>,
}

/// Run distribution command
pub async fn run(
    console: &Console,
    action: &str,
    section: Section,
    name: Option<String>,
    args: DistributionArgs,
    list: ListArgs,
) -> Result<()> {
    let endpoint = section_endpoint(section, ResourceKind::Distribution)?;

    match action {
        "list" | "ls" => {
            let source = console.client.page_source::<Distribution>(endpoint.as_str());
            list_resources(console, source, "distributions", &list).await
        }
        "show" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Distribution name is required"))?;
            let distribution = lookup(console, &endpoint, "name", &name).await?;
            console.output.print_detail(&distribution)
        }
        "create" | "new" => {
            let name = require_text("name", name.as_deref().unwrap_or_default())?.to_string();
            let base_path = args.base_path.clone().unwrap_or_default();
            let base_path = require_text("base_path", &base_path)?
                .trim_matches('/')
                .to_string();

            let mut body = payload(console, section, args).await?;
            body.insert("name".into(), json!(name));
            body.insert("base_path".into(), json!(base_path));

            let response: Value = console
                .client
                .post(&endpoint, &body)
                .await
                .with_context(|| format!("Failed to create distribution {name}"))?;
            finish_operation(
                console,
                Some(response),
                &format!("Created {} distribution: {} at /{}", section.label(), name, base_path),
            )
            .await
        }
        "update" | "edit" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Distribution name is required"))?;
            let mut body = payload(console, section, args.clone()).await?;
            if let Some(base_path) = &args.base_path {
                let base_path = require_text("base_path", base_path)?.trim_matches('/');
                body.insert("base_path".into(), json!(base_path));
            }
            if body.is_empty() {
                bail!("Nothing to update. Pass --base-path, --repository, --publication or --labels");
            }

            let href = href_of(&lookup(console, &endpoint, "name", &name).await?)?;
            let response: Value = console
                .client
                .patch(&href, &body)
                .await
                .with_context(|| format!("Failed to update distribution {name}"))?;
            finish_operation(console, Some(response), &format!("Updated distribution: {name}"))
                .await
        }
        "delete" | "rm" => {
            let name = name.ok_or_else(|| anyhow::anyhow!("Distribution name is required"))?;
            let href = href_of(&lookup(console, &endpoint, "name", &name).await?)?;
            let response = console
                .client
                .delete(&href)
                .await
                .with_context(|| format!("Failed to delete distribution {name}"))?;
            finish_operation(
                console,
                response.map(|op| json!({ "task": op.task })),
                &format!("Deleted distribution: {name}"),
            )
            .await
        }
        _ => bail!(
            "Unknown action: {}. Use list, show, create, update, or delete",
            action
        ),
    }
}

async fn payload(
    console: &Console,
    section: Section,
    args: DistributionArgs,
) -> Result<Map<String, Value>> {
    let mut payload = Map::new();

    if let Some(labels) = args.labels {
        let labels = parse_labels(&labels).context("Invalid --labels")?;
        payload.insert("pulp_labels".into(), json!(labels));
    }

    if let Some(publication) = args.publication {
        if !section.has_publications() {
            bail!("{} distributions serve repositories, not publications", section.label());
        }
        let publication = require_text("publication", &publication)?;
        payload.insert(
            "publication".into(),
            json!(normalize_resource_reference(publication)),
        );
    }

    if let Some(repository) = args.repository {
        let repositories = section_endpoint(section, ResourceKind::Repository)?;
        let href = resolve_href(console, &repositories, "name", &repository).await?;
        payload.insert("repository".into(), json!(href));
    }

    Ok(payload)
}
