// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Publication commands

use super::{
    finish_operation, list_resources, resolve_href, section_endpoint, Console, ListArgs,
};
use crate::fields::{normalize_resource_reference, require_text};
use crate::types::{Publication, ResourceKind, Section};
use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

/// Arguments for publication commands
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PublicationArgs {
    /// Repository (name, href or URL); publishes its latest version
    #[arg(long)]
    pub repository: Option<String>,

    /// Repository version href or URL to publish
    #[arg(long, conflicts_with = "repository")]
    pub repository_version: Option<String>,
}

/// Run publication command
pub async fn run(
    console: &Console,
    action: &str,
    section: Section,
    href: Option<String>,
    args: PublicationArgs,
    list: ListArgs,
) -> Result<()> {
    let endpoint = section_endpoint(section, ResourceKind::Publication)?;

    match action {
        "list" | "ls" => {
            let mut source = console.client.page_source::<Publication>(endpoint.as_str());
            if let Some(repository) = &args.repository {
                let repositories = section_endpoint(section, ResourceKind::Repository)?;
                let href = resolve_href(console, &repositories, "name", repository).await?;
                source = source.with_filter("repository", href);
            }
            list_resources(console, source, "publications", &list).await
        }
        "show" => {
            let href = href.ok_or_else(|| anyhow::anyhow!("Publication href is required"))?;
            let href = require_text("pulp_href", &href)?;
            let publication: Value = console
                .client
                .get(href)
                .await
                .with_context(|| format!("Failed to fetch {href}"))?;
            console.output.print_detail(&publication)
        }
        "create" | "new" => {
            let body = match (args.repository, args.repository_version) {
                (Some(repository), None) => {
                    let repositories = section_endpoint(section, ResourceKind::Repository)?;
                    let href = resolve_href(console, &repositories, "name", &repository).await?;
                    json!({ "repository": href })
                }
                (None, Some(version)) => {
                    let version = require_text("repository_version", &version)?;
                    json!({ "repository_version": normalize_resource_reference(version) })
                }
                _ => bail!("Pass either --repository or --repository-version"),
            };

            let response: Value = console
                .client
                .post(&endpoint, &body)
                .await
                .context("Failed to create publication")?;
            finish_operation(
                console,
                Some(response),
                &format!("Created {} publication", section.label()),
            )
            .await
        }
        "delete" | "rm" => {
            let href = href.ok_or_else(|| anyhow::anyhow!("Publication href is required"))?;
            let href = normalize_resource_reference(require_text("pulp_href", &href)?);
            let response = console
                .client
                .delete(&href)
                .await
                .with_context(|| format!("Failed to delete publication {href}"))?;
            finish_operation(
                console,
                response.map(|op| json!({ "task": op.task })),
                &format!("Deleted publication: {href}"),
            )
            .await
        }
        _ => bail!("Unknown action: {}. Use list, show, create, or delete", action),
    }
}
