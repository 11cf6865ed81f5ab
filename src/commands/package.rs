// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Content browsing

use super::{list_resources, section_endpoint, Console, ListArgs};
use crate::fields::{normalize_resource_reference, require_text};
use crate::types::{Package, ResourceKind, Section};
use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Arguments for package commands
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PackageArgs {
    /// Only list content in this repository version (href or URL)
    #[arg(long)]
    pub repository_version: Option<String>,
}

/// Run package command
pub async fn run(
    console: &Console,
    action: &str,
    section: Section,
    href: Option<String>,
    args: PackageArgs,
    list: ListArgs,
) -> Result<()> {
    let endpoint = section_endpoint(section, ResourceKind::Package)?;

    match action {
        "list" | "ls" => {
            let mut source = console.client.page_source::<Package>(endpoint);
            if let Some(version) = &args.repository_version {
                let version = require_text("repository_version", version)?;
                source = source.with_filter("repository_version", normalize_resource_reference(version));
            }
            list_resources(console, source, "content", &list).await
        }
        "show" => {
            let href = href.ok_or_else(|| anyhow::anyhow!("Content href is required"))?;
            let href = require_text("pulp_href", &href)?;
            let content: Value = console
                .client
                .get(href)
                .await
                .with_context(|| format!("Failed to fetch {href}"))?;
            console.output.print_detail(&content)
        }
        _ => bail!("Unknown action: {}. Use list or show", action),
    }
}
