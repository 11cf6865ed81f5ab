// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! View command - interactive browser for one collection

use super::{section_endpoint, Console};
use crate::tui::{browse, Browser};
use crate::types::{
    Distribution, Listable, Package, Publication, Remote, Repository, ResourceKind, Section, Task,
    User, TASKS_ENDPOINT, USERS_ENDPOINT,
};
use anyhow::Result;
use serde::de::DeserializeOwned;

/// Collection shown by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewTarget {
    /// Repositories of the section
    Repositories,
    /// Remotes of the section
    Remotes,
    /// Distributions of the section
    Distributions,
    /// Publications of the section
    Publications,
    /// Content units of the section
    Content,
    /// Background tasks
    Tasks,
    /// Users
    Users,
}

impl ViewTarget {
    fn kind(self) -> Option<ResourceKind> {
        match self {
            Self::Repositories => Some(ResourceKind::Repository),
            Self::Remotes => Some(ResourceKind::Remote),
            Self::Distributions => Some(ResourceKind::Distribution),
            Self::Publications => Some(ResourceKind::Publication),
            Self::Content => Some(ResourceKind::Package),
            Self::Tasks | Self::Users => None,
        }
    }
}

/// Run view command
pub fn run(console: &Console, section: Section, target: ViewTarget) -> Result<()> {
    let endpoint = match target.kind() {
        Some(kind) => section_endpoint(section, kind)?,
        None if target == ViewTarget::Tasks => TASKS_ENDPOINT.to_string(),
        None => USERS_ENDPOINT.to_string(),
    };
    tracing::info!(%endpoint, "launching browser");

    let title = match target.kind() {
        Some(kind) => format!("{} {}", section.label(), kind.plural()),
        None => format!("{target:?}").to_lowercase(),
    };

    match target {
        ViewTarget::Repositories => open::<Repository>(console, title, endpoint),
        ViewTarget::Remotes => open::<Remote>(console, title, endpoint),
        ViewTarget::Distributions => open::<Distribution>(console, title, endpoint),
        ViewTarget::Publications => open::<Publication>(console, title, endpoint),
        ViewTarget::Content => open::<Package>(console, title, endpoint),
        ViewTarget::Tasks => open::<Task>(console, title, endpoint),
        ViewTarget::Users => open::<User>(console, title, endpoint),
    }
}

fn open<T>(console: &Console, title: String, endpoint: String) -> Result<()>
where
    T: Listable + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let source = console.client.page_source::<T>(endpoint);
    let browser = Browser::new(title, source, console.config.page_size);
    browse(&browser)
}
