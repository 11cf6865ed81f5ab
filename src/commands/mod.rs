// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod config;
pub mod distribution;
pub mod output;
pub mod package;
pub mod publication;
pub mod remote;
pub mod repository;
pub mod status;
pub mod task;
pub mod user;
pub mod view;

use crate::client::{ApiClient, EndpointSource};
use crate::config::Config;
use crate::fields::{normalize_resource_reference, require_text};
use crate::listing::{ListConfig, ListController, ListState, PageSource};
use crate::types::{AsyncOperation, Listable, Page, PageRequest, ResourceKind, Section};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

pub use output::Output;

/// Everything a command needs to talk to the backend and print results
pub struct Console {
    /// REST client
    pub client: ApiClient,
    /// Effective configuration
    pub config: Config,
    /// Output preferences
    pub output: Output,
}

impl Console {
    /// Build a console from loaded configuration
    pub fn new(config: Config, output: Output) -> Result<Self> {
        let client = ApiClient::new(&config)
            .with_context(|| format!("Failed to create client for {}", config.base_url))?;
        Ok(Self {
            client,
            config,
            output,
        })
    }
}

/// Highest page number accepted on the command line
pub const MAX_PAGE: u64 = 4_294_967_295;

/// Largest page size accepted on the command line
pub const MAX_PAGE_SIZE: u64 = 10_000;

/// Paging flags shared by every list command
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..=MAX_PAGE))]
    pub page: u64,

    /// Rows per page (defaults to the configured page size)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_PAGE_SIZE))]
    pub page_size: Option<u64>,

    /// Ordering key, e.g. name or -pulp_created
    #[arg(long)]
    pub ordering: Option<String>,
}

impl ListArgs {
    fn page_size(&self, config: &Config) -> u64 {
        self.page_size.unwrap_or(config.page_size).max(1)
    }
}

/// Collection endpoint of `kind` in `section`, or an error if the plugin lacks it
pub fn section_endpoint(section: Section, kind: ResourceKind) -> Result<String> {
    section.endpoint(kind).ok_or_else(|| {
        anyhow::anyhow!(
            "{} content has no {}",
            section.label(),
            kind.plural()
        )
    })
}

/// Load one page through a list controller
pub async fn load_page<T>(
    console: &Console,
    source: impl PageSource<T> + 'static,
    what: &str,
    args: &ListArgs,
) -> Result<ListState<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let mut list_config = ListConfig::new(
        source,
        args.page_size(&console.config),
        format!("Failed to load {what}"),
    );
    if let Some(ordering) = &args.ordering {
        list_config = list_config.with_ordering(ordering.clone());
    }

    let controller = ListController::new(list_config);
    let task = if args.page <= 1 {
        controller.start()
    } else {
        controller.change_page(args.page - 1)
    };
    let task = task.ok_or_else(|| anyhow::anyhow!("Page {} is out of range", args.page))?;
    task.await.context("List fetch was aborted")?;

    let state = controller.state();
    if let Some(error) = &state.error {
        anyhow::bail!("{}", error);
    }
    Ok(state)
}

/// Load and print one page of a collection
pub async fn list_resources<T>(
    console: &Console,
    source: EndpointSource<T>,
    what: &str,
    args: &ListArgs,
) -> Result<()>
where
    T: Listable + Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let state = load_page(console, source, what, args).await?;
    console
        .output
        .print_list(&state, args.page_size(&console.config))
}

pub(crate) fn is_href(reference: &str) -> bool {
    reference.starts_with('/')
        || reference.starts_with("http://")
        || reference.starts_with("https://")
}

/// Fetch a resource by href, or by `key` (e.g. `name`) within a collection
pub async fn lookup(
    console: &Console,
    endpoint: &str,
    key: &'static str,
    reference: &str,
) -> Result<Value> {
    let reference = require_text(key, reference)?;

    if is_href(reference) {
        return console
            .client
            .get(reference)
            .await
            .with_context(|| format!("Failed to fetch {reference}"));
    }

    let page: Page<Value> = console
        .client
        .list_filtered(
            endpoint,
            &PageRequest {
                offset: 0,
                limit: 1,
                ordering: String::new(),
            },
            &[(key.to_string(), reference.to_string())],
        )
        .await
        .with_context(|| format!("Failed to look up '{reference}'"))?;

    page.items
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Not found: {} = '{}'", key, reference))
}

/// The `pulp_href` of a fetched resource
pub fn href_of(resource: &Value) -> Result<String> {
    resource
        .get("pulp_href")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| anyhow::anyhow!("Backend response has no pulp_href"))
}

/// Href for a reference given on the command line: hrefs and URLs are
/// normalized, names are looked up in `endpoint`
pub async fn resolve_href(
    console: &Console,
    endpoint: &str,
    key: &'static str,
    reference: &str,
) -> Result<String> {
    let reference = require_text(key, reference)?;
    if is_href(reference) {
        return Ok(normalize_resource_reference(reference));
    }
    let resource = lookup(console, endpoint, key, reference).await?;
    href_of(&resource)
}

/// Report the outcome of a create/update/delete response.
///
/// Responses that dispatched a task are waited on first.
pub async fn finish_operation(console: &Console, response: Option<Value>, done: &str) -> Result<()> {
    let Some(response) = response else {
        println!("{done}");
        return Ok(());
    };

    match serde_json::from_value::<AsyncOperation>(response.clone()) {
        Ok(operation) => {
            info!(task = %operation.task, "waiting for task");
            let task = console
                .client
                .wait_for_task(&operation.task)
                .await
                .with_context(|| format!("Task {} did not complete", operation.task))?;
            println!("{done}");
            console.output.print_task_summary(&task)
        }
        Err(_) => {
            println!("{done}");
            console.output.print_detail(&response)
        }
    }
}

/// Insert `value` under `key` when present
pub(crate) fn set_opt<T: Serialize>(
    payload: &mut serde_json::Map<String, Value>,
    key: &str,
    value: Option<T>,
) -> Result<()> {
    if let Some(value) = value {
        payload.insert(key.to_string(), serde_json::to_value(value)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_href() {
        assert!(is_href("/pulp/api/v3/remotes/rpm/rpm/1/"));
        assert!(is_href("https://pulp/pulp/api/v3/remotes/rpm/rpm/1/"));
        assert!(!is_href("fedora-40"));
    }

    #[test]
    fn test_href_of() {
        assert_eq!(href_of(&json!({"pulp_href": "/a/1/"})).unwrap(), "/a/1/");
        assert!(href_of(&json!({"name": "x"})).is_err());
    }

    #[test]
    fn test_section_endpoint_errors_for_missing_collection() {
        let err = section_endpoint(Section::Container, ResourceKind::Publication).unwrap_err();
        assert_eq!(err.to_string(), "Container content has no publications");
        assert!(section_endpoint(Section::Rpm, ResourceKind::Publication).is_ok());
    }

    #[test]
    fn test_set_opt() {
        let mut payload = serde_json::Map::new();
        set_opt(&mut payload, "a", Some("x")).unwrap();
        set_opt::<String>(&mut payload, "b", None).unwrap();
        assert_eq!(Value::Object(payload), json!({"a": "x"}));
    }

    #[test]
    fn test_page_flags_are_bounded() {
        use clap::Parser;

        #[derive(Parser)]
        struct Cli {
            #[command(flatten)]
            list: ListArgs,
        }

        assert!(Cli::try_parse_from(["x", "--page", "9223372036854775808"]).is_err());
        assert!(Cli::try_parse_from(["x", "--page", "0"]).is_err());
        assert!(Cli::try_parse_from(["x", "--page-size", "0"]).is_err());
        let cli = Cli::try_parse_from(["x", "--page", "4294967295", "--page-size", "10000"]).unwrap();
        assert_eq!(cli.list.page, MAX_PAGE);
        assert!(PageRequest::for_page(cli.list.page - 1, MAX_PAGE_SIZE, "").is_some());
    }

    #[test]
    fn test_list_args_page_size_fallback() {
        let config = Config::default();
        assert_eq!(ListArgs::default().page_size(&config), 25);
        let args = ListArgs {
            page_size: Some(0),
            ..ListArgs::default()
        };
        assert_eq!(args.page_size(&config), 1);
    }
}
