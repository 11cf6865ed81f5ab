// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Pulp console library - administrative console for a content-repository service
//!
//! This crate provides the client side of a package/artifact repository
//! backend: a REST client, a paginated list controller that drives every list
//! screen, and the field parsing helpers used before payloads are sent.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod fields;
pub mod listing;
pub mod tui;

pub use error::{Error, Result};

/// Resource types exposed by the content-repository REST API
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use std::collections::BTreeMap;

    // =========================================================================
    // Sections (content plugins)
    // =========================================================================

    /// Content plugin section of the console
    #[derive(
        Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
    )]
    #[serde(rename_all = "lowercase")]
    pub enum Section {
        /// RPM packages (yum/dnf repositories)
        Rpm,
        /// Debian packages (APT repositories)
        Deb,
        /// Arbitrary files
        File,
        /// Container images
        Container,
    }

    impl Section {
        /// Every section, in navigation order
        pub const ALL: [Section; 4] = [Self::Rpm, Self::Deb, Self::File, Self::Container];

        /// Short code used on the command line
        #[must_use]
        pub fn code(&self) -> &'static str {
            match self {
                Self::Rpm => "rpm",
                Self::Deb => "deb",
                Self::File => "file",
                Self::Container => "container",
            }
        }

        /// Human-readable section title
        #[must_use]
        pub fn label(&self) -> &'static str {
            match self {
                Self::Rpm => "RPM",
                Self::Deb => "Debian/APT",
                Self::File => "File",
                Self::Container => "Container",
            }
        }

        /// `<plugin>/<type>` segment shared by repositories, remotes,
        /// distributions and publications
        fn plugin_path(&self) -> &'static str {
            match self {
                Self::Rpm => "rpm/rpm",
                Self::Deb => "deb/apt",
                Self::File => "file/file",
                Self::Container => "container/container",
            }
        }

        fn content_path(&self) -> &'static str {
            match self {
                Self::Rpm => "content/rpm/packages/",
                Self::Deb => "content/deb/packages/",
                Self::File => "content/file/files/",
                Self::Container => "content/container/manifests/",
            }
        }

        /// Whether the plugin publishes repository versions before serving them
        #[must_use]
        pub fn has_publications(&self) -> bool {
            !matches!(self, Self::Container)
        }

        /// Collection endpoint for a resource kind, relative to the API root.
        ///
        /// Returns `None` when the plugin has no such collection.
        #[must_use]
        pub fn endpoint(&self, kind: ResourceKind) -> Option<String> {
            let plugin = self.plugin_path();
            match kind {
                ResourceKind::Repository => Some(format!("repositories/{plugin}/")),
                ResourceKind::Remote => Some(format!("remotes/{plugin}/")),
                ResourceKind::Distribution => Some(format!("distributions/{plugin}/")),
                ResourceKind::Publication if self.has_publications() => {
                    Some(format!("publications/{plugin}/"))
                }
                ResourceKind::Publication => None,
                ResourceKind::Package => Some(self.content_path().to_string()),
            }
        }
    }

    /// Section-scoped resource collections
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
    pub enum ResourceKind {
        /// Repositories
        Repository,
        /// Remotes (upstream sources)
        Remote,
        /// Distributions (served base paths)
        Distribution,
        /// Publications
        Publication,
        /// Packages / content units
        Package,
    }

    impl ResourceKind {
        /// Plural display name
        #[must_use]
        pub fn plural(&self) -> &'static str {
            match self {
                Self::Repository => "repositories",
                Self::Remote => "remotes",
                Self::Distribution => "distributions",
                Self::Publication => "publications",
                Self::Package => "packages",
            }
        }
    }

    /// Endpoint for users, relative to the API root
    pub const USERS_ENDPOINT: &str = "users/";
    /// Endpoint for tasks, relative to the API root
    pub const TASKS_ENDPOINT: &str = "tasks/";
    /// Endpoint for the status report, relative to the API root
    pub const STATUS_ENDPOINT: &str = "status/";

    // =========================================================================
    // Pagination
    // =========================================================================

    /// A window over a server-side collection
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct PageRequest {
        /// Index of the first item; always a multiple of `limit`
        pub offset: u64,
        /// Page size
        pub limit: u64,
        /// Opaque ordering key, empty for the backend default
        pub ordering: String,
    }

    impl PageRequest {
        /// Request for the zero-indexed `page` at a fixed page size.
        ///
        /// `None` when the offset does not fit in a `u64`.
        #[must_use]
        pub fn for_page(page: u64, page_size: u64, ordering: impl Into<String>) -> Option<Self> {
            Some(Self {
                offset: page.checked_mul(page_size)?,
                limit: page_size,
                ordering: ordering.into(),
            })
        }

        /// Zero-indexed page this request addresses
        #[must_use]
        pub fn page(&self) -> u64 {
            if self.limit == 0 {
                0
            } else {
                self.offset / self.limit
            }
        }

        /// Query parameters for a list endpoint
        #[must_use]
        pub fn query(&self) -> Vec<(&'static str, String)> {
            let mut query = vec![
                ("limit", self.limit.to_string()),
                ("offset", self.offset.to_string()),
            ];
            if !self.ordering.is_empty() {
                query.push(("ordering", self.ordering.clone()));
            }
            query
        }
    }

    /// One page of a list endpoint (`{ count, next, previous, results }`)
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Page<T> {
        /// Total items in the collection, authoritative for pagination
        #[serde(rename = "count")]
        pub total_count: u64,
        /// Link to the next page
        #[serde(default)]
        pub next: Option<String>,
        /// Link to the previous page
        #[serde(default)]
        pub previous: Option<String>,
        /// Items on this page
        #[serde(rename = "results")]
        pub items: Vec<T>,
    }

    impl<T> Page<T> {
        /// Build a page without links
        #[must_use]
        pub fn new(items: Vec<T>, total_count: u64) -> Self {
            Self {
                total_count,
                next: None,
                previous: None,
                items,
            }
        }
    }

    impl<T> Default for Page<T> {
        fn default() -> Self {
            Self::new(Vec::new(), 0)
        }
    }

    /// Number of pages needed for `total_count` items
    #[must_use]
    pub fn total_pages(total_count: u64, page_size: u64) -> u64 {
        if page_size == 0 {
            return 0;
        }
        total_count.div_ceil(page_size)
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// A content repository
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Repository {
        /// Resource href
        pub pulp_href: String,
        /// Unique name
        pub name: String,
        /// Free-form description
        #[serde(default)]
        pub description: Option<String>,
        /// Labels
        #[serde(default)]
        pub pulp_labels: BTreeMap<String, String>,
        /// Href of the newest repository version
        #[serde(default)]
        pub latest_version_href: Option<String>,
        /// Number of versions kept, `None` for unlimited
        #[serde(default)]
        pub retain_repo_versions: Option<u64>,
        /// Default remote used for syncing
        #[serde(default)]
        pub remote: Option<String>,
        /// Creation time
        #[serde(default)]
        pub pulp_created: Option<DateTime<Utc>>,
    }

    /// An upstream source that repositories sync from
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Remote {
        /// Resource href
        pub pulp_href: String,
        /// Unique name
        pub name: String,
        /// Upstream URL
        pub url: String,
        /// Download policy (immediate, on_demand, streamed)
        #[serde(default)]
        pub policy: Option<String>,
        /// Whether TLS peers are verified
        #[serde(default)]
        pub tls_validation: Option<bool>,
        /// Extra request headers, one single-entry object per header
        #[serde(default)]
        pub headers: Option<Vec<BTreeMap<String, String>>>,
        /// Labels
        #[serde(default)]
        pub pulp_labels: BTreeMap<String, String>,
        /// Creation time
        #[serde(default)]
        pub pulp_created: Option<DateTime<Utc>>,
    }

    /// A served base path
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Distribution {
        /// Resource href
        pub pulp_href: String,
        /// Unique name
        pub name: String,
        /// Path under the content app
        pub base_path: String,
        /// Full URL clients download from
        #[serde(default)]
        pub base_url: Option<String>,
        /// Repository served (latest version)
        #[serde(default)]
        pub repository: Option<String>,
        /// Publication served
        #[serde(default)]
        pub publication: Option<String>,
        /// Labels
        #[serde(default)]
        pub pulp_labels: BTreeMap<String, String>,
        /// Creation time
        #[serde(default)]
        pub pulp_created: Option<DateTime<Utc>>,
    }

    /// Published metadata for one repository version
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Publication {
        /// Resource href
        pub pulp_href: String,
        /// Repository the version belongs to
        #[serde(default)]
        pub repository: Option<String>,
        /// Repository version published
        #[serde(default)]
        pub repository_version: Option<String>,
        /// Creation time
        #[serde(default)]
        pub pulp_created: Option<DateTime<Utc>>,
    }

    /// A content unit; its fields depend on the plugin
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Package {
        /// Resource href
        pub pulp_href: String,
        /// Creation time
        #[serde(default)]
        pub pulp_created: Option<DateTime<Utc>>,
        /// Plugin-specific fields
        #[serde(flatten)]
        pub fields: serde_json::Map<String, Value>,
    }

    impl Package {
        fn field(&self, keys: &[&str]) -> Option<&str> {
            keys.iter()
                .find_map(|k| self.fields.get(*k).and_then(Value::as_str))
        }

        /// Best display name across plugins
        #[must_use]
        pub fn display_name(&self) -> &str {
            self.field(&["name", "package", "relative_path", "digest"])
                .unwrap_or(&self.pulp_href)
        }

        /// Version string (`version-release` for RPM)
        #[must_use]
        pub fn display_version(&self) -> String {
            match (self.field(&["version"]), self.field(&["release"])) {
                (Some(v), Some(r)) => format!("{v}-{r}"),
                (Some(v), None) => v.to_string(),
                _ => "-".to_string(),
            }
        }

        /// Architecture, or media type for container manifests
        #[must_use]
        pub fn display_arch(&self) -> &str {
            self.field(&["arch", "architecture", "media_type"])
                .unwrap_or("-")
        }
    }

    /// A console user
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct User {
        /// Resource href
        pub pulp_href: String,
        /// Numeric id
        #[serde(default)]
        pub id: Option<u64>,
        /// Login name
        pub username: String,
        /// Given name
        #[serde(default)]
        pub first_name: String,
        /// Family name
        #[serde(default)]
        pub last_name: String,
        /// Email address
        #[serde(default)]
        pub email: String,
        /// Administrator flag
        #[serde(default)]
        pub is_staff: bool,
        /// Whether the account can log in
        #[serde(default)]
        pub is_active: bool,
        /// Account creation time
        #[serde(default)]
        pub date_joined: Option<DateTime<Utc>>,
    }

    /// Lifecycle state of a backend task
    #[derive(
        Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
    )]
    #[serde(rename_all = "lowercase")]
    pub enum TaskState {
        /// Queued
        Waiting,
        /// Dropped before running
        Skipped,
        /// Executing on a worker
        Running,
        /// Finished successfully
        Completed,
        /// Finished with an error
        Failed,
        /// Cancelled
        Canceled,
        /// Cancellation requested
        Canceling,
    }

    impl TaskState {
        /// Wire name of the state
        #[must_use]
        pub fn code(&self) -> &'static str {
            match self {
                Self::Waiting => "waiting",
                Self::Skipped => "skipped",
                Self::Running => "running",
                Self::Completed => "completed",
                Self::Failed => "failed",
                Self::Canceled => "canceled",
                Self::Canceling => "canceling",
            }
        }

        /// Whether the task will not change state again
        #[must_use]
        pub fn is_final(&self) -> bool {
            matches!(
                self,
                Self::Skipped | Self::Completed | Self::Failed | Self::Canceled
            )
        }
    }

    /// An asynchronous backend task
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Task {
        /// Resource href
        pub pulp_href: String,
        /// Task function name
        pub name: String,
        /// Current state
        pub state: TaskState,
        /// Queue time
        #[serde(default)]
        pub pulp_created: Option<DateTime<Utc>>,
        /// Start time
        #[serde(default)]
        pub started_at: Option<DateTime<Utc>>,
        /// Finish time
        #[serde(default)]
        pub finished_at: Option<DateTime<Utc>>,
        /// Error description for failed tasks
        #[serde(default)]
        pub error: Option<Value>,
        /// Hrefs of resources the task created
        #[serde(default)]
        pub created_resources: Vec<String>,
        /// Worker running the task
        #[serde(default)]
        pub worker: Option<String>,
        /// Correlation id shared with the request that spawned it
        #[serde(default)]
        pub logging_cid: Option<String>,
    }

    impl Task {
        /// Human-readable description of the task error, if any
        #[must_use]
        pub fn error_description(&self) -> Option<String> {
            let error = self.error.as_ref()?;
            match error.get("description").and_then(Value::as_str) {
                Some(description) => Some(description.to_string()),
                None if error.is_null() => None,
                None => Some(error.to_string()),
            }
        }
    }

    /// Response body of an endpoint that dispatched a task
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AsyncOperation {
        /// Href of the dispatched task
        pub task: String,
    }

    /// Installed component version
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ComponentVersion {
        /// Component name
        pub component: String,
        /// Version string
        pub version: String,
        /// Python package providing it
        #[serde(default)]
        pub package: Option<String>,
    }

    /// An online worker or app process
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Worker {
        /// Process name
        pub name: String,
        /// Last heartbeat
        #[serde(default)]
        pub last_heartbeat: Option<DateTime<Utc>>,
        /// Task currently being executed
        #[serde(default)]
        pub current_task: Option<String>,
    }

    /// Connectivity of a backing service
    #[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
    pub struct Connection {
        /// Whether the service answered
        pub connected: bool,
    }

    /// Artifact storage usage in bytes
    #[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
    pub struct Storage {
        /// Capacity
        #[serde(default)]
        pub total: Option<u64>,
        /// Used space
        #[serde(default)]
        pub used: Option<u64>,
        /// Free space
        #[serde(default)]
        pub free: Option<u64>,
    }

    /// Backend status report
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Status {
        /// Installed components
        #[serde(default)]
        pub versions: Vec<ComponentVersion>,
        /// Task workers
        #[serde(default)]
        pub online_workers: Vec<Worker>,
        /// Content serving apps
        #[serde(default)]
        pub online_content_apps: Vec<Worker>,
        /// Database connectivity
        #[serde(default)]
        pub database_connection: Option<Connection>,
        /// Redis connectivity
        #[serde(default)]
        pub redis_connection: Option<Connection>,
        /// Artifact storage
        #[serde(default)]
        pub storage: Option<Storage>,
    }

    // =========================================================================
    // Table rendering
    // =========================================================================

    /// A resource that list screens can render as a table row
    pub trait Listable {
        /// Column headers
        const COLUMNS: &'static [&'static str];
        /// Ordering keys offered by sort controls; `""` is the backend default
        const ORDERINGS: &'static [&'static str];

        /// Cell values, one per column
        fn cells(&self) -> Vec<String>;
    }

    fn time_cell(time: Option<&DateTime<Utc>>) -> String {
        time.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
    }

    fn opt_cell(value: Option<&String>) -> String {
        value.cloned().unwrap_or_else(|| "-".to_string())
    }

    impl Listable for Repository {
        const COLUMNS: &'static [&'static str] = &["NAME", "DESCRIPTION", "LATEST VERSION", "CREATED"];
        const ORDERINGS: &'static [&'static str] = &["", "name", "-name", "-pulp_created"];

        fn cells(&self) -> Vec<String> {
            vec![
                self.name.clone(),
                opt_cell(self.description.as_ref()),
                opt_cell(self.latest_version_href.as_ref()),
                time_cell(self.pulp_created.as_ref()),
            ]
        }
    }

    impl Listable for Remote {
        const COLUMNS: &'static [&'static str] = &["NAME", "URL", "POLICY", "CREATED"];
        const ORDERINGS: &'static [&'static str] = &["", "name", "-name", "-pulp_created"];

        fn cells(&self) -> Vec<String> {
            vec![
                self.name.clone(),
                self.url.clone(),
                opt_cell(self.policy.as_ref()),
                time_cell(self.pulp_created.as_ref()),
            ]
        }
    }

    impl Listable for Distribution {
        const COLUMNS: &'static [&'static str] = &["NAME", "BASE PATH", "SERVES", "CREATED"];
        const ORDERINGS: &'static [&'static str] = &["", "name", "-name", "base_path", "-pulp_created"];

        fn cells(&self) -> Vec<String> {
            let serves = self
                .publication
                .as_ref()
                .or(self.repository.as_ref());
            vec![
                self.name.clone(),
                self.base_path.clone(),
                opt_cell(serves),
                time_cell(self.pulp_created.as_ref()),
            ]
        }
    }

    impl Listable for Publication {
        const COLUMNS: &'static [&'static str] = &["HREF", "REPOSITORY VERSION", "CREATED"];
        const ORDERINGS: &'static [&'static str] = &["", "-pulp_created", "pulp_created"];

        fn cells(&self) -> Vec<String> {
            vec![
                self.pulp_href.clone(),
                opt_cell(self.repository_version.as_ref()),
                time_cell(self.pulp_created.as_ref()),
            ]
        }
    }

    impl Listable for Package {
        const COLUMNS: &'static [&'static str] = &["NAME", "VERSION", "ARCH/TYPE", "CREATED"];
        const ORDERINGS: &'static [&'static str] = &["", "-pulp_created", "pulp_created"];

        fn cells(&self) -> Vec<String> {
            vec![
                self.display_name().to_string(),
                self.display_version(),
                self.display_arch().to_string(),
                time_cell(self.pulp_created.as_ref()),
            ]
        }
    }

    impl Listable for User {
        const COLUMNS: &'static [&'static str] = &["USERNAME", "NAME", "EMAIL", "STAFF", "ACTIVE"];
        const ORDERINGS: &'static [&'static str] = &["", "username", "-username", "-date_joined"];

        fn cells(&self) -> Vec<String> {
            let full_name = format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string();
            vec![
                self.username.clone(),
                if full_name.is_empty() { "-".to_string() } else { full_name },
                if self.email.is_empty() { "-".to_string() } else { self.email.clone() },
                if self.is_staff { "yes" } else { "no" }.to_string(),
                if self.is_active { "yes" } else { "no" }.to_string(),
            ]
        }
    }

    impl Listable for Task {
        const COLUMNS: &'static [&'static str] = &["NAME", "STATE", "STARTED", "FINISHED", "HREF"];
        const ORDERINGS: &'static [&'static str] = &["", "-pulp_created", "pulp_created", "state"];

        fn cells(&self) -> Vec<String> {
            vec![
                self.name.clone(),
                self.state.code().to_string(),
                time_cell(self.started_at.as_ref()),
                time_cell(self.finished_at.as_ref()),
                self.pulp_href.clone(),
            ]
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
