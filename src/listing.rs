// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Paginated list controller
//!
//! A [`ListController`] decides *when* a list screen refetches and with
//! which parameters; rendering is left to whoever subscribes to its state.
//! Refetches happen on an explicit trigger set ([`Trigger`]) and each fetch
//! carries a generation token. A fetch only commits if its token is still
//! the newest one when it resolves, so overlapping and late fetches are
//! dropped on arrival. Nothing is cancelled at the network level.

use crate::types::{total_pages, Page, PageRequest};
use crate::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Anything that can produce one page of `T` for a request
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch the page addressed by `request`
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>>;
}

#[async_trait]
impl<T, F, Fut> PageSource<T> for F
where
    F: Fn(PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>>> + Send + 'static,
    T: Send + 'static,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>> {
        (self)(request).await
    }
}

/// Why a fetch was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Initial load
    Start,
    /// Page index changed
    Page,
    /// Ordering changed (page reset to 0)
    Ordering,
    /// Explicit refresh with unchanged parameters
    Refresh,
}

/// Handle of a spawned fetch; resolves once the result is committed or discarded
pub type FetchTask = JoinHandle<()>;

/// Construction-time configuration of a controller
pub struct ListConfig<T> {
    /// Fetch function
    pub source: Arc<dyn PageSource<T>>,
    /// Fixed page size
    pub page_size: u64,
    /// Message stored in [`ListState::error`] when a fetch fails
    pub error_message: String,
    /// Ordering used by the initial fetch
    pub initial_ordering: String,
}

impl<T> ListConfig<T> {
    /// Configuration with the backend's default ordering
    pub fn new(
        source: impl PageSource<T> + 'static,
        page_size: u64,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            source: Arc::new(source),
            page_size: page_size.max(1),
            error_message: error_message.into(),
            initial_ordering: String::new(),
        }
    }

    /// Use `ordering` for the initial fetch
    #[must_use]
    pub fn with_ordering(mut self, ordering: impl Into<String>) -> Self {
        self.initial_ordering = ordering.into();
        self
    }
}

/// Observable state of a list screen
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    /// Items of the last successful fetch
    pub items: Vec<T>,
    /// A fetch is in flight
    pub loading: bool,
    /// Set when the newest fetch failed; previous items stay visible
    pub error: Option<String>,
    /// Zero-indexed page
    pub page: u64,
    /// Total items reported by the last successful fetch
    pub total_count: u64,
    /// Current ordering key
    pub ordering: String,
    /// Bumped by every refresh
    pub refresh_token: u64,
    generation: u64,
    disposed: bool,
}

impl<T> ListState<T> {
    fn new(ordering: String) -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            page: 0,
            total_count: 0,
            ordering,
            refresh_token: 0,
            generation: 0,
            disposed: false,
        }
    }

    /// Token of the newest fetch
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of pages at `page_size`
    #[must_use]
    pub fn total_pages(&self, page_size: u64) -> u64 {
        total_pages(self.total_count, page_size)
    }
}

struct Shared<T> {
    state: watch::Sender<ListState<T>>,
    source: Mutex<Arc<dyn PageSource<T>>>,
    page_size: u64,
    error_message: String,
}

impl<T> Shared<T> {
    fn current_source(&self) -> Arc<dyn PageSource<T>> {
        Arc::clone(&self.source.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Apply a fetch outcome if it is still the newest one
    fn commit(&self, generation: u64, result: Result<Page<T>>) {
        self.state.send_if_modified(|state| {
            if state.disposed || state.generation != generation {
                trace!(generation, current = state.generation, "discarding stale page");
                return false;
            }
            match result {
                Ok(page) => {
                    state.items = page.items;
                    state.total_count = page.total_count;
                    state.error = None;
                }
                Err(err) => {
                    warn!(error = %err, page = state.page, "page fetch failed");
                    state.error = Some(self.error_message.clone());
                }
            }
            state.loading = false;
            true
        });
    }
}

/// Drives the fetches behind one list screen
///
/// Owned by a single view. Dropping it disposes it.
pub struct ListController<T> {
    shared: Arc<Shared<T>>,
}

impl<T> ListController<T> {
    /// Fixed page size
    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.shared.page_size
    }

    /// Replace the fetch function used by subsequent fetches.
    ///
    /// Does not fetch by itself.
    pub fn set_source(&self, source: impl PageSource<T> + 'static) {
        *self.shared.source.lock().unwrap_or_else(PoisonError::into_inner) = Arc::new(source);
    }

    /// Stop committing results; in-flight fetches resolve as no-ops
    pub fn dispose(&self) {
        self.shared.state.send_if_modified(|state| {
            if !state.disposed {
                debug!(generation = state.generation, "disposing list controller");
                state.disposed = true;
                state.generation += 1;
            }
            false
        });
    }

    /// Whether [`dispose`](Self::dispose) has run
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.state.borrow().disposed
    }

    /// Receiver notified on every committed change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.shared.state.subscribe()
    }
}

impl<T: Send + Sync + 'static> ListController<T> {
    /// Create an idle controller; call [`start`](Self::start) for the first fetch
    #[must_use]
    pub fn new(config: ListConfig<T>) -> Self {
        let (state, _) = watch::channel(ListState::new(config.initial_ordering));
        Self {
            shared: Arc::new(Shared {
                state,
                source: Mutex::new(config.source),
                page_size: config.page_size.max(1),
                error_message: config.error_message,
            }),
        }
    }

    /// Fetch the first page with the initial ordering
    pub fn start(&self) -> Option<FetchTask> {
        self.trigger(Trigger::Start, None, None)
    }

    /// Move to `page`; bounds are the caller's business.
    ///
    /// A page whose offset overflows is refused and leaves the state untouched.
    pub fn change_page(&self, page: u64) -> Option<FetchTask> {
        self.trigger(Trigger::Page, Some(page), None)
    }

    /// Change the ordering and go back to the first page
    pub fn change_ordering(&self, ordering: impl Into<String>) -> Option<FetchTask> {
        self.trigger(Trigger::Ordering, Some(0), Some(ordering.into()))
    }

    /// Refetch the current page with the current ordering
    pub fn refresh(&self) -> Option<FetchTask> {
        self.trigger(Trigger::Refresh, None, None)
    }

    fn trigger(
        &self,
        trigger: Trigger,
        page: Option<u64>,
        ordering: Option<String>,
    ) -> Option<FetchTask> {
        let page_size = self.shared.page_size;
        let mut issued = None;
        self.shared.state.send_if_modified(|state| {
            if state.disposed {
                trace!(?trigger, "ignoring trigger on disposed controller");
                return false;
            }
            let page = page.unwrap_or(state.page);
            let ordering = ordering.unwrap_or_else(|| state.ordering.clone());
            let Some(request) = PageRequest::for_page(page, page_size, ordering.as_str()) else {
                warn!(?trigger, page, page_size, "page offset overflows, ignoring trigger");
                return false;
            };

            state.page = page;
            state.ordering = ordering;
            if trigger == Trigger::Refresh {
                state.refresh_token += 1;
            }
            state.loading = true;
            state.generation += 1;
            issued = Some((state.generation, request));
            true
        });

        let (generation, request) = issued?;

        debug!(
            ?trigger,
            offset = request.offset,
            ordering = %request.ordering,
            generation,
            "fetching page"
        );

        let source = self.shared.current_source();
        let shared = Arc::clone(&self.shared);
        Some(tokio::spawn(async move {
            let result = source.fetch_page(request).await;
            shared.commit(generation, result);
        }))
    }
}

impl<T: Clone + Send + Sync + 'static> ListController<T> {
    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> ListState<T> {
        self.shared.state.borrow().clone()
    }
}

impl<T> Drop for ListController<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}
