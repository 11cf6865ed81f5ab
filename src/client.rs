// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! REST client for the content-repository API

use crate::config::Config;
use crate::fields::normalize_resource_reference;
use crate::listing::PageSource;
use crate::types::{
    AsyncOperation, Page, PageRequest, Status, Task, TaskState, STATUS_ENDPOINT,
};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, info};

/// Thin JSON client bound to one backend
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_root: String,
    username: String,
    password: Option<String>,
    task_poll: Duration,
    task_timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_root", &self.api_root)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let base_url =
            Url::parse(&config.base_url).map_err(|_| Error::InvalidUrl(config.base_url.clone()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("pulp-console/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_root = format!("/{}/", config.api_root.trim_matches('/'));

        Ok(Self {
            http,
            base_url,
            api_root,
            username: config.username.clone(),
            password: config.password.clone(),
            task_poll: Duration::from_millis(config.task_poll_ms),
            task_timeout: Duration::from_secs(config.task_timeout_secs),
        })
    }

    /// API path prefix, with leading and trailing slash
    #[must_use]
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Resolve an API-relative path, an absolute path, or an absolute href
    pub fn url(&self, reference: &str) -> Result<Url> {
        let path = normalize_resource_reference(reference);
        if path.starts_with("http://") || path.starts_with("https://") {
            return Err(Error::InvalidUrl(reference.to_string()));
        }
        let path = if path.starts_with('/') {
            path
        } else {
            format!("{}{}", self.api_root, path)
        };
        self.base_url
            .join(&path)
            .map_err(|_| Error::InvalidUrl(reference.to_string()))
    }

    fn request(&self, method: Method, reference: &str) -> Result<RequestBuilder> {
        let url = self.url(reference)?;
        debug!(%method, %url, "request");
        let builder = self.http.request(method, url);
        Ok(match &self.password {
            Some(password) => builder.basic_auth(&self.username, Some(password)),
            None => builder,
        })
    }

    async fn send(builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), %body, "request rejected");
            Err(Error::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET a single resource
    pub async fn get<T: DeserializeOwned>(&self, reference: &str) -> Result<T> {
        let response = Self::send(self.request(Method::GET, reference)?).await?;
        Self::decode(response).await
    }

    /// GET one page of a collection
    pub async fn list<T: DeserializeOwned>(
        &self,
        reference: &str,
        request: &PageRequest,
    ) -> Result<Page<T>> {
        self.list_filtered(reference, request, &[]).await
    }

    /// GET one page of a collection with extra filter parameters
    pub async fn list_filtered<T: DeserializeOwned>(
        &self,
        reference: &str,
        request: &PageRequest,
        filters: &[(String, String)],
    ) -> Result<Page<T>> {
        let builder = self
            .request(Method::GET, reference)?
            .query(&request.query())
            .query(filters);
        let response = Self::send(builder).await?;
        Self::decode(response).await
    }

    async fn send_json<B, T>(&self, method: Method, reference: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method, reference)?.json(body);
        let response = Self::send(builder).await?;
        Self::decode(response).await
    }

    /// POST a new resource (or an action such as sync)
    pub async fn post<B, T>(&self, reference: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, reference, body).await
    }

    /// PUT a full replacement
    pub async fn put<B, T>(&self, reference: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, reference, body).await
    }

    /// PATCH selected fields
    pub async fn patch<B, T>(&self, reference: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PATCH, reference, body).await
    }

    /// DELETE a resource; returns the dispatched task when deletion is asynchronous
    pub async fn delete(&self, reference: &str) -> Result<Option<AsyncOperation>> {
        let response = Self::send(self.request(Method::DELETE, reference)?).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Backend status report
    pub async fn status(&self) -> Result<Status> {
        self.get(STATUS_ENDPOINT).await
    }

    /// Fetch a task by href
    pub async fn task(&self, href: &str) -> Result<Task> {
        self.get(href).await
    }

    /// Request cancellation of a running or waiting task
    pub async fn cancel_task(&self, href: &str) -> Result<Task> {
        info!(task = href, "cancelling task");
        self.patch(href, &serde_json::json!({ "state": "canceled" }))
            .await
    }

    /// Poll a task until it reaches a final state.
    ///
    /// Completed and skipped tasks are returned; failed and canceled ones
    /// become [`Error::TaskFailed`].
    pub async fn wait_for_task(&self, href: &str) -> Result<Task> {
        let deadline = tokio::time::Instant::now() + self.task_timeout;
        loop {
            let task = self.task(href).await?;
            debug!(task = href, state = task.state.code(), "polled task");

            if task.state.is_final() {
                return match task.state {
                    TaskState::Failed | TaskState::Canceled => Err(Error::TaskFailed {
                        href: href.to_string(),
                        state: task.state.code().to_string(),
                        message: task
                            .error_description()
                            .unwrap_or_else(|| "no error reported".to_string()),
                    }),
                    _ => Ok(task),
                };
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::TaskTimeout(href.to_string()));
            }
            tokio::time::sleep(self.task_poll).await;
        }
    }

    /// Page source over a collection endpoint, for a list controller
    #[must_use]
    pub fn page_source<T>(&self, reference: impl Into<String>) -> EndpointSource<T> {
        EndpointSource {
            client: self.clone(),
            reference: reference.into(),
            filters: Vec::new(),
            _item: PhantomData,
        }
    }
}

/// Adapter from `(offset, ordering)` requests to one collection endpoint
#[derive(Debug, Clone)]
pub struct EndpointSource<T> {
    client: ApiClient,
    reference: String,
    filters: Vec<(String, String)>,
    _item: PhantomData<fn() -> T>,
}

impl<T> EndpointSource<T> {
    /// Add a filter query parameter sent with every page request
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl<T> PageSource<T> for EndpointSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>> {
        self.client
            .list_filtered(&self.reference, &request, &self.filters)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str, api_root: &str) -> ApiClient {
        ApiClient::new(&Config {
            base_url: base_url.into(),
            api_root: api_root.into(),
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_resolution() {
        let client = client("http://localhost:8080", "/pulp/api/v3/");
        assert_eq!(
            client.url("repositories/rpm/rpm/").unwrap().as_str(),
            "http://localhost:8080/pulp/api/v3/repositories/rpm/rpm/"
        );
        assert_eq!(
            client.url("/pulp/api/v3/tasks/1/").unwrap().as_str(),
            "http://localhost:8080/pulp/api/v3/tasks/1/"
        );
        assert_eq!(
            client
                .url("https://elsewhere.example:9000/pulp/api/v3/tasks/1/?x=1")
                .unwrap()
                .as_str(),
            "http://localhost:8080/pulp/api/v3/tasks/1/"
        );
    }

    #[test]
    fn test_api_root_is_normalized() {
        assert_eq!(client("http://h", "pulp/api/v3").api_root(), "/pulp/api/v3/");
        assert_eq!(client("http://h", "/api/").api_root(), "/api/");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::new(&Config {
            base_url: "not a url".into(),
            ..Config::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_malformed_href_is_rejected() {
        let client = client("http://localhost:8080", "/pulp/api/v3/");
        assert!(matches!(client.url("https://"), Err(Error::InvalidUrl(_))));
    }
}
