// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Library error type

/// Errors raised by the REST client and list sources
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure (connection refused, timeout, TLS)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body did not match the expected shape
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A base URL or resource path could not be turned into a URL
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    /// A backend task finished unsuccessfully
    #[error("task {href} {state}: {message}")]
    TaskFailed {
        /// Task href
        href: String,
        /// Final state code
        state: String,
        /// Error description reported by the backend
        message: String,
    },

    /// A backend task did not finish in time
    #[error("timed out waiting for task {0}")]
    TaskTimeout(String),
}

impl Error {
    /// Check if this error is a 404 from the backend
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Result alias for library operations
pub type Result<T> = std::result::Result<T, Error>;
