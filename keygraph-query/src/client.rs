// Copyright 2025 Keygraph Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! HTTP client for the remote query service.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the remote query service.
#[derive(Debug, Error)]
pub enum SparqlError {
    #[error("endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Posts query text to a single configured endpoint and hands back the
/// tab-separated response body. One instance is shared across requests;
/// the underlying connection pool handles concurrency.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    endpoint: String,
    client: reqwest::Client,
}

impl SparqlClient {
    /// Build a client for `endpoint` with a bounded per-request timeout, so
    /// a stalled store cannot pin request handlers indefinitely.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, SparqlError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one SELECT query, asking for tab-separated rows back. Non-2xx
    /// answers surface as [`SparqlError::Status`] with the body text kept
    /// for logging.
    pub async fn select(&self, query: &str) -> Result<String, SparqlError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "text/tab-separated-values")
            .header("Content-Type", "application/sparql-query")
            .body(query.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SparqlError::Status { status, body });
        }

        Ok(response.text().await?)
    }
}
