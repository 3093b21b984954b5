// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP page fetching with a bounded timeout
//!
//! Resolvers only see the [`PageFetcher`] trait; [`HttpFetcher`] is the
//! reqwest-backed implementation used by the server and CLI.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::config::SourceConfig;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("accept-language", "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("referer", "https://google.com.br/"),
];

/// A fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status (always a success status)
    pub status: u16,
    /// Response body as text
    pub body: String,
}

/// Fetch failure: network error, non-success status or timeout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Request timed out
    #[error("timeout fetching {url}")]
    Timeout {
        /// Requested URL
        url: String,
    },

    /// Transport-level failure
    #[error("HTTP error for {url}: {message}")]
    Http {
        /// Requested URL
        url: String,
        /// Client message
        message: String,
    },

    /// Non-success status
    #[error("HTTP {status} for {url}")]
    Status {
        /// Status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Capability to GET a URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`, failing on transport errors, timeouts and non-2xx
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// reqwest-backed fetcher with browser-like headers
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build the client for a source
    pub fn new(config: &SourceConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        for (name, value) in BROWSER_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        let origin = config.base_url.trim_end_matches('/');
        if let Ok(value) = HeaderValue::from_str(origin) {
            headers.insert(reqwest::header::ORIGIN, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(FetchedPage {
            status: status.as_u16(),
            body,
        })
    }
}
