//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests for listing and profile pages with a per-request timeout
//! - Error classification into transport, timeout and document failures

use crate::config::UserAgentConfig;
use crate::GlanceError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// `timeout` is the default bound for a whole request; [`Fetcher::fetch`] can
/// tighten it per request.
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches raw HTML pages
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from the user agent settings
    pub fn from_config(config: &UserAgentConfig, timeout: Duration) -> Result<Self, GlanceError> {
        Ok(Self::new(build_http_client(config, timeout)?))
    }

    /// GETs `url` and returns the body as text
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Request exceeded `timeout` | `Timeout` |
    /// | Connection refused, DNS, TLS | `Transport` |
    /// | Non-success HTTP status | `Transport` |
    /// | Content-Type present and not HTML | `DocumentParse` |
    /// | Body is not UTF-8 | `DocumentParse` |
    pub async fn fetch(&self, url: &Url, timeout: Duration) -> Result<String, GlanceError> {
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GlanceError::Transport {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        if let Some(content_type) = content_type {
            if !content_type.contains("html") {
                return Err(GlanceError::DocumentParse {
                    url: url.to_string(),
                    message: format!("Expected HTML, got {}", content_type),
                });
            }
        }

        let bytes = response.bytes().await.map_err(|e| classify_error(url, e))?;

        String::from_utf8(bytes.to_vec()).map_err(|e| GlanceError::DocumentParse {
            url: url.to_string(),
            message: format!("Body is not UTF-8: {}", e),
        })
    }
}

/// Maps a reqwest failure onto the crate's error taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> GlanceError {
    if error.is_timeout() {
        GlanceError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        GlanceError::Transport {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        GlanceError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
