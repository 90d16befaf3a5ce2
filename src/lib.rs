//! hn-glance: a glanceable Hacker News front page
//!
//! This crate periodically scrapes the Hacker News front page and the profile
//! pages of the authors it lists, and keeps a small rank-ordered snapshot that a
//! display layer can read at any time.

pub mod config;
pub mod display;
pub mod links;
pub mod model;
pub mod scrape;
pub mod state;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Main error type for hn-glance operations
#[derive(Debug, Error)]
pub enum GlanceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch throttled: last fetch at {last_fetch}, next allowed at {retry_at}")]
    Throttled {
        last_fetch: DateTime<Utc>,
        retry_at: DateTime<Utc>,
    },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Document parse error for {url}: {message}")]
    DocumentParse { url: String, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl GlanceError {
    /// Whether this error only means the cycle was skipped by the rate limiter
    pub fn is_throttled(&self) -> bool {
        matches!(self, GlanceError::Throttled { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for hn-glance operations
pub type Result<T> = std::result::Result<T, GlanceError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Post, Snapshot, User};
pub use scrape::{parse_listing, parse_profile, Orchestrator};
pub use state::{RateLimiter, SnapshotStore};
