use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for hn-glance
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub profiles: ProfilesConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Where the listing and profile pages come from
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Front page URL; profile URLs are resolved against it
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Number of posts kept in a snapshot (at most 10)
    #[serde(rename = "max-posts", default = "default_max_posts")]
    pub max_posts: usize,
}

/// Refresh cycle timing
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Period of the refresh loop (seconds)
    #[serde(rename = "tick-interval-secs", default = "default_tick_interval")]
    pub tick_interval_secs: u64,

    /// Minimum time between two listing fetches (seconds)
    #[serde(rename = "min-fetch-interval-secs", default = "default_min_fetch_interval")]
    pub min_fetch_interval_secs: u64,

    /// Upper bound for a single HTTP fetch (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

/// Author profile refresh settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilesConfig {
    /// Whether author profiles are fetched at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of profile fetches in flight
    #[serde(rename = "max-concurrent", default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the client
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,
}

impl ScheduleConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn min_fetch_interval(&self) -> Duration {
        Duration::from_secs(self.min_fetch_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl UserAgentConfig {
    /// Format: Name/Version (+ContactURL)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_posts: default_max_posts(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            min_fetch_interval_secs: default_min_fetch_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://news.ycombinator.com/".to_string()
}

fn default_max_posts() -> usize {
    crate::model::MAX_POSTS
}

fn default_tick_interval() -> u64 {
    10 * 60
}

fn default_min_fetch_interval() -> u64 {
    9 * 60
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent() -> usize {
    4
}

fn default_crawler_name() -> String {
    "hn-glance".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://github.com/hn-glance/hn-glance".to_string()
}
