use crate::config::types::{Config, ProfilesConfig, ScheduleConfig, SourceConfig, UserAgentConfig};
use crate::model::MAX_POSTS;
use crate::ConfigError;
use url::Url;

/// Upper bound for concurrent profile fetches
const MAX_PROFILE_CONCURRENCY: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_schedule_config(&config.schedule)?;
    validate_profiles_config(&config.profiles)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates the listing source
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.max_posts < 1 || config.max_posts > MAX_POSTS {
        return Err(ConfigError::Validation(format!(
            "max_posts must be between 1 and {}, got {}",
            MAX_POSTS, config.max_posts
        )));
    }

    Ok(())
}

/// Validates refresh timing
///
/// The fetch guard must be strictly shorter than the tick so a regular tick is
/// never throttled.
fn validate_schedule_config(config: &ScheduleConfig) -> Result<(), ConfigError> {
    if config.tick_interval_secs < 1 {
        return Err(ConfigError::Validation(
            "tick_interval_secs must be >= 1".to_string(),
        ));
    }

    if config.min_fetch_interval_secs >= config.tick_interval_secs {
        return Err(ConfigError::Validation(format!(
            "min_fetch_interval_secs ({}) must be shorter than tick_interval_secs ({})",
            config.min_fetch_interval_secs, config.tick_interval_secs
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "fetch_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_profiles_config(config: &ProfilesConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 || config.max_concurrent > MAX_PROFILE_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "profiles max_concurrent must be between 1 and {}, got {}",
            MAX_PROFILE_CONCURRENCY, config.max_concurrent
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}
