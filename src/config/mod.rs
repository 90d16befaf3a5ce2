//! Configuration module for hn-glance
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing keys fall back to the values used against
//! the live site (10 minute refresh, 9 minute fetch guard).
//!
//! # Example
//!
//! ```no_run
//! use hn_glance::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("hn-glance.toml")).unwrap();
//! println!("Refreshing every {}s", config.schedule.tick_interval_secs);
//! ```

mod parser;
mod types;
pub mod validation;

// Re-export types
pub use types::{Config, ProfilesConfig, ScheduleConfig, SourceConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
