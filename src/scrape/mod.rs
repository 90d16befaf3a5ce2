//! Scrape-and-parse pipeline
//!
//! This module contains:
//! - HTTP fetching of raw HTML with bounded timeouts
//! - Front page parsing into ranked posts
//! - Profile page parsing into users
//! - The refresh cycle that ties them together and publishes snapshots

pub mod extract;
mod fetcher;
mod html;
mod listing;
mod orchestrator;
mod profile;

pub use fetcher::{build_http_client, Fetcher};
pub use html::ParseError;
pub use listing::{parse_listing, parse_listing_at, parse_row, SkipReason};
pub use orchestrator::{CycleReport, CycleStage, Orchestrator};
pub use profile::{parse_profile, parse_profile_at};
