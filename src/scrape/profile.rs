//! Profile page parser
//!
//! The profile table starts with a `tr.athing` row (the handle). The row after
//! it reads `created:<date>` and the one after that reads `karma:<n>`.

use crate::model::User;
use crate::scrape::extract::{parse_karma, strip_created_label};
use crate::scrape::html::{next_element, text_of, ParseError};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".athing").unwrap());

/// Parses a profile page for `username`
///
/// A page normally yields exactly one user. The result is ordered most recent
/// capture first.
pub fn parse_profile(username: &str, html: &str) -> Result<Vec<User>, ParseError> {
    parse_profile_at(username, html, Utc::now())
}

/// Parses a profile page with an explicit capture time
pub fn parse_profile_at(
    username: &str,
    html: &str,
    observed_at: DateTime<Utc>,
) -> Result<Vec<User>, ParseError> {
    // Treated like a failed fetch: the cached user stays.
    if html.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    let document = Html::parse_document(html);

    let mut users: Vec<User> = document
        .select(&ROW)
        .filter_map(|row| {
            let user = parse_profile_row(username, row, observed_at);
            if user.is_none() {
                tracing::debug!("Skipping profile row for {}", username);
            }
            user
        })
        .collect();

    users.sort_by(|a, b| b.observed_at.cmp(&a.observed_at));
    Ok(users)
}

fn parse_profile_row(username: &str, row: ElementRef<'_>, observed_at: DateTime<Utc>) -> Option<User> {
    let created_row = next_element(row)?;
    let created_string = strip_created_label(&text_of(created_row))?;

    let karma_row = next_element(created_row)?;
    let karma = parse_karma(&text_of(karma_row))?;

    Some(User {
        username: username.to_string(),
        karma,
        created_string,
        observed_at,
    })
}
