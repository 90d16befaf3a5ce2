//! Front page parser
//!
//! Each story on the listing is a `tr.athing` row carrying the id, rank, title
//! and vote link. Points, author, age and comment count sit in the *next* row.
//! Rows are parsed independently: a malformed row is skipped and the rest of
//! the page still comes through.

use crate::model::{Post, MAX_POSTS};
use crate::scrape::extract::{
    auth_token_in, parse_comment_count, parse_points, parse_rank, score_too_short,
};
use crate::scrape::html::{next_element, select_first, select_last, text_of, ParseError};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".athing").unwrap());
static RANK: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".rank").unwrap());
static TITLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".titleline > a, a.storylink").unwrap());
static SITE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".sitestr").unwrap());
static SCORE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".score").unwrap());
static AGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".age").unwrap());
static AUTHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".hnuser").unwrap());
static COMMENTS_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td > a:last-child, .subline > a:last-child").unwrap());

/// Why a listing row was left out of the result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("row has no id attribute")]
    MissingId,

    #[error("row id '{0}' is not a positive integer")]
    InvalidId(String),

    #[error("row has no rank label")]
    MissingRank,

    #[error("rank label '{0}' does not parse")]
    InvalidRank(String),

    #[error("row has no title link")]
    MissingTitle,

    #[error("score label '{0}' is shorter than the points suffix")]
    ScoreTooShort(String),

    #[error("score label '{0}' does not parse")]
    InvalidScore(String),
}

/// Parses the front page, stamping every post with the current time
///
/// # Returns
///
/// * `Ok(Vec<Post>)` - Up to [`MAX_POSTS`] posts ascending by rank; may be empty
/// * `Err(ParseError)` - The body is not a document at all
pub fn parse_listing(html: &str) -> Result<Vec<Post>, ParseError> {
    parse_listing_at(html, Utc::now(), MAX_POSTS)
}

/// Parses the front page with an explicit capture time and post limit
///
/// `limit` is clamped to [`MAX_POSTS`].
pub fn parse_listing_at(
    html: &str,
    observed_at: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Post>, ParseError> {
    // An empty body is a transport-level anomaly, not an empty front page, so
    // it must not replace the published posts.
    if html.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    let document = Html::parse_document(html);

    let mut posts: Vec<Post> = document
        .select(&ROW)
        .filter_map(|row| match parse_row(row, observed_at) {
            Ok(post) => Some(post),
            Err(reason) => {
                tracing::debug!("Skipping listing row: {}", reason);
                None
            }
        })
        .collect();

    // Stable: equal ranks keep document order
    posts.sort_by_key(|post| post.rank);
    posts.truncate(limit.min(MAX_POSTS));

    Ok(posts)
}

/// Extracts one post from a listing row and the metadata row after it
pub fn parse_row(row: ElementRef<'_>, observed_at: DateTime<Utc>) -> Result<Post, SkipReason> {
    let id_attr = row.value().attr("id").ok_or(SkipReason::MissingId)?;
    let id = id_attr
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| SkipReason::InvalidId(id_attr.to_string()))?;

    let rank_text = select_first(row, &RANK)
        .map(text_of)
        .ok_or(SkipReason::MissingRank)?;
    let rank = parse_rank(&rank_text).ok_or(SkipReason::InvalidRank(rank_text))?;

    let title_link = select_first(row, &TITLE_LINK).ok_or(SkipReason::MissingTitle)?;
    let link = title_link
        .value()
        .attr("href")
        .ok_or(SkipReason::MissingTitle)?
        .to_string();
    let title = text_of(title_link).trim().to_string();
    if title.is_empty() {
        return Err(SkipReason::MissingTitle);
    }

    let (auth_hash, can_upvote) = match upvote_token(row, id) {
        Some(token) => (token, true),
        None => (String::new(), false),
    };

    let site_str = trimmed_text(Some(row), &SITE);

    let meta = next_element(row);

    let score_text = meta
        .and_then(|meta| select_first(meta, &SCORE))
        .map(text_of)
        .unwrap_or_default();
    if score_too_short(&score_text) {
        return Err(SkipReason::ScoreTooShort(score_text));
    }
    let points = parse_points(&score_text).ok_or(SkipReason::InvalidScore(score_text))?;

    let timestamp_string = trimmed_text(meta, &AGE);
    let username = trimmed_text(meta, &AUTHOR);

    let comment_count = meta
        .and_then(|meta| select_last(meta, &COMMENTS_LINK))
        .map(|link| parse_comment_count(&text_of(link)))
        .unwrap_or(0);

    Ok(Post {
        id,
        rank,
        link,
        title,
        points,
        comment_count,
        username,
        auth_hash,
        can_upvote,
        site_str,
        timestamp_string,
        observed_at,
    })
}

/// Trimmed text of the first `selector` match under `element`, or empty
fn trimmed_text(element: Option<ElementRef<'_>>, selector: &Selector) -> String {
    element
        .and_then(|element| select_first(element, selector))
        .map(text_of)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Looks for the row's `#up_<id>` anchor and pulls the auth token from its href
fn upvote_token(row: ElementRef<'_>, id: u64) -> Option<String> {
    let selector = Selector::parse(&format!("#up_{}", id)).ok()?;
    let href = select_first(row, &selector)?.value().attr("href")?;
    auth_token_in(href).map(str::to_string)
}
