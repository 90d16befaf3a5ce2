//! Field extractors shared by the listing and profile parsers
//!
//! The fixed offsets below encode the markup contract of the site: the score
//! reads `"<n> points"` and the profile creation row reads `"created:<date>"`.

use regex::Regex;
use std::sync::LazyLock;

/// Length of the `" points"` suffix on a score label
pub const SCORE_SUFFIX_LEN: usize = 7;

/// Length of the `"created:"` label on a profile row
pub const CREATED_PREFIX_LEN: usize = 8;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

static AUTH_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"auth=([^&]*)&").unwrap());

/// Returns the first run of ASCII digits in `text`
pub fn first_digits_in(text: &str) -> Option<&str> {
    DIGITS.find(text).map(|m| m.as_str())
}

/// Returns the vote token between `auth=` and the next `&`
///
/// An href without a terminating `&` or with an empty token yields `None`.
pub fn auth_token_in(href: &str) -> Option<&str> {
    AUTH_TOKEN
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|token| !token.is_empty())
}

/// Parses a rank label such as `"4."`
///
/// Trailing non-digit characters are stripped before parsing. Rank 0 is not a
/// valid position.
pub fn parse_rank(text: &str) -> Option<u32> {
    let digits = text.trim().trim_end_matches(|c: char| !c.is_ascii_digit());
    digits.parse::<u32>().ok().filter(|rank| *rank > 0)
}

/// Parses a score label such as `"1234 points"` by dropping the last
/// [`SCORE_SUFFIX_LEN`] characters
///
/// Returns `None` when the label is shorter than the suffix or the remainder is
/// not a number. A singular `"1 point"` label does not parse.
pub fn parse_points(text: &str) -> Option<u32> {
    let text = text.trim();
    let char_count = text.chars().count();
    if char_count < SCORE_SUFFIX_LEN {
        return None;
    }

    let number: String = text.chars().take(char_count - SCORE_SUFFIX_LEN).collect();
    number.trim().parse().ok()
}

/// Returns whether a score label is too short to carry the points suffix
pub fn score_too_short(text: &str) -> bool {
    text.trim().chars().count() < SCORE_SUFFIX_LEN
}

/// Parses the comment link text, defaulting to 0
///
/// `"42 comments"` yields 42; `"discuss"` yields 0.
pub fn parse_comment_count(text: &str) -> u32 {
    first_digits_in(text)
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// Drops the [`CREATED_PREFIX_LEN`]-character label from a profile row
pub fn strip_created_label(text: &str) -> Option<String> {
    let text = text.trim();
    if text.chars().count() < CREATED_PREFIX_LEN {
        return None;
    }
    Some(text.chars().skip(CREATED_PREFIX_LEN).collect::<String>().trim().to_string())
}

/// Parses karma as the first digit run of a profile row
pub fn parse_karma(text: &str) -> Option<i64> {
    first_digits_in(text).and_then(|digits| digits.parse().ok())
}
