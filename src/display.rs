//! Plain-text rendering of a snapshot
//!
//! A menu-style layout: one truncated title per post, followed by its detail
//! lines (wrapped title, author, age, comments, upvotes) and the links a
//! display layer would open for them.

use crate::links::SiteLinks;
use crate::model::{Post, Snapshot, User};
use std::fmt::Write;

/// Width of a post's title on its menu line
pub const TITLE_WIDTH: usize = 50;

/// Width used when wrapping a full title in the detail lines
pub const WRAP_WIDTH: usize = 42;

/// Shortens a title for a single menu line
///
/// Titles longer than `width - 2` characters are cut to `width - 3` characters
/// and get a `...` suffix.
pub fn truncate_title(title: &str, width: usize) -> String {
    if title.chars().count() > width.saturating_sub(2) {
        let kept: String = title.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        title.to_string()
    }
}

/// Greedy word wrap at `width` characters
///
/// Words longer than `width` get a line of their own. Empty or blank input
/// yields no lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let mut current = first.to_string();
    let mut remaining = width.saturating_sub(first.chars().count());

    for word in words {
        let len = word.chars().count();
        if len + 1 > remaining {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            remaining = width.saturating_sub(len);
        } else {
            current.push(' ');
            current.push_str(word);
            remaining -= len + 1;
        }
    }
    lines.push(current);
    lines
}

/// Detail lines shown under a post
///
/// The comments line carries the item page and, when the row had a vote
/// token, the upvote line carries the vote URL.
pub fn post_lines(post: &Post, author: Option<&User>, links: &SiteLinks) -> Vec<String> {
    let mut lines = wrap(&post.title, WRAP_WIDTH);

    match author {
        Some(user) => lines.push(format!("By: {} ({} karma)", post.username, user.karma)),
        None => lines.push(format!("By: {}", post.username)),
    }
    lines.push(post.timestamp_string.clone());
    lines.push(format!(
        "Comments: {} <{}>",
        post.comment_count,
        links.item_url(post.id)
    ));

    if post.can_upvote {
        lines.push(format!(
            "Upvotes: {} (Click to Upvote) <{}>",
            post.points,
            links.vote_url(post.id, &post.auth_hash)
        ));
    } else {
        lines.push(format!("Upvotes: {}", post.points));
    }

    lines
}

/// Renders the whole snapshot as an indented text menu
pub fn render_snapshot(snapshot: &Snapshot, links: &SiteLinks) -> String {
    let mut out = String::from("Recent posts\n");

    if snapshot.posts.is_empty() {
        out.push_str("  (nothing yet)\n");
        return out;
    }

    for post in &snapshot.posts {
        let _ = writeln!(out, "{:>2}. {}", post.rank, truncate_title(&post.title, TITLE_WIDTH));
        for line in post_lines(post, snapshot.author_of(post), links) {
            let _ = writeln!(out, "      {}", line);
        }
    }
    out
}
