//! Records extracted from the listing and profile pages

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Hard upper bound on posts kept in a snapshot
pub const MAX_POSTS: usize = 10;

/// One front page submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Item id, stable across refreshes
    pub id: u64,

    /// 1-based position on the listing at fetch time
    pub rank: u32,

    /// Story link exactly as it appears in the markup (absolute or relative)
    pub link: String,

    pub title: String,
    pub points: u32,

    /// 0 when the comment link carries no number ("discuss")
    pub comment_count: u32,

    /// Author handle; empty for rows without one (job postings)
    pub username: String,

    /// Vote authorization token; empty when the page was served without one
    pub auth_hash: String,

    pub can_upvote: bool,

    /// Domain label shown next to the title
    pub site_str: String,

    /// Relative age text, e.g. "3 hours ago"
    pub timestamp_string: String,

    /// When the record was extracted
    pub observed_at: DateTime<Utc>,
}

/// One author's profile snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub karma: i64,

    /// Account age text as shown on the profile, e.g. "March 3, 2014"
    pub created_string: String,

    pub observed_at: DateTime<Utc>,
}

/// The complete published state at a point in time
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// At most [`MAX_POSTS`] posts, ascending by rank
    pub posts: Vec<Post>,

    /// Latest known profile per username
    pub users: HashMap<String, User>,

    /// Number of publishes so far; 0 means nothing has been published yet
    pub generation: u64,

    pub published_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Looks up the profile of a post's author
    pub fn author_of(&self, post: &Post) -> Option<&User> {
        self.users.get(&post.username)
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
