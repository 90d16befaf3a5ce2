//! URL builders for the pages hn-glance reads and the actions a display layer
//! can offer (open comments, open profile, upvote)

use crate::GlanceError;
use url::Url;

/// Builds URLs relative to the configured site root
#[derive(Debug, Clone)]
pub struct SiteLinks {
    base: Url,
}

impl SiteLinks {
    /// # Arguments
    ///
    /// * `base_url` - Site root, e.g. `https://news.ycombinator.com/`
    pub fn new(base_url: &str) -> Result<Self, GlanceError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }

    /// The front page listing
    pub fn listing_url(&self) -> &Url {
        &self.base
    }

    /// `user?id=<username>`
    pub fn user_url(&self, username: &str) -> Url {
        let mut url = self.join("user");
        url.query_pairs_mut().append_pair("id", username);
        url
    }

    /// `item?id=<id>`, the comments page of a post
    pub fn item_url(&self, id: u64) -> Url {
        let mut url = self.join("item");
        url.query_pairs_mut().append_pair("id", &id.to_string());
        url
    }

    /// `vote?id=<id>&how=up&auth=<auth_hash>`
    pub fn vote_url(&self, id: u64, auth_hash: &str) -> Url {
        let mut url = self.join("vote");
        url.query_pairs_mut()
            .append_pair("id", &id.to_string())
            .append_pair("how", "up")
            .append_pair("auth", auth_hash);
        url
    }

    fn join(&self, path: &str) -> Url {
        // A bare relative path always joins onto an http(s) base
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }
}
