//! Event-feed extraction policy.
//!
//! Covers both concrete feeds (GitHub activity, Bluesky posts) with a
//! single policy value: they differ only in endpoint, required headers,
//! and the JSON path to the newest item's timestamp.

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{PollError, SetupError};
use crate::source::{parse_naive_prefix, Extracted};
use crate::transport::{Header, Transport};

/// Default GitHub API base.
pub const GITHUB_API: &str = "https://api.github.com";
/// Default Bluesky XRPC base.
pub const BLUESKY_API: &str = "https://bsky.social";

/// GitHub usernames are at most 39 characters.
const GITHUB_MAX_USER: usize = 39;
/// Bluesky handles are DNS names, at most 253 characters.
const BLUESKY_MAX_HANDLE: usize = 253;

const GITHUB_HEADERS: &[Header] = &[
    ("Accept", "application/vnd.github.v3+json"),
    ("User-Agent", "timesince"),
];

const FEED_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// JSON path from the response root to the newest item's creation
/// timestamp. Feeds list items newest first; only the first item is
/// ever inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedShape {
    /// Top-level array of events: `[0].created_at`.
    EventArray,
    /// Records wrapper: `records[0].value.createdAt`.
    RecordList,
}

impl FeedShape {
    fn newest_timestamp<'a>(&self, doc: &'a Value) -> Option<&'a str> {
        match self {
            FeedShape::EventArray => doc.get(0)?.get("created_at")?.as_str(),
            FeedShape::RecordList => doc
                .get("records")?
                .get(0)?
                .get("value")?
                .get("createdAt")?
                .as_str(),
        }
    }
}

/// One remote collection of events plus the recipe for reading it.
pub struct FeedSource {
    url: Url,
    headers: &'static [Header],
    shape: FeedShape,
}

impl FeedSource {
    /// Public GitHub activity feed for `user`.
    pub fn github(user: &str) -> Result<Self, SetupError> {
        Self::github_at(GITHUB_API, user)
    }

    /// GitHub feed against an alternate base URL (host root).
    pub fn github_at(base: &str, user: &str) -> Result<Self, SetupError> {
        check_identity("GitHub", user, GITHUB_MAX_USER)?;
        let url = join(base, &format!("users/{user}/events"))?;
        Ok(Self {
            url,
            headers: GITHUB_HEADERS,
            shape: FeedShape::EventArray,
        })
    }

    /// Public Bluesky post feed for `handle`.
    pub fn bluesky(handle: &str) -> Result<Self, SetupError> {
        Self::bluesky_at(BLUESKY_API, handle)
    }

    /// Bluesky feed against an alternate base URL (host root).
    pub fn bluesky_at(base: &str, handle: &str) -> Result<Self, SetupError> {
        check_identity("Bluesky", handle, BLUESKY_MAX_HANDLE)?;
        let mut url = join(base, "xrpc/com.atproto.repo.listRecords")?;
        url.query_pairs_mut()
            .append_pair("repo", handle)
            .append_pair("collection", "app.bsky.feed.post");
        Ok(Self {
            url,
            headers: &[],
            shape: FeedShape::RecordList,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn shape(&self) -> FeedShape {
        self.shape
    }

    pub(crate) fn fetch_and_extract(
        &self,
        transport: &dyn Transport,
    ) -> Result<Extracted, PollError> {
        debug!(url = %self.url, "polling feed");
        let body = transport.get(&self.url, self.headers)?;
        let doc: Value =
            serde_json::from_str(&body).map_err(|e| PollError::Decode(e.to_string()))?;
        let stamp = self
            .shape
            .newest_timestamp(&doc)
            .ok_or_else(|| PollError::Decode("newest item carries no timestamp".into()))?;
        let at = parse_naive_prefix(stamp, FEED_TIMESTAMP_FORMAT)?;
        Ok(Extracted::Anchor(at))
    }
}

fn check_identity(service: &'static str, value: &str, max: usize) -> Result<(), SetupError> {
    if value.len() > max {
        return Err(SetupError::IdentityTooLong {
            service,
            value: value.to_string(),
            max,
        });
    }
    Ok(())
}

fn join(base: &str, path: &str) -> Result<Url, SetupError> {
    let invalid = |message: String| SetupError::InvalidEndpoint {
        url: base.to_string(),
        message,
    };
    let root = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    root.join(path).map_err(|e| invalid(e.to_string()))
}
