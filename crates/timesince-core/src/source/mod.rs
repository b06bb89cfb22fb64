//! Source-specific extraction policies for polling timers.
//!
//! A polling timer embeds one [`PollSource`] describing *where* to look
//! and *how* to pull a meaningful instant out of the response. The
//! timer itself owns the interval gate and success bookkeeping; the
//! source only fetches and extracts.

mod feed;
mod weather;

pub use feed::{FeedShape, FeedSource, BLUESKY_API, GITHUB_API};
pub use weather::{ThresholdSource, ARCHIVE_API, FORECAST_API};

use chrono::NaiveDateTime;

use crate::clock::Clock;
use crate::error::PollError;
use crate::transport::Transport;

/// What a successful check attempt discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extracted {
    /// Move the timer anchor to this epoch second.
    Anchor(i64),
    /// The poll succeeded but the anchor stays where it is.
    Unchanged,
}

/// Closed set of extraction policies a polling timer can embed.
pub enum PollSource {
    /// Remote collection of events, newest first; anchor becomes the
    /// newest item's own timestamp.
    Feed(FeedSource),
    /// Instantaneous remote reading compared against a threshold;
    /// anchor becomes the observation time while the condition holds.
    Threshold(ThresholdSource),
}

impl PollSource {
    pub(crate) fn fetch_and_extract(
        &mut self,
        transport: &dyn Transport,
        clock: &dyn Clock,
    ) -> Result<Extracted, PollError> {
        match self {
            PollSource::Feed(feed) => feed.fetch_and_extract(transport),
            PollSource::Threshold(threshold) => threshold.fetch_and_extract(transport, clock),
        }
    }
}

/// Parse the leading `fmt` portion of a timestamp string as a naive
/// datetime, ignoring whatever trails it (fractional seconds, `Z`).
///
/// Mirrors `strptime` prefix matching; the sources carry no usable
/// offset, so the value is interpreted against the UTC-configured
/// device clock.
pub(crate) fn parse_naive_prefix(value: &str, fmt: &str) -> Result<i64, PollError> {
    let (datetime, _rest) = NaiveDateTime::parse_and_remainder(value, fmt)
        .map_err(|e| PollError::Timestamp(format!("'{value}': {e}")))?;
    Ok(datetime.and_utc().timestamp())
}
