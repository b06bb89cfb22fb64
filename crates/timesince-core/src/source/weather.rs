//! Threshold extraction policy over instantaneous weather readings.
//!
//! Unlike the feeds, this source has no event semantics, only readings:
//! the anchor moves to the *observation* time whenever the current
//! value sits above the threshold, and a one-time historical backfill
//! seeds the anchor at construction.

use chrono::DateTime;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::clock::Clock;
use crate::error::{PollError, SetupError};
use crate::source::{parse_naive_prefix, Extracted};
use crate::transport::Transport;

/// Default historical-range endpoint.
pub const ARCHIVE_API: &str = "https://archive-api.open-meteo.com/v1/archive";
/// Default current-conditions endpoint.
pub const FORECAST_API: &str = "https://api.open-meteo.com/v1/forecast";

/// Trailing window the backfill scans.
const BACKFILL_WINDOW_SECS: i64 = 30 * 24 * 60 * 60;

const HOURLY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Instantaneous reading at a coordinate pair, compared against a
/// threshold (strictly greater counts as "holding").
pub struct ThresholdSource {
    archive: Url,
    current: Url,
    latitude: f64,
    longitude: f64,
    threshold: f64,
    /// Most recent observed reading. Informational only.
    last_value: Option<f64>,
}

impl ThresholdSource {
    /// Above-zero temperature watch at the given coordinates.
    pub fn above_zero(latitude: f64, longitude: f64) -> Result<Self, SetupError> {
        Self::above_zero_at(ARCHIVE_API, FORECAST_API, latitude, longitude)
    }

    /// Above-zero watch against alternate endpoints.
    pub fn above_zero_at(
        archive: &str,
        forecast: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, SetupError> {
        let archive = parse_endpoint(archive)?;
        let mut current = parse_endpoint(forecast)?;
        current
            .query_pairs_mut()
            .append_pair("latitude", &format!("{latitude:.4}"))
            .append_pair("longitude", &format!("{longitude:.4}"))
            .append_pair("current", "temperature_2m");
        Ok(Self {
            archive,
            current,
            latitude,
            longitude,
            threshold: 0.0,
            last_value: None,
        })
    }

    /// Most recent observed reading, if any check has succeeded.
    pub fn last_value(&self) -> Option<f64> {
        self.last_value
    }

    /// One-time historical seed for the timer anchor: the most recent
    /// sample in the trailing window whose value sits above the
    /// threshold, the window start if none does, or "now" when the
    /// history cannot be fetched at all.
    pub(crate) fn backfill(&self, transport: &dyn Transport, clock: &dyn Clock) -> i64 {
        let now = clock.now();
        match self.scan_history(transport, now) {
            Ok(at) => at,
            Err(err) => {
                warn!(error = %err, "history scan failed, anchoring to now");
                now
            }
        }
    }

    fn scan_history(&self, transport: &dyn Transport, now: i64) -> Result<i64, PollError> {
        let start = now - BACKFILL_WINDOW_SECS;
        let url = self.archive_url(start, now)?;
        debug!(url = %url, "backfilling from history");
        let body = transport.get(&url, &[])?;
        let doc: Value =
            serde_json::from_str(&body).map_err(|e| PollError::Decode(e.to_string()))?;
        let hourly = doc
            .get("hourly")
            .ok_or_else(|| PollError::Decode("hourly block missing".into()))?;
        let times = hourly
            .get("time")
            .and_then(Value::as_array)
            .ok_or_else(|| PollError::Decode("hourly.time missing".into()))?;
        let values = hourly
            .get("temperature_2m")
            .and_then(Value::as_array)
            .ok_or_else(|| PollError::Decode("hourly.temperature_2m missing".into()))?;

        // Newest to oldest; the first sample above threshold wins.
        for (time, value) in times.iter().zip(values.iter()).rev() {
            let Some(value) = value.as_f64() else { continue };
            if value > self.threshold {
                let Some(stamp) = time.as_str() else { continue };
                return parse_naive_prefix(stamp, HOURLY_TIMESTAMP_FORMAT);
            }
        }
        Ok(start)
    }

    fn archive_url(&self, start: i64, end: i64) -> Result<Url, PollError> {
        let mut url = self.archive.clone();
        url.query_pairs_mut()
            .append_pair("latitude", &format!("{:.4}", self.latitude))
            .append_pair("longitude", &format!("{:.4}", self.longitude))
            .append_pair("start_date", &format_date(start)?)
            .append_pair("end_date", &format_date(end)?)
            .append_pair("hourly", "temperature_2m");
        Ok(url)
    }

    pub(crate) fn fetch_and_extract(
        &mut self,
        transport: &dyn Transport,
        clock: &dyn Clock,
    ) -> Result<Extracted, PollError> {
        debug!(url = %self.current, "polling current conditions");
        let body = transport.get(&self.current, &[])?;
        let doc: Value =
            serde_json::from_str(&body).map_err(|e| PollError::Decode(e.to_string()))?;
        let value = doc
            .get("current")
            .and_then(|c| c.get("temperature_2m"))
            .and_then(Value::as_f64)
            .ok_or_else(|| PollError::Decode("current.temperature_2m missing".into()))?;
        self.last_value = Some(value);

        // Any parseable reading counts as poll success; only a value
        // above threshold moves the anchor, and it moves to the
        // observation time since the source has no event timestamps.
        if value > self.threshold {
            debug!(value, "reading above threshold, re-anchoring");
            Ok(Extracted::Anchor(clock.now()))
        } else {
            Ok(Extracted::Unchanged)
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, SetupError> {
    Url::parse(endpoint).map_err(|e| SetupError::InvalidEndpoint {
        url: endpoint.to_string(),
        message: e.to_string(),
    })
}

fn format_date(epoch: i64) -> Result<String, PollError> {
    let date = DateTime::from_timestamp(epoch, 0)
        .ok_or_else(|| PollError::Timestamp(format!("epoch {epoch} out of range")))?;
    Ok(date.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubTransport {
        response: Result<&'static str, u16>,
    }

    impl Transport for StubTransport {
        fn is_connected(&self) -> bool {
            true
        }

        fn get(&self, _url: &Url, _headers: &[crate::transport::Header]) -> Result<String, PollError> {
            match self.response {
                Ok(body) => Ok(body.to_string()),
                Err(status) => Err(PollError::Status(status)),
            }
        }
    }

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now(&self) -> i64 {
            self.0
        }
    }

    fn source() -> ThresholdSource {
        ThresholdSource::above_zero(49.8954, -97.1385).unwrap()
    }

    const HISTORY: &str = r#"{
        "hourly": {
            "time": ["2024-01-01T00:00", "2024-01-01T01:00", "2024-01-01T02:00"],
            "temperature_2m": [1.5, -2.0, -5.0]
        }
    }"#;

    #[test]
    fn backfill_picks_most_recent_sample_above_threshold() {
        let transport = StubTransport {
            response: Ok(HISTORY),
        };
        let clock = FixedClock(1_704_153_600);
        // 01:00 and 02:00 are at or below zero; 00:00 is the newest above.
        let anchor = source().backfill(&transport, &clock);
        assert_eq!(anchor, 1_704_067_200);
    }

    #[test]
    fn backfill_defaults_to_window_start_when_nothing_qualifies() {
        let transport = StubTransport {
            response: Ok(r#"{
                "hourly": {
                    "time": ["2024-01-01T00:00", "2024-01-01T01:00"],
                    "temperature_2m": [-1.0, 0.0]
                }
            }"#),
        };
        let clock = FixedClock(1_704_153_600);
        let anchor = source().backfill(&transport, &clock);
        assert_eq!(anchor, 1_704_153_600 - 30 * 24 * 60 * 60);
    }

    #[test]
    fn backfill_anchors_to_now_when_history_unavailable() {
        let transport = StubTransport {
            response: Err(500),
        };
        let clock = FixedClock(1_704_153_600);
        assert_eq!(source().backfill(&transport, &clock), 1_704_153_600);
    }

    #[test]
    fn reading_above_threshold_anchors_to_observation_time() {
        let transport = StubTransport {
            response: Ok(r#"{"current": {"temperature_2m": 3.2}}"#),
        };
        let clock = FixedClock(1_700_000_000);
        let mut src = source();
        let outcome = src.fetch_and_extract(&transport, &clock).unwrap();
        assert_eq!(outcome, Extracted::Anchor(1_700_000_000));
        assert_eq!(src.last_value(), Some(3.2));
    }

    #[test]
    fn reading_at_threshold_is_success_without_reanchor() {
        let transport = StubTransport {
            response: Ok(r#"{"current": {"temperature_2m": 0.0}}"#),
        };
        let clock = FixedClock(1_700_000_000);
        let mut src = source();
        let outcome = src.fetch_and_extract(&transport, &clock).unwrap();
        assert_eq!(outcome, Extracted::Unchanged);
        assert_eq!(src.last_value(), Some(0.0));
    }

    #[test]
    fn missing_reading_is_decode_failure() {
        let transport = StubTransport {
            response: Ok(r#"{"current": {}}"#),
        };
        let clock = FixedClock(1_700_000_000);
        let mut src = source();
        assert!(matches!(
            src.fetch_and_extract(&transport, &clock),
            Err(PollError::Decode(_))
        ));
        assert_eq!(src.last_value(), None);
    }
}
