//! TOML-based application configuration.
//!
//! Stored at `~/.config/timesince/config.toml`. Every field has a
//! default, so a missing or partial file still yields the stock
//! four-timer board (manual water timer, GitHub feed, Bluesky feed,
//! above-zero weather watch).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{ConfigError, SetupError};
use crate::source::{
    FeedSource, PollSource, ThresholdSource, ARCHIVE_API, BLUESKY_API, FORECAST_API, GITHUB_API,
};
use crate::timer::Timer;

/// Manual timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualConfig {
    #[serde(default = "default_manual_label")]
    pub label: String,
}

/// GitHub feed timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_github_label")]
    pub label: String,
    #[serde(default = "default_github_user")]
    pub user: String,
    #[serde(default = "default_feed_interval")]
    pub interval_secs: u32,
    #[serde(default = "default_github_endpoint")]
    pub endpoint: String,
}

/// Bluesky feed timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueskyConfig {
    #[serde(default = "default_bluesky_label")]
    pub label: String,
    #[serde(default = "default_bluesky_handle")]
    pub handle: String,
    #[serde(default = "default_feed_interval")]
    pub interval_secs: u32,
    #[serde(default = "default_bluesky_endpoint")]
    pub endpoint: String,
}

/// Weather threshold timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_label")]
    pub label: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_weather_interval")]
    pub interval_secs: u32,
    #[serde(default = "default_archive_endpoint")]
    pub archive_endpoint: String,
    #[serde(default = "default_forecast_endpoint")]
    pub forecast_endpoint: String,
}

/// Display loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Tick period of the driving loop, in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Minimum spacing between accepted button edges, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/timesince/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub manual: ManualConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub bluesky: BlueskyConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_manual_label() -> String {
    "Last drank water".into()
}
fn default_github_label() -> String {
    "Last GitHub push".into()
}
fn default_github_user() -> String {
    "octocat".into()
}
fn default_github_endpoint() -> String {
    GITHUB_API.into()
}
fn default_bluesky_label() -> String {
    "Last Bsky post".into()
}
fn default_bluesky_handle() -> String {
    "bsky.app".into()
}
fn default_bluesky_endpoint() -> String {
    BLUESKY_API.into()
}
fn default_feed_interval() -> u32 {
    300
}
fn default_weather_label() -> String {
    "Last above 0C".into()
}
fn default_latitude() -> f64 {
    49.8954
}
fn default_longitude() -> f64 {
    -97.1385
}
fn default_weather_interval() -> u32 {
    900
}
fn default_archive_endpoint() -> String {
    ARCHIVE_API.into()
}
fn default_forecast_endpoint() -> String {
    FORECAST_API.into()
}
fn default_tick_ms() -> u64 {
    100
}
fn default_debounce_ms() -> u64 {
    50
}

impl Default for ManualConfig {
    fn default() -> Self {
        Self {
            label: default_manual_label(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            label: default_github_label(),
            user: default_github_user(),
            interval_secs: default_feed_interval(),
            endpoint: default_github_endpoint(),
        }
    }
}

impl Default for BlueskyConfig {
    fn default() -> Self {
        Self {
            label: default_bluesky_label(),
            handle: default_bluesky_handle(),
            interval_secs: default_feed_interval(),
            endpoint: default_bluesky_endpoint(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            label: default_weather_label(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            interval_secs: default_weather_interval(),
            archive_endpoint: default_archive_endpoint(),
            forecast_endpoint: default_forecast_endpoint(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manual: ManualConfig::default(),
            github: GithubConfig::default(),
            bluesky: BlueskyConfig::default(),
            weather: WeatherConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// `~/.config/timesince/config.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("timesince").join("config.toml"))
    }

    /// Load from the default location, writing a default file on first
    /// run.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save_to(path)?;
                Ok(config)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Construct the ordered timer board, all anchors seeded to now.
    ///
    /// Order is fixed and significant: manual first, then the two
    /// feeds, then the weather watch. An oversized identity or a bad
    /// endpoint aborts initialization here.
    pub fn build_timers(&self, clock: &dyn Clock) -> Result<Vec<Timer>, SetupError> {
        let now = clock.now();
        let github = FeedSource::github_at(&self.github.endpoint, &self.github.user)?;
        let bluesky = FeedSource::bluesky_at(&self.bluesky.endpoint, &self.bluesky.handle)?;
        let weather = ThresholdSource::above_zero_at(
            &self.weather.archive_endpoint,
            &self.weather.forecast_endpoint,
            self.weather.latitude,
            self.weather.longitude,
        )?;
        Ok(vec![
            Timer::manual(self.manual.label.as_str(), now),
            Timer::polling(
                self.github.label.as_str(),
                PollSource::Feed(github),
                self.github.interval_secs,
                now,
            ),
            Timer::polling(
                self.bluesky.label.as_str(),
                PollSource::Feed(bluesky),
                self.bluesky.interval_secs,
                now,
            ),
            Timer::polling(
                self.weather.label.as_str(),
                PollSource::Threshold(weather),
                self.weather.interval_secs,
                now,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn empty_file_yields_full_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.github.user, "octocat");
        assert_eq!(config.github.interval_secs, 300);
        assert_eq!(config.weather.interval_secs, 900);
        assert_eq!(config.display.debounce_ms, 50);
    }

    #[test]
    fn partial_file_keeps_section_defaults() {
        let config: Config = toml::from_str("[github]\nuser = \"alice\"\n").unwrap();
        assert_eq!(config.github.user, "alice");
        assert_eq!(config.github.interval_secs, 300);
        assert_eq!(config.bluesky.handle, "bsky.app");
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.github.user = "alice".into();
        config.weather.latitude = 60.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.github.user, "alice");
        assert_eq!(loaded.weather.latitude, 60.0);
    }

    #[test]
    fn first_load_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(!path.exists());

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.github.user, "octocat");
    }

    #[test]
    fn board_order_is_fixed() {
        let timers = Config::default().build_timers(&FixedClock(1_000)).unwrap();
        assert_eq!(timers.len(), 4);
        assert_eq!(timers[0].label(), "Last drank water");
        assert!(!timers[0].is_pollable());
        assert!(timers[1..].iter().all(Timer::is_pollable));
        assert!(timers.iter().all(|t| t.last_trigger() == 1_000));
    }
}
