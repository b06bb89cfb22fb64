//! # timesince core library
//!
//! Core logic for a small "time since X" board: several independent
//! counters shown one at a time on a two-line character display, cycled
//! and reset with three buttons. Manual timers re-anchor on a button
//! press; polling timers re-anchor themselves by periodically reading a
//! remote JSON source.
//!
//! ## Architecture
//!
//! - **Timer hierarchy**: a closed manual/polling variant over shared
//!   anchor bookkeeping; the polling branch embeds an interval gate and
//!   an extraction policy
//! - **Sources**: event feeds (GitHub activity, Bluesky posts) that
//!   anchor on the newest item's own timestamp, and a threshold watch
//!   over instantaneous weather readings
//! - **Display**: a controller that multiplexes the timer set onto the
//!   screen with debounced inputs and a minimal-redraw cache
//! - **Single-threaded by design**: the caller drives one `tick` at a
//!   time and network checks block it; there is no background task
//!
//! ## Key components
//!
//! - [`Timer`]: anchor bookkeeping plus the polling state machine
//! - [`PollSource`]: where to look and how to extract an instant
//! - [`Dashboard`]: the display controller
//! - [`Config`]: TOML configuration for the stock four-timer board

pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod source;
pub mod timer;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use display::{
    format_elapsed, Button, Dashboard, Debouncer, InputPin, TextScreen, SCREEN_COLS, SCREEN_ROWS,
};
pub use error::{ConfigError, PollError, SetupError};
pub use source::{Extracted, FeedShape, FeedSource, PollSource, ThresholdSource};
pub use timer::Timer;
pub use transport::{InsecureHttp, Transport};
