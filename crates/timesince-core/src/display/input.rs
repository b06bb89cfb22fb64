//! Debounced digital inputs.
//!
//! Debounce here is a timestamp gate, not a sleep: an edge is accepted
//! only if enough time has passed since the last accepted one, so
//! contact chatter is filtered without ever stalling the tick.

use std::time::{Duration, Instant};

/// A momentary digital input, active when pulled low.
pub trait InputPin {
    fn is_low(&self) -> bool;
}

/// Timestamp-gated falling-edge filter.
///
/// Recognizes the released-to-pressed transition exactly once per
/// press-release cycle: a held level produces no further edges, and a
/// new edge inside the settle window is treated as chatter and
/// dropped.
#[derive(Debug)]
pub struct Debouncer {
    settle: Duration,
    last_low: bool,
    last_edge: Option<Instant>,
}

impl Debouncer {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            last_low: false,
            last_edge: None,
        }
    }

    /// Sample the raw level at `at`; true when a debounced falling
    /// edge is recognized.
    pub fn falling_edge(&mut self, low: bool, at: Instant) -> bool {
        let settled = self
            .last_edge
            .map_or(true, |edge| at.duration_since(edge) >= self.settle);
        let fired = low && !self.last_low && settled;
        if fired {
            self.last_edge = Some(at);
        }
        self.last_low = low;
        fired
    }
}

/// A pin paired with its edge filter.
pub struct Button {
    pin: Box<dyn InputPin>,
    filter: Debouncer,
}

impl Button {
    pub fn new(pin: Box<dyn InputPin>, settle: Duration) -> Self {
        Self {
            pin,
            filter: Debouncer::new(settle),
        }
    }

    /// Sample the pin; true on a debounced press.
    pub fn pressed(&mut self, at: Instant) -> bool {
        self.filter.falling_edge(self.pin.is_low(), at)
    }
}
