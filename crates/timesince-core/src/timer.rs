//! The timer hierarchy.
//!
//! A [`Timer`] tracks "time since X" from an anchor instant. Manual
//! timers re-anchor only on user action; polling timers additionally
//! embed an interval-gated [`PollSource`] that can discover a newer
//! instant remotely. There are no internal threads -- the display loop
//! calls [`Timer::check_if_due`] on its own tick cadence, and network
//! checks run synchronously on that thread.

use tracing::warn;

use crate::clock::{Clock, SystemClock};
use crate::error::PollError;
use crate::source::{Extracted, PollSource};
use crate::transport::Transport;

/// One labelled "time since X" counter.
pub struct Timer {
    label: String,
    /// The anchor elapsed time is measured from. Epoch seconds; only
    /// ever mutated through [`Timer::reset`].
    last_trigger: i64,
    kind: TimerKind,
}

enum TimerKind {
    Manual,
    Polling(Poller),
}

/// Interval-gated polling state carried by a polling timer.
struct Poller {
    interval_secs: u32,
    /// When a remote check last *succeeded*. Advances only on success,
    /// to the actual completion time -- never to a caller-supplied
    /// timestamp and never on failure, so an elapsed interval retries
    /// every tick until a check lands.
    last_poll: i64,
    source: PollSource,
    transport: Option<Box<dyn Transport>>,
    clock: Box<dyn Clock>,
}

impl Timer {
    /// A timer re-anchored only by explicit user action.
    pub fn manual(label: impl Into<String>, initial: i64) -> Self {
        Self {
            label: label.into(),
            last_trigger: initial,
            kind: TimerKind::Manual,
        }
    }

    /// A timer that also re-anchors itself from a remote source, at
    /// most once per `interval_secs` of successful checks.
    pub fn polling(
        label: impl Into<String>,
        source: PollSource,
        interval_secs: u32,
        initial: i64,
    ) -> Self {
        Self {
            label: label.into(),
            last_trigger: initial,
            kind: TimerKind::Polling(Poller {
                interval_secs,
                last_poll: initial,
                source,
                transport: None,
                clock: Box::new(SystemClock),
            }),
        }
    }

    /// Replace the completion-time clock on a polling timer. Intended
    /// for tests and embedders with their own time source.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        if let TimerKind::Polling(poller) = &mut self.kind {
            poller.clock = clock;
        }
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn label(&self) -> &str {
        &self.label
    }

    /// `now - anchor`, exact. Negative only if the wall clock has
    /// regressed; callers rendering the value clamp, this does not.
    pub fn time_since(&self, now: i64) -> i64 {
        now - self.last_trigger
    }

    pub fn last_trigger(&self) -> i64 {
        self.last_trigger
    }

    /// When a remote check last succeeded, for polling timers.
    pub fn last_poll_at(&self) -> Option<i64> {
        match &self.kind {
            TimerKind::Polling(poller) => Some(poller.last_poll),
            TimerKind::Manual => None,
        }
    }

    /// Whether this timer is subject to periodic background polling.
    pub fn is_pollable(&self) -> bool {
        matches!(self.kind, TimerKind::Polling(_))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Unconditionally move the anchor.
    pub fn reset(&mut self, at: i64) {
        self.last_trigger = at;
    }

    /// Two-phase initialization: attach the transport and perform the
    /// source's initial work (feed probe or historical backfill).
    /// Returns whether that initial work succeeded. No-op on manual
    /// timers.
    pub fn prime(&mut self, transport: Box<dyn Transport>) -> bool {
        let TimerKind::Polling(poller) = &mut self.kind else {
            return false;
        };
        poller.transport = Some(transport);
        if matches!(poller.source, PollSource::Threshold(_)) {
            // Backfill always yields an anchor, even if it is only
            // "now" because history could not be fetched.
            self.last_trigger = poller.backfill();
            return true;
        }
        self.force_check()
    }

    /// User pressed the action button while this timer was selected:
    /// manual timers re-anchor to `now`; polling timers run an
    /// out-of-interval check attempt.
    pub fn handle_user_action(&mut self, now: i64) -> bool {
        if self.is_pollable() {
            self.force_check()
        } else {
            self.reset(now);
            true
        }
    }

    /// Gated check: attempt only once the interval has elapsed since
    /// the last successful check, otherwise a no-op returning false.
    pub fn check_if_due(&mut self, now: i64) -> bool {
        let result = match &mut self.kind {
            TimerKind::Manual => return false,
            TimerKind::Polling(poller) => {
                if !poller.should_check(now) {
                    return false;
                }
                poller.attempt()
            }
        };
        self.settle(result)
    }

    /// Ungated check attempt, bypassing the interval gate.
    pub fn force_check(&mut self) -> bool {
        let result = match &mut self.kind {
            TimerKind::Manual => return false,
            TimerKind::Polling(poller) => poller.attempt(),
        };
        self.settle(result)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn settle(&mut self, result: Result<Extracted, PollError>) -> bool {
        match result {
            Ok(Extracted::Anchor(at)) => {
                self.reset(at);
                true
            }
            Ok(Extracted::Unchanged) => true,
            Err(err) => {
                warn!(timer = %self.label, error = %err, "check attempt failed");
                false
            }
        }
    }
}

impl Poller {
    fn should_check(&self, now: i64) -> bool {
        now - self.last_poll >= i64::from(self.interval_secs)
    }

    /// One synchronous check attempt. On success stamps `last_poll`
    /// with the completion time; on failure touches nothing.
    fn attempt(&mut self) -> Result<Extracted, PollError> {
        let transport = match self.transport.as_deref() {
            Some(t) if t.is_connected() => t,
            _ => return Err(PollError::NoTransport),
        };
        let outcome = self.source.fetch_and_extract(transport, self.clock.as_ref())?;
        self.last_poll = self.clock.now();
        Ok(outcome)
    }

    fn backfill(&self) -> i64 {
        let PollSource::Threshold(threshold) = &self.source else {
            return self.clock.now();
        };
        match self.transport.as_deref() {
            Some(t) if t.is_connected() => threshold.backfill(t, self.clock.as_ref()),
            _ => {
                warn!("no transport for backfill, anchoring to now");
                self.clock.now()
            }
        }
    }
}
