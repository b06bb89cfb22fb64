//! The screen multiplexer.
//!
//! Owns nothing about timer lifetime -- it borrows the ordered timer
//! slice for as long as it runs and tracks which one is on screen.
//! Rendering goes through a cache of the last label and elapsed string
//! so an unchanged line is never rewritten over the bus.

use std::time::Instant;

use crate::display::input::Button;
use crate::display::screen::{TextScreen, SCREEN_COLS};
use crate::timer::Timer;

/// Drives the screen and inputs over a fixed, ordered set of timers.
pub struct Dashboard<'t, S: TextScreen> {
    timers: &'t mut [Timer],
    selected: usize,
    screen: S,
    action: Button,
    next: Button,
    prev: Button,
    /// Render cache only; never consulted for timer semantics.
    last_label: String,
    last_elapsed: String,
}

impl<'t, S: TextScreen> Dashboard<'t, S> {
    pub fn new(
        timers: &'t mut [Timer],
        screen: S,
        action: Button,
        next: Button,
        prev: Button,
    ) -> Self {
        Self {
            timers,
            selected: 0,
            screen,
            action,
            next,
            prev,
            last_label: String::new(),
            last_elapsed: String::new(),
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_timer(&self) -> &Timer {
        &self.timers[self.selected]
    }

    /// One pass of the driving loop, given the current wall time.
    ///
    /// Everything here runs synchronously: while the selected timer's
    /// poll check is in flight, buttons and rendering wait.
    pub fn tick(&mut self, now: i64) {
        if self.timers.is_empty() {
            return;
        }
        let at = Instant::now();

        // 1. Background poll, for the selected timer only.
        if self.timers[self.selected].is_pollable() {
            self.timers[self.selected].check_if_due(now);
        }

        // 2. Action button. Blank the elapsed region before the action
        //    lands so a shorter new string cannot leave a stale tail of
        //    the longer old one on screen.
        if self.action.pressed(at) {
            self.blank_elapsed_row();
            self.timers[self.selected].handle_user_action(now);
        }

        // 3. Render with minimal rewrites.
        self.render(now);

        // 4. Navigation, wrapping over the fixed set.
        let count = self.timers.len();
        if self.next.pressed(at) {
            self.selected = (self.selected + 1) % count;
        }
        if self.prev.pressed(at) {
            self.selected = (self.selected + count - 1) % count;
        }
    }

    fn blank_elapsed_row(&mut self) {
        self.screen.set_cursor(0, 1);
        self.screen.write_str(&" ".repeat(SCREEN_COLS));
        self.last_elapsed.clear();
    }

    fn render(&mut self, now: i64) {
        let timer = &self.timers[self.selected];
        let elapsed = format_elapsed(timer.time_since(now));

        if timer.label() != self.last_label {
            self.last_label = timer.label().to_string();
            self.screen.clear();
            self.screen.set_cursor(0, 0);
            self.screen.write_str(&self.last_label);
            // The full clear wiped the elapsed row too.
            self.last_elapsed.clear();
        }

        if elapsed != self.last_elapsed {
            let start = SCREEN_COLS.saturating_sub(elapsed.len());
            self.screen.set_cursor(start, 1);
            self.screen.write_str(&elapsed);
            self.last_elapsed = elapsed;
        }
    }
}

/// `HH:MM:SS`, right-justified by the caller into the screen width.
///
/// The hours field widens past two digits rather than truncating, and
/// negative elapsed (a regressed wall clock) renders as zero while the
/// underlying timer state stays untouched.
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_and_small_values() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(59), "00:00:59");
        assert_eq!(format_elapsed(3_661), "01:01:01");
    }

    #[test]
    fn hours_field_widens_past_two_digits() {
        assert_eq!(format_elapsed(100 * 3_600), "100:00:00");
        assert_eq!(format_elapsed(1_234 * 3_600 + 59), "1234:00:59");
    }

    #[test]
    fn negative_elapsed_clamps_to_zero() {
        assert_eq!(format_elapsed(-42), "00:00:00");
    }
}
