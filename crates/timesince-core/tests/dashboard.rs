//! Display controller behavior with recording doubles.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use timesince_core::{Button, Dashboard, InputPin, TextScreen, Timer, SCREEN_COLS};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Clear,
    Cursor(usize, usize),
    Write(String),
}

/// Screen double that records every bus operation.
#[derive(Clone, Default)]
struct RecordScreen {
    ops: Rc<RefCell<Vec<Op>>>,
}

impl RecordScreen {
    fn ops(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    fn reset_log(&self) {
        self.ops.borrow_mut().clear();
    }
}

impl TextScreen for RecordScreen {
    fn clear(&mut self) {
        self.ops.borrow_mut().push(Op::Clear);
    }

    fn set_cursor(&mut self, col: usize, row: usize) {
        self.ops.borrow_mut().push(Op::Cursor(col, row));
    }

    fn write_str(&mut self, text: &str) {
        self.ops.borrow_mut().push(Op::Write(text.into()));
    }
}

#[derive(Clone, Default)]
struct FakePin {
    low: Rc<Cell<bool>>,
}

impl FakePin {
    fn press(&self) {
        self.low.set(true);
    }

    fn release(&self) {
        self.low.set(false);
    }
}

impl InputPin for FakePin {
    fn is_low(&self) -> bool {
        self.low.get()
    }
}

struct Pins {
    action: FakePin,
    next: FakePin,
    prev: FakePin,
}

fn board() -> (Vec<Timer>, RecordScreen, Pins) {
    let timers = vec![
        Timer::manual("Water", 0),
        Timer::manual("Tea", 0),
        Timer::manual("Run", 0),
    ];
    (
        timers,
        RecordScreen::default(),
        Pins {
            action: FakePin::default(),
            next: FakePin::default(),
            prev: FakePin::default(),
        },
    )
}

/// Buttons without a settle window so tests can press on consecutive
/// ticks; the settle window itself is covered by the debouncer tests.
fn dashboard<'t>(
    timers: &'t mut [Timer],
    screen: &RecordScreen,
    pins: &Pins,
) -> Dashboard<'t, RecordScreen> {
    Dashboard::new(
        timers,
        screen.clone(),
        Button::new(Box::new(pins.action.clone()), Duration::ZERO),
        Button::new(Box::new(pins.next.clone()), Duration::ZERO),
        Button::new(Box::new(pins.prev.clone()), Duration::ZERO),
    )
}

#[test]
fn first_tick_paints_label_and_elapsed() {
    let (mut timers, screen, pins) = board();
    let mut dash = dashboard(&mut timers, &screen, &pins);

    dash.tick(90);
    assert_eq!(
        screen.ops(),
        vec![
            Op::Clear,
            Op::Cursor(0, 0),
            Op::Write("Water".into()),
            Op::Cursor(8, 1),
            Op::Write("00:01:30".into()),
        ]
    );
}

#[test]
fn unchanged_ticks_touch_nothing() {
    let (mut timers, screen, pins) = board();
    let mut dash = dashboard(&mut timers, &screen, &pins);

    dash.tick(90);
    screen.reset_log();
    dash.tick(90);
    assert!(screen.ops().is_empty());
}

#[test]
fn elapsed_change_rewrites_only_the_elapsed_line() {
    let (mut timers, screen, pins) = board();
    let mut dash = dashboard(&mut timers, &screen, &pins);

    dash.tick(90);
    screen.reset_log();
    dash.tick(91);
    assert_eq!(
        screen.ops(),
        vec![Op::Cursor(8, 1), Op::Write("00:01:31".into())]
    );
}

#[test]
fn selection_change_forces_a_full_repaint() {
    let (mut timers, screen, pins) = board();
    let mut dash = dashboard(&mut timers, &screen, &pins);

    dash.tick(0);
    pins.next.press();
    dash.tick(0);
    pins.next.release();
    assert_eq!(dash.selected_index(), 1);

    screen.reset_log();
    dash.tick(0);
    assert_eq!(
        screen.ops(),
        vec![
            Op::Clear,
            Op::Cursor(0, 0),
            Op::Write("Tea".into()),
            Op::Cursor(8, 1),
            Op::Write("00:00:00".into()),
        ]
    );
}

#[test]
fn selection_wraps_in_both_directions() {
    let (mut timers, screen, pins) = board();
    let mut dash = dashboard(&mut timers, &screen, &pins);

    // Previous from index 0 lands on the last timer.
    pins.prev.press();
    dash.tick(0);
    pins.prev.release();
    assert_eq!(dash.selected_index(), 2);

    // Next from the last timer wraps back to 0.
    dash.tick(0);
    pins.next.press();
    dash.tick(0);
    pins.next.release();
    assert_eq!(dash.selected_index(), 0);
}

#[test]
fn action_press_blanks_the_elapsed_row_before_resetting() {
    let (mut timers, screen, pins) = board();
    let mut dash = dashboard(&mut timers, &screen, &pins);

    dash.tick(100);
    screen.reset_log();

    pins.action.press();
    dash.tick(200);
    assert_eq!(
        screen.ops(),
        vec![
            Op::Cursor(0, 1),
            Op::Write(" ".repeat(SCREEN_COLS)),
            Op::Cursor(8, 1),
            Op::Write("00:00:00".into()),
        ]
    );
    assert_eq!(dash.selected_timer().last_trigger(), 200);
}

#[test]
fn held_action_button_fires_exactly_once() {
    let (mut timers, screen, pins) = board();
    let mut dash = dashboard(&mut timers, &screen, &pins);

    pins.action.press();
    dash.tick(100);
    dash.tick(150);
    dash.tick(200);
    // Only the first tick saw an edge; the anchor never moved again.
    assert_eq!(dash.selected_timer().last_trigger(), 100);
}
