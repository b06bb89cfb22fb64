//! Display controller: multiplexes the timer set onto a two-line
//! character screen with debounced inputs and minimal redraws.

mod dashboard;
mod input;
mod screen;

pub use dashboard::{format_elapsed, Dashboard};
pub use input::{Button, Debouncer, InputPin};
pub use screen::{TextScreen, SCREEN_COLS, SCREEN_ROWS};
