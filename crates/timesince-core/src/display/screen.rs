//! Character-screen boundary.

/// Columns on the attached character display.
pub const SCREEN_COLS: usize = 16;
/// Rows on the attached character display.
pub const SCREEN_ROWS: usize = 2;

/// A two-line character display addressed over a simple bus.
///
/// The primitive set mirrors the usual HD44780-style driver: full
/// clear, cursor positioning, and in-place text writes. The driver
/// itself lives outside this crate; the CLI ships a terminal emulation
/// and tests a recording double.
pub trait TextScreen {
    fn clear(&mut self);
    fn set_cursor(&mut self, col: usize, row: usize);
    fn write_str(&mut self, text: &str);
}
