//! Terminal stand-ins for the device boundary: a 16x2 framed screen
//! drawn with crossterm and keyboard "pins" for the three buttons.

use std::cell::Cell;
use std::io::{self, Stdout, Write};
use std::rc::Rc;
use std::time::Duration;

use crossterm::{cursor, event, style, terminal, QueueableCommand};
use timesince_core::{InputPin, TextScreen, SCREEN_COLS, SCREEN_ROWS};

/// Raw-mode guard; restores the terminal on drop.
pub struct RawMode;

impl RawMode {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        out.queue(terminal::Clear(terminal::ClearType::All))?;
        out.queue(cursor::Hide)?;
        out.flush()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = out.queue(cursor::Show);
        let _ = out.queue(cursor::MoveTo(0, (SCREEN_ROWS + 2) as u16));
        let _ = out.flush();
        let _ = terminal::disable_raw_mode();
    }
}

/// Terminal emulation of the two-line character display.
pub struct TermScreen {
    out: Stdout,
    rows: [[char; SCREEN_COLS]; SCREEN_ROWS],
    col: usize,
    row: usize,
}

impl TermScreen {
    pub fn new() -> io::Result<Self> {
        let mut screen = Self {
            out: io::stdout(),
            rows: [[' '; SCREEN_COLS]; SCREEN_ROWS],
            col: 0,
            row: 0,
        };
        screen.repaint()?;
        Ok(screen)
    }

    fn repaint(&mut self) -> io::Result<()> {
        let border = format!("+{}+", "-".repeat(SCREEN_COLS));
        self.out.queue(cursor::MoveTo(0, 0))?;
        self.out.queue(style::Print(&border))?;
        for (i, row) in self.rows.iter().enumerate() {
            let line: String = row.iter().collect();
            self.out.queue(cursor::MoveTo(0, (i + 1) as u16))?;
            self.out.queue(style::Print(format!("|{line}|")))?;
        }
        self.out
            .queue(cursor::MoveTo(0, (SCREEN_ROWS + 1) as u16))?;
        self.out.queue(style::Print(&border))?;
        self.out.flush()
    }
}

impl TextScreen for TermScreen {
    fn clear(&mut self) {
        self.rows = [[' '; SCREEN_COLS]; SCREEN_ROWS];
        self.col = 0;
        self.row = 0;
        let _ = self.repaint();
    }

    fn set_cursor(&mut self, col: usize, row: usize) {
        self.col = col.min(SCREEN_COLS);
        self.row = row.min(SCREEN_ROWS - 1);
    }

    fn write_str(&mut self, text: &str) {
        for ch in text.chars() {
            if self.col >= SCREEN_COLS {
                break;
            }
            self.rows[self.row][self.col] = ch;
            self.col += 1;
        }
        let _ = self.repaint();
    }
}

struct KeyPin(Rc<Cell<bool>>);

impl InputPin for KeyPin {
    fn is_low(&self) -> bool {
        self.0.get()
    }
}

/// Keyboard stand-ins for the three momentary buttons. A key press
/// pulls the matching pin low for exactly one tick.
pub struct KeyPins {
    action: Rc<Cell<bool>>,
    next: Rc<Cell<bool>>,
    prev: Rc<Cell<bool>>,
    quit: bool,
}

impl KeyPins {
    pub fn new() -> Self {
        Self {
            action: Rc::new(Cell::new(false)),
            next: Rc::new(Cell::new(false)),
            prev: Rc::new(Cell::new(false)),
            quit: false,
        }
    }

    pub fn action_pin(&self) -> Box<dyn InputPin> {
        Box::new(KeyPin(self.action.clone()))
    }

    pub fn next_pin(&self) -> Box<dyn InputPin> {
        Box::new(KeyPin(self.next.clone()))
    }

    pub fn prev_pin(&self) -> Box<dyn InputPin> {
        Box::new(KeyPin(self.prev.clone()))
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Wait up to `wait` for input, then drain pending key events and
    /// latch the pins for the coming tick.
    pub fn pump(&mut self, wait: Duration) -> io::Result<()> {
        self.action.set(false);
        self.next.set(false);
        self.prev.set(false);

        if !event::poll(wait)? {
            return Ok(());
        }
        while event::poll(Duration::ZERO)? {
            let event::Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != event::KeyEventKind::Press {
                continue;
            }
            match key.code {
                event::KeyCode::Char(' ') | event::KeyCode::Enter => self.action.set(true),
                event::KeyCode::Right | event::KeyCode::Down => self.next.set(true),
                event::KeyCode::Left | event::KeyCode::Up => self.prev.set(true),
                event::KeyCode::Char('q') | event::KeyCode::Esc => self.quit = true,
                _ => {}
            }
        }
        Ok(())
    }
}
