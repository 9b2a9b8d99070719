//! Terminal rendering of the character display
//!
//! Keeps a [`Screen`] buffer and draws it, framed, to any writer on every
//! flush. Used in emulation mode in place of the serial LCD.

use std::io::Write;

use pillminder_display::{DisplayBackend, DisplayError, Screen, DISPLAY_COLS};

/// Character display drawn to a terminal or any other writer
pub struct TerminalDisplay<W: Write> {
    screen: Screen,
    out: W,
}

impl TerminalDisplay<std::io::Stdout> {
    /// Draw to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalDisplay<W> {
    /// Draw to `out`
    pub fn new(out: W) -> Self {
        Self {
            screen: Screen::new(),
            out,
        }
    }

    /// The buffered screen content
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Consume the display, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplayBackend for TerminalDisplay<W> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.screen.clear()
    }

    fn set_cursor(&mut self, row: usize, col: usize) -> Result<(), DisplayError> {
        self.screen.set_cursor(row, col)
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        self.screen.write_text(text)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let border = "-".repeat(DISPLAY_COLS);
        writeln!(self.out, "+{}+", border)?;
        for line in self.screen.lines() {
            writeln!(self.out, "|{:<width$}|", line, width = DISPLAY_COLS)?;
        }
        writeln!(self.out, "+{}+", border)?;
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        self.out.flush()?;
        self.screen.close()
    }
}
