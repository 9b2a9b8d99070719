//! Screen buffer types
//!
//! Provides a character-based screen buffer for text-mode displays. It
//! implements [`DisplayBackend`] so it can stand in for the device, and it is
//! what the terminal display and the tests read back.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use heapless::String;

use crate::backend::{DisplayBackend, DisplayError};
use crate::{DISPLAY_COLS, DISPLAY_ROWS};

/// Byte capacity of one row (21 characters of up to 4 UTF-8 bytes)
const LINE_BYTES: usize = DISPLAY_COLS * 4;

/// Screen buffer for text-mode displays
#[derive(Debug, Clone)]
pub struct Screen {
    /// Current display content
    lines: [String<LINE_BYTES>; DISPLAY_ROWS],
    /// Write cursor row
    row: usize,
    /// Write cursor column
    col: usize,
    /// Number of times the screen has been cleared
    clears: usize,
    /// Whether `close` has been called
    closed: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| String::new()),
            row: 0,
            col: 0,
            clears: 0,
            closed: false,
        }
    }

    /// Get the content of a specific row
    ///
    /// Rows outside the display read as empty.
    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map(|s| s.as_str()).unwrap_or("")
    }

    /// Get all lines as an iterator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// Current cursor position as (row, col)
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// How many times the screen has been cleared
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Whether the screen has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Overwrite cells of the cursor row starting at the cursor column
    fn put(&mut self, text: &str) {
        let mut cells: Vec<char> = self.lines[self.row].chars().collect();
        while cells.len() < self.col {
            cells.push(' ');
        }

        for (i, ch) in text.chars().enumerate() {
            let col = self.col + i;
            if col >= DISPLAY_COLS {
                break;
            }
            if col < cells.len() {
                cells[col] = ch;
            } else {
                cells.push(ch);
            }
        }

        let line = &mut self.lines[self.row];
        line.clear();
        for ch in cells.into_iter().take(DISPLAY_COLS) {
            // At most 21 chars of at most 4 bytes each always fit
            let _ = line.push(ch);
        }
    }
}

impl DisplayBackend for Screen {
    fn clear(&mut self) -> Result<(), DisplayError> {
        if self.closed {
            return Err(DisplayError::Closed);
        }
        for line in &mut self.lines {
            line.clear();
        }
        self.row = 0;
        self.col = 0;
        self.clears += 1;
        Ok(())
    }

    fn set_cursor(&mut self, row: usize, col: usize) -> Result<(), DisplayError> {
        if self.closed {
            return Err(DisplayError::Closed);
        }
        self.row = row;
        self.col = col;
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.closed {
            return Err(DisplayError::Closed);
        }
        // Rows past the bottom of the panel are dropped
        if self.row >= DISPLAY_ROWS {
            return Ok(());
        }

        self.put(text);

        let len = text.chars().count();
        if self.col + len > DISPLAY_COLS {
            self.row += 1;
            self.col = 0;
        } else {
            self.col += len;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        self.closed = true;
        Ok(())
    }
}

/// A [`Screen`] shared between the display owner and observers
///
/// Cloning yields another handle onto the same buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedScreen {
    inner: Arc<Mutex<Screen>>,
}

impl SharedScreen {
    /// Create a new shared, empty screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current buffer
    pub fn snapshot(&self) -> Screen {
        self.lock().clone()
    }

    /// Content of one row
    pub fn line(&self, row: usize) -> std::string::String {
        self.lock().line(row).into()
    }

    fn lock(&self) -> MutexGuard<'_, Screen> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DisplayBackend for SharedScreen {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.lock().clear()
    }

    fn set_cursor(&mut self, row: usize, col: usize) -> Result<(), DisplayError> {
        self.lock().set_cursor(row, col)
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        self.lock().write_text(text)
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        self.lock().close()
    }
}
