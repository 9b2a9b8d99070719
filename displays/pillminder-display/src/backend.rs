//! Display backend trait
//!
//! Defines the interface for character displays.

use thiserror::Error;

/// Display backend errors
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Communication error with the display device
    #[error("display i/o: {0}")]
    Io(#[from] std::io::Error),
    /// The device has been closed
    #[error("display closed")]
    Closed,
}

/// Display backend trait
///
/// A character display with a write cursor. Implementations handle the
/// specifics of the device (serial LCD, terminal, in-memory buffer).
pub trait DisplayBackend {
    /// Clear the entire display and home the cursor
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the write cursor
    ///
    /// - `row`: Row number (0-based)
    /// - `col`: Column number in characters (0-based)
    fn set_cursor(&mut self, row: usize, col: usize) -> Result<(), DisplayError>;

    /// Write text at the cursor
    ///
    /// If the text runs past the last column the cursor moves to the start
    /// of the next row, otherwise it advances past the text.
    fn write_text(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Flush buffered content to the device
    ///
    /// For displays without internal buffers this is a no-op.
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Release the device
    fn close(&mut self) -> Result<(), DisplayError>;
}

impl<T: DisplayBackend + ?Sized> DisplayBackend for Box<T> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn set_cursor(&mut self, row: usize, col: usize) -> Result<(), DisplayError> {
        (**self).set_cursor(row, col)
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        (**self).write_text(text)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        (**self).close()
    }
}
