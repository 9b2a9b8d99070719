//! Hardware error type

use thiserror::Error;

/// Errors raised by hardware primitives
///
/// None of these are fatal to the controller: callers log them and carry on
/// as if the operation had been a no-op.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// GPIO export, direction or value access failed
    #[error("gpio {pin}: {source}")]
    Gpio {
        pin: u8,
        #[source]
        source: std::io::Error,
    },
    /// Sound playback failed
    #[error("audio: {0}")]
    Audio(String),
    /// Display device failure
    #[error("display: {0}")]
    Display(String),
    /// Operation not supported by this backend
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}
