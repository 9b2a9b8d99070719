//! Sound output abstraction

use crate::HardwareError;

/// Blocking sound player
///
/// `play` returns once the sound has finished. Callers that must not block
/// run it on a detached thread.
pub trait Buzzer: Send + Sync {
    /// Play the referenced sound once
    fn play(&self, sound: &str) -> Result<(), HardwareError>;
}
