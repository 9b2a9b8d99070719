//! Sound backends

use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, trace};
use pillminder_hal::{Buzzer, HardwareError};

/// Plays sound files through ALSA's `aplay`
#[derive(Debug, Clone)]
pub struct AplayBuzzer {
    program: String,
}

impl Default for AplayBuzzer {
    fn default() -> Self {
        Self::new()
    }
}

impl AplayBuzzer {
    /// Use `aplay` from `PATH`
    pub fn new() -> Self {
        Self::with_program("aplay")
    }

    /// Use a specific player binary
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Buzzer for AplayBuzzer {
    fn play(&self, sound: &str) -> Result<(), HardwareError> {
        trace!("{} {}", self.program, sound);
        let status = Command::new(&self.program)
            .arg(sound)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| HardwareError::Audio(format!("{}: {}", self.program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(HardwareError::Audio(format!(
                "{} {} exited with {}",
                self.program, sound, status
            )))
        }
    }
}

/// Simulated buzzer
///
/// Counts and logs every beep. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct SimBuzzer {
    plays: Arc<AtomicUsize>,
}

impl SimBuzzer {
    /// Create a buzzer with a zero count
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sounds played so far
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl Buzzer for SimBuzzer {
    fn play(&self, sound: &str) -> Result<(), HardwareError> {
        let n = self.plays.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("beep #{} ({})", n, sound);
        Ok(())
    }
}
