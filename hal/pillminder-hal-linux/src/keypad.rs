//! Emulated buttons
//!
//! In emulation mode the four buttons are digit keys typed on stdin (one or
//! more digits per line, followed by Enter). Each key press latches its pin
//! high until the next sample, so the dispatcher sees exactly one rising edge
//! per press.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};
use pillminder_hal::{HardwareError, InputPin, PinId};

/// Number of keys (digits 0-9)
pub const KEY_COUNT: usize = 10;

/// Latched key state shared between the reader and the pins
#[derive(Debug, Clone, Default)]
pub struct Keypad {
    latches: Arc<[AtomicBool; KEY_COUNT]>,
}

impl Keypad {
    /// Create a keypad with no reader attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a keypad fed by a detached stdin reader thread
    pub fn stdin() -> Self {
        let keypad = Self::new();
        let feeder = keypad.clone();
        let spawned = thread::Builder::new()
            .name("keypad".into())
            .spawn(move || {
                info!("Keypad reader started");
                for line in std::io::stdin().lock().lines() {
                    match line {
                        Ok(line) => line.chars().for_each(|c| feeder.press_char(c)),
                        Err(e) => {
                            warn!("stdin read error: {}", e);
                            break;
                        }
                    }
                }
                info!("Keypad reader stopped");
            });
        if let Err(e) = spawned {
            warn!("Failed to start keypad reader: {}", e);
        }
        keypad
    }

    /// Latch a key press
    pub fn press(&self, key: PinId) {
        if let Some(latch) = self.latches.get(key as usize) {
            debug!("key {} pressed", key);
            latch.store(true, Ordering::SeqCst);
        }
    }

    fn press_char(&self, c: char) {
        if let Some(d) = c.to_digit(10) {
            self.press(d as PinId);
        }
    }

    /// Input pin for one key
    pub fn pin(&self, key: PinId) -> KeyPin {
        KeyPin {
            key,
            keypad: self.clone(),
        }
    }
}

/// One emulated button
#[derive(Debug, Clone)]
pub struct KeyPin {
    key: PinId,
    keypad: Keypad,
}

impl InputPin for KeyPin {
    fn is_high(&mut self) -> Result<bool, HardwareError> {
        self.keypad
            .latches
            .get(self.key as usize)
            .map(|latch| latch.swap(false, Ordering::SeqCst))
            .ok_or(HardwareError::Unsupported("key outside 0-9"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_reads_high_once() {
        let keypad = Keypad::new();
        let mut pin = keypad.pin(5);
        assert!(!pin.is_high().unwrap());
        keypad.press(5);
        assert!(pin.is_high().unwrap());
        assert!(!pin.is_high().unwrap());
    }

    #[test]
    fn test_other_keys_unaffected() {
        let keypad = Keypad::new();
        let mut up = keypad.pin(8);
        keypad.press_char('2');
        assert!(!up.is_high().unwrap());
        assert!(keypad.pin(2).is_high().unwrap());
    }

    #[test]
    fn test_out_of_range_key() {
        let keypad = Keypad::new();
        assert!(keypad.pin(12).is_high().is_err());
    }
}
