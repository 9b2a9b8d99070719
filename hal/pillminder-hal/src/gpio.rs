//! Digital pins
//!
//! Lights are outputs that remember what they were last driven to; buttons
//! are inputs sampled by the dispatcher thread. Every access can fail on
//! Linux (a pin that is not exported, a missing sysfs node), so both sides
//! return [`HardwareError`].

use crate::HardwareError;

/// Pin identifier (BCM numbering on the appliance)
pub type PinId = u8;

/// Digital output pin
///
/// Used for the per-slot lights.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self) -> Result<(), HardwareError>;

    /// Set the pin low (logic 0)
    fn set_low(&mut self) -> Result<(), HardwareError>;

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) -> Result<(), HardwareError> {
        if high {
            self.set_high()
        } else {
            self.set_low()
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
///
/// Used for the buttons. Sampling takes `&mut self` so that latched or
/// edge-buffered implementations can consume what they report.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> Result<bool, HardwareError>;

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> Result<bool, HardwareError> {
        self.is_high().map(|high| !high)
    }
}
