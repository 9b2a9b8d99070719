//! Linux implementation of the Pillminder HAL
//!
//! Two families of backends live here:
//!
//! - **Appliance** backends talk to the Raspberry Pi: GPIO through the sysfs
//!   interface and sound through `aplay`.
//! - **Simulated** backends let the controller run on a desktop: pins that
//!   only log their state, a buzzer that counts beeps, a terminal rendering
//!   of the character display and a keypad fed from stdin.

#![deny(unsafe_code)]

pub mod audio;
pub mod display;
pub mod gpio;
pub mod keypad;

pub use audio::{AplayBuzzer, SimBuzzer};
pub use display::TerminalDisplay;
pub use gpio::{SimPin, SysfsInputPin, SysfsOutputPin};
pub use keypad::{KeyPin, Keypad};
