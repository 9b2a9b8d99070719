//! Hardware capabilities of the pill box
//!
//! The controller touches hardware through three narrow capabilities: slot
//! lights (output pins), buttons (input pins) and a sound player. This crate
//! holds only those traits and their error type, so the core logic can be
//! tested against simulated parts and run unchanged on the Raspberry Pi.
//!
//! ```text
//!   pillminder-controller ──► pillminder-core
//!            │                      │
//!            └──────────┬───────────┘
//!                       ▼
//!             pillminder-hal (traits)
//!                       ▲
//!                       │ implements
//!             pillminder-hal-linux
//!        (sysfs GPIO, aplay, simulators)
//! ```

#![deny(unsafe_code)]

pub mod audio;
pub mod error;
pub mod gpio;

pub use audio::Buzzer;
pub use error::HardwareError;
pub use gpio::{InputPin, OutputPin, PinId};
