//! Board-agnostic core logic for the medicine reminder
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Menu page tree with static and dynamically produced children
//! - Navigation engine (cursor, visible window, rendering)
//! - Notification overlay queue
//! - Button dispatcher (edge detection on a polling thread)
//! - Hardware side effects (lights, beeps, mute)
//! - Schedule descriptors, validation, recurrence and timed triggers
//! - Configuration type definitions

#![deny(unsafe_code)]

pub mod config;
pub mod effects;
pub mod input;
pub mod navigation;
pub mod overlay;
pub mod page;
pub mod schedule;

pub use effects::Effects;
pub use navigation::{Navigator, Visit};
pub use overlay::{Notification, NotificationQueue};
pub use page::{Page, PageRef};
