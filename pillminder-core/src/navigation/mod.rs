//! Menu navigation
//!
//! The [`Navigator`] owns the current page, the selection cursor and the
//! display. Every operation runs read-modify-render under one lock, so
//! button presses from the input thread and notifications from the
//! scheduler thread never interleave.

mod engine;
mod window;

pub use engine::{Navigator, Visit, MARKER};
pub use window::{Cursor, Window, ROW_BUDGET};
