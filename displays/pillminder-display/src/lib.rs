//! Character display abstraction and shared text layout for Pillminder
//!
//! This crate provides:
//! - `DisplayBackend` trait for character displays (serial LCD, terminal, memory)
//! - `Screen`, an in-memory 8x21 character buffer implementing the backend
//! - `wrap_line`, the word-wrap rule used when menu rows overflow
//!
//! # Display geometry
//!
//! The appliance uses a 128x64 panel driven in text mode: 8 rows of
//! 21 characters (6x8 pixel cells). Writes that land below the last row are
//! dropped; text past the last column is truncated.

#![deny(unsafe_code)]

pub mod backend;
pub mod screen;
pub mod wrap;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError};
pub use screen::{Screen, SharedScreen};
pub use wrap::wrap_line;

/// Number of character rows on the display
pub const DISPLAY_ROWS: usize = 8;

/// Number of character columns on the display
pub const DISPLAY_COLS: usize = 21;
