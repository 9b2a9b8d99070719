//! Configuration loading
//!
//! Reads `pillminder.toml` (or the file named on the command line) with
//! serde. Falls back to the embedded defaults when the file is missing.

pub mod loader;

pub use loader::{load_config, CONFIG_ENV, DEFAULT_PATH};
