//! Configuration file lookup and parsing

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pillminder_core::config::Config;

/// Embedded default configuration (compiled into the binary)
/// Edit pillminder.toml and rebuild to customize
pub const EMBEDDED_CONFIG: &str = include_str!("../../pillminder.toml");

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "PILLMINDER_CONFIG";

/// File looked up when no path is given
pub const DEFAULT_PATH: &str = "pillminder.toml";

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file
    File(PathBuf),
    /// Embedded defaults; this file was looked up but does not exist
    Embedded(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Embedded(path) => {
                write!(f, "embedded defaults ({} not found)", path.display())
            }
        }
    }
}

/// Parse configuration text
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).context("invalid configuration")
}

/// Load the configuration at `path`
///
/// A missing file selects the embedded defaults. Any other read failure, or
/// a file that does not parse, is an error.
pub fn load_config(path: &Path) -> Result<(Config, ConfigSource)> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let config =
                parse_config(&text).with_context(|| format!("in {}", path.display()))?;
            Ok((config, ConfigSource::File(path.to_path_buf())))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let config = parse_config(EMBEDDED_CONFIG).context("in embedded pillminder.toml")?;
            Ok((config, ConfigSource::Embedded(path.to_path_buf())))
        }
        Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
    }
}
