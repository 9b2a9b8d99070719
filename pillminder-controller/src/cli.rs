//! Command line

use std::path::PathBuf;

use clap::Parser;

use crate::config::{CONFIG_ENV, DEFAULT_PATH};

/// Medicine reminder controller for the four-slot pill box
#[derive(Debug, Parser)]
#[command(name = "pillminder", version, about)]
pub struct Cli {
    /// Configuration file; embedded defaults are used when it does not exist
    #[arg(env = CONFIG_ENV, default_value = DEFAULT_PATH)]
    pub config: PathBuf,
}
