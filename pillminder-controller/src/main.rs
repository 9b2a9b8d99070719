//! Pillminder - Medicine Reminder Controller
//!
//! Main binary for the four-slot pill box. Draws the menu on the character
//! display, reacts to the four front-panel buttons and interrupts whatever
//! is on screen when a medicine is due.
//!
//! Usage: `pillminder [CONFIG]`. Without an argument the configuration is
//! read from `$PILLMINDER_CONFIG`, then `./pillminder.toml`, then the
//! embedded defaults.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

mod app;
mod capture;
mod channels;
mod cli;
mod config;
mod hardware;
mod menu;

use crate::app::App;
use crate::capture::InboxCapture;
use crate::channels::{command_channel, Command};
use crate::cli::Cli;
use crate::config::load_config;
use crate::hardware::Hardware;

fn main() -> Result<()> {
    // Load configuration first: it carries the default log level
    let cli = Cli::parse();
    let (config, source) = load_config(&cli.config)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.general.log_level.as_str()),
    )
    .init();

    info!("Pillminder starting...");
    info!("Configuration loaded from {}", source);
    if config.general.emulate {
        info!("Emulation mode");
    }

    // Initialize lights, buzzer, display and buttons
    let hardware = Hardware::init(&config)?;
    info!("Hardware initialized");

    // Ctrl-C asks the command loop to shut down
    let (sender, receiver) = command_channel();
    let interrupt = sender.clone();
    ctrlc::set_handler(move || {
        let _ = interrupt.send(Command::Shutdown);
    })
    .context("cannot install Ctrl-C handler")?;

    let capture = InboxCapture::new(&config.schedule.capture_inbox);
    info!("Capture inbox: {}", capture.dir().display());

    let mut app = App::new(&config, hardware, Box::new(capture), (sender, receiver))?;
    app.start()?;
    app.run();
    app.shutdown();
    Ok(())
}
