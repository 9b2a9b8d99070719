//! Controller context
//!
//! Owns every long-lived part of the appliance: the navigator, the schedule
//! bridge, the button listener and the capture source. The main thread
//! drives it through the command loop; menu callbacks and the signal handler
//! only send [`Command`]s.
//!
//! Lifecycle:
//!
//! ```text
//!   new ──► start ──► run (Record / Rebuild ...) ──► Shutdown ──► shutdown
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::RecvTimeoutError;
use log::{debug, error, info, warn};
use pillminder_core::config::{Config, InputConfig};
use pillminder_core::input::{Button, InputListener, ListenerHandle};
use pillminder_core::schedule::{BridgeConfig, LocalClock, ScheduleBridge, ScheduleStore, TriggerScheduler};
use pillminder_core::{Effects, Navigator, Page};
use serde_json::Value;

use crate::capture::Capture;
use crate::channels::{Command, CommandReceiver, CommandSender};
use crate::hardware::{Buttons, Hardware};
use crate::menu::{build_menu, MenuContext};

/// Text shown while waiting for the first payload
pub const SCANNING_TEXT: &str = "Scanning...\nPress Back when done";

/// Overlay shown when a record session captured nothing
pub const EMPTY_LABEL: &str = "Schedule empty!";

/// Overlay shown when captured schedules fail validation
pub const REJECTED_LABEL: &str = "Schedule invalid!";

/// Time between capture polls
const CAPTURE_INTERVAL: Duration = Duration::from_millis(50);

fn recording_text(count: usize) -> String {
    format!("Recording...\n{} schedule(s) recorded!\nPress Back when done", count)
}

/// The running appliance
pub struct App {
    nav: Arc<Navigator>,
    bridge: ScheduleBridge,
    effects: Arc<Effects>,
    buttons: Buttons,
    input: InputConfig,
    capture: Box<dyn Capture>,
    commands: CommandReceiver,
    listener: Option<ListenerHandle>,
}

impl App {
    /// Build the menu, navigator and schedule bridge on top of `hardware`
    ///
    /// The trigger scheduler starts here, with no jobs until
    /// [`start`](Self::start) loads the stored schedules.
    pub fn new(
        config: &Config,
        hardware: Hardware,
        capture: Box<dyn Capture>,
        (sender, commands): (CommandSender, CommandReceiver),
    ) -> Result<Self> {
        let Hardware {
            effects,
            display,
            buttons,
        } = hardware;

        let store = ScheduleStore::new(&config.schedule.dir);
        let root = build_menu(&MenuContext {
            store: store.clone(),
            effects: effects.clone(),
            commands: sender,
        });
        let nav = Arc::new(Navigator::new(root, display, effects.clone()));

        let scheduler = TriggerScheduler::start(LocalClock).context("cannot start scheduler")?;
        let bridge = ScheduleBridge::new(
            store,
            scheduler,
            effects.clone(),
            nav.clone(),
            BridgeConfig::from(config),
        );

        Ok(Self {
            nav,
            bridge,
            effects,
            buttons,
            input: config.input,
            capture,
            commands,
            listener: None,
        })
    }

    /// Start the buttons, draw the menu and load the stored schedules
    pub fn start(&mut self) -> Result<()> {
        self.listener = Some(self.menu_listener().context("cannot start button listener")?);
        info!("Button listener started");

        self.nav.render();

        match self.bridge.rebuild() {
            Ok(count) => info!("{} stored schedule(s) active", count),
            Err(errors) => warn!("stored schedules rejected ({} error(s))", errors.len()),
        }
        Ok(())
    }

    /// Handle commands until shutdown is requested
    pub fn run(&mut self) {
        info!("Controller running");
        loop {
            let command = match self.commands.recv() {
                Ok(command) => command,
                Err(_) => break,
            };
            debug!("command: {:?}", command);
            match command {
                Command::Record => {
                    if !self.record() {
                        break;
                    }
                }
                Command::Rebuild => {
                    if let Err(errors) = self.bridge.rebuild() {
                        warn!("schedules rejected ({} error(s))", errors.len());
                    }
                }
                Command::Shutdown => break,
            }
        }
    }

    /// Stop the buttons and the scheduler, then release the display
    ///
    /// A reminder that is already running is not waited for.
    pub fn shutdown(mut self) {
        info!("Shutting down");
        if let Some(listener) = self.listener.take() {
            listener.stop();
        }
        self.bridge.shutdown();
        self.nav.close();
        info!("Shutdown complete");
    }

    /// Listener driving the navigator from the four buttons
    fn menu_listener(&self) -> Result<ListenerHandle> {
        let mut listener = InputListener::new(Duration::from_millis(self.input.poll_interval_ms))
            .named("buttons")
            .debounce(self.input.debounce_polls);

        for button in Button::ALL {
            let pin = self
                .buttons
                .open(button)
                .with_context(|| format!("{} button", button))?;
            let nav = self.nav.clone();
            listener = listener.bind(pin, move || match button {
                Button::Up => nav.move_up(),
                Button::Down => nav.move_down(),
                Button::Back => nav.go_back(),
                Button::Select => nav.select_current(),
            });
        }
        Ok(listener.start()?)
    }

    /// Listener that only raises `done` when Back is pressed
    fn back_listener(&self, done: Arc<AtomicBool>) -> Result<ListenerHandle> {
        let pin = self.buttons.open(Button::Back).context("back button")?;
        let listener = InputListener::new(Duration::from_millis(self.input.poll_interval_ms))
            .named("record")
            .debounce(self.input.debounce_polls)
            .bind(pin, move || done.store(true, Ordering::SeqCst));
        Ok(listener.start()?)
    }

    /// Replace the stored schedules with freshly captured ones
    ///
    /// Returns false if shutdown was requested during the session.
    fn record(&mut self) -> bool {
        info!("Record session started");

        if let Some(listener) = self.listener.take() {
            listener.stop();
        }
        self.bridge.clear();
        let (removed, errors) = self.bridge.store().clear();
        info!("{} old schedule(s) removed", removed);
        if !errors.is_empty() {
            warn!("{} old schedule(s) could not be removed", errors.len());
        }
        self.nav.print_text(SCANNING_TEXT);

        let done = Arc::new(AtomicBool::new(false));
        let stopper = match self.back_listener(done.clone()) {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("record session cannot watch Back: {:#}", e);
                done.store(true, Ordering::SeqCst);
                None
            }
        };
        let (payloads, keep_running) = self.collect(&done);
        if let Some(stopper) = stopper {
            stopper.stop();
        }
        info!("Record session captured {} schedule(s)", payloads.len());

        if payloads.is_empty() {
            let page = Page::builder(EMPTY_LABEL)
                .children(vec![Page::leaf("Ok")])
                .build();
            self.nav.push_notification(None, page);
        } else {
            self.activate(&payloads);
        }

        // Hand the buttons back to the menu
        match self.menu_listener() {
            Ok(listener) => self.listener = Some(listener),
            Err(e) => error!("cannot restart button listener: {:#}", e),
        }
        self.nav.render();
        keep_running
    }

    /// Poll the capture source until `done`, keeping distinct payloads
    ///
    /// The command channel doubles as the poll sleep, so a shutdown request
    /// ends the session early.
    fn collect(&mut self, done: &AtomicBool) -> (Vec<String>, bool) {
        let mut payloads: Vec<String> = Vec::new();
        while !done.load(Ordering::SeqCst) {
            for payload in self.capture.poll() {
                if payloads.contains(&payload) {
                    continue;
                }
                payloads.push(payload);
                self.effects.beep();
                self.nav.print_text(&recording_text(payloads.len()));
            }

            match self.commands.recv_timeout(CAPTURE_INTERVAL) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                    return (payloads, false)
                }
                Ok(other) => debug!("{:?} ignored while recording", other),
            }
        }
        (payloads, true)
    }

    /// Persist captured payloads and register their reminders
    fn activate(&self, payloads: &[String]) {
        let store = self.bridge.store();
        let mut batch = Vec::with_capacity(payloads.len());
        for text in payloads {
            let name = match store.save_payload(text) {
                Ok(name) => name,
                Err(e) => {
                    warn!("captured schedule not stored: {}", e);
                    continue;
                }
            };
            match serde_json::from_str::<Value>(text) {
                Ok(value) => batch.push((store.path(&name).display().to_string(), value)),
                Err(e) => warn!("{}: {}", name, e),
            }
        }

        if let Err(errors) = self.bridge.activate(&batch) {
            let mut lines: Vec<_> = errors.iter().map(|e| Page::leaf(e.to_string())).collect();
            lines.push(Page::leaf("Ok"));
            let page = Page::builder(REJECTED_LABEL).children(lines).build();
            self.nav.push_notification(None, page);
        }
    }
}
