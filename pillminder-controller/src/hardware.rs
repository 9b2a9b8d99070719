//! Hardware wiring
//!
//! Builds the lights, buzzer, display and button pins for either the
//! appliance (sysfs GPIO, `aplay`, display device) or emulation (logging
//! pins, keypad on stdin, terminal display).

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use pillminder_core::config::{ButtonConfig, Config};
use pillminder_core::input::Button;
use pillminder_core::Effects;
use pillminder_display::DisplayBackend;
use pillminder_hal::{Buzzer, HardwareError, InputPin, OutputPin, PinId};
use pillminder_hal_linux::gpio::SYSFS_GPIO_ROOT;
use pillminder_hal_linux::{
    AplayBuzzer, KeyPin, Keypad, SimBuzzer, SimPin, SysfsInputPin, SysfsOutputPin, TerminalDisplay,
};

/// Where button levels are read from
#[derive(Debug, Clone)]
pub enum ButtonSource {
    /// Sysfs GPIO rooted here
    Gpio(PathBuf),
    /// Emulated keypad
    Keypad(Keypad),
}

/// One button input, real or emulated
pub enum ButtonPin {
    Gpio(SysfsInputPin),
    Key(KeyPin),
}

impl InputPin for ButtonPin {
    fn is_high(&mut self) -> Result<bool, HardwareError> {
        match self {
            ButtonPin::Gpio(pin) => pin.is_high(),
            ButtonPin::Key(pin) => pin.is_high(),
        }
    }
}

/// Button pins by role
#[derive(Debug, Clone)]
pub struct Buttons {
    source: ButtonSource,
    map: ButtonConfig,
}

impl Buttons {
    pub fn new(source: ButtonSource, map: ButtonConfig) -> Self {
        Self { source, map }
    }

    /// Pin id of `button`
    pub fn id(&self, button: Button) -> PinId {
        self.map.pin(button)
    }

    /// Open the input for `button`
    ///
    /// Each call opens a fresh pin, so a listener can be rebuilt after the
    /// previous one has taken its pins.
    pub fn open(&self, button: Button) -> Result<ButtonPin, HardwareError> {
        let id = self.id(button);
        match &self.source {
            ButtonSource::Gpio(root) => SysfsInputPin::new(root, id).map(ButtonPin::Gpio),
            ButtonSource::Keypad(keypad) => Ok(ButtonPin::Key(keypad.pin(id))),
        }
    }
}

/// Everything the controller drives
pub struct Hardware {
    pub effects: Arc<Effects>,
    pub display: Box<dyn DisplayBackend + Send>,
    pub buttons: Buttons,
}

impl Hardware {
    /// Wire up hardware as configured
    ///
    /// Light pins that cannot be opened are logged and left out; a display
    /// device that cannot be opened is an error.
    pub fn init(config: &Config) -> Result<Self> {
        let emulate = config.general.emulate;

        let buzzer: Arc<dyn Buzzer> = if emulate {
            Arc::new(SimBuzzer::new())
        } else {
            Arc::new(AplayBuzzer::new())
        };
        let effects = Arc::new(Effects::new(buzzer, config.sound.file.clone()));
        effects.set_muted(config.sound.muted);

        for &pin in &config.leds.slots {
            match open_light(emulate, pin) {
                Ok(light) => effects.init_light(pin, light),
                Err(e) => warn!("light {} unavailable: {}", pin, e),
            }
        }
        info!("{} slot light(s) initialized", config.leds.slots.len());

        let display: Box<dyn DisplayBackend + Send> = match &config.general.display {
            Some(device) => {
                let out = OpenOptions::new()
                    .write(true)
                    .open(device)
                    .with_context(|| format!("cannot open display {}", device))?;
                info!("Display on {}", device);
                Box::new(TerminalDisplay::new(out))
            }
            None => Box::new(TerminalDisplay::stdout()),
        };

        let buttons = if emulate {
            info!("Emulated keypad: 8 up, 2 down, 0 back, 5 select");
            Buttons::new(ButtonSource::Keypad(Keypad::stdin()), ButtonConfig::KEYPAD)
        } else {
            Buttons::new(ButtonSource::Gpio(PathBuf::from(SYSFS_GPIO_ROOT)), config.buttons)
        };

        Ok(Self {
            effects,
            display,
            buttons,
        })
    }
}

fn open_light(emulate: bool, pin: PinId) -> Result<Box<dyn OutputPin + Send>, HardwareError> {
    if emulate {
        Ok(Box::new(SimPin::new(pin)))
    } else {
        Ok(Box::new(SysfsOutputPin::new(SYSFS_GPIO_ROOT, pin)?))
    }
}
