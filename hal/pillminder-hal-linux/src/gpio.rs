//! GPIO backends
//!
//! Sysfs pins for the appliance and logging pins for simulation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace};
use pillminder_hal::{HardwareError, InputPin, OutputPin, PinId};

/// Default sysfs GPIO root
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Export a pin and set its direction
fn export(root: &Path, pin: PinId, direction: &str) -> io::Result<PathBuf> {
    let pin_dir = root.join(format!("gpio{}", pin));
    if !pin_dir.exists() {
        fs::write(root.join("export"), pin.to_string())?;
    }
    fs::write(pin_dir.join("direction"), direction)?;
    Ok(pin_dir.join("value"))
}

/// Sysfs output pin
pub struct SysfsOutputPin {
    pin: PinId,
    value_path: PathBuf,
    high: bool,
}

impl SysfsOutputPin {
    /// Export `pin` under `root` as an output, driven low
    pub fn new(root: impl AsRef<Path>, pin: PinId) -> Result<Self, HardwareError> {
        let value_path =
            export(root.as_ref(), pin, "out").map_err(|source| HardwareError::Gpio { pin, source })?;
        let mut out = Self {
            pin,
            value_path,
            high: false,
        };
        out.set_low()?;
        debug!("gpio{} exported as output", pin);
        Ok(out)
    }

    fn write(&mut self, high: bool) -> Result<(), HardwareError> {
        fs::write(&self.value_path, if high { "1" } else { "0" }).map_err(|source| {
            HardwareError::Gpio {
                pin: self.pin,
                source,
            }
        })?;
        self.high = high;
        Ok(())
    }
}

impl OutputPin for SysfsOutputPin {
    fn set_high(&mut self) -> Result<(), HardwareError> {
        self.write(true)
    }

    fn set_low(&mut self) -> Result<(), HardwareError> {
        self.write(false)
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Sysfs input pin
pub struct SysfsInputPin {
    pin: PinId,
    value_path: PathBuf,
}

impl SysfsInputPin {
    /// Export `pin` under `root` as an input
    pub fn new(root: impl AsRef<Path>, pin: PinId) -> Result<Self, HardwareError> {
        let value_path =
            export(root.as_ref(), pin, "in").map_err(|source| HardwareError::Gpio { pin, source })?;
        debug!("gpio{} exported as input", pin);
        Ok(Self { pin, value_path })
    }
}

impl InputPin for SysfsInputPin {
    fn is_high(&mut self) -> Result<bool, HardwareError> {
        let raw = fs::read_to_string(&self.value_path).map_err(|source| HardwareError::Gpio {
            pin: self.pin,
            source,
        })?;
        Ok(raw.trim() == "1")
    }
}

/// Simulated output pin
///
/// Logs every transition. Clones share state, so a test or the terminal UI
/// can watch a light that the controller owns.
#[derive(Debug, Clone)]
pub struct SimPin {
    pin: PinId,
    state: Arc<AtomicBool>,
}

impl SimPin {
    /// Create a simulated pin, initially low
    pub fn new(pin: PinId) -> Self {
        Self {
            pin,
            state: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pin number
    pub fn pin(&self) -> PinId {
        self.pin
    }

    fn set(&mut self, high: bool) {
        let prev = self.state.swap(high, Ordering::SeqCst);
        debug!("LED #{} from {} to {}", self.pin, prev, high);
    }
}

impl OutputPin for SimPin {
    fn set_high(&mut self) -> Result<(), HardwareError> {
        self.set(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), HardwareError> {
        self.set(false);
        Ok(())
    }

    fn is_set_high(&self) -> bool {
        self.state.load(Ordering::SeqCst)
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, HardwareError> {
        let high = self.state.load(Ordering::SeqCst);
        trace!("sim gpio{} reads {}", self.pin, high);
        Ok(high)
    }
}
