//! Configuration type definitions
//!
//! These types represent the appliance configuration. The controller reads
//! them from a TOML file; every section and field has a default, so a
//! partial file is valid.

use serde::{Deserialize, Serialize};

use crate::effects::DEFAULT_SOUND;
use crate::input::Button;
use crate::schedule::HourField;
use pillminder_hal::PinId;

/// Number of pill slots
pub const SLOT_COUNT: usize = 4;

/// Complete appliance configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub general: GeneralConfig,
    pub buttons: ButtonConfig,
    pub leds: LedConfig,
    pub sound: SoundConfig,
    pub input: InputConfig,
    pub schedule: ScheduleConfig,
}

/// Process-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    /// Run against simulated hardware (keypad on stdin, terminal display)
    pub emulate: bool,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Device the display frames are written to; stdout when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            emulate: false,
            log_level: "info".into(),
            display: None,
        }
    }
}

/// Input pin of each button
///
/// Emulation ignores these and uses [`ButtonConfig::KEYPAD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ButtonConfig {
    pub up: PinId,
    pub down: PinId,
    pub back: PinId,
    pub select: PinId,
}

impl ButtonConfig {
    /// Keypad layout used in emulation: 8 up, 2 down, 0 back, 5 select
    pub const KEYPAD: ButtonConfig = ButtonConfig {
        up: 8,
        down: 2,
        back: 0,
        select: 5,
    };

    /// Pin bound to `button`
    pub fn pin(&self, button: Button) -> PinId {
        match button {
            Button::Up => self.up,
            Button::Down => self.down,
            Button::Back => self.back,
            Button::Select => self.select,
        }
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            up: 27,
            down: 25,
            back: 4,
            select: 24,
        }
    }
}

/// Slot lights
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedConfig {
    /// Light pin of each slot, indexed by slot number
    pub slots: [PinId; SLOT_COUNT],
}

impl LedConfig {
    /// Light pin for `slot`, if the slot exists
    pub fn slot_pin(&self, slot: u8) -> Option<PinId> {
        self.slots.get(slot as usize).copied()
    }
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            slots: [17, 18, 23, 22],
        }
    }
}

/// Buzzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoundConfig {
    /// Sound file played for every beep
    pub file: String,
    /// Beeps in a reminder sequence
    pub beeps: u32,
    /// Pause after each reminder beep (ms)
    pub interval_ms: u64,
    /// Start muted
    pub muted: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            file: DEFAULT_SOUND.into(),
            beeps: 10,
            interval_ms: 500,
            muted: false,
        }
    }
}

/// Button sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Time between samples (ms)
    pub poll_interval_ms: u64,
    /// Agreeing samples needed to accept a level change (0 = plain edges)
    pub debounce_polls: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            debounce_polls: 0,
        }
    }
}

/// Stored schedules and capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Directory holding one JSON file per medicine
    pub dir: String,
    /// How the `hour` field of a schedule is read
    pub hour_field: HourField,
    /// Directory the emulated capture reads payloads from
    pub capture_inbox: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            dir: "schedules".into(),
            hour_field: HourField::default(),
            capture_inbox: "inbox".into(),
        }
    }
}
