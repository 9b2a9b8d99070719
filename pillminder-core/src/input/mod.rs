//! Button input
//!
//! A single dispatcher thread samples every bound input pin, detects rising
//! edges and calls the bound handler on its own thread.

mod edge;
mod listener;

pub use edge::EdgeDetector;
pub use listener::{Handler, InputListener, ListenerHandle};

/// The four front-panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Back,
    Select,
}

impl Button {
    /// All buttons in panel order
    pub const ALL: [Button; 4] = [Button::Up, Button::Down, Button::Back, Button::Select];

    /// Lowercase name, as used in the configuration file
    pub fn name(self) -> &'static str {
        match self {
            Button::Up => "up",
            Button::Down => "down",
            Button::Back => "back",
            Button::Select => "select",
        }
    }
}

impl core::fmt::Display for Button {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
