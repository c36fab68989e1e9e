//! GPIO pin identifiers and electrical policies

use serde::{Deserialize, Serialize};
use std::fmt;

/// GPIO pin number (BCM numbering on the Raspberry Pi)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(pub u8);

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

impl From<u8> for Pin {
    fn from(number: u8) -> Self {
        Self(number)
    }
}

/// Internal resistor applied to an input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pull {
    /// Pull-up: the pin idles high, a button to ground reads low
    #[default]
    Up,
    /// Pull-down: the pin idles low
    Down,
    /// Floating, for externally biased circuits
    Off,
}

impl Pull {
    /// Level an unconnected input settles at
    pub fn idle_level(self) -> bool {
        matches!(self, Self::Up)
    }
}

/// Electrical level at which an input counts as pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveLevel {
    /// Asserted when the pin reads high
    High,
    /// Asserted when the pin reads low (button to ground with pull-up)
    #[default]
    Low,
}

impl ActiveLevel {
    /// Whether a raw pin reading means the input is asserted
    pub fn is_asserted(self, level: bool) -> bool {
        match self {
            Self::High => level,
            Self::Low => !level,
        }
    }

    /// Raw pin level corresponding to an asserted input
    pub fn asserted_level(self) -> bool {
        matches!(self, Self::High)
    }
}
