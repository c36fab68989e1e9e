/// Repeat mode shared by the state machine, the indicators and the config file
use serde::{Deserialize, Serialize};

/// What happens when a track ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Play through the track list once and stop at its end
    ///
    /// While shuffling there is no list order to follow, so playback holds
    /// after every track.
    #[default]
    Off,
    /// Loop the whole track list
    All,
    /// Loop the current track
    One,
}

impl RepeatMode {
    /// Next mode in the button cycle: Off -> All -> One -> Off
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    /// Two-bit code shown on the repeat LEDs (Off = 00, All = 01, One = 10)
    pub fn code(self) -> u8 {
        match self {
            Self::Off => 0b00,
            Self::All => 0b01,
            Self::One => 0b10,
        }
    }

    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "all" => Ok(Self::All),
            "one" => Ok(Self::One),
            other => Err(format!("unknown repeat mode: {other}")),
        }
    }
}
