//! Core types for the playback state machine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use sugoi_core::RepeatMode;

/// Transport action bound to a physical button
///
/// Variants are declared in dispatch priority order, so the derived `Ord`
/// doubles as the tie-break when several buttons read as pressed in the same
/// tick: the smallest action wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Previous track, or restart the current one when past the threshold
    Backward,
    /// Next track
    Forward,
    /// Start, pause or resume
    PlayPause,
    /// Stop playback
    Stop,
    /// Cycle repeat mode Off -> All -> One
    RepeatCycle,
    /// Toggle shuffle
    Shuffle,
    /// One volume step up
    VolumeUp,
    /// One volume step down
    VolumeDown,
    /// Toggle mute
    Mute,
}

impl Action {
    /// Number of distinct actions
    pub const COUNT: usize = 9;

    /// Every action, highest priority first
    pub const ALL: [Action; Action::COUNT] = [
        Action::Backward,
        Action::Forward,
        Action::PlayPause,
        Action::Stop,
        Action::RepeatCycle,
        Action::Shuffle,
        Action::VolumeUp,
        Action::VolumeDown,
        Action::Mute,
    ];

    /// Position in the priority table (0 = highest)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Config-file name of the action
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backward => "backward",
            Self::Forward => "forward",
            Self::PlayPause => "play_pause",
            Self::Stop => "stop",
            Self::RepeatCycle => "repeat_cycle",
            Self::Shuffle => "shuffle",
            Self::VolumeUp => "volume_up",
            Self::VolumeDown => "volume_down",
            Self::Mute => "mute",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "backward" | "previous" => Ok(Self::Backward),
            "forward" | "next" => Ok(Self::Forward),
            "play_pause" => Ok(Self::PlayPause),
            "stop" => Ok(Self::Stop),
            "repeat_cycle" | "repeat" => Ok(Self::RepeatCycle),
            "shuffle" => Ok(Self::Shuffle),
            "volume_up" | "vol_up" => Ok(Self::VolumeUp),
            "volume_down" | "vol_down" => Ok(Self::VolumeDown),
            "mute" => Ok(Self::Mute),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// Snapshot of the playback state
///
/// Handed out by the controller; mutating a snapshot has no effect on the
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    /// Index into the track list, always valid
    pub current_index: usize,

    /// Playing (as opposed to paused, stopped or never started)
    pub is_playing: bool,

    /// Stored volume in [0, 1], kept while muted
    pub volume: f32,

    /// Engine output forced to silence
    pub muted: bool,

    /// Forward/backward pick random tracks
    pub shuffle: bool,

    /// End-of-track policy
    pub repeat_mode: RepeatMode,
}

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 0.5)
    pub volume: f32,

    /// Number of discrete volume steps between silence and full (default: 10)
    pub volume_steps: u8,

    /// Initial shuffle flag (default: off)
    pub shuffle: bool,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Minimum time between two accepted presses of the same button (default: 300ms)
    pub debounce_interval: Duration,

    /// Backward restarts the current track past this position (default: 2s)
    pub restart_threshold: Duration,

    /// Seed for the shuffle picker; random when absent
    pub seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            volume_steps: 10,
            shuffle: false,
            repeat: RepeatMode::Off,
            debounce_interval: Duration::from_millis(300),
            restart_threshold: Duration::from_secs(2),
            seed: None,
        }
    }
}
