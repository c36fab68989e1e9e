//! Error types for the playback core

use sugoi_core::DeviceError;
use thiserror::Error;

/// Playback errors
///
/// Configuration variants are fatal and only produced while building the
/// components at startup. [`PlaybackError::Device`] wraps a failed hardware
/// call and is transient: the control loop logs it and skips the tick.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Track list is empty
    #[error("Track list is empty")]
    EmptyTrackList,

    /// Debounce interval is zero, negative or not a number
    #[error("Invalid debounce interval: {0}s (must be positive)")]
    InvalidDebounceInterval(f64),

    /// Input mapping has no inputs or binds a pin/action twice
    #[error("Invalid input mapping: {0}")]
    InvalidInputMapping(String),

    /// Indicator layout is missing segments or reuses a pin
    #[error("Invalid indicator mapping: {0}")]
    InvalidIndicatorMapping(String),

    /// Other invalid playback settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Digital I/O or audio engine call failed
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

impl PlaybackError {
    /// Whether the next poll tick may succeed where this one failed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Device(_))
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
