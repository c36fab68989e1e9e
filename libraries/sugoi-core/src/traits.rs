/// Collaborator traits consumed by the playback core
use crate::error::Result;
use crate::types::{EngineStatus, Pin, Pull};
use std::path::Path;

/// Audio engine trait
///
/// Implementers stream tracks to an output device. Transport commands are
/// fire-and-forget: they return as soon as the engine has accepted the
/// command and never wait for audio to actually start or stop.
///
/// Methods take `&self` because the engine is shared between the input loop
/// and the monitor loop; implementers use interior mutability.
pub trait AudioEngine: Send + Sync {
    /// Load a track and start playing it from the beginning
    ///
    /// Replaces whatever was loaded before.
    fn load_and_play(&self, track: &Path) -> Result<()>;

    /// Pause the loaded track, keeping its position
    fn pause(&self) -> Result<()>;

    /// Resume a paused track
    fn resume(&self) -> Result<()>;

    /// Stop playback and unload the track
    fn stop(&self) -> Result<()>;

    /// Whether a track is loaded (playing or paused)
    fn is_busy(&self) -> Result<bool>;

    /// Elapsed milliseconds in the current track
    ///
    /// Negative (see [`crate::ENDED_POSITION`]) when the track has ended or
    /// nothing was ever loaded.
    fn elapsed_position(&self) -> Result<i64>;

    /// Set the output volume (0.0 = silent, 1.0 = full volume)
    fn set_volume(&self, volume: f32) -> Result<()>;

    /// Sample busy flag and position together
    fn status(&self) -> Result<EngineStatus> {
        Ok(EngineStatus {
            busy: self.is_busy()?,
            position_ms: self.elapsed_position()?,
        })
    }
}

/// Digital I/O service trait
///
/// Implementers drive GPIO pins. `true` is the high electrical level; the
/// meaning of "pressed" is decided by the caller's active level.
pub trait DigitalIo: Send + Sync {
    /// Configure a pin as an input with the given pull resistor
    fn configure_input(&self, pin: Pin, pull: Pull) -> Result<()>;

    /// Configure a pin as an output driven at `initial`
    fn configure_output(&self, pin: Pin, initial: bool) -> Result<()>;

    /// Read the current level of an input pin
    fn read(&self, pin: Pin) -> Result<bool>;

    /// Drive an output pin
    fn write(&self, pin: Pin, level: bool) -> Result<()>;
}
