//! Audio engine status as seen by the monitor loop

/// Position reported by an engine that has nothing playing
///
/// Any negative position means "ended or unknown"; this is the value the
/// bundled engines report.
pub const ENDED_POSITION: i64 = -1;

/// One sample of the audio engine's transport status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatus {
    /// A track is loaded (playing or paused)
    pub busy: bool,

    /// Elapsed milliseconds in the current track, negative when ended
    pub position_ms: i64,
}

impl EngineStatus {
    /// Status of an engine that finished (or never started) a track
    pub const ENDED: Self = Self {
        busy: false,
        position_ms: ENDED_POSITION,
    };

    /// Status of an engine playing at `position_ms`
    pub fn playing_at(position_ms: i64) -> Self {
        Self {
            busy: true,
            position_ms,
        }
    }

    /// End-of-track sentinel detected
    pub fn is_ended(&self) -> bool {
        self.position_ms <= ENDED_POSITION
    }
}
