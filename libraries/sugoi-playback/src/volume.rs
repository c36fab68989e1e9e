//! Stepped volume control
//!
//! Volume moves in whole steps between silence and full output. The level is
//! stored as an integer step count so repeated up/down presses never drift
//! and the exposed value can never leave [0, 1].

/// Volume controller with discrete steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    /// Current step (0..=steps)
    level: u8,

    /// Steps between silence and full volume
    steps: u8,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `volume` - Initial volume, snapped to the nearest step and clamped to [0, 1]
    /// * `steps` - Number of steps (at least 1)
    pub fn new(volume: f32, steps: u8) -> Self {
        let steps = steps.max(1);
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let level = (volume * f32::from(steps)).round() as u8;

        Self {
            level: level.min(steps),
            steps,
            muted: false,
        }
    }

    /// One step up; returns false when already at full volume
    pub fn step_up(&mut self) -> bool {
        if self.level < self.steps {
            self.level += 1;
            true
        } else {
            false
        }
    }

    /// One step down; returns false when already silent
    pub fn step_down(&mut self) -> bool {
        if self.level > 0 {
            self.level -= 1;
            true
        } else {
            false
        }
    }

    /// Current step (0..=steps)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Number of steps between silence and full volume
    pub fn steps(&self) -> u8 {
        self.steps
    }

    /// Stored volume in [0, 1], ignoring mute
    pub fn value(&self) -> f32 {
        f32::from(self.level) / f32::from(self.steps)
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Volume the engine should output
    ///
    /// Returns 0.0 if muted, otherwise the stored volume
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.value()
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.5, 10)
    }
}
