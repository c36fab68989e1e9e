//! LED indicators
//!
//! The indicator state is derived from a playback snapshot and pushed to the
//! digital outputs in full on every reconcile, so a missed write heals on the
//! next tick.

use crate::error::{PlaybackError, Result};
use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sugoi_core::{DigitalIo, Pin};

/// Output pins for every indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorLayout {
    /// Volume bar segments, lowest first
    pub volume_bar: Vec<Pin>,

    /// Repeat mode code, bit 0 first
    pub repeat: [Pin; 2],

    /// Shuffle LED
    pub shuffle: Pin,

    /// Mute LED
    pub mute: Pin,

    /// Playing animation, in chase order
    pub playing: Vec<Pin>,
}

impl IndicatorLayout {
    /// Check that the layout can be driven
    ///
    /// # Errors
    /// [`PlaybackError::InvalidIndicatorMapping`] when the volume bar or the
    /// playing animation has no pins, or a pin is used twice
    pub fn validate(&self) -> Result<()> {
        if self.volume_bar.is_empty() {
            return Err(PlaybackError::InvalidIndicatorMapping(
                "volume bar needs at least one segment".to_string(),
            ));
        }
        if self.playing.is_empty() {
            return Err(PlaybackError::InvalidIndicatorMapping(
                "playing animation needs at least one pin".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (name, pin) in self.named_pins() {
            if !seen.insert(pin) {
                return Err(PlaybackError::InvalidIndicatorMapping(format!(
                    "{pin} ({name}) is used by more than one indicator"
                )));
            }
        }
        Ok(())
    }

    /// Every output pin with its indicator name, in write order
    pub fn named_pins(&self) -> Vec<(String, Pin)> {
        let mut pins = Vec::with_capacity(self.volume_bar.len() + self.playing.len() + 4);
        pins.extend(
            self.volume_bar
                .iter()
                .enumerate()
                .map(|(i, pin)| (format!("volume_{i}"), *pin)),
        );
        pins.push(("repeat_0".to_string(), self.repeat[0]));
        pins.push(("repeat_1".to_string(), self.repeat[1]));
        pins.push(("shuffle".to_string(), self.shuffle));
        pins.push(("mute".to_string(), self.mute));
        pins.extend(
            self.playing
                .iter()
                .enumerate()
                .map(|(i, pin)| (format!("playing_{i}"), *pin)),
        );
        pins
    }
}

/// Indicator state derived from a playback snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorState {
    /// Lit volume bar segments
    pub volume_segments: usize,

    /// Repeat mode as a 2-bit code (Off = 00, All = 01, One = 10)
    pub repeat_code: u8,

    /// Shuffle LED on
    pub shuffle: bool,

    /// Mute LED on
    pub mute: bool,

    /// Lit position of the playing animation; `None` when not playing
    pub playing_position: Option<usize>,
}

impl IndicatorState {
    /// Derive indicator state for `layout` at animation `phase`
    pub fn derive(state: &PlaybackState, layout: &IndicatorLayout, phase: usize) -> Self {
        let segments = layout.volume_bar.len();
        let volume_segments =
            ((state.volume.clamp(0.0, 1.0) * segments as f32).round() as usize).min(segments);
        let playing_position = (state.is_playing && !layout.playing.is_empty())
            .then(|| phase % layout.playing.len());

        Self {
            volume_segments,
            repeat_code: state.repeat_mode.code(),
            shuffle: state.shuffle,
            mute: state.muted,
            playing_position,
        }
    }

    /// Output levels in [`IndicatorLayout::named_pins`] order
    pub fn levels(&self, layout: &IndicatorLayout) -> Vec<bool> {
        let mut levels = Vec::with_capacity(layout.volume_bar.len() + layout.playing.len() + 4);
        levels.extend((0..layout.volume_bar.len()).map(|i| i < self.volume_segments));
        levels.push(self.repeat_code & 0b01 != 0);
        levels.push(self.repeat_code & 0b10 != 0);
        levels.push(self.shuffle);
        levels.push(self.mute);
        levels.extend((0..layout.playing.len()).map(|i| self.playing_position == Some(i)));
        levels
    }
}

/// One output write issued by the reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorWrite {
    /// Indicator name (e.g. `volume_3`, `shuffle`)
    pub name: String,
    /// Output pin
    pub pin: Pin,
    /// Level written
    pub level: bool,
}

/// Pushes indicator state to the digital outputs
pub struct IndicatorReconciler {
    layout: IndicatorLayout,
    channels: Vec<(String, Pin)>,
    io: Arc<dyn DigitalIo>,
    phase: AtomicUsize,
}

impl IndicatorReconciler {
    /// Create a reconciler for a validated layout
    pub fn new(layout: IndicatorLayout, io: Arc<dyn DigitalIo>) -> Result<Self> {
        layout.validate()?;
        let channels = layout.named_pins();
        Ok(Self {
            layout,
            channels,
            io,
            phase: AtomicUsize::new(0),
        })
    }

    /// Configure every indicator pin as an output, driven low
    pub fn configure(&self) -> Result<()> {
        for (name, pin) in &self.channels {
            self.io.configure_output(*pin, false)?;
            tracing::debug!("Indicator {} on {}", name, pin);
        }
        Ok(())
    }

    /// Writes that would render `state` at the current animation phase
    pub fn plan(&self, state: &PlaybackState) -> Vec<IndicatorWrite> {
        let derived = IndicatorState::derive(state, &self.layout, self.phase());
        self.channels
            .iter()
            .zip(derived.levels(&self.layout))
            .map(|((name, pin), level)| IndicatorWrite {
                name: name.clone(),
                pin: *pin,
                level,
            })
            .collect()
    }

    /// Render `state` without advancing the animation
    ///
    /// Resets the animation phase when not playing.
    pub fn reconcile(&self, state: &PlaybackState) -> Result<Vec<IndicatorWrite>> {
        if !state.is_playing {
            self.phase.store(0, Ordering::Relaxed);
        }
        let writes = self.plan(state);
        for write in &writes {
            self.io.write(write.pin, write.level)?;
        }
        Ok(writes)
    }

    /// Advance the playing animation by one position and render `state`
    pub fn animate(&self, state: &PlaybackState) -> Result<Vec<IndicatorWrite>> {
        if state.is_playing {
            // Only the monitor loop animates
            let next = (self.phase.load(Ordering::Relaxed) + 1) % self.layout.playing.len();
            self.phase.store(next, Ordering::Relaxed);
        }
        self.reconcile(state)
    }

    /// Drive every indicator low
    pub fn clear(&self) -> Result<()> {
        for (_, pin) in &self.channels {
            self.io.write(*pin, false)?;
        }
        Ok(())
    }

    /// Current animation phase
    pub fn phase(&self) -> usize {
        self.phase.load(Ordering::Relaxed)
    }

    /// Configured layout
    pub fn layout(&self) -> &IndicatorLayout {
        &self.layout
    }
}

impl std::fmt::Debug for IndicatorReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorReconciler")
            .field("layout", &self.layout)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
