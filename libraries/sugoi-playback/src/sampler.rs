//! Digital input sampling
//!
//! Reads every bound button once per tick and reports the raw set of
//! asserted actions. No debouncing happens here.

use crate::error::{PlaybackError, Result};
use crate::types::Action;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use sugoi_core::{ActiveLevel, DigitalIo, Pin, Pull};

/// Button wiring for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBinding {
    /// Action triggered by the button
    pub action: Action,

    /// GPIO pin the button is wired to
    pub pin: Pin,

    /// Electrical level that means "pressed"
    #[serde(default)]
    pub active: ActiveLevel,

    /// Pull resistor applied to the pin
    #[serde(default)]
    pub pull: Pull,
}

/// Actions asserted in one tick, ordered by priority
pub type InputSet = BTreeSet<Action>;

/// Highest-priority action in a tick, if any
pub fn highest_priority(asserted: &InputSet) -> Option<Action> {
    asserted.first().copied()
}

/// Polls a fixed set of button inputs
pub struct InputSampler {
    bindings: Vec<InputBinding>,
    io: Arc<dyn DigitalIo>,
}

impl InputSampler {
    /// Create a sampler over `bindings`
    ///
    /// # Errors
    /// [`PlaybackError::InvalidInputMapping`] when there are no bindings or a
    /// pin or action is bound twice
    pub fn new(bindings: Vec<InputBinding>, io: Arc<dyn DigitalIo>) -> Result<Self> {
        if bindings.is_empty() {
            return Err(PlaybackError::InvalidInputMapping(
                "no inputs configured".to_string(),
            ));
        }

        let mut pins = HashSet::new();
        let mut actions = HashSet::new();
        for binding in &bindings {
            if !pins.insert(binding.pin) {
                return Err(PlaybackError::InvalidInputMapping(format!(
                    "{} is bound to more than one action",
                    binding.pin
                )));
            }
            if !actions.insert(binding.action) {
                return Err(PlaybackError::InvalidInputMapping(format!(
                    "action {} is bound to more than one pin",
                    binding.action
                )));
            }
        }

        Ok(Self { bindings, io })
    }

    /// Configure every bound pin as an input
    pub fn configure(&self) -> Result<()> {
        for binding in &self.bindings {
            self.io.configure_input(binding.pin, binding.pull)?;
            tracing::debug!(
                "Input {} on {} (active {:?}, pull {:?})",
                binding.action,
                binding.pin,
                binding.active,
                binding.pull
            );
        }
        Ok(())
    }

    /// Read every input once and return the asserted actions
    ///
    /// A failed read fails the whole tick; a partial set could hide a
    /// higher-priority press.
    pub fn poll(&self) -> Result<InputSet> {
        let mut asserted = InputSet::new();
        for binding in &self.bindings {
            let level = self.io.read(binding.pin)?;
            if binding.active.is_asserted(level) {
                asserted.insert(binding.action);
            }
        }
        if !asserted.is_empty() {
            tracing::trace!("Asserted inputs: {:?}", asserted);
        }
        Ok(asserted)
    }

    /// Configured bindings
    pub fn bindings(&self) -> &[InputBinding] {
        &self.bindings
    }
}

impl std::fmt::Debug for InputSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSampler")
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}
