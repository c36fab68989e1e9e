//! Input and monitor loop bodies
//!
//! Each loop is a synchronous `tick` so it can be driven by a timer task in
//! the application and stepped deterministically in tests.

use crate::controller::{AutoAdvance, PlaybackController};
use crate::error::Result;
use crate::indicator::IndicatorReconciler;
use crate::sampler::{highest_priority, InputSampler};
use crate::types::Action;
use std::sync::Arc;
use std::time::Instant;
use sugoi_core::AudioEngine;

/// Outcome of one input tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTick {
    /// No button asserted
    Idle,
    /// Highest-priority action rejected by the debouncer
    Suppressed(Action),
    /// Highest-priority action dispatched
    Dispatched(Action),
}

/// Poll -> tie-break -> debounce -> transition -> reconcile
#[derive(Debug)]
pub struct InputLoop {
    sampler: InputSampler,
    controller: Arc<PlaybackController>,
    indicators: Arc<IndicatorReconciler>,
}

impl InputLoop {
    /// Create the input loop
    pub fn new(
        sampler: InputSampler,
        controller: Arc<PlaybackController>,
        indicators: Arc<IndicatorReconciler>,
    ) -> Self {
        Self {
            sampler,
            controller,
            indicators,
        }
    }

    /// Run one tick observed at `now`
    ///
    /// At most one transition runs per tick. Errors are transient: nothing
    /// was committed and the next tick starts fresh.
    pub fn tick(&self, now: Instant) -> Result<InputTick> {
        let asserted = self.sampler.poll()?;
        let outcome = match highest_priority(&asserted) {
            None => InputTick::Idle,
            Some(action) => match self.controller.handle_input(action, now)? {
                Some(_) => InputTick::Dispatched(action),
                None => InputTick::Suppressed(action),
            },
        };

        self.indicators.reconcile(&self.controller.state())?;
        Ok(outcome)
    }

    /// Input sampler
    pub fn sampler(&self) -> &InputSampler {
        &self.sampler
    }
}

/// Outcome of one monitor tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorTick {
    /// End of track seen; carries what the controller did about it
    Ended(AutoAdvance),
    /// Track running (or idle); animation advanced
    Animated,
}

/// Engine status -> auto-advance or animation
pub struct MonitorLoop {
    controller: Arc<PlaybackController>,
    engine: Arc<dyn AudioEngine>,
    indicators: Arc<IndicatorReconciler>,
}

impl MonitorLoop {
    /// Create the monitor loop
    pub fn new(
        controller: Arc<PlaybackController>,
        engine: Arc<dyn AudioEngine>,
        indicators: Arc<IndicatorReconciler>,
    ) -> Self {
        Self {
            controller,
            engine,
            indicators,
        }
    }

    /// Run one tick
    pub fn tick(&self) -> Result<MonitorTick> {
        let status = self.engine.status()?;
        if status.is_ended() {
            let outcome = self.controller.auto_advance(status)?;
            self.indicators.reconcile(&self.controller.state())?;
            return Ok(MonitorTick::Ended(outcome));
        }

        self.controller.observe_engine(status);
        self.indicators.animate(&self.controller.state())?;
        Ok(MonitorTick::Animated)
    }
}

impl std::fmt::Debug for MonitorLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorLoop")
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}
