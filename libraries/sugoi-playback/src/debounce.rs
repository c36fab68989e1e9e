//! Per-action debouncing
//!
//! A mechanical button reads as pressed for many consecutive poll ticks. The
//! debouncer turns that into a single accepted press per `min_interval`.

use crate::error::{PlaybackError, Result};
use crate::types::Action;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Suppresses repeated presses of the same action within a minimum interval
///
/// Every action keeps its own record, so pressing one button never suppresses
/// another.
#[derive(Debug)]
pub struct Debouncer {
    min_interval: Duration,
    records: [Mutex<Option<Instant>>; Action::COUNT],
}

impl Debouncer {
    /// Create a debouncer
    ///
    /// # Errors
    /// [`PlaybackError::InvalidDebounceInterval`] when `min_interval` is zero
    pub fn new(min_interval: Duration) -> Result<Self> {
        if min_interval.is_zero() {
            return Err(PlaybackError::InvalidDebounceInterval(0.0));
        }
        Ok(Self {
            min_interval,
            records: std::array::from_fn(|_| Mutex::new(None)),
        })
    }

    /// Create a debouncer from an interval in seconds
    ///
    /// # Errors
    /// [`PlaybackError::InvalidDebounceInterval`] when `secs` is not a positive,
    /// finite number
    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(PlaybackError::InvalidDebounceInterval(secs));
        }
        Duration::try_from_secs_f64(secs)
            .map_err(|_| PlaybackError::InvalidDebounceInterval(secs))
            .and_then(Self::new)
    }

    /// Accept or reject a press of `action` observed at `now`
    ///
    /// Accepts (and records `now`) when the action was never accepted before
    /// or at least `min_interval` has passed since the last acceptance.
    /// A rejected press leaves the record untouched.
    pub fn accept(&self, action: Action, now: Instant) -> bool {
        let mut last = self.records[action.index()].lock();
        let due = match *last {
            None => true,
            Some(previous) => now.saturating_duration_since(previous) >= self.min_interval,
        };
        if due {
            *last = Some(now);
        }
        due
    }

    /// Configured minimum interval
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// When `action` was last accepted
    pub fn last_accepted(&self, action: Action) -> Option<Instant> {
        *self.records[action.index()].lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_millis(300);

    #[test]
    fn press_within_interval_is_rejected() {
        let debouncer = Debouncer::new(T).unwrap();
        let t0 = Instant::now();

        assert!(debouncer.accept(Action::Forward, t0));
        assert!(!debouncer.accept(Action::Forward, t0 + Duration::from_millis(299)));
    }

    #[test]
    fn press_after_exact_interval_is_accepted() {
        let debouncer = Debouncer::new(T).unwrap();
        let t0 = Instant::now();

        assert!(debouncer.accept(Action::Forward, t0));
        assert!(debouncer.accept(Action::Forward, t0 + T));
    }

    #[test]
    fn rejection_does_not_move_the_window() {
        let debouncer = Debouncer::new(T).unwrap();
        let t0 = Instant::now();

        assert!(debouncer.accept(Action::Stop, t0));
        assert!(!debouncer.accept(Action::Stop, t0 + Duration::from_millis(200)));
        assert_eq!(debouncer.last_accepted(Action::Stop), Some(t0));
        assert!(debouncer.accept(Action::Stop, t0 + Duration::from_millis(300)));
    }

    #[test]
    fn actions_are_independent() {
        let debouncer = Debouncer::new(T).unwrap();
        let t0 = Instant::now();

        assert!(debouncer.accept(Action::VolumeUp, t0));
        assert!(debouncer.accept(Action::VolumeDown, t0));
        assert!(!debouncer.accept(Action::VolumeUp, t0 + Duration::from_millis(10)));
        assert_eq!(debouncer.last_accepted(Action::Mute), None);
    }

    #[test]
    fn earlier_timestamp_is_rejected() {
        let debouncer = Debouncer::new(T).unwrap();
        let t0 = Instant::now() + Duration::from_secs(5);

        assert!(debouncer.accept(Action::Mute, t0));
        assert!(!debouncer.accept(Action::Mute, t0 - Duration::from_secs(1)));
    }

    #[test]
    fn non_positive_interval_is_rejected() {
        assert!(matches!(
            Debouncer::new(Duration::ZERO),
            Err(PlaybackError::InvalidDebounceInterval(_))
        ));
        assert!(Debouncer::from_secs_f64(0.0).is_err());
        assert!(Debouncer::from_secs_f64(-0.3).is_err());
        assert!(Debouncer::from_secs_f64(f64::NAN).is_err());
        assert!(Debouncer::from_secs_f64(f64::INFINITY).is_err());

        let debouncer = Debouncer::from_secs_f64(0.3).unwrap();
        assert_eq!(debouncer.min_interval(), T);
    }
}
