//! In-memory hardware backends
//!
//! Used by the console simulation of the music box and by tests:
//! - [`PinBank`]: a GPIO pin table with externally driven inputs and
//!   recorded output writes
//! - [`ClockedEngine`]: an audio engine whose position follows the wall clock
//!   and whose tracks all last a fixed length

use crate::error::{DeviceError, Result};
use crate::traits::{AudioEngine, DigitalIo};
use crate::types::{ActiveLevel, Pin, Pull, ENDED_POSITION};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PinMode {
    Input(Pull),
    Output,
}

#[derive(Debug, Clone, Copy)]
struct PinSlot {
    mode: PinMode,
    level: bool,
}

/// In-memory GPIO pin table
///
/// Inputs are driven from the outside with [`PinBank::set_input`] (or the
/// [`PinBank::press`]/[`PinBank::release`] helpers); outputs remember the
/// last level written and every write is recorded in order.
#[derive(Debug, Default)]
pub struct PinBank {
    slots: Mutex<BTreeMap<Pin, PinSlot>>,
    faults: Mutex<BTreeSet<Pin>>,
    writes: Mutex<Vec<(Pin, bool)>>,
}

impl PinBank {
    /// Create an empty pin bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive an input pin to a raw level
    ///
    /// Pins that were never configured become floating inputs.
    pub fn set_input(&self, pin: Pin, level: bool) {
        let mut slots = self.slots.lock();
        let slot = slots.entry(pin).or_insert(PinSlot {
            mode: PinMode::Input(Pull::Off),
            level,
        });
        slot.level = level;
    }

    /// Hold a button bound with `active` level down
    pub fn press(&self, pin: Pin, active: ActiveLevel) {
        self.set_input(pin, active.asserted_level());
    }

    /// Let go of a button bound with `active` level
    pub fn release(&self, pin: Pin, active: ActiveLevel) {
        self.set_input(pin, !active.asserted_level());
    }

    /// Current level of a pin, if configured
    pub fn level(&self, pin: Pin) -> Option<bool> {
        self.slots.lock().get(&pin).map(|slot| slot.level)
    }

    /// Whether a pin is configured as an output
    pub fn is_output(&self, pin: Pin) -> bool {
        self.slots
            .lock()
            .get(&pin)
            .is_some_and(|slot| slot.mode == PinMode::Output)
    }

    /// Make the next operation on `pin` fail once
    pub fn inject_fault(&self, pin: Pin) {
        self.faults.lock().insert(pin);
    }

    /// Drain the recorded output writes
    pub fn take_writes(&self) -> Vec<(Pin, bool)> {
        std::mem::take(&mut *self.writes.lock())
    }

    fn check_fault(&self, pin: Pin) -> Result<()> {
        if self.faults.lock().remove(&pin) {
            return Err(DeviceError::gpio(pin, "injected fault"));
        }
        Ok(())
    }
}

impl DigitalIo for PinBank {
    fn configure_input(&self, pin: Pin, pull: Pull) -> Result<()> {
        self.check_fault(pin)?;
        self.slots.lock().insert(
            pin,
            PinSlot {
                mode: PinMode::Input(pull),
                level: pull.idle_level(),
            },
        );
        Ok(())
    }

    fn configure_output(&self, pin: Pin, initial: bool) -> Result<()> {
        self.check_fault(pin)?;
        self.slots.lock().insert(
            pin,
            PinSlot {
                mode: PinMode::Output,
                level: initial,
            },
        );
        Ok(())
    }

    fn read(&self, pin: Pin) -> Result<bool> {
        self.check_fault(pin)?;
        self.level(pin).ok_or(DeviceError::UnconfiguredPin(pin))
    }

    fn write(&self, pin: Pin, level: bool) -> Result<()> {
        self.check_fault(pin)?;
        let mut slots = self.slots.lock();
        let slot = slots.get_mut(&pin).ok_or(DeviceError::UnconfiguredPin(pin))?;
        if slot.mode != PinMode::Output {
            return Err(DeviceError::WrongDirection {
                pin,
                expected: "output",
            });
        }
        slot.level = level;
        self.writes.lock().push((pin, level));
        Ok(())
    }
}

#[derive(Debug)]
struct Transport {
    track: Option<PathBuf>,
    started: Instant,
    paused_at: Option<Duration>,
    volume: f32,
}

/// Simulated audio engine driven by the wall clock
///
/// Every track lasts `track_length`. Once that much (unpaused) time has
/// passed the engine reports itself idle with the ended sentinel position,
/// exactly like a mixer that ran out of samples.
#[derive(Debug)]
pub struct ClockedEngine {
    track_length: Duration,
    transport: Mutex<Transport>,
}

impl ClockedEngine {
    /// Create an engine whose tracks last `track_length`
    pub fn new(track_length: Duration) -> Self {
        Self {
            track_length,
            transport: Mutex::new(Transport {
                track: None,
                started: Instant::now(),
                paused_at: None,
                volume: 1.0,
            }),
        }
    }

    /// Track currently loaded, if any
    pub fn current_track(&self) -> Option<PathBuf> {
        self.transport.lock().track.clone()
    }

    /// Last volume set on the engine
    pub fn volume(&self) -> f32 {
        self.transport.lock().volume
    }

    /// Whether the loaded track is paused
    pub fn is_paused(&self) -> bool {
        self.transport.lock().paused_at.is_some()
    }

    fn elapsed_at(&self, transport: &Transport, now: Instant) -> Option<Duration> {
        transport.track.as_ref()?;
        let elapsed = transport
            .paused_at
            .unwrap_or_else(|| now.saturating_duration_since(transport.started));
        (elapsed < self.track_length).then_some(elapsed)
    }

    fn position_at(&self, now: Instant) -> i64 {
        let transport = self.transport.lock();
        self.elapsed_at(&transport, now)
            .map_or(ENDED_POSITION, |elapsed| elapsed.as_millis() as i64)
    }
}

impl AudioEngine for ClockedEngine {
    fn load_and_play(&self, track: &Path) -> Result<()> {
        let mut transport = self.transport.lock();
        transport.track = Some(track.to_path_buf());
        transport.started = Instant::now();
        transport.paused_at = None;
        tracing::info!("Now playing {}", track.display());
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        let now = Instant::now();
        let mut transport = self.transport.lock();
        if transport.paused_at.is_none() {
            if let Some(elapsed) = self.elapsed_at(&transport, now) {
                transport.paused_at = Some(elapsed);
                tracing::debug!("Paused at {} ms", elapsed.as_millis());
            }
        }
        Ok(())
    }

    fn resume(&self) -> Result<()> {
        let mut transport = self.transport.lock();
        if let Some(paused_at) = transport.paused_at.take() {
            transport.started = Instant::now()
                .checked_sub(paused_at)
                .unwrap_or_else(Instant::now);
            tracing::debug!("Resumed at {} ms", paused_at.as_millis());
        }
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let mut transport = self.transport.lock();
        transport.track = None;
        transport.paused_at = None;
        tracing::debug!("Stopped");
        Ok(())
    }

    fn is_busy(&self) -> Result<bool> {
        Ok(self.position_at(Instant::now()) > ENDED_POSITION)
    }

    fn elapsed_position(&self) -> Result<i64> {
        Ok(self.position_at(Instant::now()))
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        self.transport.lock().volume = volume.clamp(0.0, 1.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_input_idles_at_pull_level() {
        let bank = PinBank::new();
        bank.configure_input(Pin(5), Pull::Up).unwrap();
        bank.configure_input(Pin(6), Pull::Down).unwrap();

        assert!(bank.read(Pin(5)).unwrap());
        assert!(!bank.read(Pin(6)).unwrap());
    }

    #[test]
    fn press_and_release_follow_active_level() {
        let bank = PinBank::new();
        bank.configure_input(Pin(5), Pull::Up).unwrap();

        bank.press(Pin(5), ActiveLevel::Low);
        assert!(!bank.read(Pin(5)).unwrap());

        bank.release(Pin(5), ActiveLevel::Low);
        assert!(bank.read(Pin(5)).unwrap());
    }

    #[test]
    fn unconfigured_read_fails() {
        let bank = PinBank::new();
        assert!(matches!(
            bank.read(Pin(9)),
            Err(DeviceError::UnconfiguredPin(Pin(9)))
        ));
    }

    #[test]
    fn writes_are_recorded_in_order() {
        let bank = PinBank::new();
        bank.configure_output(Pin(17), false).unwrap();
        bank.configure_output(Pin(27), false).unwrap();

        bank.write(Pin(17), true).unwrap();
        bank.write(Pin(27), true).unwrap();
        bank.write(Pin(17), false).unwrap();

        assert_eq!(
            bank.take_writes(),
            vec![(Pin(17), true), (Pin(27), true), (Pin(17), false)]
        );
        assert!(bank.take_writes().is_empty());
        assert_eq!(bank.level(Pin(27)), Some(true));
    }

    #[test]
    fn writing_an_input_is_rejected() {
        let bank = PinBank::new();
        bank.configure_input(Pin(5), Pull::Up).unwrap();
        assert!(matches!(
            bank.write(Pin(5), true),
            Err(DeviceError::WrongDirection { .. })
        ));
    }

    #[test]
    fn injected_fault_fails_exactly_once() {
        let bank = PinBank::new();
        bank.configure_input(Pin(5), Pull::Up).unwrap();
        bank.inject_fault(Pin(5));

        assert!(bank.read(Pin(5)).is_err());
        assert!(bank.read(Pin(5)).is_ok());
    }

    #[test]
    fn idle_engine_reports_ended() {
        let engine = ClockedEngine::new(Duration::from_secs(180));
        assert!(!engine.is_busy().unwrap());
        assert_eq!(engine.elapsed_position().unwrap(), ENDED_POSITION);
    }

    #[test]
    fn engine_plays_until_track_length() {
        let engine = ClockedEngine::new(Duration::from_secs(180));
        engine.load_and_play(Path::new("/music/a.wav")).unwrap();

        let started = engine.transport.lock().started;
        assert!(engine.position_at(started + Duration::from_secs(10)) >= 10_000);
        assert_eq!(
            engine.position_at(started + Duration::from_secs(181)),
            ENDED_POSITION
        );
        assert_eq!(engine.current_track(), Some(PathBuf::from("/music/a.wav")));
    }

    #[test]
    fn paused_engine_holds_position() {
        let engine = ClockedEngine::new(Duration::from_secs(180));
        engine.load_and_play(Path::new("/music/a.wav")).unwrap();
        engine.pause().unwrap();

        assert!(engine.is_paused());
        assert!(engine.is_busy().unwrap());

        let held = engine.elapsed_position().unwrap();
        let later = Instant::now() + Duration::from_secs(600);
        assert_eq!(engine.position_at(later), held);

        engine.resume().unwrap();
        assert!(!engine.is_paused());
    }

    #[test]
    fn stop_unloads_track() {
        let engine = ClockedEngine::new(Duration::from_secs(180));
        engine.load_and_play(Path::new("/music/a.wav")).unwrap();
        engine.stop().unwrap();

        assert!(!engine.is_busy().unwrap());
        assert_eq!(engine.current_track(), None);
    }

    #[test]
    fn volume_is_clamped() {
        let engine = ClockedEngine::new(Duration::from_secs(1));
        engine.set_volume(1.7).unwrap();
        assert_eq!(engine.volume(), 1.0);
        engine.set_volume(-0.2).unwrap();
        assert_eq!(engine.volume(), 0.0);
    }
}
