//! Sugoitify - Playback Core
//!
//! Button-driven transport control for the Sugoitify music box.
//!
//! This crate provides:
//! - Per-action debouncing of noisy mechanical switches
//! - Input sampling with a fixed priority tie-break
//! - The playback state machine (shuffle, three-way repeat, position-aware
//!   backward, stepped volume with mute)
//! - LED indicator reconciliation (volume bar, repeat code, shuffle, mute,
//!   playing animation)
//! - Synchronous input and monitor loop ticks
//!
//! # Architecture
//!
//! `sugoi-playback` has no async runtime and no hardware dependency. The
//! audio engine and the GPIO pins are reached through the
//! [`sugoi_core::AudioEngine`] and [`sugoi_core::DigitalIo`] traits; the
//! application decides how often the loops tick.
//!
//! # Example
//!
//! ```rust
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use sugoi_core::sim::{ClockedEngine, PinBank};
//! use sugoi_core::{ActiveLevel, Pin, Pull};
//! use sugoi_playback::{
//!     Action, IndicatorLayout, IndicatorReconciler, InputBinding, InputLoop, InputSampler,
//!     InputTick, PlaybackConfig, PlaybackController,
//! };
//!
//! let io = Arc::new(PinBank::new());
//! let engine = Arc::new(ClockedEngine::new(Duration::from_secs(180)));
//!
//! let controller = Arc::new(PlaybackController::new(
//!     vec![PathBuf::from("/music/a.wav"), PathBuf::from("/music/b.wav")],
//!     engine,
//!     &PlaybackConfig::default(),
//! )?);
//!
//! let sampler = InputSampler::new(
//!     vec![InputBinding {
//!         action: Action::PlayPause,
//!         pin: Pin(17),
//!         active: ActiveLevel::Low,
//!         pull: Pull::Up,
//!     }],
//!     io.clone(),
//! )?;
//! sampler.configure()?;
//!
//! let indicators = Arc::new(IndicatorReconciler::new(
//!     IndicatorLayout {
//!         volume_bar: vec![Pin(2), Pin(3), Pin(4)],
//!         repeat: [Pin(5), Pin(6)],
//!         shuffle: Pin(12),
//!         mute: Pin(13),
//!         playing: vec![Pin(19), Pin(26)],
//!     },
//!     io.clone(),
//! )?);
//! indicators.configure()?;
//!
//! let input = InputLoop::new(sampler, controller.clone(), indicators);
//!
//! io.press(Pin(17), ActiveLevel::Low);
//! assert_eq!(input.tick(Instant::now())?, InputTick::Dispatched(Action::PlayPause));
//! assert!(controller.state().is_playing);
//! # Ok::<(), sugoi_playback::PlaybackError>(())
//! ```

mod control;
mod controller;
mod debounce;
mod error;
mod indicator;
mod sampler;
mod shuffle;
pub mod types;
mod volume;

// Public exports
pub use control::{InputLoop, InputTick, MonitorLoop, MonitorTick};
pub use controller::{AutoAdvance, PlaybackController};
pub use debounce::Debouncer;
pub use error::{PlaybackError, Result};
pub use indicator::{IndicatorLayout, IndicatorReconciler, IndicatorState, IndicatorWrite};
pub use sampler::{highest_priority, InputBinding, InputSampler, InputSet};
pub use shuffle::ShufflePicker;
pub use types::{Action, PlaybackConfig, PlaybackState};
pub use volume::Volume;
pub use sugoi_core::RepeatMode;
