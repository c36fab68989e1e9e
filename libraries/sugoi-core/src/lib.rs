//! Sugoitify Core
//!
//! Hardware-facing building blocks for the Sugoitify music box.
//!
//! The playback core never talks to a GPIO chip or an audio mixer directly.
//! Everything it needs from the outside world goes through two traits:
//! - [`AudioEngine`]: fire-and-forget transport commands plus busy/position queries
//! - [`DigitalIo`]: pin configuration, reads and writes
//!
//! This crate also ships in-memory implementations of both ([`sim::PinBank`],
//! [`sim::ClockedEngine`]) so the appliance can run on a desktop, and a scripted
//! engine for tests behind the `test-utils` feature.
//!
//! # Example
//!
//! ```rust
//! use sugoi_core::{sim::PinBank, DigitalIo, Pin, Pull};
//!
//! let bank = PinBank::new();
//! bank.configure_input(Pin(17), Pull::Up).unwrap();
//!
//! // Pull-up input idles high
//! assert!(bank.read(Pin(17)).unwrap());
//!
//! bank.set_input(Pin(17), false);
//! assert!(!bank.read(Pin(17)).unwrap());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod sim;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types
pub use error::{DeviceError, Result};
pub use traits::{AudioEngine, DigitalIo};
pub use types::{ActiveLevel, EngineStatus, Pin, Pull, RepeatMode, ENDED_POSITION};
