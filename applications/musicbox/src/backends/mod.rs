//! Digital I/O backends for the music box
//!
//! - [`console`]: keyboard-driven simulation on top of an in-memory pin bank
//! - `rpi` (feature `rpi`): Raspberry Pi GPIO through `rppal`

pub mod console;

#[cfg(feature = "rpi")]
pub mod rpi;
