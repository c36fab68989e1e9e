//! Sugoitify Music Box Library
//!
//! GPIO front panel for the Sugoitify music box: configuration, track
//! library scanning, I/O backends and the async tasks that drive the
//! playback core.
//!
//! This library exposes the components for the `musicbox` binary and for
//! testing.

pub mod app;
pub mod backends;
pub mod config;
pub mod error;
pub mod library;
pub mod tasks;

// Re-export commonly used types for convenience
pub use app::MusicBox;
pub use config::MusicBoxConfig;
pub use error::{MusicBoxError, Result};
pub use library::scan_tracks;
