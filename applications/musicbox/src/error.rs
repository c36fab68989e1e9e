/// Music box error types
use sugoi_core::DeviceError;
use sugoi_playback::PlaybackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MusicBoxError>;

#[derive(Debug, Error)]
pub enum MusicBoxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No playable tracks in {0}")]
    EmptyLibrary(String),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Hardware unavailable: {0}")]
    Hardware(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for MusicBoxError {
    fn from(err: config::ConfigError) -> Self {
        MusicBoxError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MusicBoxError {
    fn from(err: toml::ser::Error) -> Self {
        MusicBoxError::Config(err.to_string())
    }
}
