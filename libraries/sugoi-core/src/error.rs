/// Errors reported by hardware collaborators
use crate::types::Pin;
use thiserror::Error;

/// Result type alias using `DeviceError`
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Failure of a digital I/O or audio engine call
///
/// Every variant is treated as transient by the control loops: the current
/// tick is skipped and the next tick samples the hardware again.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// A GPIO read, write or configuration failed
    #[error("GPIO error on pin {pin}: {message}")]
    Gpio { pin: Pin, message: String },

    /// Pin was used before being configured
    #[error("Pin {0} is not configured")]
    UnconfiguredPin(Pin),

    /// Pin was configured in the other direction
    #[error("Pin {pin} is not configured as {expected}")]
    WrongDirection { pin: Pin, expected: &'static str },

    /// Audio engine rejected or failed a command
    #[error("Audio engine error: {0}")]
    Engine(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DeviceError {
    /// Create a GPIO error
    pub fn gpio(pin: Pin, message: impl Into<String>) -> Self {
        Self::Gpio {
            pin,
            message: message.into(),
        }
    }

    /// Create an audio engine error
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }
}
