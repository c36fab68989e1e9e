//! Raspberry Pi GPIO backend

use crate::error::{MusicBoxError, Result};
use parking_lot::Mutex;
use rppal::gpio::{Gpio, InputPin, Level, OutputPin};
use std::collections::HashMap;
use sugoi_core::{DeviceError, DigitalIo, Pin, Pull};

/// `DigitalIo` over the Raspberry Pi GPIO header (BCM numbering)
pub struct RpiGpio {
    gpio: Gpio,
    inputs: Mutex<HashMap<Pin, InputPin>>,
    outputs: Mutex<HashMap<Pin, OutputPin>>,
}

impl RpiGpio {
    /// Open the GPIO peripheral
    pub fn new() -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| MusicBoxError::Hardware(e.to_string()))?;
        tracing::info!("GPIO peripheral opened");
        Ok(Self {
            gpio,
            inputs: Mutex::new(HashMap::new()),
            outputs: Mutex::new(HashMap::new()),
        })
    }

    fn claim(&self, pin: Pin) -> sugoi_core::Result<rppal::gpio::Pin> {
        // Dropping a claimed pin releases it back to the peripheral
        self.inputs.lock().remove(&pin);
        self.outputs.lock().remove(&pin);
        self.gpio
            .get(pin.0)
            .map_err(|e| DeviceError::gpio(pin, e.to_string()))
    }
}

impl DigitalIo for RpiGpio {
    fn configure_input(&self, pin: Pin, pull: Pull) -> sugoi_core::Result<()> {
        let raw = self.claim(pin)?;
        let input = match pull {
            Pull::Up => raw.into_input_pullup(),
            Pull::Down => raw.into_input_pulldown(),
            Pull::Off => raw.into_input(),
        };
        self.inputs.lock().insert(pin, input);
        Ok(())
    }

    fn configure_output(&self, pin: Pin, initial: bool) -> sugoi_core::Result<()> {
        let raw = self.claim(pin)?;
        let output = if initial {
            raw.into_output_high()
        } else {
            raw.into_output_low()
        };
        self.outputs.lock().insert(pin, output);
        Ok(())
    }

    fn read(&self, pin: Pin) -> sugoi_core::Result<bool> {
        self.inputs
            .lock()
            .get(&pin)
            .map(|input| input.read() == Level::High)
            .ok_or(DeviceError::UnconfiguredPin(pin))
    }

    fn write(&self, pin: Pin, level: bool) -> sugoi_core::Result<()> {
        let mut outputs = self.outputs.lock();
        let Some(output) = outputs.get_mut(&pin) else {
            if self.inputs.lock().contains_key(&pin) {
                return Err(DeviceError::WrongDirection {
                    pin,
                    expected: "output",
                });
            }
            return Err(DeviceError::UnconfiguredPin(pin));
        };
        output.write(if level { Level::High } else { Level::Low });
        Ok(())
    }
}

impl std::fmt::Debug for RpiGpio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpiGpio")
            .field("inputs", &self.inputs.lock().len())
            .field("outputs", &self.outputs.lock().len())
            .finish_non_exhaustive()
    }
}
