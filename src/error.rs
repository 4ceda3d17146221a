use core::fmt::Debug;

use airmon_core::sensors::describe;
use airmon_core::{HostProbeError, MonitorError, SensorError};
use thiserror_no_std::Error;

/// Errors that stop the device binary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Sensor error: {0}")]
    Sensor(SensorError),
    #[error("CPU temperature probe error: {0}")]
    HostProbe(HostProbeError),
    #[error("GPIO error: {0}")]
    Gpio(heapless::String<64>),
    #[error("SPI error: {0}")]
    Spi(heapless::String<64>),
    #[error("I2C error: {0}")]
    I2c(heapless::String<64>),
    #[error("Display initialization failed: {0}")]
    DisplayInit(heapless::String<64>),
    #[error("Display loop stopped: {0}")]
    Monitor(MonitorError),
}

/// Debug-format a driver error into a short description.
fn debug_text(err: impl Debug) -> heapless::String<64> {
    describe(&format!("{err:?}"))
}

impl AppError {
    pub fn gpio(err: impl Debug) -> Self {
        Self::Gpio(debug_text(err))
    }

    pub fn spi(err: impl Debug) -> Self {
        Self::Spi(debug_text(err))
    }

    pub fn i2c(err: impl Debug) -> Self {
        Self::I2c(debug_text(err))
    }

    pub fn display_init(err: impl Debug) -> Self {
        Self::DisplayInit(debug_text(err))
    }
}
