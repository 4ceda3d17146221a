//! Sensor and host-probe abstractions
//!
//! The display loop never talks to a bus directly. It reads the environment
//! through [`EnvironmentSensor`] and the host CPU temperature through
//! [`CpuTemperature`]; the device binary and the simulator provide the
//! implementations.

use core::time::Duration;

use thiserror_no_std::Error;

/// Errors reported by an [`EnvironmentSensor`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor did not answer during initialization.
    #[error("{sensor} initialization failed: {details}")]
    InitializationFailed {
        sensor: &'static str,
        details: &'static str,
    },
    /// A bus transaction failed while reading a measurement.
    #[error("{sensor} read failed during {operation}: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    /// The sensor finished without producing fresh data this cycle.
    #[error("{sensor} has no new data")]
    NoNewData { sensor: &'static str },
}

/// Errors reported by a [`CpuTemperature`] probe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostProbeError {
    /// The platform command or file backing the probe does not exist.
    #[error("CPU temperature source unavailable: {0}")]
    Unavailable(heapless::String<64>),
    /// The probe answered with something that is not a temperature.
    #[error("unexpected CPU temperature output: {0}")]
    Malformed(heapless::String<64>),
}

/// One measurement from the environmental sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    /// Degrees Celsius, uncompensated.
    pub temperature: f32,
    /// Relative humidity, %RH.
    pub humidity: f32,
    /// Hectopascals.
    pub pressure: f32,
    /// Ohms.
    pub gas_resistance: f32,
    /// The gas heater reached its target temperature, so `gas_resistance` is valid.
    pub heat_stable: bool,
}

/// Environmental sensor producing temperature, humidity, pressure and gas
/// resistance in one poll.
pub trait EnvironmentSensor {
    /// Trigger a measurement and return it once available.
    fn poll(&mut self) -> Result<SensorReading, SensorError>;

    /// How long one `poll` blocks while the sensor measures. Paced loops
    /// subtract it from their sleep.
    fn measurement_time(&self) -> Duration {
        Duration::ZERO
    }
}

/// Source of the host CPU temperature in degrees Celsius.
pub trait CpuTemperature {
    fn read_celsius(&mut self) -> Result<f32, HostProbeError>;
}

impl<T: EnvironmentSensor + ?Sized> EnvironmentSensor for &mut T {
    fn poll(&mut self) -> Result<SensorReading, SensorError> {
        (**self).poll()
    }

    fn measurement_time(&self) -> Duration {
        (**self).measurement_time()
    }
}

impl<T: CpuTemperature + ?Sized> CpuTemperature for &mut T {
    fn read_celsius(&mut self) -> Result<f32, HostProbeError> {
        (**self).read_celsius()
    }
}

/// Build a short error description, truncating anything that does not fit.
pub fn describe(text: &str) -> heapless::String<64> {
    let mut out = heapless::String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
