//! Raspberry Pi hardware layer for airmon
//!
//! Wires a BME680 on I2C bus 1 and a 240x240 ST7789 on SPI0 into the
//! display loop from `airmon-core`.

pub mod bme680;
pub mod error;
pub mod panel;
pub mod sensors;

pub use error::AppError;
