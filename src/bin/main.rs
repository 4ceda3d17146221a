//! Air-quality display for a Raspberry Pi with a BME680 breakout and a
//! 240x240 ST7789 panel in the front breakout slot.
//!
//! Set `RUST_LOG=debug` to see every reading.

use std::process::ExitCode;

use airmon::AppError;
use airmon::panel::{SPI_BUFFER_LEN, init_st7789};
use airmon::sensors::{Bme680Sensor, CpuProbe};
use airmon_core::display::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};
use airmon_core::{Monitor, Tuning};
use embedded_graphics::prelude::Size;
use env_logger::Env;
use log::{error, info};
use rppal::gpio::Gpio;
use rppal::hal::Delay;
use rppal::i2c::I2c;
use rppal::spi::{Bus, Mode, SimpleHalSpiDevice, SlaveSelect, Spi};

/// SPI clock for the ST7789.
const SPI_CLOCK_HZ: u32 = 80_000_000;

/// Data/command select line of the front slot.
const DC_PIN: u8 = 9;

/// Backlight enable of the front slot.
const BACKLIGHT_PIN: u8 = 19;

fn main() -> ExitCode {
    let env = Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    exit_code(run())
}

/// Log a fatal error once and turn it into the process status.
fn exit_code(result: Result<(), AppError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    info!("airmon starting");

    let i2c = I2c::new().map_err(AppError::i2c)?;
    let sensor = Bme680Sensor::new(i2c, Delay::new()).map_err(AppError::Sensor)?;
    info!("BME680 found at 0x{:02X}", sensor.address());

    let cpu = CpuProbe::detect().map_err(AppError::HostProbe)?;

    let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss1, SPI_CLOCK_HZ, Mode::Mode0)
        .map_err(AppError::spi)?;
    let gpio = Gpio::new().map_err(AppError::gpio)?;
    let dc = gpio.get(DC_PIN).map_err(AppError::gpio)?.into_output();
    let backlight = gpio
        .get(BACKLIGHT_PIN)
        .map_err(AppError::gpio)?
        .into_output();

    let mut delay = Delay::new();
    let mut buffer = [0u8; SPI_BUFFER_LEN];
    let panel = init_st7789(
        SimpleHalSpiDevice::new(spi),
        dc,
        backlight,
        &mut buffer,
        &mut delay,
    )?;

    let monitor = Monitor::new(
        sensor,
        cpu,
        panel,
        delay,
        Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32),
        Tuning::default(),
    );

    match monitor.run() {
        Ok(never) => match never {},
        Err(e) => Err(AppError::Monitor(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airmon_core::SensorError;

    #[test]
    fn test_failure_sets_exit_status() {
        let err = AppError::Sensor(SensorError::NoNewData { sensor: "BME680" });
        let code = exit_code(Err(err));
        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::FAILURE));
    }

    #[test]
    fn test_success_exit_status() {
        let code = exit_code(Ok(()));
        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::SUCCESS));
    }
}
