use core::time::Duration;

use airmon_core::sensors::{EnvironmentSensor, SensorError, SensorReading};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bme680::{Bme680, Config, Error};

const SENSOR: &str = "BME680";

/// BME680 exposed as the environment sensor of the display loop.
pub struct Bme680Sensor<I2C, D> {
    sensor: Bme680<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> Bme680Sensor<I2C, D> {
    /// Find the sensor at 0x76 or 0x77 and apply the default profile.
    pub fn new(i2c: I2C, delay: D) -> Result<Self, SensorError> {
        let sensor = Bme680::new(i2c, delay, Config::default()).map_err(|e| {
            log::error!("BME680 initialization failed: {:?}", e);
            SensorError::InitializationFailed {
                sensor: SENSOR,
                details: match e {
                    Error::NotFound => "no BME680 at 0x76 or 0x77",
                    Error::UnexpectedChipId(_) => "unexpected chip ID",
                    Error::I2c(_) => "I2C communication error",
                },
            }
        })?;

        Ok(Self { sensor })
    }

    pub fn address(&self) -> u8 {
        self.sensor.address()
    }
}

impl<I2C: I2c, D: DelayNs> EnvironmentSensor for Bme680Sensor<I2C, D> {
    fn poll(&mut self) -> Result<SensorReading, SensorError> {
        let data = self
            .sensor
            .measure()
            .map_err(|e| {
                log::error!("BME680 measurement failed: {:?}", e);
                SensorError::ReadFailed {
                    sensor: SENSOR,
                    operation: "forced measurement",
                    details: "I2C communication error or sensor not responding",
                }
            })?
            .ok_or(SensorError::NoNewData { sensor: SENSOR })?;

        Ok(SensorReading {
            temperature: data.temperature,
            humidity: data.humidity,
            pressure: data.pressure / 100.0,
            gas_resistance: data.gas_resistance,
            // An invalid conversion is as unusable as a cold heater
            heat_stable: data.heat_stable && data.gas_valid,
        })
    }

    fn measurement_time(&self) -> Duration {
        Duration::from_millis(self.sensor.profile_duration_ms() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bme680::{ADDR_CHIP_ID, ADDR_FIELD_0, CHIP_ID, I2C_ADDR_SECONDARY, reference};
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Register map shared with the test so it can be changed after init.
    #[derive(Clone)]
    struct SharedBus {
        regs: Rc<RefCell<[u8; 256]>>,
        broken: Rc<Cell<bool>>,
        pointer: u8,
    }

    impl SharedBus {
        fn new() -> Self {
            let mut regs = [0u8; 256];
            regs[ADDR_CHIP_ID as usize] = CHIP_ID;
            Self {
                regs: Rc::new(RefCell::new(regs)),
                broken: Rc::new(Cell::new(false)),
                pointer: 0,
            }
        }
    }

    impl ErrorType for SharedBus {
        type Error = ErrorKind;
    }

    impl I2c for SharedBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if address != I2C_ADDR_SECONDARY {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            if self.broken.get() {
                return Err(ErrorKind::Bus);
            }
            let mut regs = self.regs.borrow_mut();
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        if let Some((&reg, values)) = bytes.split_first() {
                            self.pointer = reg;
                            for (i, value) in values.iter().enumerate() {
                                regs[reg.wrapping_add(i as u8) as usize] = *value;
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        for (i, byte) in buf.iter_mut().enumerate() {
                            *byte = regs[self.pointer.wrapping_add(i as u8) as usize];
                        }
                    }
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn test_missing_sensor_fails_initialization() {
        let bus = SharedBus::new();
        bus.broken.set(true);

        let err = Bme680Sensor::new(bus, NoDelay).err();
        assert_eq!(
            err,
            Some(SensorError::InitializationFailed {
                sensor: "BME680",
                details: "no BME680 at 0x76 or 0x77",
            })
        );
    }

    #[test]
    fn test_poll_maps_field_data() {
        let bus = SharedBus::new();
        let mut sensor = Bme680Sensor::new(bus.clone(), NoDelay).unwrap();
        assert_eq!(sensor.address(), I2C_ADDR_SECONDARY);

        {
            let mut regs = bus.regs.borrow_mut();
            regs[ADDR_FIELD_0 as usize] = 0x80;
            regs[ADDR_FIELD_0 as usize + 14] = 0x30;
        }

        let reading = sensor.poll().unwrap();
        assert!(reading.heat_stable);
        // Blank calibration guards the pressure formula
        assert_eq!(reading.pressure, 0.0);
        assert!(reading.gas_resistance > 0.0);
    }

    #[test]
    fn test_poll_reports_pressure_in_hpa() {
        let bus = SharedBus::new();
        reference::load(&mut bus.regs.borrow_mut());
        let mut sensor = Bme680Sensor::new(bus, NoDelay).unwrap();

        let reading = sensor.poll().unwrap();
        let hpa = reference::PRESSURE_PA / 100.0;
        assert!((reading.pressure - hpa).abs() < 0.02);
        assert!(reading.pressure > 1005.0 && reading.pressure < 1006.0);
        let temp_error = reading.temperature - reference::TEMPERATURE_C;
        assert!(temp_error.abs() < 0.001);
    }

    #[test]
    fn test_invalid_gas_is_not_stable() {
        let bus = SharedBus::new();
        let mut sensor = Bme680Sensor::new(bus.clone(), NoDelay).unwrap();

        {
            let mut regs = bus.regs.borrow_mut();
            regs[ADDR_FIELD_0 as usize] = 0x80;
            // Heater stable, gas conversion not valid
            regs[ADDR_FIELD_0 as usize + 14] = 0x10;
        }

        assert!(!sensor.poll().unwrap().heat_stable);
    }

    #[test]
    fn test_measurement_time_matches_profile() {
        let sensor = Bme680Sensor::new(SharedBus::new(), NoDelay).unwrap();
        assert_eq!(sensor.measurement_time(), Duration::from_millis(183));
    }

    #[test]
    fn test_poll_without_new_data() {
        let mut sensor = Bme680Sensor::new(SharedBus::new(), NoDelay).unwrap();
        assert_eq!(
            sensor.poll(),
            Err(SensorError::NoNewData { sensor: "BME680" })
        );
    }

    #[test]
    fn test_bus_failure_is_read_failed() {
        let bus = SharedBus::new();
        let mut sensor = Bme680Sensor::new(bus.clone(), NoDelay).unwrap();
        bus.broken.set(true);

        assert_eq!(
            sensor.poll(),
            Err(SensorError::ReadFailed {
                sensor: "BME680",
                operation: "forced measurement",
                details: "I2C communication error or sensor not responding",
            })
        );
    }
}
