//! Device implementations of the core sensor traits

mod bme680;
mod cpu;

pub use bme680::Bme680Sensor;
pub use cpu::{
    CpuProbe, THERMAL_ZONE_PATH, ThermalZoneProbe, VcgencmdProbe, parse_millidegrees,
    parse_vcgencmd,
};
