//! Host CPU temperature probes
//!
//! The Raspberry Pi firmware reports the SoC temperature through
//! `vcgencmd measure_temp`. Kernels without the userland tools still expose
//! it as millidegrees in the first thermal zone.

use std::path::PathBuf;
use std::process::Command;

use airmon_core::sensors::{CpuTemperature, HostProbeError, describe};
use log::{info, warn};

pub const THERMAL_ZONE_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

fn unavailable(what: &str) -> HostProbeError {
    HostProbeError::Unavailable(describe(what))
}

/// Parse `temp=48.3'C` as printed by `vcgencmd measure_temp`.
pub fn parse_vcgencmd(output: &str) -> Result<f32, HostProbeError> {
    output
        .trim()
        .strip_prefix("temp=")
        .and_then(|rest| rest.strip_suffix("'C"))
        .and_then(|value| value.parse::<f32>().ok())
        .ok_or_else(|| HostProbeError::Malformed(describe(output.trim())))
}

/// Parse a sysfs thermal-zone value (integer millidegrees Celsius).
pub fn parse_millidegrees(output: &str) -> Result<f32, HostProbeError> {
    let millis = output
        .trim()
        .parse::<i32>()
        .map_err(|_| HostProbeError::Malformed(describe(output.trim())))?;
    Ok(millis as f32 / 1000.0)
}

/// Runs `vcgencmd measure_temp` on every read.
#[derive(Debug, Default)]
pub struct VcgencmdProbe;

impl CpuTemperature for VcgencmdProbe {
    fn read_celsius(&mut self) -> Result<f32, HostProbeError> {
        let output = Command::new("vcgencmd")
            .arg("measure_temp")
            .output()
            .map_err(|e| unavailable(&format!("vcgencmd: {e}")))?;

        let status = output.status;
        if !status.success() {
            return Err(unavailable(&format!("vcgencmd exited with {status}")));
        }

        parse_vcgencmd(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Reads a sysfs thermal zone on every read.
#[derive(Debug)]
pub struct ThermalZoneProbe {
    path: PathBuf,
}

impl ThermalZoneProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ThermalZoneProbe {
    fn default() -> Self {
        Self::new(THERMAL_ZONE_PATH)
    }
}

impl CpuTemperature for ThermalZoneProbe {
    fn read_celsius(&mut self) -> Result<f32, HostProbeError> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| unavailable(&format!("{}: {e}", self.path.display())))?;
        parse_millidegrees(&text)
    }
}

/// Whichever CPU temperature source answered at startup.
#[derive(Debug)]
pub enum CpuProbe {
    Vcgencmd(VcgencmdProbe),
    ThermalZone(ThermalZoneProbe),
}

impl CpuProbe {
    /// Prefer `vcgencmd`, falling back to the thermal zone when it cannot be
    /// run. Fails if neither source gives a temperature.
    pub fn detect() -> Result<Self, HostProbeError> {
        let mut vcgencmd = VcgencmdProbe;
        match vcgencmd.read_celsius() {
            Ok(temp) => {
                info!("CPU temperature via vcgencmd ({temp:.1} C)");
                return Ok(Self::Vcgencmd(vcgencmd));
            }
            Err(e) => warn!("{e}, trying {THERMAL_ZONE_PATH}"),
        }

        let mut zone = ThermalZoneProbe::default();
        let temp = zone.read_celsius()?;
        info!("CPU temperature via {THERMAL_ZONE_PATH} ({temp:.1} C)");
        Ok(Self::ThermalZone(zone))
    }
}

impl CpuTemperature for CpuProbe {
    fn read_celsius(&mut self) -> Result<f32, HostProbeError> {
        match self {
            Self::Vcgencmd(probe) => probe.read_celsius(),
            Self::ThermalZone(probe) => probe.read_celsius(),
        }
    }
}
