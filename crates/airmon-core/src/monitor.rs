//! The display loop
//!
//! ```text
//!  WarmingUp ──(burn-in done)──▶ Running ──┐
//!                                  ▲       │ poll → compute → draw → sleep
//!                                  └───────┘
//! ```
//!
//! `WarmingUp` shows the collecting-data notice and runs the gas-baseline
//! burn-in. `Running` repeats forever: poll the sensor, and on a successful
//! heat-stable read compensate the temperature, score the air, redraw the
//! frame and push it to the panel. Every tick ends with the same fixed sleep,
//! rendered or not. The loop has no exit of its own.

use core::convert::Infallible;
use core::fmt::Write;

use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};
use thiserror_no_std::Error;

use crate::air_quality::{AirQualityScorer, GasBaseline};
use crate::burn_in::{BurnInError, acquire_gas_baseline};
use crate::compensation::TemperatureCompensator;
use crate::config::Tuning;
use crate::display::{Panel, Readout, draw_readout, draw_warming_up};
use crate::framebuffer::FrameBuffer;
use crate::metrics::QualityLevel;
use crate::sensors::{CpuTemperature, EnvironmentSensor, HostProbeError, SensorError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitorState {
    /// Collecting the gas baseline.
    WarmingUp,
    /// Refreshing the readout against a fixed baseline.
    Running { baseline: GasBaseline },
}

/// Outcome of one `Running` iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// The readout was redrawn with these values.
    Rendered(Readout),
    /// The sensor had nothing usable this tick.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// The gas heater has not reached its target temperature.
    NotHeatStable,
    /// The poll itself failed.
    SensorFailed(SensorError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("host probe failed: {0}")]
    HostProbe(HostProbeError),
    #[error("burn-in failed: {0}")]
    BurnIn(BurnInError),
    #[error("display refresh failed: {0}")]
    Panel(heapless::String<64>),
}

impl MonitorError {
    fn panel<E: core::fmt::Debug>(err: E) -> Self {
        let mut details = heapless::String::new();
        write!(details, "{:?}", err).ok();
        Self::Panel(details)
    }
}

/// Owns the collaborators and the loop state.
///
/// `run` is what the binaries call. `warm_up` and `tick` are the two halves
/// of it, exposed so a host can drive the loop step by step.
pub struct Monitor<S, C, P, D> {
    sensor: S,
    cpu: C,
    panel: P,
    delay: D,
    tuning: Tuning,
    compensator: TemperatureCompensator,
    scorer: AirQualityScorer,
    frame: FrameBuffer,
    state: MonitorState,
}

impl<S, C, P, D> Monitor<S, C, P, D>
where
    S: EnvironmentSensor,
    C: CpuTemperature,
    P: Panel,
    D: DelayNs,
{
    pub fn new(sensor: S, cpu: C, panel: P, delay: D, display_size: Size, tuning: Tuning) -> Self {
        Self {
            sensor,
            cpu,
            panel,
            delay,
            compensator: TemperatureCompensator::new(&tuning),
            scorer: AirQualityScorer::new(&tuning),
            frame: FrameBuffer::new(display_size),
            state: MonitorState::WarmingUp,
            tuning,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// Show the collecting-data notice, run the burn-in and enter `Running`.
    ///
    /// Calling this again once running keeps the existing baseline.
    pub fn warm_up(&mut self) -> Result<GasBaseline, MonitorError> {
        if let MonitorState::Running { baseline } = self.state {
            return Ok(baseline);
        }

        // Drawing into the framebuffer cannot fail.
        let Ok(()) = draw_warming_up(&mut self.frame);
        self.push_frame()?;

        let baseline = acquire_gas_baseline(&mut self.sensor, &mut self.delay, &self.tuning)
            .map_err(|e| {
                error!("Gas baseline burn-in failed: {}", e);
                MonitorError::BurnIn(e)
            })?;

        self.state = MonitorState::Running { baseline };
        info!("Display loop running with gas baseline {}", baseline);

        Ok(baseline)
    }

    /// One `Running` iteration, including the trailing sleep.
    ///
    /// Warms up first if that has not happened yet.
    pub fn tick(&mut self) -> Result<Tick, MonitorError> {
        let baseline = match self.state {
            MonitorState::Running { baseline } => baseline,
            MonitorState::WarmingUp => self.warm_up()?,
        };

        let outcome = self.refresh(baseline);
        self.delay
            .delay_ms(self.tuning.refresh_interval.as_millis() as u32);
        outcome
    }

    /// Warm up, then tick forever. Returns only on a fatal error.
    pub fn run(mut self) -> Result<Infallible, MonitorError> {
        self.warm_up()?;
        loop {
            self.tick()?;
        }
    }

    fn refresh(&mut self, baseline: GasBaseline) -> Result<Tick, MonitorError> {
        let reading = match self.sensor.poll() {
            Ok(reading) if reading.heat_stable => reading,
            Ok(_) => {
                debug!("Skipping refresh: gas heater not stable");
                return Ok(Tick::Skipped(SkipReason::NotHeatStable));
            }
            Err(e) => {
                warn!("Skipping refresh: {}", e);
                return Ok(Tick::Skipped(SkipReason::SensorFailed(e)));
            }
        };

        let cpu_temp = self.cpu.read_celsius().map_err(|e| {
            error!("CPU temperature probe failed: {}", e);
            MonitorError::HostProbe(e)
        })?;

        let readout = Readout {
            temperature: self.compensator.compensate(reading.temperature, cpu_temp),
            humidity: reading.humidity,
            pressure: reading.pressure,
            air_quality: self
                .scorer
                .score(reading.gas_resistance, reading.humidity, baseline),
        };

        debug!(
            "Readout: temp={:.2} hum={:.2} prs={:.2} air={:.2} ({})",
            readout.temperature,
            readout.humidity,
            readout.pressure,
            readout.air_quality.total(),
            QualityLevel::from_air_quality(readout.air_quality.total()).label()
        );

        let Ok(()) = draw_readout(&mut self.frame, &readout);
        self.push_frame()?;

        Ok(Tick::Rendered(readout))
    }

    fn push_frame(&mut self) -> Result<(), MonitorError> {
        self.panel.render(&mut self.frame).map_err(|e| {
            error!("Display refresh failed: {:?}", e);
            MonitorError::panel(e)
        })
    }
}
