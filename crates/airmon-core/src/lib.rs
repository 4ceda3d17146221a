//! Hardware-independent core library for airmon
//!
//! This crate contains all platform-agnostic logic for the airmon air-quality
//! display: CPU-heat temperature compensation, the heuristic air-quality
//! score and its gas-baseline burn-in, frame-buffer rendering and the
//! display loop that ties them together.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on the
//! Raspberry Pi binary and on desktop hosts (for the simulator and tests).
//! Hardware is reached only through the traits in [`sensors`] and
//! [`display::Panel`].

#![no_std]

extern crate alloc;

pub mod air_quality;
pub mod burn_in;
pub mod compensation;
pub mod config;
pub mod display;
pub mod framebuffer;
pub mod metrics;
pub mod monitor;
pub mod sensors;

pub use air_quality::{AirQualityScore, AirQualityScorer, GasBaseline};
pub use burn_in::{BurnInError, acquire_gas_baseline};
pub use compensation::{CpuTempHistory, TemperatureCompensator};
pub use config::Tuning;
pub use monitor::{Monitor, MonitorError, MonitorState, SkipReason, Tick};
pub use sensors::{CpuTemperature, EnvironmentSensor, HostProbeError, SensorError, SensorReading};
