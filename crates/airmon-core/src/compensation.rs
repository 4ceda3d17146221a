//! CPU self-heating compensation for the sensor temperature
//!
//! The Pi's CPU sits a few millimetres from the BME680 and warms it up. The
//! distance between a smoothed CPU temperature and the raw sensor reading
//! approximates that bias; `factor` scales how much of it is removed.

use heapless::Deque;
use log::debug;

use crate::config::{SMOOTH_SIZE, Tuning};

/// Sliding window of the most recent CPU-temperature samples, oldest first.
///
/// Never holds more than [`SMOOTH_SIZE`] samples. A new sample evicts the
/// oldest one once the window is full.
#[derive(Debug, Clone, Default)]
pub struct CpuTempHistory {
    samples: Deque<f32, SMOOTH_SIZE>,
}

impl CpuTempHistory {
    pub const fn new() -> Self {
        Self {
            samples: Deque::new(),
        }
    }

    /// Append a sample, dropping the oldest one when the window is full.
    pub fn push(&mut self, celsius: f32) {
        if self.samples.is_full() {
            self.samples.pop_front();
        }
        // Cannot fail: a slot was freed above when the window was full.
        let _ = self.samples.push_back(celsius);
    }

    /// Mean of the samples in the window, `None` while empty.
    pub fn mean(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f32 = self.samples.iter().sum();
        Some(sum / self.samples.len() as f32)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in insertion order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.samples.iter()
    }
}

/// Removes CPU heat bias from raw sensor temperatures.
#[derive(Debug, Clone)]
pub struct TemperatureCompensator {
    factor: f32,
    history: CpuTempHistory,
}

impl TemperatureCompensator {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            factor: tuning.factor,
            history: CpuTempHistory::new(),
        }
    }

    /// Record `cpu_sample` and return `raw_temp` corrected by the smoothed
    /// CPU temperature.
    pub fn compensate(&mut self, raw_temp: f32, cpu_sample: f32) -> f32 {
        compensate(&mut self.history, self.factor, raw_temp, cpu_sample)
    }

    pub fn history(&self) -> &CpuTempHistory {
        &self.history
    }
}

/// `raw - ((smoothed_cpu - raw) / factor)` after appending `cpu_sample` to
/// `history`.
pub fn compensate(
    history: &mut CpuTempHistory,
    factor: f32,
    raw_temp: f32,
    cpu_sample: f32,
) -> f32 {
    history.push(cpu_sample);
    // The window holds at least the sample just pushed.
    let smoothed = history.mean().unwrap_or(cpu_sample);
    let compensated = raw_temp - ((smoothed - raw_temp) / factor);

    debug!(
        "Compensation: raw={:.2} cpu={:.2} smoothed={:.2} -> {:.2}",
        raw_temp, cpu_sample, smoothed, compensated
    );

    compensated
}
