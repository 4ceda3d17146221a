//! Fixed tuning constants for compensation, scoring and loop pacing.

use core::time::Duration;

/// Number of CPU-temperature samples kept for smoothing.
pub const SMOOTH_SIZE: usize = 10;

/// Number of most recent stable gas readings averaged into the baseline.
pub const BASELINE_WINDOW: usize = 50;

/// Default burn-in length in seconds (one poll per second).
pub const DEFAULT_BURN_IN_SECS: u32 = 300;

/// Optimal indoor humidity, %RH.
pub const DEFAULT_HUM_BASELINE: f32 = 40.0;

/// Share of the score given to humidity (25:75, humidity:gas).
pub const DEFAULT_HUM_WEIGHTING: f32 = 0.25;

/// Smaller numbers adjust the temperature down, and vice versa.
pub const DEFAULT_FACTOR: f32 = 1.0;

/// Delay between two iterations of the display loop.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Delay between two burn-in samples.
pub const BURN_IN_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Immutable tuning values threaded through the compensator, the scorer and
/// the display loop.
///
/// `Tuning::default()` matches the values the device ships with. The `with_*`
/// helpers exist for hosts that need a shorter warm-up (simulator, tests).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Temperature-compensation strength (1.0 = full correction).
    pub factor: f32,
    /// Humidity considered ideal, %RH.
    pub hum_baseline: f32,
    /// Humidity weight in the air-quality score (0.0..=1.0).
    pub hum_weighting: f32,
    /// Length of the gas-baseline burn-in, in one-second ticks. Each tick
    /// polls once and then sleeps one second minus the sensor's measurement
    /// time, so the burn-in lasts about this many seconds.
    pub burn_in_secs: u32,
    /// Sleep between two display-loop iterations.
    pub refresh_interval: Duration,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            factor: DEFAULT_FACTOR,
            hum_baseline: DEFAULT_HUM_BASELINE,
            hum_weighting: DEFAULT_HUM_WEIGHTING,
            burn_in_secs: DEFAULT_BURN_IN_SECS,
            refresh_interval: REFRESH_INTERVAL,
        }
    }
}

impl Tuning {
    pub fn with_factor(mut self, factor: f32) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_burn_in_secs(mut self, secs: u32) -> Self {
        self.burn_in_secs = secs;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Maximum humidity sub-score, reached at the humidity baseline.
    pub fn hum_score_max(&self) -> f32 {
        self.hum_weighting * 100.0
    }

    /// Maximum gas sub-score, reached at or above the gas baseline.
    pub fn gas_score_max(&self) -> f32 {
        100.0 - (self.hum_weighting * 100.0)
    }
}
