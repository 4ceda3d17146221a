//! Gas-baseline burn-in
//!
//! The BME680 gas heater needs several minutes before its resistance settles.
//! Burn-in polls the sensor once per second for a fixed number of ticks and
//! keeps the last [`BASELINE_WINDOW`] heat-stable gas readings. Their mean is
//! the clean-air reference used by every later air-quality score.

use embedded_hal::delay::DelayNs;
use heapless::Deque;
use log::{debug, info, warn};
use thiserror_no_std::Error;

use crate::air_quality::GasBaseline;
use crate::config::{BASELINE_WINDOW, BURN_IN_SAMPLE_INTERVAL, Tuning};
use crate::sensors::EnvironmentSensor;

/// Log burn-in progress every this many ticks.
const PROGRESS_LOG_INTERVAL_TICKS: u32 = 30;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnInError {
    /// No poll reported a heat-stable reading during the whole window.
    #[error("no heat-stable gas reading after {ticks} burn-in ticks")]
    NoStableSamples { ticks: u32 },
}

/// Keeps the most recent stable gas readings of the burn-in window.
#[derive(Debug, Clone, Default)]
pub struct GasBaselineCollector {
    window: Deque<f32, BASELINE_WINDOW>,
    total: usize,
}

impl GasBaselineCollector {
    pub const fn new() -> Self {
        Self {
            window: Deque::new(),
            total: 0,
        }
    }

    /// Record one heat-stable gas reading, evicting the oldest once the
    /// window is full.
    pub fn record(&mut self, ohms: f32) {
        if self.window.is_full() {
            self.window.pop_front();
        }
        let _ = self.window.push_back(ohms);
        self.total += 1;
    }

    /// Readings currently held (at most [`BASELINE_WINDOW`]).
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Readings recorded since creation, including evicted ones.
    pub fn total_recorded(&self) -> usize {
        self.total
    }

    /// Mean of the window. `None` if nothing was recorded.
    pub fn baseline(&self) -> Option<GasBaseline> {
        if self.window.is_empty() {
            return None;
        }
        let sum: f32 = self.window.iter().sum();
        let count = self.window.len();
        Some(GasBaseline::measured(sum / count as f32, count))
    }
}

/// Run the blocking burn-in and return the gas baseline.
///
/// Polls `sensor` once per tick for `tuning.burn_in_secs` ticks, sleeping
/// [`BURN_IN_SAMPLE_INTERVAL`] after each poll. Failed and non-heat-stable
/// polls are skipped. Fewer than [`BASELINE_WINDOW`] stable readings still
/// produce a baseline (the mean of what was collected); none at all is an
/// error.
pub fn acquire_gas_baseline<S, D>(
    sensor: &mut S,
    delay: &mut D,
    tuning: &Tuning,
) -> Result<GasBaseline, BurnInError>
where
    S: EnvironmentSensor + ?Sized,
    D: DelayNs + ?Sized,
{
    let ticks = tuning.burn_in_secs;
    // Each tick lasts about one interval, measurement included.
    let measuring = sensor.measurement_time();
    let pause = BURN_IN_SAMPLE_INTERVAL.saturating_sub(measuring);
    info!(
        "Burn-in: collecting gas readings for {} s ({} ms between polls)",
        ticks,
        pause.as_millis()
    );

    let mut collector = GasBaselineCollector::new();

    for tick in 0..ticks {
        match sensor.poll() {
            Ok(reading) if reading.heat_stable => {
                collector.record(reading.gas_resistance);
                debug!(
                    "Burn-in tick {}: gas {:.0} Ohms",
                    tick, reading.gas_resistance
                );
            }
            Ok(_) => debug!("Burn-in tick {}: heater not stable yet", tick),
            Err(e) => warn!("Burn-in tick {}: sensor poll failed: {}", tick, e),
        }

        if (tick + 1) % PROGRESS_LOG_INTERVAL_TICKS == 0 {
            info!(
                "Burn-in: {}/{} s, {} stable readings",
                tick + 1,
                ticks,
                collector.total_recorded()
            );
        }

        delay.delay_ms(pause.as_millis() as u32);
    }

    let baseline = collector
        .baseline()
        .ok_or(BurnInError::NoStableSamples { ticks })?;

    if baseline.sample_count() < BASELINE_WINDOW {
        warn!(
            "Burn-in: only {} of {} stable readings, baseline may be skewed",
            baseline.sample_count(),
            BASELINE_WINDOW
        );
    }
    info!("Burn-in complete: gas baseline {}", baseline);

    Ok(baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{SensorError, SensorReading};
    use alloc::collections::VecDeque;
    use core::time::Duration;

    /// Replays a scripted sequence of polls, then repeats the last one.
    struct ScriptedSensor {
        script: VecDeque<Result<SensorReading, SensorError>>,
        polls: usize,
        measurement: Duration,
    }

    impl ScriptedSensor {
        fn new(script: impl IntoIterator<Item = Result<SensorReading, SensorError>>) -> Self {
            Self {
                script: script.into_iter().collect(),
                polls: 0,
                measurement: Duration::ZERO,
            }
        }

        fn with_measurement_time(mut self, measurement: Duration) -> Self {
            self.measurement = measurement;
            self
        }
    }

    impl EnvironmentSensor for ScriptedSensor {
        fn poll(&mut self) -> Result<SensorReading, SensorError> {
            self.polls += 1;
            if self.script.len() > 1 {
                self.script.pop_front().unwrap()
            } else {
                *self.script.front().unwrap()
            }
        }

        fn measurement_time(&self) -> Duration {
            self.measurement
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    fn stable(gas: f32) -> Result<SensorReading, SensorError> {
        Ok(SensorReading {
            gas_resistance: gas,
            heat_stable: true,
            ..SensorReading::default()
        })
    }

    fn unstable() -> Result<SensorReading, SensorError> {
        Ok(SensorReading {
            gas_resistance: 1.0,
            heat_stable: false,
            ..SensorReading::default()
        })
    }

    fn failed() -> Result<SensorReading, SensorError> {
        Err(SensorError::NoNewData { sensor: "test" })
    }

    #[test]
    fn test_collector_keeps_last_window() {
        let mut collector = GasBaselineCollector::new();
        for _ in 0..10 {
            collector.record(1_000.0);
        }
        for _ in 0..BASELINE_WINDOW {
            collector.record(2_000.0);
        }

        assert_eq!(collector.len(), BASELINE_WINDOW);
        assert_eq!(collector.total_recorded(), BASELINE_WINDOW + 10);
        let baseline = collector.baseline().unwrap();
        assert_eq!(baseline.ohms(), 2_000.0);
        assert_eq!(baseline.sample_count(), BASELINE_WINDOW);
    }

    #[test]
    fn test_collector_empty_has_no_baseline() {
        assert!(GasBaselineCollector::new().baseline().is_none());
    }

    #[test]
    fn test_burn_in_averages_stable_readings_only() {
        let mut sensor = ScriptedSensor::new([
            unstable(),
            failed(),
            stable(100.0),
            unstable(),
            stable(200.0),
            stable(300.0),
            failed(),
        ]);
        let mut delay = CountingDelay::default();
        let tuning = Tuning::default().with_burn_in_secs(6);

        let baseline = acquire_gas_baseline(&mut sensor, &mut delay, &tuning).unwrap();

        assert_eq!(baseline.ohms(), 200.0);
        assert_eq!(baseline.sample_count(), 3);
        assert_eq!(sensor.polls, 6);
    }

    #[test]
    fn test_burn_in_sleeps_once_per_tick() {
        let mut sensor = ScriptedSensor::new([stable(1.0)]);
        let mut delay = CountingDelay::default();
        let tuning = Tuning::default().with_burn_in_secs(12);

        acquire_gas_baseline(&mut sensor, &mut delay, &tuning).unwrap();

        assert_eq!(delay.total_ns, 12 * 1_000_000_000);
        assert_eq!(sensor.polls, 12);
    }

    #[test]
    fn test_burn_in_pause_excludes_measurement_time() {
        let mut sensor =
            ScriptedSensor::new([stable(1.0)]).with_measurement_time(Duration::from_millis(183));
        let mut delay = CountingDelay::default();
        let tuning = Tuning::default().with_burn_in_secs(12);

        acquire_gas_baseline(&mut sensor, &mut delay, &tuning).unwrap();

        assert_eq!(delay.total_ns, 12 * 817_000_000);
        assert_eq!(sensor.polls, 12);
    }

    #[test]
    fn test_burn_in_slow_sensor_does_not_sleep() {
        let mut sensor =
            ScriptedSensor::new([stable(1.0)]).with_measurement_time(Duration::from_secs(2));
        let mut delay = CountingDelay::default();
        let tuning = Tuning::default().with_burn_in_secs(3);

        acquire_gas_baseline(&mut sensor, &mut delay, &tuning).unwrap();

        assert_eq!(delay.total_ns, 0);
        assert_eq!(sensor.polls, 3);
    }

    #[test]
    fn test_burn_in_uses_last_fifty_readings() {
        let early = core::iter::repeat_n(stable(10_000.0), 20);
        let late = core::iter::repeat_n(stable(40_000.0), BASELINE_WINDOW);
        let mut sensor = ScriptedSensor::new(early.chain(late));
        let mut delay = CountingDelay::default();
        let tuning = Tuning::default().with_burn_in_secs(70);

        let baseline = acquire_gas_baseline(&mut sensor, &mut delay, &tuning).unwrap();

        assert_eq!(baseline.ohms(), 40_000.0);
        assert_eq!(baseline.sample_count(), BASELINE_WINDOW);
    }

    #[test]
    fn test_burn_in_without_stable_readings_fails() {
        let mut sensor = ScriptedSensor::new([unstable(), failed()]);
        let mut delay = CountingDelay::default();
        let tuning = Tuning::default().with_burn_in_secs(5);

        let err = acquire_gas_baseline(&mut sensor, &mut delay, &tuning).unwrap_err();

        assert_eq!(err, BurnInError::NoStableSamples { ticks: 5 });
    }

    #[test]
    fn test_zero_length_burn_in_fails() {
        let mut sensor = ScriptedSensor::new([stable(1.0)]);
        let mut delay = CountingDelay::default();
        let tuning = Tuning::default().with_burn_in_secs(0);

        let result = acquire_gas_baseline(&mut sensor, &mut delay, &tuning);
        assert!(result.is_err());
        assert_eq!(sensor.polls, 0);
    }
}
