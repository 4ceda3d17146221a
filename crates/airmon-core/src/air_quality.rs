//! Heuristic air-quality score
//!
//! The score blends two deviations: humidity away from an ideal indoor value
//! and gas resistance below the clean-air baseline measured at startup.
//! It is not a standard index and is not clamped: humidity far from the
//! baseline can push the humidity part below zero.

use core::fmt;

use crate::config::Tuning;

/// Reference gas resistance in ohms representing "clean air".
///
/// Established once by the burn-in phase and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasBaseline {
    ohms: f32,
    samples: usize,
}

impl GasBaseline {
    /// Wrap an already known baseline value.
    pub const fn from_ohms(ohms: f32) -> Self {
        Self { ohms, samples: 0 }
    }

    /// Baseline computed from `samples` stable readings.
    pub(crate) const fn measured(ohms: f32, samples: usize) -> Self {
        Self { ohms, samples }
    }

    pub const fn ohms(&self) -> f32 {
        self.ohms
    }

    /// Number of stable readings averaged into this baseline (0 if supplied
    /// directly).
    pub const fn sample_count(&self) -> usize {
        self.samples
    }
}

impl fmt::Display for GasBaseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} Ohms", self.ohms)
    }
}

/// Air-quality score split into its humidity and gas contributions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirQualityScore {
    pub humidity: f32,
    pub gas: f32,
}

impl AirQualityScore {
    pub fn total(&self) -> f32 {
        self.humidity + self.gas
    }
}

/// Combines humidity and gas deviation into one score.
#[derive(Debug, Clone, Copy)]
pub struct AirQualityScorer {
    hum_baseline: f32,
    hum_weighting: f32,
}

impl AirQualityScorer {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            hum_baseline: tuning.hum_baseline,
            hum_weighting: tuning.hum_weighting,
        }
    }

    /// Score a reading against `baseline`. See [`AirQualityScore::total`].
    pub fn score(
        &self,
        gas_resistance: f32,
        humidity: f32,
        baseline: GasBaseline,
    ) -> AirQualityScore {
        AirQualityScore {
            humidity: self.humidity_score(humidity),
            gas: self.gas_score(gas_resistance, baseline.ohms()),
        }
    }

    /// Distance of `humidity` from the humidity baseline, worth at most
    /// `hum_weighting * 100` points.
    pub fn humidity_score(&self, humidity: f32) -> f32 {
        let offset = humidity - self.hum_baseline;
        let weight = self.hum_weighting * 100.0;

        if offset > 0.0 {
            // Too humid
            ((100.0 - self.hum_baseline - offset) / (100.0 - self.hum_baseline)) * weight
        } else {
            // Too dry
            ((self.hum_baseline + offset) / self.hum_baseline) * weight
        }
    }

    /// Drop of `gas_resistance` below the baseline, worth at most
    /// `100 - hum_weighting * 100` points.
    pub fn gas_score(&self, gas_resistance: f32, baseline_ohms: f32) -> f32 {
        let offset = baseline_ohms - gas_resistance;
        let weight = 100.0 - (self.hum_weighting * 100.0);

        if offset > 0.0 {
            (gas_resistance / baseline_ohms) * weight
        } else {
            weight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> AirQualityScorer {
        AirQualityScorer::new(&Tuning::default())
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        let diff = a - b;
        diff < 1e-3 && diff > -1e-3
    }

    #[test]
    fn test_perfect_conditions_score_100() {
        let score = scorer().score(500_000.0, 40.0, GasBaseline::from_ohms(500_000.0));
        assert_eq!(score.humidity, 25.0);
        assert_eq!(score.gas, 75.0);
        assert_eq!(score.total(), 100.0);
    }

    #[test]
    fn test_humid_air_scenario() {
        let hum = scorer().humidity_score(60.0);
        assert!(approx_eq(hum, 16.667), "got {hum}");
    }

    #[test]
    fn test_dry_air() {
        // (40 - 20) / 40 * 25
        assert_eq!(scorer().humidity_score(20.0), 12.5);
        assert_eq!(scorer().humidity_score(0.0), 0.0);
    }

    #[test]
    fn test_humidity_score_decreases_away_from_baseline() {
        let scorer = scorer();

        let mut previous = scorer.humidity_score(40.0);
        for step in 1..=60 {
            let current = scorer.humidity_score(40.0 + step as f32);
            assert!(current < previous, "wetter {step}: {current} >= {previous}");
            previous = current;
        }

        let mut previous = scorer.humidity_score(40.0);
        for step in 1..=40 {
            let current = scorer.humidity_score(40.0 - step as f32);
            assert!(current < previous, "drier {step}: {current} >= {previous}");
            previous = current;
        }
    }

    #[test]
    fn test_clean_air_gas_score_is_flat() {
        let scorer = scorer();
        for gas in [250_000.0, 250_000.5, 300_000.0, 1_000_000.0, 1.0e9] {
            assert_eq!(scorer.gas_score(gas, 250_000.0), 75.0);
        }
    }

    #[test]
    fn test_gas_score_drops_with_resistance() {
        let scorer = scorer();
        assert_eq!(scorer.gas_score(125_000.0, 250_000.0), 37.5);
        assert!(scorer.gas_score(1.0, 250_000.0) < 0.001);
        assert_eq!(scorer.gas_score(0.0, 250_000.0), 0.0);
    }

    #[test]
    fn test_score_is_not_clamped() {
        // Humidity above 100 %RH pushes the humidity share negative.
        let hum = scorer().humidity_score(110.0);
        assert!(hum < 0.0);
    }

    #[test]
    fn test_custom_weighting() {
        let mut tuning = Tuning::default();
        tuning.hum_weighting = 0.5;
        let score = AirQualityScorer::new(&tuning).score(
            100.0,
            40.0,
            GasBaseline::from_ohms(200.0),
        );
        assert_eq!(score.humidity, 50.0);
        assert_eq!(score.gas, 25.0);
    }

    #[test]
    fn test_baseline_display() {
        let baseline = GasBaseline::measured(123_456.789, 50);
        assert_eq!(alloc::format!("{}", baseline), "123456.79 Ohms");
        assert_eq!(baseline.sample_count(), 50);
    }
}
