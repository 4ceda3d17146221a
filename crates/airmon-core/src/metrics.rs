//! Quality grading for displayed values
//!
//! Maps the air-quality score onto a small set of levels so the screen can
//! color the Air line without the reader having to know what "Air: 71.40"
//! means.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::WebColors;

/// Quality level assessment for a displayed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityLevel {
    /// Optimal conditions
    Excellent,
    /// Acceptable conditions
    Good,
    /// Sub-optimal conditions
    Poor,
    /// Problematic conditions
    Bad,
}

impl QualityLevel {
    /// Grade an air-quality score (higher is cleaner, 100 at baseline).
    pub fn from_air_quality(score: f32) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 75.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Poor
        } else {
            Self::Bad
        }
    }

    /// Get the display color for this quality level
    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Excellent => Rgb565::CSS_LIME,
            Self::Good => Rgb565::CSS_LIGHT_GREEN,
            Self::Poor => Rgb565::CSS_ORANGE,
            Self::Bad => Rgb565::CSS_RED,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Poor => "Poor",
            Self::Bad => "Bad",
        }
    }
}
