use serde::{Deserialize, Serialize};
use std::fmt;

pub const SPEED_THRESHOLD_WPM: f64 = 80.0;
pub const FAST_THRESHOLD_WPM: f64 = 50.0;
pub const PRECISION_THRESHOLD: f64 = 95.0;
pub const ACCURATE_THRESHOLD: f64 = 80.0;

/// Achievement awarded for a single graded attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Badge {
    SpeedsterPrecisionMaster,
    Speedster,
    PrecisionMaster,
    FastTypist,
    AccurateTypist,
    Beginner,
}

impl Badge {
    /// Classify an attempt. Rules are checked in order and all thresholds are
    /// strict, so 80 wpm is not a Speedster.
    pub fn classify(wpm: f64, accuracy: f64) -> Self {
        let speedy = wpm > SPEED_THRESHOLD_WPM;
        let precise = accuracy > PRECISION_THRESHOLD;

        if speedy && precise {
            Badge::SpeedsterPrecisionMaster
        } else if speedy {
            Badge::Speedster
        } else if precise {
            Badge::PrecisionMaster
        } else if wpm > FAST_THRESHOLD_WPM {
            Badge::FastTypist
        } else if accuracy > ACCURATE_THRESHOLD {
            Badge::AccurateTypist
        } else {
            Badge::Beginner
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Badge::SpeedsterPrecisionMaster => "Speedster & Precision Master",
            Badge::Speedster => "Speedster",
            Badge::PrecisionMaster => "Precision Master",
            Badge::FastTypist => "Fast Typist",
            Badge::AccurateTypist => "Accurate Typist",
            Badge::Beginner => "Beginner",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Badge::SpeedsterPrecisionMaster | Badge::Speedster => "🚀",
            Badge::PrecisionMaster => "🎯",
            Badge::FastTypist => "🔥",
            Badge::AccurateTypist => "✅",
            Badge::Beginner => "📝",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn badge(wpm: f64, accuracy: f64) -> Badge {
    Badge::classify(wpm, accuracy)
}
