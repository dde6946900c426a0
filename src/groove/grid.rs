// Musical Grid - Time signatures, grid divisions, and meter normalization
// Provides the timing vocabulary shared by the scheduler and the encoder

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when building a time signature
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("Time signature numerator must be at least 1")]
    ZeroNumerator,

    #[error("Time signature denominator must be a power of two, got {0}")]
    InvalidDenominator(u8),

    #[error("Invalid time signature notation: {0:?}")]
    InvalidNotation(String),
}

/// Musical time signature (numerator over a power-of-two denominator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct TimeSignature {
    numerator: u8,
    denominator: u8,
}

impl TimeSignature {
    /// 4/4 - the canonical meter every normalized duration is expressed in
    pub const COMMON: TimeSignature = TimeSignature {
        numerator: 4,
        denominator: 4,
    };

    /// Create a time signature, rejecting meters a MIDI file cannot declare
    pub fn new(numerator: u8, denominator: u8) -> Result<Self, GridError> {
        if numerator == 0 {
            return Err(GridError::ZeroNumerator);
        }
        if !denominator.is_power_of_two() {
            return Err(GridError::InvalidDenominator(denominator));
        }

        Ok(TimeSignature {
            numerator,
            denominator,
        })
    }

    /// Beats per bar
    pub fn numerator(&self) -> u8 {
        self.numerator
    }

    /// Note value that gets one beat (4 = quarter note)
    pub fn denominator(&self) -> u8 {
        self.denominator
    }

    /// Denominator as a power of two, the form stored in the time signature meta event
    pub fn denominator_power(&self) -> u8 {
        self.denominator.trailing_zeros() as u8
    }

    /// Linear scale factor that maps a duration in this meter onto 4/4
    ///
    /// Known compound and odd meters use a fixed table; anything else passes
    /// through unchanged. This flattens the internal subdivision of compound
    /// meters, so accents in 6/8 or 12/8 shuffles are not preserved.
    pub fn common_time_factor(&self) -> f64 {
        match (self.numerator, self.denominator) {
            (3, 4) => 0.75,
            (6, 8) => 2.0 / 3.0,
            (5, 4) => 0.8,
            (7, 8) => 4.0 / 7.0,
            (9, 8) => 4.0 / 9.0,
            (12, 8) => 2.0 / 3.0,
            _ => 1.0,
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::COMMON
    }
}

impl TryFrom<(u8, u8)> for TimeSignature {
    type Error = GridError;

    fn try_from((numerator, denominator): (u8, u8)) -> Result<Self, Self::Error> {
        TimeSignature::new(numerator, denominator)
    }
}

impl From<TimeSignature> for (u8, u8) {
    fn from(signature: TimeSignature) -> Self {
        (signature.numerator, signature.denominator)
    }
}

impl FromStr for TimeSignature {
    type Err = GridError;

    /// Parse the `"6/8"` notation used by song sheets
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridError::InvalidNotation(s.to_string());
        let (numerator, denominator) = s.trim().split_once('/').ok_or_else(invalid)?;
        let numerator = numerator.trim().parse::<u8>().map_err(|_| invalid())?;
        let denominator = denominator.trim().parse::<u8>().map_err(|_| invalid())?;
        TimeSignature::new(numerator, denominator)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Normalize a duration written in `original` meter to 4/4 beats
pub fn normalize(duration_beats: f64, original: TimeSignature) -> f64 {
    duration_beats * original.common_time_factor()
}

/// Grid division - the resolution start times and durations snap to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridDivision {
    /// Quarter notes (1 per beat)
    Quarter,

    /// Eighth notes (2 per beat)
    Eighth,

    /// Sixteenth notes (4 per beat)
    #[default]
    Sixteenth,

    /// Triplet feel (3 per beat)
    Triplet,
}

impl GridDivision {
    /// Get number of subdivisions per beat
    pub fn subdivisions_per_beat(&self) -> u32 {
        match self {
            GridDivision::Quarter => 1,
            GridDivision::Eighth => 2,
            GridDivision::Sixteenth => 4,
            GridDivision::Triplet => 3,
        }
    }
}
