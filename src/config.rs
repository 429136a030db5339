use std::env;

use serde::{Deserialize, Serialize};

use crate::error::RatingError;

pub const DEFAULT_PASSES: usize = 2;
pub const DEFAULT_SIGMOID_OFFSET: f64 = 0.28;
pub const DEFAULT_SIGMOID_SLOPE: f64 = 1.0;
pub const DEFAULT_STEP: f64 = 0.01;
pub const DEFAULT_LOWER: f64 = -5.0;
pub const DEFAULT_UPPER: f64 = 5.0;

/// Parameters of one rating run.
///
/// The quality grid is the half-open interval `[lower, upper)` sampled every
/// `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    pub passes: usize,
    pub sigmoid_offset: f64,
    pub sigmoid_slope: f64,
    pub step: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            sigmoid_offset: DEFAULT_SIGMOID_OFFSET,
            sigmoid_slope: DEFAULT_SIGMOID_SLOPE,
            step: DEFAULT_STEP,
            lower: DEFAULT_LOWER,
            upper: DEFAULT_UPPER,
        }
    }
}

impl RatingConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            passes: env_parse("RATING_PASSES").unwrap_or(d.passes),
            sigmoid_offset: env_parse("RATING_SIGMOID_OFFSET").unwrap_or(d.sigmoid_offset),
            sigmoid_slope: env_parse("RATING_SIGMOID_SLOPE").unwrap_or(d.sigmoid_slope),
            step: env_parse("RATING_STEP").unwrap_or(d.step),
            lower: env_parse("RATING_LOWER").unwrap_or(d.lower),
            upper: env_parse("RATING_UPPER").unwrap_or(d.upper),
        }
    }

    pub fn with_passes(self, passes: usize) -> Self {
        Self { passes, ..self }
    }

    pub fn with_sigmoid(self, offset: f64, slope: f64) -> Self {
        Self {
            sigmoid_offset: offset,
            sigmoid_slope: slope,
            ..self
        }
    }

    pub fn with_step(self, step: f64) -> Self {
        Self { step, ..self }
    }

    pub fn with_bounds(self, lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), RatingError> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(RatingError::InvalidStep(self.step));
        }
        // `!(a < b)` also rejects NaN bounds.
        if !self.lower.is_finite() || !self.upper.is_finite() || !(self.lower < self.upper) {
            return Err(RatingError::InvalidBounds {
                lower: self.lower,
                upper: self.upper,
            });
        }
        if !self.sigmoid_offset.is_finite() {
            return Err(RatingError::NonFiniteSigmoid {
                name: "offset",
                value: self.sigmoid_offset,
            });
        }
        if !self.sigmoid_slope.is_finite() {
            return Err(RatingError::NonFiniteSigmoid {
                name: "slope",
                value: self.sigmoid_slope,
            });
        }
        Ok(())
    }
}

/// Worker count for runs over several independent leagues.
pub fn rating_parallelism() -> usize {
    env_parse::<usize>("RATING_PARALLELISM")
        .unwrap_or(4)
        .clamp(1, 32)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<T>().ok())
}
