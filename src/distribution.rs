//! Discretized quality densities.
//!
//! A [`QualityGrid`] is the half-open interval `[lower, upper)` sampled every
//! `step`, with points `lower + i * step`. Densities on it are plain `Vec<f64>`
//! buffers; probability mass is `sum(density * step)`.

use crate::error::RatingError;

/// Upper bound on grid points; the update cost grows with the square of this.
pub const MAX_GRID_POINTS: usize = 100_000;

const SQRT_2PI: f64 = 2.506_628_274_631_000_2;

#[derive(Debug, Clone, PartialEq)]
pub struct QualityGrid {
    step: f64,
    points: Vec<f64>,
}

impl QualityGrid {
    pub fn new(lower: f64, upper: f64, step: f64) -> Result<Self, RatingError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(RatingError::InvalidStep(step));
        }
        if !lower.is_finite() || !upper.is_finite() || !(lower < upper) {
            return Err(RatingError::InvalidBounds { lower, upper });
        }
        let count = ((upper - lower) / step).ceil();
        if !count.is_finite() || count > MAX_GRID_POINTS as f64 {
            return Err(RatingError::GridTooLarge {
                points: count,
                max: MAX_GRID_POINTS,
            });
        }
        let count = count as usize;
        let points = (0..count).map(|i| lower + i as f64 * step).collect();
        Ok(Self { step, points })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// First two moments of a discretized density.
///
/// `variance` is the raw `E[q^2] - E[q]^2` and may be slightly negative for a
/// density the grid cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub variance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityDistribution {
    step: f64,
    density: Vec<f64>,
}

impl QualityDistribution {
    pub fn zeros(grid: &QualityGrid) -> Self {
        Self {
            step: grid.step,
            density: vec![0.0; grid.len()],
        }
    }

    /// Normal pdf sampled at every grid point. Mass outside the grid is lost,
    /// so the result is not renormalized.
    pub fn sampled_normal(grid: &QualityGrid, mean: f64, stddev: f64) -> Self {
        let density = grid
            .points
            .iter()
            .map(|&q| {
                let z = (q - mean) / stddev;
                (-(z * z) / 2.0).exp() / SQRT_2PI / stddev
            })
            .collect();
        Self {
            step: grid.step,
            density,
        }
    }

    pub fn density(&self) -> &[f64] {
        &self.density
    }

    pub(crate) fn density_mut(&mut self) -> &mut [f64] {
        &mut self.density
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// `sum(density * step)`.
    pub fn mass(&self) -> f64 {
        self.density.iter().map(|d| d * self.step).sum()
    }

    /// Scales the density to unit mass and returns the normalizer used.
    ///
    /// A zero or non-finite normalizer leaves the density untouched.
    pub fn normalize(&mut self) -> f64 {
        let total = self.mass();
        if total > 0.0 && total.is_finite() {
            for d in &mut self.density {
                *d /= total;
            }
        }
        total
    }

    pub fn moments(&self, grid: &QualityGrid) -> Moments {
        let mut first = 0.0;
        let mut second = 0.0;
        for (q, d) in grid.points.iter().zip(&self.density) {
            first += q * d;
            second += (q * q) * d;
        }
        let mean = self.step * first;
        Moments {
            mean,
            variance: self.step * second - mean * mean,
        }
    }
}
