use crate::distribution::QualityGrid;

// Above this many grid points the surface is evaluated on the fly instead of cached.
const SURFACE_CACHE_MAX_POINTS: usize = 2048;

/// Probability that the home side wins given `quality_diff = home - visitor`.
///
/// `exp` overflows to infinity for very negative arguments, which makes the
/// result saturate at `0.0` instead of producing NaN.
pub fn win_probability(quality_diff: f64, offset: f64, slope: f64) -> f64 {
    1.0 / (1.0 + (-(offset + slope * quality_diff)).exp())
}

/// Home-win probability for every (visitor point, home point) pair of a grid.
///
/// The surface depends only on the grid and the sigmoid parameters, so a run
/// builds it once and reuses it for every game.
#[derive(Debug, Clone)]
pub struct OutcomeSurface {
    points: Vec<f64>,
    offset: f64,
    slope: f64,
    cached: Option<Vec<f64>>,
}

impl OutcomeSurface {
    pub fn new(grid: &QualityGrid, offset: f64, slope: f64) -> Self {
        let points = grid.points().to_vec();
        let n = points.len();
        let cached = (n <= SURFACE_CACHE_MAX_POINTS).then(|| {
            let mut surface = Vec::with_capacity(n * n);
            for qv in &points {
                for qh in &points {
                    surface.push(win_probability(qh - qv, offset, slope));
                }
            }
            surface
        });
        Self {
            points,
            offset,
            slope,
            cached,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Probability of the recorded outcome at visitor index `v`, home index `h`.
    #[inline]
    pub fn outcome_probability(&self, v: usize, h: usize, home_won: bool) -> f64 {
        let p = match &self.cached {
            Some(surface) => surface[v * self.points.len() + h],
            None => win_probability(self.points[h] - self.points[v], self.offset, self.slope),
        };
        if home_won { p } else { 1.0 - p }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_teams_without_offset_are_coin_flips() {
        assert!((win_probability(0.0, 0.0, 1.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn offset_favours_home_side() {
        assert!(win_probability(0.0, 0.28, 1.0) > 0.5);
    }

    #[test]
    fn strictly_increasing_in_quality_gap() {
        let mut prev = win_probability(-6.0, 0.28, 1.0);
        for i in 1..=120 {
            let diff = -6.0 + i as f64 * 0.1;
            let p = win_probability(diff, 0.28, 1.0);
            assert!(p > prev, "not increasing at diff={diff}");
            prev = p;
        }
    }

    #[test]
    fn saturates_without_nan() {
        let lo = win_probability(-1e6, 0.28, 1.0);
        let hi = win_probability(1e6, 0.28, 1.0);
        assert_eq!(lo, 0.0);
        assert_eq!(hi, 1.0);
        assert!(!win_probability(f64::MAX, 0.0, 10.0).is_nan());
    }

    #[test]
    fn cached_and_uncached_surfaces_agree() {
        let grid = QualityGrid::new(-1.0, 1.0, 0.5).expect("valid grid");
        let surface = OutcomeSurface::new(&grid, 0.28, 1.0);
        assert!(surface.cached.is_some());
        let uncached = OutcomeSurface {
            cached: None,
            ..surface.clone()
        };
        for v in 0..surface.len() {
            for h in 0..surface.len() {
                assert_eq!(
                    surface.outcome_probability(v, h, true),
                    uncached.outcome_probability(v, h, true)
                );
                assert_eq!(
                    surface.outcome_probability(v, h, false),
                    uncached.outcome_probability(v, h, false)
                );
            }
        }
    }
}
