//! Pairwise Bayesian update of two teams' beliefs after one game.
//!
//! Both priors are sampled on the quality grid, multiplied by the outcome
//! surface and marginalized per side. Each side's posterior integrates the
//! joint surface weighted by the opponent's *prior*; the two updates are not
//! resolved jointly.

use serde::Serialize;

use crate::belief::TeamBelief;
use crate::config::RatingConfig;
use crate::distribution::{QualityDistribution, QualityGrid};
use crate::error::RatingError;
use crate::likelihood::{OutcomeSurface, win_probability};

/// Normalizers below this are treated as a collapsed posterior.
pub const NORMALIZER_TOLERANCE: f64 = f64::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Home,
    Visitor,
}

/// Non-fatal numerical trouble found during an update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum NumericalWarning {
    /// Posterior mass was (nearly) zero. A zero or non-finite normalizer keeps
    /// the prior belief; a tiny positive one is still used.
    CollapsedNormalizer { side: Side, normalizer: f64 },
    /// `E[q^2] - E[q]^2` came out negative and was clamped to zero.
    NegativeVariance { side: Side, variance: f64 },
}

impl NumericalWarning {
    pub fn side(&self) -> Side {
        match *self {
            NumericalWarning::CollapsedNormalizer { side, .. } => side,
            NumericalWarning::NegativeVariance { side, .. } => side,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PairUpdate {
    pub home: TeamBelief,
    pub visitor: TeamBelief,
    pub home_posterior: QualityDistribution,
    pub visitor_posterior: QualityDistribution,
    pub warnings: Vec<NumericalWarning>,
}

/// Grid and outcome surface for one configuration, reusable across games.
#[derive(Debug, Clone)]
pub struct UpdateEngine {
    grid: QualityGrid,
    surface: OutcomeSurface,
    offset: f64,
    slope: f64,
}

impl UpdateEngine {
    pub fn new(config: &RatingConfig) -> Result<Self, RatingError> {
        config.validate()?;
        let grid = QualityGrid::new(config.lower, config.upper, config.step)?;
        let surface = OutcomeSurface::new(&grid, config.sigmoid_offset, config.sigmoid_slope);
        Ok(Self {
            grid,
            surface,
            offset: config.sigmoid_offset,
            slope: config.sigmoid_slope,
        })
    }

    pub fn grid(&self) -> &QualityGrid {
        &self.grid
    }

    pub fn update(
        &self,
        home: &TeamBelief,
        visitor: &TeamBelief,
        home_won: bool,
    ) -> Result<PairUpdate, RatingError> {
        home.validate()?;
        visitor.validate()?;

        let home_prior = QualityDistribution::sampled_normal(&self.grid, home.mean, home.stddev);
        let visitor_prior =
            QualityDistribution::sampled_normal(&self.grid, visitor.mean, visitor.stddev);
        let hp = home_prior.density();
        let vp = visitor_prior.density();

        let mut home_post = QualityDistribution::zeros(&self.grid);
        let mut visitor_post = QualityDistribution::zeros(&self.grid);
        {
            let hq = home_post.density_mut();
            let vq = visitor_post.density_mut();
            // Rows are visitor points, columns home points. Home sums accumulate
            // row by row; each visitor sum runs along its row.
            for (v, &pv) in vp.iter().enumerate() {
                let mut row = 0.0;
                for (h, &ph) in hp.iter().enumerate() {
                    let p = self.surface.outcome_probability(v, h, home_won);
                    hq[h] += ph * p * pv;
                    row += pv * p * ph;
                }
                vq[v] = row;
            }
        }

        let mut warnings = Vec::new();
        let home = self.finish(Side::Home, home, &mut home_post, &mut warnings);
        let visitor = self.finish(Side::Visitor, visitor, &mut visitor_post, &mut warnings);

        Ok(PairUpdate {
            home,
            visitor,
            home_posterior: home_post,
            visitor_posterior: visitor_post,
            warnings,
        })
    }

    /// Probability that `home` beats `visitor`, integrating the likelihood over
    /// both sampled priors.
    pub fn matchup_probability(
        &self,
        home: &TeamBelief,
        visitor: &TeamBelief,
    ) -> Result<f64, RatingError> {
        home.validate()?;
        visitor.validate()?;

        let home_prior = QualityDistribution::sampled_normal(&self.grid, home.mean, home.stddev);
        let visitor_prior =
            QualityDistribution::sampled_normal(&self.grid, visitor.mean, visitor.stddev);

        let mut joint = 0.0;
        for (v, &pv) in visitor_prior.density().iter().enumerate() {
            for (h, &ph) in home_prior.density().iter().enumerate() {
                joint += ph * self.surface.outcome_probability(v, h, true) * pv;
            }
        }
        let step = self.grid.step();
        let mass = home_prior.mass() * visitor_prior.mass();
        if !(mass > NORMALIZER_TOLERANCE) || !mass.is_finite() {
            // Neither prior is visible on the grid; fall back to the point estimate.
            return Ok(win_probability(
                home.mean - visitor.mean,
                self.offset,
                self.slope,
            ));
        }
        Ok((joint * step * step / mass).clamp(0.0, 1.0))
    }

    fn finish(
        &self,
        side: Side,
        prior: &TeamBelief,
        posterior: &mut QualityDistribution,
        warnings: &mut Vec<NumericalWarning>,
    ) -> TeamBelief {
        let normalizer = posterior.normalize();
        if !(normalizer >= NORMALIZER_TOLERANCE) || !normalizer.is_finite() {
            warnings.push(NumericalWarning::CollapsedNormalizer { side, normalizer });
            if !(normalizer > 0.0) || !normalizer.is_finite() {
                return *prior;
            }
        }

        let moments = posterior.moments(&self.grid);
        if moments.variance < 0.0 {
            warnings.push(NumericalWarning::NegativeVariance {
                side,
                variance: moments.variance,
            });
        }
        // Half a step is the narrowest spread the grid can represent.
        let stddev = moments.variance.max(0.0).sqrt().max(self.grid.step() / 2.0);
        TeamBelief {
            mean: moments.mean,
            stddev,
        }
    }
}

/// One-off update without reusing an engine. Builds the outcome surface each
/// call; use [`UpdateEngine`] when rating more than one game.
pub fn update_beliefs(
    home: &TeamBelief,
    visitor: &TeamBelief,
    home_won: bool,
    config: &RatingConfig,
) -> Result<PairUpdate, RatingError> {
    UpdateEngine::new(config)?.update(home, visitor, home_won)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> UpdateEngine {
        UpdateEngine::new(&RatingConfig::default()).expect("default config is valid")
    }

    #[test]
    fn winner_rises_and_loser_falls() {
        let out = engine()
            .update(&TeamBelief::PRIOR, &TeamBelief::PRIOR, true)
            .expect("valid update");
        assert!(out.home.mean > 0.0);
        assert!(out.visitor.mean < 0.0);
        assert!(out.home.stddev < 1.0);
        assert!(out.visitor.stddev < 1.0);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn home_offset_makes_a_home_win_less_informative() {
        let e = engine();
        let home_win = e
            .update(&TeamBelief::PRIOR, &TeamBelief::PRIOR, true)
            .expect("valid update");
        let visitor_win = e
            .update(&TeamBelief::PRIOR, &TeamBelief::PRIOR, false)
            .expect("valid update");
        // Beating the odds moves the winner further than the expected result does.
        assert!(visitor_win.visitor.mean > home_win.home.mean);
    }

    #[test]
    fn posteriors_are_normalized() {
        let out = engine()
            .update(
                &TeamBelief {
                    mean: 0.7,
                    stddev: 0.4,
                },
                &TeamBelief {
                    mean: -0.2,
                    stddev: 1.3,
                },
                false,
            )
            .expect("valid update");
        assert!((out.home_posterior.mass() - 1.0).abs() < 1e-6);
        assert!((out.visitor_posterior.mass() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_invalid_priors() {
        let bad = TeamBelief {
            mean: 0.0,
            stddev: -1.0,
        };
        assert!(matches!(
            engine().update(&bad, &TeamBelief::PRIOR, true),
            Err(RatingError::InvalidBelief { .. })
        ));
    }

    #[test]
    fn prior_off_the_grid_keeps_belief_and_warns() {
        let far = TeamBelief {
            mean: 80.0,
            stddev: 0.01,
        };
        let out = engine()
            .update(&far, &TeamBelief::PRIOR, true)
            .expect("valid update");
        assert_eq!(out.home, far);
        assert!(out.warnings.iter().any(|w| matches!(
            w,
            NumericalWarning::CollapsedNormalizer {
                side: Side::Home,
                ..
            }
        )));
    }

    #[test]
    fn point_mass_prior_clamps_variance_and_floors_stddev() {
        let e = engine();
        let pinned = TeamBelief {
            mean: -4.96,
            stddev: 1e-4,
        };
        let out = e
            .update(&pinned, &TeamBelief::PRIOR, true)
            .expect("valid update");
        assert!(out.warnings.iter().any(|w| matches!(
            w,
            NumericalWarning::NegativeVariance {
                side: Side::Home,
                variance,
            } if *variance < 0.0
        )));
        assert_eq!(out.home.stddev, e.grid().step() / 2.0);
        assert!((out.home.mean - pinned.mean).abs() < 1e-9);
        assert!(out.home.validate().is_ok());
    }

    #[test]
    fn matchup_probability_reflects_offset_and_gap() {
        let e = engine();
        let even = e
            .matchup_probability(&TeamBelief::PRIOR, &TeamBelief::PRIOR)
            .expect("valid beliefs");
        assert!(even > 0.5 && even < 0.6);

        let strong = TeamBelief {
            mean: 1.5,
            stddev: 0.3,
        };
        let p = e
            .matchup_probability(&strong, &TeamBelief::PRIOR)
            .expect("valid beliefs");
        assert!(p > even);
    }
}
