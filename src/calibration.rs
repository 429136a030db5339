//! Out-of-sample checks for home-win probabilities.

use serde::Serialize;
use tracing::warn;

use crate::belief::BeliefStore;
use crate::config::{DEFAULT_SIGMOID_OFFSET, RatingConfig};
use crate::error::RatingError;
use crate::feed::{Game, validate_games};
use crate::update::UpdateEngine;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub samples: usize,
    pub brier: f64,
    pub log_loss: f64,
    pub accuracy: f64,
}

impl Metrics {
    fn empty() -> Self {
        Self {
            samples: 0,
            brier: 0.0,
            log_loss: 0.0,
            accuracy: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationBin {
    pub bucket_start: f64,
    pub bucket_end: f64,
    pub count: usize,
    pub avg_pred: f64,
    pub actual_rate: f64,
}

/// Scores home-win probabilities against outcomes (`true` = home won).
pub fn evaluate_probs(predictions: &[f64], outcomes: &[bool]) -> Metrics {
    if predictions.is_empty() || predictions.len() != outcomes.len() {
        return Metrics::empty();
    }

    let mut brier_sum = 0.0_f64;
    let mut log_loss_sum = 0.0_f64;
    let mut correct = 0usize;

    for (&p, &home_won) in predictions.iter().zip(outcomes) {
        let y = if home_won { 1.0 } else { 0.0 };
        brier_sum += (p - y).powi(2);

        let actual_prob = (if home_won { p } else { 1.0 - p }).clamp(1e-12, 1.0);
        log_loss_sum += -actual_prob.ln();

        if (p >= 0.5) == home_won {
            correct += 1;
        }
    }

    let n = predictions.len() as f64;
    Metrics {
        samples: predictions.len(),
        brier: brier_sum / n,
        log_loss: log_loss_sum / n,
        accuracy: correct as f64 / n,
    }
}

pub fn calibration_bins(predictions: &[f64], outcomes: &[bool], bins: usize) -> Vec<CalibrationBin> {
    let bins = bins.max(2);
    let mut counts = vec![0usize; bins];
    let mut pred_sum = vec![0.0_f64; bins];
    let mut actual_sum = vec![0.0_f64; bins];

    for (&p, &home_won) in predictions.iter().zip(outcomes) {
        let p = p.clamp(0.0, 1.0);
        let idx = ((p * bins as f64).floor() as usize).min(bins - 1);
        counts[idx] += 1;
        pred_sum[idx] += p;
        if home_won {
            actual_sum[idx] += 1.0;
        }
    }

    (0..bins)
        .map(|i| {
            let count = counts[i];
            let (avg_pred, actual_rate) = if count > 0 {
                (pred_sum[i] / count as f64, actual_sum[i] / count as f64)
            } else {
                (0.0, 0.0)
            };
            CalibrationBin {
                bucket_start: i as f64 / bins as f64,
                bucket_end: (i + 1) as f64 / bins as f64,
                count,
                avg_pred,
                actual_rate,
            }
        })
        .collect()
}

/// Expected calibration error: count-weighted gap between predicted and
/// observed rates.
pub fn expected_calibration_error(bins: &[CalibrationBin]) -> f64 {
    let total: usize = bins.iter().map(|b| b.count).sum();
    if total == 0 {
        return 0.0;
    }
    bins.iter()
        .map(|b| b.count as f64 / total as f64 * (b.avg_pred - b.actual_rate).abs())
        .sum()
}

/// One chronological pass that predicts each game from the beliefs held
/// before it, then applies the update. Only information from earlier games
/// reaches each prediction.
pub fn walk_forward_predictions(
    games: &[Game],
    config: &RatingConfig,
) -> Result<Vec<f64>, RatingError> {
    config.validate()?;
    validate_games(games)?;
    if games.is_empty() {
        return Ok(Vec::new());
    }

    let engine = UpdateEngine::new(config)?;
    let mut store = BeliefStore::new();
    let mut out = Vec::with_capacity(games.len());
    for (game_index, game) in games.iter().enumerate() {
        let home = store.get_or_insert(&game.home);
        let visitor = store.get_or_insert(&game.visitor);
        out.push(engine.matchup_probability(&home, &visitor)?);

        let update = engine.update(&home, &visitor, game.home_won)?;
        for warning in &update.warnings {
            warn!(game_index, ?warning, "numerical instability during walk-forward");
        }
        store.set(&game.home, update.home);
        store.set(&game.visitor, update.visitor);
    }
    Ok(out)
}

/// Sigmoid offset implied by the league's home win rate, shrunk toward the
/// default for small samples.
pub fn fit_home_offset(games: &[Game]) -> f64 {
    if games.is_empty() {
        return DEFAULT_SIGMOID_OFFSET;
    }
    let home_wins = games.iter().filter(|g| g.home_won).count();
    let n = games.len() as f64;
    let rate = (home_wins as f64 / n).clamp(0.05, 0.95);
    let raw = (rate / (1.0 - rate)).ln();

    const MIN_N: f64 = 400.0;
    let w = (n / MIN_N).clamp(0.0, 1.0);
    (1.0 - w) * DEFAULT_SIGMOID_OFFSET + w * raw
}
