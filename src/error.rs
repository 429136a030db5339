//! Error types for rating runs and game feeds.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("discretization step must be positive and finite, got {0}")]
    InvalidStep(f64),
    #[error("quality bounds must satisfy lower < upper, got [{lower}, {upper})")]
    InvalidBounds { lower: f64, upper: f64 },
    #[error("quality grid would need {points} points, more than the supported {max}")]
    GridTooLarge { points: f64, max: usize },
    #[error("sigmoid {name} must be finite, got {value}")]
    NonFiniteSigmoid { name: &'static str, value: f64 },
    #[error("belief must have a finite mean and a positive finite stddev, got mean={mean} stddev={stddev}")]
    InvalidBelief { mean: f64, stddev: f64 },
    #[error("game {index} lists {team} as both home and visitor")]
    SameTeam { index: usize, team: String },
    #[error("scoring events for game {game_id} disagree on the teams involved")]
    InconsistentScoreLog { game_id: String },
    #[error("invalid home win flag {0:?}")]
    InvalidWinFlag(String),
    #[error("invalid moneyline {0}")]
    InvalidMoneyline(i32),
}
