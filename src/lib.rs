pub mod belief;
pub mod calibration;
pub mod cli;
pub mod config;
pub mod distribution;
pub mod error;
pub mod feed;
pub mod likelihood;
pub mod logging;
pub mod odds;
pub mod rank;
pub mod synthetic;
pub mod update;

pub use belief::{BeliefStore, TeamBelief};
pub use config::RatingConfig;
pub use error::RatingError;
pub use feed::Game;
pub use rank::{RankEntry, RankingResult, compute_rankings, compute_rankings_many, run_passes};
pub use update::{NumericalWarning, update_beliefs};
