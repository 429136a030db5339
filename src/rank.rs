use serde::Serialize;
use tracing::{debug, warn};

use crate::belief::{BeliefStore, TeamBelief};
use crate::config::{RatingConfig, rating_parallelism};
use crate::error::RatingError;
use crate::feed::{Game, validate_games};
use crate::update::{NumericalWarning, Side, UpdateEngine};

/// A numerical warning tied to the game and team it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunWarning {
    pub pass: usize,
    pub game_index: usize,
    pub team: String,
    pub warning: NumericalWarning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry {
    pub team: String,
    pub rating: f64,
}

/// Final ratings sorted ascending. Equal ratings keep first-reference order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingResult {
    pub entries: Vec<RankEntry>,
    pub warnings: Vec<RunWarning>,
}

impl RankingResult {
    pub fn from_store(store: &BeliefStore) -> Self {
        let mut entries: Vec<RankEntry> = store
            .iter()
            .map(|(team, belief)| RankEntry {
                team: team.to_string(),
                rating: belief.mean,
            })
            .collect();
        entries.sort_by(|a, b| a.rating.total_cmp(&b.rating));
        Self {
            entries,
            warnings: Vec::new(),
        }
    }

    pub fn get(&self, team: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.team == team)
            .map(|e| e.rating)
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.team.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// State of a driver run: the belief store after `passes_completed` passes.
#[derive(Debug, Clone, Default)]
pub struct RatingRun {
    pub store: BeliefStore,
    pub passes_completed: usize,
    pub warnings: Vec<RunWarning>,
}

impl RatingRun {
    pub fn belief(&self, team: &str) -> TeamBelief {
        self.store.belief(team)
    }

    pub fn ranking(&self) -> RankingResult {
        RankingResult {
            warnings: self.warnings.clone(),
            ..RankingResult::from_store(&self.store)
        }
    }

    pub fn into_ranking(self) -> RankingResult {
        RankingResult {
            warnings: self.warnings,
            ..RankingResult::from_store(&self.store)
        }
    }

    fn apply_pass(
        &mut self,
        engine: &UpdateEngine,
        games: &[Game],
        pass: usize,
    ) -> Result<(), RatingError> {
        for (game_index, game) in games.iter().enumerate() {
            let home = self.store.get_or_insert(&game.home);
            let visitor = self.store.get_or_insert(&game.visitor);
            let out = engine.update(&home, &visitor, game.home_won)?;

            for warning in out.warnings {
                let team = match warning.side() {
                    Side::Home => &game.home,
                    Side::Visitor => &game.visitor,
                };
                warn!(pass, game_index, team = %team, ?warning, "numerical instability in belief update");
                self.warnings.push(RunWarning {
                    pass,
                    game_index,
                    team: team.clone(),
                    warning,
                });
            }

            self.store.set(&game.home, out.home);
            self.store.set(&game.visitor, out.visitor);
        }
        self.passes_completed += 1;
        debug!(pass, teams = self.store.len(), games = games.len(), "rating pass complete");
        Ok(())
    }
}

/// Runs `config.passes` sequential passes over `games`, starting from `store`.
///
/// Teams already in `store` keep their beliefs until one of their games is
/// processed; teams that never play are left untouched.
pub fn run_passes(
    store: BeliefStore,
    games: &[Game],
    config: &RatingConfig,
) -> Result<RatingRun, RatingError> {
    config.validate()?;
    validate_games(games)?;
    for (_, belief) in store.iter() {
        belief.validate()?;
    }

    let mut run = RatingRun {
        store,
        ..RatingRun::default()
    };
    if games.is_empty() {
        debug!("no games to rate");
        return Ok(run);
    }

    let engine = UpdateEngine::new(config)?;
    for pass in 0..config.passes {
        run.apply_pass(&engine, games, pass)?;
    }
    debug!(
        passes = run.passes_completed,
        teams = run.store.len(),
        warnings = run.warnings.len(),
        "rating run complete"
    );
    Ok(run)
}

pub fn compute_rankings(
    games: &[Game],
    config: &RatingConfig,
) -> Result<RankingResult, RatingError> {
    Ok(run_passes(BeliefStore::new(), games, config)?.into_ranking())
}

/// Rates independent game lists (leagues, seasons) in parallel. Results are
/// in input order.
pub fn compute_rankings_many(
    leagues: &[Vec<Game>],
    config: &RatingConfig,
) -> Vec<Result<RankingResult, RatingError>> {
    use rayon::prelude::*;

    let rate_all = || -> Vec<Result<RankingResult, RatingError>> {
        leagues
            .par_iter()
            .map(|games| compute_rankings(games, config))
            .collect()
    };
    match rayon::ThreadPoolBuilder::new()
        .num_threads(rating_parallelism())
        .build()
    {
        Ok(pool) => pool.install(rate_all),
        Err(err) => {
            debug!(%err, "rating pool unavailable, using global pool");
            rate_all()
        }
    }
}
