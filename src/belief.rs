use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RatingError;

/// Current estimate of a team's latent quality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamBelief {
    pub mean: f64,
    pub stddev: f64,
}

impl TeamBelief {
    /// Neutral prior given to a team the first time it is referenced.
    pub const PRIOR: TeamBelief = TeamBelief {
        mean: 0.0,
        stddev: 1.0,
    };

    pub fn new(mean: f64, stddev: f64) -> Result<Self, RatingError> {
        let belief = Self { mean, stddev };
        belief.validate()?;
        Ok(belief)
    }

    pub fn validate(&self) -> Result<(), RatingError> {
        if !self.mean.is_finite() || !self.stddev.is_finite() || self.stddev <= 0.0 {
            return Err(RatingError::InvalidBelief {
                mean: self.mean,
                stddev: self.stddev,
            });
        }
        Ok(())
    }
}

/// Beliefs keyed by team id, in first-reference order.
///
/// Insertion order is kept so that rankings break rating ties the same way on
/// every run.
#[derive(Debug, Clone, Default)]
pub struct BeliefStore {
    index: HashMap<Box<str>, usize>,
    entries: Vec<(Box<str>, TeamBelief)>,
}

impl BeliefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `team` with the neutral prior unless it is already present.
    pub fn register(&mut self, team: &str) {
        self.slot(team);
    }

    /// Current belief for `team`, or the neutral prior if it was never seen.
    /// Does not insert.
    pub fn belief(&self, team: &str) -> TeamBelief {
        self.get(team).unwrap_or(TeamBelief::PRIOR)
    }

    pub fn get(&self, team: &str) -> Option<TeamBelief> {
        self.index.get(team).map(|&i| self.entries[i].1)
    }

    /// Belief for `team`, creating it with the neutral prior on first reference.
    pub fn get_or_insert(&mut self, team: &str) -> TeamBelief {
        let i = self.slot(team);
        self.entries[i].1
    }

    /// Overwrites the belief for `team`.
    pub fn set(&mut self, team: &str, belief: TeamBelief) {
        let i = self.slot(team);
        self.entries[i].1 = belief;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, team: &str) -> bool {
        self.index.contains_key(team)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TeamBelief)> {
        self.entries.iter().map(|(team, belief)| (&**team, belief))
    }

    fn slot(&mut self, team: &str) -> usize {
        if let Some(&i) = self.index.get(team) {
            return i;
        }
        let i = self.entries.len();
        self.entries.push((team.into(), TeamBelief::PRIOR));
        self.index.insert(team.into(), i);
        i
    }
}
