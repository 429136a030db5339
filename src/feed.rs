use std::collections::HashMap;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RatingError;

/// A completed game. Order of a game list is part of the rating semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub home: String,
    pub visitor: String,
    pub home_won: bool,
}

impl Game {
    pub fn new(home: impl Into<String>, visitor: impl Into<String>, home_won: bool) -> Self {
        Self {
            home: home.into(),
            visitor: visitor.into(),
            home_won,
        }
    }

    pub fn validate(&self, index: usize) -> Result<(), RatingError> {
        if self.home == self.visitor {
            return Err(RatingError::SameTeam {
                index,
                team: self.home.clone(),
            });
        }
        Ok(())
    }
}

pub fn validate_games(games: &[Game]) -> Result<(), RatingError> {
    for (index, game) in games.iter().enumerate() {
        game.validate(index)?;
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct GameRow {
    home: String,
    #[serde(alias = "visitor")]
    vis: String,
    #[serde(deserialize_with = "de_win_flag")]
    home_win: bool,
}

/// Reads `home,vis,home_win` rows (extra columns such as `game_id` or `date`
/// are ignored). Row order is kept; errors name the 0-based game index, the
/// same index rating warnings use.
pub fn read_games_csv<R: Read>(reader: R) -> Result<Vec<Game>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut games = Vec::new();
    for (idx, row) in rdr.deserialize::<GameRow>().enumerate() {
        let row = row.with_context(|| format!("invalid game {idx}"))?;
        let game = Game {
            home: row.home,
            visitor: row.vis,
            home_won: row.home_win,
        };
        game.validate(idx)?;
        games.push(game);
    }
    Ok(games)
}

pub fn load_games_csv(path: &Path) -> Result<Vec<Game>> {
    let file = File::open(path).with_context(|| format!("open games {}", path.display()))?;
    read_games_csv(file).with_context(|| format!("read games {}", path.display()))
}

pub fn load_games_json(path: &Path) -> Result<Vec<Game>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read games {}", path.display()))?;
    let games: Vec<Game> = serde_json::from_str(&raw).context("invalid games json")?;
    validate_games(&games)?;
    Ok(games)
}

/// Picks the loader from the file extension; anything but `.json` is CSV.
pub fn load_games(path: &Path) -> Result<Vec<Game>> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        load_games_json(path)
    } else {
        load_games_csv(path)
    }
}

/// One row of a score-by-score log: the running score after a scoring play.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoringEvent {
    pub game_id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub home: String,
    pub vis: String,
    pub time: f64,
    pub home_score: u32,
    pub vis_score: u32,
}

pub fn read_score_log_csv<R: Read>(reader: R) -> Result<Vec<ScoringEvent>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize()
        .enumerate()
        .map(|(idx, row)| row.with_context(|| format!("invalid scoring event row {}", idx + 1)))
        .collect()
}

pub fn load_score_log(path: &Path) -> Result<Vec<ScoringEvent>> {
    let file = File::open(path).with_context(|| format!("open score log {}", path.display()))?;
    read_score_log_csv(file).with_context(|| format!("read score log {}", path.display()))
}

/// Reduces a score log to one game per `game_id`, decided by its last scoring
/// event (largest `time`, later rows winning ties). Games come out ordered by
/// `(date, game_id)`.
pub fn games_from_score_log(events: &[ScoringEvent]) -> Result<Vec<Game>, RatingError> {
    let mut finals: HashMap<&str, &ScoringEvent> = HashMap::new();
    for event in events {
        match finals.get(event.game_id.as_str()) {
            Some(&prev) => {
                if prev.home != event.home || prev.vis != event.vis {
                    return Err(RatingError::InconsistentScoreLog {
                        game_id: event.game_id.clone(),
                    });
                }
                if event.time >= prev.time {
                    finals.insert(event.game_id.as_str(), event);
                }
            }
            None => {
                finals.insert(event.game_id.as_str(), event);
            }
        }
    }

    let mut ordered: Vec<&ScoringEvent> = finals.into_values().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.game_id.cmp(&b.game_id)));

    let games = ordered
        .into_iter()
        .map(|last| Game::new(&last.home, &last.vis, last.home_score > last.vis_score))
        .collect::<Vec<_>>();
    validate_games(&games)?;
    Ok(games)
}

pub(crate) fn parse_win_flag(raw: &str) -> Result<bool, RatingError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Ok(true),
        "false" | "f" | "0" | "no" => Ok(false),
        _ => Err(RatingError::InvalidWinFlag(raw.to_string())),
    }
}

fn de_win_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_win_flag(&raw).map_err(serde::de::Error::custom)
}
