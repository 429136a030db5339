use anyhow::{Context, Result, anyhow};
use tracing::info;

use hoops_ratings::belief::BeliefStore;
use hoops_ratings::cli::{self, config_from_args, has_flag, parse_arg, parse_path_arg};
use hoops_ratings::config::RatingConfig;
use hoops_ratings::feed::{self, Game};
use hoops_ratings::logging;
use hoops_ratings::rank::run_passes;
use hoops_ratings::synthetic;

const DEFAULT_SYNTHETIC_ROUNDS: usize = 4;
const DEFAULT_SYNTHETIC_SPREAD: f64 = 1.5;
const DEFAULT_SEED: u64 = 2021;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::setup_logging();
    let args = cli::args();

    let config = config_from_args(&args);
    config.validate().context("invalid rating config")?;

    let mut store = BeliefStore::new();
    let games = load_input(&args, &config, &mut store)?;
    info!(games = games.len(), passes = config.passes, step = config.step, "rating games");

    let run = run_passes(store, &games, &config)?;
    let ranking = run.ranking();

    if has_flag(&args, "--json") {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
        return Ok(());
    }

    let width = ranking
        .teams()
        .map(str::len)
        .max()
        .unwrap_or(4)
        .max(4);
    println!("{:>4}  {:<width$}  {:>8}  {:>7}", "rank", "team", "rating", "stddev");
    for (pos, entry) in ranking.entries.iter().rev().enumerate() {
        let belief = run.belief(&entry.team);
        println!(
            "{:>4}  {:<width$}  {:>8.3}  {:>7.3}",
            pos + 1,
            entry.team,
            entry.rating,
            belief.stddev
        );
    }
    println!(
        "{} games, {} teams, {} passes, {} numerical warnings",
        games.len(),
        ranking.len(),
        run.passes_completed,
        ranking.warnings.len()
    );
    Ok(())
}

fn load_input(args: &[String], config: &RatingConfig, store: &mut BeliefStore) -> Result<Vec<Game>> {
    if let Some(path) = parse_path_arg(args, "--games") {
        return feed::load_games(&path);
    }
    if let Some(path) = parse_path_arg(args, "--scores") {
        let events = feed::load_score_log(&path)?;
        return feed::games_from_score_log(&events)
            .with_context(|| format!("convert score log {}", path.display()));
    }
    if let Some(teams) = parse_arg::<usize>(args, "--synthetic") {
        if teams < 2 {
            return Err(anyhow!("--synthetic needs at least 2 teams"));
        }
        let rounds = parse_arg(args, "--rounds").unwrap_or(DEFAULT_SYNTHETIC_ROUNDS);
        let seed = parse_arg(args, "--seed").unwrap_or(DEFAULT_SEED);
        let league =
            synthetic::synthetic_league(teams, rounds, DEFAULT_SYNTHETIC_SPREAD, config, seed);
        // Full roster up front, in team order.
        for (team, _) in &league.qualities {
            store.register(team);
        }
        return Ok(league.games);
    }
    Err(anyhow!(
        "usage: rank --games=<csv|json> | --scores=<csv> | --synthetic=<teams> [--json]"
    ))
}
