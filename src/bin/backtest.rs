use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use hoops_ratings::belief::BeliefStore;
use hoops_ratings::calibration;
use hoops_ratings::cli::{self, config_from_args, has_flag, parse_arg, parse_path_arg};
use hoops_ratings::config::RatingConfig;
use hoops_ratings::feed;
use hoops_ratings::logging;
use hoops_ratings::odds;
use hoops_ratings::rank::run_passes;
use hoops_ratings::update::UpdateEngine;

const DEFAULT_BINS: usize = 10;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::setup_logging();
    let args = cli::args();

    let games_path = parse_path_arg(&args, "--games")
        .or_else(|| std::env::var("RATING_GAMES_PATH").ok().map(PathBuf::from))
        .ok_or_else(|| anyhow!("usage: backtest --games=<csv|json> [--lines=<csv>] [--fit-offset]"))?;
    let games = feed::load_games(&games_path)?;
    if games.is_empty() {
        return Err(anyhow!("no games in {}", games_path.display()));
    }

    let mut config = config_from_args(&args);
    if has_flag(&args, "--fit-offset") {
        let fitted = calibration::fit_home_offset(&games);
        info!(fitted, "using fitted home offset");
        config.sigmoid_offset = fitted;
    }
    config.validate().context("invalid rating config")?;

    let predictions = calibration::walk_forward_predictions(&games, &config)?;
    let outcomes: Vec<bool> = games.iter().map(|g| g.home_won).collect();
    let metrics = calibration::evaluate_probs(&predictions, &outcomes);
    let bins = calibration::calibration_bins(
        &predictions,
        &outcomes,
        parse_arg(&args, "--bins").unwrap_or(DEFAULT_BINS),
    );

    let home_rate = outcomes.iter().filter(|&&won| won).count() as f64 / outcomes.len() as f64;
    let baseline = calibration::evaluate_probs(&vec![home_rate; outcomes.len()], &outcomes);

    println!("Games: {}", metrics.samples);
    println!("Sigmoid offset: {:.3}  slope: {:.3}", config.sigmoid_offset, config.sigmoid_slope);
    println!(
        "Walk-forward  brier {:.4}  log loss {:.4}  accuracy {:.1}%",
        metrics.brier,
        metrics.log_loss,
        metrics.accuracy * 100.0
    );
    println!(
        "Home-rate     brier {:.4}  log loss {:.4}  accuracy {:.1}%",
        baseline.brier,
        baseline.log_loss,
        baseline.accuracy * 100.0
    );
    println!("ECE: {:.4}", calibration::expected_calibration_error(&bins));
    for bin in bins.iter().filter(|b| b.count > 0) {
        println!(
            "  [{:.2}, {:.2})  n={:<5} pred {:.3}  actual {:.3}",
            bin.bucket_start, bin.bucket_end, bin.count, bin.avg_pred, bin.actual_rate
        );
    }

    if let Some(lines_path) = parse_path_arg(&args, "--lines") {
        compare_lines(&lines_path, &games, &config)?;
    }
    Ok(())
}

/// Prices each tracked line with the ratings after the full feed.
fn compare_lines(path: &Path, games: &[feed::Game], config: &RatingConfig) -> Result<()> {
    let lines = odds::load_lines(path)?;
    let run = run_passes(BeliefStore::new(), games, config)?;
    let engine = UpdateEngine::new(config)?;

    println!();
    println!("{:<6} {:<6} {:>7} {:>7} {:>7}", "home", "vis", "model", "market", "edge");
    let mut abs_edge_sum = 0.0;
    let mut priced = 0usize;
    for line in &lines {
        let market = match line.home_probability() {
            Ok(p) => p,
            Err(err) => {
                warn!(home = %line.home, vis = %line.vis, %err, "skipping line");
                continue;
            }
        };
        if !run.store.contains(&line.home) || !run.store.contains(&line.vis) {
            warn!(home = %line.home, vis = %line.vis, "line has an unrated team");
        }
        let model = engine.matchup_probability(&run.belief(&line.home), &run.belief(&line.vis))?;
        let edge = model - market;
        abs_edge_sum += edge.abs();
        priced += 1;
        println!(
            "{:<6} {:<6} {:>7.3} {:>7.3} {:>+7.3}",
            line.home, line.vis, model, market, edge
        );
    }
    if priced > 0 {
        println!("Mean |edge| over {priced} lines: {:.4}", abs_edge_sum / priced as f64);
    }
    Ok(())
}
