use std::path::PathBuf;

use hoops_ratings::config::RatingConfig;
use hoops_ratings::feed::{self, Game};
use hoops_ratings::odds;
use hoops_ratings::rank::{compute_rankings, compute_rankings_many};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn loads_csv_game_feed_in_order() {
    let games = feed::load_games(&fixture("games.csv")).expect("fixture should parse");
    assert_eq!(games.len(), 8);
    assert_eq!(games[0], Game::new("BOS", "NYK", true));
    assert_eq!(games[2], Game::new("NYK", "MIA", false));
}

#[test]
fn csv_feed_ranks_unbeaten_team_first() {
    let games = feed::load_games(&fixture("games.csv")).expect("fixture should parse");
    let ranking = compute_rankings(&games, &RatingConfig::default()).expect("valid run");
    let order: Vec<&str> = ranking.teams().collect();
    assert_eq!(order.len(), 4);
    assert_eq!(order.first(), Some(&"LAL"));
    assert_eq!(order.last(), Some(&"BOS"));
    assert!(ranking.warnings.is_empty());
}

#[test]
fn loads_json_game_feed() {
    let games = feed::load_games(&fixture("games.json")).expect("fixture should parse");
    assert_eq!(
        games,
        vec![
            Game::new("BOS", "NYK", true),
            Game::new("NYK", "MIA", false),
            Game::new("MIA", "BOS", false),
        ]
    );
}

#[test]
fn score_log_reduces_to_final_results() {
    let events = feed::load_score_log(&fixture("score_log.csv")).expect("fixture should parse");
    assert_eq!(events.len(), 7);
    let games = feed::games_from_score_log(&events).expect("consistent log");
    assert_eq!(
        games,
        vec![
            Game::new("MIL", "BKN", true),
            Game::new("LAL", "GSW", false),
            Game::new("BKN", "PHI", false),
        ]
    );
}

#[test]
fn tracked_lines_skip_in_game_rows() {
    let lines = odds::load_lines(&fixture("lines.csv")).expect("fixture should parse");
    assert_eq!(lines.len(), 2);
    let bos = lines[0].home_probability().expect("valid line");
    let nyk = lines[1].home_probability().expect("valid line");
    assert!(bos > 0.65 && bos < 0.72);
    assert!(nyk < 0.5);
}

#[test]
fn many_leagues_keep_input_order() {
    let csv = feed::load_games(&fixture("games.csv")).expect("fixture should parse");
    let json = feed::load_games(&fixture("games.json")).expect("fixture should parse");
    let cfg = RatingConfig::default().with_step(0.05);
    let results = compute_rankings_many(&[csv, json], &cfg);
    assert_eq!(results.len(), 2);
    let first = results[0].as_ref().expect("valid run");
    let second = results[1].as_ref().expect("valid run");
    assert!(first.get("LAL").is_some());
    assert!(second.get("LAL").is_none());
}
