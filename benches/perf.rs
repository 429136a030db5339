use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use hoops_ratings::belief::TeamBelief;
use hoops_ratings::config::RatingConfig;
use hoops_ratings::rank::{compute_rankings, compute_rankings_many};
use hoops_ratings::synthetic::synthetic_league;
use hoops_ratings::update::UpdateEngine;

fn bench_pair_update(c: &mut Criterion) {
    let engine = UpdateEngine::new(&RatingConfig::default()).expect("default config is valid");
    let home = TeamBelief::new(0.4, 0.7).expect("valid belief");
    let visitor = TeamBelief::new(-0.3, 0.9).expect("valid belief");
    c.bench_function("pair_update_1000pt", |b| {
        b.iter(|| {
            let out = engine
                .update(black_box(&home), black_box(&visitor), true)
                .unwrap();
            black_box(out.home.mean);
        })
    });
}

fn bench_season(c: &mut Criterion) {
    let cfg = RatingConfig::default().with_step(0.05);
    let league = synthetic_league(30, 1, 1.5, &cfg, 7);
    c.bench_function("season_30_teams_step_0.05", |b| {
        b.iter(|| {
            let ranking = compute_rankings(black_box(&league.games), &cfg).unwrap();
            black_box(ranking.len());
        })
    });
}

fn bench_many_leagues(c: &mut Criterion) {
    let cfg = RatingConfig::default().with_step(0.1);
    let leagues: Vec<_> = (0..8)
        .map(|seed| synthetic_league(12, 2, 1.5, &cfg, seed).games)
        .collect();
    c.bench_function("many_leagues_8x12", |b| {
        b.iter(|| {
            let results = compute_rankings_many(black_box(&leagues), &cfg);
            black_box(results.len());
        })
    });
}

criterion_group!(benches, bench_pair_update, bench_season, bench_many_leagues);
criterion_main!(benches);
