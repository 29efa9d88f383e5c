use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ym_agents::{LockSearch, SearchConfig, ThrowScorer};
use ym_bench::sheet_with_filled;
use ym_core::{Aggregate, Throw};

fn throw() -> Throw {
    Throw::from_parts(&[1, 3, 4, 4, 6], &[])
}

fn bench_one_ply_cold(c: &mut Criterion) {
    let mut g = c.benchmark_group("ym_search_one_ply");
    for filled in [0usize, 6, 10] {
        let sheet = sheet_with_filled(filled).unwrap();
        g.bench_with_input(BenchmarkId::new("cold", filled), &sheet, |b, s| {
            b.iter(|| {
                let mut scorer = ThrowScorer::power_normalized(1.5);
                let mut search = LockSearch::new(SearchConfig::default());
                black_box(search.lock_scores(&mut scorer, s, throw(), false))
            })
        });
    }
    g.finish();
}

fn bench_two_ply(c: &mut Criterion) {
    let mut g = c.benchmark_group("ym_search_two_ply");
    g.sample_size(10);
    let sheet = sheet_with_filled(6).unwrap();
    for top_k in [Some(3), None] {
        let label = top_k.map_or("all".to_string(), |k| format!("k{k}"));
        let cfg = SearchConfig {
            top_k,
            deep_aggregate: Aggregate::Median,
        };
        g.bench_with_input(BenchmarkId::new("cold", &label), &cfg, |b, cfg| {
            b.iter(|| {
                let mut scorer = ThrowScorer::power_normalized(1.5);
                let mut search = LockSearch::new(*cfg);
                black_box(search.lock_scores(&mut scorer, &sheet, throw(), true))
            })
        });
    }

    // Warm: every table already memoized, measures the lookup path.
    let mut scorer = ThrowScorer::power_normalized(1.5);
    let mut search = LockSearch::new(SearchConfig {
        top_k: Some(3),
        deep_aggregate: Aggregate::Median,
    });
    search.lock_scores(&mut scorer, &sheet, throw(), true);
    g.bench_function("warm_k3", |b| {
        b.iter(|| black_box(search.lock_scores(&mut scorer, &sheet, throw(), true)))
    });
    g.finish();
}

criterion_group!(benches, bench_one_ply_cold, bench_two_ply);
criterion_main!(benches);
