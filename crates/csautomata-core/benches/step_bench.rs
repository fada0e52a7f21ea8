use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use csautomata_core::{MetricVariant, RuleVariant, seed};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::hint::black_box;
use std::time::Duration;

fn env_sizes() -> Vec<usize> {
    std::env::var("CSA_BENCH_SIZES")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|t| t.trim().parse::<usize>().ok())
                .filter(|v| *v > 0)
                .collect::<Vec<_>>()
        })
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| vec![80_usize, 256, 512])
}

fn bench_rule_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_step");
    let measure: u64 = std::env::var("CSA_BENCH_MEASURE_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(5);
    group.measurement_time(Duration::from_secs(measure));
    for side in env_sizes() {
        for rule in RuleVariant::ALL {
            group.bench_function(format!("{rule}_side{side}"), |b| {
                b.iter_batched(
                    || seed(side, &mut SmallRng::seed_from_u64(0xBEEF)).expect("grid"),
                    |grid| black_box(rule.step(&grid)),
                    BatchSize::LargeInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_scores(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    for side in env_sizes() {
        let grid = seed(side, &mut SmallRng::seed_from_u64(0xBEEF)).expect("grid");
        for metric in MetricVariant::ALL {
            group.bench_function(format!("{metric}_side{side}"), |b| {
                b.iter(|| black_box(metric.score(black_box(&grid))));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_rule_steps, bench_scores);
criterion_main!(benches);
