use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use electoral_forecast::core::ForecastConfig;
use electoral_forecast::data::LocaleTables;
use electoral_forecast::forecast::{GaussianDraws, Simulation, Tally};

fn bench_single_trial(c: &mut Criterion) {
    let sim = Simulation::new(&LocaleTables::reference_2020(), &ForecastConfig::default())
        .expect("reference tables are valid");
    let mut registry = sim.registry().clone();
    let mut tally = Tally::new(registry.len());
    let mut draws = GaussianDraws::new(ChaCha8Rng::seed_from_u64(42));

    c.bench_function("single_trial", |b| {
        b.iter(|| {
            let summary = sim
                .run_trial(&mut registry, &mut tally, &mut draws)
                .expect("trial");
            black_box(summary)
        })
    });
}

fn bench_ten_thousand_trials(c: &mut Criterion) {
    let mut config = ForecastConfig::default();
    config.run.trials = 10_000;
    let sim = Simulation::new(&LocaleTables::reference_2020(), &config)
        .expect("reference tables are valid");

    let mut group = c.benchmark_group("forecast");
    group.sample_size(10);
    group.bench_function("10k_trials_parallel", |b| {
        b.iter(|| black_box(sim.run().expect("run")))
    });
    group.finish();
}

criterion_group!(benches, bench_single_trial, bench_ten_thousand_trials);
criterion_main!(benches);
