//! Scheduler and encounter throughput on the sample loadout.
//!
//! Run with: `cargo bench --bench simulator`

use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use macrosim::combat::{Encounter, Rng, Roll, Target};
use macrosim::config::{Loadout, RotationPlan};
use macrosim::data::Catalog;
use macrosim::scheduler::{schedule, ScheduleConfig};

fn fixture() -> (Loadout, RotationPlan) {
    let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
    let catalog = Catalog::load(data.join("catalog.yaml")).expect("sample catalog should load");
    let loadout = Loadout::load(data.join("loadout.yaml")).expect("sample loadout should load");
    let plan = RotationPlan::resolve(&loadout, &catalog).expect("sample loadout should resolve");
    (loadout, plan)
}

fn bench_simulator(c: &mut Criterion) {
    let (loadout, plan) = fixture();
    let config = ScheduleConfig::for_simulation(&loadout, &loadout.stats);

    let mut group = c.benchmark_group("simulator");
    group.sample_size(100);
    group.throughput(Throughput::Elements(1));

    group.bench_function("schedule_61s", |b| {
        b.iter(|| black_box(schedule(&plan, &config)));
    });

    let timeline = schedule(&plan, &config);
    group.bench_function("encounter_build", |b| {
        b.iter(|| black_box(Encounter::from_timeline(&timeline, &plan)));
    });

    let encounter = Encounter::from_timeline(&timeline, &plan);
    group.bench_function("encounter_expected", |b| {
        b.iter(|| {
            black_box(encounter.run(&loadout.stats, &loadout.sim_info, Target::Boss, Roll::Expected))
        });
    });

    group.bench_function("encounter_sampled", |b| {
        b.iter_batched(
            || Rng::new(7),
            |mut rng| {
                black_box(encounter.run(
                    &loadout.stats,
                    &loadout.sim_info,
                    Target::Boss,
                    Roll::Sampled(&mut rng),
                ))
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_simulator);
criterion_main!(benches);
