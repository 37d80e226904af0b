use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use reactor_core::core::types::GridDimensions;
use reactor_core::layout::{build_grid, random_layout};
use reactor_core::simulation::{propagate_flux, run_tick};
use reactor_core::{tick_reactors, Reactor, SimulationConfig};

fn bench_tick(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let mut group = c.benchmark_group("tick");

    for &(side, density) in &[(5, 0.6), (9, 0.6), (9, 1.0)] {
        let layout = random_layout(42, GridDimensions::cube(side), density);
        let grid = build_grid(&layout, &config).unwrap();
        let label = format!("{}^3_density{:.1}", side, density);
        group.bench_function(&label, |b| {
            b.iter_batched(
                || grid.clone(),
                |mut grid| black_box(run_tick(&mut grid, &config, 0)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_flux(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let layout = random_layout(7, GridDimensions::cube(9), 0.8);
    let snapshot = build_grid(&layout, &config).unwrap().snapshot();
    c.bench_function("flux_9^3", |b| {
        b.iter(|| black_box(propagate_flux(&snapshot, &config).total_emission))
    });
}

fn bench_parallel(c: &mut Criterion) {
    let reactors: Vec<Reactor> = (0..32)
        .map(|seed| {
            Reactor::from_layout(
                &random_layout(seed, GridDimensions::cube(9), 0.6),
                SimulationConfig::default(),
            )
            .unwrap()
        })
        .collect();
    c.bench_function("tick_reactors_32x9^3", |b| {
        b.iter_batched(
            || reactors.clone(),
            |mut reactors| black_box(tick_reactors(&mut reactors)),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_tick, bench_flux, bench_parallel);
criterion_main!(benches);
