use arc_settlement::city::{GameData, Settlement};
use arc_settlement::core::{BuildingKind, SimulationConfig};
use arc_settlement::simulation::{tick, tick_all, TickContext};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn developed(data: &GameData) -> Settlement {
    let mut settlement = Settlement::new("Benchford", data);
    for building in BuildingKind::ALL {
        settlement.buildings.insert(building, 5);
        settlement.auto_assign.insert(building, true);
    }
    settlement.recompute_housing(data, 1.0);
    settlement
}

fn bench_tick(c: &mut Criterion) {
    let data = GameData::with_defaults();
    let config = SimulationConfig::default();
    let ctx = TickContext::default();
    let base = developed(&data);

    c.bench_function("tick/single", |b| {
        b.iter_batched(
            || base.clone(),
            |mut settlement| {
                tick(&mut settlement, 60.0, &ctx, &data, &config);
                settlement
            },
            BatchSize::SmallInput,
        )
    });

    let mut group = c.benchmark_group("tick_all");
    for count in [16usize, 128, 1024] {
        group.bench_with_input(BenchmarkId::new("settlements", count), &count, |b, &count| {
            b.iter_batched(
                || vec![base.clone(); count],
                |mut settlements| {
                    tick_all(&mut settlements, 60.0, &ctx, &data, &config);
                    settlements
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(tick_benches, bench_tick);
criterion_main!(tick_benches);
