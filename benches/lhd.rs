use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Zipf};

use lhdkit::config::LhdConfig;
use lhdkit::policy::lhd::Lhd;
use lhdkit::traits::{Access, StaticView};

const RESIDENTS: u64 = 4_096;

fn bench_config() -> LhdConfig {
    LhdConfig {
        max_age: 2_048,
        accs_per_reconfiguration: 100_000,
        ..LhdConfig::default()
    }
}

fn warmed_engine() -> Lhd<u64> {
    let mut lhd = Lhd::with_seed(bench_config(), 0xBEEF).unwrap();
    let view = StaticView {
        num_objects: RESIDENTS as usize,
        consumed_capacity: 0,
    };
    for id in 0..RESIDENTS {
        lhd.update(id, &Access::new((id % 8) as u32, 64 + id % 4_096), &view);
    }
    lhd
}

fn bench_update_hit_path(c: &mut Criterion) {
    c.bench_function("lhd_update_hits", |b| {
        b.iter_batched(
            warmed_engine,
            |mut lhd| {
                let view = StaticView {
                    num_objects: RESIDENTS as usize,
                    consumed_capacity: 0,
                };
                for i in 0..RESIDENTS {
                    let id = std::hint::black_box(i % RESIDENTS);
                    lhd.update(id, &Access::new(0, 128), &view);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_rank(c: &mut Criterion) {
    c.bench_function("lhd_rank", |b| {
        b.iter_batched(
            warmed_engine,
            |mut lhd| {
                for _ in 0..1_024 {
                    let _ = std::hint::black_box(lhd.rank(&Access::new(0, 128)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_zipf_churn(c: &mut Criterion) {
    // Skewed multi-app workload with the engine's own victims evicted to
    // hold residency constant; models real use inside a full cache.
    c.bench_function("lhd_zipf_churn", |b| {
        b.iter_batched(
            || {
                let lhd = warmed_engine();
                let rng = SmallRng::seed_from_u64(0x5EED);
                let zipf = Zipf::new(4 * RESIDENTS, 0.99).unwrap();
                (lhd, rng, zipf)
            },
            |(mut lhd, mut rng, zipf)| {
                let view = StaticView {
                    num_objects: RESIDENTS as usize,
                    consumed_capacity: 0,
                };
                for _ in 0..RESIDENTS {
                    let id = zipf.sample(&mut rng) as u64;
                    let app = rng.gen_range(0..8u32);
                    let size = 64 + (id % 4_096);

                    if lhd.len() >= RESIDENTS as usize && !lhd.contains(&id) {
                        let victim = lhd.rank(&Access::new(app, size));
                        lhd.replaced(&victim);
                    }
                    lhd.update(id, &Access::new(app, size), &view);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_reconfigure(c: &mut Criterion) {
    // Cadence 1 makes every access pay the full decay + refit sweep.
    c.bench_function("lhd_reconfigure", |b| {
        b.iter_batched(
            || {
                let config = LhdConfig {
                    accs_per_reconfiguration: 1,
                    ..bench_config()
                };
                let mut lhd = Lhd::with_seed(config, 0xBEEF).unwrap();
                let view = StaticView {
                    num_objects: 64,
                    consumed_capacity: 0,
                };
                for id in 0..64u64 {
                    lhd.update(id, &Access::new(0, 128), &view);
                }
                lhd
            },
            |mut lhd| {
                let view = StaticView {
                    num_objects: 64,
                    consumed_capacity: 0,
                };
                for i in 0..8u64 {
                    lhd.update(std::hint::black_box(i % 64), &Access::new(0, 128), &view);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_update_hit_path,
    bench_rank,
    bench_zipf_churn,
    bench_reconfigure
);
criterion_main!(benches);
