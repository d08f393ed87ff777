use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Duration;

use congaline::grid::{Coord, Direction, Grid, ObjectKind};
use congaline::levelgen::{build_grid, generate_layout, GenParams};
use congaline::playout::{run_playouts, PlayoutConfig};
use congaline::protocol::sketch::encode_sketch;
use congaline::resolve::CongaResolver;
use congaline::session::budget::ActionBudget;
use congaline::session::config::SessionConfig;
use congaline::session::LevelSession;

/// One portal per row in column 0, with every other cell of the row a
/// character facing it.
fn lined_grid(size: usize) -> Grid {
    let mut grid = Grid::new(size, size);
    for row in 0..size as i32 {
        grid.spawn(ObjectKind::open_portal(), Coord::new(row, 0)).unwrap();
        for col in 1..size as i32 {
            grid.spawn(ObjectKind::character(Direction::Left), Coord::new(row, col))
                .unwrap();
        }
    }
    grid
}

fn dense_params(size: usize) -> GenParams {
    let area = size * size;
    GenParams {
        rows: size,
        cols: size,
        actions: 20,
        portals: area / 20,
        characters: area / 2,
        rofls: area / 20,
        grenades: area / 20,
        milkshakes: area / 20,
        cacti: area / 20,
        inactive: area / 20,
    }
}

fn bench_plan_lined(c: &mut Criterion) {
    let grid = lined_grid(32);
    c.bench_function("plan_32x32_lined", |b| {
        let mut resolver = CongaResolver::new();
        b.iter(|| resolver.plan(black_box(&grid)))
    });
}

fn bench_plan_random(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(7);
    let layout = generate_layout(&dense_params(32), &mut rng).unwrap();
    let grid = build_grid(&layout, &mut rng, 1000).unwrap();
    c.bench_function("plan_32x32_random", |b| {
        let mut resolver = CongaResolver::new();
        b.iter(|| resolver.plan(black_box(&grid)))
    });
}

fn bench_full_conga_run(c: &mut Criterion) {
    let grid = lined_grid(16);
    let mut group = c.benchmark_group("conga_run");
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("run_16x16_lined", |b| {
        b.iter_batched(
            || {
                LevelSession::from_grid(
                    grid.clone(),
                    ActionBudget::with_counters(1, [1; 5]),
                    SessionConfig::default(),
                )
            },
            |mut session| {
                session.start_conga().unwrap();
                session.run_until_idle().unwrap();
                session.destroy()
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_generate_layout(c: &mut Criterion) {
    let params = dense_params(16);
    c.bench_function("generate_and_build_16x16", |b| {
        let mut rng = SmallRng::seed_from_u64(3);
        b.iter(|| {
            let layout = generate_layout(black_box(&params), &mut rng).unwrap();
            build_grid(&layout, &mut rng, 1000).unwrap()
        })
    });
}

fn bench_encode_sketch(c: &mut Criterion) {
    let grid = lined_grid(32);
    c.bench_function("encode_sketch_32x32", |b| {
        b.iter(|| encode_sketch(black_box(&grid)))
    });
}

fn bench_playouts(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(11);
    let layout = generate_layout(&GenParams::default(), &mut rng).unwrap();
    let config = PlayoutConfig {
        runs: 16,
        threads: 1,
        seed: 5,
        ..Default::default()
    };
    let mut group = c.benchmark_group("playout");
    group.sample_size(20);
    group.bench_function("16_runs_6x6", |b| {
        b.iter(|| run_playouts(black_box(&layout), &config).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_plan_lined,
    bench_plan_random,
    bench_full_conga_run,
    bench_generate_layout,
    bench_encode_sketch,
    bench_playouts,
);
criterion_main!(benches);
