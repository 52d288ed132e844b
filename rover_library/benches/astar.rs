//! A* Search Benchmarks
//!
//! Open grids of growing size plus a grid with a wall that forces a detour.
//!
//! Run with: cargo bench --bench astar

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use rover_library::algorithms::astar::{astar_search, reconstruct_path, Heuristic};
use rover_library::map::Map;

/// Grid side lengths to test
const GRID_SIZES: &[usize] = &[8, 16, 32, 64];

fn bench_open_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("astar_open_grid");
    group.measurement_time(Duration::from_secs(5));

    for &size in GRID_SIZES {
        group.bench_with_input(BenchmarkId::new("euclidean", size), &size, |b, &size| {
            let mut map = Map::grid(size, size, 1.0);
            let goal = size * size - 1;
            b.iter(|| {
                let predecessors =
                    astar_search(&mut map, black_box(0), black_box(goal), Heuristic::Euclidean.as_fn());
                black_box(reconstruct_path(&predecessors, 0, goal).unwrap());
            });
        });
    }

    group.finish();
}

/// A wall across every row but the last forces the search around it
fn bench_walled_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("astar_walled_grid");
    group.measurement_time(Duration::from_secs(5));

    for &size in GRID_SIZES {
        let mut map = Map::grid(size, size, 1.0);
        let column = size / 2;
        for row in 0..size - 1 {
            map.block(row * size + column).unwrap();
        }
        let goal = size - 1;

        for heuristic in [Heuristic::Euclidean, Heuristic::Manhattan] {
            let id = BenchmarkId::new(format!("{:?}", heuristic).to_lowercase(), size);
            group.bench_function(id, |b| {
                b.iter(|| {
                    let predecessors = astar_search(&mut map, 0, goal, heuristic.as_fn());
                    black_box(predecessors.len());
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_open_grid, bench_walled_grid);
criterion_main!(benches);
