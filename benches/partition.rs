use basin_partition::{basin_sizes, DrainageConfig, DrainagePartition, ElevationGrid, Traversal};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Deterministic distinct elevations: a multiplicative permutation of 0..n².
fn scrambled(size: u32) -> ElevationGrid {
    let len = u64::from(size) * u64::from(size);
    let step = (len * 618 / 1000..len)
        .find(|s| gcd(*s, len) == 1)
        .unwrap_or(1);
    let cells = (0..len).map(|i| ((i * step) % len) as i64).collect();
    ElevationGrid::from_vec(size, cells).unwrap()
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("basin_sizes");
    for size in [64u32, 256, 1024] {
        let grid = scrambled(size);
        group.bench_with_input(BenchmarkId::new("default", size), &grid, |b, g| {
            b.iter(|| basin_sizes(black_box(g)).unwrap())
        });
        let bfs = DrainageConfig::default().with_traversal(Traversal::BreadthFirst);
        group.bench_with_input(BenchmarkId::new("breadth_first", size), &grid, |b, g| {
            b.iter(|| DrainagePartition::compute(black_box(g), &bfs).unwrap())
        });
        let par = DrainageConfig::default().with_parallel(true);
        group.bench_with_input(BenchmarkId::new("parallel", size), &grid, |b, g| {
            b.iter(|| DrainagePartition::compute(black_box(g), &par).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_partition);
criterion_main!(benches);
