// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hash grid benchmarks: bulk insert, small moves, and circle queries.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use proximity_grid::{Aabb2D, HashGridF32};
use proximity_grid_benches::scatter;

const CELL: f32 = 64.0;
const WORLD: f32 = 250.0 * CELL;

fn build(boxes: &[Aabb2D<f32>]) -> HashGridF32<u32> {
    let mut grid = HashGridF32::new(CELL).expect("valid cell size");
    grid.reserve(boxes.len());
    for (h, b) in (0_u32..).zip(boxes) {
        grid.insert(h, *b);
    }
    grid
}

fn insert_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for count in [1_000_usize, 5_000, 50_000] {
        let boxes = scatter(count, WORLD, 24.0);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &boxes, |b, boxes| {
            b.iter(|| black_box(build(boxes)));
        });
    }

    group.finish();
}

fn update_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let boxes = scatter(5_000, WORLD, 24.0);

    for (name, dx) in [("within_cell", 0.5_f32), ("cross_cell", CELL)] {
        group.bench_function(name, |b| {
            let mut grid = build(&boxes);
            let mut flip = false;
            b.iter(|| {
                let shift = if flip { -dx } else { dx };
                flip = !flip;
                for (h, bx) in (0_u32..).zip(&boxes) {
                    let moved = Aabb2D::new(bx.min_x + shift, bx.min_y, bx.max_x + shift, bx.max_y);
                    black_box(grid.update(h, moved));
                }
            });
        });
    }

    group.finish();
}

fn query_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_circle");
    let center = (WORLD / 2.0, WORLD / 2.0);

    for count in [1_000_usize, 5_000, 50_000] {
        let grid = build(&scatter(count, WORLD, 24.0));
        group.bench_with_input(BenchmarkId::new("r150", count), &grid, |b, grid| {
            b.iter(|| black_box(grid.query_circle(center.0, center.1, 150.0)));
        });
        group.bench_with_input(BenchmarkId::new("r600", count), &grid, |b, grid| {
            b.iter(|| black_box(grid.query_circle(center.0, center.1, 600.0)));
        });
    }

    group.finish();
}

criterion_group!(benches, insert_benchmarks, update_benchmarks, query_benchmarks);
criterion_main!(benches);
