// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stack_alloc_core::{
    axis::Axis,
    coord::{Dims, Target},
    time::TimePoint,
};
use stack_alloc_engine::prelude::*;
use stack_alloc_model::{footprint::Footprint, id::OccupantId, spec::GridSpecBuilder};
use std::{env, hint::black_box};

#[inline]
fn stack(x: usize, y: usize) -> Target {
    Target::new([Some(x), Some(y), None])
}

#[derive(Clone, Copy)]
struct Arrival {
    footprint: Footprint,
    x: usize,
    y: usize,
    settle: bool,
}

fn gen_arrivals(dims: Dims, n: usize, rng: &mut impl Rng) -> Vec<Arrival> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let footprint = if rng.random_bool(0.3) {
            Footprint::Long
        } else {
            Footprint::Short
        };
        out.push(Arrival {
            footprint,
            x: rng.random_range(0..dims.extent(Axis::X)),
            y: rng.random_range(0..dims.extent(Axis::Y)),
            settle: rng.random_bool(0.8),
        });
    }
    out
}

fn new_grid(dims: Dims) -> Grid {
    Grid::new(
        GridSpecBuilder::new()
            .dims(dims)
            .build()
            .expect("valid bench grid"),
    )
}

/// Reserves and optionally settles every arrival, ignoring rejected ones.
fn fill(grid: &mut Grid, arrivals: &[Arrival]) -> Vec<OccupantKey> {
    let mut settled = Vec::new();
    for (i, a) in arrivals.iter().enumerate() {
        let Ok(k) = grid.register(OccupantId::new(i as u64), a.footprint) else {
            continue;
        };
        let t = TimePoint::new(i as i64);
        if grid.reserve(k, stack(a.x, a.y), t).is_err() {
            let _ = grid.deregister(k);
            continue;
        }
        if a.settle && grid.settle(k, t).is_ok() {
            settled.push(k);
        }
    }
    settled
}

fn register_lifecycle(c: &mut Criterion, dims: Dims, arrivals_n: usize) {
    let mut group = c.benchmark_group(format!("grid_lifecycle/{dims}"));
    group.throughput(Throughput::Elements(arrivals_n as u64));
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED_57AC_4A11_0C8E);
    let arrivals = gen_arrivals(dims, arrivals_n, &mut rng);

    group.bench_function(BenchmarkId::new("reserve_settle", arrivals_n), |b| {
        b.iter_batched(
            || new_grid(dims),
            |mut g| {
                let settled = fill(&mut g, &arrivals);
                black_box((g, settled));
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function(BenchmarkId::new("vacate_all", arrivals_n), |b| {
        b.iter_batched(
            || {
                let mut g = new_grid(dims);
                let settled = fill(&mut g, &arrivals);
                (g, settled)
            },
            |(mut g, settled)| {
                // Topmost first so nothing is buried.
                for k in settled.into_iter().rev() {
                    let _ = g.vacate(k, TimePoint::new(0));
                }
                black_box(g);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn register_queries(c: &mut Criterion, dims: Dims, arrivals_n: usize) {
    let mut group = c.benchmark_group(format!("grid_queries/{dims}"));
    let mut rng = ChaCha8Rng::seed_from_u64(0xC0FF_EE00_1234_5678);
    let arrivals = gen_arrivals(dims, arrivals_n, &mut rng);
    let mut g = new_grid(dims);
    fill(&mut g, &arrivals);
    let targets: Vec<Target> = arrivals.iter().map(|a| stack(a.x, a.y)).collect();
    group.throughput(Throughput::Elements(targets.len() as u64));

    for footprint in [Footprint::Short, Footprint::Long] {
        group.bench_function(BenchmarkId::new("validate_many", footprint), |b| {
            b.iter(|| black_box(g.validate_many(&targets, footprint)))
        });
        group.bench_function(BenchmarkId::new("available_positions", footprint), |b| {
            b.iter(|| black_box(g.available_positions(footprint).count()))
        });
    }
    group.bench_function("audit", |b| b.iter(|| black_box(g.audit())));
    group.finish();
}

fn grid_benches(c: &mut Criterion) {
    // Defaults (override with env)
    let read = |name: &str, default: usize| {
        env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    };
    let dims = Dims::new(read("GRID_X", 20), read("GRID_Y", 8), read("GRID_Z", 5));
    let arrivals_n = read("GRID_ARRIVALS", 500);

    register_lifecycle(c, dims, arrivals_n);
    register_queries(c, dims, arrivals_n);
}

criterion_group!(benches, grid_benches);
criterion_main!(benches);
