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

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use stack_alloc_core::{
    axis::Axis,
    coord::{Dims, Position, Target},
};
use stack_alloc_engine::prelude::*;
use stack_alloc_model::prelude::*;
use std::{collections::HashMap, fs::File, io::BufWriter, time::Instant};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT | FmtSpan::CLOSE)
        .init();
}

#[derive(Debug, Clone, Serialize)]
struct InstanceInfo {
    idx: usize,
    seed: u64,
    dims: String,
    arrivals: usize,
    long_ratio: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
struct RunStats {
    placed: usize,
    rejected: usize,
    departed: usize,
    reshuffles: usize,
    stuck_departures: usize,
    peak_fill_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
struct RunResult {
    instance: InstanceInfo,
    stats: RunStats,
    elapsed_ms: u128,
    audit_ok: bool,
    final_usage: UsageReport,
}

#[derive(Debug, Clone, Serialize)]
struct BenchmarkReport {
    description: String,
    instances: Vec<RunResult>,
}

/// Upper bound on blockers moved away before a departure gives up.
const MAX_RESHUFFLES_PER_DEPARTURE: usize = 8;

fn interpolate_u(val0: usize, val1: usize, step: usize, steps: usize) -> usize {
    if steps <= 1 {
        return val1;
    }
    let num = (val1 as isize - val0 as isize) * step as isize;
    (val0 as isize + num / (steps as isize - 1)).max(0) as usize
}

/// A random stack top that admits `footprint`, away from `avoid` when given.
fn pick_stack(
    grid: &Grid,
    footprint: Footprint,
    avoid: Option<Position>,
    rng: &mut ChaCha8Rng,
) -> Option<Target> {
    let tops: Vec<Position> = grid
        .available_positions(footprint)
        .filter(|p| {
            avoid.is_none_or(|a| a.get(Axis::X) != p.get(Axis::X) || a.get(Axis::Y) != p.get(Axis::Y))
        })
        .collect();
    if tops.is_empty() {
        return None;
    }
    let p = tops[rng.random_range(0..tops.len())];
    Some(Target::unresolved_along(p, Axis::Z))
}

/// Moves the occupant stacked on top of a departing one to another stack.
/// Returns whether it moved.
fn reshuffle(
    grid: &mut Grid,
    blocker: OccupantKey,
    rng: &mut ChaCha8Rng,
) -> Result<bool, AllocError> {
    let Some(occupant) = grid.occupant(blocker) else {
        return Ok(false);
    };
    let footprint = occupant.footprint();
    let from = occupant.position();
    let Some(target) = pick_stack(grid, footprint, from, rng) else {
        return Ok(false);
    };
    grid.begin_relocation(blocker, Some(target))?;
    if let Err(e) = grid.complete_relocation(blocker) {
        grid.abort_relocation(blocker)?;
        return Err(e);
    }
    Ok(true)
}

fn run_instance(dims: Dims, config: WorkloadConfig<i64>) -> (RunStats, Grid) {
    let mut grid: Grid = Grid::new(
        GridSpecBuilder::new()
            .dims(dims)
            .build()
            .expect("valid grid spec"),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed() ^ 0x5EED);
    let workload = WorkloadGenerator::new(config).generate();
    let mut keys: HashMap<OccupantId, OccupantKey> = HashMap::new();
    let mut stats = RunStats::default();

    for event in workload.events() {
        match event {
            WorkloadEvent::Arrive(a) => {
                let key = grid
                    .register(a.id(), a.footprint())
                    .expect("healthy grid");
                let placed = pick_stack(&grid, a.footprint(), None, &mut rng)
                    .map(|t| grid.reserve(key, t, a.arrive_at()))
                    .is_some_and(|r| r.is_ok());
                if !placed {
                    stats.rejected += 1;
                    grid.deregister(key).expect("unplaced occupant");
                    continue;
                }
                grid.settle(key, a.arrive_at()).expect("settle after reserve");
                keys.insert(a.id(), key);
                stats.placed += 1;
                stats.peak_fill_ratio = stats.peak_fill_ratio.max(grid.report().fill_ratio);
            }
            WorkloadEvent::Depart(a) => {
                let Some(&key) = keys.get(&a.id()) else {
                    continue;
                };
                let mut attempts = 0;
                loop {
                    match grid.vacate(key, a.depart_at()) {
                        Ok(_) => {
                            keys.remove(&a.id());
                            stats.departed += 1;
                            break;
                        }
                        Err(AllocError::Buried(e)) if attempts < MAX_RESHUFFLES_PER_DEPARTURE => {
                            attempts += 1;
                            let moved = keys
                                .get(&e.above())
                                .map(|&blocker| reshuffle(&mut grid, blocker, &mut rng));
                            match moved {
                                Some(Ok(true)) => stats.reshuffles += 1,
                                _ => {
                                    stats.stuck_departures += 1;
                                    break;
                                }
                            }
                        }
                        Err(e) => {
                            warn!(%e, id = %a.id(), "departure failed");
                            stats.stuck_departures += 1;
                            break;
                        }
                    }
                }
            }
        }
    }
    (stats, grid)
}

fn main() {
    enable_tracing();

    // Ramp from a small to a big yard.
    let n_instances = 6usize;
    let (min_bays, max_bays) = (4usize, 24usize);
    let (min_arrivals, max_arrivals) = (100usize, 2_000usize);
    let rows = 6usize;
    let tiers = 5usize;
    let long_ratio = 0.3;

    let mut results: Vec<RunResult> = Vec::with_capacity(n_instances);

    for i in 0..n_instances {
        let bays = interpolate_u(min_bays, max_bays, i, n_instances);
        let arrivals = interpolate_u(min_arrivals, max_arrivals, i, n_instances);
        let seed: u64 = 42 + (i as u64);
        let dims = Dims::new(bays, rows, tiers);

        let config = WorkloadConfigBuilder::<i64>::new()
            .arrivals(arrivals)
            .seed(seed)
            .long_ratio(long_ratio)
            .build()
            .expect("valid workload config");

        let t0 = Instant::now();
        let (stats, grid) = run_instance(dims, config);
        let elapsed = t0.elapsed();

        let audit = grid.audit();
        if let Err(e) = &audit {
            warn!(%e, idx = i, "audit failed");
        }
        info!(idx = i, %dims, placed = stats.placed, rejected = stats.rejected, "instance done");

        results.push(RunResult {
            instance: InstanceInfo {
                idx: i,
                seed,
                dims: dims.to_string(),
                arrivals,
                long_ratio,
            },
            stats,
            elapsed_ms: elapsed.as_millis(),
            audit_ok: audit.is_ok(),
            final_usage: grid.report(),
        });
    }

    let report = BenchmarkReport {
        description: "Stack allocation benchmark: seeded arrivals and departures on yards from small to big, random stack choice, reshuffling of blockers.".into(),
        instances: results,
    };

    let file = File::create("stack_results.json").expect("create stack_results.json");
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report).expect("write json report");

    println!();
    println!("=================================================================");
    println!("======================== Benchmark Done =========================");
    println!("=================================================================");
    println!();
    println!("Wrote: stack_results.json");
}
