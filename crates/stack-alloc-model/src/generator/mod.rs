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

mod config;
mod err;

pub use config::{WorkloadConfig, WorkloadConfigBuilder};
pub use err::{InvalidLongRatioError, InvalidRangeError, WorkloadConfigBuildError};

use crate::{footprint::Footprint, id::OccupantId};
use rand::{Rng, SeedableRng, distr::uniform::SampleUniform};
use rand_chacha::ChaCha8Rng;
use stack_alloc_core::{TimeVariable, time::TimePoint};

/// One synthetic occupant: when it shows up and when it leaves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrival<T: TimeVariable> {
    id: OccupantId,
    footprint: Footprint,
    arrive_at: TimePoint<T>,
    depart_at: TimePoint<T>,
}

impl<T: TimeVariable> Arrival<T> {
    #[inline]
    pub fn new(
        id: OccupantId,
        footprint: Footprint,
        arrive_at: TimePoint<T>,
        depart_at: TimePoint<T>,
    ) -> Self {
        debug_assert!(arrive_at <= depart_at);
        Self {
            id,
            footprint,
            arrive_at,
            depart_at,
        }
    }

    #[inline]
    pub fn id(&self) -> OccupantId {
        self.id
    }
    #[inline]
    pub fn footprint(&self) -> Footprint {
        self.footprint
    }
    #[inline]
    pub fn arrive_at(&self) -> TimePoint<T> {
        self.arrive_at
    }
    #[inline]
    pub fn depart_at(&self) -> TimePoint<T> {
        self.depart_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadEvent<T: TimeVariable> {
    Arrive(Arrival<T>),
    Depart(Arrival<T>),
}

impl<T: TimeVariable> WorkloadEvent<T> {
    #[inline]
    pub fn time(&self) -> TimePoint<T> {
        match self {
            WorkloadEvent::Arrive(a) => a.arrive_at(),
            WorkloadEvent::Depart(a) => a.depart_at(),
        }
    }

    #[inline]
    pub fn arrival(&self) -> &Arrival<T> {
        match self {
            WorkloadEvent::Arrive(a) | WorkloadEvent::Depart(a) => a,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload<T: TimeVariable> {
    arrivals: Vec<Arrival<T>>,
}

impl<T: TimeVariable> Workload<T> {
    #[inline]
    pub fn arrivals(&self) -> &[Arrival<T>] {
        &self.arrivals
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    /// All arrivals and departures in time order. At equal times departures
    /// come first so that a leaving occupant frees its slot before the next
    /// one arrives.
    pub fn events(&self) -> Vec<WorkloadEvent<T>> {
        let mut events: Vec<WorkloadEvent<T>> = self
            .arrivals
            .iter()
            .flat_map(|a| [WorkloadEvent::Arrive(*a), WorkloadEvent::Depart(*a)])
            .collect();
        events.sort_by_key(|e| {
            let rank = match e {
                WorkloadEvent::Depart(_) => 0u8,
                WorkloadEvent::Arrive(_) => 1u8,
            };
            (e.time(), rank, e.arrival().id())
        });
        events
    }
}

pub struct WorkloadGenerator<T: TimeVariable + SampleUniform> {
    config: WorkloadConfig<T>,
    rng: ChaCha8Rng,
    next_id: u64,
    clock: TimePoint<T>,
}

impl<T: TimeVariable + SampleUniform> From<WorkloadConfig<T>> for WorkloadGenerator<T> {
    fn from(config: WorkloadConfig<T>) -> Self {
        Self::new(config)
    }
}

impl<T: TimeVariable + SampleUniform> WorkloadGenerator<T> {
    pub fn new(config: WorkloadConfig<T>) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            clock: config.start(),
            config,
            next_id: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &WorkloadConfig<T> {
        &self.config
    }

    #[inline]
    fn fresh_id(&mut self) -> OccupantId {
        let id = self.next_id;
        self.next_id += 1;
        OccupantId::new(id)
    }

    #[inline]
    fn sample(&mut self, (min, max): (T, T)) -> T {
        if min == max {
            min
        } else {
            self.rng.random_range(min..=max)
        }
    }

    pub fn next_arrival(&mut self) -> Arrival<T> {
        let (gap_range, dwell_range) = (self.config.gap_range(), self.config.dwell_range());
        let gap = self.sample(gap_range);
        let dwell = self.sample(dwell_range);
        let footprint = if self.rng.random_bool(self.config.long_ratio()) {
            Footprint::Long
        } else {
            Footprint::Short
        };
        let arrive_at = TimePoint::new(self.clock.value().saturating_add(gap));
        let depart_at = TimePoint::new(arrive_at.value().saturating_add(dwell));
        self.clock = arrive_at;
        let id = self.fresh_id();
        Arrival::new(id, footprint, arrive_at, depart_at)
    }

    pub fn generate(&mut self) -> Workload<T> {
        let arrivals = (0..self.config.arrivals())
            .map(|_| self.next_arrival())
            .collect();
        Workload { arrivals }
    }
}
