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

use super::err::{InvalidLongRatioError, InvalidRangeError, WorkloadConfigBuildError};
use rand::Rng;
use stack_alloc_core::{TimeVariable, time::TimePoint};

/// Configuration for synthetic workload generation.
///
/// Arrivals are spaced by a gap drawn uniformly from `[gap_min, gap_max]`
/// and each occupant stays for a dwell time drawn uniformly from
/// `[dwell_min, dwell_max]`. A fraction `long_ratio` of occupants is `Long`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig<T: TimeVariable> {
    seed: u64,
    arrivals: usize,
    long_ratio: f64,
    start: TimePoint<T>,
    gap_min: T,
    gap_max: T,
    dwell_min: T,
    dwell_max: T,
}

impl<T: TimeVariable + From<i8>> Default for WorkloadConfig<T> {
    fn default() -> Self {
        Self {
            seed: 42,
            arrivals: 200,
            long_ratio: 0.3,
            start: TimePoint::zero(),
            gap_min: <T as From<i8>>::from(0),
            gap_max: <T as From<i8>>::from(5),
            dwell_min: <T as From<i8>>::from(20),
            dwell_max: <T as From<i8>>::from(120),
        }
    }
}

impl<T: TimeVariable> WorkloadConfig<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed: u64,
        arrivals: usize,
        long_ratio: f64,
        start: TimePoint<T>,
        gap_min: T,
        gap_max: T,
        dwell_min: T,
        dwell_max: T,
    ) -> Result<Self, WorkloadConfigBuildError<T>> {
        if !(0.0..=1.0).contains(&long_ratio) {
            return Err(InvalidLongRatioError::new(long_ratio).into());
        }
        check_range("gap", gap_min, gap_max, T::zero())?;
        // A zero dwell would order the departure before its own arrival.
        check_range("dwell", dwell_min, dwell_max, T::one())?;
        Ok(Self {
            seed,
            arrivals,
            long_ratio,
            start,
            gap_min,
            gap_max,
            dwell_min,
            dwell_max,
        })
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }
    #[inline]
    pub fn arrivals(&self) -> usize {
        self.arrivals
    }
    #[inline]
    pub fn long_ratio(&self) -> f64 {
        self.long_ratio
    }
    #[inline]
    pub fn start(&self) -> TimePoint<T> {
        self.start
    }
    #[inline]
    pub fn gap_range(&self) -> (T, T) {
        (self.gap_min, self.gap_max)
    }
    #[inline]
    pub fn dwell_range(&self) -> (T, T) {
        (self.dwell_min, self.dwell_max)
    }
}

fn check_range<T: TimeVariable>(
    name: &'static str,
    min: T,
    max: T,
    floor: T,
) -> Result<(), InvalidRangeError<T>> {
    if min < floor || min > max {
        return Err(InvalidRangeError::new(name, min, max));
    }
    Ok(())
}

/// Builder for `WorkloadConfig`.
pub struct WorkloadConfigBuilder<T: TimeVariable> {
    // Required
    arrivals: Option<usize>,

    // Optional with defaults
    seed: u64,
    long_ratio: f64,
    start: TimePoint<T>,
    gap_min: T,
    gap_max: T,
    dwell_min: T,
    dwell_max: T,
}

impl<T: TimeVariable + From<i8>> Default for WorkloadConfigBuilder<T> {
    fn default() -> Self {
        let defaults = WorkloadConfig::<T>::default();
        Self {
            arrivals: None,
            seed: rand::rng().random(),
            long_ratio: defaults.long_ratio,
            start: defaults.start,
            gap_min: defaults.gap_min,
            gap_max: defaults.gap_max,
            dwell_min: defaults.dwell_min,
            dwell_max: defaults.dwell_max,
        }
    }
}

impl<T: TimeVariable + From<i8>> WorkloadConfigBuilder<T> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: TimeVariable> WorkloadConfigBuilder<T> {
    #[inline]
    pub fn arrivals(mut self, v: usize) -> Self {
        self.arrivals = Some(v);
        self
    }
    #[inline]
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }
    #[inline]
    pub fn long_ratio(mut self, v: f64) -> Self {
        self.long_ratio = v;
        self
    }
    #[inline]
    pub fn start(mut self, v: TimePoint<T>) -> Self {
        self.start = v;
        self
    }
    #[inline]
    pub fn gap_range(mut self, min: T, max: T) -> Self {
        self.gap_min = min;
        self.gap_max = max;
        self
    }
    #[inline]
    pub fn dwell_range(mut self, min: T, max: T) -> Self {
        self.dwell_min = min;
        self.dwell_max = max;
        self
    }

    pub fn build(self) -> Result<WorkloadConfig<T>, WorkloadConfigBuildError<T>> {
        let arrivals = self
            .arrivals
            .ok_or(WorkloadConfigBuildError::MissingArrivals)?;
        WorkloadConfig::new(
            self.seed,
            arrivals,
            self.long_ratio,
            self.start,
            self.gap_min,
            self.gap_max,
            self.dwell_min,
            self.dwell_max,
        )
    }
}
