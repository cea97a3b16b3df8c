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

//! # Stack Allocation Model (`stack-alloc-model`)
//!
//! The vocabulary shared between the allocation engine and whoever drives it:
//!
//! - **`OccupantId`**: the driver's identifier for a box.
//! - **`Footprint`**: `Short` (one cell) or `Long` (two consecutive cells along
//!   the grid's span axis).
//! - **`OccupantState`**: the lifecycle states an occupant moves through.
//! - **`GridSpec`**: the structural configuration of a grid, fixed at
//!   construction and validated by `GridSpecBuilder`.
//! - **`generator`**: seeded synthetic workloads (arrivals with a footprint and
//!   a dwell time) for benchmarks and randomized tests.

pub mod err;
pub mod footprint;
pub mod generator;
pub mod id;
pub mod spec;
pub mod state;

pub mod prelude {
    pub use crate::err::{GridSpecBuildError, SpanAlongStackingAxisError, TooManyCellsError};
    pub use crate::footprint::Footprint;
    pub use crate::generator::{
        Arrival, Workload, WorkloadConfig, WorkloadConfigBuilder, WorkloadEvent, WorkloadGenerator,
    };
    pub use crate::id::OccupantId;
    pub use crate::spec::{GridSpec, GridSpecBuilder};
    pub use crate::state::OccupantState;
}
