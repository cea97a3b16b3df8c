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

//! # Stack Allocation Engine (`stack-alloc-engine`)
//!
//! The allocator proper. A [`grid::Grid`] tracks which cells of a
//! three-dimensional stacking grid are reserved or physically occupied,
//! keeps per-axis column counters and exclusivity states in step with every
//! placement, and moves occupants through their lifecycle:
//!
//! - `reserve` / `cancel_reserve` / `settle` / `begin_vacate` /
//!   `complete_vacate`,
//! - sink/float rebalancing along the stacking axis so that settled
//!   occupants always rest below merely reserved ones,
//! - shadow relocation, where a placeholder keeps the old cells occupied
//!   until the occupant has settled at its new position.
//!
//! Placement admissibility lives in [`validate`]; every error is an
//! [`err::AllocError`]. Inconsistent bookkeeping faults the grid, after which
//! all mutating calls fail with the stored fault.

pub mod err;
pub mod grid;
pub mod occupant;
pub mod report;
pub mod validate;

pub mod prelude {
    pub use crate::err::{AllocError, FaultKind, RejectionReason};
    pub use crate::grid::{
        Direction, Grid,
        columns::{Counter, ExclusivityState},
    };
    pub use crate::occupant::{Occupant, OccupantKey};
    pub use crate::report::{StateCounts, UsageReport};
}
