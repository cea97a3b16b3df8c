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

//! Placement admissibility.
//!
//! A placement is admissible when the footprint fits inside the grid and,
//! for every synchronised axis, the column through the head cell (and, for
//! `Long` occupants, the column through the tail cell) admits the footprint.
//! Nothing here mutates; the lifecycle runs these checks before touching
//! any bookkeeping.

use crate::err::{AllocError, OutOfBoundsError, RejectedPlacementError, RejectionReason};
use crate::grid::columns::{ColumnTable, ExclusivityState};
use stack_alloc_core::{axis::Axis, coord::Position};
use stack_alloc_model::{footprint::Footprint, spec::GridSpec};

/// Whether every cell of the footprint lies inside the grid.
#[inline]
pub fn fits(spec: &GridSpec, position: Position, footprint: Footprint) -> bool {
    let dims = spec.dims();
    let span = spec.span_axis();
    dims.contains(position)
        && (!footprint.is_long() || position.get(span) + 2 <= dims.extent(span))
}

pub fn check_placement(
    spec: &GridSpec,
    columns: &ColumnTable,
    position: Position,
    footprint: Footprint,
) -> Result<(), AllocError> {
    if !fits(spec, position, footprint) {
        return Err(OutOfBoundsError::new(position, footprint).into());
    }
    let span = spec.span_axis();
    let tail = position.with(span, position.get(span) + 1);
    for axis in Axis::ALL {
        let Some(head_state) = columns.state_at(position, axis) else {
            continue;
        };
        let tail_state = if footprint.is_long() {
            columns.state_at(tail, axis).unwrap_or_default()
        } else {
            ExclusivityState::Free
        };
        if !head_state.admits(footprint, tail_state) {
            let state = if head_state == ExclusivityState::Free {
                tail_state
            } else {
                head_state
            };
            return Err(RejectedPlacementError::new(
                position,
                footprint,
                RejectionReason::Exclusivity { axis, state },
            )
            .into());
        }
    }
    Ok(())
}

#[inline]
pub fn is_valid(
    spec: &GridSpec,
    columns: &ColumnTable,
    position: Position,
    footprint: Footprint,
) -> bool {
    check_placement(spec, columns, position, footprint).is_ok()
}
