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

use crate::grid::{Grid, columns::Counter};
use serde::Serialize;
use stack_alloc_core::{TimeVariable, coord::Target};
use stack_alloc_model::state::OccupantState;

/// Number of records in the arena per lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StateCounts {
    pub initial: usize,
    pub reserved: usize,
    pub settled: usize,
    pub vacating: usize,
    pub relocating: usize,
    pub shadow: usize,
}

impl StateCounts {
    fn record(&mut self, state: OccupantState) {
        match state {
            OccupantState::Initial => self.initial += 1,
            OccupantState::Reserved => self.reserved += 1,
            OccupantState::Settled => self.settled += 1,
            OccupantState::Vacating => self.vacating += 1,
            OccupantState::Relocating => self.relocating += 1,
            OccupantState::Shadow => self.shadow += 1,
            // Vacated records have already left the arena.
            OccupantState::Vacated => {}
        }
    }
}

/// Snapshot of how full a grid is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    pub dims: [usize; 3],
    pub span_axis: String,
    pub stacking_axis: Option<String>,
    pub cells: usize,
    pub reserved_cells: usize,
    pub settled_cells: usize,
    /// Reserved cells over all cells.
    pub fill_ratio: f64,
    pub occupants: StateCounts,
    pub locked_stacks: usize,
    pub faulted: bool,
}

impl<T: TimeVariable> Grid<T> {
    pub fn report(&self) -> UsageReport {
        let spec = self.spec();
        let everywhere = Target::new([None, None, None]);
        let reserved_cells = self
            .usage(everywhere, Counter::Reserved)
            .unwrap_or_default();
        let settled_cells = self
            .usage(everywhere, Counter::Settled)
            .unwrap_or_default();
        let cells = self.dims().cell_count();
        let mut occupants = StateCounts::default();
        for (_, o) in self.occupants() {
            occupants.record(o.state());
        }
        UsageReport {
            dims: self.dims().as_array(),
            span_axis: spec.span_axis().to_string(),
            stacking_axis: spec.stacking_axis().map(|a| a.to_string()),
            cells,
            reserved_cells,
            settled_cells,
            fill_ratio: reserved_cells as f64 / cells as f64,
            occupants,
            locked_stacks: self.locked_stacks(),
            faulted: self.is_faulted(),
        }
    }
}
