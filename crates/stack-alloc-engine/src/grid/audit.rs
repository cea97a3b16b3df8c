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

use super::{
    Grid,
    columns::{ColumnTable, Counter, ExclusivityState, footprint_cells},
};
use crate::err::{AllocError, ConsistencyFaultError, FaultKind};
use crate::occupant::OccupantKey;
use stack_alloc_core::{TimeVariable, axis::Axis, coord::ColumnIndex};

impl<T: TimeVariable> Grid<T> {
    /// Rebuilds the bookkeeping from the placed occupants and compares it
    /// with the live tables. Reports the first disagreement; a grid that
    /// already faulted reports its stored fault.
    ///
    /// Read-only: a failing audit does not fault the grid.
    pub fn audit(&self) -> Result<(), AllocError> {
        self.ensure_healthy()?;
        self.audit_linkage()
            .and_then(|()| self.audit_columns())
            .and_then(|()| self.audit_stacks())
            .map_err(|kind| ConsistencyFaultError::new(kind).into())
    }

    fn audit_linkage(&self) -> Result<(), FaultKind> {
        let span = self.spec.span_axis();
        for (position, key) in self.cells.iter() {
            let Some(key) = key else { continue };
            let covers = self
                .occupants
                .get(key)
                .and_then(|o| o.position().map(|p| (p, o.footprint())))
                .is_some_and(|(p, f)| footprint_cells(p, f, span).any(|(c, _)| c == position));
            if !covers {
                return Err(FaultKind::BrokenLinkage { position });
            }
        }
        for (key, occupant) in self.occupants.iter() {
            let Some(position) = occupant.position() else {
                continue;
            };
            for (cell, _) in footprint_cells(position, occupant.footprint(), span) {
                if !self.dims().contains(cell) || self.cells.get(cell) != Some(key) {
                    return Err(FaultKind::BrokenLinkage { position: cell });
                }
            }
        }
        Ok(())
    }

    fn audit_columns(&self) -> Result<(), FaultKind> {
        let span = self.spec.span_axis();
        let dims = self.dims();
        let mut fresh = ColumnTable::new(&self.spec);
        // Per axis and column, the states the cells counted there may mark.
        let mut marks: [Vec<Vec<ExclusivityState>>; 3] =
            Axis::ALL.map(|a| vec![Vec::new(); dims.column_count(a)]);

        for (_, occupant) in self.occupants.iter() {
            let Some(position) = occupant.position() else {
                continue;
            };
            let footprint = occupant.footprint();
            fresh.adjust_footprint(position, footprint, span, 1, Counter::Reserved)?;
            if occupant.is_settled_like() {
                fresh.adjust_footprint(position, footprint, span, 1, Counter::Settled)?;
            }
            for (cell, role) in footprint_cells(position, footprint, span) {
                for axis in Axis::ALL {
                    let column = dims.column_index(cell, axis).value();
                    marks[axis.index()][column].push(role.marks());
                }
            }
        }

        for axis in Axis::ALL {
            for c in 0..dims.column_count(axis) {
                let column = ColumnIndex::new(c);
                for counter in [Counter::Reserved, Counter::Settled] {
                    let expected = fresh.count(axis, column, counter);
                    let actual = self.columns.count(axis, column, counter);
                    if expected != actual {
                        return Err(FaultKind::CountMismatch {
                            axis,
                            column,
                            counter,
                            expected,
                            actual,
                        });
                    }
                }
                let reserved = self.columns.count(axis, column, Counter::Reserved);
                if self.columns.count(axis, column, Counter::Settled) > reserved {
                    return Err(FaultKind::SettledExceedsReserved { axis, column });
                }
                let Some(state) = self.columns.state(axis, column) else {
                    continue;
                };
                let consistent = if reserved == 0 {
                    state == ExclusivityState::Free
                } else {
                    marks[axis.index()][c].contains(&state)
                };
                if !consistent {
                    return Err(FaultKind::ExclusivityMismatch {
                        axis,
                        column,
                        state,
                    });
                }
            }
        }
        Ok(())
    }

    /// Every stack must be a gap-free run of linked cells from the floor up
    /// to its reserved height, and a settled-like cell must rest on a cell
    /// that is settled-like too.
    fn audit_stacks(&self) -> Result<(), FaultKind> {
        let Some(stacking) = self.spec.stacking_axis() else {
            return Ok(());
        };
        let settled = |key: OccupantKey| self.occupants.get(key).is_some_and(|o| o.is_settled_like());
        for (position, key) in self.cells.iter() {
            let height = self.columns.count_at(position, stacking, Counter::Reserved) as usize;
            if (position.get(stacking) < height) != key.is_some() {
                return Err(FaultKind::StackGap { position });
            }
            let Some(key) = key else { continue };
            let Some(below) = position.checked_step(stacking, -1) else {
                continue;
            };
            match self.cells.get(below) {
                None => return Err(FaultKind::StackGap { position }),
                Some(under) if settled(key) && !settled(under) => {
                    return Err(FaultKind::RestsOnUnsettled { position });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
