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

use crate::err::FaultKind;
use serde::Serialize;
use stack_alloc_core::{
    axis::Axis,
    coord::{ColumnIndex, Dims, Position},
};
use stack_alloc_model::{footprint::Footprint, spec::GridSpec};
use std::fmt::Display;

/// Which footprint a synchronised column currently admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ExclusivityState {
    #[default]
    Free,
    ShortOnly,
    LongOnly,
    LongOnlyTail,
}

impl ExclusivityState {
    /// Whether a placement whose cell in this column is `head`, with `tail`
    /// the state of the next column along the span axis for `Long`
    /// occupants, is admissible.
    #[inline]
    pub fn admits(self, footprint: Footprint, tail: ExclusivityState) -> bool {
        match (self, footprint) {
            (ExclusivityState::Free, Footprint::Short) => true,
            (ExclusivityState::Free, Footprint::Long) => tail == ExclusivityState::Free,
            (ExclusivityState::ShortOnly, f) => f == Footprint::Short,
            (ExclusivityState::LongOnly, f) => f == Footprint::Long,
            (ExclusivityState::LongOnlyTail, _) => false,
        }
    }
}

impl Display for ExclusivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusivityState::Free => write!(f, "free"),
            ExclusivityState::ShortOnly => write!(f, "short-only"),
            ExclusivityState::LongOnly => write!(f, "long-only"),
            ExclusivityState::LongOnlyTail => write!(f, "long-only-tail"),
        }
    }
}

/// The two per-column counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Counter {
    /// Cells linked to any occupant.
    Reserved,
    /// Cells linked to an occupant that physically sits there.
    Settled,
}

impl Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Counter::Reserved => write!(f, "reserved"),
            Counter::Settled => write!(f, "settled"),
        }
    }
}

/// The part a single cell plays within an occupant's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellRole {
    ShortHead,
    LongHead,
    LongTail,
}

impl CellRole {
    /// State a column takes when this cell is the first one counted in it.
    #[inline]
    pub const fn marks(self) -> ExclusivityState {
        match self {
            CellRole::ShortHead => ExclusivityState::ShortOnly,
            CellRole::LongHead => ExclusivityState::LongOnly,
            CellRole::LongTail => ExclusivityState::LongOnlyTail,
        }
    }
}

/// The cells covered by `footprint` placed at `position`, head first.
#[inline]
pub fn footprint_cells(
    position: Position,
    footprint: Footprint,
    span_axis: Axis,
) -> impl Iterator<Item = (Position, CellRole)> {
    let (head_role, tail) = match footprint {
        Footprint::Short => (CellRole::ShortHead, None),
        Footprint::Long => (
            CellRole::LongHead,
            Some((
                position.with(span_axis, position.get(span_axis) + 1),
                CellRole::LongTail,
            )),
        ),
    };
    std::iter::once((position, head_role)).chain(tail)
}

/// Per-axis column counters and exclusivity states.
#[derive(Debug, Clone)]
pub struct ColumnTable {
    dims: Dims,
    reserved: [Vec<u32>; 3],
    settled: [Vec<u32>; 3],
    exclusivity: [Option<Vec<ExclusivityState>>; 3],
}

impl ColumnTable {
    pub fn new(spec: &GridSpec) -> Self {
        let dims = spec.dims();
        let zeros = |a: Axis| vec![0u32; dims.column_count(a)];
        let states = |a: Axis| {
            spec.is_synced(a)
                .then(|| vec![ExclusivityState::Free; dims.column_count(a)])
        };
        Self {
            dims,
            reserved: [zeros(Axis::X), zeros(Axis::Y), zeros(Axis::Z)],
            settled: [zeros(Axis::X), zeros(Axis::Y), zeros(Axis::Z)],
            exclusivity: [states(Axis::X), states(Axis::Y), states(Axis::Z)],
        }
    }

    #[inline]
    fn counts(&self, counter: Counter) -> &[Vec<u32>; 3] {
        match counter {
            Counter::Reserved => &self.reserved,
            Counter::Settled => &self.settled,
        }
    }

    #[inline]
    fn counts_mut(&mut self, counter: Counter) -> &mut [Vec<u32>; 3] {
        match counter {
            Counter::Reserved => &mut self.reserved,
            Counter::Settled => &mut self.settled,
        }
    }

    #[inline]
    pub fn is_synced(&self, axis: Axis) -> bool {
        self.exclusivity[axis.index()].is_some()
    }

    #[inline]
    pub fn count(&self, axis: Axis, column: ColumnIndex, counter: Counter) -> u32 {
        self.counts(counter)[axis.index()][column.value()]
    }

    #[inline]
    pub fn count_at(&self, position: Position, axis: Axis, counter: Counter) -> u32 {
        self.count(axis, self.dims.column_index(position, axis), counter)
    }

    #[inline]
    pub fn counts_along(&self, axis: Axis, counter: Counter) -> &[u32] {
        &self.counts(counter)[axis.index()]
    }

    /// `None` when the axis is not synchronised.
    #[inline]
    pub fn state(&self, axis: Axis, column: ColumnIndex) -> Option<ExclusivityState> {
        self.exclusivity[axis.index()]
            .as_ref()
            .map(|s| s[column.value()])
    }

    #[inline]
    pub fn state_at(&self, position: Position, axis: Axis) -> Option<ExclusivityState> {
        self.state(axis, self.dims.column_index(position, axis))
    }

    /// Adds `delta` to `counter` of the three columns through `position`.
    ///
    /// Reserved counts also drive the exclusivity state: a column leaving
    /// zero takes the state `role` marks, a column returning to zero is
    /// `Free` again.
    pub fn adjust_cell(
        &mut self,
        position: Position,
        role: CellRole,
        delta: i32,
        counter: Counter,
    ) -> Result<(), FaultKind> {
        for axis in Axis::ALL {
            let column = self.dims.column_index(position, axis);
            let extent = self.dims.extent(axis) as i64;
            let slot = &mut self.counts_mut(counter)[axis.index()][column.value()];
            let value = i64::from(*slot) + i64::from(delta);
            if value < 0 || value > extent {
                return Err(FaultKind::CountOutOfRange {
                    axis,
                    column,
                    counter,
                    value,
                });
            }
            *slot = value as u32;

            if counter == Counter::Reserved
                && let Some(states) = self.exclusivity[axis.index()].as_mut()
            {
                let state = &mut states[column.value()];
                if value == 0 {
                    *state = ExclusivityState::Free;
                } else if *state == ExclusivityState::Free {
                    *state = role.marks();
                }
            }
        }
        Ok(())
    }

    /// Applies [`ColumnTable::adjust_cell`] to every cell of a footprint.
    pub fn adjust_footprint(
        &mut self,
        position: Position,
        footprint: Footprint,
        span_axis: Axis,
        delta: i32,
        counter: Counter,
    ) -> Result<(), FaultKind> {
        for (cell, role) in footprint_cells(position, footprint, span_axis) {
            self.adjust_cell(cell, role, delta, counter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stack_alloc_model::spec::GridSpecBuilder;

    fn table(dims: Dims) -> ColumnTable {
        ColumnTable::new(&GridSpecBuilder::new().dims(dims).build().unwrap())
    }

    #[inline]
    fn pos(x: usize, y: usize, z: usize) -> Position {
        Position::new(x, y, z)
    }

    #[test]
    fn test_admits_table() {
        use ExclusivityState::*;
        assert!(Free.admits(Footprint::Short, Free));
        assert!(Free.admits(Footprint::Long, Free));
        assert!(!Free.admits(Footprint::Long, LongOnlyTail));
        assert!(ShortOnly.admits(Footprint::Short, Free));
        assert!(!ShortOnly.admits(Footprint::Long, Free));
        assert!(LongOnly.admits(Footprint::Long, LongOnlyTail));
        assert!(!LongOnly.admits(Footprint::Short, Free));
        assert!(!LongOnlyTail.admits(Footprint::Short, Free));
        assert!(!LongOnlyTail.admits(Footprint::Long, Free));
    }

    #[test]
    fn test_long_counts_twice_on_span_axis() {
        let mut t = table(Dims::new(4, 2, 3));
        t.adjust_footprint(pos(1, 0, 0), Footprint::Long, Axis::X, 1, Counter::Reserved)
            .unwrap();
        assert_eq!(t.count_at(pos(0, 0, 0), Axis::X, Counter::Reserved), 2);
        assert_eq!(t.count_at(pos(1, 0, 0), Axis::Z, Counter::Reserved), 1);
        assert_eq!(t.count_at(pos(2, 0, 0), Axis::Z, Counter::Reserved), 1);
        assert_eq!(t.count_at(pos(1, 0, 0), Axis::Z, Counter::Settled), 0);
    }

    #[test]
    fn test_exclusivity_follows_reserved_count() {
        let mut t = table(Dims::new(4, 2, 3));
        t.adjust_footprint(pos(0, 0, 0), Footprint::Long, Axis::X, 1, Counter::Reserved)
            .unwrap();
        assert_eq!(t.state_at(pos(0, 0, 0), Axis::Z), Some(ExclusivityState::LongOnly));
        assert_eq!(
            t.state_at(pos(1, 0, 0), Axis::Z),
            Some(ExclusivityState::LongOnlyTail)
        );
        assert_eq!(t.state_at(pos(0, 0, 0), Axis::X), None);
        t.adjust_footprint(pos(0, 0, 0), Footprint::Long, Axis::X, -1, Counter::Reserved)
            .unwrap();
        assert_eq!(t.state_at(pos(0, 0, 0), Axis::Z), Some(ExclusivityState::Free));
        assert_eq!(t.state_at(pos(1, 0, 0), Axis::Z), Some(ExclusivityState::Free));
    }

    #[test]
    fn test_settled_counter_leaves_exclusivity_alone() {
        let mut t = table(Dims::new(2, 2, 2));
        t.adjust_cell(pos(0, 0, 0), CellRole::ShortHead, 1, Counter::Settled)
            .unwrap();
        assert_eq!(t.state_at(pos(0, 0, 0), Axis::Z), Some(ExclusivityState::Free));
    }

    #[test]
    fn test_underflow_is_a_fault() {
        let mut t = table(Dims::new(2, 2, 2));
        let err = t
            .adjust_cell(pos(0, 0, 0), CellRole::ShortHead, -1, Counter::Settled)
            .unwrap_err();
        assert!(matches!(
            err,
            FaultKind::CountOutOfRange {
                axis: Axis::X,
                value: -1,
                ..
            }
        ));
    }

    #[test]
    fn test_footprint_cells_lists_tail_along_span() {
        let cells: Vec<_> = footprint_cells(pos(1, 1, 0), Footprint::Long, Axis::Y).collect();
        assert_eq!(
            cells,
            vec![
                (pos(1, 1, 0), CellRole::LongHead),
                (pos(1, 2, 0), CellRole::LongTail)
            ]
        );
        assert_eq!(footprint_cells(pos(0, 0, 0), Footprint::Short, Axis::Y).count(), 1);
    }
}
