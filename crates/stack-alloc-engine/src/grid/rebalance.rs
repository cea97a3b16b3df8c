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
    Direction, Grid,
    columns::{CellRole, Counter, footprint_cells},
};
use crate::err::{AllocError, BuriedError, UnknownFootprintError};
use crate::occupant::OccupantKey;
use crate::validate;
use stack_alloc_core::{TimeVariable, axis::Axis, coord::Position};
use tracing::{trace, warn};

/// A validated exchange of two adjacent occupants along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct SwapPlan {
    lower: OccupantKey,
    upper: OccupantKey,
    lower_to: Position,
    upper_to: Position,
}

impl<T: TimeVariable> Grid<T> {
    /// Moves `key` toward the origin of the stacking axis past every
    /// neighbour that is not settled. Returns the final position.
    ///
    /// Fails with `UnknownFootprint`, leaving the grid as it was, when a
    /// neighbour cannot be traded places with.
    pub fn sink(&mut self, key: OccupantKey) -> Result<Position, AllocError> {
        self.ensure_healthy()?;
        let stacking = self.spec.stacking_axis().ok_or(AllocError::NoStackingAxis)?;
        self.walk(key, stacking, Direction::Backward, true)?;
        Ok(self.placed(key)?.0)
    }

    /// Moves `key` away from the origin of the stacking axis past every
    /// neighbour that is not settled. Returns the final position. A settled
    /// occupant is never floated on top of an unsettled one.
    pub fn float(&mut self, key: OccupantKey) -> Result<Position, AllocError> {
        self.ensure_healthy()?;
        let stacking = self.spec.stacking_axis().ok_or(AllocError::NoStackingAxis)?;
        self.walk(key, stacking, Direction::Forward, true)?;
        Ok(self.placed(key)?.0)
    }

    /// Exchanges two adjacent occupants along `axis`. `upper` must start
    /// right where `lower` ends. Along the stacking axis a settled occupant
    /// is never moved on top of an unsettled one.
    pub fn swap(
        &mut self,
        lower: OccupantKey,
        upper: OccupantKey,
        axis: Axis,
    ) -> Result<(), AllocError> {
        self.ensure_healthy()?;
        let plan = self.plan_swap(lower, upper, axis, true)?;
        self.apply_swap(plan)
    }

    /// Sinks `key` when the grid stacks. Returns the swaps to undo it.
    pub(super) fn sink_if_stacking(&mut self, key: OccupantKey) -> Result<Vec<SwapPlan>, AllocError> {
        match self.spec.stacking_axis() {
            Some(stacking) => self.walk(key, stacking, Direction::Backward, true),
            None => Ok(Vec::new()),
        }
    }

    /// Floats `key` to the top of its stack so it can be unlinked without
    /// leaving a gap. Fails with `Buried`, undoing the float, when anything
    /// is still stacked on it afterwards. Returns the swaps to undo it.
    pub(super) fn lift_if_stacking(&mut self, key: OccupantKey) -> Result<Vec<SwapPlan>, AllocError> {
        let Some(stacking) = self.spec.stacking_axis() else {
            return Ok(Vec::new());
        };
        let journal = self.walk(key, stacking, Direction::Forward, false)?;
        if let Some(&above) = self.adjacent(key, stacking, Direction::Forward)?.first() {
            let id = self.record(key)?.id();
            let above = self.record(above)?.id();
            self.undo(journal)?;
            return Err(BuriedError::new(id, above).into());
        }
        Ok(journal)
    }

    /// Reverts the swaps recorded by a walk, latest first.
    pub(super) fn undo(&mut self, journal: Vec<SwapPlan>) -> Result<(), AllocError> {
        for plan in journal.into_iter().rev() {
            self.apply_swap(plan)?;
        }
        Ok(())
    }

    /// Distinct occupants directly next to `key` along `axis`, over its whole
    /// footprint.
    pub(super) fn adjacent(
        &self,
        key: OccupantKey,
        axis: Axis,
        direction: Direction,
    ) -> Result<Vec<OccupantKey>, AllocError> {
        let (position, footprint) = self.placed(key)?;
        let step = match direction {
            Direction::Backward => -1,
            Direction::Forward => 1,
        };
        let mut found = Vec::new();
        for (cell, _) in footprint_cells(position, footprint, self.spec.span_axis()) {
            let Some(other) = cell
                .checked_step(axis, step)
                .and_then(|p| self.occupant_key_at(p))
            else {
                continue;
            };
            if other != key && !found.contains(&other) {
                found.push(other);
            }
        }
        Ok(found)
    }

    /// Swaps `key` with its neighbour in `direction` until nothing unsettled
    /// is left next to it. A neighbourhood that cannot be passed in one swap
    /// rolls every step back and fails with `UnknownFootprint`.
    ///
    /// Returns the inverse of every swap applied, in order. `grounded` is
    /// passed on to [`Grid::plan_swap`].
    fn walk(
        &mut self,
        key: OccupantKey,
        axis: Axis,
        direction: Direction,
        grounded: bool,
    ) -> Result<Vec<SwapPlan>, AllocError> {
        let mut journal = Vec::new();
        loop {
            let next = match self.next_swap(key, axis, direction, grounded) {
                Ok(next) => next,
                Err(e @ AllocError::UnknownFootprint(_)) => {
                    warn!(%e, "rebalancing blocked, rolling back");
                    self.undo(journal)?;
                    return Err(e);
                }
                Err(e) => return Err(e),
            };
            let Some(plan) = next else {
                return Ok(journal);
            };
            let (lower_at, _) = self.placed(plan.lower)?;
            let (upper_at, _) = self.placed(plan.upper)?;
            self.apply_swap(plan)?;
            journal.push(SwapPlan {
                lower_to: lower_at,
                upper_to: upper_at,
                ..plan
            });
        }
    }

    /// The swap that moves `key` one step further, or `None` once every
    /// neighbour in `direction` is settled or there is none.
    fn next_swap(
        &self,
        key: OccupantKey,
        axis: Axis,
        direction: Direction,
        grounded: bool,
    ) -> Result<Option<SwapPlan>, AllocError> {
        let neighbours = self.adjacent(key, axis, direction)?;
        let mut unsettled = Vec::new();
        for other in &neighbours {
            if !self.record(*other)?.is_settled_like() {
                unsettled.push(*other);
            }
        }
        let other = match unsettled.as_slice() {
            [] => return Ok(None),
            [other] if neighbours.len() == 1 => *other,
            [other, ..] => {
                let (a, b) = (self.record(key)?.id(), self.record(*other)?.id());
                return Err(UnknownFootprintError::new(a, b, axis).into());
            }
        };
        let (lower, upper) = match direction {
            Direction::Backward => (other, key),
            Direction::Forward => (key, other),
        };
        self.plan_swap(lower, upper, axis, grounded).map(Some)
    }

    /// Works out where both occupants end up. The upper one takes the lower
    /// one's component; the lower one lands right behind it.
    ///
    /// `grounded` additionally refuses to leave a settled occupant resting on
    /// an unsettled one. Walks lifting an occupant out pass through such
    /// states on their way to the top.
    pub(super) fn plan_swap(
        &self,
        lower: OccupantKey,
        upper: OccupantKey,
        axis: Axis,
        grounded: bool,
    ) -> Result<SwapPlan, AllocError> {
        let span = self.spec.span_axis();
        let (lower_at, lower_fp) = self.placed(lower)?;
        let (upper_at, upper_fp) = self.placed(upper)?;
        let unknown = || -> Result<SwapPlan, AllocError> {
            let lo = self.record(lower)?.id();
            let up = self.record(upper)?.id();
            Err(UnknownFootprintError::new(lo, up, axis).into())
        };

        let base = lower_at.get(axis);
        if lower == upper || upper_at.get(axis) != base + lower_fp.extent_along(axis, span) {
            return unknown();
        }
        let upper_to = upper_at.with(axis, base);
        let lower_to = lower_at.with(axis, base + upper_fp.extent_along(axis, span));
        if !validate::fits(&self.spec, upper_to, upper_fp)
            || !validate::fits(&self.spec, lower_to, lower_fp)
        {
            return unknown();
        }

        let before: Vec<(Position, CellRole)> = footprint_cells(lower_at, lower_fp, span)
            .chain(footprint_cells(upper_at, upper_fp, span))
            .collect();
        let after: Vec<(Position, CellRole)> = footprint_cells(upper_to, upper_fp, span)
            .chain(footprint_cells(lower_to, lower_fp, span))
            .collect();
        for (i, (cell, _)) in after.iter().enumerate() {
            if after[..i].iter().any(|(c, _)| c == cell) {
                return unknown();
            }
            match self.cells.get(*cell) {
                None => {}
                Some(k) if k == lower || k == upper => {}
                Some(_) => return unknown(),
            }
        }
        if let Some(stacking) = self.spec.stacking_axis()
            && stacking == axis
        {
            let owned: Vec<(Position, OccupantKey)> = footprint_cells(upper_to, upper_fp, span)
                .map(|(c, _)| (c, upper))
                .chain(footprint_cells(lower_to, lower_fp, span).map(|(c, _)| (c, lower)))
                .collect();
            if !self.stays_compact(stacking, &before, &owned, (lower, upper), grounded) {
                return unknown();
            }
        }
        if !self.keeps_exclusivity(&before, &after) {
            return unknown();
        }

        Ok(SwapPlan {
            lower,
            upper,
            lower_to,
            upper_to,
        })
    }

    /// Whether the stacks stay gap-free once the pair has moved to `after`.
    /// Every cell taken must rest on a linked cell and no third occupant may
    /// hang over a cell given up.
    fn stays_compact(
        &self,
        stacking: Axis,
        before: &[(Position, CellRole)],
        after: &[(Position, OccupantKey)],
        (lower, upper): (OccupantKey, OccupantKey),
        grounded: bool,
    ) -> bool {
        let owner = |cell: Position| match after.iter().find(|(c, _)| *c == cell) {
            Some((_, k)) => Some(*k),
            None => self
                .occupant_key_at(cell)
                .filter(|k| *k != lower && *k != upper),
        };
        let settled = |k: OccupantKey| self.occupants.get(k).is_some_and(|o| o.is_settled_like());

        let rests = after.iter().all(|(cell, key)| {
            let Some(below) = cell.checked_step(stacking, -1) else {
                return true;
            };
            match owner(below) {
                Some(b) => !grounded || b == *key || !settled(*key) || settled(b),
                None => false,
            }
        });
        let covered = before
            .iter()
            .filter(|(c, _)| !after.iter().any(|(a, _)| a == c))
            .all(|(cell, _)| {
                cell.checked_step(stacking, 1)
                    .and_then(|above| owner(above))
                    .is_none()
            });
        rests && covered
    }

    /// Whether moving the cells in `before` to `after` leaves every
    /// synchronised column holding a single kind of cell.
    fn keeps_exclusivity(&self, before: &[(Position, CellRole)], after: &[(Position, CellRole)]) -> bool {
        let dims = self.dims();
        let span = self.spec.span_axis();
        // Along the span axis both cells of a Long share one column.
        let mark = |axis: Axis, role: CellRole| match role {
            CellRole::LongTail if axis == span => CellRole::LongHead.marks(),
            r => r.marks(),
        };
        for axis in self.spec.synced_axes() {
            for (cell, role) in after {
                let column = dims.column_index(*cell, axis);
                let wanted = mark(axis, *role);
                let leaving = before
                    .iter()
                    .filter(|(c, _)| dims.column_index(*c, axis) == column)
                    .count();
                let count = self.columns.count(axis, column, Counter::Reserved) as usize;
                if count.saturating_sub(leaving) > 0 && self.columns.state(axis, column) != Some(wanted) {
                    return false;
                }
                let mixed = after.iter().any(|(c, r)| {
                    dims.column_index(*c, axis) == column && mark(axis, *r) != wanted
                });
                if mixed {
                    return false;
                }
            }
        }
        true
    }

    pub(super) fn apply_swap(&mut self, plan: SwapPlan) -> Result<(), AllocError> {
        let lower_id = self.record(plan.lower)?.id();
        let upper_id = self.record(plan.upper)?.id();
        trace!(%lower_id, %upper_id, lower_to = %plan.lower_to, upper_to = %plan.upper_to, "swap");
        self.displace(plan.lower)?;
        self.displace(plan.upper)?;
        self.restore(plan.upper, plan.upper_to)?;
        self.restore(plan.lower, plan.lower_to)
    }

    /// Inverse of `displace`: links and counts `key` again at `position`.
    pub(super) fn restore(&mut self, key: OccupantKey, position: Position) -> Result<(), AllocError> {
        self.place(key, position)?;
        if self.record(key)?.is_settled_like() {
            let footprint = self.record(key)?.footprint();
            self.adjust_at(position, footprint, 1, Counter::Settled)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::err::AllocError;
    use crate::grid::{
        Grid,
        columns::{Counter, ExclusivityState},
    };
    use crate::occupant::OccupantKey;
    use stack_alloc_core::{
        axis::Axis,
        coord::{Dims, Position, Target},
        time::TimePoint,
    };
    use stack_alloc_model::{
        footprint::Footprint, id::OccupantId, spec::GridSpecBuilder, state::OccupantState,
    };

    #[inline]
    fn pos(x: usize, y: usize, z: usize) -> Position {
        Position::new(x, y, z)
    }

    #[inline]
    fn tp(v: i64) -> TimePoint<i64> {
        TimePoint::new(v)
    }

    #[inline]
    fn stack(x: usize, y: usize) -> Target {
        Target::new([Some(x), Some(y), None])
    }

    fn open_grid(x: usize, y: usize, z: usize) -> Grid {
        Grid::new(
            GridSpecBuilder::new()
                .dims(Dims::new(x, y, z))
                .unsync_axis(Axis::Y)
                .unsync_axis(Axis::Z)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_sink_stops_at_settled_neighbour() {
        let mut g = open_grid(1, 1, 4);
        let keys: Vec<_> = (0..4)
            .map(|i| g.register(OccupantId::new(i), Footprint::Short).unwrap())
            .collect();
        g.reserve(keys[0], stack(0, 0), tp(0)).unwrap();
        g.settle(keys[0], tp(0)).unwrap();
        for k in &keys[1..] {
            g.reserve(*k, stack(0, 0), tp(0)).unwrap();
        }
        assert_eq!(g.settle(keys[3], tp(1)).unwrap(), pos(0, 0, 1));
        assert_eq!(g.occupant(keys[0]).unwrap().position(), Some(pos(0, 0, 0)));
        assert_eq!(g.occupant(keys[1]).unwrap().position(), Some(pos(0, 0, 2)));
        assert_eq!(g.occupant(keys[2]).unwrap().position(), Some(pos(0, 0, 3)));
        g.audit().unwrap();
    }

    #[test]
    fn test_public_float_moves_reserved_to_top() {
        let mut g = open_grid(1, 1, 3);
        let a = g.register(OccupantId::new(1), Footprint::Short).unwrap();
        let b = g.register(OccupantId::new(2), Footprint::Short).unwrap();
        g.reserve(a, stack(0, 0), tp(0)).unwrap();
        g.reserve(b, stack(0, 0), tp(0)).unwrap();
        assert_eq!(g.float(a).unwrap(), pos(0, 0, 1));
        assert_eq!(g.sink(a).unwrap(), pos(0, 0, 0));
        assert_eq!(g.occupant(b).unwrap().position(), Some(pos(0, 0, 1)));
    }

    #[test]
    fn test_swap_along_span_applies_size_correction() {
        let mut g = Grid::<i64>::new(
            GridSpecBuilder::new()
                .dims(Dims::new(4, 1, 1))
                .no_stacking()
                .unsync_axis(Axis::Y)
                .unsync_axis(Axis::Z)
                .build()
                .unwrap(),
        );
        let long = g.register(OccupantId::new(1), Footprint::Long).unwrap();
        let short = g.register(OccupantId::new(2), Footprint::Short).unwrap();
        g.reserve(long, Target::from(pos(0, 0, 0)), tp(0)).unwrap();
        g.reserve(short, Target::from(pos(2, 0, 0)), tp(0)).unwrap();
        g.swap(long, short, Axis::X).unwrap();
        assert_eq!(g.occupant(short).unwrap().position(), Some(pos(0, 0, 0)));
        assert_eq!(g.occupant(long).unwrap().position(), Some(pos(1, 0, 0)));
        assert_eq!(g.occupant_key_at(pos(2, 0, 0)), Some(long));
        assert_eq!(g.occupant_key_at(pos(3, 0, 0)), None);
        g.swap(short, long, Axis::X).unwrap();
        assert_eq!(g.occupant(long).unwrap().position(), Some(pos(0, 0, 0)));
        assert_eq!(g.occupant(short).unwrap().position(), Some(pos(2, 0, 0)));
        g.audit().unwrap();
    }

    #[test]
    fn test_swap_of_non_adjacent_pair_is_unknown_footprint() {
        let mut g = open_grid(1, 1, 3);
        let a = g.register(OccupantId::new(1), Footprint::Short).unwrap();
        let b = g.register(OccupantId::new(2), Footprint::Short).unwrap();
        g.reserve(a, stack(0, 0), tp(0)).unwrap();
        g.reserve(b, stack(0, 0), tp(0)).unwrap();
        let err = g.swap(b, a, Axis::Z).unwrap_err();
        assert!(matches!(err, AllocError::UnknownFootprint(_)));
        assert!(err.is_recoverable());
        assert_eq!(g.occupant(a).unwrap().position(), Some(pos(0, 0, 0)));
    }

    #[test]
    fn test_swap_keeps_settled_counts_with_their_occupant() {
        let mut g = Grid::<i64>::new(
            GridSpecBuilder::new()
                .dims(Dims::new(3, 1, 1))
                .no_stacking()
                .unsync_axis(Axis::Y)
                .unsync_axis(Axis::Z)
                .build()
                .unwrap(),
        );
        let a = g.register(OccupantId::new(1), Footprint::Short).unwrap();
        let b = g.register(OccupantId::new(2), Footprint::Short).unwrap();
        g.reserve(a, Target::from(pos(0, 0, 0)), tp(0)).unwrap();
        g.settle(a, tp(0)).unwrap();
        g.reserve(b, Target::from(pos(1, 0, 0)), tp(0)).unwrap();
        g.swap(a, b, Axis::X).unwrap();
        assert_eq!(g.count(pos(0, 0, 0), Axis::Y, Counter::Settled), Some(0));
        assert_eq!(g.count(pos(1, 0, 0), Axis::Y, Counter::Settled), Some(1));
        assert!(g.is_occupied(pos(1, 0, 0)));
        g.audit().unwrap();
    }

    #[test]
    fn test_swap_never_lifts_settled_onto_reserved() {
        let mut g = open_grid(1, 1, 3);
        let a = g.register(OccupantId::new(1), Footprint::Short).unwrap();
        let b = g.register(OccupantId::new(2), Footprint::Short).unwrap();
        g.reserve(a, stack(0, 0), tp(0)).unwrap();
        g.settle(a, tp(0)).unwrap();
        g.reserve(b, stack(0, 0), tp(0)).unwrap();
        let err = g.swap(a, b, Axis::Z).unwrap_err();
        assert!(matches!(err, AllocError::UnknownFootprint(_)));
        assert_eq!(g.occupant(a).unwrap().position(), Some(pos(0, 0, 0)));
        assert_eq!(g.occupant(b).unwrap().position(), Some(pos(0, 0, 1)));
        g.audit().unwrap();
    }

    // A Long resting on two different Shorts cannot trade places with just
    // one of them, so it cannot settle until both have.
    #[test]
    fn test_settle_refused_over_unreconcilable_pair() {
        let mut g = open_grid(2, 1, 3);
        let left = g.register(OccupantId::new(1), Footprint::Short).unwrap();
        let right = g.register(OccupantId::new(2), Footprint::Short).unwrap();
        let long = g.register(OccupantId::new(3), Footprint::Long).unwrap();
        g.reserve(left, stack(0, 0), tp(0)).unwrap();
        g.reserve(right, stack(1, 0), tp(0)).unwrap();
        g.reserve(long, stack(0, 0), tp(0)).unwrap();

        let err = g.settle(long, tp(1)).unwrap_err();
        assert!(matches!(err, AllocError::UnknownFootprint(_)));
        let o = g.occupant(long).unwrap();
        assert_eq!(o.state(), OccupantState::Reserved);
        assert_eq!(o.settled_at(), None);
        assert_eq!(o.position(), Some(pos(0, 0, 1)));
        assert_eq!(g.count(pos(0, 0, 1), Axis::Z, Counter::Settled), Some(0));
        g.audit().unwrap();

        // Neither Short can leave from under it either.
        let err = g.cancel_reserve(left).unwrap_err();
        assert!(matches!(err, AllocError::UnknownFootprint(_)));
        assert_eq!(g.occupant(left).unwrap().state(), OccupantState::Reserved);
        assert_eq!(g.occupant_key_at(pos(0, 0, 0)), Some(left));
        assert_eq!(g.occupant_key_at(pos(0, 0, 1)), Some(long));
        g.audit().unwrap();

        g.settle(left, tp(2)).unwrap();
        g.settle(right, tp(2)).unwrap();
        assert_eq!(g.settle(long, tp(3)).unwrap(), pos(0, 0, 1));
        g.audit().unwrap();
    }

    // A settled Long carrying two separate Shorts cannot float past them.
    #[test]
    fn test_vacate_refused_under_split_neighbours() {
        let mut g = Grid::<i64>::new(
            GridSpecBuilder::new()
                .dims(Dims::new(2, 1, 3))
                .synced_axes([Axis::X])
                .build()
                .unwrap(),
        );
        let long = g.register(OccupantId::new(1), Footprint::Long).unwrap();
        let b = g.register(OccupantId::new(2), Footprint::Short).unwrap();
        let c = g.register(OccupantId::new(3), Footprint::Short).unwrap();
        g.reserve(long, stack(0, 0), tp(0)).unwrap();
        g.settle(long, tp(0)).unwrap();
        g.reserve(b, stack(0, 0), tp(1)).unwrap();
        g.reserve(c, stack(1, 0), tp(1)).unwrap();

        let err = g.vacate(long, tp(2)).unwrap_err();
        assert!(matches!(err, AllocError::UnknownFootprint(_)));
        let o = g.occupant(long).unwrap();
        assert_eq!(o.state(), OccupantState::Settled);
        assert_eq!(o.vacated_at(), None);
        assert_eq!(o.position(), Some(pos(0, 0, 0)));
        assert_eq!(g.occupant(b).unwrap().position(), Some(pos(0, 0, 1)));
        assert_eq!(g.occupant(c).unwrap().position(), Some(pos(1, 0, 1)));
        assert_eq!(g.top_of_stack(stack(0, 0)).unwrap(), pos(0, 0, 2));
        g.audit().unwrap();

        let d = g.register(OccupantId::new(4), Footprint::Short).unwrap();
        assert_eq!(g.reserve(d, stack(0, 0), tp(3)).unwrap(), pos(0, 0, 2));
        g.audit().unwrap();
    }

    // The first swap of the walk succeeds, the second is blocked, and the
    // first is rolled back.
    #[test]
    fn test_blocked_walk_rolls_back_earlier_swaps() {
        let mut g = Grid::<i64>::new(
            GridSpecBuilder::new()
                .dims(Dims::new(2, 1, 4))
                .synced_axes([Axis::X])
                .build()
                .unwrap(),
        );
        let low = g.register(OccupantId::new(1), Footprint::Long).unwrap();
        let mid = g.register(OccupantId::new(2), Footprint::Long).unwrap();
        let b = g.register(OccupantId::new(3), Footprint::Short).unwrap();
        let c = g.register(OccupantId::new(4), Footprint::Short).unwrap();
        g.reserve(low, stack(0, 0), tp(0)).unwrap();
        g.settle(low, tp(0)).unwrap();
        g.reserve(mid, stack(0, 0), tp(1)).unwrap();
        g.reserve(b, stack(0, 0), tp(1)).unwrap();
        g.reserve(c, stack(1, 0), tp(1)).unwrap();

        let err = g.begin_vacate(low, tp(2)).unwrap_err();
        assert!(matches!(err, AllocError::UnknownFootprint(_)));
        assert_eq!(g.occupant(low).unwrap().position(), Some(pos(0, 0, 0)));
        assert_eq!(g.occupant(mid).unwrap().position(), Some(pos(0, 0, 1)));
        assert_eq!(g.count(pos(0, 0, 0), Axis::X, Counter::Settled), Some(2));
        assert_eq!(g.count(pos(0, 0, 1), Axis::X, Counter::Settled), Some(0));
        g.audit().unwrap();

        // Public float hits the same wall.
        assert!(matches!(g.float(mid), Err(AllocError::UnknownFootprint(_))));
        assert_eq!(g.occupant(mid).unwrap().position(), Some(pos(0, 0, 1)));
    }

    #[test]
    fn test_sink_swaps_stacked_longs() {
        let mut g = open_grid(2, 1, 3);
        let a = g.register(OccupantId::new(1), Footprint::Long).unwrap();
        let b = g.register(OccupantId::new(2), Footprint::Long).unwrap();
        g.reserve(a, stack(0, 0), tp(0)).unwrap();
        g.reserve(b, stack(0, 0), tp(0)).unwrap();
        assert_eq!(g.settle(b, tp(1)).unwrap(), pos(0, 0, 0));
        assert_eq!(g.occupant(a).unwrap().position(), Some(pos(0, 0, 1)));
        assert_eq!(g.occupant_key_at(pos(1, 0, 1)), Some(a));
        g.audit().unwrap();
    }

    #[test]
    fn test_sink_without_stacking_axis_is_reported() {
        let mut g = Grid::<i64>::new(
            GridSpecBuilder::new()
                .dims(Dims::new(2, 2, 2))
                .no_stacking()
                .build()
                .unwrap(),
        );
        let a = g.register(OccupantId::new(1), Footprint::Short).unwrap();
        g.reserve(a, Target::from(pos(0, 0, 0)), tp(0)).unwrap();
        assert_eq!(g.sink(a), Err(AllocError::NoStackingAxis));
    }

    fn bay_row(with_neighbour: bool) -> (Grid, OccupantKey, OccupantKey) {
        let mut g = Grid::new(
            GridSpecBuilder::new()
                .dims(Dims::new(4, 2, 1))
                .no_stacking()
                .synced_axes([Axis::Y])
                .build()
                .unwrap(),
        );
        let long = g.register(OccupantId::new(1), Footprint::Long).unwrap();
        let short = g.register(OccupantId::new(2), Footprint::Short).unwrap();
        g.reserve(long, Target::from(pos(0, 0, 0)), tp(0)).unwrap();
        g.reserve(short, Target::from(pos(2, 0, 0)), tp(0)).unwrap();
        if with_neighbour {
            let n = g.register(OccupantId::new(3), Footprint::Short).unwrap();
            g.reserve(n, Target::from(pos(2, 1, 0)), tp(0)).unwrap();
        }
        (g, long, short)
    }

    #[test]
    fn test_swap_moves_exclusivity_with_the_cells() {
        let (mut g, long, short) = bay_row(false);
        g.swap(long, short, Axis::X).unwrap();
        assert_eq!(g.column_state(pos(0, 0, 0), Axis::Y), Some(ExclusivityState::ShortOnly));
        assert_eq!(g.column_state(pos(1, 0, 0), Axis::Y), Some(ExclusivityState::LongOnly));
        assert_eq!(
            g.column_state(pos(2, 0, 0), Axis::Y),
            Some(ExclusivityState::LongOnlyTail)
        );
        g.audit().unwrap();
    }

    #[test]
    fn test_swap_refuses_to_mix_footprints_in_synced_column() {
        let (mut g, long, short) = bay_row(true);
        let err = g.swap(long, short, Axis::X).unwrap_err();
        assert!(matches!(err, AllocError::UnknownFootprint(_)));
        assert_eq!(g.occupant(long).unwrap().position(), Some(pos(0, 0, 0)));
        assert_eq!(g.column_state(pos(2, 1, 0), Axis::Y), Some(ExclusivityState::ShortOnly));
        g.audit().unwrap();
    }

    #[test]
    fn test_stacking_swap_needs_support() {
        let mut g = open_grid(2, 1, 3);
        let long = g.register(OccupantId::new(1), Footprint::Long).unwrap();
        let short = g.register(OccupantId::new(2), Footprint::Short).unwrap();
        g.reserve(long, stack(0, 0), tp(0)).unwrap();
        g.reserve(short, stack(0, 0), tp(0)).unwrap();
        // The Long would hang over the cell the Short leaves behind.
        let err = g.swap(long, short, Axis::Z).unwrap_err();
        assert!(matches!(err, AllocError::UnknownFootprint(_)));
    }
}
