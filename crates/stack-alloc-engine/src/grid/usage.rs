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
    columns::{Counter, ExclusivityState},
};
use crate::err::{AllocError, OutOfBoundsError};
use rayon::prelude::*;
use stack_alloc_core::{
    TimeVariable,
    axis::Axis,
    coord::{ColumnIndex, Position, Target},
};
use stack_alloc_model::footprint::Footprint;

impl<T: TimeVariable> Grid<T> {
    /// Number of counted cells matching `target`.
    ///
    /// Every unresolved component is a wildcard, so a fully resolved target
    /// asks about a single cell (`0` or `1`), one unresolved component about
    /// a column, two about a plane and three about the whole grid.
    pub fn usage(&self, target: Target, counter: Counter) -> Result<usize, AllocError> {
        let dims = self.dims();
        let out_of_bounds = Axis::ALL
            .into_iter()
            .any(|a| target.get(a).is_some_and(|v| v >= dims.extent(a)));
        if out_of_bounds {
            return Err(OutOfBoundsError::new(target.resolve_or_zero(), Footprint::Short).into());
        }

        let Some(along) = target.unresolved_axes().next() else {
            let position = target.resolve_or_zero();
            let counted = match counter {
                Counter::Reserved => self.is_reserved(position),
                Counter::Settled => self.is_occupied(position),
            };
            return Ok(usize::from(counted));
        };

        let counts = self.columns.counts_along(along, counter);
        let total = (0..counts.len())
            .filter(|c| {
                let origin = dims.column_origin(ColumnIndex::new(*c), along);
                along
                    .others()
                    .into_iter()
                    .all(|a| target.get(a).is_none_or(|v| origin.get(a) == v))
            })
            .map(|c| counts[c] as usize)
            .sum();
        Ok(total)
    }

    /// Counts of every column along `axis`, indexed by column.
    ///
    /// `avail` filters by the first orthogonal component; filtered columns
    /// read as zero.
    pub fn column_usages(&self, axis: Axis, counter: Counter, avail: Option<&[bool]>) -> Vec<u32> {
        let dims = self.dims();
        let [a0, _] = axis.others();
        self.columns
            .counts_along(axis, counter)
            .iter()
            .enumerate()
            .map(|(c, &n)| {
                let origin = dims.column_origin(ColumnIndex::new(c), axis);
                if is_available(avail, origin.get(a0)) { n } else { 0 }
            })
            .collect()
    }

    /// Counted cells of every slice orthogonal to `norm`, indexed by the
    /// `norm` component. Filtered slices read as zero.
    pub fn slot_usages(&self, norm: Axis, counter: Counter, avail: Option<&[bool]>) -> Vec<u32> {
        let dims = self.dims();
        let [_, a1] = norm.others();
        let mut slots = vec![0u32; dims.extent(norm)];
        for (c, &n) in self.columns.counts_along(a1, counter).iter().enumerate() {
            let i = dims.column_origin(ColumnIndex::new(c), a1).get(norm);
            if is_available(avail, i) {
                slots[i] += n;
            }
        }
        slots
    }

    /// Exclusivity state of every slice orthogonal to `norm`, read from the
    /// first synchronised orthogonal axis. `None` when neither is
    /// synchronised.
    pub fn slot_states(&self, norm: Axis) -> Option<Vec<ExclusivityState>> {
        let dims = self.dims();
        let axis = norm
            .others()
            .into_iter()
            .find(|a| self.columns.is_synced(*a))?;
        (0..dims.extent(norm))
            .map(|i| self.columns.state_at(Position::origin().with(norm, i), axis))
            .collect()
    }

    /// Whether each slice orthogonal to `norm` would admit `footprint`
    /// according to its exclusivity states.
    pub fn validate_slots(&self, norm: Axis, footprint: Footprint) -> Vec<bool> {
        let dims = self.dims();
        let span = self.spec.span_axis();
        (0..dims.extent(norm))
            .map(|i| {
                let head = Position::origin().with(norm, i);
                norm.others()
                    .into_iter()
                    .filter(|a| self.columns.is_synced(*a))
                    .all(|axis| {
                        let Some(state) = self.columns.state_at(head, axis) else {
                            return true;
                        };
                        if !footprint.is_long() {
                            return state.admits(footprint, ExclusivityState::Free);
                        }
                        let tail = head.with(span, head.get(span) + 1);
                        dims.contains(tail)
                            && self
                                .columns
                                .state_at(tail, axis)
                                .is_some_and(|t| state.admits(footprint, t))
                    })
            })
            .collect()
    }

    /// Runs the full placement check for many candidates in parallel.
    pub fn validate_many(&self, targets: &[Target], footprint: Footprint) -> Vec<bool> {
        targets
            .par_iter()
            .map(|t| self.admit(*t, footprint).is_ok())
            .collect()
    }

    /// Positions where `footprint` could be reserved right now: the top of
    /// every stack that admits it, or every admissible cell on grids
    /// without a stacking axis.
    pub fn available_positions(&self, footprint: Footprint) -> impl Iterator<Item = Position> + '_ {
        let stacking = self.spec.stacking_axis();
        self.dims()
            .positions()
            .filter_map(move |p| match stacking {
                Some(axis) if p.get(axis) != 0 => None,
                Some(axis) => Some(Target::unresolved_along(p, axis)),
                None => Some(Target::from(p)),
            })
            .filter_map(move |t| self.admit(t, footprint).ok())
    }
}

#[inline]
fn is_available(avail: Option<&[bool]>, i: usize) -> bool {
    avail.is_none_or(|a| a.get(i).copied().unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use crate::err::AllocError;
    use crate::grid::{
        Grid,
        columns::{Counter, ExclusivityState},
    };
    use stack_alloc_core::{
        axis::Axis,
        coord::{Dims, Position, Target},
        time::TimePoint,
    };
    use stack_alloc_model::{footprint::Footprint, id::OccupantId, spec::GridSpecBuilder};

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

    // Bay x = 0 holds a settled Short and a reserved Short, bay x = 2 a
    // settled Long spanning rows y = 0 and y = 1.
    fn yard() -> Grid {
        let mut g = Grid::new(
            GridSpecBuilder::new()
                .dims(Dims::new(3, 3, 2))
                .span_axis(Axis::Y)
                .build()
                .unwrap(),
        );
        let a = g.register(OccupantId::new(1), Footprint::Short).unwrap();
        let b = g.register(OccupantId::new(2), Footprint::Short).unwrap();
        let c = g.register(OccupantId::new(3), Footprint::Long).unwrap();
        g.reserve(a, stack(0, 0), tp(0)).unwrap();
        g.settle(a, tp(0)).unwrap();
        g.reserve(b, stack(0, 0), tp(0)).unwrap();
        g.reserve(c, stack(2, 0), tp(0)).unwrap();
        g.settle(c, tp(0)).unwrap();
        g
    }

    #[test]
    fn test_usage_by_number_of_wildcards() {
        let g = yard();
        let t = |x, y, z| Target::new([x, y, z]);
        assert_eq!(g.usage(t(Some(0), Some(0), Some(1)), Counter::Reserved), Ok(1));
        assert_eq!(g.usage(t(Some(0), Some(0), Some(1)), Counter::Settled), Ok(0));
        assert_eq!(g.usage(t(Some(0), Some(0), None), Counter::Reserved), Ok(2));
        assert_eq!(g.usage(t(Some(2), None, None), Counter::Reserved), Ok(2));
        assert_eq!(g.usage(t(None, None, Some(0)), Counter::Settled), Ok(3));
        assert_eq!(g.usage(t(None, None, None), Counter::Reserved), Ok(4));
        assert_eq!(g.usage(t(None, None, None), Counter::Settled), Ok(3));
        assert!(matches!(
            g.usage(t(Some(3), None, None), Counter::Reserved),
            Err(AllocError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_column_usages_honours_avail() {
        let g = yard();
        let all = g.column_usages(Axis::Z, Counter::Reserved, None);
        assert_eq!(all.len(), 9);
        assert_eq!(all.iter().sum::<u32>(), 4);
        let only_first = g.column_usages(Axis::Z, Counter::Reserved, Some(&[true, false, false]));
        assert_eq!(only_first.iter().sum::<u32>(), 2);
    }

    #[test]
    fn test_slot_usages_sums_bays() {
        let g = yard();
        assert_eq!(g.slot_usages(Axis::X, Counter::Reserved, None), vec![2, 0, 2]);
        assert_eq!(g.slot_usages(Axis::X, Counter::Settled, None), vec![1, 0, 2]);
        assert_eq!(
            g.slot_usages(Axis::X, Counter::Reserved, Some(&[false, true, true])),
            vec![0, 0, 2]
        );
    }

    #[test]
    fn test_slot_states_reads_first_synced_axis() {
        let g = yard();
        assert_eq!(
            g.slot_states(Axis::X),
            Some(vec![
                ExclusivityState::ShortOnly,
                ExclusivityState::Free,
                ExclusivityState::LongOnly
            ])
        );
        let open: Grid = Grid::new(
            GridSpecBuilder::new()
                .dims(Dims::new(2, 2, 2))
                .unsync_axis(Axis::Y)
                .unsync_axis(Axis::Z)
                .build()
                .unwrap(),
        );
        assert_eq!(open.slot_states(Axis::X), None);
    }

    #[test]
    fn test_validate_slots_by_footprint() {
        let g = yard();
        assert_eq!(g.validate_slots(Axis::X, Footprint::Short), vec![true, true, false]);
        assert_eq!(g.validate_slots(Axis::X, Footprint::Long), vec![false, true, true]);
    }

    #[test]
    fn test_validate_many_matches_sequential_checks() {
        let g = yard();
        let targets: Vec<Target> = (0..3)
            .flat_map(|x| (0..3).map(move |y| stack(x, y)))
            .collect();
        let parallel = g.validate_many(&targets, Footprint::Short);
        let sequential: Vec<bool> = targets
            .iter()
            .map(|t| g.landing_position(*t).is_ok_and(|p| g.is_valid(p, Footprint::Short)))
            .collect();
        assert_eq!(parallel, sequential);
        // Stack (0, 0) is full, stack (0, 1) is empty, bay 2 is Long only.
        assert!(!parallel[0]);
        assert!(parallel[1]);
        assert!(!parallel[6]);
    }

    #[test]
    fn test_available_positions_are_stack_tops() {
        let g = yard();
        let tops: Vec<Position> = g.available_positions(Footprint::Short).collect();
        assert!(tops.contains(&pos(0, 1, 0)));
        assert!(tops.contains(&pos(1, 0, 0)));
        assert!(!tops.iter().any(|p| p.get(Axis::X) == 2));
        assert!(!tops.contains(&pos(0, 0, 2)));
        for p in tops {
            assert!(g.is_valid(p, Footprint::Short));
        }
    }
}
