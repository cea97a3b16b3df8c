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

use crate::axis::Axis;
use std::fmt::Display;

/// Dense index of a unit cell inside a grid.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellIndex(usize);

impl CellIndex {
    #[inline]
    pub const fn new(v: usize) -> Self {
        CellIndex(v)
    }

    #[inline]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl Display for CellIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CellIndex({})", self.0)
    }
}

/// Dense index of a unit column running along one axis.
///
/// The column is identified by the two components orthogonal to the axis it
/// runs along, so the same cell belongs to three different columns, one
/// per axis.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnIndex(usize);

impl ColumnIndex {
    #[inline]
    pub const fn new(v: usize) -> Self {
        ColumnIndex(v)
    }

    #[inline]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl Display for ColumnIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ColumnIndex({})", self.0)
    }
}

/// Dense index of a stack, i.e. the column along the stacking axis.
///
/// Grids without a stacking axis treat every cell as its own stack.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackIndex(usize);

impl StackIndex {
    #[inline]
    pub const fn new(v: usize) -> Self {
        StackIndex(v)
    }

    #[inline]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl Display for StackIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StackIndex({})", self.0)
    }
}

/// A fully resolved grid coordinate.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position([usize; 3]);

impl Position {
    #[inline]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Position([x, y, z])
    }

    #[inline]
    pub const fn origin() -> Self {
        Position([0, 0, 0])
    }

    #[inline]
    pub const fn get(self, axis: Axis) -> usize {
        self.0[axis.index()]
    }

    #[inline]
    pub const fn with(self, axis: Axis, value: usize) -> Self {
        let mut c = self.0;
        c[axis.index()] = value;
        Position(c)
    }

    /// Moves `delta` cells along `axis`; `None` when the result would be
    /// negative. Upper bounds are the caller's business (see [`Dims::contains`]).
    #[inline]
    pub fn checked_step(self, axis: Axis, delta: isize) -> Option<Self> {
        self.get(axis)
            .checked_add_signed(delta)
            .map(|v| self.with(axis, v))
    }

    #[inline]
    pub const fn as_array(self) -> [usize; 3] {
        self.0
    }
}

impl From<[usize; 3]> for Position {
    #[inline]
    fn from(v: [usize; 3]) -> Self {
        Position(v)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

/// A coordinate whose components may still be unresolved.
///
/// Placement strategies hand these to the allocator; an unresolved
/// component on the stacking axis asks the allocator to compute the landing
/// height itself.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Target([Option<usize>; 3]);

impl Target {
    #[inline]
    pub const fn new(components: [Option<usize>; 3]) -> Self {
        Target(components)
    }

    /// Builds a target from the raw signed form where any negative
    /// component means "unresolved".
    #[inline]
    pub fn from_raw(raw: [i64; 3]) -> Self {
        Target(raw.map(|v| usize::try_from(v).ok()))
    }

    /// A target with every component resolved except the one along `axis`.
    #[inline]
    pub const fn unresolved_along(position: Position, axis: Axis) -> Self {
        let p = position.as_array();
        let mut c = [Some(p[0]), Some(p[1]), Some(p[2])];
        c[axis.index()] = None;
        Target(c)
    }

    #[inline]
    pub const fn get(self, axis: Axis) -> Option<usize> {
        self.0[axis.index()]
    }

    #[inline]
    pub const fn with(self, axis: Axis, value: Option<usize>) -> Self {
        let mut c = self.0;
        c[axis.index()] = value;
        Target(c)
    }

    #[inline]
    pub fn is_resolved(self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    #[inline]
    pub fn unresolved_axes(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |a| self.get(*a).is_none())
    }

    #[inline]
    pub fn unresolved_count(self) -> usize {
        self.0.iter().filter(|c| c.is_none()).count()
    }

    #[inline]
    pub fn resolve(self) -> Option<Position> {
        match self.0 {
            [Some(x), Some(y), Some(z)] => Some(Position::new(x, y, z)),
            _ => None,
        }
    }

    /// Fills unresolved components with zero. Used where a component is
    /// irrelevant to the lookup, e.g. the stacking component of a stack key.
    #[inline]
    pub fn resolve_or_zero(self) -> Position {
        Position(self.0.map(|c| c.unwrap_or(0)))
    }
}

impl From<Position> for Target {
    #[inline]
    fn from(p: Position) -> Self {
        let [x, y, z] = p.as_array();
        Target([Some(x), Some(y), Some(z)])
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let part = |c: Option<usize>| c.map_or_else(|| "_".to_string(), |v| v.to_string());
        write!(
            f,
            "({}, {}, {})",
            part(self.0[0]),
            part(self.0[1]),
            part(self.0[2])
        )
    }
}

/// Extents of a grid along its three axes, and the index arithmetic that
/// maps positions onto the dense per-cell, per-column and per-stack arrays.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dims([usize; 3]);

impl Dims {
    #[inline]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Dims([x, y, z])
    }

    #[inline]
    pub const fn extent(self, axis: Axis) -> usize {
        self.0[axis.index()]
    }

    #[inline]
    pub const fn as_array(self) -> [usize; 3] {
        self.0
    }

    #[inline]
    pub fn checked_cell_count(self) -> Option<usize> {
        self.0[0].checked_mul(self.0[1])?.checked_mul(self.0[2])
    }

    #[inline]
    pub fn cell_count(self) -> usize {
        self.0[0] * self.0[1] * self.0[2]
    }

    #[inline]
    pub fn contains(self, position: Position) -> bool {
        Axis::ALL
            .iter()
            .all(|&a| position.get(a) < self.extent(a))
    }

    /// Number of distinct columns running along `along`.
    #[inline]
    pub fn column_count(self, along: Axis) -> usize {
        let [a0, a1] = along.others();
        self.extent(a0) * self.extent(a1)
    }

    #[inline]
    pub fn cell_index(self, position: Position) -> CellIndex {
        debug_assert!(self.contains(position));
        let [x, y, z] = position.as_array();
        CellIndex::new((x * self.0[1] + y) * self.0[2] + z)
    }

    #[inline]
    pub fn position_of(self, cell: CellIndex) -> Position {
        let v = cell.value();
        let z = v % self.0[2];
        let y = (v / self.0[2]) % self.0[1];
        let x = v / (self.0[2] * self.0[1]);
        Position::new(x, y, z)
    }

    /// Index of the column running along `along` that passes through
    /// `position`. Only the two orthogonal components contribute.
    #[inline]
    pub fn column_index(self, position: Position, along: Axis) -> ColumnIndex {
        let [a0, a1] = along.others();
        ColumnIndex::new(position.get(a0) * self.extent(a1) + position.get(a1))
    }

    /// The cell of column `column` with the `along` component set to zero.
    #[inline]
    pub fn column_origin(self, column: ColumnIndex, along: Axis) -> Position {
        let [a0, a1] = along.others();
        let e1 = self.extent(a1);
        Position::origin()
            .with(a0, column.value() / e1)
            .with(a1, column.value() % e1)
    }

    #[inline]
    pub fn stack_count(self, stacking: Option<Axis>) -> usize {
        match stacking {
            Some(axis) => self.column_count(axis),
            None => self.cell_count(),
        }
    }

    #[inline]
    pub fn stack_index(self, position: Position, stacking: Option<Axis>) -> StackIndex {
        match stacking {
            Some(axis) => StackIndex::new(self.column_index(position, axis).value()),
            None => StackIndex::new(self.cell_index(position).value()),
        }
    }

    /// All positions of the grid in cell-index order.
    #[inline]
    pub fn positions(self) -> impl Iterator<Item = Position> {
        (0..self.cell_count()).map(move |i| self.position_of(CellIndex::new(i)))
    }
}

impl From<[usize; 3]> for Dims {
    #[inline]
    fn from(v: [usize; 3]) -> Self {
        Dims(v)
    }
}

impl Display for Dims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.0[0], self.0[1], self.0[2])
    }
}
