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

use crate::grid::columns::{Counter, ExclusivityState};
use crate::occupant::OccupantKey;
use stack_alloc_core::{
    axis::Axis,
    coord::{ColumnIndex, Position, Target},
};
use stack_alloc_model::{footprint::Footprint, id::OccupantId, state::OccupantState};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutOfBoundsError {
    position: Position,
    footprint: Footprint,
}

impl OutOfBoundsError {
    #[inline]
    pub fn new(position: Position, footprint: Footprint) -> Self {
        Self {
            position,
            footprint,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn footprint(&self) -> Footprint {
        self.footprint
    }
}

impl Display for OutOfBoundsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} occupant at {} does not fit inside the grid",
            self.footprint, self.position
        )
    }
}

impl std::error::Error for OutOfBoundsError {}

/// Why an in-bounds placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// A synchronised column along `axis` is reserved for another footprint.
    Exclusivity { axis: Axis, state: ExclusivityState },
    /// A cell of the footprint is already linked to an occupant.
    CellTaken { position: Position },
    /// An explicit stacking component does not match the stack height.
    NotOnTop { expected: usize },
    /// The two cells of a `Long` occupant sit on stacks of different height.
    Unsupported { head: usize, tail: usize },
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::Exclusivity { axis, state } => {
                write!(f, "column along {} is {}", axis, state)
            }
            RejectionReason::CellTaken { position } => write!(f, "cell {} is taken", position),
            RejectionReason::NotOnTop { expected } => {
                write!(f, "stack top is at height {}", expected)
            }
            RejectionReason::Unsupported { head, tail } => {
                write!(f, "head stack height {} differs from tail stack height {}", head, tail)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RejectedPlacementError {
    position: Position,
    footprint: Footprint,
    reason: RejectionReason,
}

impl RejectedPlacementError {
    #[inline]
    pub fn new(position: Position, footprint: Footprint, reason: RejectionReason) -> Self {
        Self {
            position,
            footprint,
            reason,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    #[inline]
    pub fn reason(&self) -> RejectionReason {
        self.reason
    }
}

impl Display for RejectedPlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} occupant rejected at {}: {}",
            self.footprint, self.position, self.reason
        )
    }
}

impl std::error::Error for RejectedPlacementError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnresolvedCoordinateError {
    target: Target,
}

impl UnresolvedCoordinateError {
    #[inline]
    pub fn new(target: Target) -> Self {
        Self { target }
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.target
    }
}

impl Display for UnresolvedCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Target {} cannot be fully resolved", self.target)
    }
}

impl std::error::Error for UnresolvedCoordinateError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidStateTransitionError {
    id: OccupantId,
    state: OccupantState,
    operation: &'static str,
}

impl InvalidStateTransitionError {
    #[inline]
    pub fn new(id: OccupantId, state: OccupantState, operation: &'static str) -> Self {
        Self {
            id,
            state,
            operation,
        }
    }

    #[inline]
    pub fn id(&self) -> OccupantId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> OccupantState {
        self.state
    }

    #[inline]
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl Display for InvalidStateTransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} cannot {} while {}",
            self.id, self.operation, self.state
        )
    }
}

impl std::error::Error for InvalidStateTransitionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownFootprintError {
    lower: OccupantId,
    upper: OccupantId,
    axis: Axis,
}

impl UnknownFootprintError {
    #[inline]
    pub fn new(lower: OccupantId, upper: OccupantId, axis: Axis) -> Self {
        Self { lower, upper, axis }
    }

    #[inline]
    pub fn lower(&self) -> OccupantId {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> OccupantId {
        self.upper
    }

    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }
}

impl Display for UnknownFootprintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} and {} cannot exchange places along {}",
            self.lower, self.upper, self.axis
        )
    }
}

impl std::error::Error for UnknownFootprintError {}

/// What exactly went wrong when the bookkeeping stopped adding up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    CountOutOfRange {
        axis: Axis,
        column: ColumnIndex,
        counter: Counter,
        value: i64,
    },
    CountMismatch {
        axis: Axis,
        column: ColumnIndex,
        counter: Counter,
        expected: u32,
        actual: u32,
    },
    SettledExceedsReserved {
        axis: Axis,
        column: ColumnIndex,
    },
    ExclusivityMismatch {
        axis: Axis,
        column: ColumnIndex,
        state: ExclusivityState,
    },
    BrokenLinkage {
        position: Position,
    },
    StackGap {
        position: Position,
    },
    RestsOnUnsettled {
        position: Position,
    },
}

impl Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultKind::CountOutOfRange {
                axis,
                column,
                counter,
                value,
            } => write!(
                f,
                "{} count of {} along {} left its range: {}",
                counter, column, axis, value
            ),
            FaultKind::CountMismatch {
                axis,
                column,
                counter,
                expected,
                actual,
            } => write!(
                f,
                "{} count of {} along {} is {} but the cells say {}",
                counter, column, axis, actual, expected
            ),
            FaultKind::SettledExceedsReserved { axis, column } => write!(
                f,
                "settled count of {} along {} exceeds its reserved count",
                column, axis
            ),
            FaultKind::ExclusivityMismatch {
                axis,
                column,
                state,
            } => write!(
                f,
                "{} along {} is {} against its reserved count",
                column, axis, state
            ),
            FaultKind::BrokenLinkage { position } => {
                write!(f, "cell {} disagrees with its occupant", position)
            }
            FaultKind::StackGap { position } => {
                write!(f, "cell {} breaks the run of linked cells in its stack", position)
            }
            FaultKind::RestsOnUnsettled { position } => {
                write!(f, "settled cell {} rests on an unsettled occupant", position)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsistencyFaultError {
    kind: FaultKind,
}

impl ConsistencyFaultError {
    #[inline]
    pub fn new(kind: FaultKind) -> Self {
        Self { kind }
    }

    #[inline]
    pub fn kind(&self) -> FaultKind {
        self.kind
    }
}

impl Display for ConsistencyFaultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grid bookkeeping is inconsistent: {}", self.kind)
    }
}

impl std::error::Error for ConsistencyFaultError {}

impl From<FaultKind> for ConsistencyFaultError {
    fn from(kind: FaultKind) -> Self {
        Self::new(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownOccupantError {
    key: OccupantKey,
}

impl UnknownOccupantError {
    #[inline]
    pub fn new(key: OccupantKey) -> Self {
        Self { key }
    }

    #[inline]
    pub fn key(&self) -> OccupantKey {
        self.key
    }
}

impl Display for UnknownOccupantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "No occupant is registered under {:?}", self.key)
    }
}

impl std::error::Error for UnknownOccupantError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuriedError {
    id: OccupantId,
    above: OccupantId,
}

impl BuriedError {
    #[inline]
    pub fn new(id: OccupantId, above: OccupantId) -> Self {
        Self { id, above }
    }

    #[inline]
    pub fn id(&self) -> OccupantId {
        self.id
    }

    #[inline]
    pub fn above(&self) -> OccupantId {
        self.above
    }
}

impl Display for BuriedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is buried under settled {}", self.id, self.above)
    }
}

impl std::error::Error for BuriedError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocError {
    OutOfBounds(OutOfBoundsError),
    RejectedPlacement(RejectedPlacementError),
    UnresolvedCoordinate(UnresolvedCoordinateError),
    NoStackingAxis,
    InvalidStateTransition(InvalidStateTransitionError),
    UnknownFootprint(UnknownFootprintError),
    ConsistencyFault(ConsistencyFaultError),
    UnknownOccupant(UnknownOccupantError),
    Buried(BuriedError),
}

impl AllocError {
    /// Everything except a consistency fault leaves the grid untouched and
    /// usable.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AllocError::ConsistencyFault(_))
    }
}

impl Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use AllocError::*;
        match self {
            OutOfBounds(e) => write!(f, "{}", e),
            RejectedPlacement(e) => write!(f, "{}", e),
            UnresolvedCoordinate(e) => write!(f, "{}", e),
            NoStackingAxis => write!(f, "Grid has no stacking axis"),
            InvalidStateTransition(e) => write!(f, "{}", e),
            UnknownFootprint(e) => write!(f, "{}", e),
            ConsistencyFault(e) => write!(f, "{}", e),
            UnknownOccupant(e) => write!(f, "{}", e),
            Buried(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AllocError {}

impl From<OutOfBoundsError> for AllocError {
    fn from(e: OutOfBoundsError) -> Self {
        AllocError::OutOfBounds(e)
    }
}

impl From<RejectedPlacementError> for AllocError {
    fn from(e: RejectedPlacementError) -> Self {
        AllocError::RejectedPlacement(e)
    }
}

impl From<UnresolvedCoordinateError> for AllocError {
    fn from(e: UnresolvedCoordinateError) -> Self {
        AllocError::UnresolvedCoordinate(e)
    }
}

impl From<InvalidStateTransitionError> for AllocError {
    fn from(e: InvalidStateTransitionError) -> Self {
        AllocError::InvalidStateTransition(e)
    }
}

impl From<UnknownFootprintError> for AllocError {
    fn from(e: UnknownFootprintError) -> Self {
        AllocError::UnknownFootprint(e)
    }
}

impl From<ConsistencyFaultError> for AllocError {
    fn from(e: ConsistencyFaultError) -> Self {
        AllocError::ConsistencyFault(e)
    }
}

impl From<UnknownOccupantError> for AllocError {
    fn from(e: UnknownOccupantError) -> Self {
        AllocError::UnknownOccupant(e)
    }
}

impl From<BuriedError> for AllocError {
    fn from(e: BuriedError) -> Self {
        AllocError::Buried(e)
    }
}
