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

use stack_alloc_core::{axis::Axis, coord::Dims};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZeroExtentError {
    axis: Axis,
}

impl ZeroExtentError {
    #[inline]
    pub fn new(axis: Axis) -> Self {
        Self { axis }
    }

    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }
}

impl Display for ZeroExtentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grid extent along axis {} must be at least 1", self.axis)
    }
}

impl std::error::Error for ZeroExtentError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanAlongStackingAxisError {
    axis: Axis,
}

impl SpanAlongStackingAxisError {
    #[inline]
    pub fn new(axis: Axis) -> Self {
        Self { axis }
    }

    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }
}

impl Display for SpanAlongStackingAxisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Span axis {} cannot also be the stacking axis",
            self.axis
        )
    }
}

impl std::error::Error for SpanAlongStackingAxisError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TooManyCellsError {
    dims: Dims,
}

impl TooManyCellsError {
    #[inline]
    pub fn new(dims: Dims) -> Self {
        Self { dims }
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }
}

impl Display for TooManyCellsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grid of {} cells does not fit in memory", self.dims)
    }
}

impl std::error::Error for TooManyCellsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridSpecBuildError {
    MissingDims,
    ZeroExtent(ZeroExtentError),
    SpanAlongStackingAxis(SpanAlongStackingAxisError),
    TooManyCells(TooManyCellsError),
}

impl Display for GridSpecBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use GridSpecBuildError::*;
        match self {
            MissingDims => write!(f, "Missing dims"),
            ZeroExtent(e) => write!(f, "{}", e),
            SpanAlongStackingAxis(e) => write!(f, "{}", e),
            TooManyCells(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GridSpecBuildError {}

impl From<ZeroExtentError> for GridSpecBuildError {
    fn from(err: ZeroExtentError) -> Self {
        Self::ZeroExtent(err)
    }
}

impl From<SpanAlongStackingAxisError> for GridSpecBuildError {
    fn from(err: SpanAlongStackingAxisError) -> Self {
        Self::SpanAlongStackingAxis(err)
    }
}

impl From<TooManyCellsError> for GridSpecBuildError {
    fn from(err: TooManyCellsError) -> Self {
        Self::TooManyCells(err)
    }
}
