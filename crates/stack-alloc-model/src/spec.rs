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

use crate::err::{GridSpecBuildError, SpanAlongStackingAxisError, TooManyCellsError, ZeroExtentError};
use stack_alloc_core::{axis::Axis, coord::Dims};
use std::fmt::Display;

/// Structural configuration of a grid.
///
/// Everything here is fixed for the lifetime of a grid: the extents, the
/// axis along which `Long` occupants span two cells, the optional axis along
/// which occupants stack on top of each other, and the set of axes whose
/// columns track an exclusivity state (footprint mixing is forbidden inside
/// a column of a synchronised axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSpec {
    dims: Dims,
    span_axis: Axis,
    stacking_axis: Option<Axis>,
    synced: [bool; 3],
}

impl GridSpec {
    pub fn new(
        dims: Dims,
        span_axis: Axis,
        stacking_axis: Option<Axis>,
        synced: [bool; 3],
    ) -> Result<Self, GridSpecBuildError> {
        if let Some(axis) = Axis::ALL.into_iter().find(|a| dims.extent(*a) == 0) {
            return Err(ZeroExtentError::new(axis).into());
        }
        if stacking_axis == Some(span_axis) {
            return Err(SpanAlongStackingAxisError::new(span_axis).into());
        }
        // Per-cell and per-column arrays use u32 counters.
        match dims.checked_cell_count() {
            Some(n) if n <= u32::MAX as usize => {}
            _ => return Err(TooManyCellsError::new(dims).into()),
        }
        Ok(Self {
            dims,
            span_axis,
            stacking_axis,
            synced,
        })
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    #[inline]
    pub fn span_axis(&self) -> Axis {
        self.span_axis
    }

    #[inline]
    pub fn stacking_axis(&self) -> Option<Axis> {
        self.stacking_axis
    }

    #[inline]
    pub fn is_synced(&self, axis: Axis) -> bool {
        self.synced[axis.index()]
    }

    #[inline]
    pub fn synced_axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.into_iter().filter(|a| self.is_synced(*a))
    }
}

impl Display for GridSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stacking = self
            .stacking_axis
            .map_or_else(|| "none".to_string(), |a| a.to_string());
        let synced: Vec<String> = self.synced_axes().map(|a| a.to_string()).collect();
        write!(
            f,
            "GridSpec {{ dims: {}, span: {}, stacking: {}, synced: [{}] }}",
            self.dims,
            self.span_axis,
            stacking,
            synced.join(", ")
        )
    }
}

/// Builder for `GridSpec`.
///
/// Defaults describe a container yard: boxes span along `x`, stack along `z`,
/// and both the `y` and `z` columns are synchronised.
#[derive(Debug, Clone)]
pub struct GridSpecBuilder {
    dims: Option<Dims>,
    span_axis: Axis,
    stacking_axis: Option<Axis>,
    synced: [bool; 3],
}

impl Default for GridSpecBuilder {
    fn default() -> Self {
        Self {
            dims: None,
            span_axis: Axis::X,
            stacking_axis: Some(Axis::Z),
            synced: [false, true, true],
        }
    }
}

impl GridSpecBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn dims(mut self, dims: Dims) -> Self {
        self.dims = Some(dims);
        self
    }

    #[inline]
    pub fn span_axis(mut self, axis: Axis) -> Self {
        self.span_axis = axis;
        self
    }

    #[inline]
    pub fn stacking_axis(mut self, axis: Axis) -> Self {
        self.stacking_axis = Some(axis);
        self
    }

    #[inline]
    pub fn no_stacking(mut self) -> Self {
        self.stacking_axis = None;
        self
    }

    #[inline]
    pub fn sync_axis(mut self, axis: Axis) -> Self {
        self.synced[axis.index()] = true;
        self
    }

    #[inline]
    pub fn unsync_axis(mut self, axis: Axis) -> Self {
        self.synced[axis.index()] = false;
        self
    }

    /// Replaces the synchronised set with exactly `axes`.
    pub fn synced_axes<I: IntoIterator<Item = Axis>>(mut self, axes: I) -> Self {
        self.synced = [false; 3];
        for a in axes {
            self.synced[a.index()] = true;
        }
        self
    }

    pub fn build(self) -> Result<GridSpec, GridSpecBuildError> {
        let dims = self.dims.ok_or(GridSpecBuildError::MissingDims)?;
        GridSpec::new(dims, self.span_axis, self.stacking_axis, self.synced)
    }
}
