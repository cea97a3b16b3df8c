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

use super::columns::footprint_cells;
use crate::occupant::OccupantKey;
use stack_alloc_core::{
    axis::Axis,
    coord::{Dims, Position},
};
use stack_alloc_model::footprint::Footprint;
use tracing::trace;

/// Dense map from every cell of the grid to the occupant linked there.
#[derive(Debug, Clone)]
pub struct CellMap {
    dims: Dims,
    cells: Vec<Option<OccupantKey>>,
}

impl CellMap {
    pub fn new(dims: Dims) -> Self {
        Self {
            dims,
            cells: vec![None; dims.cell_count()],
        }
    }

    #[inline]
    pub fn get(&self, position: Position) -> Option<OccupantKey> {
        self.cells[self.dims.cell_index(position).value()]
    }

    #[inline]
    fn set(&mut self, position: Position, key: Option<OccupantKey>) {
        let idx = self.dims.cell_index(position).value();
        self.cells[idx] = key;
    }

    /// Points every cell of the footprint at `key`. No validation.
    pub fn link(&mut self, key: OccupantKey, position: Position, footprint: Footprint, span: Axis) {
        trace!(?key, %position, %footprint, "link");
        for (cell, _) in footprint_cells(position, footprint, span) {
            self.set(cell, Some(key));
        }
    }

    /// Clears every cell of the footprint. No validation.
    pub fn unlink(&mut self, position: Position, footprint: Footprint, span: Axis) {
        trace!(%position, %footprint, "unlink");
        for (cell, _) in footprint_cells(position, footprint, span) {
            self.set(cell, None);
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Position, Option<OccupantKey>)> + '_ {
        self.dims.positions().zip(self.cells.iter().copied())
    }
}
