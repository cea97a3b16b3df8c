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

use stack_alloc_core::axis::Axis;
use std::fmt::Display;

/// How many cells an occupant covers.
///
/// A `Long` occupant covers its head cell and the next cell along the span
/// axis (the tail). Along every other axis both footprints are one cell wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Footprint {
    Short,
    Long,
}

impl Footprint {
    #[inline]
    pub const fn is_long(self) -> bool {
        matches!(self, Footprint::Long)
    }

    /// Number of cells covered along `axis` on a grid whose span axis is
    /// `span_axis`.
    #[inline]
    pub fn extent_along(self, axis: Axis, span_axis: Axis) -> usize {
        match self {
            Footprint::Long if axis == span_axis => 2,
            _ => 1,
        }
    }

    /// Number of cells covered in total.
    #[inline]
    pub const fn cell_count(self) -> usize {
        match self {
            Footprint::Short => 1,
            Footprint::Long => 2,
        }
    }
}

impl Display for Footprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Footprint::Short => write!(f, "Short"),
            Footprint::Long => write!(f, "Long"),
        }
    }
}
