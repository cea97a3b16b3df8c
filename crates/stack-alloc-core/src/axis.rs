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

use std::fmt::Display;

/// One of the three axes of a storage grid.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// For every axis, the two remaining axes in ascending order.
const OTHER_AXES: [[Axis; 2]; 3] = [
    [Axis::Y, Axis::Z],
    [Axis::X, Axis::Z],
    [Axis::X, Axis::Y],
];

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn from_index(index: usize) -> Option<Axis> {
        match index {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }

    /// Maps the raw `-1`-means-none convention onto an optional axis.
    #[inline]
    pub fn from_signed(index: i64) -> Option<Axis> {
        usize::try_from(index).ok().and_then(Axis::from_index)
    }

    /// The two axes orthogonal to `self`, lower index first.
    #[inline]
    pub const fn others(self) -> [Axis; 2] {
        OTHER_AXES[self.index()]
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidAxisError(usize);

impl InvalidAxisError {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for InvalidAxisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Axis index {} is not one of 0, 1, 2", self.0)
    }
}

impl std::error::Error for InvalidAxisError {}

impl TryFrom<usize> for Axis {
    type Error = InvalidAxisError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Axis::from_index(value).ok_or(InvalidAxisError::new(value))
    }
}

impl From<Axis> for usize {
    fn from(axis: Axis) -> Self {
        axis.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trips_for_all_axes() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()), Some(axis));
        }
        assert_eq!(Axis::from_index(3), None);
    }

    #[test]
    fn test_others_excludes_self_and_is_sorted() {
        for axis in Axis::ALL {
            let [a, b] = axis.others();
            assert_ne!(a, axis);
            assert_ne!(b, axis);
            assert!(a < b);
        }
    }

    #[test]
    fn test_from_signed_maps_negative_to_none() {
        assert_eq!(Axis::from_signed(-1), None);
        assert_eq!(Axis::from_signed(2), Some(Axis::Z));
        assert_eq!(Axis::from_signed(7), None);
    }

    #[test]
    fn test_try_from_reports_bad_index() {
        let err = Axis::try_from(5usize).unwrap_err();
        assert_eq!(err.index(), 5);
        assert_eq!(Axis::try_from(1usize).unwrap(), Axis::Y);
    }
}
