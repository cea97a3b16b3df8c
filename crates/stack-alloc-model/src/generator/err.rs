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

use stack_alloc_core::TimeVariable;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidLongRatioError {
    ratio: f64,
}

impl InvalidLongRatioError {
    #[inline]
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

impl Display for InvalidLongRatioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Long ratio {} is not within [0, 1]", self.ratio)
    }
}

impl std::error::Error for InvalidLongRatioError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRangeError<T: TimeVariable> {
    name: &'static str,
    min: T,
    max: T,
}

impl<T: TimeVariable> InvalidRangeError<T> {
    #[inline]
    pub fn new(name: &'static str, min: T, max: T) -> Self {
        Self { name, min, max }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn min(&self) -> T {
        self.min
    }

    #[inline]
    pub fn max(&self) -> T {
        self.max
    }
}

impl<T: TimeVariable> Display for InvalidRangeError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Range {} = [{}, {}] is empty or starts below its lower bound",
            self.name, self.min, self.max
        )
    }
}

impl<T: TimeVariable> std::error::Error for InvalidRangeError<T> {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkloadConfigBuildError<T: TimeVariable> {
    MissingArrivals,
    InvalidLongRatio(InvalidLongRatioError),
    InvalidRange(InvalidRangeError<T>),
}

impl<T: TimeVariable> Display for WorkloadConfigBuildError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use WorkloadConfigBuildError::*;
        match self {
            MissingArrivals => write!(f, "Missing arrivals"),
            InvalidLongRatio(e) => write!(f, "{}", e),
            InvalidRange(e) => write!(f, "{}", e),
        }
    }
}

impl<T: TimeVariable> std::error::Error for WorkloadConfigBuildError<T> {}

impl<T: TimeVariable> From<InvalidLongRatioError> for WorkloadConfigBuildError<T> {
    fn from(err: InvalidLongRatioError) -> Self {
        Self::InvalidLongRatio(err)
    }
}

impl<T: TimeVariable> From<InvalidRangeError<T>> for WorkloadConfigBuildError<T> {
    fn from(err: InvalidRangeError<T>) -> Self {
        Self::InvalidRange(err)
    }
}
