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

//! # Stack Allocation Core (`stack-alloc-core`)
//!
//! Foundational, allocation-agnostic primitives shared by the model and the
//! engine crates: the three grid axes, resolved and partially resolved grid
//! coordinates, grid extents with the index arithmetic that maps coordinates
//! onto dense cell, column and stack arrays, and opaque time points.

use num_traits::{PrimInt, Signed, Zero};
use std::fmt::{Debug, Display};

pub mod axis;
pub mod coord;
pub mod time;

pub trait TimeVariable: PrimInt + Signed + Zero + Send + Sync + Debug + Display {}
impl<T> TimeVariable for T where T: PrimInt + Signed + Zero + Send + Sync + Debug + Display {}
