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

/// Lifecycle of an occupant.
///
/// `Initial -> Reserved -> Settled -> Vacating -> Vacated` is the ordinary
/// path. `Relocating` marks a settled occupant that is being moved while a
/// `Shadow` copy holds its old cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccupantState {
    Initial,
    Reserved,
    Settled,
    Vacating,
    Vacated,
    Relocating,
    Shadow,
}

impl OccupantState {
    /// Whether an occupant in this state physically sits in its cells and
    /// is therefore counted as settled.
    #[inline]
    pub const fn is_settled_like(self) -> bool {
        matches!(self, OccupantState::Settled | OccupantState::Shadow)
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            OccupantState::Initial => "initial",
            OccupantState::Reserved => "reserved",
            OccupantState::Settled => "settled",
            OccupantState::Vacating => "vacating",
            OccupantState::Vacated => "vacated",
            OccupantState::Relocating => "relocating",
            OccupantState::Shadow => "shadow",
        }
    }
}

impl Display for OccupantState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
