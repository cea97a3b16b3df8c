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

use slotmap::new_key_type;
use stack_alloc_core::{TimeVariable, coord::Position, time::TimePoint};
use stack_alloc_model::{footprint::Footprint, id::OccupantId, state::OccupantState};

new_key_type! {
    /// Stable handle of an occupant record owned by a grid.
    pub struct OccupantKey;
}

/// The allocator's record of one box.
///
/// Records are owned by the grid's arena and addressed by [`OccupantKey`].
/// `link` points from a relocating occupant to its shadow and from a shadow
/// back to the occupant it stands in for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant<T: TimeVariable> {
    id: OccupantId,
    footprint: Footprint,
    state: OccupantState,
    reserved_at: Option<TimePoint<T>>,
    settled_at: Option<TimePoint<T>>,
    vacated_at: Option<TimePoint<T>>,
    position: Option<Position>,
    link: Option<OccupantKey>,
}

impl<T: TimeVariable> Occupant<T> {
    #[inline]
    pub fn new(id: OccupantId, footprint: Footprint) -> Self {
        Self {
            id,
            footprint,
            state: OccupantState::Initial,
            reserved_at: None,
            settled_at: None,
            vacated_at: None,
            position: None,
            link: None,
        }
    }

    /// A stand-in that holds `origin`'s cells while `origin` is moved.
    #[inline]
    pub(crate) fn shadow_of(origin: &Occupant<T>, origin_key: OccupantKey) -> Self {
        Self {
            state: OccupantState::Shadow,
            link: Some(origin_key),
            ..origin.clone()
        }
    }

    #[inline]
    pub fn id(&self) -> OccupantId {
        self.id
    }

    #[inline]
    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    #[inline]
    pub fn state(&self) -> OccupantState {
        self.state
    }

    #[inline]
    pub fn reserved_at(&self) -> Option<TimePoint<T>> {
        self.reserved_at
    }

    #[inline]
    pub fn settled_at(&self) -> Option<TimePoint<T>> {
        self.settled_at
    }

    #[inline]
    pub fn vacated_at(&self) -> Option<TimePoint<T>> {
        self.vacated_at
    }

    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    #[inline]
    pub fn link(&self) -> Option<OccupantKey> {
        self.link
    }

    #[inline]
    pub fn is_settled_like(&self) -> bool {
        self.state.is_settled_like()
    }

    #[inline]
    pub(crate) fn set_state(&mut self, state: OccupantState) {
        self.state = state;
    }

    #[inline]
    pub(crate) fn set_position(&mut self, position: Option<Position>) {
        self.position = position;
    }

    #[inline]
    pub(crate) fn set_link(&mut self, link: Option<OccupantKey>) {
        self.link = link;
    }

    #[inline]
    pub(crate) fn set_reserved_at(&mut self, time: Option<TimePoint<T>>) {
        self.reserved_at = time;
    }

    #[inline]
    pub(crate) fn set_settled_at(&mut self, time: Option<TimePoint<T>>) {
        self.settled_at = time;
    }

    #[inline]
    pub(crate) fn set_vacated_at(&mut self, time: Option<TimePoint<T>>) {
        self.vacated_at = time;
    }
}
