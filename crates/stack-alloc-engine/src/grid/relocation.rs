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

use super::{Grid, columns::Counter};
use crate::err::{AllocError, BuriedError, InvalidStateTransitionError};
use crate::occupant::{Occupant, OccupantKey};
use stack_alloc_core::{
    TimeVariable,
    coord::{Position, Target},
};
use stack_alloc_model::state::OccupantState;
use tracing::{debug, instrument};

impl<T: TimeVariable> Grid<T> {
    /// Detaches a settled occupant from its cells so it can be moved.
    ///
    /// A shadow record takes over the old cells and their counts, so the old
    /// position keeps reading as occupied until the move completes. With a
    /// `target` the occupant is reserved there right away; if that fails the
    /// relocation is rolled back and the error returned.
    #[instrument(level = "debug", skip(self), err(Display))]
    pub fn begin_relocation(
        &mut self,
        key: OccupantKey,
        target: Option<Target>,
    ) -> Result<Option<Position>, AllocError> {
        self.ensure_healthy()?;
        let origin = self.expect_state(key, OccupantState::Settled, "begin_relocation")?;
        let shadow = Occupant::shadow_of(origin, key);
        let (position, footprint) = self.placed(key)?;
        let shadow_key = self.occupants.insert(shadow);
        self.cells
            .link(shadow_key, position, footprint, self.spec.span_axis());
        let occupant = self.record_mut(key)?;
        occupant.set_position(None);
        occupant.set_link(Some(shadow_key));
        occupant.set_state(OccupantState::Relocating);
        debug!(%position, "shadow in place");

        let Some(target) = target else {
            return Ok(None);
        };
        match self.relocation_reserve(key, target) {
            Ok(p) => Ok(Some(p)),
            Err(e) => {
                if e.is_recoverable() {
                    self.abort_relocation(key)?;
                }
                Err(e)
            }
        }
    }

    /// Reserves the new cells of a relocating occupant.
    #[instrument(level = "debug", skip(self), err(Display))]
    pub fn relocation_reserve(
        &mut self,
        key: OccupantKey,
        target: Target,
    ) -> Result<Position, AllocError> {
        self.ensure_healthy()?;
        let occupant = self.expect_state(key, OccupantState::Relocating, "relocation_reserve")?;
        if occupant.position().is_some() {
            return Err(InvalidStateTransitionError::new(
                occupant.id(),
                occupant.state(),
                "reserve twice",
            )
            .into());
        }
        let position = self.admit(target, occupant.footprint())?;
        self.place(key, position)?;
        debug!(%position, "relocation reserved");
        Ok(position)
    }

    /// Retires the shadow and settles the occupant at its new cells. If
    /// either side cannot be rebalanced the grid is left untouched.
    #[instrument(level = "debug", skip(self), err(Display))]
    pub fn complete_relocation(&mut self, key: OccupantKey) -> Result<Position, AllocError> {
        self.ensure_healthy()?;
        let shadow_key = self.relocating_shadow(key)?;
        self.placed(key)?;
        if let Some(above) = self.settled_above(shadow_key)? {
            let id = self.record(key)?.id();
            return Err(BuriedError::new(id, self.record(above)?.id()).into());
        }

        let journal = self.lift_if_stacking(shadow_key)?;
        let top = self.displace(shadow_key)?;
        if let Err(e) = self.sink_if_stacking(key) {
            self.restore(shadow_key, top)?;
            self.undo(journal)?;
            return Err(e);
        }
        self.occupants.remove(shadow_key);
        let (position, footprint) = self.placed(key)?;
        self.adjust_at(position, footprint, 1, Counter::Settled)?;
        let occupant = self.record_mut(key)?;
        occupant.set_link(None);
        occupant.set_state(OccupantState::Settled);
        debug!(from = %top, to = %position, "relocated");
        Ok(position)
    }

    /// Drops any new reservation and hands the shadow's cells back to the
    /// occupant. Returns the position it is back at.
    #[instrument(level = "debug", skip(self), err(Display))]
    pub fn abort_relocation(&mut self, key: OccupantKey) -> Result<Position, AllocError> {
        self.ensure_healthy()?;
        let shadow_key = self.relocating_shadow(key)?;
        if self.record(key)?.position().is_some() {
            self.release_reservation(key)?;
        }
        let (position, footprint) = self.placed(shadow_key)?;
        self.cells
            .link(key, position, footprint, self.spec.span_axis());
        self.occupants.remove(shadow_key);
        let occupant = self.record_mut(key)?;
        occupant.set_position(Some(position));
        occupant.set_link(None);
        occupant.set_state(OccupantState::Settled);
        debug!(%position, "relocation aborted");
        Ok(position)
    }

    fn relocating_shadow(&self, key: OccupantKey) -> Result<OccupantKey, AllocError> {
        let occupant = self.expect_state(key, OccupantState::Relocating, "finish relocation")?;
        occupant.link().ok_or_else(|| {
            InvalidStateTransitionError::new(occupant.id(), occupant.state(), "lose its shadow")
                .into()
        })
    }
}
