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
use crate::err::{AllocError, BuriedError, UnknownOccupantError};
use crate::occupant::{Occupant, OccupantKey};
use stack_alloc_core::{
    TimeVariable,
    coord::{Position, Target},
    time::TimePoint,
};
use stack_alloc_model::state::OccupantState;
use tracing::{debug, instrument};

impl<T: TimeVariable> Grid<T> {
    /// Reserves the cells at `target` for an `Initial` occupant.
    ///
    /// An unresolved stacking component lands the occupant on top of its
    /// stack. Returns the resolved position.
    #[instrument(level = "debug", skip(self), err(Display))]
    pub fn reserve(
        &mut self,
        key: OccupantKey,
        target: Target,
        time: TimePoint<T>,
    ) -> Result<Position, AllocError> {
        self.ensure_healthy()?;
        let footprint = self
            .expect_state(key, OccupantState::Initial, "reserve")?
            .footprint();
        let position = self.admit(target, footprint)?;
        self.place(key, position)?;
        let occupant = self.record_mut(key)?;
        occupant.set_reserved_at(Some(time));
        occupant.set_state(OccupantState::Reserved);
        debug!(%position, "reserved");
        Ok(position)
    }

    /// Marks a reserved occupant as physically present.
    ///
    /// On stacking grids the occupant first sinks below every reserved but
    /// not yet settled occupant beneath it. Fails with `UnknownFootprint`,
    /// leaving the grid untouched, when what lies beneath cannot be passed.
    /// Returns the final position.
    #[instrument(level = "debug", skip(self), err(Display))]
    pub fn settle(&mut self, key: OccupantKey, time: TimePoint<T>) -> Result<Position, AllocError> {
        self.ensure_healthy()?;
        self.expect_state(key, OccupantState::Reserved, "settle")?;
        self.sink_if_stacking(key)?;
        let (position, footprint) = self.placed(key)?;
        self.adjust_at(position, footprint, 1, Counter::Settled)?;
        let occupant = self.record_mut(key)?;
        occupant.set_settled_at(Some(time));
        occupant.set_state(OccupantState::Settled);
        debug!(%position, "settled");
        Ok(position)
    }

    /// Starts removing a settled occupant.
    ///
    /// Fails with `Buried` while any settled occupant sits above it. On
    /// stacking grids the occupant first floats above every reserved
    /// occupant stacked on it; if they cannot all be passed the grid is left
    /// untouched and `UnknownFootprint` returned. Returns the position it
    /// left.
    #[instrument(level = "debug", skip(self), err(Display))]
    pub fn begin_vacate(
        &mut self,
        key: OccupantKey,
        time: TimePoint<T>,
    ) -> Result<Position, AllocError> {
        self.ensure_healthy()?;
        let id = self
            .expect_state(key, OccupantState::Settled, "begin_vacate")?
            .id();
        if let Some(above) = self.settled_above(key)? {
            return Err(BuriedError::new(id, self.record(above)?.id()).into());
        }
        self.lift_if_stacking(key)?;
        let position = self.displace(key)?;
        let occupant = self.record_mut(key)?;
        occupant.set_vacated_at(Some(time));
        occupant.set_state(OccupantState::Vacating);
        debug!(%position, "vacating");
        Ok(position)
    }

    /// Finishes a removal and hands the record back to the driver.
    #[instrument(level = "debug", skip(self), err(Display))]
    pub fn complete_vacate(&mut self, key: OccupantKey) -> Result<Occupant<T>, AllocError> {
        self.ensure_healthy()?;
        self.expect_state(key, OccupantState::Vacating, "complete_vacate")?;
        let mut occupant = self
            .occupants
            .remove(key)
            .ok_or(UnknownOccupantError::new(key))?;
        occupant.set_state(OccupantState::Vacated);
        Ok(occupant)
    }

    /// [`Grid::begin_vacate`] followed by [`Grid::complete_vacate`].
    pub fn vacate(
        &mut self,
        key: OccupantKey,
        time: TimePoint<T>,
    ) -> Result<Occupant<T>, AllocError> {
        self.begin_vacate(key, time)?;
        self.complete_vacate(key)
    }

    /// Undoes a reservation that has not been settled yet.
    #[instrument(level = "debug", skip(self), err(Display))]
    pub fn cancel_reserve(&mut self, key: OccupantKey) -> Result<(), AllocError> {
        self.ensure_healthy()?;
        self.expect_state(key, OccupantState::Reserved, "cancel_reserve")?;
        self.release_reservation(key)?;
        let occupant = self.record_mut(key)?;
        occupant.set_reserved_at(None);
        occupant.set_settled_at(None);
        occupant.set_state(OccupantState::Initial);
        Ok(())
    }

    /// Floats a reserved occupant to the top of its stack and takes it out.
    /// Leaves the grid untouched on failure.
    pub(super) fn release_reservation(&mut self, key: OccupantKey) -> Result<Position, AllocError> {
        self.lift_if_stacking(key)?;
        self.displace(key)
    }
}
