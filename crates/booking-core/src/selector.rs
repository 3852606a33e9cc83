use chrono::NaiveDate;

use crate::availability::AvailabilityIndex;

/// Current position in the check-in/check-out selection flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing selected yet
    Empty,
    /// Check-in picked, waiting for a check-out
    CheckInOnly(NaiveDate),
    /// A validated range; its interior never contains a blocked night
    RangeComplete {
        /// Selected check-in date
        check_in: NaiveDate,
        /// Selected check-out date, strictly after check-in
        check_out: NaiveDate,
    },
}

/// Pure state machine driving interactive date-range selection for one
/// unit. Consumes clicked dates and consults the availability index to
/// reject invalid picks; presentation code only reads the resulting state.
///
/// The machine never emits `RangeComplete` with a blocked night strictly
/// inside its bounds. Callers rely on that to hand the range straight to
/// the pricing engine.
#[derive(Debug)]
pub struct DateRangeSelector<'a> {
    index: &'a AvailabilityIndex,
    unit_id: &'a str,
    today: NaiveDate,
    state: SelectionState,
}

impl<'a> DateRangeSelector<'a> {
    /// Creates a selector in the `Empty` state
    pub fn new(index: &'a AvailabilityIndex, unit_id: &'a str, today: NaiveDate) -> Self {
        Self {
            index,
            unit_id,
            today,
            state: SelectionState::Empty,
        }
    }

    /// Current state
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Whether a date is unselectable: in the past or on an occupied night
    pub fn is_blocked(&self, date: NaiveDate) -> bool {
        self.index.is_date_blocked(self.unit_id, date, self.today)
    }

    /// Feeds a clicked date through the state machine and returns the new
    /// state.
    pub fn click(&mut self, date: NaiveDate) -> SelectionState {
        self.state = match self.state {
            SelectionState::Empty => {
                if self.is_blocked(date) {
                    SelectionState::Empty
                } else {
                    SelectionState::CheckInOnly(date)
                }
            }
            SelectionState::CheckInOnly(check_in) => self.extend(check_in, date),
            SelectionState::RangeComplete { .. } => {
                // Any further click discards the prior range.
                if self.is_blocked(date) {
                    SelectionState::Empty
                } else {
                    SelectionState::CheckInOnly(date)
                }
            }
        };
        self.state
    }

    /// Transition out of `CheckInOnly`: either complete the range or treat
    /// the click as a fresh check-in.
    fn extend(&self, check_in: NaiveDate, date: NaiveDate) -> SelectionState {
        if date <= check_in {
            return if self.is_blocked(date) {
                SelectionState::CheckInOnly(check_in)
            } else {
                SelectionState::CheckInOnly(date)
            };
        }

        // The clicked date is the exclusive check-out, so it may land on
        // another stay's first occupied night; only the nights in between
        // have to be free.
        if !self.index.has_conflict(self.unit_id, check_in, date) {
            return SelectionState::RangeComplete {
                check_in,
                check_out: date,
            };
        }

        // The range would span an occupied interval: restart from the
        // clicked date if it is selectable, otherwise keep the pending
        // check-in.
        if self.is_blocked(date) {
            SelectionState::CheckInOnly(check_in)
        } else {
            SelectionState::CheckInOnly(date)
        }
    }
}
