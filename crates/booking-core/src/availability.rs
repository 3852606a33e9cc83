use std::collections::HashMap;

use chrono::NaiveDate;

use crate::types::{BookedInterval, BookingError, Reservation};

/// Per-unit index of occupied date intervals, derived from the current
/// reservation set. Cancelled reservations are excluded entirely. The index
/// is a read-only view; it is rebuilt from the reservation set on demand so
/// queries always reflect the latest committed reservations the caller
/// loaded.
#[derive(Debug, Default, Clone)]
pub struct AvailabilityIndex {
    intervals: HashMap<String, Vec<BookedInterval>>,
}

impl AvailabilityIndex {
    /// Builds the index from a reservation slice, keeping only active
    /// reservations and sorting each unit's intervals by start date.
    pub fn from_reservations(reservations: &[Reservation]) -> Self {
        let mut intervals: HashMap<String, Vec<BookedInterval>> = HashMap::new();

        for reservation in reservations {
            if let Some(interval) = reservation.booked_interval() {
                intervals
                    .entry(interval.unit_id.clone())
                    .or_default()
                    .push(interval);
            }
        }

        for unit_intervals in intervals.values_mut() {
            unit_intervals.sort_by_key(|i| i.start);
        }

        Self { intervals }
    }

    /// True iff no occupied interval for `unit_id` intersects the half-open
    /// range `[start, end)`. Adjacency is free: a checkout day is bookable
    /// as the next check-in. Rejects `end <= start` instead of answering.
    pub fn is_range_free(
        &self,
        unit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, BookingError> {
        if end <= start {
            return Err(BookingError::InvalidDateRange);
        }

        Ok(!self.has_conflict(unit_id, start, end))
    }

    /// Raw overlap test for a range already known to be well-formed
    pub(crate) fn has_conflict(&self, unit_id: &str, start: NaiveDate, end: NaiveDate) -> bool {
        self.intervals_for(unit_id)
            .iter()
            .any(|interval| interval.intersects(start, end))
    }

    /// A date is blocked for selection if it lies strictly before `today`
    /// or on an occupied night of any interval for the unit.
    pub fn is_date_blocked(&self, unit_id: &str, date: NaiveDate, today: NaiveDate) -> bool {
        if date < today {
            return true;
        }

        self.intervals_for(unit_id)
            .iter()
            .any(|interval| interval.contains(date))
    }

    /// Occupied intervals for a unit, sorted by start date. Used by the
    /// calendar endpoint to paint unavailable nights.
    pub fn intervals_for(&self, unit_id: &str) -> &[BookedInterval] {
        self.intervals.get(unit_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::types::{PaymentStatus, ReservationStatus, nights_between};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reservation(
        unit_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        status: ReservationStatus,
    ) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            unit_id: unit_id.to_string(),
            guest_name: "Alex Guest".to_string(),
            guest_email: "alex@example.com".to_string(),
            guest_phone: None,
            check_in,
            check_out,
            nights: nights_between(check_in, check_out),
            total_price: 0.0,
            status,
            admin_notes: None,
            payment_status: PaymentStatus::Unpaid,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn adjacency_is_bookable() {
        let reservations = vec![reservation(
            "U1",
            date(2024, 6, 10),
            date(2024, 6, 13),
            ReservationStatus::Confirmed,
        )];
        let index = AvailabilityIndex::from_reservations(&reservations);

        assert!(
            index
                .is_range_free("U1", date(2024, 6, 13), date(2024, 6, 15))
                .unwrap()
        );
        assert!(
            !index
                .is_range_free("U1", date(2024, 6, 12), date(2024, 6, 15))
                .unwrap()
        );
    }

    #[test]
    fn cancelled_reservations_are_excluded() {
        let reservations = vec![reservation(
            "U1",
            date(2024, 6, 10),
            date(2024, 6, 13),
            ReservationStatus::Cancelled,
        )];
        let index = AvailabilityIndex::from_reservations(&reservations);

        assert!(
            index
                .is_range_free("U1", date(2024, 6, 10), date(2024, 6, 13))
                .unwrap()
        );
        assert!(index.intervals_for("U1").is_empty());
    }

    #[test]
    fn units_are_independent() {
        let reservations = vec![reservation(
            "U1",
            date(2024, 6, 10),
            date(2024, 6, 13),
            ReservationStatus::Confirmed,
        )];
        let index = AvailabilityIndex::from_reservations(&reservations);

        assert!(
            index
                .is_range_free("U2", date(2024, 6, 10), date(2024, 6, 13))
                .unwrap()
        );
    }

    #[test]
    fn degenerate_range_is_rejected() {
        let index = AvailabilityIndex::from_reservations(&[]);

        assert!(matches!(
            index.is_range_free("U1", date(2024, 6, 13), date(2024, 6, 13)),
            Err(BookingError::InvalidDateRange)
        ));
        assert!(matches!(
            index.is_range_free("U1", date(2024, 6, 14), date(2024, 6, 13)),
            Err(BookingError::InvalidDateRange)
        ));
    }

    #[test]
    fn blocked_dates_cover_past_and_occupied_nights() {
        let reservations = vec![reservation(
            "U1",
            date(2024, 6, 10),
            date(2024, 6, 13),
            ReservationStatus::Confirmed,
        )];
        let index = AvailabilityIndex::from_reservations(&reservations);
        let today = date(2024, 6, 1);

        assert!(index.is_date_blocked("U1", date(2024, 5, 31), today));
        assert!(index.is_date_blocked("U1", date(2024, 6, 10), today));
        assert!(index.is_date_blocked("U1", date(2024, 6, 12), today));
        // Checkout date itself is selectable.
        assert!(!index.is_date_blocked("U1", date(2024, 6, 13), today));
        assert!(!index.is_date_blocked("U1", date(2024, 6, 9), today));
    }

    #[test]
    fn intervals_are_sorted_by_start() {
        let reservations = vec![
            reservation(
                "U1",
                date(2024, 7, 1),
                date(2024, 7, 4),
                ReservationStatus::Confirmed,
            ),
            reservation(
                "U1",
                date(2024, 6, 10),
                date(2024, 6, 13),
                ReservationStatus::Arrived,
            ),
        ];
        let index = AvailabilityIndex::from_reservations(&reservations);
        let intervals = index.intervals_for("U1");

        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start, date(2024, 6, 10));
        assert_eq!(intervals[1].start, date(2024, 7, 1));
    }
}
