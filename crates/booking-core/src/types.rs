use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a reservation. Cancellation is a status change,
/// never a row deletion, so historical intervals stay inspectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Created but not yet confirmed by staff
    Pending,
    /// Confirmed booking, blocks availability
    Confirmed,
    /// Guest has checked in
    Arrived,
    /// Guest has checked out
    CheckedOut,
    /// Cancelled; excluded from the availability index
    Cancelled,
}

impl ReservationStatus {
    /// Stable string form used in the database and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Arrived => "arrived",
            ReservationStatus::CheckedOut => "checked_out",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Parses the stable string form back into a status
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReservationStatus::Pending),
            "confirmed" => Some(ReservationStatus::Confirmed),
            "arrived" => Some(ReservationStatus::Arrived),
            "checked_out" => Some(ReservationStatus::CheckedOut),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether the reservation occupies its date range
    pub fn is_active(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }
}

/// Payment state tracked by staff alongside the reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No payment received
    Unpaid,
    /// Deposit received
    Deposit,
    /// Paid in full
    Paid,
    /// Refunded after cancellation
    Refunded,
}

impl PaymentStatus {
    /// Stable string form used in the database and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Deposit => "deposit",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Parses the stable string form back into a payment status
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unpaid" => Some(PaymentStatus::Unpaid),
            "deposit" => Some(PaymentStatus::Deposit),
            "paid" => Some(PaymentStatus::Paid),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// A bookable lodging unit with its nightly base rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unit identifier (stable, human-assigned)
    pub id: String,
    /// Display name
    pub name: String,
    /// Nightly base rate
    pub base_rate: f64,
}

/// A lodging reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier
    pub id: Uuid,
    /// Unit being occupied
    pub unit_id: String,
    /// Guest full name
    pub guest_name: String,
    /// Guest contact email
    pub guest_email: String,
    /// Guest contact phone, optional
    pub guest_phone: Option<String>,
    /// Check-in date
    pub check_in: NaiveDate,
    /// Check-out date, strictly after check-in
    pub check_out: NaiveDate,
    /// Whole-day difference between check-out and check-in, always >= 1
    pub nights: i64,
    /// Total quoted price at booking time
    pub total_price: f64,
    /// Lifecycle status
    pub status: ReservationStatus,
    /// Free-form staff notes
    pub admin_notes: Option<String>,
    /// Payment state
    pub payment_status: PaymentStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Occupied interval for an active reservation; `None` once cancelled
    pub fn booked_interval(&self) -> Option<BookedInterval> {
        if self.status.is_active() {
            Some(BookedInterval {
                unit_id: self.unit_id.clone(),
                start: self.check_in,
                end: self.check_out,
            })
        } else {
            None
        }
    }
}

/// Half-open occupied date range `[start, end)` projected from an active
/// reservation. The check-out date itself is free for a new check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    /// Unit the interval belongs to
    pub unit_id: String,
    /// First occupied night
    pub start: NaiveDate,
    /// Check-out date, exclusive
    pub end: NaiveDate,
}

impl BookedInterval {
    /// Half-open intersection test: `[s, e)` and `[start, end)` intersect
    /// iff `start < e && s < end`. Adjacent intervals do not intersect.
    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start < self.end && self.start < end
    }

    /// Whether `date` falls on an occupied night of this interval
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Whole-day difference between two dates
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Errors raised by the pure domain logic
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Check-out on or before check-in, rejected at the boundary
    #[error("Invalid date range: check-out date must be after check-in date")]
    InvalidDateRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Arrived,
            ReservationStatus::CheckedOut,
            ReservationStatus::Cancelled,
        ] {
            assert_eq!(ReservationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReservationStatus::parse("bogus"), None);
    }

    #[test]
    fn only_cancelled_is_inactive() {
        assert!(ReservationStatus::Confirmed.is_active());
        assert!(ReservationStatus::CheckedOut.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
    }

    #[test]
    fn adjacent_intervals_do_not_intersect() {
        let interval = BookedInterval {
            unit_id: "U1".to_string(),
            start: date(2024, 6, 10),
            end: date(2024, 6, 13),
        };

        // Checkout day is bookable as the next check-in.
        assert!(!interval.intersects(date(2024, 6, 13), date(2024, 6, 15)));
        assert!(!interval.intersects(date(2024, 6, 8), date(2024, 6, 10)));
        assert!(interval.intersects(date(2024, 6, 12), date(2024, 6, 15)));
        assert!(interval.intersects(date(2024, 6, 9), date(2024, 6, 11)));
    }

    #[test]
    fn contains_is_half_open() {
        let interval = BookedInterval {
            unit_id: "U1".to_string(),
            start: date(2024, 6, 10),
            end: date(2024, 6, 13),
        };

        assert!(interval.contains(date(2024, 6, 10)));
        assert!(interval.contains(date(2024, 6, 12)));
        assert!(!interval.contains(date(2024, 6, 13)));
        assert!(!interval.contains(date(2024, 6, 9)));
    }

    #[test]
    fn nights_is_whole_day_difference() {
        assert_eq!(nights_between(date(2024, 6, 10), date(2024, 6, 13)), 3);
        assert_eq!(nights_between(date(2024, 6, 10), date(2024, 6, 11)), 1);
    }
}
