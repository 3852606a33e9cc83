use async_trait::async_trait;
use booking_core::{BookingError, PaymentStatus, Reservation, ReservationStatus, Unit};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Custom error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row not found
    #[error("Reservation not found")]
    NotFound,

    /// Unknown unit reference
    #[error("Unit not found: {0}")]
    UnknownUnit(String),

    /// Commit-time availability conflict; the caller should prompt
    /// re-selection
    #[error("Requested dates are no longer available")]
    Unavailable,

    /// Invalid date range
    #[error("Invalid date range: check-out date must be after check-in date")]
    InvalidDateRange,
}

impl From<BookingError> for StoreError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidDateRange => StoreError::InvalidDateRange,
        }
    }
}

/// Input for creating a reservation. `nights`, timestamps and the id are
/// derived by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    /// Unit to occupy
    pub unit_id: String,
    /// Guest full name
    pub guest_name: String,
    /// Guest contact email
    pub guest_email: String,
    /// Guest contact phone, optional
    pub guest_phone: Option<String>,
    /// Check-in date
    pub check_in: NaiveDate,
    /// Check-out date
    pub check_out: NaiveDate,
    /// Quoted total at booking time
    pub total_price: f64,
}

/// Staff-editable fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationPatch {
    /// New lifecycle status
    pub status: Option<ReservationStatus>,
    /// New staff notes
    pub admin_notes: Option<String>,
    /// New payment state
    pub payment_status: Option<PaymentStatus>,
}

/// Listing filter; empty filter returns everything
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    /// Restrict to a single status
    pub status: Option<ReservationStatus>,
    /// Restrict to a single unit
    pub unit_id: Option<String>,
    /// Exclude cancelled reservations
    pub active_only: bool,
}

impl ReservationFilter {
    /// All non-cancelled reservations, any unit
    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }
}

/// Owned repository for the shared reservation state. All mutation goes
/// through these three operations; the availability index is a derived
/// view, never a second source of truth.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Lists reservations matching the filter, newest first
    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, StoreError>;

    /// Fetches one reservation
    async fn get(&self, id: &Uuid) -> Result<Reservation, StoreError>;

    /// Creates a reservation, re-validating availability atomically with
    /// the write. Returns `Unavailable` when a conflicting reservation
    /// committed between the caller's validation and this call.
    async fn create(&self, data: NewReservation) -> Result<Reservation, StoreError>;

    /// Applies a staff patch and returns the updated reservation
    async fn update(&self, id: &Uuid, patch: ReservationPatch) -> Result<Reservation, StoreError>;
}

/// Read access to the unit catalog
#[async_trait]
pub trait UnitCatalog: Send + Sync {
    /// All units
    async fn list_units(&self) -> Result<Vec<Unit>, StoreError>;

    /// One unit by id
    async fn get_unit(&self, unit_id: &str) -> Result<Unit, StoreError>;

    /// Inserts or updates a unit (seeding and admin edits)
    async fn upsert_unit(&self, unit: &Unit) -> Result<(), StoreError>;
}

/// Delivery state recorded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Handed to the transport successfully
    Sent,
}

impl DeliveryStatus {
    /// Stable string form used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
        }
    }
}

/// One dispatched notification. At most one record exists per
/// `(reservation_id, kind)` pair; that uniqueness is the scheduler's
/// idempotency guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Reservation the notification belongs to
    pub reservation_id: Uuid,
    /// Notification kind, stable string form
    pub kind: String,
    /// When the dispatch succeeded
    pub dispatched_at: DateTime<Utc>,
    /// Delivery state
    pub status: DeliveryStatus,
}

/// Result of a conditional append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The record was written
    Recorded,
    /// A record for this `(reservation, kind)` already existed
    Duplicate,
}

/// Append-only record of dispatched notifications, queried by equality on
/// `(reservation_id, kind)`. Write-once per key; no update or delete.
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    /// Whether a record exists for the pair
    async fn exists(&self, reservation_id: &Uuid, kind: &str) -> Result<bool, StoreError>;

    /// Conditionally appends; reports `Duplicate` when the key is taken
    async fn append(&self, record: DeliveryRecord) -> Result<AppendOutcome, StoreError>;
}
