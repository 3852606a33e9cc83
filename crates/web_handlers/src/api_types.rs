use booking_core::{BookedInterval, BookingError, PaymentStatus, Quote, ReservationStatus};
use chrono::NaiveDate;
use notification_services::NotificationError;
use reservation_store::StoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Query parameters for the availability lookup
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Candidate check-in date
    pub start: NaiveDate,
    /// Candidate check-out date
    pub end: NaiveDate,
}

/// Availability answer for one unit and range
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Unit queried
    pub unit_id: String,
    /// Candidate check-in date
    pub start: NaiveDate,
    /// Candidate check-out date
    pub end: NaiveDate,
    /// Whether `[start, end)` is free of occupied nights
    pub available: bool,
    /// Occupied intervals for calendar rendering
    pub booked: Vec<BookedInterval>,
}

/// Request body for a price quote
#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    /// Unit to price
    #[validate(length(min = 1, message = "Unit ID is required"))]
    pub unit_id: String,
    /// Candidate check-in date
    pub check_in: NaiveDate,
    /// Candidate check-out date
    pub check_out: NaiveDate,
}

/// Request body for creating a reservation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    /// Unit to book
    #[validate(length(min = 1, message = "Unit ID is required"))]
    pub unit_id: String,
    /// Guest full name
    #[validate(length(min = 1, message = "Guest name is required"))]
    pub guest_name: String,
    /// Guest contact email
    #[validate(email(message = "A valid guest email is required"))]
    pub guest_email: String,
    /// Guest contact phone, optional
    pub guest_phone: Option<String>,
    /// Check-in date
    pub check_in: NaiveDate,
    /// Check-out date
    pub check_out: NaiveDate,
}

/// Response for a created reservation: the stored row plus the quote it
/// was priced with
#[derive(Debug, Serialize)]
pub struct CreateReservationResponse {
    /// The committed reservation
    pub reservation: booking_core::Reservation,
    /// Price breakdown used for `total_price`
    pub quote: Quote,
}

/// Query parameters for listing reservations
#[derive(Debug, Default, Deserialize)]
pub struct ListReservationsQuery {
    /// Restrict to one status
    pub status: Option<ReservationStatus>,
    /// Restrict to one unit
    pub unit_id: Option<String>,
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct ListReservationsResponse {
    /// Matching reservations, newest first
    pub reservations: Vec<booking_core::Reservation>,
    /// Total count
    pub total: i64,
}

/// Request body for the staff reservation patch
#[derive(Debug, Deserialize)]
pub struct UpdateReservationRequest {
    /// New lifecycle status
    pub status: Option<ReservationStatus>,
    /// New staff notes
    pub admin_notes: Option<String>,
    /// New payment state
    pub payment_status: Option<PaymentStatus>,
}

/// Request body for creating or updating a unit
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertUnitRequest {
    /// Display name
    #[validate(length(min = 1, message = "Unit name is required"))]
    pub name: String,
    /// Nightly base rate
    #[validate(range(min = 0.0, message = "Base rate must not be negative"))]
    pub base_rate: f64,
}

/// Request body for the test-notification action
#[derive(Debug, Deserialize)]
pub struct TestNotificationRequest {
    /// Reservation to render the message from
    pub reservation_id: Uuid,
    /// Notification kind, stable string form
    pub kind: String,
}

/// Custom error type for API operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request payload failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid date range
    #[error("Invalid date range: check-out date must be after check-in date")]
    InvalidDateRange,

    /// Requested dates are taken
    #[error("Requested dates are not available")]
    Unavailable,

    /// Storage error
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Notification error
    #[error("Notification error: {0}")]
    Notification(NotificationError),

    /// Unknown notification kind on the test surface
    #[error("Unknown notification kind: {0}")]
    UnknownKind(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidDateRange => ApiError::InvalidDateRange,
            StoreError::Unavailable => ApiError::Unavailable,
            other => ApiError::Store(other),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidDateRange => ApiError::InvalidDateRange,
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Store(store_err) => ApiError::from(store_err),
            other => ApiError::Notification(other),
        }
    }
}

impl actix_web::ResponseError for ApiError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            ApiError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            ApiError::InvalidDateRange => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "error": "invalid_date_range",
                    "message": "Check-out date must be after check-in date"
                }))
            }
            ApiError::Unavailable => HttpResponse::Conflict().json(serde_json::json!({
                "error": "unavailable",
                "message": "The requested dates are no longer available. Please pick a new range."
            })),
            ApiError::Store(StoreError::NotFound) => {
                HttpResponse::NotFound().json(serde_json::json!({
                    "error": "reservation_not_found",
                    "message": "Reservation not found"
                }))
            }
            ApiError::Store(StoreError::UnknownUnit(unit_id)) => {
                HttpResponse::NotFound().json(serde_json::json!({
                    "error": "unit_not_found",
                    "message": format!("Unit not found: {}", unit_id)
                }))
            }
            ApiError::UnknownKind(kind) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "unknown_notification_kind",
                "message": format!("Unknown notification kind: {}", kind)
            })),
            ApiError::Notification(err) => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "dispatch_failed",
                "message": format!("Notification dispatch failed: {}", err)
            })),
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}
