use booking_core::Reservation;
use chrono::NaiveDate;
use reservation_store::StoreError;
use serde::{Deserialize, Serialize};

/// The fixed set of guest notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Sent two days before check-in
    PreArrival,
    /// Sent on the morning of check-in
    CheckInDay,
    /// Sent the day before check-out
    CheckoutReminder,
    /// Follow-up two days after check-out
    PostStay,
}

impl NotificationKind {
    /// Stable string form used as the delivery-log key
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::PreArrival => "pre_arrival",
            NotificationKind::CheckInDay => "check_in_day",
            NotificationKind::CheckoutReminder => "checkout_reminder",
            NotificationKind::PostStay => "post_stay",
        }
    }

    /// Parses the stable string form back into a kind
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pre_arrival" => Some(NotificationKind::PreArrival),
            "check_in_day" => Some(NotificationKind::CheckInDay),
            "checkout_reminder" => Some(NotificationKind::CheckoutReminder),
            "post_stay" => Some(NotificationKind::PostStay),
            _ => None,
        }
    }
}

/// Which reservation date a rule's offset is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceDate {
    /// Offset relative to check-in
    CheckIn,
    /// Offset relative to check-out
    CheckOut,
}

impl ReferenceDate {
    /// The concrete date for a reservation
    pub fn date(&self, reservation: &Reservation) -> NaiveDate {
        match self {
            ReferenceDate::CheckIn => reservation.check_in,
            ReferenceDate::CheckOut => reservation.check_out,
        }
    }
}

/// A trigger rule: a notification kind becomes due on the day where
/// `today - reference_date == offset_days`. Negative offsets fire before
/// the reference date, positive ones after.
#[derive(Debug, Clone, Copy)]
pub struct NotificationRule {
    /// Kind this rule dispatches
    pub kind: NotificationKind,
    /// Date the offset is measured from
    pub reference: ReferenceDate,
    /// Signed whole-day offset
    pub offset_days: i64,
}

impl NotificationRule {
    /// The production rule set
    pub fn standard_set() -> Vec<NotificationRule> {
        vec![
            NotificationRule {
                kind: NotificationKind::PreArrival,
                reference: ReferenceDate::CheckIn,
                offset_days: -2,
            },
            NotificationRule {
                kind: NotificationKind::CheckInDay,
                reference: ReferenceDate::CheckIn,
                offset_days: 0,
            },
            NotificationRule {
                kind: NotificationKind::CheckoutReminder,
                reference: ReferenceDate::CheckOut,
                offset_days: -1,
            },
            NotificationRule {
                kind: NotificationKind::PostStay,
                reference: ReferenceDate::CheckOut,
                offset_days: 2,
            },
        ]
    }

    /// Whether the rule is due for a reservation on the given day.
    /// `today` is a calendar date, so "normalized to midnight" by
    /// construction.
    pub fn is_due(&self, reservation: &Reservation, today: NaiveDate) -> bool {
        let day_delta = (today - self.reference.date(reservation)).num_days();
        day_delta == self.offset_days
    }
}

/// Property branding consumed by the templates
#[derive(Debug, Clone)]
pub struct BrandConfig {
    /// Property display name
    pub property_name: String,
    /// Sender address
    pub from_email: String,
    /// Public website, linked in messages
    pub website_url: String,
}

impl BrandConfig {
    /// Loads branding from the environment with development defaults
    pub fn from_env() -> Self {
        Self {
            property_name: std::env::var("PROPERTY_NAME")
                .unwrap_or_else(|_| "Innkeeper Guesthouse".to_string()),
            from_email: std::env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "stay@innkeeper.example".to_string()),
            website_url: std::env::var("WEBSITE_URL")
                .unwrap_or_else(|_| "https://innkeeper.example".to_string()),
        }
    }
}

/// A rendered message, ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
    /// Plain-text body
    pub text: String,
}

/// What the transport actually delivers
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
    /// Plain-text body
    pub text: String,
    /// Reservation/kind metadata for the transport's own records
    pub metadata: serde_json::Value,
}

/// Transport acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    /// Provider-assigned message id
    pub message_id: String,
}

/// Outcome summary of one scheduler sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Notifications dispatched and recorded
    pub sent: u32,
    /// Per-reservation failures caught during the sweep
    pub errors: u32,
}

/// Custom error type for notification operations
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Store or delivery-log error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Transport rejected the envelope
    #[error("Transport error: {0}")]
    Transport(String),

    /// Transport did not answer within the send timeout
    #[error("Transport timed out")]
    Timeout,
}
