use std::sync::Arc;
use std::time::Duration;

use booking_core::Reservation;
use chrono::{NaiveDate, Utc};
use reservation_store::{
    AppendOutcome, DeliveryLog, DeliveryRecord, DeliveryStatus, ReservationFilter,
    ReservationStore,
};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::templates;
use crate::transport::EmailTransport;
use crate::types::*;

/// Scheduler tuning knobs
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Upper bound on a single transport send; a timeout counts as a
    /// dispatch failure, not a sweep abort (default: 10 seconds)
    pub send_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(10),
        }
    }
}

/// Sweeps active reservations against the trigger rules and dispatches
/// each due-and-undelivered notification exactly once per
/// `(reservation, kind)` pair under sequential sweeps. The delivery log is
/// the sole idempotency mechanism; callers may invoke the sweep as often
/// as they like.
pub struct NotificationScheduler {
    store: Arc<dyn ReservationStore>,
    delivery_log: Arc<dyn DeliveryLog>,
    transport: Arc<dyn EmailTransport>,
    brand: BrandConfig,
    rules: Vec<NotificationRule>,
    config: SchedulerConfig,
}

impl NotificationScheduler {
    /// Creates a scheduler with the standard rule set
    pub fn new(
        store: Arc<dyn ReservationStore>,
        delivery_log: Arc<dyn DeliveryLog>,
        transport: Arc<dyn EmailTransport>,
        brand: BrandConfig,
        config: Option<SchedulerConfig>,
    ) -> Self {
        Self {
            store,
            delivery_log,
            transport,
            brand,
            rules: NotificationRule::standard_set(),
            config: config.unwrap_or_default(),
        }
    }

    /// Replaces the rule set; rules are matched in the given order
    pub fn with_rules(mut self, rules: Vec<NotificationRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Runs one sweep over all non-cancelled reservations. Failures for a
    /// single reservation are caught, counted and logged; they never stop
    /// the rest of the sweep.
    pub async fn run_sweep(&self, today: NaiveDate) -> SweepSummary {
        info!("Starting notification sweep for {}", today);

        let reservations = match self.store.list(&ReservationFilter::active()).await {
            Ok(reservations) => reservations,
            Err(e) => {
                error!("Failed to load reservations for sweep: {}", e);
                return SweepSummary { sent: 0, errors: 1 };
            }
        };

        let mut summary = SweepSummary::default();

        for reservation in &reservations {
            for rule in &self.rules {
                if !rule.is_due(reservation, today) {
                    continue;
                }

                match self.dispatch_due(reservation, rule.kind).await {
                    Ok(true) => summary.sent += 1,
                    Ok(false) => {}
                    Err(e) => {
                        error!(
                            "Failed to dispatch {} for reservation {}: {}",
                            rule.kind.as_str(),
                            reservation.id,
                            e
                        );
                        summary.errors += 1;
                    }
                }
            }
        }

        info!(
            "Notification sweep finished: {} sent, {} errors",
            summary.sent, summary.errors
        );
        summary
    }

    /// Sends one notification if the delivery log has no record for it.
    /// Returns `Ok(true)` only when this call dispatched and recorded the
    /// notification.
    async fn dispatch_due(
        &self,
        reservation: &Reservation,
        kind: NotificationKind,
    ) -> Result<bool, NotificationError> {
        // A lookup failure suppresses dispatch for this sweep: the
        // notification is retried next sweep, while a duplicate send could
        // never be recalled.
        if self
            .delivery_log
            .exists(&reservation.id, kind.as_str())
            .await?
        {
            debug!(
                "{} already delivered for reservation {}",
                kind.as_str(),
                reservation.id
            );
            return Ok(false);
        }

        self.dispatch(reservation, kind).await?;

        let outcome = self
            .delivery_log
            .append(DeliveryRecord {
                reservation_id: reservation.id,
                kind: kind.as_str().to_string(),
                dispatched_at: Utc::now(),
                status: DeliveryStatus::Sent,
            })
            .await?;

        match outcome {
            AppendOutcome::Recorded => {
                info!(
                    "Sent {} notification for reservation {}",
                    kind.as_str(),
                    reservation.id
                );
                Ok(true)
            }
            AppendOutcome::Duplicate => {
                warn!(
                    "Concurrent sweep already recorded {} for reservation {}",
                    kind.as_str(),
                    reservation.id
                );
                Ok(false)
            }
        }
    }

    /// Renders and hands one message to the transport, bounded by the send
    /// timeout.
    async fn dispatch(
        &self,
        reservation: &Reservation,
        kind: NotificationKind,
    ) -> Result<DispatchResult, NotificationError> {
        let message = templates::render(kind, reservation, &self.brand);
        let envelope = Envelope {
            to: reservation.guest_email.clone(),
            subject: message.subject,
            html: message.html,
            text: message.text,
            metadata: serde_json::json!({
                "reservation_id": reservation.id,
                "kind": kind.as_str(),
            }),
        };

        match timeout(self.config.send_timeout, self.transport.send(&envelope)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::Timeout),
        }
    }

    /// Sends a test notification for a reservation, bypassing rule
    /// matching and the delivery log entirely. Explicitly outside the
    /// idempotency contract.
    pub async fn send_test(
        &self,
        reservation_id: &Uuid,
        kind: NotificationKind,
    ) -> Result<DispatchResult, NotificationError> {
        let reservation = self.store.get(reservation_id).await?;
        info!(
            "Sending test {} notification for reservation {}",
            kind.as_str(),
            reservation_id
        );
        self.dispatch(&reservation, kind).await
    }
}
