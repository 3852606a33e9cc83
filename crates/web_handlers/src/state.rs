use std::sync::Arc;

use booking_core::PricingEngine;
use notification_services::NotificationScheduler;
use reservation_store::{ReservationStore, UnitCatalog};

/// Shared application state handed to every handler. Storage is injected
/// through the trait seams so the same handlers run against Postgres in
/// production and the in-memory store in tests.
pub struct AppState {
    /// Reservation repository
    pub store: Arc<dyn ReservationStore>,
    /// Unit catalog
    pub units: Arc<dyn UnitCatalog>,
    /// Pricing engine with the production rule order
    pub pricing: Arc<PricingEngine>,
    /// Notification scheduler
    pub scheduler: Arc<NotificationScheduler>,
}
