//! # Notification Services
//!
//! Guest notifications dispatched at fixed day offsets relative to a
//! reservation's check-in or check-out date, at most once per
//! `(reservation, kind)` pair. The scheduler sweep is idempotent through
//! the delivery log alone; any periodic trigger around it is only a rate
//! limiter.

/// Notification kinds, trigger rules, envelopes and errors
mod types;
pub use types::*;

/// Pure message rendering
mod templates;
pub use templates::*;

/// Email transport trait and implementations
mod transport;
pub use transport::*;

/// The sweep over due-and-undelivered notifications
mod scheduler;
pub use scheduler::*;
