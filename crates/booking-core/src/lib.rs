//! # Booking Core
//!
//! Pure domain logic for the Innkeeper reservation backend: reservation
//! types, the occupied-interval availability index, the interactive
//! date-range selection state machine, and the pricing engine. Nothing in
//! this crate performs I/O.

/// Reservation, unit and interval types shared across the workspace
mod types;
pub use types::*;

/// Occupied-interval index derived from active reservations
mod availability;
pub use availability::*;

/// Check-in/check-out selection state machine
mod selector;
pub use selector::*;

/// Nightly-rate pricing with ordered adjustment rules
mod pricing;
pub use pricing::*;
