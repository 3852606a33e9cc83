//! # Web Handlers
//!
//! HTTP request/response types and actix-web handlers for the Innkeeper
//! reservation API: availability and quote lookups, reservation CRUD with
//! commit-time re-validation, and the administrative scheduler triggers.

/// Request/response types and the API error mapping
mod api_types;
pub use api_types::*;

/// Shared application state injected into handlers
mod state;
pub use state::*;

/// Availability, quote and reservation handlers
mod handlers;
pub use handlers::*;

/// Administrative scheduler handlers
mod admin_handlers;
pub use admin_handlers::*;
