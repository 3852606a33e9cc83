//! # Reservation Store
//!
//! Storage for reservations, units and the notification delivery log.
//! Defines the trait seams the rest of the workspace depends on, a
//! Postgres implementation backed by sqlx, and an in-memory implementation
//! for development and tests.
//!
//! The two writes with correctness obligations both live here: reservation
//! creation re-validates availability atomically with the insert, and
//! delivery-log appends are conditional on `(reservation, kind)`
//! uniqueness.

/// Store traits, patch/filter types and errors
mod types;
pub use types::*;

/// In-memory store for development and tests
mod memory;
pub use memory::*;

/// Postgres-backed store
mod postgres;
pub use postgres::*;

use sqlx::{PgPool, Row};

/// Creates a connection pool to the PostgreSQL database.
pub async fn create_connection_pool() -> Result<PgPool, sqlx::Error> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/innkeeper".to_string());

    PgPool::connect(&database_url).await
}

/// Tests the database connection by executing a simple query.
pub async fn test_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    let row = sqlx::query("SELECT 1 as test").fetch_one(pool).await?;

    let test_value: i32 = row.get("test");
    tracing::info!("Database connection successful, test value: {}", test_value);

    Ok(())
}
