use async_trait::async_trait;
use booking_core::{
    PaymentStatus, Reservation, ReservationStatus, Unit, nights_between,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::types::*;

const RESERVATION_COLUMNS: &str = "id, unit_id, guest_name, guest_email, guest_phone, \
     check_in, check_out, nights, total_price, status, admin_notes, \
     payment_status, created_at, updated_at";

fn reservation_from_row(row: &PgRow) -> Reservation {
    let status: String = row.get("status");
    let payment_status: String = row.get("payment_status");

    Reservation {
        id: row.get("id"),
        unit_id: row.get("unit_id"),
        guest_name: row.get("guest_name"),
        guest_email: row.get("guest_email"),
        guest_phone: row.get("guest_phone"),
        check_in: row.get("check_in"),
        check_out: row.get("check_out"),
        nights: row.get("nights"),
        total_price: row.get("total_price"),
        status: ReservationStatus::parse(&status).unwrap_or(ReservationStatus::Pending),
        admin_notes: row.get("admin_notes"),
        payment_status: PaymentStatus::parse(&payment_status).unwrap_or(PaymentStatus::Unpaid),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Postgres-backed reservation store and unit catalog
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    /// Creates a store over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, StoreError> {
        let query = format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR unit_id = $2)
              AND (NOT $3 OR status <> 'cancelled')
            ORDER BY created_at DESC
            "#
        );

        let rows = sqlx::query(&query)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.unit_id.as_deref())
            .bind(filter.active_only)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(reservation_from_row).collect())
    }

    async fn get(&self, id: &Uuid) -> Result<Reservation, StoreError> {
        let query = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(reservation_from_row(&row)),
            None => Err(StoreError::NotFound),
        }
    }

    async fn create(&self, data: NewReservation) -> Result<Reservation, StoreError> {
        if data.check_out <= data.check_in {
            return Err(StoreError::InvalidDateRange);
        }

        // Re-validate availability atomically with the insert: the guard
        // subquery and the write are one statement, so a conflicting
        // reservation committed after the caller's validation makes this
        // insert no rows instead of double-booking the unit.
        let query = format!(
            r#"
            INSERT INTO reservations (
                id, unit_id, guest_name, guest_email, guest_phone,
                check_in, check_out, nights, total_price, status, payment_status
            )
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, 'confirmed', 'unpaid'
            WHERE NOT EXISTS (
                SELECT 1 FROM reservations
                WHERE unit_id = $2
                  AND status <> 'cancelled'
                  AND check_in < $7
                  AND $6 < check_out
            )
            RETURNING {RESERVATION_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&data.unit_id)
            .bind(&data.guest_name)
            .bind(&data.guest_email)
            .bind(&data.guest_phone)
            .bind(data.check_in)
            .bind(data.check_out)
            .bind(nights_between(data.check_in, data.check_out))
            .bind(data.total_price)
            .fetch_optional(&self.pool)
            .await;

        match row {
            Ok(Some(row)) => Ok(reservation_from_row(&row)),
            Ok(None) => Err(StoreError::Unavailable),
            // Two concurrent creates can both pass the guard subquery
            // under READ COMMITTED; the exclusion constraint rejects the
            // loser (SQLSTATE 23P01).
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23P01") => {
                Err(StoreError::Unavailable)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, id: &Uuid, patch: ReservationPatch) -> Result<Reservation, StoreError> {
        let query = format!(
            r#"
            UPDATE reservations
            SET status = COALESCE($2, status),
                admin_notes = COALESCE($3, admin_notes),
                payment_status = COALESCE($4, payment_status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {RESERVATION_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.admin_notes.as_deref())
            .bind(patch.payment_status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(reservation_from_row(&row)),
            None => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl UnitCatalog for PgReservationStore {
    async fn list_units(&self) -> Result<Vec<Unit>, StoreError> {
        let rows = sqlx::query("SELECT id, name, base_rate FROM units ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Unit {
                id: row.get("id"),
                name: row.get("name"),
                base_rate: row.get("base_rate"),
            })
            .collect())
    }

    async fn get_unit(&self, unit_id: &str) -> Result<Unit, StoreError> {
        let row = sqlx::query("SELECT id, name, base_rate FROM units WHERE id = $1")
            .bind(unit_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Unit {
                id: row.get("id"),
                name: row.get("name"),
                base_rate: row.get("base_rate"),
            }),
            None => Err(StoreError::UnknownUnit(unit_id.to_string())),
        }
    }

    async fn upsert_unit(&self, unit: &Unit) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO units (id, name, base_rate)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                base_rate = EXCLUDED.base_rate
            "#,
        )
        .bind(&unit.id)
        .bind(&unit.name)
        .bind(unit.base_rate)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Postgres-backed delivery log. The primary key on
/// `(reservation_id, kind)` turns the exists-then-append race between
/// concurrent sweeps into a hard uniqueness guarantee.
pub struct PgDeliveryLog {
    pool: PgPool,
}

impl PgDeliveryLog {
    /// Creates a log over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryLog for PgDeliveryLog {
    async fn exists(&self, reservation_id: &Uuid, kind: &str) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT 1 AS present FROM delivery_log WHERE reservation_id = $1 AND kind = $2",
        )
        .bind(reservation_id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn append(&self, record: DeliveryRecord) -> Result<AppendOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO delivery_log (reservation_id, kind, dispatched_at, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (reservation_id, kind) DO NOTHING
            "#,
        )
        .bind(record.reservation_id)
        .bind(&record.kind)
        .bind(record.dispatched_at)
        .bind(record.status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(AppendOutcome::Duplicate)
        } else {
            Ok(AppendOutcome::Recorded)
        }
    }
}
