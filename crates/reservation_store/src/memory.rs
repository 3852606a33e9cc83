use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use booking_core::{
    AvailabilityIndex, PaymentStatus, Reservation, ReservationStatus, Unit, nights_between,
};
use chrono::Utc;
use uuid::Uuid;

use crate::types::*;

#[derive(Debug, Default)]
struct MemoryState {
    units: HashMap<String, Unit>,
    reservations: HashMap<Uuid, Reservation>,
}

/// In-memory reservation store and unit catalog for development and
/// tests. All operations take one lock, which makes the read-then-write in
/// `create` atomic the same way the conditional insert does in Postgres.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given units
    pub fn with_units(units: Vec<Unit>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock().unwrap();
            for unit in units {
                state.units.insert(unit.id.clone(), unit);
            }
        }
        store
    }

    fn matches(filter: &ReservationFilter, reservation: &Reservation) -> bool {
        if let Some(status) = filter.status {
            if reservation.status != status {
                return false;
            }
        }
        if let Some(ref unit_id) = filter.unit_id {
            if &reservation.unit_id != unit_id {
                return false;
            }
        }
        if filter.active_only && !reservation.status.is_active() {
            return false;
        }
        true
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut reservations: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| Self::matches(filter, r))
            .cloned()
            .collect();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }

    async fn get(&self, id: &Uuid) -> Result<Reservation, StoreError> {
        let state = self.state.lock().unwrap();
        state
            .reservations
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, data: NewReservation) -> Result<Reservation, StoreError> {
        if data.check_out <= data.check_in {
            return Err(StoreError::InvalidDateRange);
        }

        let mut state = self.state.lock().unwrap();

        if !state.units.contains_key(&data.unit_id) {
            return Err(StoreError::UnknownUnit(data.unit_id));
        }

        // Commit-time re-validation, under the same lock as the insert.
        let existing: Vec<Reservation> = state.reservations.values().cloned().collect();
        let index = AvailabilityIndex::from_reservations(&existing);
        if !index.is_range_free(&data.unit_id, data.check_in, data.check_out)? {
            return Err(StoreError::Unavailable);
        }

        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            unit_id: data.unit_id,
            guest_name: data.guest_name,
            guest_email: data.guest_email,
            guest_phone: data.guest_phone,
            check_in: data.check_in,
            check_out: data.check_out,
            nights: nights_between(data.check_in, data.check_out),
            total_price: data.total_price,
            status: ReservationStatus::Confirmed,
            admin_notes: None,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        };

        state
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn update(&self, id: &Uuid, patch: ReservationPatch) -> Result<Reservation, StoreError> {
        let mut state = self.state.lock().unwrap();
        let reservation = state.reservations.get_mut(id).ok_or(StoreError::NotFound)?;

        if let Some(status) = patch.status {
            reservation.status = status;
        }
        if let Some(notes) = patch.admin_notes {
            reservation.admin_notes = Some(notes);
        }
        if let Some(payment_status) = patch.payment_status {
            reservation.payment_status = payment_status;
        }
        reservation.updated_at = Utc::now();

        Ok(reservation.clone())
    }
}

#[async_trait]
impl UnitCatalog for InMemoryStore {
    async fn list_units(&self) -> Result<Vec<Unit>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut units: Vec<Unit> = state.units.values().cloned().collect();
        units.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(units)
    }

    async fn get_unit(&self, unit_id: &str) -> Result<Unit, StoreError> {
        let state = self.state.lock().unwrap();
        state
            .units
            .get(unit_id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownUnit(unit_id.to_string()))
    }

    async fn upsert_unit(&self, unit: &Unit) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.units.insert(unit.id.clone(), unit.clone());
        Ok(())
    }
}

/// In-memory delivery log for development and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeliveryLog {
    records: Arc<Mutex<HashMap<(Uuid, String), DeliveryRecord>>>,
}

impl InMemoryDeliveryLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records, for assertions in tests
    pub fn records(&self) -> Vec<DeliveryRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl DeliveryLog for InMemoryDeliveryLog {
    async fn exists(&self, reservation_id: &Uuid, kind: &str) -> Result<bool, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.contains_key(&(*reservation_id, kind.to_string())))
    }

    async fn append(&self, record: DeliveryRecord) -> Result<AppendOutcome, StoreError> {
        let mut records = self.records.lock().unwrap();
        let key = (record.reservation_id, record.kind.clone());
        if records.contains_key(&key) {
            return Ok(AppendOutcome::Duplicate);
        }
        records.insert(key, record);
        Ok(AppendOutcome::Recorded)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded_store() -> InMemoryStore {
        InMemoryStore::with_units(vec![Unit {
            id: "U1".to_string(),
            name: "Garden Room".to_string(),
            base_rate: 450.0,
        }])
    }

    fn new_reservation(check_in: NaiveDate, check_out: NaiveDate) -> NewReservation {
        NewReservation {
            unit_id: "U1".to_string(),
            guest_name: "Alex Guest".to_string(),
            guest_email: "alex@example.com".to_string(),
            guest_phone: None,
            check_in,
            check_out,
            total_price: 1350.0,
        }
    }

    #[tokio::test]
    async fn create_derives_nights_and_defaults() {
        let store = seeded_store();
        let reservation = store
            .create(new_reservation(date(2024, 6, 10), date(2024, 6, 13)))
            .await
            .unwrap();

        assert_eq!(reservation.nights, 3);
        assert_eq!(reservation.status, ReservationStatus::Confirmed);
        assert_eq!(reservation.payment_status, PaymentStatus::Unpaid);
    }

    #[tokio::test]
    async fn overlapping_create_is_rejected() {
        let store = seeded_store();
        store
            .create(new_reservation(date(2024, 6, 10), date(2024, 6, 13)))
            .await
            .unwrap();

        let err = store
            .create(new_reservation(date(2024, 6, 12), date(2024, 6, 15)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable));

        // Adjacent stay commits fine.
        store
            .create(new_reservation(date(2024, 6, 13), date(2024, 6, 15)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_reservation_frees_the_range() {
        let store = seeded_store();
        let reservation = store
            .create(new_reservation(date(2024, 6, 10), date(2024, 6, 13)))
            .await
            .unwrap();

        store
            .update(
                &reservation.id,
                ReservationPatch {
                    status: Some(ReservationStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        store
            .create(new_reservation(date(2024, 6, 10), date(2024, 6, 13)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn invalid_range_and_unknown_unit_are_rejected() {
        let store = seeded_store();

        let err = store
            .create(new_reservation(date(2024, 6, 13), date(2024, 6, 13)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDateRange));

        let mut data = new_reservation(date(2024, 6, 10), date(2024, 6, 13));
        data.unit_id = "missing".to_string();
        let err = store.create(data).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownUnit(_)));
    }

    #[tokio::test]
    async fn filters_select_by_status_and_unit() {
        let store = seeded_store();
        let reservation = store
            .create(new_reservation(date(2024, 6, 10), date(2024, 6, 13)))
            .await
            .unwrap();
        store
            .update(
                &reservation.id,
                ReservationPatch {
                    status: Some(ReservationStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .create(new_reservation(date(2024, 7, 1), date(2024, 7, 3)))
            .await
            .unwrap();

        let all = store.list(&ReservationFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = store.list(&ReservationFilter::active()).await.unwrap();
        assert_eq!(active.len(), 1);

        let cancelled = store
            .list(&ReservationFilter {
                status: Some(ReservationStatus::Cancelled),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(cancelled.len(), 1);

        let other_unit = store
            .list(&ReservationFilter {
                unit_id: Some("U2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(other_unit.is_empty());
    }

    #[tokio::test]
    async fn delivery_log_is_write_once_per_key() {
        let log = InMemoryDeliveryLog::new();
        let reservation_id = Uuid::new_v4();

        assert!(!log.exists(&reservation_id, "pre_arrival").await.unwrap());

        let record = DeliveryRecord {
            reservation_id,
            kind: "pre_arrival".to_string(),
            dispatched_at: Utc::now(),
            status: DeliveryStatus::Sent,
        };

        assert_eq!(
            log.append(record.clone()).await.unwrap(),
            AppendOutcome::Recorded
        );
        assert!(log.exists(&reservation_id, "pre_arrival").await.unwrap());
        assert_eq!(log.append(record).await.unwrap(), AppendOutcome::Duplicate);
        assert_eq!(log.records().len(), 1);

        // A different kind for the same reservation is a separate key.
        assert!(!log.exists(&reservation_id, "post_stay").await.unwrap());
    }
}
