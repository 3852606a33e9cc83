use actix_web::{HttpResponse, Result, web};
use booking_core::AvailabilityIndex;
use reservation_store::{NewReservation, ReservationFilter, ReservationPatch};
use validator::Validate;

use crate::api_types::*;
use crate::state::AppState;

/// Lists all units with their base rates
pub async fn list_units(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let units = state.units.list_units().await?;
    Ok(HttpResponse::Ok().json(units))
}

/// Creates or updates a unit and its base rate
pub async fn upsert_unit(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpsertUnitRequest>,
) -> Result<HttpResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(format!("Validation error: {}", e)))?;

    let unit = booking_core::Unit {
        id: path.into_inner(),
        name: request.name.clone(),
        base_rate: request.base_rate,
    };
    state.units.upsert_unit(&unit).await?;
    Ok(HttpResponse::Ok().json(unit))
}

/// Answers whether a unit is free for a half-open date range and returns
/// its occupied intervals for calendar rendering
pub async fn unit_availability(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, ApiError> {
    let unit_id = path.into_inner();
    // Confirm the unit exists before answering about it.
    state.units.get_unit(&unit_id).await?;

    let index = active_index(&state, &unit_id).await?;
    let available = index.is_range_free(&unit_id, query.start, query.end)?;

    Ok(HttpResponse::Ok().json(AvailabilityResponse {
        booked: index.intervals_for(&unit_id).to_vec(),
        unit_id,
        start: query.start,
        end: query.end,
        available,
    }))
}

/// Prices a candidate stay. Rejects ranges that are not currently free so
/// the caller never quotes an unbookable stay.
pub async fn create_quote(
    state: web::Data<AppState>,
    request: web::Json<QuoteRequest>,
) -> Result<HttpResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(format!("Validation error: {}", e)))?;

    let unit = state.units.get_unit(&request.unit_id).await?;
    let quote = state
        .pricing
        .quote(&unit, request.check_in, request.check_out)?;

    let index = active_index(&state, &request.unit_id).await?;
    if !index.is_range_free(&request.unit_id, request.check_in, request.check_out)? {
        return Err(ApiError::Unavailable);
    }

    Ok(HttpResponse::Ok().json(quote))
}

/// Creates a reservation. The price is computed server-side from the same
/// engine that produced the quote, and the store re-validates availability
/// atomically with the insert, so a conflicting commit between quote and
/// confirmation surfaces as 409 rather than a double booking.
pub async fn create_reservation(
    state: web::Data<AppState>,
    request: web::Json<CreateReservationRequest>,
) -> Result<HttpResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(format!("Validation error: {}", e)))?;

    let unit = state.units.get_unit(&request.unit_id).await?;
    let quote = state
        .pricing
        .quote(&unit, request.check_in, request.check_out)?;

    let reservation = state
        .store
        .create(NewReservation {
            unit_id: request.unit_id.clone(),
            guest_name: request.guest_name.clone(),
            guest_email: request.guest_email.clone(),
            guest_phone: request.guest_phone.clone(),
            check_in: request.check_in,
            check_out: request.check_out,
            total_price: quote.total,
        })
        .await?;

    Ok(HttpResponse::Created().json(CreateReservationResponse { reservation, quote }))
}

/// Lists reservations, optionally filtered by status and unit
pub async fn list_reservations(
    state: web::Data<AppState>,
    query: web::Query<ListReservationsQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = ReservationFilter {
        status: query.status,
        unit_id: query.unit_id.clone(),
        active_only: false,
    };
    let reservations = state.store.list(&filter).await?;

    Ok(HttpResponse::Ok().json(ListReservationsResponse {
        total: reservations.len() as i64,
        reservations,
    }))
}

/// Fetches one reservation
pub async fn get_reservation(
    state: web::Data<AppState>,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, ApiError> {
    let reservation = state.store.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reservation))
}

/// Applies a staff patch: status, notes, payment state. There is no
/// delete; cancellation goes through `status`.
pub async fn update_reservation(
    state: web::Data<AppState>,
    path: web::Path<uuid::Uuid>,
    request: web::Json<UpdateReservationRequest>,
) -> Result<HttpResponse, ApiError> {
    let patch = ReservationPatch {
        status: request.status,
        admin_notes: request.admin_notes.clone(),
        payment_status: request.payment_status,
    };
    let reservation = state.store.update(&path.into_inner(), patch).await?;
    Ok(HttpResponse::Ok().json(reservation))
}

/// Rebuilds the availability index for one unit from the committed
/// reservation set
async fn active_index(state: &AppState, unit_id: &str) -> Result<AvailabilityIndex, ApiError> {
    let reservations = state
        .store
        .list(&ReservationFilter {
            unit_id: Some(unit_id.to_string()),
            active_only: true,
            ..Default::default()
        })
        .await?;
    Ok(AvailabilityIndex::from_reservations(&reservations))
}
