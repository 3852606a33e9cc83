use actix_web::{HttpResponse, Result, web};
use chrono::Utc;
use notification_services::NotificationKind;

use crate::api_types::*;
use crate::state::AppState;

/// Runs a notification sweep synchronously and returns its summary.
/// Safe to call at any time: dedupe comes from the delivery log, not from
/// how often this endpoint is hit.
pub async fn run_scheduler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let today = Utc::now().date_naive();
    let summary = state.scheduler.run_sweep(today).await;
    Ok(HttpResponse::Ok().json(summary))
}

/// Sends a test notification for a reservation, bypassing rule matching
/// and dedupe entirely
pub async fn send_test_notification(
    state: web::Data<AppState>,
    request: web::Json<TestNotificationRequest>,
) -> Result<HttpResponse, ApiError> {
    let kind = NotificationKind::parse(&request.kind)
        .ok_or_else(|| ApiError::UnknownKind(request.kind.clone()))?;

    let result = state
        .scheduler
        .send_test(&request.reservation_id, kind)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}
