//! Main entry point for the Innkeeper reservation backend server.
//! Wires the Postgres stores, pricing engine and notification scheduler
//! into the REST API and starts the periodic sweep loop.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use booking_core::PricingEngine;
use notification_services::{
    BrandConfig, EmailTransport, MockEmailTransport, NotificationScheduler, SesEmailTransport,
};
use reservation_store::{
    DeliveryLog, PgDeliveryLog, PgReservationStore, ReservationStore, UnitCatalog,
    create_connection_pool, test_connection,
};
use web_handlers::*;

/// Background runner for the periodic notification sweep
mod scheduler_manager;
use scheduler_manager::SchedulerManager;

fn select_transport() -> Arc<dyn EmailTransport> {
    match std::env::var("EMAIL_TRANSPORT").as_deref() {
        Ok("ses") => match SesEmailTransport::from_env() {
            Ok(transport) => {
                log::info!("Using SES email transport");
                Arc::new(transport)
            }
            Err(e) => {
                log::warn!("SES transport unavailable ({}), using mock transport", e);
                Arc::new(MockEmailTransport)
            }
        },
        _ => {
            log::info!("Using mock email transport");
            Arc::new(MockEmailTransport)
        }
    }
}

fn sweep_interval() -> Duration {
    let minutes = std::env::var("SWEEP_INTERVAL_MINUTES")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(15);
    Duration::from_secs(minutes * 60)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("Starting Innkeeper reservation server...");

    // Create database connection pool
    let pool = match create_connection_pool().await {
        Ok(pool) => {
            log::info!("Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("Failed to create database pool: {}", e);
            log::error!("Make sure PostgreSQL is running and DATABASE_URL is set");
            std::process::exit(1);
        }
    };

    let pg_store = Arc::new(PgReservationStore::new(pool.clone()));
    let store: Arc<dyn ReservationStore> = pg_store.clone();
    let units: Arc<dyn UnitCatalog> = pg_store.clone();
    let delivery_log: Arc<dyn DeliveryLog> = Arc::new(PgDeliveryLog::new(pool.clone()));

    let brand = BrandConfig::from_env();
    log::info!("Sending notifications as {}", brand.property_name);

    let scheduler = Arc::new(NotificationScheduler::new(
        store.clone(),
        delivery_log,
        select_transport(),
        brand,
        None,
    ));

    // Periodic sweeps are a convenience; the admin trigger runs the same
    // sweep on demand.
    let mut manager = SchedulerManager::new(scheduler.clone(), sweep_interval());
    manager.start();

    let app_state = web::Data::new(AppState {
        store,
        units,
        pricing: Arc::new(PricingEngine::standard()),
        scheduler,
    });

    log::info!("Server will be available at: http://0.0.0.0:8080");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    .route("/units", web::get().to(list_units))
                    .route("/units/{unit_id}", web::put().to(upsert_unit))
                    .route(
                        "/units/{unit_id}/availability",
                        web::get().to(unit_availability),
                    )
                    .route("/quotes", web::post().to(create_quote))
                    .service(
                        web::scope("/reservations")
                            .route("", web::post().to(create_reservation))
                            .route("", web::get().to(list_reservations))
                            .route("/{reservation_id}", web::get().to(get_reservation))
                            .route("/{reservation_id}", web::put().to(update_reservation)),
                    )
                    .service(
                        web::scope("/admin")
                            .route("/scheduler/run", web::post().to(run_scheduler))
                            .route(
                                "/notifications/test",
                                web::post().to(send_test_notification),
                            ),
                    ),
            )
            .route(
                "/health",
                web::get().to(|| async { HttpResponse::Ok().body("OK") }),
            )
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await
}
