use std::sync::{Arc, Mutex};

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use reserva::config::AppConfig;
use reserva::db;
use reserva::handlers;
use reserva::services::notify::{LogNotifier, Notifier};
use reserva::services::notify::webhook::WebhookNotifier;
use reserva::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let notifier: Arc<dyn Notifier> = if config.notify_webhook_url.is_empty() {
        tracing::info!("no notification webhook configured, notifications will be logged");
        Arc::new(LogNotifier)
    } else {
        tracing::info!("sending notifications to webhook (url: {})", config.notify_webhook_url);
        Arc::new(WebhookNotifier::new(config.notify_webhook_url.clone()))
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        notifier,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/users", post(handlers::users::register))
        .route(
            "/api/users/:user_id",
            get(handlers::users::get_user).post(handlers::users::update_profile),
        )
        .route(
            "/api/users/:user_id/connections/google-calendar",
            post(handlers::users::connect_google_calendar),
        )
        .route(
            "/api/users/:user_id/connections/twilio",
            post(handlers::users::connect_twilio),
        )
        .route(
            "/api/users/:user_id/services",
            get(handlers::dashboard::list_services).post(handlers::dashboard::save_service),
        )
        .route(
            "/api/users/:user_id/services/:service_id",
            delete(handlers::dashboard::delete_service),
        )
        .route(
            "/api/users/:user_id/bookings",
            get(handlers::dashboard::list_bookings).post(handlers::public::create_booking),
        )
        .route(
            "/api/users/:user_id/bookings/:booking_id/cancel",
            post(handlers::dashboard::cancel_booking),
        )
        .route(
            "/api/users/:user_id/clients",
            get(handlers::dashboard::list_clients),
        )
        .route(
            "/api/users/:user_id/booking-link",
            get(handlers::dashboard::booking_link),
        )
        .route(
            "/booking/:user_id",
            get(handlers::public::public_profile).post(handlers::public::create_booking),
        )
        .route(
            "/booking/:user_id/slots",
            get(handlers::public::available_slots),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
