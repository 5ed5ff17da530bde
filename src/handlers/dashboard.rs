use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, Client, Service};
use crate::services::booking;
use crate::services::notify::BookingCancellation;
use crate::state::AppState;

// GET /api/users/:user_id/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Service>>, AppError> {
    let db = state.db.lock().unwrap();
    let services = queries::list_services(&db, &user_id)?;
    Ok(Json(services))
}

// POST /api/users/:user_id/services
#[derive(Deserialize)]
pub struct SaveServiceRequest {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub enable_payment: bool,
}

pub async fn save_service(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<SaveServiceRequest>,
) -> Result<Json<Service>, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation(
            "service name must not be empty".to_string(),
        ));
    }
    if body.duration_minutes <= 0 {
        return Err(AppError::Validation(
            "duration_minutes must be positive".to_string(),
        ));
    }
    if body.price < 0.0 {
        return Err(AppError::Validation(
            "price must not be negative".to_string(),
        ));
    }

    let (service, catalogue) = {
        let db = state.db.lock().unwrap();

        let id = match body.id {
            Some(id) => {
                queries::get_service(&db, &user_id, &id)?
                    .ok_or_else(|| AppError::NotFound(format!("service {id}")))?;
                id
            }
            None => Uuid::new_v4().to_string(),
        };

        let service = Service {
            id,
            user_id: user_id.clone(),
            name: body.name,
            duration_minutes: body.duration_minutes,
            price: body.price,
            enable_payment: body.enable_payment,
        };
        queries::save_service(&db, &service)?;

        let catalogue = queries::list_services(&db, &user_id)?;
        (service, catalogue)
    };

    notify_catalogue_changed(&state, user_id, catalogue);

    Ok(Json(service))
}

// DELETE /api/users/:user_id/services/:service_id
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path((user_id, service_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let catalogue = {
        let db = state.db.lock().unwrap();

        // Deleting an id that is already gone is a no-op success.
        let removed = queries::delete_service(&db, &user_id, &service_id)?;
        if !removed {
            tracing::debug!(service_id = %service_id, "service already absent");
        }

        queries::list_services(&db, &user_id)?
    };

    notify_catalogue_changed(&state, user_id, catalogue);

    Ok(Json(serde_json::json!({ "ok": true })))
}

fn notify_catalogue_changed(state: &Arc<AppState>, user_id: String, catalogue: Vec<Service>) {
    let notifier = Arc::clone(&state.notifier);
    tokio::spawn(async move {
        if let Err(e) = notifier.services_updated(&user_id, &catalogue).await {
            tracing::warn!(error = %e, "service catalogue notification failed");
        }
    });
}

// GET /api/users/:user_id/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let db = state.db.lock().unwrap();
    let bookings = queries::list_bookings(&db, &user_id)?;
    Ok(Json(bookings))
}

// POST /api/users/:user_id/bookings/:booking_id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path((user_id, booking_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    {
        let db = state.db.lock().unwrap();
        booking::cancel_booking(&db, &user_id, &booking_id)?;
    }

    let event = BookingCancellation {
        user_id,
        booking_id,
    };
    let notifier = Arc::clone(&state.notifier);
    tokio::spawn(async move {
        if let Err(e) = notifier.booking_cancelled(&event).await {
            tracing::warn!(error = %e, "cancellation notification failed");
        }
    });

    Ok(Json(serde_json::json!({ "ok": true })))
}

// GET /api/users/:user_id/clients
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Client>>, AppError> {
    let db = state.db.lock().unwrap();
    let clients = queries::list_clients(&db, &user_id)?;
    Ok(Json(clients))
}

// GET /api/users/:user_id/booking-link
//
// The shareable path always carries the raw user id. Business names change;
// ids do not, and the public booking page looks tenants up by id. Callers
// prepend their own origin.
pub async fn booking_link(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();

    let user = queries::get_user(&db, &user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

    Ok(Json(serde_json::json!({
        "path": format!("/booking/{}", user.id),
    })))
}
