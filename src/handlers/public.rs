use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, Service, TimeSlot};
use crate::services::availability;
use crate::services::booking::{self, BookingRequest};
use crate::services::notify::BookingConfirmation;
use crate::state::AppState;

// GET /booking/:user_id
#[derive(Serialize)]
pub struct PublicProfile {
    pub business_name: String,
    pub services: Vec<Service>,
}

pub async fn public_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PublicProfile>, AppError> {
    let db = state.db.lock().unwrap();

    let user = queries::get_user(&db, &user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
    let services = queries::list_services(&db, &user_id)?;

    Ok(Json(PublicProfile {
        business_name: user.business_name,
        services,
    }))
}

// GET /booking/:user_id/slots?date=yyyy-MM-dd
#[derive(Deserialize)]
pub struct SlotsQuery {
    #[serde(default)]
    pub date: String,
}

pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<TimeSlot>>, AppError> {
    let db = state.db.lock().unwrap();
    let slots = availability::available_slots(&db, &user_id, &query.date)?;
    Ok(Json(slots))
}

// POST /booking/:user_id
//
// Also mounted on the dashboard at POST /api/users/:user_id/bookings; both
// surfaces go through the same reconciler.
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_phone: String,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let req = BookingRequest {
        user_id,
        service_id: body.service_id,
        date: body.date,
        time: body.time,
        client_name: body.client_name,
        client_phone: body.client_phone,
    };

    let created = {
        let mut db = state.db.lock().unwrap();
        booking::create_booking(&mut db, &req)?
    };

    tracing::info!(
        user_id = %created.user_id,
        booking_id = %created.id,
        date = %created.date,
        time = %created.time,
        "booking created"
    );

    let event = BookingConfirmation {
        user_id: created.user_id.clone(),
        client_name: created.client_name.clone(),
        phone: created.client_phone.clone(),
        service_name: created.service_name.clone(),
        scheduled_at: format!("{} {}", created.date, created.time),
    };
    let notifier = Arc::clone(&state.notifier);
    tokio::spawn(async move {
        if let Err(e) = notifier.booking_confirmed(&event).await {
            tracing::warn!(error = %e, "booking confirmation notification failed");
        }
    });

    Ok(Json(created))
}
