use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

const MIN_TWILIO_TOKEN_LEN: usize = 10;

// POST /api/users
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub full_name: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    let mut missing = vec![];
    if body.email.trim().is_empty() {
        missing.push("email");
    }
    if body.business_name.trim().is_empty() {
        missing.push("business_name");
    }
    if body.full_name.trim().is_empty() {
        missing.push("full_name");
    }
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let user = {
        let db = state.db.lock().unwrap();

        if queries::get_user_by_email(&db, &body.email)?.is_some() {
            return Err(AppError::Conflict(format!(
                "email {} is already registered",
                body.email
            )));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: body.email,
            business_name: body.business_name,
            full_name: body.full_name,
            google_calendar_connected: false,
            twilio_token_connected: false,
            twilio_token: None,
        };
        queries::create_user(&db, &user)?;
        user
    };

    tracing::info!(user_id = %user.id, business = %user.business_name, "registered business");

    Ok(Json(user))
}

// GET /api/users/:user_id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, AppError> {
    let db = state.db.lock().unwrap();
    let user = queries::get_user(&db, &user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
    Ok(Json(user))
}

// POST /api/users/:user_id
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub business_name: Option<String>,
    pub full_name: Option<String>,
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    let db = state.db.lock().unwrap();

    let mut user = queries::get_user(&db, &user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

    if let Some(name) = body.business_name {
        user.business_name = name;
    }
    if let Some(name) = body.full_name {
        user.full_name = name;
    }

    queries::save_user(&db, &user)?;

    Ok(Json(user))
}

// POST /api/users/:user_id/connections/google-calendar
//
// The OAuth exchange itself happens outside this system; connecting here
// just records the outcome on the user.
pub async fn connect_google_calendar(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, AppError> {
    let db = state.db.lock().unwrap();

    let mut user = queries::get_user(&db, &user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

    user.google_calendar_connected = true;
    queries::save_user(&db, &user)?;

    tracing::info!(user_id = %user.id, "google calendar connected");

    Ok(Json(user))
}

// POST /api/users/:user_id/connections/twilio
#[derive(Deserialize)]
pub struct ConnectTwilioRequest {
    #[serde(default)]
    pub token: String,
}

pub async fn connect_twilio(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<ConnectTwilioRequest>,
) -> Result<Json<User>, AppError> {
    let token = body.token.trim().to_string();
    if token.len() < MIN_TWILIO_TOKEN_LEN {
        return Err(AppError::Validation(format!(
            "twilio token must be at least {MIN_TWILIO_TOKEN_LEN} characters"
        )));
    }

    let db = state.db.lock().unwrap();

    let mut user = queries::get_user(&db, &user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

    user.twilio_token_connected = true;
    user.twilio_token = Some(token);
    queries::save_user(&db, &user)?;

    tracing::info!(user_id = %user.id, "twilio token connected");

    Ok(Json(user))
}
