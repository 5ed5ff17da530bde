use serde::{Deserialize, Serialize};

/// A business tenant. Owns all services, bookings and clients scoped to its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub business_name: String,
    pub full_name: String,
    pub google_calendar_connected: bool,
    pub twilio_token_connected: bool,
    #[serde(skip_serializing)]
    pub twilio_token: Option<String>,
}
