use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub enable_payment: bool,
}
