use serde::{Deserialize, Serialize};

/// Derived per-business client record, keyed by phone number. Maintained as a
/// side effect of booking creation; `total_bookings` counts every booking ever
/// created for this phone and is never decremented by a cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub last_visit: String,
    pub total_bookings: i64,
}
